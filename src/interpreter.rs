//! The execution loop.
//!
//! An [`Interpreter`] owns one [`Program`], one [`Tape`] and its I/O for the
//! duration of a run. Each step dispatches the instruction at `ip`; loops
//! jump through the program's precomputed table, so entering or leaving a
//! loop costs the same no matter how far away the matching bracket is.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::error::BrainfuckError;
use crate::io::{InputSource, OutputSink};
use crate::program::Program;
use crate::tape::Tape;

/// Whether the interpreter can take another step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Running,
    Halted,
}

/// Totals reported by a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub steps: u64,
}

/// Optional step limit and cooperative cancellation, checked before each step.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub max_steps: Option<u64>,
    pub cancel_flag: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new(max_steps: Option<u64>, cancel_flag: Arc<AtomicBool>) -> Self {
        Self { max_steps, cancel_flag }
    }
}

/// Interpreter context for a single run.
pub struct Interpreter<I, O> {
    program: Program,
    tape: Tape,
    ip: usize,
    steps: u64,
    input: I,
    output: O,
    control: Option<RunControl>,
}

impl<I: InputSource, O: OutputSink> Interpreter<I, O> {
    pub fn new(program: Program, tape: Tape, input: I, output: O) -> Self {
        Self {
            program,
            tape,
            ip: 0,
            steps: 0,
            input,
            output,
            control: None,
        }
    }

    /// Attach a step limit and cancel flag. Without one, runs are unbounded.
    pub fn with_control(mut self, control: RunControl) -> Self {
        self.control = Some(control);
        self
    }

    pub fn state(&self) -> State {
        if self.ip < self.program.len() {
            State::Running
        } else {
            State::Halted
        }
    }

    /// Execute the instruction at `ip` and advance.
    ///
    /// Calling this once halted is a no-op that returns [`State::Halted`].
    pub fn step(&mut self) -> Result<State, BrainfuckError> {
        let ip = self.ip;
        let Some(&op) = self.program.instructions().get(ip) else {
            return Ok(State::Halted);
        };

        if let Some(ctrl) = self.control.as_ref() {
            if ctrl.cancel_flag.load(Ordering::Relaxed) {
                return Err(BrainfuckError::Canceled);
            }
            if let Some(limit) = ctrl.max_steps {
                if self.steps >= limit {
                    return Err(BrainfuckError::StepLimitExceeded { limit });
                }
            }
        }

        trace!(
            step = self.steps,
            ip,
            ptr = self.tape.pointer(),
            cell = self.tape.read(),
            op = %(op as char),
            "step"
        );

        let next = match op {
            b'>' => {
                self.tape.move_right();
                ip + 1
            }
            b'<' => {
                self.tape.move_left();
                ip + 1
            }
            b'+' => {
                self.tape.increment();
                ip + 1
            }
            b'-' => {
                self.tape.decrement();
                ip + 1
            }
            b'.' => {
                self.output
                    .write_byte(self.tape.read())
                    .map_err(|source| BrainfuckError::OutputFailed { ip, source })?;
                ip + 1
            }
            b',' => {
                // Let any prompt reach the user before blocking on input.
                self.output
                    .flush()
                    .map_err(|source| BrainfuckError::OutputFailed { ip, source })?;
                match self.input.read_byte() {
                    Ok(byte) => self.tape.write(byte),
                    Err(err) => debug!(ip, %err, "input unavailable; cell left unchanged"),
                }
                ip + 1
            }
            b'[' => {
                if self.tape.read() == 0 {
                    let close = self
                        .program
                        .jumps()
                        .match_forward(ip)
                        .ok_or(BrainfuckError::InvalidInstruction { byte: op, ip })?;
                    close + 1
                } else {
                    ip + 1
                }
            }
            b']' => {
                if self.tape.read() != 0 {
                    let open = self
                        .program
                        .jumps()
                        .match_backward(ip)
                        .ok_or(BrainfuckError::InvalidInstruction { byte: op, ip })?;
                    open + 1
                } else {
                    ip + 1
                }
            }
            _ => return Err(BrainfuckError::InvalidInstruction { byte: op, ip }),
        };

        self.ip = next;
        self.steps += 1;
        Ok(self.state())
    }

    /// Step until the instruction pointer runs off the end of the program.
    ///
    /// Output is flushed before returning, whether or not the run succeeded.
    pub fn run(&mut self) -> Result<RunStats, BrainfuckError> {
        let result = self.run_to_halt();
        let flushed = self.output.flush().map_err(|source| BrainfuckError::OutputFailed {
            ip: self.ip,
            source,
        });
        result?;
        flushed?;
        Ok(RunStats { steps: self.steps })
    }

    fn run_to_halt(&mut self) -> Result<(), BrainfuckError> {
        while self.step()? == State::Running {}
        Ok(())
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn into_output(self) -> O {
        self.output
    }
}
