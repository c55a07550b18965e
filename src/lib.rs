//! A small Brainfuck execution engine.
//!
//! Source bytes go through three stages:
//! - [`Program::parse`] drops every byte outside `><+-.,[]`, rejects
//!   unbalanced brackets, and precomputes the matching bracket for every loop.
//! - A [`Tape`] of fixed capacity (30,000 cells by default) holds the data.
//!   The pointer is clamped at both ends and cells wrap modulo 256.
//! - An [`Interpreter`] walks the program, reading `,` bytes from an
//!   [`InputSource`] and writing `.` bytes to an [`OutputSink`].
//!
//! Quick start:
//!
//! ```
//! use rust_bfi::{Interpreter, Program, Tape, input_from_fn};
//!
//! let program = Program::parse(b"++++++[>++++++++<-]>+.").unwrap();
//! let tape = Tape::new(30_000).unwrap();
//! let mut bf = Interpreter::new(program, tape, input_from_fn(|| None), Vec::new());
//! bf.run().unwrap();
//! assert_eq!(bf.output(), b"1");
//! ```

pub mod cli_util;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod io;
pub mod program;
pub mod tape;

pub use config::Config;
pub use error::{BrainfuckError, InputUnavailable};
pub use interpreter::{Interpreter, RunControl, RunStats, State};
pub use io::{InputSource, KeystrokeInput, OutputSink, ReaderInput, WriterOutput, input_from_fn};
pub use program::{JumpTable, Program};
pub use tape::Tape;
