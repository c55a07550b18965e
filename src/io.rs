//! Byte-level input and output used by the `,` and `.` instructions.
//!
//! The interpreter only sees the [`InputSource`] and [`OutputSink`] traits.
//! Tests feed it fixed byte streams; the `bf` binary wires stdin/stdout, or
//! single key presses when stdin is a terminal.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::error::InputUnavailable;

/// Supplies one byte per `,` instruction. Blocks until a byte is available.
pub trait InputSource {
    fn read_byte(&mut self) -> Result<u8, InputUnavailable>;
}

/// Receives one byte per `.` instruction.
pub trait OutputSink {
    fn write_byte(&mut self, byte: u8) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn read_byte(&mut self) -> Result<u8, InputUnavailable> {
        (**self).read_byte()
    }
}

impl OutputSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.push(byte);
        Ok(())
    }
}

impl<T: OutputSink + ?Sized> OutputSink for &mut T {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

impl<T: OutputSink + ?Sized> OutputSink for Box<T> {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        (**self).write_byte(byte)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Input backed by a closure; `None` means end of input.
pub struct FnInput<F>(F);

/// Wrap a closure as an [`InputSource`].
pub fn input_from_fn<F>(provider: F) -> FnInput<F>
where
    F: FnMut() -> Option<u8>,
{
    FnInput(provider)
}

impl<F> InputSource for FnInput<F>
where
    F: FnMut() -> Option<u8>,
{
    fn read_byte(&mut self) -> Result<u8, InputUnavailable> {
        (self.0)().ok_or(InputUnavailable::EndOfInput)
    }
}

/// Reads one byte at a time from any reader.
pub struct ReaderInput<R> {
    reader: R,
}

impl<R: Read> ReaderInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> InputSource for ReaderInput<R> {
    fn read_byte(&mut self) -> Result<u8, InputUnavailable> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Err(InputUnavailable::EndOfInput),
                Ok(_) => return Ok(buf[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(InputUnavailable::Io(e)),
            }
        }
    }
}

/// Writes each byte to any writer, as a raw byte.
pub struct WriterOutput<W> {
    writer: W,
}

impl<W: Write> WriterOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterOutput<W> {
    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        self.writer.write_all(&[byte])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Captures a single key press per read, without echo, using raw mode.
///
/// Ctrl+C raises the shared cancel flag (if any) instead of producing a
/// byte, since raw mode keeps the terminal from sending SIGINT.
pub struct KeystrokeInput {
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl KeystrokeInput {
    pub fn new(cancel_flag: Option<Arc<AtomicBool>>) -> Self {
        Self { cancel_flag }
    }
}

impl InputSource for KeystrokeInput {
    fn read_byte(&mut self) -> Result<u8, InputUnavailable> {
        terminal::enable_raw_mode()?;
        let key = read_key_press();
        // Restore the terminal even if the read failed.
        let restored = terminal::disable_raw_mode();
        let key = key?;
        restored?;

        if is_interrupt(&key) {
            if let Some(flag) = self.cancel_flag.as_ref() {
                flag.store(true, Ordering::Relaxed);
            }
            return Err(InputUnavailable::Interrupted);
        }

        key_to_byte(&key).ok_or(InputUnavailable::Unmappable)
    }
}

fn read_key_press() -> io::Result<KeyEvent> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(key);
            }
        }
    }
}

fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// Byte produced by a key press, if it has one.
///
/// ASCII characters map to themselves and Ctrl+letter to the matching
/// control code.
pub fn key_to_byte(key: &KeyEvent) -> Option<u8> {
    match key.code {
        KeyCode::Char(c) if c.is_ascii() => {
            let byte = c as u8;
            if key.modifiers.contains(KeyModifiers::CONTROL) && byte.is_ascii_alphabetic() {
                Some(byte.to_ascii_lowercase() & 0x1f)
            } else {
                Some(byte)
            }
        }
        KeyCode::Enter => Some(b'\n'),
        KeyCode::Tab => Some(b'\t'),
        KeyCode::Backspace => Some(0x08),
        KeyCode::Esc => Some(0x1b),
        _ => None,
    }
}
