use std::io::{self, IsTerminal, Write};

use tracing_subscriber::EnvFilter;

use crate::BrainfuckError;

/// How chatty the status output should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Debug,
}

impl Verbosity {
    fn default_filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Debug => "info,rust_bfi=trace",
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over `verbosity`.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

/// Print a diagnostic for `err`. When the error points into the source,
/// show the surrounding text with a caret under the offending byte.
pub fn print_error(program: &str, source: Option<&[u8]>, err: &BrainfuckError) {
    let msg = format!("{program}: error: {err}");
    match (err, source) {
        (BrainfuckError::UnbalancedClosingBracket { position }, Some(code)) => {
            print_error_with_context(&msg, code, *position);
        }
        _ => {
            eprintln!("{msg}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print `prefix` followed by a window of `code` around byte offset `pos`
/// and a caret under it. Control characters are shown as spaces so the
/// caret stays aligned.
pub fn print_error_with_context(prefix: &str, code: &[u8], pos: usize) {
    eprintln!("{prefix}");
    let (window, caret) = context_window(code, pos);
    eprintln!("  {window}");
    eprintln!("  {caret}");
    let _ = io::stderr().flush();
}

/// Render the source window and caret line for byte offset `pos`.
fn context_window(code: &[u8], pos: usize) -> (String, String) {
    const WINDOW_BYTES: usize = 32;

    let pos = pos.min(code.len().saturating_sub(1));
    let start = pos.saturating_sub(WINDOW_BYTES);
    let end = (pos + WINDOW_BYTES + 1).min(code.len());

    let window: String = code[start..end]
        .iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { ' ' })
        .collect();

    let mut caret = " ".repeat(pos - start);
    caret.push('^');
    (window, caret)
}
