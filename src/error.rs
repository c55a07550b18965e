use std::io;
use std::path::PathBuf;

/// Fatal errors raised while loading, validating or executing a program.
#[derive(Debug, thiserror::Error)]
pub enum BrainfuckError {
    /// The source file could not be opened or read.
    #[error("unable to open file '{}': {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The requested tape capacity is at or below the minimum.
    #[error("specified memory size is too small ({requested} bytes; must be more than {minimum} bytes)")]
    MemoryTooSmall { requested: i64, minimum: usize },

    /// The tape could not be allocated at the requested capacity.
    #[error("unable to allocate a memory block of {requested} bytes")]
    MemoryUnavailable { requested: u64 },

    /// A `]` appeared while no `[` was pending.
    ///
    /// `position` is the offset into the buffer being scanned: the raw source
    /// when parsing, the instruction buffer when building a jump table directly.
    #[error("closing bracket found before any opening bracket at offset {position}")]
    UnbalancedClosingBracket { position: usize },

    /// The scan finished with `[` brackets still open.
    #[error("mismatched opening and closing brackets ({unclosed} '[' left open)")]
    UnbalancedBrackets { unclosed: usize },

    /// The execution loop reached a byte outside the opcode alphabet.
    #[error("invalid instruction {byte:#04x} at instruction {ip}")]
    InvalidInstruction { byte: u8, ip: usize },

    /// The output sink rejected a byte.
    #[error("failed to write output at instruction {ip}: {source}")]
    OutputFailed {
        ip: usize,
        #[source]
        source: io::Error,
    },

    #[error("execution aborted: step limit exceeded ({limit})")]
    StepLimitExceeded { limit: u64 },

    #[error("execution aborted: cancelled")]
    Canceled,
}

impl BrainfuckError {
    /// Process exit status for this kind of failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            BrainfuckError::FileUnreadable { .. } => 1,
            BrainfuckError::MemoryTooSmall { .. } => 2,
            BrainfuckError::MemoryUnavailable { .. } => 3,
            BrainfuckError::UnbalancedBrackets { .. } => 5,
            BrainfuckError::UnbalancedClosingBracket { .. } => 6,
            BrainfuckError::InvalidInstruction { .. } => 7,
            BrainfuckError::OutputFailed { .. } => 8,
            BrainfuckError::StepLimitExceeded { .. } => 9,
            BrainfuckError::Canceled => 130,
        }
    }
}

/// Why an input operation produced no byte. Never fatal: the `,` that asked
/// for the byte leaves its cell unchanged.
#[derive(Debug, thiserror::Error)]
pub enum InputUnavailable {
    #[error("end of input")]
    EndOfInput,

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// A key was pressed that has no single-byte representation.
    #[error("key has no byte representation")]
    Unmappable,

    /// The user asked to stop while input was being captured.
    #[error("input interrupted")]
    Interrupted,
}
