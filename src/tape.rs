use crate::error::BrainfuckError;

/// Tape size used when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 30_000;

/// Capacities at or below this are rejected by [`Tape::new`].
pub const MIN_CAPACITY: usize = 1_000;

/// A fixed-size strip of 8-bit cells with a single data pointer.
///
/// The pointer is clamped to the tape: moving past either end is a no-op.
/// Cell arithmetic wraps modulo 256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<u8>,
    pointer: usize,
}

impl Tape {
    /// Create a zeroed tape of `capacity` cells, enforcing [`MIN_CAPACITY`].
    pub fn new(capacity: usize) -> Result<Self, BrainfuckError> {
        Self::with_minimum(capacity, MIN_CAPACITY)
    }

    /// Create a tape from a size as configured, where negative values are
    /// possible and count as too small.
    pub fn from_requested(requested: i64) -> Result<Self, BrainfuckError> {
        if requested < 0 {
            return Err(BrainfuckError::MemoryTooSmall { requested, minimum: MIN_CAPACITY });
        }
        let capacity = usize::try_from(requested).map_err(|_| BrainfuckError::MemoryUnavailable {
            requested: requested as u64,
        })?;
        Self::new(capacity)
    }

    /// Create a zeroed tape whose capacity must be strictly above `minimum`.
    ///
    /// Allocation failure is reported as [`BrainfuckError::MemoryUnavailable`].
    pub fn with_minimum(capacity: usize, minimum: usize) -> Result<Self, BrainfuckError> {
        if capacity <= minimum {
            return Err(BrainfuckError::MemoryTooSmall {
                requested: i64::try_from(capacity).unwrap_or(i64::MAX),
                minimum,
            });
        }

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(capacity)
            .map_err(|_| BrainfuckError::MemoryUnavailable { requested: capacity as u64 })?;
        cells.resize(capacity, 0);

        Ok(Self { cells, pointer: 0 })
    }

    pub fn read(&self) -> u8 {
        self.cells[self.pointer]
    }

    pub fn write(&mut self, value: u8) {
        self.cells[self.pointer] = value;
    }

    pub fn move_right(&mut self) {
        if self.pointer + 1 < self.cells.len() {
            self.pointer += 1;
        }
    }

    pub fn move_left(&mut self) {
        self.pointer = self.pointer.saturating_sub(1);
    }

    pub fn increment(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        let cell = &mut self.cells[self.pointer];
        *cell = cell.wrapping_sub(1);
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn capacity(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}
