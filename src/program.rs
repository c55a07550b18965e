//! Turning raw source bytes into an executable [`Program`].
//!
//! Parsing is a single pass over the source that drops every byte outside
//! the opcode alphabet `><+-.,[]` and keeps a running bracket depth so an
//! early `]` is reported at the exact offset where it appears. A second
//! pass over the dense instruction buffer resolves every loop bracket to
//! its partner, so the execution loop never has to rescan for a match.

use tracing::debug;

use crate::error::BrainfuckError;

/// The eight meaningful bytes, in no particular order.
pub const OPCODES: [u8; 8] = *b"><+-.,[]";

/// Returns `true` if `byte` is one of the eight opcodes.
pub fn is_opcode(byte: u8) -> bool {
    OPCODES.contains(&byte)
}

/// Keep only opcode bytes, preserving order. Everything else is commentary.
pub fn filter_instructions(source: &[u8]) -> Vec<u8> {
    source.iter().copied().filter(|&b| is_opcode(b)).collect()
}

/// Running bracket depth checked during the filtering pass.
#[derive(Debug, Default)]
struct BracketValidator {
    depth: usize,
}

impl BracketValidator {
    fn observe(&mut self, byte: u8, position: usize) -> Result<(), BrainfuckError> {
        match byte {
            b'[' => self.depth += 1,
            b']' => {
                self.depth = self
                    .depth
                    .checked_sub(1)
                    .ok_or(BrainfuckError::UnbalancedClosingBracket { position })?;
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<(), BrainfuckError> {
        if self.depth != 0 {
            return Err(BrainfuckError::UnbalancedBrackets { unclosed: self.depth });
        }
        Ok(())
    }
}

/// Filter `source` and validate its brackets in one pass.
///
/// Fails on the first `]` with nothing to close (reporting its offset in
/// `source`), or at the end if any `[` is still open.
pub fn filter_and_validate(source: &[u8]) -> Result<Vec<u8>, BrainfuckError> {
    let mut instructions = Vec::with_capacity(source.len());
    let mut validator = BracketValidator::default();

    for (offset, &byte) in source.iter().enumerate() {
        if !is_opcode(byte) {
            continue;
        }
        validator.observe(byte, offset)?;
        instructions.push(byte);
    }

    validator.finish()?;
    instructions.shrink_to_fit();
    Ok(instructions)
}

/// Matching bracket positions for an instruction buffer.
///
/// `partner[i]` holds the index of the bracket paired with the bracket at
/// `i`, and `None` for every other instruction. An open bracket always sits
/// before its partner, which is how the two directions are told apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    partner: Vec<Option<usize>>,
}

impl JumpTable {
    /// Pair up brackets with a stack of pending `[` positions.
    pub fn build(instructions: &[u8]) -> Result<Self, BrainfuckError> {
        let mut partner = vec![None; instructions.len()];
        let mut pending: Vec<usize> = Vec::new();

        for (i, &op) in instructions.iter().enumerate() {
            match op {
                b'[' => pending.push(i),
                b']' => {
                    let Some(open) = pending.pop() else {
                        return Err(BrainfuckError::UnbalancedClosingBracket { position: i });
                    };
                    partner[open] = Some(i);
                    partner[i] = Some(open);
                }
                _ => {}
            }
        }

        if !pending.is_empty() {
            return Err(BrainfuckError::UnbalancedBrackets { unclosed: pending.len() });
        }

        Ok(Self { partner })
    }

    /// Index of the `]` closing the `[` at `open`.
    pub fn match_forward(&self, open: usize) -> Option<usize> {
        self.partner
            .get(open)
            .copied()
            .flatten()
            .filter(|&close| close > open)
    }

    /// Index of the `[` opened for the `]` at `close`.
    pub fn match_backward(&self, close: usize) -> Option<usize> {
        self.partner
            .get(close)
            .copied()
            .flatten()
            .filter(|&open| open < close)
    }

    /// Number of matched bracket pairs.
    pub fn pairs(&self) -> usize {
        self.partner.iter().flatten().count() / 2
    }
}

/// A validated instruction buffer plus its jump table. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<u8>,
    jumps: JumpTable,
}

impl Program {
    /// Filter, validate and resolve the loops of raw source bytes.
    pub fn parse(source: &[u8]) -> Result<Self, BrainfuckError> {
        let instructions = filter_and_validate(source)?;
        let jumps = JumpTable::build(&instructions)?;
        debug!(
            source_bytes = source.len(),
            instructions = instructions.len(),
            loops = jumps.pairs(),
            "program parsed"
        );
        Ok(Self { instructions, jumps })
    }

    /// Assemble a program without validation, to exercise corrupted tables.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(instructions: Vec<u8>, jumps: JumpTable) -> Self {
        Self { instructions, jumps }
    }

    pub fn instructions(&self) -> &[u8] {
        &self.instructions
    }

    pub fn jumps(&self) -> &JumpTable {
        &self.jumps
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_alphabet_is_exactly_eight_bytes() {
        let accepted: Vec<u8> = (0..=255u8).filter(|&b| is_opcode(b)).collect();
        let mut expected = OPCODES.to_vec();
        expected.sort_unstable();
        assert_eq!(accepted, expected);
    }

    #[test]
    fn filter_drops_commentary() {
        let source = b"hello + world - [ comment > ] . , <\n";
        assert_eq!(filter_instructions(source), b"+-[>].,<".to_vec());
    }

    #[test]
    fn unmatched_close_at_start_fails_fast() {
        let result = filter_and_validate(b"]+++[");
        assert!(matches!(
            result,
            Err(BrainfuckError::UnbalancedClosingBracket { position: 0 })
        ));
    }

    #[test]
    fn unmatched_close_reports_source_offset() {
        // '[' at 2, ']' at 5, stray ']' at 9
        let result = filter_and_validate(b"ab[ c]   ]");
        assert!(matches!(
            result,
            Err(BrainfuckError::UnbalancedClosingBracket { position: 9 })
        ));
    }

    #[test]
    fn unequal_counts_fail_at_end() {
        let result = filter_and_validate(b"[[");
        assert!(matches!(result, Err(BrainfuckError::UnbalancedBrackets { unclosed: 2 })));

        let result = filter_and_validate(b"[[]");
        assert!(matches!(result, Err(BrainfuckError::UnbalancedBrackets { unclosed: 1 })));
    }

    #[test]
    fn jump_table_respects_nesting() {
        let program = Program::parse(b"+[>[-]<-]").unwrap();
        let jumps = program.jumps();

        assert_eq!(jumps.match_forward(1), Some(8));
        assert_eq!(jumps.match_backward(8), Some(1));
        assert_eq!(jumps.match_forward(3), Some(5));
        assert_eq!(jumps.match_backward(5), Some(3));
        assert_eq!(jumps.pairs(), 2);
    }

    #[test]
    fn jump_table_directions_do_not_mix() {
        let jumps = JumpTable::build(b"[]").unwrap();
        assert_eq!(jumps.match_forward(1), None);
        assert_eq!(jumps.match_backward(0), None);
        assert_eq!(jumps.match_forward(5), None);
    }

    #[test]
    fn jump_table_rejects_unbalanced_buffers() {
        assert!(matches!(
            JumpTable::build(b"+]"),
            Err(BrainfuckError::UnbalancedClosingBracket { position: 1 })
        ));
        assert!(matches!(
            JumpTable::build(b"[[]"),
            Err(BrainfuckError::UnbalancedBrackets { unclosed: 1 })
        ));
    }

    #[test]
    fn empty_source_is_an_empty_program() {
        let program = Program::parse(b"no opcodes here").unwrap();
        assert!(program.is_empty());
        assert_eq!(program.jumps().pairs(), 0);
    }
}
