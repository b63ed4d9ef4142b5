//! # Error Types
//!
//! This module defines all error types for the chordbar parser.
//!
//! All errors carry the 1-based physical line number where the fault was
//! detected, so an editor can move the cursor to the offending input line.
//!
//! ## Error Types
//! - `UnterminatedContinuation` - the input ended inside a `\`-continued line
//! - `UnterminatedBlock` - a Begin/MSet/If block was never closed
//! - `MalformedDirective` - a directive is missing a required argument
//! - `UnbalancedSoloBraces` - a track Sequence ran out of input with open `{`s
//! - `MismatchedSoloBraces` / `MismatchedLyricBrackets` - a chord line closed
//!   a `{}`/`[]` span it never opened, or left one open at end of line
//!
//! Any of these fails the whole parse; there is no partial document.

use thiserror::Error;

/// Which block construct was left unterminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Begin,
    MacroSet,
    Conditional,
}

impl BlockKind {
    /// The closer keyword named in the error message.
    pub fn closer(&self) -> &'static str {
        match self {
            BlockKind::Begin => "End",
            BlockKind::MacroSet => "MSetEnd",
            BlockKind::Conditional => "EndIf",
        }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    /// The input ended while the last line was still continued with `\`.
    #[error("line {line}: reached end of input, the last line is not complete")]
    UnterminatedContinuation { line: usize },

    /// A block opener was never matched by its closer.
    #[error("line {line}: reached end of input while looking for {}", kind.closer())]
    UnterminatedBlock { kind: BlockKind, line: usize },

    /// A directive is missing a required argument.
    #[error("line {line}: {message}")]
    MalformedDirective { line: usize, message: String },

    /// A track Sequence ran out of input before its `{`s and `}`s matched.
    #[error("line {line}: reached end of input, Sequence {{}}s do not match")]
    UnbalancedSoloBraces { line: usize },

    /// Mismatched `{}`s for a solo span in a chord line.
    #[error("line {line}: mismatched {{}}s for solo found in chord line")]
    MismatchedSoloBraces { line: usize },

    /// Mismatched `[]`s for a lyric span in a chord line.
    #[error("line {line}: mismatched []s for lyrics found in chord line")]
    MismatchedLyricBrackets { line: usize },
}
