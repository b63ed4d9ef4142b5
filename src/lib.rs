pub mod actions;
pub mod blocks;
pub mod error;
pub mod parser;
pub mod reader;
pub mod song;

pub use actions::Action;
pub use error::{BlockKind, ParseError};
pub use parser::parse;
pub use song::bar_chords::{BarChords, ChordEntry, NO_CHORD};
pub use song::bar_info::{BarInfo, Line, LineId};
pub use song::song_data::{SongData, UNTITLED_SONG_NAME};
pub use song::{Song, SyntaxChecker};

/// Parse a chart and serialize it straight back.
/// Returns the input byte-for-byte for any text that parses.
pub fn round_trip(source: &str) -> Result<String, ParseError> {
    let song = parse(source)?;
    Ok(song.write_to_string())
}
