//! Action tags and command vocabularies for the chart language.
//!
//! Every stored line carries an [`Action`] tag telling the document what the
//! line means (or that it is opaque). The vocabularies below drive dispatch
//! in the parser: commands the editor understands get fully tokenized,
//! everything else is kept verbatim.

use serde::Serialize;

/// Classification tag attached to every stored line.
///
/// `Block` carries the secondary keyword of a `Begin ... End` span (e.g.
/// `DOC`, `DRUM`), upper-cased. The keyword is part of the tag, not of the
/// line's fields, so flattening a block never re-emits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Action {
    /// Verbatim line(s) the editor does not interpret.
    Unknown,
    /// A comment-only line; the first one on bar 0 carries the song title.
    Remark,
    /// A `Begin <keyword> ... End` span.
    Block(String),
    Author,
    DefGroove,
    Groove,
    Repeat,
    RepeatEnd,
    RepeatEnding,
    Tempo,
    Time,
}

impl Action {
    /// Tags the editor surfaces as bar events, in menu order.
    pub fn is_event(&self) -> bool {
        matches!(
            self,
            Action::Groove
                | Action::Tempo
                | Action::Repeat
                | Action::RepeatEnding
                | Action::RepeatEnd
        )
    }

    /// Look up a recognized command by its upper-cased action key.
    ///
    /// Only these commands are tokenized into structured fields; all other
    /// keys fall through to the opaque vocabularies.
    pub(crate) fn recognized(key: &str) -> Option<Action> {
        match key {
            "AUTHOR" => Some(Action::Author),
            "DEFGROOVE" => Some(Action::DefGroove),
            "GROOVE" => Some(Action::Groove),
            "REPEAT" => Some(Action::Repeat),
            "REPEATEND" => Some(Action::RepeatEnd),
            "REPEATENDING" => Some(Action::RepeatEnding),
            "TEMPO" => Some(Action::Tempo),
            "TIME" => Some(Action::Time),
            _ => None,
        }
    }
}

/// Leading sigil of a macro invocation line.
pub(crate) const MACRO_SIGIL: char = '$';

/// Block keywords whose body the editor understands and flattens into a
/// single field (see the doc-block post-processing in `blocks`).
pub(crate) const UNDERSTOOD_BLOCKS: &[&str] = &["DOC"];

/// Commands with no leading track name and no fields of interest.
///
/// Lines starting with one of these are stored verbatim. The set is the
/// notation language's global-command vocabulary; membership only decides
/// that the line is a command rather than chord data.
pub(crate) const SIMPLE_FUNCS: &[&str] = &[
    "ADJUSTVOLUME",
    "ALLGROOVES",
    "ALLTRACKS",
    "AUTHOR",
    "AUTOSOLOTRACKS",
    "BEATADJUST",
    "CHANNELPREF",
    "CHORDADJUST",
    "COMMENT",
    "CRESC",
    "CUT",
    "DEBUG",
    "DEC",
    "DECRESC",
    "DEFALIAS",
    "DEFCHORD",
    "DEFGROOVE",
    "DELETE",
    "DOC",
    "DOCVAR",
    "DRUMVOLTR",
    "ELSE",
    "ENDIF",
    "ENDMSET",
    "ENDREPEAT",
    "EOF",
    "FERMATA",
    "GOTO",
    "GROOVE",
    "GROOVECLEAR",
    "IF",
    "IFEND",
    "INC",
    "INCLUDE",
    "KEYSIG",
    "LABEL",
    "LYRIC",
    "MIDI",
    "MIDICOPYRIGHT",
    "MIDICUE",
    "MIDIDEF",
    "MIDIFILE",
    "MIDIINC",
    "MIDIMARK",
    "MIDISPLIT",
    "MIDITEXT",
    "MIDITNAME",
    "MMAEND",
    "MMASTART",
    "MSET",
    "MSETEND",
    "NEWSET",
    "PATCH",
    "PRINT",
    "PRINTACTIVE",
    "PRINTCHORD",
    "REPEAT",
    "REPEATEND",
    "REPEATENDING",
    "RESTART",
    "RNDSEED",
    "RNDSET",
    "SEQ",
    "SEQCLEAR",
    "SEQRND",
    "SEQRNDWEIGHT",
    "SEQSIZE",
    "SET",
    "SETAUTOLIBPATH",
    "SETINCPATH",
    "SETLIBPATH",
    "SETMIDIPLAYER",
    "SETOUTPATH",
    "SETSYNCTONE",
    "SHOWVARS",
    "STACKVALUE",
    "SWELL",
    "SWINGMODE",
    "SYNCHRONIZE",
    "TEMPO",
    "TIME",
    "TIMESIG",
    "TONETR",
    "TRANSPOSE",
    "TRUNCATE",
    "UNSET",
    "USE",
    "VARCLEAR",
    "VEXPAND",
    "VOICETR",
    "VOICEVOLTR",
    "VOLUME",
];

/// Track classes a per-track command can address, possibly with a
/// `-qualifier` suffix (e.g. `Drum-Snare`).
pub(crate) const TRACK_CLASSES: &[&str] = &[
    "BASS", "CHORD", "ARPEGGIO", "SCALE", "DRUM", "WALK", "MELODY", "SOLO", "ARIA", "PLECTRUM",
];
