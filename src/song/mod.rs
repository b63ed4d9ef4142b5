//! The editable document model and its editor-facing wrapper.

pub mod bar_chords;
pub mod bar_info;
pub mod song_data;

use std::cell::Cell;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use crate::parser::parse;
use crate::song::song_data::SongData;

/// Shared save-needed flag, cloned into every bar entity of one `SongData`.
///
/// This is the document's notification link, not ownership: a bar entity can
/// raise the flag but holds no reference back to the document, and copying an
/// entity into another document re-points the handle.
#[derive(Debug, Clone, Default)]
pub struct ChangeFlag(Rc<Cell<bool>>);

impl ChangeFlag {
    pub(crate) fn mark(&self) {
        log::debug!("song changed");
        self.0.set(true);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn set(&self, value: bool) {
        self.0.set(value);
    }
}

/// External syntax checker for the notation language.
///
/// `check_syntax` classifies a full source text: `0` means the text compiled,
/// a positive value is the 1-based input line of a reported fault, `-1` means
/// a fault was reported without a usable line number, and anything below `-1`
/// means the checker itself could not run (process failure, timeout, I/O).
/// The textual diagnostics stay on the checker's side.
pub trait SyntaxChecker {
    fn check_syntax(&mut self, source: &str) -> i32;
}

/// The current song plus its parse-failure fallback state.
///
/// While the latest text fails to parse, the document is a single-bar
/// placeholder and the unparsed text is retained verbatim, so the editor
/// keeps showing (and re-submitting) exactly what the user wrote until a
/// later compile succeeds.
pub struct Song {
    song_data: SongData,
    invalid_data: Option<String>,
    pending_data: Option<String>,
    last_compile_result: Option<i32>,
}

impl Default for Song {
    fn default() -> Self {
        Self {
            song_data: SongData::placeholder(),
            invalid_data: None,
            pending_data: None,
            last_compile_result: None,
        }
    }
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(&self) -> &SongData {
        &self.song_data
    }

    pub fn data_mut(&mut self) -> &mut SongData {
        &mut self.song_data
    }

    /// Queue a file's contents for the next compile. The song is not dirty
    /// afterwards; the file already holds what we would save.
    pub fn load_from_file(&mut self, file_name: &Path) -> io::Result<()> {
        log::info!("loading file {}", file_name.display());
        let data = fs::read_to_string(file_name)?;
        self.pending_data = Some(data);
        self.song_data.set_save_needed(false);
        Ok(())
    }

    /// Queue edited text (e.g. from a source editor) for the next compile.
    pub fn load_from_string(&mut self, data: String) {
        self.pending_data = Some(data);
        self.song_data.set_save_needed(true);
    }

    /// Check and re-parse whatever is outstanding.
    ///
    /// With nothing changed since the last compile, returns the cached
    /// result. Pending text goes through the checker and, on success, through
    /// the parser, replacing the document wholesale; an already parsed
    /// document is only re-checked, never re-parsed.
    pub fn compile(&mut self, checker: &mut dyn SyntaxChecker) -> i32 {
        if !self.song_data.is_save_needed()
            && self.pending_data.is_none()
            && self.invalid_data.is_none()
        {
            log::debug!("no compilation needed");
            return self.last_compile_result.unwrap_or(0);
        }
        match self.pending_data.take() {
            Some(pending) => self.do_compile(pending, checker),
            None => checker.check_syntax(&self.song_data.write_to_string()),
        }
    }

    /// The current text: the serialized document, or the retained unparsed
    /// text while the last compile failed.
    pub fn write_to_string(&self) -> String {
        match &self.invalid_data {
            Some(data) => data.clone(),
            None => self.song_data.write_to_string(),
        }
    }

    /// Save the current text; the song is clean afterwards.
    pub fn write_to_file(&mut self, file_name: &Path) -> io::Result<()> {
        log::info!("opening output file {}", file_name.display());
        fs::write(file_name, self.write_to_string())?;
        self.song_data.set_save_needed(false);
        Ok(())
    }

    fn do_compile(&mut self, data: String, checker: &mut dyn SyntaxChecker) -> i32 {
        let mut res = checker.check_syntax(&data);
        self.last_compile_result = Some(res);
        if res == 0 {
            match parse(&data) {
                Ok(song_data) => self.song_data = song_data,
                Err(err) => {
                    log::error!("failed to parse the file: {err}");
                    res = -1;
                }
            }
        }
        if res > 0 || res == -1 {
            self.clear_song();
            self.invalid_data = Some(data);
            self.song_data.set_save_needed(true);
        } else {
            self.invalid_data = None;
        }
        res
    }

    /// Fall back to the placeholder document; the cursor needs at least one
    /// `BarInfo` to sit on.
    fn clear_song(&mut self) {
        self.song_data = SongData::placeholder();
        self.invalid_data = None;
        self.pending_data = None;
        self.last_compile_result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted checker: pops one preset result per call.
    struct StubChecker {
        results: Vec<i32>,
        calls: usize,
    }

    impl StubChecker {
        fn new(mut results: Vec<i32>) -> Self {
            results.reverse();
            Self { results, calls: 0 }
        }
    }

    impl SyntaxChecker for StubChecker {
        fn check_syntax(&mut self, _source: &str) -> i32 {
            self.calls += 1;
            self.results.pop().unwrap_or(0)
        }
    }

    #[test]
    fn test_compile_parses_pending_text() {
        let mut song = Song::new();
        song.load_from_string("Tempo 120\nCm F\n".to_string());
        let mut checker = StubChecker::new(vec![0]);
        assert_eq!(song.compile(&mut checker), 0);
        assert_eq!(song.data().bar_count(), 1);
        assert_eq!(song.write_to_string(), "Tempo 120\nCm F\n");
    }

    #[test]
    fn test_checker_fault_falls_back_to_placeholder() {
        let mut song = Song::new();
        song.load_from_string("Tempo 120\nCm F\n".to_string());
        let mut checker = StubChecker::new(vec![2]);
        assert_eq!(song.compile(&mut checker), 2);
        // the document is the placeholder but the text is retained
        assert_eq!(song.data().bar_count(), 0);
        assert_eq!(song.write_to_string(), "Tempo 120\nCm F\n");
        assert!(song.data().is_save_needed());
    }

    #[test]
    fn test_parse_fault_maps_to_minus_one() {
        let mut song = Song::new();
        // the checker accepts what our parser rejects
        song.load_from_string("Begin Drum\nTone Snare\n".to_string());
        let mut checker = StubChecker::new(vec![0]);
        assert_eq!(song.compile(&mut checker), -1);
        assert_eq!(song.data().bar_count(), 0);
        assert_eq!(song.write_to_string(), "Begin Drum\nTone Snare\n");
    }

    #[test]
    fn test_unchanged_song_short_circuits() {
        let mut song = Song::new();
        song.load_from_string("Cm\n".to_string());
        let mut checker = StubChecker::new(vec![0, 0]);
        song.compile(&mut checker);
        song.data_mut().set_save_needed(false);
        song.compile(&mut checker);
        assert_eq!(checker.calls, 1);
    }

    #[test]
    fn test_dirty_document_is_rechecked_without_reparse() {
        let mut song = Song::new();
        song.load_from_string("Cm F\n".to_string());
        let mut checker = StubChecker::new(vec![0, 0]);
        song.compile(&mut checker);

        song.data_mut().bar_chords_mut(0).set_chord(0, "G7");
        assert_eq!(song.compile(&mut checker), 0);
        assert_eq!(checker.calls, 2);
        // the edited document survived; compile did not replace it
        assert_eq!(song.data().bar_chords(0).chords()[0].token, "G7");
    }
}
