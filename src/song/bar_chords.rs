//! Chord content of one bar.
//!
//! A `BarChords` keeps every byte of its source line: the text before an
//! optional bar label, the label, the text after it, each chord token with
//! the exact inter-token text that followed it, and the end-of-line string.
//! Concatenating those pieces reproduces the untouched line exactly.

use serde::Serialize;

use crate::song::ChangeFlag;

/// Placeholder token for a beat with no chord change.
pub const NO_CHORD: &str = "/";

/// One chord token plus the exact text (spaces, tabs, comment) that
/// followed it up to the next token or end of line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordEntry {
    pub token: String,
    pub trailing: String,
}

impl ChordEntry {
    pub fn new(token: &str, trailing: &str) -> Self {
        Self {
            token: token.to_string(),
            trailing: trailing.to_string(),
        }
    }
}

/// The chord line of one bar.
#[derive(Debug, Clone, Serialize)]
pub struct BarChords {
    #[serde(skip)]
    flag: ChangeFlag,
    before_number: String,
    number: Option<u32>,
    after_number: String,
    chords: Vec<ChordEntry>,
    eol: String,
}

impl Default for BarChords {
    fn default() -> Self {
        Self {
            flag: ChangeFlag::default(),
            before_number: String::new(),
            number: None,
            after_number: " ".to_string(),
            // one chord is always there
            chords: vec![ChordEntry::new(NO_CHORD, "")],
            eol: "\n".to_string(),
        }
    }
}

impl BarChords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point this bar's change notifications at its owning document.
    pub(crate) fn attach(&mut self, flag: ChangeFlag) {
        self.flag = flag;
    }

    pub fn before_number(&self) -> &str {
        &self.before_number
    }

    pub fn set_before_number(&mut self, before_number: String) {
        self.before_number = before_number;
    }

    pub fn number(&self) -> Option<u32> {
        self.number
    }

    pub fn set_number(&mut self, number: Option<u32>) {
        self.number = number;
    }

    pub fn after_number(&self) -> &str {
        &self.after_number
    }

    pub fn set_after_number(&mut self, after_number: String) {
        self.after_number = after_number;
    }

    pub fn chords(&self) -> &[ChordEntry] {
        &self.chords
    }

    pub fn set_chords(&mut self, chords: Vec<ChordEntry>) {
        self.chords = chords;
    }

    pub fn eol(&self) -> &str {
        &self.eol
    }

    pub fn set_eol(&mut self, eol: String) {
        self.eol = eol;
    }

    /// Store one chord on the given beat; an empty `chord` deletes it.
    ///
    /// Interior beats degrade to the no-chord token instead of vanishing, so
    /// later beats keep their position. Deleting the last beat (when it is
    /// not the only one) removes the entry and moves its trailing text into
    /// `eol`. Setting a beat past the end pads the gap with no-chord
    /// entries. The owner is notified at most once.
    pub fn set_chord(&mut self, beat: usize, chord: &str) {
        if chord.is_empty() && beat >= self.chords.len() {
            return;
        }
        if beat + 1 < self.chords.len() {
            // a chord follows this beat
            let token = if chord.is_empty() { NO_CHORD } else { chord };
            let entry = &mut self.chords[beat];
            if entry.token != token {
                entry.token = token.to_string();
                self.flag.mark();
            }
        } else if chord.is_empty() {
            if beat > 0 {
                // move the trailing string of the removed chord to eol
                let entry = self.chords.remove(beat);
                self.eol = format!("{}{}", entry.trailing, self.eol);
                self.flag.mark();
            } else {
                // the only chord on the line
                let entry = &mut self.chords[beat];
                if entry.token != NO_CHORD {
                    entry.token = NO_CHORD.to_string();
                    self.flag.mark();
                }
            }
        } else if beat < self.chords.len() {
            // replace the existing last chord
            let entry = &mut self.chords[beat];
            if entry.token != chord {
                entry.token = chord.to_string();
                self.flag.mark();
            }
        } else {
            // append, padding skipped beats with no-chord entries
            if let Some(last) = self.chords.last_mut() {
                if last.trailing.len() == last.trailing.trim_end().len() {
                    last.trailing.push(' ');
                }
            }
            while self.chords.len() < beat {
                self.chords.push(ChordEntry::new(NO_CHORD, " "));
            }
            self.chords.push(ChordEntry::new(chord, ""));
            self.flag.mark();
        }
    }

    /// Append this bar's exact source text to `out`.
    pub fn flatten_into(&self, out: &mut String) {
        out.push_str(&self.before_number);
        if let Some(number) = self.number {
            out.push_str(&number.to_string());
        }
        out.push_str(&self.after_number);
        for entry in &self.chords {
            out.push_str(&entry.token);
            out.push_str(&entry.trailing);
        }
        out.push_str(&self.eol);
    }

    pub fn flatten(&self) -> String {
        let mut out = String::new();
        self.flatten_into(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(chords: &[(&str, &str)]) -> BarChords {
        let mut bar = BarChords::new();
        bar.set_chords(
            chords
                .iter()
                .map(|(t, s)| ChordEntry::new(t, s))
                .collect(),
        );
        bar
    }

    fn tokens(bar: &BarChords) -> Vec<(&str, &str)> {
        bar.chords()
            .iter()
            .map(|e| (e.token.as_str(), e.trailing.as_str()))
            .collect()
    }

    #[test]
    fn test_set_chord_replace_degrade_delete_append() {
        let mut bar = bar(&[("CM7", " trail1 "), ("Am", " trail2 ")]);

        bar.set_chord(0, "A");
        assert_eq!(tokens(&bar), vec![("A", " trail1 "), ("Am", " trail2 ")]);

        bar.set_chord(0, "");
        assert_eq!(tokens(&bar), vec![("/", " trail1 "), ("Am", " trail2 ")]);

        // remove the last chord
        assert_eq!(bar.eol(), "\n");
        bar.set_chord(1, "");
        assert_eq!(tokens(&bar), vec![("/", " trail1 ")]);
        assert_eq!(bar.eol(), " trail2 \n");

        bar.set_chord(0, "");
        assert_eq!(tokens(&bar), vec![("/", " trail1 ")]);

        bar.set_chord(3, "BM6");
        assert_eq!(
            tokens(&bar),
            vec![("/", " trail1 "), ("/", " "), ("/", " "), ("BM6", "")]
        );
    }

    #[test]
    fn test_set_chord_interior_and_boundary() {
        let mut bar = bar(&[
            ("CM7", " trail1 "),
            ("Am", " trail2 "),
            ("/", " "),
            ("G", " trail3 "),
        ]);

        bar.set_chord(2, "B");
        assert_eq!(
            tokens(&bar),
            vec![("CM7", " trail1 "), ("Am", " trail2 "), ("B", " "), ("G", " trail3 ")]
        );

        bar.set_chord(0, "");
        assert_eq!(
            tokens(&bar),
            vec![("/", " trail1 "), ("Am", " trail2 "), ("B", " "), ("G", " trail3 ")]
        );

        // remove the last chord
        assert_eq!(bar.eol(), "\n");
        bar.set_chord(3, "");
        assert_eq!(
            tokens(&bar),
            vec![("/", " trail1 "), ("Am", " trail2 "), ("B", " ")]
        );
        assert_eq!(bar.eol(), " trail3 \n");
    }

    #[test]
    fn test_delete_past_end_is_a_no_op() {
        let mut bar = bar(&[("C", " ")]);
        bar.set_chord(5, "");
        assert_eq!(tokens(&bar), vec![("C", " ")]);
    }

    #[test]
    fn test_append_adds_separator_space() {
        // the last entry has no trailing whitespace, so a space is inserted
        // before the appended chord to keep the tokens apart
        let mut bar = bar(&[("C", "")]);
        bar.set_chord(1, "G7");
        assert_eq!(tokens(&bar), vec![("C", " "), ("G7", "")]);
        assert_eq!(bar.flatten(), " C G7\n");
    }

    #[test]
    fn test_default_bar_flattens_to_no_chord_line() {
        let bar = BarChords::new();
        assert_eq!(bar.flatten(), " /\n");
    }

    #[test]
    fn test_flatten_reproduces_source_pieces() {
        let mut bar = bar(&[("Cm", " "), ("F", "\t")]);
        bar.set_before_number("  ".to_string());
        bar.set_number(Some(12));
        bar.set_after_number(" ".to_string());
        bar.set_eol("// end\n".to_string());
        assert_eq!(bar.flatten(), "  12 Cm F\t// end\n");
    }
}
