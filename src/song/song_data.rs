//! The parsed document: one `BarInfo`/`BarChords` pair per bar.
//!
//! `SongData` owns every bar entity reachable from it. The entities notify
//! the document of mutation through a shared [`ChangeFlag`] handle, which is
//! re-pointed whenever a value is copied in from outside (paste, structured
//! replacement, growth), so a pasted copy never mutates its source.

use serde::Serialize;

use crate::actions::Action;
use crate::song::bar_chords::BarChords;
use crate::song::bar_info::{BarInfo, Line};
use crate::song::ChangeFlag;

/// Title reported when bar 0 carries no title remark.
pub const UNTITLED_SONG_NAME: &str = "Untitled Song";

// how many lines the instrumented form emits per bar in its macro header,
// used for line tracking during playback
const LINES_PER_BAR: usize = 5;
const LINES_ADD: usize = 1;

/// An editable song: `bar_count` chord bars plus one trailing `BarInfo`
/// holding everything after the last bar.
#[derive(Debug, Serialize)]
pub struct SongData {
    #[serde(skip)]
    flag: ChangeFlag,
    bar_info: Vec<BarInfo>,
    bar_chords: Vec<BarChords>,
    beats_per_bar: u32,
}

impl SongData {
    /// Take ownership of freshly parsed bars. `bar_info` must be one longer
    /// than `bar_chords`.
    pub(crate) fn new(
        mut bar_info: Vec<BarInfo>,
        mut bar_chords: Vec<BarChords>,
        beats_per_bar: u32,
    ) -> Self {
        let flag = ChangeFlag::default();
        for info in &mut bar_info {
            info.attach(flag.clone());
        }
        for chords in &mut bar_chords {
            chords.attach(flag.clone());
        }
        Self {
            flag,
            bar_info,
            bar_chords,
            beats_per_bar,
        }
    }

    /// The single-bar placeholder used while no parse has succeeded: one
    /// empty `BarInfo` for the cursor to sit on, zero chord bars.
    pub fn placeholder() -> Self {
        Self::new(vec![BarInfo::new()], Vec::new(), 4)
    }

    pub fn bar_count(&self) -> usize {
        self.bar_chords.len()
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    pub fn is_save_needed(&self) -> bool {
        self.flag.is_set()
    }

    pub fn set_save_needed(&mut self, save_needed: bool) {
        self.flag.set(save_needed);
    }

    pub fn bar_info(&self, bar_num: usize) -> &BarInfo {
        &self.bar_info[bar_num]
    }

    /// Mutable access for in-place event edits; the bar notifies the
    /// document itself.
    pub fn bar_info_mut(&mut self, bar_num: usize) -> &mut BarInfo {
        &mut self.bar_info[bar_num]
    }

    pub fn bar_chords(&self, bar_num: usize) -> &BarChords {
        &self.bar_chords[bar_num]
    }

    /// Mutable access for single-beat chord edits; the bar notifies the
    /// document itself.
    pub fn bar_chords_mut(&mut self, bar_num: usize) -> &mut BarChords {
        &mut self.bar_chords[bar_num]
    }

    /// Replace a bar's info with a copy of `bar_info`.
    pub fn set_bar_info(&mut self, bar_num: usize, bar_info: &BarInfo) {
        let mut copy = bar_info.clone();
        copy.attach(self.flag.clone());
        self.bar_info[bar_num] = copy;
        self.flag.mark();
    }

    /// Replace a bar's chords with a copy of `bar_chords` and fix the bar
    /// label: when the previous bar carries a label, this bar's label is
    /// derived as its successor, whatever the supplied value said.
    pub fn set_bar_chords(&mut self, bar_num: usize, bar_chords: &BarChords) {
        let mut copy = bar_chords.clone();
        copy.attach(self.flag.clone());
        if bar_num > 0 {
            if let Some(previous) = self.bar_chords[bar_num - 1].number() {
                copy.set_number(Some(previous.saturating_add(1)));
            }
        }
        self.bar_chords[bar_num] = copy;
        self.flag.mark();
    }

    /// Grow or shrink the song to `new_bar_count` bars.
    ///
    /// Growth appends default pairs through `set_bar_chords` so that label
    /// renumbering runs for every new bar; shrinking pops pairs off the end.
    pub fn change_bar_count(&mut self, new_bar_count: usize) {
        while self.bar_chords.len() < new_bar_count {
            self.bar_chords.push(BarChords::new());
            self.set_bar_chords(self.bar_chords.len() - 1, &BarChords::new());
            let mut info = BarInfo::new();
            info.attach(self.flag.clone());
            self.bar_info.push(info);
        }
        while self.bar_chords.len() > new_bar_count {
            self.bar_chords.pop();
            self.bar_info.pop();
        }
        self.flag.mark();
    }

    /// The song title, read from bar 0's leading remark line.
    pub fn title(&self) -> String {
        if let Some((_, line)) = self.bar_info[0].lines().first() {
            if *line.action() == Action::Remark {
                if let Some(comment) = line.fields().last() {
                    let comment = comment.trim();
                    let comment = comment.strip_prefix("//").unwrap_or(comment);
                    return comment.trim().to_string();
                }
            }
        }
        UNTITLED_SONG_NAME.to_string()
    }

    /// Store the song title in bar 0's leading remark line, creating the
    /// remark when the song does not start with one.
    pub fn set_title(&mut self, title: &str) {
        let info = &mut self.bar_info[0];
        let first_id = match info.lines().first() {
            Some((id, line)) if *line.action() == Action::Remark => *id,
            _ => info.insert_line(Line::new(Action::Remark, vec![String::new()])),
        };
        if let Some(line) = info.line_mut(first_id) {
            line.set_last_field(format!("// {title}\n"));
        }
        self.flag.mark();
    }

    /// Serialize the song back to source text.
    ///
    /// Byte-identical to the parsed input for every untouched bar.
    pub fn write_to_string(&self) -> String {
        let mut out = String::new();
        for i in 0..self.bar_count() {
            self.bar_info[i].flatten_into(&mut out);
            self.bar_chords[i].flatten_into(&mut out);
        }
        self.bar_info[self.bar_count()].flatten_into(&mut out);
        out
    }

    /// Serialize with playback markers.
    ///
    /// Each bar's chord line is wrapped in a macro between two marker
    /// directives, one naming the bar index and one the current source line;
    /// the song body then invokes the macros in place of the chord lines.
    /// The compiler echoes the markers in encounter order, which lets the
    /// playback side map its position back to a bar and a source line.
    pub fn write_to_string_with_markers(&self) -> String {
        let mut out = String::new();
        let bar_count = self.bar_count();
        for i in 0..bar_count {
            out.push_str(&format!("MSet MacroBar{i}\n"));
            out.push_str(&format!("MidiMark BAR{i}\n"));
            out.push_str("MidiMark $_LineNum\n");
            self.bar_chords[i].flatten_into(&mut out);
            if i == bar_count - 1 {
                out.push_str("MidiMark END\n");
            }
            out.push_str("MSetEnd\n");
        }
        for i in 0..bar_count {
            self.bar_info[i].flatten_into(&mut out);
            out.push_str(&format!("$MacroBar{i}\n"));
        }
        self.bar_info[bar_count].flatten_into(&mut out);
        out
    }

    /// How many lines the instrumented form prepends before the song body,
    /// so compiler-reported line numbers can be mapped back to the source.
    pub fn marker_line_offset(&self) -> usize {
        self.bar_count() * LINES_PER_BAR + LINES_ADD
    }
}
