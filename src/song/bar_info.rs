//! Non-chord content attached to one bar boundary.
//!
//! A `BarInfo` holds the lines that precede a bar's chords (and, for the
//! trailing `BarInfo`, everything after the song's last bar). Each line is a
//! tagged record; the lines whose tag is an event (groove, tempo, repeats)
//! are additionally tracked in an `events` list the editor reorders
//! independently of the full line order.

use serde::Serialize;

use crate::actions::Action;
use crate::song::ChangeFlag;

/// Identity of a line within its `BarInfo`.
///
/// Event bookkeeping works on identity, not value: two lines with equal text
/// are still distinct lines. Ids are never reused within one `BarInfo`, so a
/// stale id simply stops resolving after its line is removed or replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineId(u64);

/// One stored line: an [`Action`] tag plus the ordered text fields.
///
/// Flattening a line concatenates its fields only; the tag (and, for block
/// lines, the block keyword carried inside the tag) never reaches the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    action: Action,
    fields: Vec<String>,
}

impl Line {
    pub fn new(action: Action, fields: Vec<String>) -> Self {
        Self { action, fields }
    }

    pub fn unknown(fields: Vec<String>) -> Self {
        Self::new(Action::Unknown, fields)
    }

    // Default event lines, as inserted by the editor's "add event" menu.

    pub fn groove_event() -> Self {
        Self::new(
            Action::Groove,
            vec!["Groove".into(), " ".into(), "50sRock".into(), "\n".into()],
        )
    }

    pub fn tempo_event() -> Self {
        Self::new(
            Action::Tempo,
            vec!["Tempo".into(), " ".into(), "120".into(), "\n".into()],
        )
    }

    pub fn repeat_event() -> Self {
        Self::new(Action::Repeat, vec!["Repeat".into(), "\n".into()])
    }

    pub fn repeat_ending_event() -> Self {
        Self::new(Action::RepeatEnding, vec!["RepeatEnding".into(), "\n".into()])
    }

    pub fn repeat_end_event() -> Self {
        Self::new(Action::RepeatEnd, vec!["RepeatEnd".into(), "\n".into()])
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The groove name of a `Groove` line, e.g. `Groove Tango` -> `Tango`.
    pub fn groove_value(&self) -> Option<&str> {
        self.fields.get(2).map(String::as_str)
    }

    pub fn set_groove_value(&mut self, groove: &str) {
        if let Some(field) = self.fields.get_mut(2) {
            *field = groove.to_string();
        }
    }

    /// The beats-per-minute field of a `Tempo` line.
    pub fn tempo_value(&self) -> Option<&str> {
        self.fields.get(2).map(String::as_str)
    }

    pub fn set_tempo_value(&mut self, tempo: &str) {
        if let Some(field) = self.fields.get_mut(2) {
            *field = tempo.to_string();
        }
    }

    /// Repeat count of a `RepeatEnd`/`RepeatEnding` line.
    ///
    /// A bare line has no count field and means the default of 2.
    pub fn repeat_count(&self) -> &str {
        if self.fields.len() > 2 {
            &self.fields[2]
        } else {
            "2"
        }
    }

    /// Store the repeat count, dropping the count field entirely when the
    /// count returns to the default of 2 (`RepeatEnd 2` and `RepeatEnd` mean
    /// the same thing, the bare spelling is canonical).
    pub fn set_repeat_count(&mut self, count: u32) {
        if self.fields.len() > 2 {
            if count == 2 {
                self.fields.remove(1);
                self.fields.remove(1);
            } else {
                self.fields[2] = count.to_string();
            }
        } else if count != 2 {
            self.fields.insert(1, " ".to_string());
            self.fields.insert(2, count.to_string());
        }
    }

    /// The author of an `Author` line, surrounding whitespace removed.
    pub fn author_value(&self) -> &str {
        self.fields.get(1).map(|f| f.trim()).unwrap_or("")
    }

    /// The beats-per-bar field of a `Time` line.
    pub fn time_value(&self) -> Option<&str> {
        self.fields.get(2).map(String::as_str)
    }

    /// The body of a documentation block, whitespace-normalized to one line.
    pub fn doc_value(&self) -> String {
        let body = self.fields.get(1).map(String::as_str).unwrap_or("");
        body.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Name and normalized description of a `DefGroove` line.
    pub fn def_groove_value(&self) -> (&str, String) {
        let name = self.fields.get(2).map(String::as_str).unwrap_or("");
        let description = self.fields.get(3).map(String::as_str).unwrap_or("");
        let description = description
            .replace("\\\n", "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        (name, description)
    }

    pub(crate) fn set_last_field(&mut self, value: String) {
        match self.fields.last_mut() {
            Some(field) => *field = value,
            None => self.fields.push(value),
        }
    }

    /// Append the line's source text to `out`.
    pub fn flatten_into(&self, out: &mut String) {
        for field in &self.fields {
            out.push_str(field);
        }
    }
}

/// All non-chord lines before one bar's chords.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BarInfo {
    #[serde(skip)]
    flag: ChangeFlag,
    #[serde(skip)]
    next_id: u64,
    lines: Vec<(LineId, Line)>,
    events: Vec<LineId>,
}

impl BarInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point this bar's change notifications at its owning document.
    pub(crate) fn attach(&mut self, flag: ChangeFlag) {
        self.flag = flag;
    }

    fn alloc_id(&mut self) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a line; event-tagged lines are also registered in the event
    /// list. Returns the line's identity.
    pub fn add_line(&mut self, line: Line) -> LineId {
        let id = self.alloc_id();
        if line.action().is_event() {
            self.events.push(id);
        }
        self.lines.push((id, line));
        id
    }

    /// The same as `add_line` but inserting at the beginning.
    pub fn insert_line(&mut self, line: Line) -> LineId {
        let id = self.alloc_id();
        if line.action().is_event() {
            self.events.insert(0, id);
        }
        self.lines.insert(0, (id, line));
        id
    }

    pub fn lines(&self) -> &[(LineId, Line)] {
        &self.lines
    }

    /// Identities of the event lines, in event order (not line order).
    pub fn events(&self) -> &[LineId] {
        &self.events
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines
            .iter()
            .find(|(line_id, _)| *line_id == id)
            .map(|(_, line)| line)
    }

    pub(crate) fn line_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.lines
            .iter_mut()
            .find(|(line_id, _)| *line_id == id)
            .map(|(_, line)| line)
    }

    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn has_repeat_begin(&self) -> bool {
        self.lookup_action(&Action::Repeat).is_some()
    }

    pub fn has_repeat_end(&self) -> bool {
        self.lookup_action(&Action::RepeatEnding).is_some()
            || self.lookup_action(&Action::RepeatEnd).is_some()
    }

    /// The first `Groove` line, if any.
    pub fn groove_line(&self) -> Option<(LineId, &Line)> {
        self.lookup_action(&Action::Groove)
    }

    /// The first `Tempo` line, if any.
    pub fn tempo_line(&self) -> Option<(LineId, &Line)> {
        self.lookup_action(&Action::Tempo)
    }

    /// Add an event line where the editor expects it: repeat endings open
    /// the bar so they precede whatever else is there, all other events are
    /// appended after the existing lines.
    pub fn add_event(&mut self, line: Line) -> LineId {
        let id = if matches!(line.action(), Action::RepeatEnd | Action::RepeatEnding) {
            self.insert_line(line)
        } else {
            self.add_line(line)
        };
        self.flag.mark();
        id
    }

    /// Remove an event line from both the line list and the event list.
    pub fn remove_event(&mut self, id: LineId) {
        let Some(pos) = self.lines.iter().position(|(line_id, _)| *line_id == id) else {
            return;
        };
        self.lines.remove(pos);
        self.events.retain(|event_id| *event_id != id);
        self.flag.mark();
    }

    /// Replace an event line with a new one at the same position in both
    /// lists. The new line gets a fresh identity; later move operations work
    /// on the returned id, the old one stops resolving.
    pub fn replace_event(&mut self, id: LineId, line: Line) -> Option<LineId> {
        let pos = self.lines.iter().position(|(line_id, _)| *line_id == id)?;
        let new_id = self.alloc_id();
        self.lines[pos] = (new_id, line);
        if let Some(event_pos) = self.events.iter().position(|event_id| *event_id == id) {
            self.events[event_pos] = new_id;
        }
        self.flag.mark();
        Some(new_id)
    }

    /// Swap an event with its predecessor in both lists.
    pub fn move_event_backwards(&mut self, id: LineId) {
        let Some(pos) = self.events.iter().position(|event_id| *event_id == id) else {
            return;
        };
        if pos == 0 {
            return;
        }
        let previous = self.events[pos - 1];
        self.swap_lines(id, previous);
        self.events.swap(pos, pos - 1);
        self.flag.mark();
    }

    /// Swap an event with its successor in both lists.
    pub fn move_event_forwards(&mut self, id: LineId) {
        let Some(pos) = self.events.iter().position(|event_id| *event_id == id) else {
            return;
        };
        if pos + 1 >= self.events.len() {
            return;
        }
        let next = self.events[pos + 1];
        self.swap_lines(id, next);
        self.events.swap(pos, pos + 1);
        self.flag.mark();
    }

    fn swap_lines(&mut self, id1: LineId, id2: LineId) {
        let pos1 = self.lines.iter().position(|(line_id, _)| *line_id == id1);
        let pos2 = self.lines.iter().position(|(line_id, _)| *line_id == id2);
        if let (Some(pos1), Some(pos2)) = (pos1, pos2) {
            self.lines.swap(pos1, pos2);
        }
    }

    fn lookup_action(&self, action: &Action) -> Option<(LineId, &Line)> {
        self.lines
            .iter()
            .find(|(_, line)| line.action() == action)
            .map(|(id, line)| (*id, line))
    }

    /// Append every line's source text to `out`.
    pub fn flatten_into(&self, out: &mut String) {
        for (_, line) in &self.lines {
            line.flatten_into(out);
        }
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

    #[test]
    fn test_add_line_tracks_events() {
        let mut info = BarInfo::new();
        info.add_line(Line::unknown(vec!["Volume mf\n".to_string()]));
        let tempo = info.add_line(Line::tempo_event());
        assert_eq!(info.lines().len(), 2);
        assert_eq!(info.events(), &[tempo]);
        assert!(info.has_events());
    }

    #[test]
    fn test_add_event_repeat_end_opens_the_bar() {
        let mut info = BarInfo::new();
        info.add_line(Line::unknown(vec!["Volume mf\n".to_string()]));
        let groove = info.add_event(Line::groove_event());
        let repeat_end = info.add_event(Line::repeat_end_event());
        // the repeat end was inserted before the opaque line
        assert_eq!(info.lines()[0].0, repeat_end);
        assert_eq!(info.events(), &[repeat_end, groove]);
    }

    #[test]
    fn test_remove_event_keeps_lists_consistent() {
        let mut info = BarInfo::new();
        let groove = info.add_event(Line::groove_event());
        let tempo = info.add_event(Line::tempo_event());
        info.remove_event(groove);
        assert_eq!(info.lines().len(), 1);
        assert_eq!(info.events(), &[tempo]);
        assert!(info.line(groove).is_none());
    }

    #[test]
    fn test_replace_event_updates_both_lists_in_place() {
        let mut info = BarInfo::new();
        info.add_line(Line::unknown(vec!["Volume mf\n".to_string()]));
        let old = info.add_event(Line::groove_event());
        info.add_event(Line::tempo_event());

        let mut line = Line::groove_event();
        line.set_groove_value("Tango");
        let new = info.replace_event(old, line).unwrap();

        assert!(info.line(old).is_none());
        assert_eq!(info.line(new).unwrap().groove_value(), Some("Tango"));
        // same relative position in both lists
        assert_eq!(info.lines()[1].0, new);
        assert_eq!(info.events()[0], new);
    }

    #[test]
    fn test_move_event_swaps_both_lists() {
        let mut info = BarInfo::new();
        let groove = info.add_event(Line::groove_event());
        let tempo = info.add_event(Line::tempo_event());

        info.move_event_forwards(groove);
        assert_eq!(info.events(), &[tempo, groove]);
        assert_eq!(info.lines()[0].0, tempo);

        // already last, nothing to do
        info.move_event_forwards(groove);
        assert_eq!(info.events(), &[tempo, groove]);

        info.move_event_backwards(groove);
        assert_eq!(info.events(), &[groove, tempo]);
        assert_eq!(info.lines()[0].0, groove);
    }

    #[test]
    fn test_moving_a_replaced_event_uses_the_new_identity() {
        let mut info = BarInfo::new();
        let groove = info.add_event(Line::groove_event());
        let tempo = info.add_event(Line::tempo_event());
        let new = info.replace_event(tempo, Line::tempo_event()).unwrap();

        // the old identity no longer moves anything
        info.move_event_backwards(tempo);
        assert_eq!(info.events(), &[groove, new]);

        info.move_event_backwards(new);
        assert_eq!(info.events(), &[new, groove]);
    }

    #[test]
    fn test_repeat_count_editing() {
        let mut line = Line::repeat_end_event();
        assert_eq!(line.repeat_count(), "2");

        line.set_repeat_count(3);
        assert_eq!(line.fields(), &["RepeatEnd", " ", "3", "\n"]);
        assert_eq!(line.repeat_count(), "3");

        // back to the default drops the count field entirely
        line.set_repeat_count(2);
        assert_eq!(line.fields(), &["RepeatEnd", "\n"]);
        assert_eq!(line.repeat_count(), "2");

        // setting the default on a bare line changes nothing
        line.set_repeat_count(2);
        assert_eq!(line.fields(), &["RepeatEnd", "\n"]);
    }

    #[test]
    fn test_value_accessors() {
        let mut groove = Line::groove_event();
        assert_eq!(groove.groove_value(), Some("50sRock"));
        groove.set_groove_value("Swing");
        assert_eq!(groove.groove_value(), Some("Swing"));

        let tempo = Line::tempo_event();
        assert_eq!(tempo.tempo_value(), Some("120"));

        let author = Line::new(
            Action::Author,
            vec!["Author".into(), " Bob van der Poel\n".into(), "".into()],
        );
        assert_eq!(author.author_value(), "Bob van der Poel");

        let doc = Line::new(
            Action::Block("DOC".into()),
            vec![
                "Begin Doc\n".into(),
                "  A swing groove\n  for standards.\n".into(),
                "End\n".into(),
            ],
        );
        assert_eq!(doc.doc_value(), "A swing groove for standards.");

        let def_groove = Line::new(
            Action::DefGroove,
            vec![
                "DefGroove".into(),
                " ".into(),
                "ModernJazz".into(),
                "   ModernJazz with just \\\n  a piano and guitar.\n".into(),
                "".into(),
            ],
        );
        let (name, description) = def_groove.def_groove_value();
        assert_eq!(name, "ModernJazz");
        assert_eq!(description, "ModernJazz with just a piano and guitar.");
    }

    #[test]
    fn test_flatten_skips_the_tag_only() {
        let mut info = BarInfo::new();
        info.add_line(Line::unknown(vec!["Volume mf\n".to_string()]));
        info.add_line(Line::new(
            Action::Block("DRUM".into()),
            vec!["Begin Drum\n".into(), "Tone Snare\n".into(), "End\n".into()],
        ));
        assert_eq!(info.flatten(), "Volume mf\nBegin Drum\nTone Snare\nEnd\n");
    }
}
