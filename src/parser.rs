//! # Parser
//!
//! Turns chart source text into a [`SongData`] document, bar by bar.
//!
//! Each entry is classified by its first whitespace-delimited token,
//! upper-cased. Commands the editor understands are tokenized into fields
//! that keep every byte of inter-token text; block constructs are captured
//! as whole spans; everything else is stored verbatim. Any line that is none
//! of these is a chord data line, which closes the current bar.
//!
//! The tokenizers never normalize: concatenating the stored fields of every
//! line reproduces the input exactly, which is what lets the editor write an
//! untouched document back byte-for-byte.
//!
//! One fault fails the whole parse; there is no partial document.

use crate::actions::{Action, MACRO_SIGIL, SIMPLE_FUNCS, TRACK_CLASSES, UNDERSTOOD_BLOCKS};
use crate::blocks;
use crate::error::ParseError;
use crate::reader::LineReader;
use crate::song::bar_chords::{BarChords, ChordEntry};
use crate::song::bar_info::{BarInfo, Line};
use crate::song::song_data::SongData;

/// Parse a chart source into a document.
pub fn parse(source: &str) -> Result<SongData, ParseError> {
    log::trace!("parsing {} bytes of chart source", source.len());
    let mut reader = LineReader::new(source);
    let mut song_bar_info: Vec<BarInfo> = Vec::new();
    let mut song_bar_chords: Vec<BarChords> = Vec::new();
    let mut bar_info = BarInfo::new();
    let mut bar_chords = BarChords::new();
    let mut beats_per_bar = 4;

    while let Some(curline) = reader.next_line() {
        // empty line
        if curline.trim().is_empty() {
            bar_info.add_line(Line::unknown(vec![curline.to_string()]));
            continue;
        }

        let Some(first_token) = curline.split_whitespace().next() else {
            continue;
        };

        // line beginning with a macro invocation
        if first_token.starts_with(MACRO_SIGIL) {
            let span = reader.wrapped_line(curline)?;
            bar_info.add_line(Line::unknown(span));
            continue;
        }

        let action = first_token.to_uppercase();

        // Begin ... End block
        if action == "BEGIN" {
            let keyword = match curline.split_whitespace().nth(1) {
                Some(word) => word.to_uppercase(),
                None => {
                    return Err(ParseError::MalformedDirective {
                        line: reader.line_number(),
                        message: "use: Begin BLOCK_NAME <lines> End".to_string(),
                    })
                }
            };
            let mut span = blocks::begin_block(&mut reader, curline)?;
            if UNDERSTOOD_BLOCKS.contains(&keyword.as_str()) {
                span = blocks::understood_block_fields(span);
            }
            bar_info.add_line(Line::new(Action::Block(keyword), span));
            continue;
        }

        // MSet block
        if action == "MSET" {
            let span = blocks::mset_block(&mut reader, curline)?;
            bar_info.add_line(Line::unknown(span));
            continue;
        }

        // If - EndIf block
        if action == "IF" {
            let span = blocks::if_block(&mut reader, curline)?;
            bar_info.add_line(Line::unknown(span));
            continue;
        }

        // recognized commands get structured fields
        if let Some(tag) = Action::recognized(&action) {
            let (code, comment) = reader.wrapped_line_joined(curline)?;
            let mut fields = match tag {
                Action::Author => tokenize_fields(&code, 1),
                Action::Repeat => vec![code],
                _ => tokenize_fields(&code, 2),
            };
            fields.push(comment);
            if tag == Action::Time {
                if let Some(beats) = fields.get(2).and_then(|f| f.trim().parse().ok()) {
                    beats_per_bar = beats;
                }
            }
            bar_info.add_line(Line::new(tag, fields));
            continue;
        }

        // commands with no fields of interest, stored verbatim
        if SIMPLE_FUNCS.contains(&action.as_str()) {
            let span = reader.wrapped_line(curline)?;
            bar_info.add_line(Line::unknown(span));
            continue;
        }

        // per-track command, e.g. `Bass Volume mp` or `Drum-Snare Sequence ...`
        let trk_class = action.split('-').next().unwrap_or_default();
        if TRACK_CLASSES.contains(&trk_class) {
            let parse_seq = curline
                .split_whitespace()
                .nth(1)
                .is_some_and(|word| word.eq_ignore_ascii_case("SEQUENCE"));
            let mut span = reader.wrapped_line(curline)?;
            if parse_seq {
                // a sequence can span lines; keep reading until the {}s match
                loop {
                    let joined = span.concat();
                    if joined.matches('{').count() == joined.matches('}').count() {
                        break;
                    }
                    let next = match reader.next_line() {
                        Some(line) => line,
                        None => {
                            return Err(ParseError::UnbalancedSoloBraces {
                                line: reader.line_number(),
                            })
                        }
                    };
                    span.extend(reader.wrapped_line(next)?);
                }
            }
            bar_info.add_line(Line::unknown(span));
            continue;
        }

        let (code, comment) = reader.wrapped_line_joined(curline)?;

        if code.replace("\\\n", "").trim().is_empty() {
            // a comment or an empty wrapped line
            let tag = if comment.trim().is_empty() {
                Action::Unknown
            } else {
                Action::Remark
            };
            bar_info.add_line(Line::new(tag, vec![code, comment]));
            continue;
        }

        // gotta be a chord data line

        // an optional bar number may lead the line; a number on a line by
        // itself is allowed and closes no bar
        let mut rest = code.as_str();
        let mut before_number = String::new();
        if action.chars().all(|c| c.is_ascii_digit()) {
            let stripped = rest.trim_start();
            before_number = rest[..rest.len() - stripped.len()].to_string();
            let number_str = stripped.split_whitespace().next().unwrap_or_default();
            bar_chords.set_number(Some(number_str.parse().unwrap_or(u32::MAX)));
            rest = &stripped[number_str.len()..];
            if rest.trim().is_empty() {
                bar_info.add_line(Line::unknown(vec![format!("{code}{comment}")]));
                bar_chords.set_number(None);
                continue;
            }
        }

        let (after_number, mut entries) = scan_chord_tokens(rest, reader.line_number())?;
        if entries.is_empty() {
            // nothing but bracketed spans and spacing; not a bar either
            bar_info.add_line(Line::unknown(vec![format!("{code}{comment}")]));
            bar_chords.set_number(None);
            continue;
        }

        // the trailing text of the last chord can include the line
        // terminator; move it to eol so a chord edit cannot delete it
        let mut eol = comment;
        if let Some(last) = entries.last_mut() {
            eol = format!("{}{}", last.trailing, eol);
            last.trailing.clear();
        }

        bar_chords.set_before_number(before_number);
        bar_chords.set_after_number(after_number);
        bar_chords.set_eol(eol);
        bar_chords.set_chords(entries);

        song_bar_info.push(bar_info);
        song_bar_chords.push(bar_chords);
        bar_info = BarInfo::new();
        bar_chords = BarChords::new();
    }

    // song_bar_info always has one element more than song_bar_chords
    song_bar_info.push(bar_info);
    Ok(SongData::new(song_bar_info, song_bar_chords, beats_per_bar))
}

/// Split a chord data line into the leading inter-token text and the list of
/// `(token, trailing text)` chord entries.
///
/// Two independent depth counters exclude solo `{}` and lyric `[]` spans
/// from tokenization; while either is open, every character is inter-token
/// text. Whitespace, `\`, digits, and the repeat-count marker `*` are
/// inter-token text at any depth, so bare repeat counts and bar numbers
/// never form tokens of their own.
fn scan_chord_tokens(
    code: &str,
    line_number: usize,
) -> Result<(String, Vec<ChordEntry>), ParseError> {
    let chars: Vec<char> = code.chars().collect();
    let mut after_number = String::new();
    let mut entries: Vec<ChordEntry> = Vec::new();
    let mut pending: Option<String> = None;
    let mut solo_depth = 0u32;
    let mut lyric_depth = 0u32;
    let mut i = 0;
    loop {
        let mut between = String::new();
        while i < chars.len() {
            let ch = chars[i];
            match ch {
                '{' => solo_depth += 1,
                '[' => lyric_depth += 1,
                '}' => {
                    if solo_depth == 0 {
                        return Err(ParseError::MismatchedSoloBraces { line: line_number });
                    }
                    solo_depth -= 1;
                }
                ']' => {
                    if lyric_depth == 0 {
                        return Err(ParseError::MismatchedLyricBrackets { line: line_number });
                    }
                    lyric_depth -= 1;
                }
                '*' | '\t' | '\n' | '\\' | ' ' | '0'..='9' => {}
                _ if solo_depth == 0 && lyric_depth == 0 => break, // chord begins
                _ => {}
            }
            between.push(ch);
            i += 1;
        }
        let at_end = i == chars.len();
        if at_end {
            if solo_depth != 0 {
                return Err(ParseError::MismatchedSoloBraces { line: line_number });
            }
            if lyric_depth != 0 {
                return Err(ParseError::MismatchedLyricBrackets { line: line_number });
            }
        }
        match pending.take() {
            None => after_number = between,
            Some(token) => entries.push(ChordEntry::new(&token, &between)),
        }
        if at_end {
            break;
        }
        // find the end of the chord
        let token_start = i;
        while i < chars.len()
            && !matches!(chars[i], '{' | '}' | '[' | ']' | '*' | '\t' | '\n' | '\\' | ' ')
        {
            i += 1;
        }
        pending = Some(chars[token_start..i].iter().collect());
    }
    Ok((after_number, entries))
}

/// Split a joined line into alternating tokens and separator runs, keeping
/// every byte.
///
/// After `limit` tokens have been read, the remainder of the line is
/// appended verbatim as one final field, further tokens included.
fn tokenize_fields(line: &str, limit: usize) -> Vec<String> {
    const SEPARATORS: &[char] = &['\t', '\n', '\\', ' '];
    let mut fields = Vec::new();
    let mut count = 0;
    let mut rest = line;
    let mut read_token = true;
    while !rest.is_empty() {
        if read_token {
            let end = rest.find(SEPARATORS).unwrap_or(rest.len());
            fields.push(rest[..end].to_string());
            count += 1;
            if count == limit {
                fields.push(rest[end..].to_string());
                break;
            }
            rest = &rest[end..];
        } else {
            let end = rest.find(|c| !SEPARATORS.contains(&c)).unwrap_or(rest.len());
            fields.push(rest[..end].to_string());
            rest = &rest[end..];
        }
        read_token = !read_token;
    }
    fields
}
