//! Logical-line reading: physical lines, `\` continuations, `//` comments.

use crate::error::ParseError;

/// Supplies physical lines of the source text one at a time, with their
/// original terminators, and joins `\`-continued lines into logical ones.
pub struct LineReader<'a> {
    lines: std::str::SplitInclusive<'a, char>,
    line_number: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.split_inclusive('\n'),
            line_number: 0,
        }
    }

    /// Next physical line, terminator included (the final line may lack one).
    pub fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.next()?;
        self.line_number += 1;
        Some(line)
    }

    /// 1-based number of the most recently read physical line.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read the whole continued line (`\` at the end) into a list.
    ///
    /// The lines in the list are unmodified, exactly as in the source.
    /// Fails if the input ends while a continuation is still open.
    pub fn wrapped_line(&mut self, first: &str) -> Result<Vec<String>, ParseError> {
        let mut result = Vec::new();
        let mut current = first.to_string();
        loop {
            result.push(current.clone());
            let trimmed = current.trim();
            if trimmed.is_empty() || !trimmed.ends_with('\\') {
                break;
            }
            current = match self.next_line() {
                Some(line) => line.to_string(),
                None => {
                    return Err(ParseError::UnterminatedContinuation {
                        line: self.line_number,
                    })
                }
            };
        }
        Ok(result)
    }

    /// Read the continued line and join it into a `(code, comment)` pair.
    ///
    /// The first `//` starts the comment, which then absorbs every remaining
    /// character of the logical line verbatim - including later physical
    /// lines - so code never follows a comment. Concatenating the two
    /// strings reproduces exactly what was stored in the source.
    pub fn wrapped_line_joined(&mut self, first: &str) -> Result<(String, String), ParseError> {
        let wrapped = self.wrapped_line(first)?;
        let mut code = String::new();
        let mut comment = String::new();
        for line in &wrapped {
            if !comment.is_empty() {
                comment.push_str(line);
            } else if let Some(pos) = line.find("//") {
                code.push_str(&line[..pos]);
                comment.push_str(&line[pos..]);
            } else {
                code.push_str(line);
            }
        }
        Ok((code, comment))
    }
}
