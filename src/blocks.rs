//! Block scanners: `Begin`/`End`, `MSet`, and `If` spans.
//!
//! Each scanner consumes raw lines from the reader until its terminator and
//! returns the full span, opening and closing lines included, unmodified.

use crate::error::{BlockKind, ParseError};
use crate::reader::LineReader;

fn first_key(line: &str) -> Option<String> {
    line.split_whitespace().next().map(|t| t.to_uppercase())
}

/// Scan a `Begin ... End` span, tracking nesting depth.
///
/// Every line whose first token is `BEGIN` deepens the block; `END` closes
/// one level. The scan stops when the depth returns to zero.
pub fn begin_block(reader: &mut LineReader, first: &str) -> Result<Vec<String>, ParseError> {
    let mut depth = 1;
    let mut result = vec![first.to_string()];
    loop {
        let line = match reader.next_line() {
            Some(line) => line,
            None => {
                return Err(ParseError::UnterminatedBlock {
                    kind: BlockKind::Begin,
                    line: reader.line_number(),
                })
            }
        };
        match first_key(line).as_deref() {
            Some("BEGIN") => depth += 1,
            Some("END") => depth -= 1,
            _ => {}
        }
        result.push(line.to_string());
        if depth == 0 {
            break;
        }
    }
    Ok(result)
}

/// Scan an `MSet <name> ... MSetEnd` span.
///
/// The opening line must carry the macro name. Both `MSetEnd` and `EndMSet`
/// close the span; nesting is not tracked.
pub fn mset_block(reader: &mut LineReader, first: &str) -> Result<Vec<String>, ParseError> {
    if first.split_whitespace().count() < 2 {
        return Err(ParseError::MalformedDirective {
            line: reader.line_number(),
            message: "use: MSet VARIABLE_NAME <lines> MSetEnd".to_string(),
        });
    }
    let mut result = vec![first.to_string()];
    loop {
        let line = match reader.next_line() {
            Some(line) => line,
            None => {
                return Err(ParseError::UnterminatedBlock {
                    kind: BlockKind::MacroSet,
                    line: reader.line_number(),
                })
            }
        };
        let key = first_key(line);
        result.push(line.to_string());
        if matches!(key.as_deref(), Some("MSETEND") | Some("ENDMSET")) {
            break;
        }
    }
    Ok(result)
}

/// Scan an `If ... EndIf` span, tracking nesting depth.
///
/// `IF` deepens, `ENDIF` or `IFEND` closes one level.
pub fn if_block(reader: &mut LineReader, first: &str) -> Result<Vec<String>, ParseError> {
    let mut depth = 1;
    let mut result = vec![first.to_string()];
    loop {
        let line = match reader.next_line() {
            Some(line) => line,
            None => {
                return Err(ParseError::UnterminatedBlock {
                    kind: BlockKind::Conditional,
                    line: reader.line_number(),
                })
            }
        };
        match first_key(line).as_deref() {
            Some("IF") => depth += 1,
            Some("ENDIF") | Some("IFEND") => depth -= 1,
            _ => {}
        }
        result.push(line.to_string());
        if depth == 0 {
            break;
        }
    }
    Ok(result)
}

/// Reshape an understood block span into `[opener, body, closer]`,
/// flattening the multi-line body into one field.
pub fn understood_block_fields(span: Vec<String>) -> Vec<String> {
    let opener = span.first().cloned().unwrap_or_default();
    let closer = span.last().cloned().unwrap_or_default();
    let body = if span.len() > 2 {
        span[1..span.len() - 1].concat()
    } else {
        String::new()
    };
    vec![opener, body, closer]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_block<F>(source: &str, scan: F) -> Result<Vec<String>, ParseError>
    where
        F: FnOnce(&mut LineReader, &str) -> Result<Vec<String>, ParseError>,
    {
        let mut reader = LineReader::new(source);
        let first = reader.next_line().unwrap();
        scan(&mut reader, first)
    }

    #[test]
    fn test_begin_block_simple() {
        let span = read_block("Begin Drum\nTone Snare\nEnd\n", begin_block).unwrap();
        assert_eq!(span, vec!["Begin Drum\n", "Tone Snare\n", "End\n"]);
    }

    #[test]
    fn test_begin_block_nested() {
        let source = "Begin Doc\nbegin inner\ntext\nend\nEnd\nTempo 100\n";
        let mut reader = LineReader::new(source);
        let first = reader.next_line().unwrap();
        let span = begin_block(&mut reader, first).unwrap();
        assert_eq!(span.len(), 5);
        assert_eq!(span.last().unwrap(), "End\n");
        // the line after the block is still available
        assert_eq!(reader.next_line(), Some("Tempo 100\n"));
    }

    #[test]
    fn test_begin_block_unterminated() {
        let err = read_block("Begin Drum\nTone Snare\n", begin_block).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedBlock {
                kind: BlockKind::Begin,
                ..
            }
        ));
    }

    #[test]
    fn test_mset_block_both_closers() {
        let span = read_block("MSet Intro\nGroove Swing\nMSetEnd\n", mset_block).unwrap();
        assert_eq!(span.len(), 3);
        let span = read_block("MSet Intro\nGroove Swing\nEndMSet\n", mset_block).unwrap();
        assert_eq!(span.len(), 3);
    }

    #[test]
    fn test_mset_block_requires_name() {
        let err = read_block("MSet\nMSetEnd\n", mset_block).unwrap_err();
        assert!(matches!(err, ParseError::MalformedDirective { .. }));
    }

    #[test]
    fn test_if_block_nested_and_alternate_closer() {
        let source = "If Def Swing\nIf Def More\nIfEnd\nGroove Swing\nEndIf\n";
        let span = read_block(source, if_block).unwrap();
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn test_if_block_unterminated() {
        let err = read_block("If Def Swing\nGroove Swing\n", if_block).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnterminatedBlock {
                kind: BlockKind::Conditional,
                ..
            }
        ));
    }

    #[test]
    fn test_understood_block_flattens_body() {
        let span = vec![
            "Begin Doc\n".to_string(),
            "line one\n".to_string(),
            "line two\n".to_string(),
            "End\n".to_string(),
        ];
        let fields = understood_block_fields(span);
        assert_eq!(fields, vec!["Begin Doc\n", "line one\nline two\n", "End\n"]);
    }
}
