//! CSV text to header-keyed rows
//!
//! The sheet export is read with a real RFC 4180 grammar: quoted cells may
//! carry commas, doubled quotes and line breaks. A naive comma split would
//! shift every column after such a cell, so sheets with free-text columns
//! (addresses, notes) parse differently than a split-on-comma reader would.

use crate::error::SyncError;
use crate::record::RawRow;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

/// Parse CSV text into rows keyed by the header line
///
/// - Header and cell values are trimmed, and a pair of surrounding double
///   quotes left after trimming is removed.
/// - Short rows are padded with `""`; cells past the last header are dropped.
/// - Blank lines are skipped.
/// - Empty text or a header line alone yields no rows.
/// - A quoted cell left open at end of input is a `ParseError`.
pub fn parse_csv(text: &str) -> Result<Vec<RawRow>, SyncError> {
    let text = text.trim_start_matches('\u{feff}');

    // The reader runs an open quote to end of input, which would fold every
    // later row into one cell
    if let Some(line) = unterminated_quote_line(text) {
        return Err(SyncError::ParseError(format!(
            "line {}: unterminated quoted field",
            line
        )));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SyncError::ParseError(format!("header line: {}", e)))?
        .iter()
        .map(clean_cell)
        .collect();

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    loop {
        let more = reader.read_record(&mut record).map_err(|e| {
            let line = e.position().map(|p| p.line()).unwrap_or_default();
            SyncError::ParseError(format!("line {}: {}", line, e))
        })?;
        if !more {
            break;
        }
        if is_blank_line(&record) {
            continue;
        }

        let mut row = RawRow::with_capacity(headers.len());
        for (index, header) in headers.iter().enumerate() {
            row.insert(header.as_str(), record.get(index).map(clean_cell).unwrap_or_default());
        }
        rows.push(row);
    }

    debug!(columns = headers.len(), rows = rows.len(), "Parsed CSV export");
    Ok(rows)
}

/// Line where a quoted field opens and is never closed
///
/// Follows the reader's rules: a quote opens a quoted field only as the first
/// character of a cell, `""` inside it is an escaped quote, and a quote in
/// the middle of an unquoted cell is literal.
fn unterminated_quote_line(text: &str) -> Option<usize> {
    let mut line = 1;
    let mut open_at: Option<usize> = None;
    let mut cell_start = true;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            line += 1;
        }
        match open_at {
            Some(_) => {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                    } else {
                        open_at = None;
                    }
                }
            }
            None => match c {
                '"' if cell_start => {
                    open_at = Some(line);
                    cell_start = false;
                }
                ',' | '\n' | '\r' => cell_start = true,
                _ => cell_start = false,
            },
        }
    }
    open_at
}

fn is_blank_line(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(str::is_empty)
}

fn clean_cell(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row() {
        let rows = parse_csv("Student Name,Email,Course\nAda Lovelace,ada@x.com,Algorithms\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Student Name"), Some("Ada Lovelace"));
        assert_eq!(rows[0].get("Email"), Some("ada@x.com"));
        assert_eq!(rows[0].get("Course"), Some("Algorithms"));
    }

    #[test]
    fn test_every_row_has_header_key_set() {
        let text = "A,B,C\n1,2,3\n4,5\n6\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.headers().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        }
        assert_eq!(rows[1].get("C"), Some(""));
        assert_eq!(rows[2].get("B"), Some(""));
    }

    #[test]
    fn test_extra_cells_dropped() {
        let rows = parse_csv("A,B\n1,2,3,4\n").unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get("B"), Some("2"));
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(parse_csv("").unwrap().is_empty());
        assert!(parse_csv("A,B,C").unwrap().is_empty());
        assert!(parse_csv("A,B,C\n").unwrap().is_empty());
    }

    #[test]
    fn test_blank_lines_skipped() {
        let rows = parse_csv("A,B\n\n1,2\n   \n3,4\n\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("A"), Some("3"));
    }

    #[test]
    fn test_trims_and_strips_quotes() {
        let rows = parse_csv("\" Name \", Email \n  \"Grace\" ,  g@x.com  \n").unwrap();
        assert_eq!(rows[0].get("Name"), Some("Grace"));
        assert_eq!(rows[0].get("Email"), Some("g@x.com"));
    }

    #[test]
    fn test_quoted_comma_stays_in_cell() {
        let rows = parse_csv("Name,Address,Course\nAda,\"12 Main St, Springfield\",Math\n").unwrap();
        assert_eq!(rows[0].get("Address"), Some("12 Main St, Springfield"));
        assert_eq!(rows[0].get("Course"), Some("Math"));
    }

    #[test]
    fn test_quoted_newline_stays_in_cell() {
        let rows = parse_csv("Name,Notes\nAda,\"line one\nline two\"\nGrace,x\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Notes"), Some("line one\nline two"));
    }

    #[test]
    fn test_crlf_and_bom() {
        let rows = parse_csv("\u{feff}Name,Course\r\nAda,Math\r\n").unwrap();
        assert_eq!(rows[0].get("Name"), Some("Ada"));
        assert_eq!(rows[0].get("Course"), Some("Math"));
    }

    #[test]
    fn test_unterminated_quote_is_parse_error() {
        let err = parse_csv("Name,Notes\nAda,\"unterminated\nGrace,x\nAlan,y\n").unwrap_err();
        assert_eq!(
            err,
            SyncError::ParseError("line 2: unterminated quoted field".to_string())
        );
    }

    #[test]
    fn test_escaped_and_mid_cell_quotes_are_not_open() {
        let rows = parse_csv("Name,Notes\nAda,\"said \"\"hi\"\"\"\nGrace,5\" tall\nAlan,y\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("Notes"), Some("said \"hi\""));
        assert_eq!(rows[1].get("Notes"), Some("5\" tall"));
    }

    #[test]
    fn test_row_of_empty_cells_is_kept() {
        let rows = parse_csv("A,B\n,\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_blank());
    }
}
