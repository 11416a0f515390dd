//! Minimal comma-separated value helpers.
//!
//! Quoted fields double embedded quotes and may span lines.

const QUOTE: char = '"';
const DELIMITER: char = ',';

/// Always wrap `value` in quotes
#[must_use]
pub fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(QUOTE);
    for c in value.chars() {
        if c == QUOTE {
            out.push(QUOTE);
        }
        out.push(c);
    }
    out.push(QUOTE);
    out
}

/// Quote `value` only when it contains a delimiter, quote or line break
#[must_use]
pub fn field(value: &str) -> String {
    if value.contains([DELIMITER, QUOTE, '\n', '\r']) {
        quoted(value)
    } else {
        value.to_string()
    }
}

/// Split CSV text into records of fields.
///
/// Blank lines are skipped. A trailing `\r` before a line break is dropped.
#[must_use]
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    // Distinguishes an empty line from a line holding one empty field
    let mut field_started = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    current.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
            continue;
        }

        match c {
            QUOTE => {
                in_quotes = true;
                field_started = true;
            }
            DELIMITER => {
                record.push(std::mem::take(&mut current));
                field_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                if field_started || !current.is_empty() || !record.is_empty() {
                    record.push(std::mem::take(&mut current));
                    records.push(std::mem::take(&mut record));
                }
                field_started = false;
            }
            other => {
                current.push(other);
                field_started = true;
            }
        }
    }

    if field_started || !current.is_empty() || !record.is_empty() {
        record.push(current);
        records.push(record);
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_doubles_quotes() {
        assert_eq!(quoted("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quoted(""), "\"\"");
    }

    #[test]
    fn test_field_quotes_when_needed() {
        assert_eq!(field("plain"), "plain");
        assert_eq!(field("a,b"), "\"a,b\"");
        assert_eq!(field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_parse_records() {
        let text = "id,name,notes\r\nPAT-1,\"Lovelace, Ada\",\"said \"\"hi\"\"\"\n\nPAT-2,Bob,\"multi\nline\"\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], vec!["id", "name", "notes"]);
        assert_eq!(records[1], vec!["PAT-1", "Lovelace, Ada", "said \"hi\""]);
        assert_eq!(records[2], vec!["PAT-2", "Bob", "multi\nline"]);
    }

    #[test]
    fn test_parse_records_keeps_empty_fields() {
        let records = parse_records("a,,c\n\"\"\n,\n");
        assert_eq!(records[0], vec!["a", "", "c"]);
        assert_eq!(records[1], vec![""]);
        assert_eq!(records[2], vec!["", ""]);
    }

    #[test]
    fn test_parse_records_without_final_newline() {
        let records = parse_records("x,y");
        assert_eq!(records, vec![vec!["x".to_string(), "y".to_string()]]);
    }
}
