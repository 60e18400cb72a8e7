//! CSV codec
//!
//! A small RFC 4180 style scanner. The final row is always emitted, so a
//! trailing newline shows up as one empty row and survives the round trip.

use mimic_core::{FormatLabel, RedactionResult};
use mimic_redact::RedactionContext;

use crate::{CodecError, Result};

pub type Row = Vec<String>;

pub fn parse(text: &str) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CodecError::Csv("unterminated quoted field".to_string()));
    }

    row.push(field);
    rows.push(row);
    Ok(rows)
}

fn quote(field: &str) -> String {
    if field.contains(['"', '\r', '\n', ',']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn stringify(rows: &[Row]) -> String {
    rows.iter()
        .map(|row| row.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// At least two non-blank rows, all with the same column count of two or more.
pub fn is_likely_csv(text: &str) -> bool {
    let Ok(rows) = parse(text) else {
        return false;
    };
    let meaningful: Vec<&Row> = rows.iter().filter(|row| !is_blank(row)).collect();
    if meaningful.len() < 2 {
        return false;
    }
    let columns = meaningful[0].len();
    columns >= 2 && meaningful.iter().all(|row| row.len() == columns)
}

/// Positional name used when there is no header row, 1-based.
pub fn column_alias(index: usize) -> String {
    format!("column{}", index + 1)
}

fn is_protected_column(name: &str, index: usize, ctx: &RedactionContext<'_>) -> bool {
    (!name.trim().is_empty() && ctx.is_protected(name)) || ctx.is_protected(&column_alias(index))
}

pub fn redact_rows(rows: &[Row], ctx: &RedactionContext<'_>) -> Vec<Row> {
    let has_header = ctx.settings.csv_has_header;
    let header = if has_header { rows.first() } else { None };
    let start = usize::from(has_header);

    let mut out = Vec::with_capacity(rows.len());
    if let Some(header) = header {
        out.push(header.clone());
    }

    for row in rows.iter().skip(start) {
        if is_blank(row) {
            out.push(row.clone());
            continue;
        }
        let redacted = row
            .iter()
            .enumerate()
            .map(|(index, cell)| {
                let name = header
                    .and_then(|h| h.get(index))
                    .map(String::as_str)
                    .unwrap_or("");
                if is_protected_column(name, index, ctx) {
                    cell.clone()
                } else {
                    ctx.redact_primitive(cell).into_text()
                }
            })
            .collect();
        out.push(redacted);
    }
    out
}

pub fn redact_body(text: &str, ctx: &RedactionContext<'_>) -> Result<String> {
    let rows = parse(text)?;
    if rows.iter().all(|row| row.is_empty()) {
        return Err(CodecError::Csv("no rows".to_string()));
    }
    Ok(stringify(&redact_rows(&rows, ctx)))
}

pub fn redact(text: &str, ctx: &RedactionContext<'_>) -> Result<RedactionResult> {
    let output = redact_body(text, ctx)?;
    Ok(RedactionResult::new(
        text,
        output,
        FormatLabel::csv(ctx.settings.csv_has_header),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{Dictionary, RedactionSettings};

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_quotes_and_line_endings() {
        let parsed = parse("a,\"b,\"\"c\"\"\"\r\n\"multi\nline\",x\n").unwrap();
        assert_eq!(
            parsed,
            rows(&[&["a", "b,\"c\""], &["multi\nline", "x"], &[""]])
        );
    }

    #[test]
    fn test_unterminated_quote_is_an_error() {
        assert!(parse("a,\"open\nb,c").is_err());
    }

    #[test]
    fn test_stringify_quotes_when_needed() {
        let out = stringify(&rows(&[&["plain", "with,comma", "say \"hi\""], &["x", "", "y"]]));
        assert_eq!(out, "plain,\"with,comma\",\"say \"\"hi\"\"\"\nx,,y");
    }

    #[test]
    fn test_is_likely_csv() {
        assert!(is_likely_csv("name,age\nAlice,30\n"));
        assert!(!is_likely_csv("just one line, here"));
        assert!(!is_likely_csv("a,b\nc"));
        assert!(!is_likely_csv("single\ncolumn"));
    }

    #[test]
    fn test_scenario_protected_column() {
        let settings = RedactionSettings::default().with_protected_fields(["name"]);
        let dictionary = Dictionary::from_words(["bob", "eve"]);
        let ctx = RedactionContext::new(&settings, &dictionary);

        let result = redact("name,age\nAlice,30\n", &ctx).unwrap();
        assert_eq!(result.format, FormatLabel::CsvWithHeader);
        let lines: Vec<_> = result.output.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "name,age");
        let cells: Vec<_> = lines[1].split(',').collect();
        assert_eq!(cells[0], "Alice");
        assert_eq!(cells[1].len(), 2);
        assert!(cells[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(lines[2], "");
    }

    #[test]
    fn test_headerless_uses_column_alias() {
        let mut settings = RedactionSettings::default().with_protected_fields(["column2"]);
        settings.csv_has_header = false;
        let dictionary = Dictionary::from_words(["bob", "eve"]);
        let ctx = RedactionContext::new(&settings, &dictionary);

        let result = redact("abc,keep\n123,same", &ctx).unwrap();
        assert_eq!(result.format, FormatLabel::CsvNoHeader);
        let out = parse(&result.output).unwrap();
        assert_eq!(out[0][1], "keep");
        assert_eq!(out[1][1], "same");
        assert_eq!(out[1][0].len(), 3);
    }

    #[test]
    fn test_blank_rows_pass_through() {
        let settings = RedactionSettings::default();
        let dictionary = Dictionary::default();
        let ctx = RedactionContext::new(&settings, &dictionary);
        let out = redact_body("h1,h2\n , \n1,2", &ctx).unwrap();
        assert!(out.starts_with("h1,h2\n , \n"));
    }
}
