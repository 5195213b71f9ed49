use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;
use serde_json::Value;
use tracing::warn;

use crate::db;

/// Flat export: one `(title, body)` CSV row per stored entry, both
/// sites concatenated in the order the connections are given.
pub fn export_csv(conns: &[Connection], out: &Path) -> Result<usize> {
    let mut rows = Vec::new();
    for conn in conns {
        rows.extend(db::fetch_title_body(conn)?);
    }
    std::fs::write(out, csv_document(&rows))?;
    Ok(rows.len())
}

/// Nested export: `title -> { contents, abstract }` JSON object over
/// all entries. Duplicate titles are warned about and the later record
/// overwrites the earlier one.
pub fn export_json(conns: &[Connection], out: &Path) -> Result<usize> {
    let mut rows = Vec::new();
    for conn in conns {
        rows.extend(db::fetch_title_abstract_contents(conn)?);
    }
    let doc = json_document(&rows);
    let count = doc.as_object().map_or(0, |o| o.len());
    std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
    Ok(count)
}

fn csv_document(rows: &[(String, String)]) -> String {
    let mut out = String::new();
    for (title, body) in rows {
        out.push_str(&csv_field(title));
        out.push(',');
        out.push_str(&csv_field(body));
        out.push('\n');
    }
    out
}

/// Minimal RFC 4180 quoting: fields containing a comma, quote, or
/// newline are wrapped in quotes with inner quotes doubled.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn json_document(rows: &[db::NestedExportRow]) -> Value {
    let mut map = serde_json::Map::new();
    for row in rows {
        if map.contains_key(&row.title) {
            warn!("duplicated title: {}", row.title);
        }
        let contents: Value = serde_json::from_str(&row.contents)
            .unwrap_or_else(|_| Value::Array(Vec::new()));
        map.insert(
            row.title.clone(),
            serde_json::json!({
                "contents": contents,
                "abstract": row.abstract_text.trim(),
            }),
        );
    }
    Value::Object(map)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(title: &str, abstract_text: &str, contents: &str) -> db::NestedExportRow {
        db::NestedExportRow {
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn csv_plain_fields_unquoted() {
        let rows = vec![("Abduction".to_string(), "A body.".to_string())];
        assert_eq!(csv_document(&rows), "Abduction,A body.\n");
    }

    #[test]
    fn csv_quotes_commas_and_newlines() {
        let rows = vec![(
            "Life, and Works".to_string(),
            "line one\nline \"two\"".to_string(),
        )];
        assert_eq!(
            csv_document(&rows),
            "\"Life, and Works\",\"line one\nline \"\"two\"\"\"\n"
        );
    }

    #[test]
    fn json_nests_contents_and_trims_abstract() {
        let rows = vec![nested(
            "Abduction",
            "  An abstract.  ",
            r#"[{"content":"1. One","subcontent":[]}]"#,
        )];
        let doc = json_document(&rows);
        let entry = &doc["Abduction"];
        assert_eq!(entry["abstract"], "An abstract.");
        assert_eq!(entry["contents"][0]["content"], "1. One");
    }

    #[test]
    fn json_duplicate_title_keeps_later_record() {
        let rows = vec![
            nested("Same", "first", "[]"),
            nested("Same", "second", "[]"),
        ];
        let doc = json_document(&rows);
        assert_eq!(doc.as_object().unwrap().len(), 1);
        assert_eq!(doc["Same"]["abstract"], "second");
    }

    #[test]
    fn json_tolerates_malformed_contents() {
        let rows = vec![nested("Broken", "a", "not json")];
        let doc = json_document(&rows);
        assert_eq!(doc["Broken"]["contents"], Value::Array(Vec::new()));
    }
}
