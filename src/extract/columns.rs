//! Attribute table for table-family objects.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::comment::strip_comments;
use super::ddl::split_name;
use crate::descriptor::{TableRows, COLUMN_HEADER};
use crate::error::{SqlDocError, SqlDocResult};
use crate::parser::{parse_columns, DdlColumn};

/// Start of the CREATE ... TABLE statement handed to the column parser.
static CREATE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bcreate\s+(?:[a-z]+\s+)*?table\b").unwrap());

/// `COMMENT ON COLUMN path IS '...'`, quotes doubled inside the literal.
static COLUMN_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)\bcomment\s+on\s+column\s+((?:(?:"[^"]+"|[\w$]+)\s*\.\s*)+(?:"[^"]+"|[\w$]+))\s+is\s+'((?:[^']|'')*)'"#,
    )
    .unwrap()
});

/// Build `[name, type, comment]` rows for a table, header first.
pub fn extract_columns(text: &str, schema: Option<&str>, table: &str) -> SqlDocResult<TableRows> {
    let stripped = strip_comments(text);
    let start = CREATE_TABLE
        .find(&stripped)
        .map(|m| m.start())
        .ok_or_else(|| SqlDocError::ddl(0, "no CREATE TABLE statement"))?;

    let columns = parse_columns(&stripped[start..])?;
    let comments = column_comments(&stripped, schema, table);

    let mut rows = vec![COLUMN_HEADER.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    for column in &columns {
        let name = column.name.to_lowercase();
        let comment = comments.get(&name).cloned().unwrap_or_default();
        rows.push(vec![name, decorate_type(column).to_lowercase(), comment]);
    }

    Ok(TableRows::new(rows))
}

/// Type with its parameters: `(precision,scale)`, else `(length)`, else
/// the bare type. An array suffix stays at the end.
pub fn decorate_type(column: &DdlColumn) -> String {
    let (base, array) = match column.data_type.strip_suffix("[]") {
        Some(base) => (base, "[]"),
        None => (column.data_type.as_str(), ""),
    };

    match (column.precision, column.scale, column.length) {
        (Some(p), Some(s), _) => format!("{}({},{}){}", base, p, s, array),
        (_, _, Some(len)) => format!("{}({}){}", base, len, array),
        _ => column.data_type.clone(),
    }
}

/// Column comments for one table, keyed by lower-case column name. A later
/// COMMENT ON replaces an earlier one, as it would in the database.
fn column_comments(text: &str, schema: Option<&str>, table: &str) -> HashMap<String, String> {
    let mut comments = HashMap::new();

    for caps in COLUMN_COMMENT.captures_iter(text) {
        let (Some(path), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let parts = split_name(path.as_str());
        let column = match parts.as_slice() {
            [.., s, t, c] if Some(s.as_str()) == schema && t == table => c,
            [t, c] if t == table => c,
            _ => continue,
        };
        comments.insert(column.clone(), body.as_str().replace("''", "'"));
    }

    comments
}
