//! CREATE / ALTER statement recognition.

use std::sync::LazyLock;

use regex::Regex;

use crate::descriptor::ObjectType;

/// Identifier, plain or double-quoted.
const IDENT: &str = r#"(?:"[^"]+"|[\w$]+)"#;

/// Schema-level objects:
/// `CREATE [OR REPLACE|OR ALTER] [modifiers] [EXTERNAL|FOREIGN|MATERIALIZED] [WEB]
/// TABLE|VIEW|FUNCTION|PROCEDURE|PROC|SEQUENCE [IF NOT EXISTS] [schema.]name`
static SCHEMA_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)\b(?:create|alter)\s+(?:or\s+(?:replace|alter)\s+)?(?:(?:global|local|temp|temporary|unlogged|writable|readable)\s+)*(?:(external|foreign|materialized)\s+)?(?:web\s+)?(table|view|function|procedure|proc|sequence)\s+(?:if\s+not\s+exists\s+)?((?:{IDENT}\s*\.\s*)*{IDENT})"
    ))
    .unwrap()
});

/// Cluster and catalog objects, which carry no schema.
static CATALOG_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?is)\b(?:create|alter)\s+(?:or\s+replace\s+)?(?:trusted\s+)?(?:procedural\s+)?(database|role|user|group|tablespace|schema|extension|resource\s+queue|resource\s+group|language|server)\s+(?:if\s+not\s+exists\s+)?({IDENT})"
    ))
    .unwrap()
});

static DISTRIBUTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)\bdistributed\s+(?:by\s*\([^)]*\)|randomly|replicated)").unwrap()
});

static PARTITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)\bpartition\s+by\s*(?:\w+\s*)?\([^)]*\)").unwrap());

static LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\blanguage\s+['"]?(\w+)['"]?"#).unwrap());

/// Opening delimiter of a dollar-quoted body: `$$` or `$tag$`.
static DOLLAR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$").unwrap());

static IDENT_PART: LazyLock<Regex> = LazyLock::new(|| Regex::new(IDENT).unwrap());

/// A recognised statement: type and name parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementMatch {
    pub object_type: ObjectType,
    /// `schema.name` or `name`, lower case, unquoted.
    pub name: String,
    pub schema: Option<String>,
    pub bare_name: Option<String>,
}

/// Match a schema-level CREATE/ALTER statement.
pub fn match_schema_object(body: &str) -> Option<StatementMatch> {
    let caps = SCHEMA_OBJECT.captures(body)?;

    let keyword = caps.get(2)?.as_str();
    let raw_type = match caps.get(1) {
        Some(qualifier) => format!("{} {}", qualifier.as_str(), keyword),
        None => keyword.to_string(),
    };

    let parts = split_name(caps.get(3)?.as_str());
    let (schema, bare) = match parts.as_slice() {
        [.., schema, bare] => (Some(schema.clone()), bare.clone()),
        [bare] => (None, bare.clone()),
        [] => return None,
    };
    let name = match &schema {
        Some(schema) => format!("{}.{}", schema, bare),
        None => bare.clone(),
    };

    Some(StatementMatch {
        object_type: ObjectType::parse(&raw_type),
        name,
        schema,
        bare_name: Some(bare),
    })
}

/// Match a cluster/catalog CREATE/ALTER statement. Schema and bare name are
/// left empty.
pub fn match_catalog_object(body: &str) -> Option<StatementMatch> {
    let caps = CATALOG_OBJECT.captures(body)?;
    Some(StatementMatch {
        object_type: ObjectType::parse(caps.get(1)?.as_str()),
        name: unquote(caps.get(2)?.as_str()),
        schema: None,
        bare_name: None,
    })
}

/// `DISTRIBUTED BY (...)`, `DISTRIBUTED RANDOMLY` or `DISTRIBUTED REPLICATED`.
pub fn distribution_key(body: &str) -> Option<String> {
    DISTRIBUTED.find(body).map(|m| collapse(m.as_str()))
}

/// `PARTITION BY [method] (...)`.
pub fn partition_key(body: &str) -> Option<String> {
    PARTITION.find(body).map(|m| collapse(m.as_str()))
}

/// Language name of a routine. Dollar-quoted bodies are not searched, so a
/// `language` column inside the routine is never taken for the clause.
pub fn language(body: &str) -> Option<String> {
    LANGUAGE
        .captures(&strip_dollar_bodies(body))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// The text with every `$tag$ ... $tag$` body replaced by a space. An
/// unterminated body is kept as written.
fn strip_dollar_bodies(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;

    while let Some(open) = DOLLAR_TAG.find(rest) {
        let after = &rest[open.end()..];
        let Some(close) = after.find(open.as_str()) else {
            break;
        };
        out.push_str(&rest[..open.start()]);
        out.push(' ');
        rest = &after[close + open.as_str().len()..];
    }
    out.push_str(rest);

    out
}

/// Split a dotted name into lower-case, unquoted parts.
pub fn split_name(raw: &str) -> Vec<String> {
    IDENT_PART
        .find_iter(raw)
        .map(|m| unquote(m.as_str()))
        .collect()
}

fn unquote(ident: &str) -> String {
    ident.trim_matches('"').to_lowercase()
}

/// Collapse runs of whitespace, newlines included.
fn collapse(fragment: &str) -> String {
    fragment.split_whitespace().collect::<Vec<_>>().join(" ")
}
