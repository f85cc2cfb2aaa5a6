//! Object descriptors.
//!
//! A descriptor is the record extracted from one SQL file. It is built once
//! through [`DescriptorBuilder`] and only read afterwards.

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

/// Fixed header of the attributes table.
pub const COLUMN_HEADER: [&str; 3] = ["Name", "Type", "Description"];

/// Kind of documented database object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Table,
    ExternalTable,
    ForeignTable,
    View,
    MaterializedView,
    Function,
    Procedure,
    Dml,
    /// Anything else: catalog objects (DATABASE, ROLE, ...) or a free-text
    /// `Object Type:` tag.
    Other(String),
}

impl ObjectType {
    /// Normalise a raw type string: trimmed, upper case, inner whitespace
    /// collapsed, `PROC` read as `PROCEDURE`.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();
        match normalized.as_str() {
            "TABLE" => Self::Table,
            "EXTERNAL TABLE" => Self::ExternalTable,
            "FOREIGN TABLE" => Self::ForeignTable,
            "VIEW" => Self::View,
            "MATERIALIZED VIEW" => Self::MaterializedView,
            "FUNCTION" => Self::Function,
            "PROCEDURE" | "PROC" => Self::Procedure,
            "DML" => Self::Dml,
            _ => Self::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Table => "TABLE",
            Self::ExternalTable => "EXTERNAL TABLE",
            Self::ForeignTable => "FOREIGN TABLE",
            Self::View => "VIEW",
            Self::MaterializedView => "MATERIALIZED VIEW",
            Self::Function => "FUNCTION",
            Self::Procedure => "PROCEDURE",
            Self::Dml => "DML",
            Self::Other(s) => s,
        }
    }

    /// TABLE, EXTERNAL TABLE and FOREIGN TABLE.
    pub fn is_table_family(&self) -> bool {
        matches!(self, Self::Table | Self::ExternalTable | Self::ForeignTable)
    }

    /// FUNCTION and PROCEDURE.
    pub fn is_routine(&self) -> bool {
        matches!(self, Self::Function | Self::Procedure)
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ObjectType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Rows of a pipe table. Row 0 is the header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct TableRows(Vec<Vec<String>>);

impl TableRows {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self(rows)
    }

    /// Split `|` delimited text into rows. Blank lines are dropped and every
    /// cell is trimmed; a line without `|` becomes a single-cell row.
    pub fn from_pipe_text(text: &str) -> Self {
        let rows = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split('|').map(|cell| cell.trim().to_string()).collect())
            .collect();
        Self(rows)
    }

    pub fn header(&self) -> Option<&[String]> {
        self.0.first().map(Vec::as_slice)
    }

    /// Data rows, header excluded.
    pub fn body(&self) -> &[Vec<String>] {
        self.0.get(1..).unwrap_or_default()
    }

    /// True when at least one row follows the header.
    pub fn has_data(&self) -> bool {
        self.0.len() > 1
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.0
    }
}

/// Tagged fields from the top-level block comment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Comments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<TableRows>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<TableRows>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<TableRows>,
}

impl Comments {
    /// True when no tag was found.
    pub fn is_empty(&self) -> bool {
        self.purpose.is_none()
            && self.param.is_none()
            && self.return_type.is_none()
            && self.dependencies.is_none()
            && self.changelog.is_none()
    }
}

/// Everything known about one documented object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectDescriptor {
    #[serde(rename = "type")]
    object_type: ObjectType,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bare_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comments: Option<Comments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    distribution_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    partition_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cols: Option<TableRows>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<PathBuf>,
}

impl ObjectDescriptor {
    pub fn builder(object_type: ObjectType, name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(object_type, name)
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn bare_name(&self) -> Option<&str> {
        self.bare_name.as_deref()
    }

    pub fn comments(&self) -> Option<&Comments> {
        self.comments.as_ref()
    }

    pub fn distribution_key(&self) -> Option<&str> {
        self.distribution_key.as_deref()
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.partition_key.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn cols(&self) -> Option<&TableRows> {
        self.cols.as_ref()
    }

    pub fn source(&self) -> Option<&std::path::Path> {
        self.source.as_deref()
    }

    /// Copy of this descriptor tagged with the file it came from.
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }
}

/// Builder for [`ObjectDescriptor`].
///
/// Optional fields only take values that carry data; an empty comment
/// bundle is dropped, and type-specific fields are discarded at `build`
/// when they do not apply to the object type.
#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    inner: ObjectDescriptor,
}

impl DescriptorBuilder {
    pub fn new(object_type: ObjectType, name: impl Into<String>) -> Self {
        Self {
            inner: ObjectDescriptor {
                object_type,
                name: name.into(),
                schema: None,
                bare_name: None,
                comments: None,
                distribution_key: None,
                partition_key: None,
                language: None,
                cols: None,
                source: None,
            },
        }
    }

    pub fn schema(mut self, schema: Option<String>) -> Self {
        self.inner.schema = schema.filter(|s| !s.is_empty());
        self
    }

    pub fn bare_name(mut self, bare_name: Option<String>) -> Self {
        self.inner.bare_name = bare_name.filter(|s| !s.is_empty());
        self
    }

    pub fn comments(mut self, comments: Option<Comments>) -> Self {
        self.inner.comments = comments.filter(|c| !c.is_empty());
        self
    }

    pub fn distribution_key(mut self, key: Option<String>) -> Self {
        self.inner.distribution_key = key;
        self
    }

    pub fn partition_key(mut self, key: Option<String>) -> Self {
        self.inner.partition_key = key;
        self
    }

    pub fn language(mut self, language: Option<String>) -> Self {
        self.inner.language = language;
        self
    }

    pub fn cols(mut self, cols: Option<TableRows>) -> Self {
        self.inner.cols = cols;
        self
    }

    pub fn build(self) -> ObjectDescriptor {
        let mut d = self.inner;
        if !d.object_type.is_table_family() {
            d.distribution_key = None;
            d.partition_key = None;
            d.cols = None;
        }
        if !d.object_type.is_routine() {
            d.language = None;
        }
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_normalization() {
        assert_eq!(ObjectType::parse(" proc "), ObjectType::Procedure);
        assert_eq!(ObjectType::parse("external   table"), ObjectType::ExternalTable);
        assert_eq!(ObjectType::parse("dml"), ObjectType::Dml);
        assert_eq!(
            ObjectType::parse("resource queue"),
            ObjectType::Other("RESOURCE QUEUE".to_string())
        );
        assert_eq!(ObjectType::parse("Materialized View").to_string(), "MATERIALIZED VIEW");
    }

    #[test]
    fn test_pipe_text() {
        let rows = TableRows::from_pipe_text(
            "\n  Date | Author | Ticket\n\n  2020-10-26 | dev | T-1 \n",
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.header().unwrap(), ["Date", "Author", "Ticket"]);
        assert_eq!(rows.body()[0], vec!["2020-10-26", "dev", "T-1"]);
        assert!(rows.has_data());
    }

    #[test]
    fn test_header_only_rows() {
        let rows = TableRows::from_pipe_text("Name | Type");
        assert!(!rows.has_data());
        assert!(rows.body().is_empty());
    }

    #[test]
    fn test_builder_drops_foreign_fields() {
        let d = ObjectDescriptor::builder(ObjectType::View, "s.v")
            .distribution_key(Some("DISTRIBUTED BY (id)".into()))
            .language(Some("LANGUAGE sql".into()))
            .comments(Some(Comments::default()))
            .build();
        assert!(d.distribution_key().is_none());
        assert!(d.language().is_none());
        assert!(d.comments().is_none());
    }

    #[test]
    fn test_serialize_type_as_string() {
        let d = ObjectDescriptor::builder(ObjectType::Dml, "my_dml").build();
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "DML");
        assert_eq!(json["name"], "my_dml");
        assert!(json.get("cols").is_none());
    }
}
