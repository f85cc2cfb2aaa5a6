//! Descriptor to document tree.
//!
//! Descriptors are sorted by `(type, name)`, grouped by type, and each one
//! becomes a section of labelled blocks. A block is emitted only when its
//! data is present; a table that cannot be built is logged and left out
//! while the rest of the section still renders.

use std::collections::HashSet;

use serde::Serialize;

use crate::descriptor::{ObjectDescriptor, ObjectType, TableRows};
use crate::error::{SqlDocError, SqlDocResult};

/// Column of the dependency table rendered as a cross reference.
///
/// Fixed position: a dependency table with its columns in another order
/// links the wrong cell.
pub const DEPENDENCY_LINK_COLUMN: usize = 1;

/// A rendered document: optional title, sections, and the objects they were
/// built from.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub sections: Vec<Section>,
    pub objects: Vec<ObjectDescriptor>,
}

impl Document {
    /// Pretty-printed JSON of the whole document.
    pub fn to_json(&self) -> SqlDocResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Link target, unique within the document.
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
    pub children: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Block {
    /// `LABEL: value` on one line.
    Field { label: String, value: String },
    /// A raw SQL fragment on its own line.
    Line(String),
    /// Heading of the block that follows.
    Label(String),
    /// Plain paragraph.
    Text(String),
    /// Preformatted text.
    Literal(String),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cell {
    Text { text: String },
    Reference { text: String, refid: String },
}

impl Cell {
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } | Self::Reference { text, .. } => text,
        }
    }
}

/// Build a link id from text: lower case ASCII letters and digits, other
/// runs replaced by `-`, leading digits and hyphens and trailing hyphens
/// removed.
pub fn make_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            id.push(c);
        } else if !id.ends_with('-') {
            id.push('-');
        }
    }
    id.trim_start_matches(|c: char| c == '-' || c.is_ascii_digit())
        .trim_end_matches('-')
        .to_string()
}

/// Ids handed out within one document.
#[derive(Debug, Default)]
pub struct IdRegistry {
    used: HashSet<String>,
}

impl IdRegistry {
    /// `make_id(text)`, suffixed with `-1`, `-2`, ... when already taken.
    pub fn register(&mut self, text: &str) -> String {
        let mut base = make_id(text);
        if base.is_empty() {
            base = "section".to_string();
        }

        let mut id = base.clone();
        let mut n = 1;
        while self.used.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        self.used.insert(id.clone());
        id
    }
}

/// Renders descriptors into sections.
#[derive(Debug, Default)]
pub struct Renderer {
    ids: IdRegistry,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// One section per object type, alphabetical, holding one section per
    /// object, alphabetical by name.
    pub fn render(&mut self, descriptors: &[ObjectDescriptor]) -> Vec<Section> {
        let mut sorted: Vec<&ObjectDescriptor> = descriptors.iter().collect();
        sorted.sort_by(|a, b| {
            (a.object_type().as_str(), a.name()).cmp(&(b.object_type().as_str(), b.name()))
        });

        let mut groups: Vec<(&ObjectType, Vec<&ObjectDescriptor>)> = Vec::new();
        for d in sorted {
            match groups.last_mut() {
                Some((object_type, members)) if *object_type == d.object_type() => members.push(d),
                _ => groups.push((d.object_type(), vec![d])),
            }
        }

        groups
            .into_iter()
            .map(|(object_type, members)| Section {
                id: self.ids.register(&format!("{} objects", object_type)),
                title: object_type.to_string(),
                blocks: Vec::new(),
                children: members.into_iter().map(|d| self.build_section(d)).collect(),
            })
            .collect()
    }

    /// Section for a single object.
    pub fn build_section(&mut self, d: &ObjectDescriptor) -> Section {
        let object_type = d.object_type();
        let comments = d.comments();
        let mut blocks = vec![field("OBJECT TYPE", object_type.as_str())];

        if object_type.is_routine() {
            if *object_type == ObjectType::Function {
                let returns = comments.and_then(|c| c.return_type.as_deref());
                if returns.is_none() {
                    tracing::warn!(object = %d.name(), "function has no Return: tag");
                }
                blocks.push(field("RETURNS", returns.unwrap_or_default()));
            }
            if let Some(language) = d.language() {
                blocks.push(field("LANGUAGE", language));
            }

            let params = comments.and_then(|c| c.param.as_ref());
            match params.filter(|rows| rows.has_data()) {
                Some(rows) => self.push_table(&mut blocks, d, "PARAMETERS:", "parameters", rows, None),
                None => {
                    blocks.push(Block::Label("PARAMETERS:".into()));
                    blocks.push(Block::Text("None".into()));
                }
            }
        }

        if object_type.is_table_family() {
            for fragment in [d.distribution_key(), d.partition_key()].into_iter().flatten() {
                if !fragment.trim().is_empty() {
                    blocks.push(Block::Line(fragment.to_string()));
                }
            }
        }

        if let Some(purpose) = comments.and_then(|c| c.purpose.as_deref()) {
            blocks.push(Block::Label("PURPOSE:".into()));
            blocks.push(Block::Literal(purpose.replace('\t', "    ")));
        }

        if let Some(deps) = comments.and_then(|c| c.dependencies.as_ref()).filter(|r| r.has_data()) {
            self.push_table(
                &mut blocks,
                d,
                "DEPENDANT OBJECTS:",
                "dependencies",
                deps,
                Some(DEPENDENCY_LINK_COLUMN),
            );
        }

        if object_type.is_table_family()
            && let Some(cols) = d.cols().filter(|r| r.has_data())
        {
            self.push_table(&mut blocks, d, "ATTRIBUTES:", "attributes", cols, None);
        }

        if let Some(changelog) = comments.and_then(|c| c.changelog.as_ref()) {
            self.push_table(&mut blocks, d, "CHANGE LOG:", "changelog", changelog, None);
        }

        Section {
            id: self.ids.register(d.name()),
            title: d.name().to_string(),
            blocks,
            children: Vec::new(),
        }
    }

    /// Append a label and its table, or log and skip both.
    fn push_table(
        &self,
        blocks: &mut Vec<Block>,
        d: &ObjectDescriptor,
        label: &str,
        block: &'static str,
        rows: &TableRows,
        link_column: Option<usize>,
    ) {
        match build_table(block, rows, link_column) {
            Ok(table) => {
                blocks.push(Block::Label(label.to_string()));
                blocks.push(Block::Table(table));
            }
            Err(e) => {
                tracing::warn!(object = %d.name(), block, error = %e, "omitting block");
            }
        }
    }
}

/// Render descriptors with a fresh id registry.
pub fn render(descriptors: &[ObjectDescriptor]) -> Vec<Section> {
    Renderer::new().render(descriptors)
}

/// Table from pipe rows: row 0 is the header, every data row must have the
/// same width. Cells in `link_column` become references.
pub fn build_table(
    block: &'static str,
    rows: &TableRows,
    link_column: Option<usize>,
) -> SqlDocResult<Table> {
    let header = rows.header().ok_or(SqlDocError::EmptyTable(block))?;

    let body = rows
        .body()
        .iter()
        .enumerate()
        .map(|(i, row)| {
            if row.len() != header.len() {
                return Err(SqlDocError::ragged(block, i + 1, header.len(), row.len()));
            }
            Ok(row
                .iter()
                .enumerate()
                .map(|(col, text)| match link_column {
                    Some(link) if link == col && !text.is_empty() => Cell::Reference {
                        text: text.clone(),
                        refid: make_id(text),
                    },
                    _ => Cell::Text { text: text.clone() },
                })
                .collect())
        })
        .collect::<SqlDocResult<Vec<_>>>()?;

    Ok(Table {
        header: header.to_vec(),
        rows: body,
    })
}

fn field(label: &str, value: &str) -> Block {
    Block::Field {
        label: label.to_string(),
        value: value.to_string(),
    }
}
