//! Extraction of object descriptors from SQL source.
//!
//! A file is recognised by the first matcher that accepts it:
//!
//! 1. a schema-level `CREATE`/`ALTER` (tables, views, routines, sequences),
//! 2. a cluster/catalog `CREATE`/`ALTER` (databases, roles, ...),
//! 3. `Object Name:` and `Object Type:` tags in the top-level comment (DML).
//!
//! Statement matchers only see the text with its comments removed, so prose
//! and commented-out SQL are never read as statements.

pub mod columns;
pub mod comment;
pub mod ddl;

use crate::config::DocConfig;
use crate::descriptor::{ObjectDescriptor, ObjectType, TableRows, COLUMN_HEADER};
use crate::error::{SqlDocError, SqlDocResult};

use comment::TaggedComment;
use ddl::StatementMatch;

/// One SQL file, split once for all matchers.
#[derive(Debug)]
pub struct SqlSource<'a> {
    pub text: &'a str,
    /// Text with every comment removed.
    pub body: String,
    pub comment: Option<TaggedComment>,
}

impl<'a> SqlSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            body: comment::strip_comments(text),
            comment: comment::parse(text),
        }
    }
}

/// Which branch recognised a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Ddl,
    Dml,
}

/// Result of a matcher: identity of the object, before enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognized {
    pub branch: Branch,
    pub statement: StatementMatch,
}

pub type Matcher = fn(&SqlSource<'_>) -> Option<Recognized>;

/// Matchers in the order they are tried.
pub const MATCHERS: &[(&str, Matcher)] = &[
    ("schema object", match_schema_object),
    ("catalog object", match_catalog_object),
    ("dml tags", match_dml_tags),
];

fn match_schema_object(source: &SqlSource<'_>) -> Option<Recognized> {
    ddl::match_schema_object(&source.body).map(|statement| Recognized {
        branch: Branch::Ddl,
        statement,
    })
}

fn match_catalog_object(source: &SqlSource<'_>) -> Option<Recognized> {
    ddl::match_catalog_object(&source.body).map(|statement| Recognized {
        branch: Branch::Ddl,
        statement,
    })
}

fn match_dml_tags(source: &SqlSource<'_>) -> Option<Recognized> {
    let tagged = source.comment.as_ref()?;
    let name = tagged.object_name.as_deref()?;
    let object_type = tagged.object_type.as_deref()?;

    Some(Recognized {
        branch: Branch::Dml,
        statement: StatementMatch {
            object_type: ObjectType::parse(object_type),
            name: name.trim().to_lowercase(),
            schema: None,
            bare_name: None,
        },
    })
}

/// Extract a descriptor, or `None` when the file is not documentable.
pub fn extract(text: &str, config: &DocConfig) -> Option<ObjectDescriptor> {
    match try_extract(text, config) {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            tracing::warn!(error = %e, "skipping SQL source");
            None
        }
    }
}

/// Extract a descriptor, reporting why a file was not recognised.
pub fn try_extract(text: &str, config: &DocConfig) -> SqlDocResult<ObjectDescriptor> {
    let source = SqlSource::new(text);

    let recognized = MATCHERS
        .iter()
        .find_map(|(label, matcher)| {
            let found = matcher(&source)?;
            tracing::debug!(matcher = *label, object = %found.statement.name, "recognized");
            Some(found)
        })
        .ok_or_else(|| unrecognized(&source))?;

    Ok(build_descriptor(&source, recognized, config))
}

/// Why no matcher accepted the source.
fn unrecognized(source: &SqlSource<'_>) -> SqlDocError {
    match &source.comment {
        None => SqlDocError::NoComment,
        Some(tagged) if tagged.object_name.is_none() && tagged.object_type.is_none() => {
            SqlDocError::Unrecognized("no CREATE/ALTER statement or object tags".into())
        }
        Some(tagged) if tagged.object_name.is_none() => SqlDocError::MissingTag("Object Name:"),
        Some(_) => SqlDocError::MissingTag("Object Type:"),
    }
}

fn build_descriptor(
    source: &SqlSource<'_>,
    recognized: Recognized,
    config: &DocConfig,
) -> ObjectDescriptor {
    let Recognized { branch, statement } = recognized;
    let object_type = statement.object_type.clone();

    let mut builder = ObjectDescriptor::builder(object_type.clone(), statement.name.clone())
        .schema(statement.schema.clone())
        .bare_name(statement.bare_name.clone())
        .comments(source.comment.as_ref().map(|c| c.comments.clone()));

    if branch == Branch::Ddl {
        if object_type.is_table_family() {
            builder = builder
                .distribution_key(ddl::distribution_key(&source.body))
                .partition_key(ddl::partition_key(&source.body));

            if config.include_table_attributes {
                builder = builder.cols(Some(table_columns(source, &statement)));
            }
        }

        if object_type.is_routine() {
            builder = builder.language(ddl::language(&source.body));
        }
    }

    builder.build()
}

/// Column rows, or a header-only table when the DDL cannot be read.
fn table_columns(source: &SqlSource<'_>, statement: &StatementMatch) -> TableRows {
    let table = statement.bare_name.as_deref().unwrap_or_default();
    match columns::extract_columns(source.text, statement.schema.as_deref(), table) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(object = %statement.name, error = %e, "column extraction failed");
            TableRows::new(vec![COLUMN_HEADER.iter().map(|h| h.to_string()).collect()])
        }
    }
}
