//! # sqldoc
//!
//! > **Document the warehouse from the SQL that builds it.**
//!
//! sqldoc reads a directory of SQL object scripts, recognises the object
//! each one creates, and renders a reStructuredText (or JSON) reference
//! with one section per object.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use sqldoc::prelude::*;
//!
//! let config = DocConfig::default();
//! let doc = sqldoc::document_dir(Path::new("sql/"), &config)?;
//! println!("{}", doc.to_rst());
//! ```
//!
//! ## Comment Tags
//!
//! | Tag                  | Shape       | Used for                  |
//! |----------------------|-------------|---------------------------|
//! | `Object Name:`       | single line | DML scripts               |
//! | `Object Type:`       | single line | DML scripts               |
//! | `Return:`            | single line | functions                 |
//! | `Purpose:`           | free text   | every object              |
//! | `Parameters:`        | pipe table  | functions, procedures     |
//! | `Dependent Objects:` | pipe table  | cross references          |
//! | `Changelog:`         | pipe table  | every object              |

pub mod build;
pub mod config;
pub mod descriptor;
pub mod discover;
pub mod error;
pub mod extract;
pub mod parser;
pub mod render;
pub mod rst;

pub mod prelude {
    pub use crate::build::{collect_descriptors, document_dir};
    pub use crate::config::{DocConfig, OutputFormat};
    pub use crate::descriptor::*;
    pub use crate::error::*;
    pub use crate::extract::{extract, try_extract};
    pub use crate::render::{render, Block, Cell, Document, Section, Table};
    pub use crate::rst::ToRst;
}

pub use build::document_dir;
pub use extract::extract;
pub use render::render;

/// Extract and render a set of in-memory SQL sources.
///
/// # Example
///
/// ```
/// use sqldoc::config::DocConfig;
///
/// let sections = sqldoc::document_sources(
///     ["CREATE TABLE sales.orders (id int) DISTRIBUTED BY (id);"],
///     &DocConfig::default(),
/// );
/// assert_eq!(sections[0].title, "TABLE");
/// assert_eq!(sections[0].children[0].id, "sales-orders");
/// ```
pub fn document_sources<'a>(
    sources: impl IntoIterator<Item = &'a str>,
    config: &config::DocConfig,
) -> Vec<render::Section> {
    let descriptors: Vec<_> = sources
        .into_iter()
        .filter_map(|text| extract(text, config))
        .collect();
    render(&descriptors)
}
