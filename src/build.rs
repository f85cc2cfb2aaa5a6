//! Directory to document.
//!
//! Each file is its own failure boundary: a file that cannot be read or
//! recognised is logged and left out, the rest of the run continues.

use std::fs;
use std::path::Path;

use crate::config::DocConfig;
use crate::descriptor::ObjectDescriptor;
use crate::discover;
use crate::error::SqlDocResult;
use crate::extract;
use crate::render::{Document, Renderer};

/// Descriptors for every documentable `.sql` file under `base`.
pub fn collect_descriptors(base: &Path, config: &DocConfig) -> SqlDocResult<Vec<ObjectDescriptor>> {
    let files = discover::sql_files(base)?;
    tracing::info!(dir = %base.display(), files = files.len(), "discovered SQL files");

    let mut descriptors = Vec::with_capacity(files.len());
    for path in files {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "cannot read file");
                continue;
            }
        };

        match extract::try_extract(&text, config) {
            Ok(descriptor) => {
                tracing::debug!(file = %path.display(), object = %descriptor.name(), "extracted");
                descriptors.push(descriptor.with_source(path));
            }
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "not documentable");
            }
        }
    }

    Ok(descriptors)
}

/// Extract and render everything under `base`.
pub fn document_dir(base: &Path, config: &DocConfig) -> SqlDocResult<Document> {
    let objects = collect_descriptors(base, config)?;
    let sections = Renderer::new().render(&objects);
    tracing::info!(objects = objects.len(), sections = sections.len(), "rendered");

    Ok(Document {
        title: config.title.clone(),
        sections,
        objects,
    })
}
