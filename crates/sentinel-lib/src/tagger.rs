//! Idempotent status tagging
//!
//! Applies the `FinOps-Status` tag to a resource with read-merge-write
//! semantics: existing tags are preserved, and a resource already
//! carrying the target value is left untouched.

use crate::cloud::{CloudError, TagStore};
use crate::models::ResourceRef;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Tag key written onto wasted resources
pub const FINOPS_STATUS_TAG: &str = "FinOps-Status";

/// What a tagging call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    /// The tag was merged and written
    Applied,
    /// The tag already carried the target value; no write occurred
    Unchanged,
}

/// Tagging failures, reported to the scanner as values
#[derive(Debug, Error)]
pub enum TagError {
    #[error("failed to read tags: {0}")]
    Read(#[source] CloudError),

    #[error("failed to write tags: {0}")]
    Write(#[source] CloudError),
}

/// Applies status tags through a [`TagStore`]
#[derive(Clone)]
pub struct Tagger {
    store: Arc<dyn TagStore>,
}

impl Tagger {
    pub fn new(store: Arc<dyn TagStore>) -> Self {
        Self { store }
    }

    /// Apply `tag_value` to the resource's `FinOps-Status` tag.
    ///
    /// Performs one read and at most one write. All other tags on the
    /// resource are preserved.
    pub async fn apply(
        &self,
        resource: &ResourceRef,
        tag_value: &str,
    ) -> Result<TagOutcome, TagError> {
        let api_version = resource.kind.api_version();
        let mut tags = self
            .store
            .get(&resource.id, api_version)
            .await
            .map_err(TagError::Read)?;

        if tags.get(FINOPS_STATUS_TAG).map(String::as_str) == Some(tag_value) {
            debug!(resource = %resource.short_name(), "Already tagged, skipping write");
            return Ok(TagOutcome::Unchanged);
        }

        tags.insert(FINOPS_STATUS_TAG.to_string(), tag_value.to_string());
        self.store
            .put(&resource.id, api_version, &tags)
            .await
            .map_err(TagError::Write)?;

        info!(resource = %resource.name, tag = %tag_value, "Successfully tagged");
        Ok(TagOutcome::Applied)
    }
}
