//! Error types for asset loading and scene updates.
//!
//! Nothing here is fatal: a failed item leaves its previous visual state
//! untouched, and a failed load can be retried by resolving the same
//! reference again. Removing an unknown node is not an error at all.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::reconciler::UpdateReport;

/// An asset could not be loaded.
#[derive(Debug, Clone, Error)]
#[error("failed to load asset \"{reference}\": {cause}")]
pub struct AssetLoadError {
    /// The reference that failed to load.
    pub reference: String,
    /// The underlying failure reported by the asset source.
    #[source]
    pub cause: Arc<dyn std::error::Error + Send + Sync>,
}

impl AssetLoadError {
    /// Build a load error from a reference and its cause.
    pub fn new(
        reference: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            reference: reference.into(),
            cause: Arc::from(cause.into()),
        }
    }
}

/// Which item of a visual update an error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateItem {
    /// The background.
    Background,
    /// A character, by identity.
    Character(String),
    /// An effect, by its index in the update's effect list.
    Effect(usize),
}

impl fmt::Display for UpdateItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Background => write!(f, "background"),
            Self::Character(id) => write!(f, "character \"{id}\""),
            Self::Effect(index) => write!(f, "effect #{index}"),
        }
    }
}

/// One item of an update that could not be applied.
#[derive(Debug, Clone, Error)]
#[error("{item}: {error}")]
pub struct ItemFailure {
    /// The item that failed.
    pub item: UpdateItem,
    /// Why its asset could not be resolved.
    #[source]
    pub error: AssetLoadError,
}

/// Some items of an update failed; the rest were applied.
#[derive(Debug, Clone, Error)]
#[error("{} item(s) of the visual update could not be applied", .failures.len())]
pub struct PartialUpdateFailure {
    /// Every item that failed, in update order.
    pub failures: Vec<ItemFailure>,
    /// What was applied despite the failures.
    pub report: UpdateReport,
}

impl PartialUpdateFailure {
    /// Whether the given item is among the failures.
    pub fn failed(&self, item: &UpdateItem) -> bool {
        self.failures.iter().any(|f| &f.item == item)
    }
}
