//! Category reference model.
//!
//! Categories are owned by the external Category Service; core code only
//! reads their attributes.

use serde::{Deserialize, Serialize};

/// Category identifier assigned by the Category Service.
pub type CategoryId = i64;

/// Read-only category record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Display color as provided by the service (e.g. `#7c3aed`).
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub archived: bool,
}
