//! Reference lists that populate the report form selects.

use crate::identifiers::{CategoryId, DepartmentId};
use serde::{Deserialize, Serialize};

/// Item category (Bags, Electronics, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Backend identifier
    pub category_id: CategoryId,
    /// Display name
    pub category_name: String,
    /// Optional description
    #[serde(default, rename = "catDescription")]
    pub description: Option<String>,
}

/// Department or campus where items are reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Backend identifier
    #[serde(rename = "depId")]
    pub department_id: DepartmentId,
    /// Display name; becomes the item's `location`
    #[serde(rename = "depName")]
    pub name: String,
    /// Physical location note
    #[serde(default)]
    pub location: Option<String>,
}
