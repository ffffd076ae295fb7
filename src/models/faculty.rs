//! Faculty directory models

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A faculty member as known to the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Faculty {
    pub id: String,
    pub name: String,
    pub designation: Option<String>,
    pub department_id: String,
}

/// Faculty free to cover a period, computed on demand
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityCandidate {
    pub id: String,
    pub name: String,
    pub designation: Option<String>,
}

impl From<Faculty> for AvailabilityCandidate {
    fn from(f: Faculty) -> Self {
        Self {
            id: f.id,
            name: f.name,
            designation: f.designation,
        }
    }
}

/// Create or update a directory entry
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertFaculty {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub designation: Option<String>,
    #[validate(length(min = 1, message = "department_id is required"))]
    pub department_id: String,
}
