//! Items table model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{bounded_text, ValidationError};

/// Maximum length for item names (matches `VARCHAR(100)`)
pub const MAX_ITEM_NAME_LEN: usize = 100;

/// Item record from database
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated item name: non-empty, at most 100 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemName(String);

impl ItemName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("name", s, MAX_ITEM_NAME_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Body of `POST /data`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Validated insert
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: ItemName,
    pub description: Option<String>,
}

impl TryFrom<CreateItemRequest> for NewItem {
    type Error = ValidationError;

    fn try_from(req: CreateItemRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: ItemName::new(&req.name)?,
            description: req.description,
        })
    }
}
