use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{CategoryId, CategoryName, SubcategoryName};

/// Product category together with its ordered subcategories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub subcategories: Vec<SubcategoryName>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Category {
    /// Case-insensitive membership check used when validating a product's subcategory.
    pub fn has_subcategory(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.subcategories
            .iter()
            .any(|sub| sub.to_lowercase() == name)
    }
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub subcategories: Vec<SubcategoryName>,
}
