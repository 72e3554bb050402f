use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{BrandId, BrandName, ImageUrl};

/// Brand a product can be attributed to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: BrandName,
    pub logo_url: Option<ImageUrl>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Data required to insert or overwrite a [`Brand`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBrand {
    pub name: BrandName,
    pub logo_url: Option<ImageUrl>,
}
