use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::brand::{Brand as DomainBrand, NewBrand as DomainNewBrand};
use crate::domain::types::{BrandName, ImageUrl, TypeConstraintError};

/// Diesel model representing the `brands` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::brands)]
pub struct Brand {
    pub id: i32,
    pub name: String,
    pub logo_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Brand`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::brands)]
#[diesel(treat_none_as_null = true)]
pub struct NewBrand {
    pub name: String,
    pub logo_url: Option<String>,
}

impl TryFrom<Brand> for DomainBrand {
    type Error = TypeConstraintError;

    fn try_from(brand: Brand) -> Result<Self, Self::Error> {
        Ok(Self {
            id: brand.id.try_into()?,
            name: BrandName::new(brand.name)?,
            logo_url: brand.logo_url.map(ImageUrl::new).transpose()?,
            created_at: brand.created_at,
            updated_at: brand.updated_at,
        })
    }
}

impl From<&DomainNewBrand> for NewBrand {
    fn from(brand: &DomainNewBrand) -> Self {
        Self {
            name: brand.name.as_str().to_string(),
            logo_url: brand.logo_url.as_ref().map(|u| u.as_str().to_string()),
        }
    }
}
