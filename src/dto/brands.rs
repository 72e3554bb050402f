use serde::Serialize;

use crate::domain::brand::Brand;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandDto {
    pub id: i32,
    pub name: String,
    pub logo_url: Option<String>,
}

impl From<Brand> for BrandDto {
    fn from(value: Brand) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            logo_url: value.logo_url.map(|url| url.into_inner()),
        }
    }
}
