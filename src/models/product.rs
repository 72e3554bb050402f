use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};
use crate::domain::types::{
    BrandName, CategoryName, DiscountPercentage, ImageUrl, ProductId, ProductName, ProductPrice,
    SubcategoryName, TypeConstraintError,
};

/// Diesel model representing the `products` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub brand: Option<String>,
    pub price: f64,
    pub description: String,
    pub image_url: Option<String>,
    pub discount_percentage: Option<f64>,
    pub discounted_price: Option<f64>,
    pub is_combo: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Insertable/patchable form of [`Product`].
///
/// `None` clears the column on update.
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::products)]
#[diesel(treat_none_as_null = true)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub brand: Option<String>,
    pub price: f64,
    pub description: String,
    pub image_url: Option<String>,
    pub discount_percentage: Option<f64>,
    pub discounted_price: Option<f64>,
    pub is_combo: bool,
}

impl Product {
    /// Assembles the domain product from its row and related rows.
    pub fn into_domain(
        self,
        additional_images: Vec<String>,
        combo_products: Vec<i32>,
    ) -> Result<DomainProduct, TypeConstraintError> {
        Ok(DomainProduct {
            id: ProductId::new(self.id)?,
            name: ProductName::new(self.name)?,
            category: CategoryName::new(self.category)?,
            subcategory: SubcategoryName::new(self.subcategory)?,
            brand: self.brand.map(BrandName::new).transpose()?,
            price: ProductPrice::new(self.price)?,
            description: self.description,
            image_url: self.image_url.map(ImageUrl::new).transpose()?,
            additional_images: additional_images
                .into_iter()
                .map(ImageUrl::new)
                .collect::<Result<Vec<_>, _>>()?,
            discount_percentage: self
                .discount_percentage
                .map(DiscountPercentage::new)
                .transpose()?,
            discounted_price: self.discounted_price.map(ProductPrice::new).transpose()?,
            is_combo: self.is_combo,
            combo_products: combo_products
                .into_iter()
                .map(ProductId::new)
                .collect::<Result<Vec<_>, _>>()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<&DomainNewProduct> for NewProduct {
    fn from(product: &DomainNewProduct) -> Self {
        Self {
            name: product.name.as_str().to_string(),
            category: product.category.as_str().to_string(),
            subcategory: product.subcategory.as_str().to_string(),
            brand: product.brand.as_ref().map(|b| b.as_str().to_string()),
            price: product.price.get(),
            description: product.description.clone(),
            image_url: product.image_url.as_ref().map(|u| u.as_str().to_string()),
            discount_percentage: product.discount_percentage.map(|d| d.get()),
            discounted_price: product.discounted_price.map(|p| p.get()),
            is_combo: product.is_combo,
        }
    }
}
