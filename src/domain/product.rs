use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    BrandName, CategoryName, DiscountPercentage, ImageUrl, ProductId, ProductName, ProductPrice,
    SubcategoryName,
};

/// A stored catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub category: CategoryName,
    pub subcategory: SubcategoryName,
    pub brand: Option<BrandName>,
    pub price: ProductPrice,
    pub description: String,
    /// Main image shown in listings.
    pub image_url: Option<ImageUrl>,
    /// Gallery images in display order.
    pub additional_images: Vec<ImageUrl>,
    pub discount_percentage: Option<DiscountPercentage>,
    pub discounted_price: Option<ProductPrice>,
    pub is_combo: bool,
    /// Products bundled by this combo. Empty unless `is_combo` is set.
    pub combo_products: Vec<ProductId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Persistence-ready product record produced by submitting a draft.
///
/// Used for both inserts and full updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub name: ProductName,
    pub category: CategoryName,
    pub subcategory: SubcategoryName,
    pub brand: Option<BrandName>,
    pub price: ProductPrice,
    pub description: String,
    pub image_url: Option<ImageUrl>,
    pub additional_images: Vec<ImageUrl>,
    pub discount_percentage: Option<DiscountPercentage>,
    pub discounted_price: Option<ProductPrice>,
    pub is_combo: bool,
    pub combo_products: Vec<ProductId>,
}
