use serde::Serialize;

use crate::domain::draft::{DraftField, ImageSlot, ProductDraft};
use crate::domain::product::Product;
use crate::dto::brands::BrandDto;
use crate::dto::categories::CategoryDto;
use crate::dto::format_vnd;

/// Row of the products table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDto {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub brand: Option<String>,
    pub price: f64,
    pub price_display: String,
    pub discount_percentage: Option<f64>,
    pub discounted_price_display: Option<String>,
    pub image_url: Option<String>,
    pub is_combo: bool,
    pub combo_size: usize,
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.into_inner(),
            category: value.category.into_inner(),
            subcategory: value.subcategory.into_inner(),
            brand: value.brand.map(|b| b.into_inner()),
            price: value.price.get(),
            price_display: format_vnd(value.price.get()),
            discount_percentage: value.discount_percentage.map(|d| d.get()),
            discounted_price_display: value.discounted_price.map(|p| format_vnd(p.get())),
            image_url: value.image_url.map(|u| u.into_inner()),
            is_combo: value.is_combo,
            combo_size: value.combo_products.len(),
        }
    }
}

/// Product offered in the combo picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboCandidateDto {
    pub id: i32,
    pub name: String,
    pub price_display: String,
}

impl From<&Product> for ComboCandidateDto {
    fn from(value: &Product) -> Self {
        Self {
            id: value.id.get(),
            name: value.name.to_string(),
            price_display: format_vnd(value.price.get()),
        }
    }
}

/// Everything the editor page renders for the open draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductEditorDto {
    pub id: Option<i32>,
    pub name: String,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub price: String,
    pub description: String,
    pub discount_percentage: String,
    pub discounted_price_display: Option<String>,
    pub primary_image: Option<String>,
    pub additional_images: Vec<String>,
    pub primary_remaining: usize,
    pub gallery_remaining: usize,
    pub is_combo: bool,
    pub combo_selected: Vec<ComboCandidateDto>,
    pub combo_available: Vec<ComboCandidateDto>,
    pub combo_subtotal_display: String,
    pub categories: Vec<CategoryDto>,
    /// Subcategories of the selected category.
    pub subcategories: Vec<String>,
    pub brands: Vec<BrandDto>,
}

impl ProductEditorDto {
    pub fn new(
        draft: &ProductDraft,
        catalog: &[Product],
        categories: Vec<CategoryDto>,
        brands: Vec<BrandDto>,
    ) -> Self {
        let selected_category = draft.field(DraftField::Category).trim().to_lowercase();
        let subcategories = categories
            .iter()
            .find(|c| c.name == selected_category)
            .map(|c| c.subcategories.clone())
            .unwrap_or_default();

        Self {
            id: draft.id().map(|id| id.get()),
            name: draft.field(DraftField::Name).to_string(),
            category: draft.field(DraftField::Category).to_string(),
            subcategory: draft.field(DraftField::Subcategory).to_string(),
            brand: draft.field(DraftField::Brand).to_string(),
            price: draft.field(DraftField::Price).to_string(),
            description: draft.field(DraftField::Description).to_string(),
            discount_percentage: draft.field(DraftField::DiscountPercentage).to_string(),
            discounted_price_display: draft.discounted_price().map(format_vnd),
            primary_image: draft.primary_image().map(|u| u.to_string()),
            additional_images: draft
                .additional_images()
                .iter()
                .map(|u| u.to_string())
                .collect(),
            primary_remaining: draft.remaining_capacity(ImageSlot::Primary),
            gallery_remaining: draft.remaining_capacity(ImageSlot::Gallery),
            is_combo: draft.is_combo(),
            combo_selected: draft
                .selected_combo_products(catalog)
                .map(ComboCandidateDto::from)
                .collect(),
            combo_available: draft
                .available_combo_products(catalog)
                .map(ComboCandidateDto::from)
                .collect(),
            combo_subtotal_display: format_vnd(draft.combo_subtotal(catalog)),
            categories,
            subcategories,
            brands,
        }
    }
}
