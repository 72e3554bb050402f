//! Editable product draft.
//!
//! A [`ProductDraft`] is an immutable value: every edit goes through
//! [`ProductDraft::apply`], which consumes the draft and returns the next one.
//! Derived values (discounted price, combo subtotal) are computed on demand and
//! never stored, so they always reflect the current inputs and the current
//! prices of bundled products.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{
    BrandName, CategoryName, DiscountPercentage, ImageUrl, ProductId, ProductName, ProductPrice,
    SubcategoryName, TypeConstraintError,
};

/// Text fields an operator can edit directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Name,
    Category,
    Subcategory,
    Brand,
    Price,
    Description,
    DiscountPercentage,
}

/// Image lists attached to a product and their capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSlot {
    Primary,
    Gallery,
}

impl ImageSlot {
    pub const fn capacity(self) -> usize {
        match self {
            Self::Primary => 1,
            Self::Gallery => 4,
        }
    }
}

impl Display for ImageSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "main image"),
            Self::Gallery => write!(f, "additional images"),
        }
    }
}

impl TryFrom<&str> for ImageSlot {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "primary" => Ok(Self::Primary),
            "gallery" => Ok(Self::Gallery),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "image slot: {other}"
            ))),
        }
    }
}

/// One reducer step.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    SetField(DraftField, String),
    /// Turning combo mode off clears the bundled products.
    SetCombo(bool),
    ToggleComboProduct(ProductId),
    /// Appends uploaded images, failing when the slot has no room.
    MergeImages(ImageSlot, Vec<ImageUrl>),
    RemoveImage(ImageSlot, usize),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DraftError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must be a number")]
    InvalidNumber(&'static str),
    #[error("{slot} accepts only {remaining} more image(s)")]
    ImageCapacity { slot: ImageSlot, remaining: usize },
    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    id: Option<ProductId>,
    name: String,
    category: String,
    subcategory: String,
    brand: String,
    price: String,
    description: String,
    discount_percentage: String,
    primary_image: Option<ImageUrl>,
    additional_images: Vec<ImageUrl>,
    is_combo: bool,
    combo_product_ids: Vec<ProductId>,
}

/// Parses an operator-entered decimal. Blank and malformed input yield `None`.
fn parse_decimal(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

impl ProductDraft {
    /// Empty draft for the create flow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft hydrated from a stored product for the edit flow.
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: Some(product.id),
            name: product.name.to_string(),
            category: product.category.to_string(),
            subcategory: product.subcategory.to_string(),
            brand: product
                .brand
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            price: product.price.to_string(),
            description: product.description.clone(),
            discount_percentage: product
                .discount_percentage
                .map(|d| d.to_string())
                .unwrap_or_default(),
            primary_image: product.image_url.clone(),
            additional_images: product.additional_images.clone(),
            is_combo: product.is_combo,
            combo_product_ids: if product.is_combo {
                product
                    .combo_products
                    .iter()
                    .copied()
                    .filter(|id| *id != product.id)
                    .collect()
            } else {
                Vec::new()
            },
        }
    }

    pub fn id(&self) -> Option<ProductId> {
        self.id
    }

    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Category => &self.category,
            DraftField::Subcategory => &self.subcategory,
            DraftField::Brand => &self.brand,
            DraftField::Price => &self.price,
            DraftField::Description => &self.description,
            DraftField::DiscountPercentage => &self.discount_percentage,
        }
    }

    pub fn primary_image(&self) -> Option<&ImageUrl> {
        self.primary_image.as_ref()
    }

    pub fn additional_images(&self) -> &[ImageUrl] {
        &self.additional_images
    }

    pub fn is_combo(&self) -> bool {
        self.is_combo
    }

    pub fn combo_product_ids(&self) -> &[ProductId] {
        &self.combo_product_ids
    }

    /// Number of images the slot can still take.
    pub fn remaining_capacity(&self, slot: ImageSlot) -> usize {
        let used = match slot {
            ImageSlot::Primary => usize::from(self.primary_image.is_some()),
            ImageSlot::Gallery => self.additional_images.len(),
        };
        slot.capacity().saturating_sub(used)
    }

    /// Fails when `count` more images would not fit into `slot`.
    pub fn check_capacity(&self, slot: ImageSlot, count: usize) -> Result<(), DraftError> {
        let remaining = self.remaining_capacity(slot);
        if count > remaining {
            Err(DraftError::ImageCapacity { slot, remaining })
        } else {
            Ok(())
        }
    }

    /// Produces the next draft.
    pub fn apply(mut self, action: DraftAction) -> Result<Self, DraftError> {
        match action {
            DraftAction::SetField(field, value) => match field {
                DraftField::Name => self.name = value,
                DraftField::Category => {
                    self.category = value;
                    self.subcategory.clear();
                }
                DraftField::Subcategory => self.subcategory = value,
                DraftField::Brand => self.brand = value,
                DraftField::Price => self.price = value,
                DraftField::Description => self.description = value,
                DraftField::DiscountPercentage => self.discount_percentage = value,
            },
            DraftAction::SetCombo(enabled) => {
                self.is_combo = enabled;
                if !enabled {
                    self.combo_product_ids.clear();
                }
            }
            DraftAction::ToggleComboProduct(product_id) => {
                // Ignored outside combo mode and for the product itself.
                if self.is_combo && Some(product_id) != self.id {
                    if let Some(pos) = self.combo_product_ids.iter().position(|id| *id == product_id)
                    {
                        self.combo_product_ids.remove(pos);
                    } else {
                        self.combo_product_ids.push(product_id);
                    }
                }
            }
            DraftAction::MergeImages(slot, urls) => {
                self.check_capacity(slot, urls.len())?;
                match slot {
                    ImageSlot::Primary => {
                        if let Some(url) = urls.into_iter().next() {
                            self.primary_image = Some(url);
                        }
                    }
                    ImageSlot::Gallery => self.additional_images.extend(urls),
                }
            }
            DraftAction::RemoveImage(slot, index) => match slot {
                ImageSlot::Primary => {
                    if index == 0 {
                        self.primary_image = None;
                    }
                }
                ImageSlot::Gallery => {
                    if index < self.additional_images.len() {
                        self.additional_images.remove(index);
                    }
                }
            },
        }
        Ok(self)
    }

    /// `price × (1 − discount/100)`, or `None` while either input is blank or
    /// not a number. The result is neither rounded nor clamped.
    pub fn discounted_price(&self) -> Option<f64> {
        let price = parse_decimal(&self.price)?;
        let discount = parse_decimal(&self.discount_percentage)?;
        Some(price * (1.0 - discount / 100.0))
    }

    /// Sum of the current prices of the bundled products found in `catalog`.
    pub fn combo_subtotal(&self, catalog: &[Product]) -> f64 {
        self.selected_combo_products(catalog)
            .map(|product| product.price.get())
            .sum()
    }

    /// Bundled products in catalog order.
    pub fn selected_combo_products<'a>(
        &'a self,
        catalog: &'a [Product],
    ) -> impl Iterator<Item = &'a Product> + 'a {
        catalog
            .iter()
            .filter(|product| self.combo_product_ids.contains(&product.id))
    }

    /// Products that may still be added to the combo.
    pub fn available_combo_products<'a>(
        &'a self,
        catalog: &'a [Product],
    ) -> impl Iterator<Item = &'a Product> + 'a {
        catalog.iter().filter(|product| {
            Some(product.id) != self.id && !self.combo_product_ids.contains(&product.id)
        })
    }

    /// Validates required fields and coerces the draft into a storable record.
    pub fn normalize(&self) -> Result<NewProduct, DraftError> {
        if self.name.trim().is_empty() {
            return Err(DraftError::MissingField("name"));
        }
        if self.category.trim().is_empty() {
            return Err(DraftError::MissingField("category"));
        }
        if self.subcategory.trim().is_empty() {
            return Err(DraftError::MissingField("subcategory"));
        }
        if self.price.trim().is_empty() {
            return Err(DraftError::MissingField("price"));
        }

        let price = parse_decimal(&self.price).ok_or(DraftError::InvalidNumber("price"))?;
        let price = ProductPrice::new(price)?;

        let discount_percentage = if self.discount_percentage.trim().is_empty() {
            None
        } else {
            let value = parse_decimal(&self.discount_percentage)
                .ok_or(DraftError::InvalidNumber("discount percentage"))?;
            Some(DiscountPercentage::new(value)?)
        };

        let brand = if self.brand.trim().is_empty() {
            None
        } else {
            Some(BrandName::new(self.brand.as_str())?)
        };

        Ok(NewProduct {
            name: ProductName::new(self.name.as_str())?,
            category: CategoryName::new(self.category.as_str())?,
            subcategory: SubcategoryName::new(self.subcategory.to_lowercase())?,
            brand,
            price,
            description: self.description.trim().to_string(),
            image_url: self.primary_image.clone(),
            additional_images: self.additional_images.clone(),
            discount_percentage,
            discounted_price: discount_percentage.map(|d| d.apply(price)),
            is_combo: self.is_combo,
            combo_products: if self.is_combo {
                self.combo_product_ids.clone()
            } else {
                Vec::new()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn product(id: i32, price: f64) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            name: ProductName::new(format!("Product {id}")).unwrap(),
            category: CategoryName::new("racquets").unwrap(),
            subcategory: SubcategoryName::new("tennis").unwrap(),
            brand: None,
            price: ProductPrice::new(price).unwrap(),
            description: String::new(),
            image_url: None,
            additional_images: vec![],
            discount_percentage: None,
            discounted_price: None,
            is_combo: false,
            combo_products: vec![],
            created_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
            updated_at: DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        }
    }

    fn set(draft: ProductDraft, field: DraftField, value: &str) -> ProductDraft {
        draft
            .apply(DraftAction::SetField(field, value.to_string()))
            .unwrap()
    }

    fn id(value: i32) -> ProductId {
        ProductId::new(value).unwrap()
    }

    fn url(name: &str) -> ImageUrl {
        ImageUrl::new(format!("https://cdn.example.com/{name}.png")).unwrap()
    }

    fn tennis_racket() -> ProductDraft {
        let draft = set(ProductDraft::new(), DraftField::Name, "Tennis Racket");
        let draft = set(draft, DraftField::Category, "racquets");
        let draft = set(draft, DraftField::Subcategory, "tennis");
        let draft = set(draft, DraftField::Price, "500000");
        set(draft, DraftField::DiscountPercentage, "10")
    }

    #[test]
    fn changing_category_resets_subcategory() {
        let draft = set(ProductDraft::new(), DraftField::Category, "running");
        let draft = set(draft, DraftField::Subcategory, "Running");
        let draft = set(draft, DraftField::Category, "Shoes");

        assert_eq!(draft.field(DraftField::Category), "Shoes");
        assert_eq!(draft.field(DraftField::Subcategory), "");
    }

    #[test]
    fn discounted_price_follows_inputs() {
        let draft = tennis_racket();
        assert_eq!(draft.discounted_price(), Some(450000.0));

        let draft = set(draft, DraftField::DiscountPercentage, "");
        assert_eq!(draft.discounted_price(), None);

        let draft = set(draft, DraftField::DiscountPercentage, "25");
        let draft = set(draft, DraftField::Price, "abc");
        assert_eq!(draft.discounted_price(), None);
    }

    #[test]
    fn discounted_price_matches_formula_over_a_grid() {
        for price in [0.0, 1.0, 999.5, 120000.0, 500000.0] {
            for discount in [0.0, 12.5, 50.0, 99.0, 100.0] {
                let draft = set(ProductDraft::new(), DraftField::Price, &price.to_string());
                let draft = set(draft, DraftField::DiscountPercentage, &discount.to_string());
                assert_eq!(
                    draft.discounted_price(),
                    Some(price * (1.0 - discount / 100.0))
                );
            }
        }
    }

    #[test]
    fn discounted_price_is_not_clamped() {
        let draft = set(ProductDraft::new(), DraftField::Price, "100");
        let draft = set(draft, DraftField::DiscountPercentage, "150");
        assert_eq!(draft.discounted_price(), Some(-50.0));
    }

    #[test]
    fn toggling_twice_restores_combo_members() {
        let draft = ProductDraft::new().apply(DraftAction::SetCombo(true)).unwrap();
        let draft = draft
            .apply(DraftAction::ToggleComboProduct(id(1)))
            .unwrap();
        let before = draft.combo_product_ids().to_vec();

        let draft = draft
            .apply(DraftAction::ToggleComboProduct(id(2)))
            .unwrap()
            .apply(DraftAction::ToggleComboProduct(id(2)))
            .unwrap();

        assert_eq!(draft.combo_product_ids(), before.as_slice());
    }

    #[test]
    fn disabling_combo_clears_members_regardless_of_history() {
        let mut draft = ProductDraft::new().apply(DraftAction::SetCombo(true)).unwrap();
        for value in [1, 2, 3, 2] {
            draft = draft
                .apply(DraftAction::ToggleComboProduct(id(value)))
                .unwrap();
        }
        let draft = draft.apply(DraftAction::SetCombo(false)).unwrap();
        assert!(draft.combo_product_ids().is_empty());

        let draft = draft
            .apply(DraftAction::ToggleComboProduct(id(4)))
            .unwrap();
        assert!(draft.combo_product_ids().is_empty());
    }

    #[test]
    fn combo_never_contains_the_product_itself() {
        let draft = ProductDraft::from_product(&product(7, 1000.0))
            .apply(DraftAction::SetCombo(true))
            .unwrap()
            .apply(DraftAction::ToggleComboProduct(id(7)))
            .unwrap();
        assert!(draft.combo_product_ids().is_empty());

        let catalog = vec![product(7, 1000.0), product(8, 2000.0)];
        let available: Vec<_> = draft
            .available_combo_products(&catalog)
            .map(|p| p.id.get())
            .collect();
        assert_eq!(available, vec![8]);
    }

    #[test]
    fn combo_subtotal_uses_current_prices() {
        let draft = ProductDraft::new()
            .apply(DraftAction::SetCombo(true))
            .unwrap()
            .apply(DraftAction::ToggleComboProduct(id(1)))
            .unwrap()
            .apply(DraftAction::ToggleComboProduct(id(2)))
            .unwrap();

        let mut catalog = vec![product(1, 100000.0), product(2, 250000.0), product(3, 1.0)];
        assert_eq!(draft.combo_subtotal(&catalog), 350000.0);

        catalog[1].price = ProductPrice::new(200000.0).unwrap();
        assert_eq!(draft.combo_subtotal(&catalog), 300000.0);
    }

    #[test]
    fn empty_combo_subtotal_is_zero() {
        let catalog = vec![product(1, 100.0)];
        assert_eq!(ProductDraft::new().combo_subtotal(&catalog), 0.0);
    }

    #[test]
    fn normalize_computes_discounted_price() {
        let record = tennis_racket().normalize().unwrap();

        assert_eq!(record.name.as_str(), "Tennis Racket");
        assert_eq!(record.price.get(), 500000.0);
        assert_eq!(record.discount_percentage.map(|d| d.get()), Some(10.0));
        assert_eq!(record.discounted_price.map(|p| p.get()), Some(450000.0));
        assert!(record.brand.is_none());
    }

    #[test]
    fn normalize_reports_missing_fields_in_order() {
        let draft = ProductDraft::new();
        assert_eq!(draft.normalize(), Err(DraftError::MissingField("name")));

        let draft = set(draft, DraftField::Name, "Ball");
        assert_eq!(draft.normalize(), Err(DraftError::MissingField("category")));

        let draft = set(draft, DraftField::Category, "balls");
        assert_eq!(
            draft.normalize(),
            Err(DraftError::MissingField("subcategory"))
        );

        let draft = set(draft, DraftField::Subcategory, "tennis");
        assert_eq!(draft.normalize(), Err(DraftError::MissingField("price")));

        let draft = set(draft, DraftField::Price, "12k");
        assert_eq!(draft.normalize(), Err(DraftError::InvalidNumber("price")));
    }

    #[test]
    fn normalize_rejects_out_of_range_discount() {
        let draft = set(tennis_racket(), DraftField::DiscountPercentage, "101");
        assert!(matches!(
            draft.normalize(),
            Err(DraftError::TypeConstraint(
                TypeConstraintError::PercentageOutOfRange(_)
            ))
        ));
    }

    #[test]
    fn image_slots_enforce_capacity() {
        let draft = ProductDraft::new()
            .apply(DraftAction::MergeImages(ImageSlot::Primary, vec![url("main")]))
            .unwrap();
        assert_eq!(draft.primary_image(), Some(&url("main")));

        let err = draft
            .clone()
            .apply(DraftAction::MergeImages(ImageSlot::Primary, vec![url("other")]))
            .unwrap_err();
        assert_eq!(
            err,
            DraftError::ImageCapacity {
                slot: ImageSlot::Primary,
                remaining: 0
            }
        );

        let gallery: Vec<_> = ["a", "b", "c", "d", "e"].into_iter().map(url).collect();
        assert!(
            draft
                .clone()
                .apply(DraftAction::MergeImages(ImageSlot::Gallery, gallery.clone()))
                .is_err()
        );

        let draft = draft
            .apply(DraftAction::MergeImages(
                ImageSlot::Gallery,
                gallery[..4].to_vec(),
            ))
            .unwrap()
            .apply(DraftAction::RemoveImage(ImageSlot::Gallery, 1))
            .unwrap();
        assert_eq!(draft.additional_images(), &[url("a"), url("c"), url("d")]);
        assert_eq!(draft.remaining_capacity(ImageSlot::Gallery), 1);
    }

    #[test]
    fn non_combo_record_has_no_members() {
        let mut stored = product(5, 10.0);
        stored.combo_products = vec![id(1)];
        let draft = ProductDraft::from_product(&stored);
        assert!(draft.combo_product_ids().is_empty());

        let draft = set(draft, DraftField::Name, "Shoe");
        assert!(draft.normalize().unwrap().combo_products.is_empty());
    }
}
