use diesel::prelude::*;

/// Diesel model representing the `product_images` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub url: String,
    pub position: i32,
}

/// Insertable form of [`ProductImage`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::product_images)]
pub struct NewProductImage<'a> {
    pub product_id: i32,
    pub url: &'a str,
    pub position: i32,
}

/// Row of the `combo_items` table linking a combo to a bundled product.
#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::combo_items)]
pub struct ComboItem {
    pub combo_id: i32,
    pub product_id: i32,
    pub position: i32,
}
