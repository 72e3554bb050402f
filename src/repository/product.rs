use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::db::DbConnection;
use crate::domain::product::{NewProduct, Product};
use crate::domain::types::ProductId;
use crate::models::product::{NewProduct as DbNewProduct, Product as DbProduct};
use crate::models::product_image::{ComboItem, NewProductImage, ProductImage};
use crate::repository::{
    DieselRepository, ProductListQuery, ProductReader, ProductWriter, RepositoryResult,
};

/// Loads images and combo members for `rows` and converts them into domain products.
fn hydrate_products(conn: &mut DbConnection, rows: Vec<DbProduct>) -> RepositoryResult<Vec<Product>> {
    use crate::schema::{combo_items, product_images};

    let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();

    let mut images: HashMap<i32, Vec<String>> = HashMap::new();
    for image in product_images::table
        .filter(product_images::product_id.eq_any(&ids))
        .order((product_images::product_id.asc(), product_images::position.asc()))
        .load::<ProductImage>(conn)?
    {
        images.entry(image.product_id).or_default().push(image.url);
    }

    let mut combos: HashMap<i32, Vec<i32>> = HashMap::new();
    for item in combo_items::table
        .filter(combo_items::combo_id.eq_any(&ids))
        .order((combo_items::combo_id.asc(), combo_items::position.asc()))
        .load::<ComboItem>(conn)?
    {
        combos.entry(item.combo_id).or_default().push(item.product_id);
    }

    let products = rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            row.into_domain(
                images.remove(&id).unwrap_or_default(),
                combos.remove(&id).unwrap_or_default(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(products)
}

/// Rewrites the gallery and combo rows of `product_id`.
fn replace_relations(
    conn: &mut DbConnection,
    product_id: i32,
    product: &NewProduct,
) -> QueryResult<()> {
    use crate::schema::{combo_items, product_images};

    diesel::delete(product_images::table.filter(product_images::product_id.eq(product_id)))
        .execute(conn)?;
    diesel::delete(combo_items::table.filter(combo_items::combo_id.eq(product_id)))
        .execute(conn)?;

    let images: Vec<NewProductImage> = product
        .additional_images
        .iter()
        .enumerate()
        .map(|(position, url)| NewProductImage {
            product_id,
            url: url.as_str(),
            position: position as i32,
        })
        .collect();
    if !images.is_empty() {
        diesel::insert_into(product_images::table)
            .values(&images)
            .execute(conn)?;
    }

    let items: Vec<ComboItem> = product
        .combo_products
        .iter()
        .enumerate()
        .map(|(position, id)| ComboItem {
            combo_id: product_id,
            product_id: id.get(),
            position: position as i32,
        })
        .collect();
    if !items.is_empty() {
        diesel::insert_into(combo_items::table)
            .values(&items)
            .execute(conn)?;
    }

    Ok(())
}

/// `LIKE` pattern matching `search` literally anywhere in the value.
fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl ProductReader for DieselRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let mut items = products::table.into_boxed::<Sqlite>();
        if let Some(search) = &query.search {
            let pattern = contains_pattern(search);
            items = items.filter(
                products::name
                    .like(pattern.clone())
                    .escape('\\')
                    .or(products::category.like(pattern.clone()).escape('\\'))
                    .or(products::subcategory.like(pattern).escape('\\')),
            );
        }

        let rows = items
            .order((products::created_at.desc(), products::id.desc()))
            .load::<DbProduct>(&mut conn)?;

        hydrate_products(&mut conn, rows)
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let row = products::table
            .filter(products::id.eq(id.get()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(hydrate_products(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_product: DbNewProduct = product.into();

        let id = conn.transaction(|conn| {
            let id = diesel::insert_into(products::table)
                .values(&db_product)
                .returning(products::id)
                .get_result::<i32>(conn)?;
            replace_relations(conn, id, product)?;
            QueryResult::Ok(id)
        })?;

        Ok(ProductId::new(id)?)
    }

    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;
        let db_product: DbNewProduct = product.into();

        let affected = conn.transaction(|conn| {
            let affected = diesel::update(products::table.filter(products::id.eq(id.get())))
                .set((&db_product, products::updated_at.eq(diesel::dsl::now)))
                .execute(conn)?;
            if affected > 0 {
                replace_relations(conn, id.get(), product)?;
            }
            QueryResult::Ok(affected)
        })?;

        Ok(affected)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        // Images and combo rows go with it through ON DELETE CASCADE.
        let affected =
            diesel::delete(products::table.filter(products::id.eq(id.get()))).execute(&mut conn)?;

        Ok(affected)
    }
}
