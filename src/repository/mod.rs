use crate::db::{DbConnection, DbPool};
use crate::domain::brand::{Brand, NewBrand};
use crate::domain::category::{Category, NewCategory};
use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{
    BrandId, BrandName, CategoryId, CategoryName, ProductId, SubcategoryName,
};

pub mod brand;
pub mod category;
pub mod errors;
pub mod product;

pub use errors::{RepositoryError, RepositoryResult};

/// Repository implementation backed by Diesel and SQLite.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository from an established database pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a pooled database connection.
    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Query parameters used when listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Case-insensitive match against name, category or subcategory.
    pub search: Option<String>,
}

impl ProductListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }
}

/// Read-only operations for product entities.
pub trait ProductReader {
    /// List products, newest first.
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<Vec<Product>>;
    /// Retrieve a product by its identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
}

/// Write operations for product entities, their images and combo members.
pub trait ProductWriter {
    /// Persist a new product and return its identifier.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<ProductId>;
    /// Overwrite a product. Returns the number of updated product rows.
    fn update_product(&self, id: ProductId, product: &NewProduct) -> RepositoryResult<usize>;
    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize>;
}

/// Read-only operations for category entities.
pub trait CategoryReader {
    /// List categories ordered by name.
    fn list_categories(&self) -> RepositoryResult<Vec<Category>>;
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// Case-insensitive lookup by name.
    fn get_category_by_name(&self, name: &CategoryName) -> RepositoryResult<Option<Category>>;
}

/// Write operations for category entities.
pub trait CategoryWriter {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<CategoryId>;
    fn rename_category(&self, id: CategoryId, name: &CategoryName) -> RepositoryResult<usize>;
    /// Replace the ordered subcategory list.
    fn set_subcategories(
        &self,
        id: CategoryId,
        subcategories: &[SubcategoryName],
    ) -> RepositoryResult<usize>;
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<usize>;
}

/// Read-only operations for brand entities.
pub trait BrandReader {
    /// List brands ordered by name.
    fn list_brands(&self) -> RepositoryResult<Vec<Brand>>;
    fn get_brand_by_id(&self, id: BrandId) -> RepositoryResult<Option<Brand>>;
    /// Case-insensitive lookup by name.
    fn get_brand_by_name(&self, name: &BrandName) -> RepositoryResult<Option<Brand>>;
}

/// Write operations for brand entities.
pub trait BrandWriter {
    fn create_brand(&self, brand: &NewBrand) -> RepositoryResult<BrandId>;
    fn update_brand(&self, id: BrandId, brand: &NewBrand) -> RepositoryResult<usize>;
    /// Fails with [`RepositoryError::ConstraintViolation`] while products use the brand.
    fn delete_brand(&self, id: BrandId) -> RepositoryResult<usize>;
}
