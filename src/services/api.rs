use serde::Deserialize;

use crate::domain::product::Product;
use crate::repository::{ProductListQuery, ProductReader};

use super::{ServiceError, ServiceResult};

/// Query parameters accepted by the `api_v1_products` endpoint.
#[derive(Deserialize, Debug, Default)]
pub struct ApiV1ProductsQueryParams {
    pub query: Option<String>,
}

/// Core business logic for the `/api/v1/products` endpoint.
///
/// Returns stored products newest first, filtered by the optional search
/// term.
pub fn api_v1_products<R>(params: ApiV1ProductsQueryParams, repo: &R) -> ServiceResult<Vec<Product>>
where
    R: ProductReader,
{
    let list_query = match &params.query {
        Some(query) => ProductListQuery::default().search(query),
        None => ProductListQuery::default(),
    };

    repo.list_products(list_query).map_err(|e| {
        log::error!("Failed to list products: {e}");
        ServiceError::Internal
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{
        CategoryName, ProductId, ProductName, ProductPrice, SubcategoryName,
    };
    use crate::repository::test::TestRepository;
    use chrono::DateTime;
    use serde_json::Value;

    fn sample_product(id: i32, name: &str) -> Product {
        Product {
            id: ProductId::new(id).unwrap(),
            name: ProductName::new(name).unwrap(),
            category: CategoryName::new("balls").unwrap(),
            subcategory: SubcategoryName::new("tennis").unwrap(),
            brand: None,
            price: ProductPrice::new(90000.0).unwrap(),
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

    #[test]
    fn blank_query_returns_everything() {
        let repo = TestRepository::new(
            vec![sample_product(1, "Ball can"), sample_product(2, "Grip")],
            vec![],
            vec![],
        );
        let params = ApiV1ProductsQueryParams {
            query: Some("  ".to_string()),
        };

        assert_eq!(api_v1_products(params, &repo).unwrap().len(), 2);
    }

    #[test]
    fn serializes_products_as_plain_json() {
        let repo = TestRepository::new(vec![sample_product(1, "Ball can")], vec![], vec![]);
        let params = ApiV1ProductsQueryParams {
            query: Some("ball".to_string()),
        };

        let products = api_v1_products(params, &repo).unwrap();
        let json: Value = serde_json::to_value(&products).unwrap();

        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["name"], "Ball can");
        assert_eq!(json[0]["price"], 90000.0);
        assert_eq!(json[0]["combo_products"], Value::Array(vec![]));
    }
}
