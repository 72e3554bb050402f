use actix_web::{HttpResponse, Responder, get, web};

use crate::repository::DieselRepository;
use crate::services::api::{ApiV1ProductsQueryParams, api_v1_products as api_v1_products_service};

#[get("/v1/products")]
pub async fn api_v1_products(
    params: web::Query<ApiV1ProductsQueryParams>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match api_v1_products_service(params.into_inner(), repo.get_ref()) {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(err) => {
            log::error!("Failed to list products: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
