use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::brands::{BrandForm, BrandFormPayload, QuickAddBrandForm};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, referer_or, render_template};
use crate::services::ServiceError;
use crate::services::brands::{
    add_brand as add_brand_service, delete_brand as delete_brand_service,
    show_brands as show_brands_service, update_brand as update_brand_service,
};
use crate::services::storage::StorageBootstrap;
use crate::storage::FsObjectStorage;

fn flash_failure(err: ServiceError, action: &str) {
    match err {
        ServiceError::NotFound => FlashMessage::error("Brand not found.").send(),
        ServiceError::Form(message) | ServiceError::Conflict(message) => {
            FlashMessage::error(message).send()
        }
        ServiceError::StorageUnavailable(reason) => {
            FlashMessage::error(format!("Failed to upload logo: {reason}")).send()
        }
        err => {
            log::error!("Failed to {action} brand: {err}");
            FlashMessage::error(format!("Failed to {action} brand")).send();
        }
    }
}

#[get("/brands")]
pub async fn show_brands(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_brands_service(repo.get_ref()) {
        Ok(brands) => {
            let mut context = base_context(&flash_messages, "brands");
            context.insert("brands", &brands);
            render_template(&tera, "brands/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render brands page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/brands")]
pub async fn add_brand(
    repo: web::Data<DieselRepository>,
    bootstrap: web::Data<StorageBootstrap>,
    storage: web::Data<FsObjectStorage>,
    MultipartForm(form): MultipartForm<BrandForm>,
) -> impl Responder {
    let payload: BrandFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect("/brands");
        }
    };

    match add_brand_service(
        payload,
        bootstrap.get_ref(),
        storage.get_ref(),
        repo.get_ref(),
    )
    .await
    {
        Ok(_) => FlashMessage::success("Brand created successfully").send(),
        Err(err) => flash_failure(err, "create"),
    }

    redirect("/brands")
}

/// Name-only brand creation from the product editor.
#[post("/brands/quick-add")]
pub async fn quick_add_brand(
    request: HttpRequest,
    repo: web::Data<DieselRepository>,
    bootstrap: web::Data<StorageBootstrap>,
    storage: web::Data<FsObjectStorage>,
    web::Form(form): web::Form<QuickAddBrandForm>,
) -> impl Responder {
    let redirect_to = referer_or(&request, "/brands");

    let payload: BrandFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(redirect_to);
        }
    };

    match add_brand_service(
        payload,
        bootstrap.get_ref(),
        storage.get_ref(),
        repo.get_ref(),
    )
    .await
    {
        Ok(_) => FlashMessage::success("Brand added successfully").send(),
        Err(err) => flash_failure(err, "add"),
    }

    redirect(redirect_to)
}

#[post("/brands/{brand_id}/update")]
pub async fn update_brand(
    brand_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    bootstrap: web::Data<StorageBootstrap>,
    storage: web::Data<FsObjectStorage>,
    MultipartForm(form): MultipartForm<BrandForm>,
) -> impl Responder {
    let payload: BrandFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect("/brands");
        }
    };

    match update_brand_service(
        brand_id.into_inner(),
        payload,
        bootstrap.get_ref(),
        storage.get_ref(),
        repo.get_ref(),
    )
    .await
    {
        Ok(()) => FlashMessage::success("Brand updated successfully").send(),
        Err(err) => flash_failure(err, "update"),
    }

    redirect("/brands")
}

#[post("/brands/{brand_id}/delete")]
pub async fn delete_brand(
    brand_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match delete_brand_service(brand_id.into_inner(), repo.get_ref()) {
        Ok(()) => FlashMessage::success("Brand deleted successfully").send(),
        Err(err) => flash_failure(err, "delete"),
    }

    redirect("/brands")
}
