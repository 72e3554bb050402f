use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::forms::categories::{
    AddCategoryForm, AddCategoryFormPayload, AddSubcategoryForm, AddSubcategoryFormPayload,
    RenameCategoryForm, RenameCategoryFormPayload,
};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, referer_or, render_template};
use crate::services::ServiceError;
use crate::services::categories::{
    add_category as add_category_service, add_subcategory as add_subcategory_service,
    delete_category as delete_category_service, remove_subcategory as remove_subcategory_service,
    rename_category as rename_category_service, show_categories as show_categories_service,
};

/// Flashes the outcome of a category mutation. Returns an error response for
/// failures the operator cannot act on.
fn report(result: Result<(), ServiceError>, success: &str, action: &str) -> Option<HttpResponse> {
    match result {
        Ok(()) => FlashMessage::success(success).send(),
        Err(ServiceError::NotFound) => FlashMessage::error("Category not found.").send(),
        Err(ServiceError::Form(message)) | Err(ServiceError::Conflict(message)) => {
            FlashMessage::error(message).send()
        }
        Err(err) => {
            log::error!("Failed to {action}: {err}");
            return Some(HttpResponse::InternalServerError().finish());
        }
    }
    None
}

#[get("/categories")]
pub async fn show_categories(
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_categories_service(repo.get_ref()) {
        Ok(categories) => {
            let mut context = base_context(&flash_messages, "categories");
            context.insert("categories", &categories);
            render_template(&tera, "categories/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render categories page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Creates a category and returns to the page the form was posted from.
///
/// Used both by the categories page and the product editor quick-add.
#[post("/categories")]
pub async fn add_category(
    request: HttpRequest,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddCategoryForm>,
) -> impl Responder {
    let redirect_to = referer_or(&request, "/categories");

    let payload: AddCategoryFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(redirect_to);
        }
    };

    let result = add_category_service(payload, repo.get_ref()).map(|_| ());
    if let Some(response) = report(result, "Category added successfully", "add category") {
        return response;
    }

    redirect(redirect_to)
}

#[post("/categories/{category_id}/rename")]
pub async fn rename_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<RenameCategoryForm>,
) -> impl Responder {
    let payload: RenameCategoryFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect("/categories");
        }
    };

    let result = rename_category_service(category_id.into_inner(), payload, repo.get_ref());
    if let Some(response) = report(result, "Category updated successfully", "rename category") {
        return response;
    }

    redirect("/categories")
}

#[post("/categories/{category_id}/delete")]
pub async fn delete_category(
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = delete_category_service(category_id.into_inner(), repo.get_ref());
    if let Some(response) = report(result, "Category deleted successfully", "delete category") {
        return response;
    }

    redirect("/categories")
}

#[post("/categories/{category_id}/subcategories")]
pub async fn add_subcategory(
    request: HttpRequest,
    category_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddSubcategoryForm>,
) -> impl Responder {
    let redirect_to = referer_or(&request, "/categories");

    let payload: AddSubcategoryFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(redirect_to);
        }
    };

    let result = add_subcategory_service(category_id.into_inner(), payload, repo.get_ref());
    if let Some(response) = report(result, "Subcategory added successfully", "add subcategory") {
        return response;
    }

    redirect(redirect_to)
}

#[post("/categories/{category_id}/subcategories/{position}/delete")]
pub async fn remove_subcategory(
    path: web::Path<(i32, usize)>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (category_id, position) = path.into_inner();

    let result = remove_subcategory_service(category_id, position, repo.get_ref());
    if let Some(response) = report(
        result,
        "Subcategory removed successfully",
        "remove subcategory",
    ) {
        return response;
    }

    redirect("/categories")
}
