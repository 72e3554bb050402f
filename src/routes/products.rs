use actix_multipart::form::MultipartForm;
use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::domain::draft::{DraftAction, ProductDraft};
use crate::forms::products::{
    ComboModeForm, ProductDraftForm, RemoveImageForm, ToggleComboProductForm, UploadImagesForm,
    UploadImagesFormPayload,
};
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::drafts::DraftStore;
use crate::services::products::{
    apply_draft_actions, delete_product as delete_product_service,
    show_editor as show_editor_service, show_products as show_products_service,
    start_draft, submit_draft as submit_draft_service,
    upload_draft_images as upload_draft_images_service,
};
use crate::services::storage::StorageBootstrap;
use crate::storage::FsObjectStorage;

const DRAFT_SESSION_KEY: &str = "product_draft";
const EDITOR_URL: &str = "/products/editor";

#[derive(Deserialize)]
struct ProductsQueryParams {
    search: Option<String>,
}

fn draft_key(session: &Session) -> Option<String> {
    session.get::<String>(DRAFT_SESSION_KEY).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable draft key in session: {e}");
        None
    })
}

fn open_draft(session: &Session, drafts: &DraftStore) -> Option<ProductDraft> {
    draft_key(session).and_then(|key| drafts.get(&key))
}

fn save_draft(session: &Session, drafts: &DraftStore, draft: ProductDraft) -> bool {
    let key = draft_key(session).unwrap_or_else(DraftStore::new_key);
    if let Err(e) = session.insert(DRAFT_SESSION_KEY, &key) {
        log::error!("Failed to store draft key in session: {e}");
        return false;
    }
    drafts.put(&key, draft);
    true
}

fn close_draft(session: &Session, drafts: &DraftStore) {
    if let Some(key) = draft_key(session) {
        drafts.remove(&key);
    }
    session.remove(DRAFT_SESSION_KEY);
}

fn no_open_draft() -> HttpResponse {
    FlashMessage::error("No product is being edited.").send();
    redirect("/products")
}

/// Applies `actions` to the open draft and returns to the editor.
fn update_draft(session: &Session, drafts: &DraftStore, actions: Vec<DraftAction>) -> HttpResponse {
    let Some(key) = draft_key(session) else {
        return no_open_draft();
    };

    match drafts.update(&key, |draft| apply_draft_actions(draft, actions)) {
        None => return no_open_draft(),
        Some(Ok(_)) => {}
        Some(Err(ServiceError::Form(message))) => FlashMessage::error(message).send(),
        Some(Err(err)) => {
            log::error!("Failed to update product draft: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    }

    redirect(EDITOR_URL)
}

#[get("/products")]
pub async fn show_products(
    params: web::Query<ProductsQueryParams>,
    flash_messages: IncomingFlashMessages,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match show_products_service(params.search.as_deref(), repo.get_ref()) {
        Ok(products) => {
            let mut context = base_context(&flash_messages, "products");
            context.insert("products", &products);
            context.insert("search", &params.search.clone().unwrap_or_default());
            render_template(&tera, "products/index.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render products page: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products/{product_id}/delete")]
pub async fn delete_product(
    product_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match delete_product_service(product_id.into_inner(), repo.get_ref()) {
        Ok(()) => FlashMessage::success("Product deleted successfully").send(),
        Err(ServiceError::NotFound) => FlashMessage::error("Product not found.").send(),
        Err(err) => {
            log::error!("Failed to delete product: {err}");
            FlashMessage::error("Failed to delete product").send();
        }
    }

    redirect("/products")
}

#[get("/products/new")]
pub async fn new_product(session: Session, drafts: web::Data<DraftStore>) -> impl Responder {
    if !save_draft(&session, &drafts, ProductDraft::new()) {
        return HttpResponse::InternalServerError().finish();
    }
    redirect(EDITOR_URL)
}

#[get("/products/{product_id}/edit")]
pub async fn edit_product(
    product_id: web::Path<i32>,
    session: Session,
    drafts: web::Data<DraftStore>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match start_draft(Some(product_id.into_inner()), repo.get_ref()) {
        Ok(draft) => {
            if !save_draft(&session, &drafts, draft) {
                return HttpResponse::InternalServerError().finish();
            }
            redirect(EDITOR_URL)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Failed to fetch product details").send();
            redirect("/products")
        }
        Err(err) => {
            log::error!("Failed to open product for editing: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/products/editor")]
pub async fn show_editor(
    session: Session,
    flash_messages: IncomingFlashMessages,
    drafts: web::Data<DraftStore>,
    repo: web::Data<DieselRepository>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Some(draft) = open_draft(&session, &drafts) else {
        return redirect("/products/new");
    };

    match show_editor_service(&draft, repo.get_ref()) {
        Ok(editor) => {
            let mut context = base_context(&flash_messages, "products");
            context.insert("editor", &editor);
            render_template(&tera, "products/editor.html", &context)
        }
        Err(err) => {
            log::error!("Failed to render product editor: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/products/editor/fields")]
pub async fn update_fields(
    session: Session,
    drafts: web::Data<DraftStore>,
    web::Form(form): web::Form<ProductDraftForm>,
) -> impl Responder {
    let Some(draft) = open_draft(&session, &drafts) else {
        return no_open_draft();
    };
    match form.into_actions(&draft) {
        Ok(actions) => update_draft(&session, &drafts, actions),
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            redirect(EDITOR_URL)
        }
    }
}

#[post("/products/editor/combo")]
pub async fn set_combo_mode(
    session: Session,
    drafts: web::Data<DraftStore>,
    web::Form(form): web::Form<ComboModeForm>,
) -> impl Responder {
    update_draft(&session, &drafts, vec![form.into()])
}

#[post("/products/editor/combo/toggle")]
pub async fn toggle_combo_product(
    session: Session,
    drafts: web::Data<DraftStore>,
    web::Form(form): web::Form<ToggleComboProductForm>,
) -> impl Responder {
    match DraftAction::try_from(form) {
        Ok(action) => update_draft(&session, &drafts, vec![action]),
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            redirect(EDITOR_URL)
        }
    }
}

#[post("/products/editor/images")]
pub async fn upload_images(
    session: Session,
    drafts: web::Data<DraftStore>,
    bootstrap: web::Data<StorageBootstrap>,
    storage: web::Data<FsObjectStorage>,
    MultipartForm(form): MultipartForm<UploadImagesForm>,
) -> impl Responder {
    let Some(key) = draft_key(&session) else {
        return no_open_draft();
    };

    let payload: UploadImagesFormPayload = match form.try_into() {
        Ok(payload) => payload,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(EDITOR_URL);
        }
    };
    let count = payload.files.len();

    match upload_draft_images_service(
        drafts.get_ref(),
        &key,
        payload.slot,
        payload.files,
        bootstrap.get_ref(),
        storage.get_ref(),
    )
    .await
    {
        Ok(_) => {
            FlashMessage::success(format!("Uploaded {count} image(s) successfully")).send();
        }
        Err(ServiceError::NotFound) => return no_open_draft(),
        Err(ServiceError::Form(message)) => FlashMessage::error(message).send(),
        Err(ServiceError::StorageUnavailable(reason)) => {
            FlashMessage::error(format!("Failed to upload images: {reason}")).send()
        }
        Err(err) => {
            log::error!("Failed to upload product images: {err}");
            FlashMessage::error("Failed to upload images").send();
        }
    }

    redirect(EDITOR_URL)
}

#[post("/products/editor/images/remove")]
pub async fn remove_image(
    session: Session,
    drafts: web::Data<DraftStore>,
    web::Form(form): web::Form<RemoveImageForm>,
) -> impl Responder {
    match DraftAction::try_from(form) {
        Ok(action) => update_draft(&session, &drafts, vec![action]),
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            redirect(EDITOR_URL)
        }
    }
}

/// Saves the posted fields into the draft, then stores the product.
#[post("/products/editor/submit")]
pub async fn submit_product(
    session: Session,
    drafts: web::Data<DraftStore>,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ProductDraftForm>,
) -> impl Responder {
    let Some(draft) = open_draft(&session, &drafts) else {
        return no_open_draft();
    };

    let draft = match form
        .into_actions(&draft)
        .map_err(ServiceError::from)
        .and_then(|actions| apply_draft_actions(draft, actions))
    {
        Ok(draft) => draft,
        Err(e) => {
            FlashMessage::error(e.to_string()).send();
            return redirect(EDITOR_URL);
        }
    };
    if !save_draft(&session, &drafts, draft.clone()) {
        return HttpResponse::InternalServerError().finish();
    }

    let is_edit = draft.id().is_some();
    match submit_draft_service(&draft, repo.get_ref()) {
        Ok(_) => {
            close_draft(&session, &drafts);
            if is_edit {
                FlashMessage::success("Product updated successfully").send();
            } else {
                FlashMessage::success("Product created successfully").send();
            }
            redirect("/products")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(EDITOR_URL)
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error("Product not found.").send();
            redirect(EDITOR_URL)
        }
        Err(err) => {
            log::error!("Failed to submit product: {err}");
            let action = if is_edit { "update" } else { "create" };
            FlashMessage::error(format!("Failed to {action} product")).send();
            redirect(EDITOR_URL)
        }
    }
}

#[post("/products/editor/cancel")]
pub async fn cancel_editing(session: Session, drafts: web::Data<DraftStore>) -> impl Responder {
    close_draft(&session, &drafts);
    redirect("/products")
}
