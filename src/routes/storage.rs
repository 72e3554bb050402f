use actix_web::{Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::storage::BootstrapState;
use crate::routes::{base_context, redirect, render_template};
use crate::services::storage::{StorageBootstrap, bootstrap_storage, check_storage_access};
use crate::storage::FsObjectStorage;

#[get("/settings/storage")]
pub async fn show_storage(
    flash_messages: IncomingFlashMessages,
    bootstrap: web::Data<StorageBootstrap>,
    storage: web::Data<FsObjectStorage>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, "storage");
    context.insert("bucket", bootstrap.bucket());
    context.insert("state", &bootstrap.state());

    // The access check is only meaningful once the bucket is known to exist.
    if bootstrap.state().is_ready() {
        match check_storage_access(bootstrap.get_ref(), storage.get_ref()).await {
            Ok(objects) => {
                context.insert("accessible", &true);
                context.insert("object_count", &objects);
            }
            Err(err) => {
                context.insert("accessible", &false);
                context.insert("access_error", &err.to_string());
            }
        }
    }
    if let BootstrapState::Failed(_) = bootstrap.state() {
        context.insert("manual_setup_hint", &bootstrap.manual_setup_hint());
    }

    render_template(&tera, "storage/index.html", &context)
}

/// Runs the bucket bootstrap again on operator request.
#[post("/settings/storage")]
pub async fn setup_storage(
    bootstrap: web::Data<StorageBootstrap>,
    storage: web::Data<FsObjectStorage>,
) -> impl Responder {
    match bootstrap_storage(bootstrap.get_ref(), storage.get_ref()).await {
        BootstrapState::Ready => {
            FlashMessage::success("Storage bucket is configured and accessible").send()
        }
        BootstrapState::Failed(reason) => FlashMessage::error(format!(
            "Setup failed: {reason}. {}",
            bootstrap.manual_setup_hint()
        ))
        .send(),
        BootstrapState::Unchecked => {}
    }

    redirect("/settings/storage")
}
