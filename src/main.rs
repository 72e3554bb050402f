use std::env;
use std::time::Duration;

use actix_files::Files;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
use config::Config;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use dotenvy::dotenv;
use tera::Tera;

use storefront_admin::db::establish_connection_pool;
use storefront_admin::domain::storage::BucketConfig;
use storefront_admin::domain::types::BucketName;
use storefront_admin::models::config::ServerConfig;
use storefront_admin::repository::DieselRepository;
use storefront_admin::routes::api::api_v1_products;
use storefront_admin::routes::brands::{add_brand, delete_brand, quick_add_brand, show_brands, update_brand};
use storefront_admin::routes::categories::{
    add_category, add_subcategory, delete_category, remove_subcategory, rename_category,
    show_categories,
};
use storefront_admin::routes::main::index;
use storefront_admin::routes::products::{
    cancel_editing, delete_product, edit_product, new_product, remove_image, set_combo_mode,
    show_editor, show_products, submit_product, toggle_combo_product, update_fields,
    upload_images,
};
use storefront_admin::routes::storage::{setup_storage, show_storage};
use storefront_admin::services::drafts::DraftStore;
use storefront_admin::services::storage::{StorageBootstrap, bootstrap_storage};
use storefront_admin::storage::FsObjectStorage;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    Config::builder()
        .add_source(config::File::with_name("config/default"))
        .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match load_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            log::error!("Failed to load server config: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    match pool.get() {
        Ok(mut conn) => {
            if let Err(e) = conn.run_pending_migrations(MIGRATIONS) {
                log::error!("Failed to run database migrations: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            log::error!("Failed to get a connection for migrations: {e}");
            std::process::exit(1);
        }
    }

    let tera = match Tera::new(&format!("{}/**/*", server_config.templates_dir)) {
        Ok(tera) => tera,
        Err(e) => {
            log::error!("Failed to parse templates: {e}");
            std::process::exit(1);
        }
    };

    let bucket_name = match BucketName::new(server_config.storage.bucket.as_str()) {
        Ok(name) => name,
        Err(e) => {
            log::error!("Invalid storage bucket name: {e}");
            std::process::exit(1);
        }
    };
    let storage = web::Data::new(FsObjectStorage::new(
        &server_config.storage.root,
        server_config.storage.public_url.as_str(),
    ));
    let bootstrap = web::Data::new(StorageBootstrap::new(BucketConfig::product_images(
        bucket_name,
    )));
    bootstrap_storage(bootstrap.get_ref(), storage.get_ref()).await;

    let secret_key = if server_config.secret.len() >= 64 {
        Key::from(server_config.secret.as_bytes())
    } else {
        log::warn!("Configured secret is shorter than 64 bytes; using a random cookie key");
        Key::generate()
    };

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let repo = web::Data::new(DieselRepository::new(pool));
    let drafts = web::Data::new(DraftStore::new(Duration::from_secs(
        server_config.draft_idle_minutes * 60,
    )));
    let tera = web::Data::new(tera);
    let storage_root = server_config.storage.root.clone();
    let bind_address = (server_config.address.clone(), server_config.port);

    log::info!(
        "Starting server at http://{}:{}",
        server_config.address,
        server_config.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(Logger::default())
            .service(Files::new("/storage", &storage_root))
            .service(web::scope("/api").service(api_v1_products))
            .service(index)
            .service(show_products)
            .service(new_product)
            .service(show_editor)
            .service(update_fields)
            .service(set_combo_mode)
            .service(toggle_combo_product)
            .service(upload_images)
            .service(remove_image)
            .service(submit_product)
            .service(cancel_editing)
            .service(edit_product)
            .service(delete_product)
            .service(show_categories)
            .service(add_category)
            .service(rename_category)
            .service(delete_category)
            .service(add_subcategory)
            .service(remove_subcategory)
            .service(show_brands)
            .service(quick_add_brand)
            .service(add_brand)
            .service(update_brand)
            .service(delete_brand)
            .service(show_storage)
            .service(setup_storage)
            .app_data(repo.clone())
            .app_data(drafts.clone())
            .app_data(storage.clone())
            .app_data(bootstrap.clone())
            .app_data(tera.clone())
    })
    .bind(bind_address)?
    .run()
    .await
}
