//! Shared fixtures for the integration tests.

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use storefront_admin::db::{DbPool, establish_connection_pool};
use storefront_admin::repository::DieselRepository;
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Migrated SQLite catalog in a temp file, removed on drop.
pub struct TestDb {
    _file: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let file = NamedTempFile::new().expect("temp database file");
        let path = file.path().to_str().expect("utf-8 temp path");
        let pool = establish_connection_pool(path).expect("SQLite pool");
        pool.get()
            .expect("pooled connection")
            .run_pending_migrations(MIGRATIONS)
            .expect("catalog migrations");

        TestDb { _file: file, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}
