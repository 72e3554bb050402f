pub use errors::{ServiceError, ServiceResult};

pub mod api;
pub mod brands;
pub mod categories;
pub mod drafts;
pub mod errors;
pub mod products;
pub mod storage;
