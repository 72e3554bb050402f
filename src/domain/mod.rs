pub mod brand;
pub mod category;
pub mod draft;
pub mod product;
pub mod storage;
pub mod types;
