pub mod config;
pub mod import;
pub mod list;
pub mod sku;
pub mod template;
