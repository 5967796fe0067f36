pub mod api;
pub mod categories;
pub mod image;
pub mod models;
pub mod policy;
pub mod swap;
pub mod validate;
