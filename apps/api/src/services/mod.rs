//! Business services sitting between the routes and the database.

pub mod sale_service;

pub use sale_service::SaleProcessor;
