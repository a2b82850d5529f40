pub mod api_router;
pub mod auth;
pub mod config;
pub mod contacts;
pub mod import_export;
pub mod shared;
