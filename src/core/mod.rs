pub mod errors;
pub mod models;
pub mod permissions;
pub mod services;
