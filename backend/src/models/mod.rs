pub mod auth;
pub mod pagination;
pub mod principal;
pub mod user;
