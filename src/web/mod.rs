// src/web/mod.rs
pub mod auth_handlers;
pub mod catalog_handlers;
pub mod mw_auth;
pub mod mw_role;
pub mod registration_handlers;
pub mod response;
pub mod routes;
pub mod schedule_handlers;
pub mod session_handlers;
pub mod user_handlers;
