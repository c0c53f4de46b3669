// src/services/mod.rs
pub mod auth_service;
pub mod catalog_service;
pub mod conflict_service;
pub mod registration_service;
pub mod session_service;
pub mod user_service;
