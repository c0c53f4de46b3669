// src/models/mod.rs
pub mod class;
pub mod registration;
pub mod session;
pub mod subject;
pub mod user;
