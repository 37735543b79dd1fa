//! Data access layer for application entities.

pub mod session_repository;
pub mod user_repository;
