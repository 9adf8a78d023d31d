// Saved information sheets: records, PostgreSQL persistence, JSON backup bundles and the
// CRUD handlers over them.

pub mod handlers;
pub mod models;
pub mod repository;
pub mod transfer;
