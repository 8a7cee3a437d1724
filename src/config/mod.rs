/// Database connection management and schema creation
pub mod database;

/// Catalog seed loading from catalog.toml
pub mod catalog;

/// Process settings read from environment variables
pub mod settings;
