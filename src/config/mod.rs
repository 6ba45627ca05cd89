/// Database configuration and connection management
pub mod database;

/// Master data seeding from config.toml
pub mod seed;

/// Runtime settings read from environment variables
pub mod settings;
