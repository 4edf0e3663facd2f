//! Storage layer (`SQLite` profile registry)

pub mod db;
pub mod migrations;
pub mod profiles;

pub use db::{Database, DatabaseError};
pub use profiles::{ProfileStore, RegistryError};
