//! # cimaise-entity
//!
//! Row models for Cimaise. Every struct here maps to a database table row
//! and derives `Debug`, `Clone`, `Serialize`, `Deserialize` and
//! `sqlx::FromRow`.

pub mod plugin;
pub mod setting;
