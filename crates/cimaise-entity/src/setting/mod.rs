//! Site settings entities.

pub mod model;

pub use model::Setting;
