//! Category/member graph consumed by the layout engine.
//!
//! This module contains:
//! - `Registry` - Immutable arena of categories and members, keyed by id
//! - `RegistryBuilder` - Two-phase construction with linking and validation
//! - `Catalog` - YAML catalogue files
//! - `number_registry` - The built-in number set catalogue

pub mod catalog;
pub mod numbers;
mod registry;
pub(crate) mod validations;

pub use catalog::{Catalog, CatalogError, load_registry};
pub use numbers::number_registry;
pub use registry::{Category, CategoryId, Member, MemberId, Registry, RegistryBuilder};
pub use validations::ModelError;
