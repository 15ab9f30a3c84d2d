//! Product Lookup implementations.

pub mod inmemory;

pub use inmemory::{CatalogError, InMemoryProductCatalog};
