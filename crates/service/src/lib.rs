//! Service layer providing the catalog CRUD operations on top of models.
//! - One generic operation set, parameterised by a [`resource::Resource`] descriptor.
//! - Not-found and version conflicts are explicit outcomes, never errors.
//! - The database connection is passed into every call; nothing is cached here.

pub mod errors;
pub mod pagination;
pub mod metrics;
pub mod resource;
pub mod catalog;
#[cfg(test)]
pub mod test_support;

pub use catalog::{Categories, Items, Products};
pub use resource::{DeleteOutcome, Lookup, Resource, UpdateOutcome};
