//! Catalog entities and the representations exchanged with clients.
//!
//! Every table carries an auto-increment `id` and an integer `version` token.
//! `Payload` types are what clients submit, `View` types what they read back
//! (with eagerly fetched references embedded).

pub mod db;
pub mod category;
pub mod product;
pub mod item;

/// Version assigned to a row when it is first stored.
pub const INITIAL_VERSION: i32 = 1;

/// Identity and version token of a stored row.
pub trait Record {
    fn id(&self) -> i32;
    fn version(&self) -> i32;
}

/// Identity and version token as submitted by a client; either may be missing.
pub trait Submission {
    fn id(&self) -> Option<i32>;
    fn version(&self) -> Option<i32>;
}

#[cfg(test)]
mod tests;
