//! Entity descriptor and the outcomes of resource operations.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, ModelTrait, Select,
};
use serde::{de::DeserializeOwned, Serialize};

use models::{Record, Submission};

pub mod crud;

/// Describes one catalog entity to the generic CRUD operations.
///
/// Implementations name the `sea-orm` entity types, the client-facing payload
/// and view types, the id/version columns, and how a select is expanded into
/// views (the eager-fetch joins of that entity).
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Entity: EntityTrait<Model = Self::Model, ActiveModel = Self::ActiveModel, Column = Self::Column>;
    type Model: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::ActiveModel>
        + Record
        + Sync;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync;
    type Column: ColumnTrait;
    /// Request body on create and update.
    type Payload: Submission + IntoActiveModel<Self::ActiveModel> + DeserializeOwned + Send + 'static;
    /// Response body on reads, references resolved.
    type View: Record + Serialize + Send + Sync + 'static;

    /// Singular name: XML root element, log field, metrics label.
    const NAME: &'static str;
    /// Plural path segment, e.g. `categories`.
    const COLLECTION: &'static str;

    fn id_column() -> Self::Column;
    fn version_column() -> Self::Column;

    /// Run `query` (already filtered, ordered and windowed) and build views,
    /// joining whatever this entity eagerly fetches.
    async fn fetch<C>(db: &C, query: Select<Self::Entity>) -> Result<Vec<Self::View>, DbErr>
    where
        C: ConnectionTrait;
}

/// Result of a lookup by id.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Absent,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::Absent => None,
        }
    }

    pub fn is_absent(&self) -> bool { matches!(self, Lookup::Absent) }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Lookup::Found(v),
            None => Lookup::Absent,
        }
    }
}

/// Result of a version-guarded update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome<T> {
    /// Written; carries the new state with its incremented version.
    Updated(T),
    /// Version token was stale; carries the state currently stored.
    Conflict(T),
    /// No record with that id.
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Absent,
}
