use thiserror::Error;

/// Failures that are not part of a resource's normal outcomes.
///
/// Missing records and version conflicts are reported through
/// [`crate::resource::Lookup`], [`crate::resource::UpdateOutcome`] and
/// [`crate::resource::DeleteOutcome`] instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}
