use thiserror::Error;

use crate::models::EntityKind;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("no {kind} with id {id}")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("{0} returned no rows")]
    EmptyInput(&'static str),

    #[error("unrecognized profile type '{0}', expected 'Employee' or 'Team'")]
    UnrecognizedKind(String),

    #[error("selection '{0}' is not a valid entity id")]
    InvalidSelection(String),

    #[error("{0} needs an entity id to render")]
    MissingEntityId(&'static str),

    #[error("prediction failed: {0}")]
    Predictor(String),

    #[error("chart drawing failed: {0}")]
    Render(String),

    #[error("filter flow stopped in an unexpected state: {0}")]
    InvalidTransition(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
