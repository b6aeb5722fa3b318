//! HTTP routes for the dashboard.
//!
//! Report routes return full pages, `/update_dropdown` returns the selector
//! fragment swapped in by htmx, and `/update_data` redirects to a report.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;

use crate::entity::{DataSource, EntityModel};
use crate::error::DashboardError;
use crate::filter;
use crate::html::{self, escape};
use crate::models::EntityKind;
use crate::report::{report_dropdown, Report};

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn DataSource>,
    pub report: Arc<Report>,
}

impl AppState {
    fn model(&self, kind: EntityKind) -> EntityModel {
        EntityModel::new(kind, self.source.clone())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/employee/{id}", get(employee))
        .route("/team/{id}", get(team))
        .route("/update_dropdown", get(update_dropdown))
        .route("/update_data", post(update_data))
        .with_state(state)
}

fn status_for(error: &DashboardError) -> StatusCode {
    match error {
        DashboardError::NotFound { .. } => StatusCode::NOT_FOUND,
        DashboardError::UnrecognizedKind(_) | DashboardError::InvalidSelection(_) => {
            StatusCode::BAD_REQUEST
        }
        DashboardError::EmptyInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::MissingEntityId(_)
        | DashboardError::Predictor(_)
        | DashboardError::Render(_)
        | DashboardError::InvalidTransition(_)
        | DashboardError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Logs the failure and returns its status with an `<article>` describing it.
fn error_article(error: &DashboardError) -> (StatusCode, String) {
    let status = status_for(error);
    if status.is_server_error() {
        tracing::error!(error = %error, "request failed");
    } else {
        tracing::warn!(status = status.as_u16(), error = %error, "request rejected");
    }

    let body = format!(
        "<article><h2>{}</h2><p>{}</p></article>",
        status.canonical_reason().unwrap_or("Error"),
        escape(&error.to_string())
    );
    (status, body)
}

/// Fragment and redirect routes answer with the bare article.
impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, body) = error_article(&self);
        (status, Html(body)).into_response()
    }
}

/// Error from a full-page route, rendered as a complete document.
#[derive(Debug)]
pub struct PageError(DashboardError);

impl From<DashboardError> for PageError {
    fn from(error: DashboardError) -> Self {
        Self(error)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, body) = error_article(&self.0);
        let title = status.canonical_reason().unwrap_or("Error");
        (status, Html(html::page(title, &body))).into_response()
    }
}

async fn render_report(
    state: &AppState,
    kind: EntityKind,
    id: i64,
) -> Result<Html<String>, PageError> {
    tracing::info!(entity = kind.name(), id, "rendering report");
    let model = state.model(kind);
    Ok(Html(state.report.render(id, &model).await?))
}

async fn index(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    render_report(&state, EntityKind::Employee, 1).await
}

async fn employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    render_report(&state, EntityKind::Employee, id).await
}

async fn team(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, PageError> {
    render_report(&state, EntityKind::Team, id).await
}

#[derive(Debug, Deserialize)]
pub struct DropdownQuery {
    #[serde(default)]
    pub profile_type: String,
}

async fn update_dropdown(
    State(state): State<AppState>,
    Query(query): Query<DropdownQuery>,
) -> Result<Html<String>, DashboardError> {
    let kind = filter::type_changed(&query.profile_type)?;
    tracing::info!(entity = kind.name(), "refreshing selector");

    let fragment = report_dropdown().render(None, &state.model(kind)).await?;
    filter::fragment_returned(kind)?;
    Ok(Html(fragment))
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub profile_type: String,
    #[serde(rename = "user-selection", default)]
    pub user_selection: String,
}

async fn update_data(Form(form): Form<UpdateForm>) -> Result<Redirect, DashboardError> {
    let target = filter::submitted(&form.profile_type, &form.user_selection)?;
    tracing::info!(%target, "redirecting to report");
    Ok(Redirect::to(&target))
}
