//! The two-step filter interaction: picking a profile type refreshes the
//! selector, submitting the form redirects to the chosen report.
//!
//! No server-side session ties the steps together. Each request starts in
//! `Idle` and carries everything it needs in its own query or form body.

use crate::error::DashboardError;
use crate::models::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSelection {
    pub kind: EntityKind,
    pub entity_id: i64,
}

impl FilterSelection {
    pub fn parse(profile_type: &str, selection: &str) -> Result<Self, DashboardError> {
        let kind = profile_type.parse::<EntityKind>()?;
        let entity_id = selection
            .trim()
            .parse::<i64>()
            .map_err(|_| DashboardError::InvalidSelection(selection.to_string()))?;
        Ok(Self { kind, entity_id })
    }

    pub fn redirect_target(&self) -> String {
        self.kind.report_path(self.entity_id)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FilterEvent<'a> {
    KindChanged(&'a str),
    FragmentReturned,
    Submitted {
        profile_type: &'a str,
        selection: &'a str,
    },
    Redirect,
}

#[derive(Debug)]
pub enum FilterState {
    Idle,
    TypeChanged(EntityKind),
    Submitted(FilterSelection),
    Redirected(String),
    Rejected(DashboardError),
}

impl FilterState {
    pub fn apply(self, event: FilterEvent<'_>) -> FilterState {
        match (self, event) {
            (FilterState::Idle, FilterEvent::KindChanged(profile_type)) => {
                match profile_type.parse::<EntityKind>() {
                    Ok(kind) => FilterState::TypeChanged(kind),
                    Err(e) => FilterState::Rejected(e),
                }
            }
            (FilterState::TypeChanged(_), FilterEvent::FragmentReturned) => FilterState::Idle,
            (
                FilterState::Idle,
                FilterEvent::Submitted {
                    profile_type,
                    selection,
                },
            ) => match FilterSelection::parse(profile_type, selection) {
                Ok(selection) => FilterState::Submitted(selection),
                Err(e) => FilterState::Rejected(e),
            },
            (FilterState::Submitted(selection), FilterEvent::Redirect) => {
                FilterState::Redirected(selection.redirect_target())
            }
            (state @ (FilterState::Redirected(_) | FilterState::Rejected(_)), _) => state,
            (state, event) => {
                tracing::debug!(?state, ?event, "ignoring filter event");
                state
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FilterState::Redirected(_) | FilterState::Rejected(_))
    }
}

/// Applies `events` in order and stops at the first terminal state.
pub fn drive<'a>(
    mut state: FilterState,
    events: impl IntoIterator<Item = FilterEvent<'a>>,
) -> FilterState {
    for event in events {
        if state.is_terminal() {
            break;
        }
        state = state.apply(event);
    }
    state
}

/// Idle -> TypeChanged. The caller renders the selector for the returned
/// kind and then closes the step with [`fragment_returned`].
pub fn type_changed(profile_type: &str) -> Result<EntityKind, DashboardError> {
    match FilterState::Idle.apply(FilterEvent::KindChanged(profile_type)) {
        FilterState::TypeChanged(kind) => Ok(kind),
        FilterState::Rejected(e) => Err(e),
        other => Err(DashboardError::InvalidTransition(format!("{other:?}"))),
    }
}

/// TypeChanged -> Idle. The fragment may only be sent once this succeeds.
pub fn fragment_returned(kind: EntityKind) -> Result<(), DashboardError> {
    match FilterState::TypeChanged(kind).apply(FilterEvent::FragmentReturned) {
        FilterState::Idle => Ok(()),
        other => Err(DashboardError::InvalidTransition(format!("{other:?}"))),
    }
}

/// Idle -> Submitted -> Redirected, returning the report path to redirect to.
pub fn submitted(profile_type: &str, selection: &str) -> Result<String, DashboardError> {
    let state = drive(
        FilterState::Idle,
        [
            FilterEvent::Submitted {
                profile_type,
                selection,
            },
            FilterEvent::Redirect,
        ],
    );
    redirect_target(state)
}

fn redirect_target(state: FilterState) -> Result<String, DashboardError> {
    match state {
        FilterState::Redirected(target) => Ok(target),
        FilterState::Rejected(e) => Err(e),
        other => Err(DashboardError::InvalidTransition(format!("{other:?}"))),
    }
}
