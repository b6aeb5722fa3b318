use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Employee,
    Team,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::Employee, EntityKind::Team];

    /// Lowercase display name, also used as the route prefix.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employee",
            EntityKind::Team => "team",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Employee => "Employee",
            EntityKind::Team => "Team",
        }
    }

    pub fn table(&self) -> &'static str {
        self.name()
    }

    pub fn id_column(&self) -> &'static str {
        match self {
            EntityKind::Employee => "employee_id",
            EntityKind::Team => "team_id",
        }
    }

    pub fn report_path(&self, id: i64) -> String {
        format!("/{}/{}", self.name(), id)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Employee" => Ok(EntityKind::Employee),
            "Team" => Ok(EntityKind::Team),
            other => Err(DashboardError::UnrecognizedKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectable {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCount {
    pub event_date: NaiveDate,
    pub positive_events: Option<i64>,
    pub negative_events: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub positive_events: f64,
    pub negative_events: f64,
}

impl FeatureRow {
    pub fn values(&self) -> [f64; 2] {
        [self.positive_events, self.negative_events]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub note_date: NaiveDate,
    pub content: String,
}
