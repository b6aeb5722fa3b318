//! Entity model shared by the employee and team reports.
//!
//! An `EntityModel` pairs the entity kind with the data source, so every
//! id-taking call resolves against exactly one kind.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DashboardError;
use crate::models::{EntityKind, EventCount, FeatureRow, Note, Selectable};

/// Query layer behind the dashboard. Id-taking methods return
/// `DashboardError::NotFound` for ids with no backing record.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn selectable(&self, kind: EntityKind) -> Result<Vec<Selectable>, DashboardError>;

    async fn event_counts(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<Vec<EventCount>, DashboardError>;

    async fn feature_rows(
        &self,
        kind: EntityKind,
        id: i64,
    ) -> Result<Vec<FeatureRow>, DashboardError>;

    async fn notes(&self, kind: EntityKind, id: i64) -> Result<Vec<Note>, DashboardError>;
}

#[derive(Clone)]
pub struct EntityModel {
    kind: EntityKind,
    source: Arc<dyn DataSource>,
}

impl EntityModel {
    pub fn new(kind: EntityKind, source: Arc<dyn DataSource>) -> Self {
        Self { kind, source }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub async fn list_selectable(&self) -> Result<Vec<Selectable>, DashboardError> {
        self.source.selectable(self.kind).await
    }

    pub async fn event_counts(&self, id: i64) -> Result<Vec<EventCount>, DashboardError> {
        self.source.event_counts(self.kind, id).await
    }

    pub async fn feature_vector(&self, id: i64) -> Result<Vec<FeatureRow>, DashboardError> {
        self.source.feature_rows(self.kind, id).await
    }

    pub async fn notes(&self, id: i64) -> Result<Vec<Note>, DashboardError> {
        self.source.notes(self.kind, id).await
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::{DataSource, EntityModel};
    use crate::error::DashboardError;
    use crate::models::{EntityKind, EventCount, FeatureRow, Note, Selectable};
    use crate::risk::Predictor;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// In-memory stand-in for the SQLite query layer.
    #[derive(Default)]
    pub struct FixtureSource {
        pub entities: HashMap<EntityKind, Vec<Selectable>>,
        pub events: HashMap<(EntityKind, i64), Vec<EventCount>>,
        pub features: HashMap<(EntityKind, i64), Vec<FeatureRow>>,
        pub notes: HashMap<(EntityKind, i64), Vec<Note>>,
    }

    impl FixtureSource {
        pub fn sample() -> Self {
            let mut source = FixtureSource::default();
            source.entities.insert(
                EntityKind::Employee,
                vec![
                    Selectable {
                        id: 1,
                        label: "Avery Lee".to_string(),
                    },
                    Selectable {
                        id: 2,
                        label: "Jules Moreno".to_string(),
                    },
                ],
            );
            source.entities.insert(
                EntityKind::Team,
                vec![Selectable {
                    id: 7,
                    label: "Atlas".to_string(),
                }],
            );

            for (kind, id) in [
                (EntityKind::Employee, 1),
                (EntityKind::Employee, 2),
                (EntityKind::Team, 7),
            ] {
                source.events.insert(
                    (kind, id),
                    vec![
                        EventCount {
                            event_date: date(2023, 1, 3),
                            positive_events: Some(2),
                            negative_events: None,
                        },
                        EventCount {
                            event_date: date(2023, 1, 1),
                            positive_events: Some(1),
                            negative_events: Some(1),
                        },
                    ],
                );
                source.notes.insert(
                    (kind, id),
                    vec![Note {
                        note_date: date(2023, 1, 2),
                        content: "Asked about <remote> work".to_string(),
                    }],
                );
            }

            let row = FeatureRow {
                positive_events: 3.0,
                negative_events: 1.0,
            };
            source.features.insert((EntityKind::Employee, 1), vec![row]);
            source.features.insert((EntityKind::Employee, 2), vec![row]);
            source.features.insert((EntityKind::Team, 7), vec![row, row, row]);
            source
        }

        fn known(&self, kind: EntityKind, id: i64) -> Result<(), DashboardError> {
            let known = self
                .entities
                .get(&kind)
                .map(|items| items.iter().any(|item| item.id == id))
                .unwrap_or(false);
            if known {
                Ok(())
            } else {
                Err(DashboardError::NotFound { kind, id })
            }
        }
    }

    #[async_trait]
    impl DataSource for FixtureSource {
        async fn selectable(&self, kind: EntityKind) -> Result<Vec<Selectable>, DashboardError> {
            Ok(self.entities.get(&kind).cloned().unwrap_or_default())
        }

        async fn event_counts(
            &self,
            kind: EntityKind,
            id: i64,
        ) -> Result<Vec<EventCount>, DashboardError> {
            self.known(kind, id)?;
            Ok(self.events.get(&(kind, id)).cloned().unwrap_or_default())
        }

        async fn feature_rows(
            &self,
            kind: EntityKind,
            id: i64,
        ) -> Result<Vec<FeatureRow>, DashboardError> {
            self.known(kind, id)?;
            Ok(self.features.get(&(kind, id)).cloned().unwrap_or_default())
        }

        async fn notes(&self, kind: EntityKind, id: i64) -> Result<Vec<Note>, DashboardError> {
            self.known(kind, id)?;
            // No notes entry fails the notes leaf on its own.
            self.notes
                .get(&(kind, id))
                .cloned()
                .ok_or(DashboardError::NotFound { kind, id })
        }
    }

    /// Returns the configured probabilities in order, cycling when there
    /// are more rows than values.
    pub struct StubPredictor {
        pub probabilities: Vec<f64>,
    }

    impl Predictor for StubPredictor {
        fn predict_proba(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, DashboardError> {
            Ok((0..rows.len())
                .map(|i| self.probabilities[i % self.probabilities.len()])
                .collect())
        }
    }

    pub fn stub_predictor(probabilities: &[f64]) -> Arc<dyn Predictor> {
        Arc::new(StubPredictor {
            probabilities: probabilities.to_vec(),
        })
    }

    pub fn model(kind: EntityKind, source: FixtureSource) -> EntityModel {
        EntityModel::new(kind, Arc::new(source))
    }
}
