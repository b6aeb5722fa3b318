use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::error::DashboardError;
use crate::models::{EntityKind, FeatureRow};

const FEATURE_NAMES: [&str; 2] = ["positive_events", "negative_events"];

/// Maps feature rows to positive-class (recruitment risk) probabilities,
/// one per row. Loaded once at startup and shared read-only.
pub trait Predictor: Send + Sync {
    fn predict_proba(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, DashboardError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub features: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LogisticModel {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model file {}", path.display()))?;
        let model: LogisticModel = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse model file {}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.coefficients.len() != FEATURE_NAMES.len() {
            anyhow::bail!(
                "model has {} coefficients, expected {}",
                self.coefficients.len(),
                FEATURE_NAMES.len()
            );
        }
        if self.features.iter().map(String::as_str).ne(FEATURE_NAMES) {
            anyhow::bail!(
                "model features {:?} do not match {:?}",
                self.features,
                FEATURE_NAMES
            );
        }
        Ok(())
    }

    fn probability(&self, row: &FeatureRow) -> f64 {
        let logit = self.intercept
            + row
                .values()
                .iter()
                .zip(&self.coefficients)
                .map(|(value, weight)| value * weight)
                .sum::<f64>();
        1.0 / (1.0 + (-logit).exp())
    }
}

impl Predictor for LogisticModel {
    fn predict_proba(&self, rows: &[FeatureRow]) -> Result<Vec<f64>, DashboardError> {
        let probabilities: Vec<f64> = rows.iter().map(|row| self.probability(row)).collect();
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(DashboardError::Predictor(
                "non-finite probability".to_string(),
            ));
        }
        Ok(probabilities)
    }
}

/// Teams report the mean probability across members; employees report
/// their single row.
pub fn aggregate_risk(kind: EntityKind, probabilities: &[f64]) -> Result<f64, DashboardError> {
    let first = *probabilities
        .first()
        .ok_or(DashboardError::EmptyInput("risk prediction"))?;

    match kind {
        EntityKind::Team => Ok(probabilities.iter().sum::<f64>() / probabilities.len() as f64),
        EntityKind::Employee => Ok(first),
    }
}
