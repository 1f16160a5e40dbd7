//! Pre-trained regression model loaded from disk

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{AppError, Result};

/// Anything that maps a feature row to a single value
pub trait Predictor: Send + Sync {
    /// Human readable model name for logs and health output
    fn name(&self) -> &str;

    /// Number of features a row must have
    fn n_features(&self) -> usize;

    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Ordinary least squares model exported as JSON:
///
/// ```json
/// { "coefficients": [1.27], "intercept": -0.4 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinearRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default, skip_serializing)]
    name: String,
}

impl LinearRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self> {
        let model = Self {
            coefficients,
            intercept,
            name: "linear-regression".to_string(),
        };
        model.check()?;
        Ok(model)
    }

    /// Read and validate a model file
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::ModelUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut model: LinearRegression = serde_json::from_str(&content)
            .map_err(|e| AppError::Model(format!("invalid model file {}: {}", path.display(), e)))?;
        model.check()?;
        model.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("linear-regression")
            .to_string();

        info!(
            model = %model.name,
            features = model.coefficients.len(),
            "Regression model loaded"
        );

        Ok(model)
    }

    fn check(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            return Err(AppError::Model("model has no coefficients".to_string()));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(AppError::Model("model parameters must be finite".to_string()));
        }
        Ok(())
    }
}

impl Predictor for LinearRegression {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(AppError::InvalidRequest(format!(
                "expected {} feature(s), got {}",
                self.coefficients.len(),
                features.len()
            )));
        }
        if features.iter().any(|f| !f.is_finite()) {
            return Err(AppError::InvalidRequest("features must be finite numbers".to_string()));
        }

        let value = self
            .coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (c, x)| acc + c * x);

        Ok(value)
    }
}
