//! Position model - the two-axis coordinate selecting which content plays
//!
//! The axis domains are configuration, not a fixed enum: the installation
//! went through iterations with two- and three-value economic axes, so the
//! allowed values live in [`AxisDomain`] and positions are validated
//! against it at config-load time.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A point on the installation's two-axis grid
///
/// Value type: two positions are the same position iff both axis values
/// match. The strings are axis values drawn from the configured
/// [`AxisDomain`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Economic axis value (e.g. "collective", "neutral", "neoliberal")
    pub horizontal: String,
    /// Social axis value (e.g. "progressive", "authoritative")
    pub vertical: String,
}

impl Position {
    pub fn new(horizontal: impl Into<String>, vertical: impl Into<String>) -> Self {
        Self {
            horizontal: horizontal.into(),
            vertical: vertical.into(),
        }
    }

    /// Catalog lookup key, `<horizontal>_<vertical>`
    pub fn key(&self) -> String {
        format!("{}_{}", self.horizontal, self.vertical)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.horizontal, self.vertical)
    }
}

/// Ordered sets of allowed values per axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisDomain {
    /// Economic axis values, ordered left to right
    pub horizontal: Vec<String>,
    /// Social axis values, ordered bottom to top
    pub vertical: Vec<String>,
}

impl AxisDomain {
    /// Validate a position against this domain
    pub fn validate(&self, position: &Position) -> Result<()> {
        if !self.horizontal.contains(&position.horizontal) {
            return Err(Error::UnknownAxisValue {
                axis: "horizontal".into(),
                value: position.horizontal.clone(),
            });
        }
        if !self.vertical.contains(&position.vertical) {
            return Err(Error::UnknownAxisValue {
                axis: "vertical".into(),
                value: position.vertical.clone(),
            });
        }
        Ok(())
    }

    /// Map a fraction in [0, 1] onto the horizontal axis
    ///
    /// The range is divided into equal buckets over the ordered values, so
    /// an analog slider sweeps through every configured value.
    pub fn horizontal_for_fraction(&self, fraction: f64) -> &str {
        Self::bucket(&self.horizontal, fraction)
    }

    /// Map a fraction in [0, 1] onto the vertical axis
    pub fn vertical_for_fraction(&self, fraction: f64) -> &str {
        Self::bucket(&self.vertical, fraction)
    }

    fn bucket(values: &[String], fraction: f64) -> &str {
        debug_assert!(!values.is_empty());
        let clamped = fraction.clamp(0.0, 1.0);
        let index = ((clamped * values.len() as f64) as usize).min(values.len() - 1);
        &values[index]
    }

    fn require_axis(name: &str, values: &[String]) -> Result<()> {
        if values.is_empty() {
            return Err(Error::InvalidConfig(format!("{name} axis has no values")));
        }
        Ok(())
    }

    /// Check both axes carry at least one value
    pub fn validate_domain(&self) -> Result<()> {
        Self::require_axis("horizontal", &self.horizontal)?;
        Self::require_axis("vertical", &self.vertical)
    }
}

impl Default for AxisDomain {
    fn default() -> Self {
        Self {
            horizontal: vec![
                "collective".into(),
                "neutral".into(),
                "neoliberal".into(),
            ],
            vertical: vec!["progressive".into(), "authoritative".into()],
        }
    }
}
