//! # Optimizer Settings
//!
//! Optimizers are configured here and handed to the model framework,
//! which receives both the typed value and a `Name(k=v, ...)` rendering.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::errors::{BNResult, BertNodesError};

/// Adam parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamSettings {
    /// Step size.
    pub learning_rate: f64,
    /// First moment decay.
    pub beta_1: f64,
    /// Second moment decay.
    pub beta_2: f64,
    /// Numerical stability constant.
    pub epsilon: f64,
    /// Use the AMSGrad variant.
    pub amsgrad: bool,
}

impl Default for AdamSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            beta_1: 0.9,
            beta_2: 0.999,
            epsilon: 1e-7,
            amsgrad: false,
        }
    }
}

/// Stochastic gradient descent parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SgdSettings {
    /// Step size.
    pub learning_rate: f64,
    /// Momentum factor.
    pub momentum: f64,
    /// Use Nesterov momentum.
    pub nesterov: bool,
}

impl Default for SgdSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.01,
            momentum: 0.0,
            nesterov: false,
        }
    }
}

/// RMSprop parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RmsPropSettings {
    /// Step size.
    pub learning_rate: f64,
    /// Gradient moving-average decay.
    pub rho: f64,
    /// Momentum factor.
    pub momentum: f64,
    /// Numerical stability constant.
    pub epsilon: f64,
    /// Normalize by the centered second moment.
    pub centered: bool,
}

impl Default for RmsPropSettings {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            rho: 0.9,
            momentum: 0.0,
            epsilon: 1e-7,
            centered: false,
        }
    }
}

/// The training optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, strum::Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Optimizer {
    /// Adam.
    #[strum(serialize = "Adam")]
    Adam(AdamSettings),

    /// Stochastic gradient descent.
    #[strum(serialize = "SGD")]
    Sgd(SgdSettings),

    /// RMSprop.
    #[strum(serialize = "RMSprop")]
    RmsProp(RmsPropSettings),
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::Adam(AdamSettings::default())
    }
}

fn check(
    name: &str,
    value: f64,
    ok: bool,
    expected: &str,
) -> BNResult<()> {
    if ok {
        Ok(())
    } else {
        Err(BertNodesError::Config(format!(
            "optimizer {name} must be {expected}, got {value}"
        )))
    }
}

fn unit_interval(
    name: &str,
    value: f64,
) -> BNResult<()> {
    check(name, value, (0.0..1.0).contains(&value), "in [0, 1)")
}

fn positive(
    name: &str,
    value: f64,
) -> BNResult<()> {
    check(name, value, value > 0.0, "positive")
}

fn non_negative(
    name: &str,
    value: f64,
) -> BNResult<()> {
    check(name, value, value >= 0.0, "non-negative")
}

fn py_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

impl Optimizer {
    /// Check parameter ranges.
    pub fn validate(&self) -> BNResult<()> {
        match self {
            Self::Adam(s) => {
                positive("learning_rate", s.learning_rate)?;
                unit_interval("beta_1", s.beta_1)?;
                unit_interval("beta_2", s.beta_2)?;
                positive("epsilon", s.epsilon)
            }
            Self::Sgd(s) => {
                positive("learning_rate", s.learning_rate)?;
                non_negative("momentum", s.momentum)
            }
            Self::RmsProp(s) => {
                positive("learning_rate", s.learning_rate)?;
                unit_interval("rho", s.rho)?;
                non_negative("momentum", s.momentum)?;
                positive("epsilon", s.epsilon)
            }
        }
    }

    /// The learning rate.
    pub fn learning_rate(&self) -> f64 {
        match self {
            Self::Adam(s) => s.learning_rate,
            Self::Sgd(s) => s.learning_rate,
            Self::RmsProp(s) => s.learning_rate,
        }
    }

    /// Render as a framework constructor call, e.g. `SGD(learning_rate=0.01, ...)`.
    pub fn framework_repr(&self) -> String {
        let params: Vec<(&str, String)> = match self {
            Self::Adam(s) => vec![
                ("learning_rate", s.learning_rate.to_string()),
                ("beta_1", s.beta_1.to_string()),
                ("beta_2", s.beta_2.to_string()),
                ("epsilon", s.epsilon.to_string()),
                ("amsgrad", py_bool(s.amsgrad).to_string()),
            ],
            Self::Sgd(s) => vec![
                ("learning_rate", s.learning_rate.to_string()),
                ("momentum", s.momentum.to_string()),
                ("nesterov", py_bool(s.nesterov).to_string()),
            ],
            Self::RmsProp(s) => vec![
                ("learning_rate", s.learning_rate.to_string()),
                ("rho", s.rho.to_string()),
                ("momentum", s.momentum.to_string()),
                ("epsilon", s.epsilon.to_string()),
                ("centered", py_bool(s.centered).to_string()),
            ],
        };

        let mut repr = format!("{self}(");
        for (idx, (key, value)) in params.iter().enumerate() {
            if idx > 0 {
                repr.push_str(", ");
            }
            let _ = write!(repr, "{key}={value}");
        }
        repr.push(')');
        repr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let optimizer = Optimizer::default();
        assert_eq!(optimizer.learning_rate(), 0.001);
        assert_eq!(optimizer.to_string(), "Adam");
        optimizer.validate().unwrap();
    }

    #[test]
    fn test_framework_repr() {
        assert_eq!(
            Optimizer::Sgd(SgdSettings::default()).framework_repr(),
            "SGD(learning_rate=0.01, momentum=0, nesterov=False)"
        );
        assert_eq!(
            Optimizer::RmsProp(RmsPropSettings {
                centered: true,
                ..Default::default()
            })
            .framework_repr(),
            "RMSprop(learning_rate=0.001, rho=0.9, momentum=0, epsilon=0.0000001, centered=True)"
        );
    }

    #[test]
    fn test_validate() {
        let bad = Optimizer::Adam(AdamSettings {
            beta_1: 1.0,
            ..Default::default()
        });
        assert!(matches!(bad.validate(), Err(BertNodesError::Config(_))));

        let bad = Optimizer::Sgd(SgdSettings {
            learning_rate: 0.0,
            ..Default::default()
        });
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_serde() {
        let optimizer: Optimizer =
            serde_json::from_str(r#"{"kind": "sgd", "learning_rate": 0.1}"#).unwrap();
        assert_eq!(
            optimizer,
            Optimizer::Sgd(SgdSettings {
                learning_rate: 0.1,
                ..Default::default()
            })
        );
    }
}
