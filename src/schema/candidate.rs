//! Parameter schemas and genomes for tunable candidates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Value domain of a tunable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Integral values; crossover picks one parent's value.
    Integer,
    /// Continuous values; crossover blends.
    Real,
}

/// One entry of a candidate's parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Inclusive bounds.
    pub bounds: (f64, f64),
    pub kind: ParamKind,
    pub default: f64,
}

impl ParamSpec {
    pub fn integer(name: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            name,
            bounds: (min as f64, max as f64),
            kind: ParamKind::Integer,
            default: default as f64,
        }
    }

    pub fn real(name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            name,
            bounds: (min, max),
            kind: ParamKind::Real,
            default,
        }
    }

    /// Clamp into bounds and round integral parameters.
    pub fn repair(&self, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { self.default };
        let clamped = value.clamp(self.bounds.0, self.bounds.1);
        match self.kind {
            ParamKind::Integer => clamped.round(),
            ParamKind::Real => clamped,
        }
    }

    /// Whether `value` is a legal setting for this parameter.
    pub fn admits(&self, value: f64) -> bool {
        value.is_finite()
            && value >= self.bounds.0
            && value <= self.bounds.1
            && (self.kind == ParamKind::Real || value.fract() == 0.0)
    }
}

/// Ordered parameter values, one per schema entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    pub values: Vec<f64>,
}

impl Genome {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or the schema default when the genome is short.
    pub fn get_or(&self, index: usize, schema: &[ParamSpec]) -> f64 {
        self.values
            .get(index)
            .copied()
            .or_else(|| schema.get(index).map(|p| p.default))
            .unwrap_or(0.0)
    }

    /// Whether every value sits inside its schema bounds.
    pub fn within(&self, schema: &[ParamSpec]) -> bool {
        self.values.len() == schema.len()
            && self
                .values
                .iter()
                .zip(schema)
                .all(|(&v, spec)| spec.admits(v))
    }

    /// Name/value view for reporting.
    pub fn named(&self, schema: &[ParamSpec]) -> BTreeMap<String, f64> {
        schema
            .iter()
            .zip(&self.values)
            .map(|(spec, &v)| (spec.name.to_string(), v))
            .collect()
    }
}
