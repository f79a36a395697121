use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HclustError, Result};

type MetricFn = dyn Fn(&[f32], &[f32]) -> Result<f64> + Send + Sync;

/// Pairwise function used to fill the distance matrix.
///
/// The engine always merges the pair with the *smallest* value. Cosine is a
/// similarity, so under the default metric the least similar clusters are
/// merged first. Use [`Metric::custom`] to plug in `1 - cosine` or any other
/// pairwise function.
#[derive(Clone, Default)]
pub enum Metric {
    /// Cosine similarity. Vectors must have equal length.
    #[default]
    Cosine,
    /// Euclidean distance over the shared prefix of both vectors.
    Euclidean,
    /// Caller-supplied pairwise function.
    Custom(Arc<MetricFn>),
}

impl Metric {
    /// Wraps a pairwise function as a metric.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[f32], &[f32]) -> Result<f64> + Send + Sync + 'static,
    {
        Metric::Custom(Arc::new(f))
    }

    /// Evaluates the metric on two records.
    pub fn measure(&self, a: &[f32], b: &[f32]) -> Result<f64> {
        match self {
            Metric::Cosine => {
                if a.len() != b.len() {
                    return Err(HclustError::DimensionMismatch {
                        expected: a.len(),
                        got: b.len(),
                    });
                }
                Ok(cosine_similarity(a, b))
            }
            Metric::Euclidean => Ok(euclidean_distance(a, b)),
            Metric::Custom(f) => f(a, b),
        }
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Cosine => f.write_str("Cosine"),
            Metric::Euclidean => f.write_str("Euclidean"),
            Metric::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Cosine => f.write_str("cosine"),
            Metric::Euclidean => f.write_str("euclidean"),
            Metric::Custom(_) => f.write_str("custom"),
        }
    }
}

impl FromStr for Metric {
    type Err = HclustError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            other => Err(HclustError::UnknownName {
                kind: "metric",
                name: other.to_string(),
            }),
        }
    }
}

/// Serializes as the lowercase name. `Custom` cannot be serialized.
impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Metric::Custom(_) => Err(serde::ser::Error::custom("custom metric cannot be serialized")),
            _ => s.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Cosine similarity between two vectors.
///
/// Accumulates in f64. Only the shared prefix is read; [`Metric::Cosine`]
/// rejects unequal lengths before calling this. Returns NaN if either
/// vector is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot: f64 = 0.0;
    let mut na: f64 = 0.0;
    let mut nb: f64 = 0.0;
    for (&x, &y) in a.iter().zip(b) {
        let ai = x as f64;
        let bi = y as f64;
        dot += ai * bi;
        na += ai * ai;
        nb += bi * bi;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    dot / denom
}

/// Euclidean distance over the first `min(a.len(), b.len())` components.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
