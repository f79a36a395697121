use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HclustError, Result};
use crate::matrix::DistanceMatrix;

type LinkageFn = dyn Fn(&[usize], &[usize], &DistanceMatrix) -> f64 + Send + Sync;

/// Combines the pairwise distances between two index sets into one
/// group-to-group distance.
#[derive(Clone, Default)]
pub enum Linkage {
    /// Mean of all cross distances (UPGMA).
    #[default]
    Average,
    /// Minimum cross distance.
    Single,
    /// Maximum cross distance.
    Complete,
    /// Caller-supplied linkage.
    Custom(Arc<LinkageFn>),
}

impl Linkage {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&[usize], &[usize], &DistanceMatrix) -> f64 + Send + Sync + 'static,
    {
        Linkage::Custom(Arc::new(f))
    }

    pub fn distance(&self, a: &[usize], b: &[usize], m: &DistanceMatrix) -> f64 {
        match self {
            Linkage::Average => average_distance(a, b, m),
            Linkage::Single => single_distance(a, b, m),
            Linkage::Complete => complete_distance(a, b, m),
            Linkage::Custom(f) => f(a, b, m),
        }
    }
}

impl fmt::Debug for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::Average => f.write_str("Average"),
            Linkage::Single => f.write_str("Single"),
            Linkage::Complete => f.write_str("Complete"),
            Linkage::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Linkage::Average => f.write_str("average"),
            Linkage::Single => f.write_str("single"),
            Linkage::Complete => f.write_str("complete"),
            Linkage::Custom(_) => f.write_str("custom"),
        }
    }
}

impl FromStr for Linkage {
    type Err = HclustError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "average" => Ok(Linkage::Average),
            "single" => Ok(Linkage::Single),
            "complete" => Ok(Linkage::Complete),
            other => Err(HclustError::UnknownName {
                kind: "linkage",
                name: other.to_string(),
            }),
        }
    }
}

/// Serializes as the lowercase name. `Custom` cannot be serialized.
impl Serialize for Linkage {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Linkage::Custom(_) => Err(serde::ser::Error::custom("custom linkage cannot be serialized")),
            _ => s.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for Linkage {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Mean of `m[i][j]` over `i` in `a` and `j` in `b`.
///
/// O(|a|·|b|). NaN if either set is empty.
pub fn average_distance(a: &[usize], b: &[usize], m: &DistanceMatrix) -> f64 {
    let mut sum = 0.0;
    for &i in a {
        for &j in b {
            sum += m.get(i, j);
        }
    }
    sum / (a.len() * b.len()) as f64
}

/// Minimum of `m[i][j]`; `+inf` if either set is empty.
pub fn single_distance(a: &[usize], b: &[usize], m: &DistanceMatrix) -> f64 {
    a.iter()
        .flat_map(|&i| b.iter().map(move |&j| m.get(i, j)))
        .fold(f64::INFINITY, f64::min)
}

/// Maximum of `m[i][j]`; `-inf` if either set is empty.
pub fn complete_distance(a: &[usize], b: &[usize], m: &DistanceMatrix) -> f64 {
    a.iter()
        .flat_map(|&i| b.iter().map(move |&j| m.get(i, j)))
        .fold(f64::NEG_INFINITY, f64::max)
}
