use serde_json::Value;

use crate::error::{HclustError, Result};

/// Extracts one vector per JSON record.
///
/// Without `key` every value must be an array of numbers. With `key` every
/// value must be an object whose `key` field is such an array.
pub fn extract_vectors(values: &[Value], key: Option<&str>) -> Result<Vec<Vec<f32>>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let field = match key {
                Some(key) => value.get(key).ok_or_else(|| HclustError::MissingField {
                    index,
                    key: key.to_string(),
                })?,
                None => value,
            };
            let items = field.as_array().ok_or(HclustError::NotNumeric { index })?;
            items
                .iter()
                .map(|x| {
                    x.as_f64()
                        .map(|f| f as f32)
                        .ok_or(HclustError::NotNumeric { index })
                })
                .collect()
        })
        .collect()
}
