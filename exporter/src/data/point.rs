//! Write points
//!
//! A point is validated once at construction and never mutated afterwards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::error::PointError;

/// Key that the time-series database reserves for the point timestamp
const RESERVED_KEY: &str = "time";

/// Longest series key (measurement, tags and one field key) the database accepts
const MAX_KEY_LENGTH: usize = 65_535;

/// Numeric field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
}

pub type Tags = BTreeMap<String, String>;
pub type Fields = BTreeMap<String, FieldValue>;

/// A named, tagged, timestamped set of fields
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    name: String,
    tags: Tags,
    fields: Fields,
    timestamp: DateTime<Utc>,
}

impl Point {
    pub fn new(
        name: impl Into<String>,
        tags: Tags,
        fields: Fields,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, PointError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PointError::MissingName);
        }
        if fields.is_empty() {
            return Err(PointError::MissingFields);
        }
        if timestamp.timestamp_nanos_opt().is_none() {
            return Err(PointError::TimestampOutOfRange(timestamp.to_rfc3339()));
        }
        check_trailing_backslash(&name)?;

        // measurement plus ",key=value" for every tag that will be written
        let mut series_len = name.len();
        for (key, value) in &tags {
            if key.is_empty() {
                return Err(PointError::EmptyTagKey);
            }
            if key == RESERVED_KEY {
                return Err(PointError::ReservedKey(key.clone()));
            }
            check_trailing_backslash(key)?;
            check_trailing_backslash(value)?;
            if !value.is_empty() {
                series_len += key.len() + value.len() + 2;
            }
        }

        for (key, value) in &fields {
            if key.is_empty() {
                return Err(PointError::EmptyFieldKey);
            }
            if key == RESERVED_KEY {
                return Err(PointError::ReservedKey(key.clone()));
            }
            check_trailing_backslash(key)?;
            let len = series_len + key.len();
            if len > MAX_KEY_LENGTH {
                return Err(PointError::KeyTooLong {
                    name,
                    len,
                    max: MAX_KEY_LENGTH,
                });
            }
            if let FieldValue::Float(f) = value
                && !f.is_finite()
            {
                return Err(PointError::NonFiniteField {
                    key: key.clone(),
                    value: *f,
                });
            }
        }

        Ok(Self {
            name,
            tags,
            fields,
            timestamp,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

// A trailing backslash would escape the separator written after the token.
fn check_trailing_backslash(token: &str) -> Result<(), PointError> {
    if token.ends_with('\\') {
        return Err(PointError::TrailingBackslash(token.to_string()));
    }
    Ok(())
}
