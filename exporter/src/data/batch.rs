//! Write batches
//!
//! A batch collects the points of one export and is handed to a sink as a
//! single write.

use std::fmt;
use std::str::FromStr;

use super::error::BatchError;
use super::line_protocol;
use super::point::Point;

/// Timestamp precision of a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Precision {
    #[default]
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl Precision {
    /// Value of the `precision` query parameter of the write API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nanoseconds => "n",
            Self::Microseconds => "u",
            Self::Milliseconds => "ms",
            Self::Seconds => "s",
            Self::Minutes => "m",
            Self::Hours => "h",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "n" | "ns" => Ok(Self::Nanoseconds),
            "u" | "us" => Ok(Self::Microseconds),
            "ms" => Ok(Self::Milliseconds),
            "s" => Ok(Self::Seconds),
            "m" => Ok(Self::Minutes),
            "h" => Ok(Self::Hours),
            other => Err(BatchError::InvalidPrecision(other.to_string())),
        }
    }
}

/// Settings a batch is created with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub database: String,
    pub precision: Precision,
}

/// Ordered points bound to one database
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPoints {
    database: String,
    precision: Precision,
    points: Vec<Point>,
}

impl BatchPoints {
    pub fn new(config: BatchConfig) -> Result<Self, BatchError> {
        if config.database.trim().is_empty() {
            return Err(BatchError::EmptyDatabase);
        }
        if config.database.chars().any(char::is_control) {
            return Err(BatchError::InvalidDatabase(config.database));
        }

        Ok(Self {
            database: config.database,
            precision: config.precision,
            points: Vec::new(),
        })
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Encode all points as line protocol, one line per point
    pub fn to_line_protocol(&self) -> String {
        let mut out = String::new();
        for point in &self.points {
            line_protocol::write_point(&mut out, point, self.precision);
        }
        out
    }
}
