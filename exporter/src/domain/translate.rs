//! Row translation
//!
//! Maps one snapshot row onto the name, tags and fields of a write point.

use std::collections::BTreeMap;

use super::error::ExportError;
use crate::core::NamingPolicy;
use crate::core::constants::{SUFFIX_COUNT, SUFFIX_GAUGE, SUFFIX_HISTOGRAM};
use crate::data::{AggregationData, FieldValue, Fields, Tag, Tags};

/// Build the field set for an aggregation. Field keys are fixed per variant.
pub fn aggregation_fields(data: &AggregationData) -> Result<Fields, ExportError> {
    let fields = match data {
        AggregationData::Count { value } => {
            Fields::from([("value".to_string(), FieldValue::Float(*value as f64))])
        }
        AggregationData::Distribution(d) => Fields::from([
            ("min".to_string(), FieldValue::Float(d.min)),
            ("max".to_string(), FieldValue::Float(d.max)),
            ("mean".to_string(), FieldValue::Float(d.mean)),
            ("count".to_string(), FieldValue::Integer(d.count)),
        ]),
        AggregationData::LastValue { value } | AggregationData::Sum { value } => {
            Fields::from([("value".to_string(), FieldValue::Float(*value))])
        }
        AggregationData::Unrecognized { .. } => {
            return Err(ExportError::unknown_aggregation(data.kind()));
        }
    };
    Ok(fields)
}

/// Point name for a view under the given policy
pub fn point_name(policy: NamingPolicy, view_name: &str, data: &AggregationData) -> String {
    let suffix = match policy {
        NamingPolicy::Plain => "",
        NamingPolicy::Suffixed => match data {
            AggregationData::Count { .. } => SUFFIX_COUNT,
            AggregationData::Distribution(_) => SUFFIX_HISTOGRAM,
            AggregationData::LastValue { .. } | AggregationData::Sum { .. } => SUFFIX_GAUGE,
            AggregationData::Unrecognized { .. } => "",
        },
    };
    format!("{view_name}{suffix}")
}

/// Overlay row tags on top of static tags; row tags win on key collision
pub fn merge_tags(static_tags: Option<&BTreeMap<String, String>>, row_tags: &[Tag]) -> Tags {
    let mut tags = static_tags.cloned().unwrap_or_default();
    for tag in row_tags {
        tags.insert(tag.key.clone(), tag.value.clone());
    }
    tags
}
