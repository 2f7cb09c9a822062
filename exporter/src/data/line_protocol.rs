//! Line protocol encoding
//!
//! `measurement[,tag=value...] field=value[,field=value...] timestamp`

use std::fmt::Write;

use super::batch::Precision;
use super::point::{FieldValue, Point};
use crate::utils::time::datetime_to_precision;

/// Append one point as a newline-terminated line
pub fn write_point(out: &mut String, point: &Point, precision: Precision) {
    escape_into(out, point.name(), &[',', ' ']);

    // Tags are already sorted by key (BTreeMap). Empty values are not addressable.
    for (key, value) in point.tags() {
        if value.is_empty() {
            continue;
        }
        out.push(',');
        escape_into(out, key, &[',', '=', ' ']);
        out.push('=');
        escape_into(out, value, &[',', '=', ' ']);
    }

    out.push(' ');
    for (i, (key, value)) in point.fields().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape_into(out, key, &[',', '=', ' ']);
        out.push('=');
        // Writing to a String cannot fail
        let _ = match value {
            FieldValue::Float(f) => write!(out, "{f}"),
            FieldValue::Integer(n) => write!(out, "{n}i"),
        };
    }

    let _ = writeln!(
        out,
        " {}",
        datetime_to_precision(&point.timestamp(), precision)
    );
}

fn escape_into(out: &mut String, s: &str, special: &[char]) {
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            c if special.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
}
