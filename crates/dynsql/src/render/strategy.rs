//! Placeholder strategies: how a bound parameter is written into SQL text.
//!
//! All strategies share one sequencing contract: the rendering context hands
//! out sequence numbers starting at 1 in left-to-right order, and the strategy
//! only decides the key recorded for the binding and the marker text. Swapping
//! strategies never changes which values are bound or their order.
//!
//! | strategy          | key  | placeholder                |
//! |-------------------|------|----------------------------|
//! | `NamedMap`        | `p1` | `#{parameters.p1}`         |
//! | `ColonNamed`      | `p1` | `:p1`                      |
//! | `Positional`      | `1`  | `?`                        |
//! | `SequentialDollar`| `$1` | `$1`                       |

use crate::column::SqlColumn;
use crate::error::{SqlError, SqlResult};
use std::fmt;

/// Writes placeholders and computes binding keys.
pub trait PlaceholderStrategy: Send + Sync + fmt::Debug {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Key recorded for the binding with the given sequence number.
    fn parameter_key(&self, sequence: usize) -> String;

    /// Placeholder text for a bound value.
    ///
    /// `prefix` is the path of the shared parameter map (only meaningful for
    /// map-based strategies), `key` the value returned by [`parameter_key`].
    ///
    /// [`parameter_key`]: PlaceholderStrategy::parameter_key
    fn placeholder(&self, column: Option<&SqlColumn>, prefix: &str, key: &str) -> String;

    /// Placeholder text for a property of a record (`row.id`, `records[1].id`).
    ///
    /// Strategies that only bind by position cannot express this.
    fn row_placeholder(&self, column: &SqlColumn, path: &str) -> SqlResult<String> {
        let _ = (column, path);
        Err(SqlError::UnsupportedRowBinding(self.name()))
    }
}

fn type_suffix(column: Option<&SqlColumn>) -> String {
    match column.and_then(SqlColumn::sql_type) {
        Some(t) => format!(",jdbcType={t}"),
        None => String::new(),
    }
}

/// `#{parameters.p1}` style, for execution layers that bind from a map by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedMap;

impl PlaceholderStrategy for NamedMap {
    fn name(&self) -> &'static str {
        "named"
    }

    fn parameter_key(&self, sequence: usize) -> String {
        format!("p{sequence}")
    }

    fn placeholder(&self, column: Option<&SqlColumn>, prefix: &str, key: &str) -> String {
        format!("#{{{prefix}.{key}{}}}", type_suffix(column))
    }

    fn row_placeholder(&self, column: &SqlColumn, path: &str) -> SqlResult<String> {
        Ok(format!("#{{{path}{}}}", type_suffix(Some(column))))
    }
}

/// `:p1` style named parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColonNamed;

impl PlaceholderStrategy for ColonNamed {
    fn name(&self) -> &'static str {
        "colon_named"
    }

    fn parameter_key(&self, sequence: usize) -> String {
        format!("p{sequence}")
    }

    fn placeholder(&self, _column: Option<&SqlColumn>, _prefix: &str, key: &str) -> String {
        format!(":{key}")
    }

    fn row_placeholder(&self, _column: &SqlColumn, path: &str) -> SqlResult<String> {
        Ok(format!(":{path}"))
    }
}

/// Bare `?` markers consumed in emission order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Positional;

impl PlaceholderStrategy for Positional {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn parameter_key(&self, sequence: usize) -> String {
        sequence.to_string()
    }

    fn placeholder(&self, _column: Option<&SqlColumn>, _prefix: &str, _key: &str) -> String {
        "?".to_string()
    }
}

/// `$1, $2, ...` markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialDollar;

impl PlaceholderStrategy for SequentialDollar {
    fn name(&self) -> &'static str {
        "dollar"
    }

    fn parameter_key(&self, sequence: usize) -> String {
        format!("${sequence}")
    }

    fn placeholder(&self, _column: Option<&SqlColumn>, _prefix: &str, key: &str) -> String {
        key.to_string()
    }
}
