//! Column mappings for INSERT and UPDATE.
//!
//! A [`ColumnMapping`] pairs a target column with the source of its value.
//! Rendering a mapping yields the column name, the value phrase and at most
//! one binding; when-present mappings yield nothing when their value is
//! absent.
//!
//! Property and row mappings read from a [`Record`] at render time, so one
//! mapping list serves every record of a batch or multi-row insert.

use crate::column::{BasicColumn, SqlColumn, quote_string};
use crate::error::{SqlError, SqlResult};
use crate::render::RenderingContext;
use crate::select::SelectModel;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// A source of property values for record-based inserts.
///
/// `property` returns `None` for an unknown property and `Some(Value::Null)`
/// for a known property that is absent.
pub trait Record {
    fn property(&self, name: &str) -> Option<Value>;

    /// The record bound as a single value (whole-row mappings).
    fn row_value(&self) -> Value;
}

impl Record for Value {
    fn property(&self, _name: &str) -> Option<Value> {
        None
    }

    fn row_value(&self) -> Value {
        self.clone()
    }
}

impl Record for HashMap<String, Value> {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn row_value(&self) -> Value {
        Value::Json(serde_json::Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or_default()))
                .collect(),
        ))
    }
}

impl Record for BTreeMap<String, Value> {
    fn property(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn row_value(&self) -> Value {
        Value::Json(serde_json::Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), serde_json::to_value(v).unwrap_or_default()))
                .collect(),
        ))
    }
}

/// JSON objects are records; scalar members become typed values.
impl Record for serde_json::Value {
    fn property(&self, name: &str) -> Option<Value> {
        self.as_object()?.get(name).map(json_to_value)
    }

    fn row_value(&self) -> Value {
        json_to_value(self)
    }
}

fn json_to_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Json(other.clone()),
    }
}

/// Where a column's value comes from.
#[derive(Debug, Clone)]
pub enum MappingSource {
    /// `null`
    Null,
    /// Text rendered verbatim.
    Constant(String),
    /// Text rendered as a quoted string literal.
    StringConstant(String),
    /// A bound value.
    Value(Value),
    /// A bound value, omitted when `None`.
    ValueWhenPresent(Option<Value>),
    /// A record property bound by path (`row.id`).
    Property(String),
    /// A record property, omitted when the record holds null for it.
    PropertyWhenPresent(String),
    /// The record itself.
    Row,
    /// Another column or expression.
    Column(BasicColumn),
    /// `(select ...)`
    Subquery(Arc<SelectModel>),
}

/// A target column and its value source.
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    column: SqlColumn,
    source: MappingSource,
}

/// Rendered `(column, value)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldAndValue {
    pub(crate) field: String,
    pub(crate) value: String,
}

/// How absent values are treated when rendering against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Absence {
    /// Drop the mapping (single-record inserts).
    Omit,
    /// Bind the null (batch and multi-row inserts share one column list).
    Bind,
}

impl ColumnMapping {
    pub fn new(column: &SqlColumn, source: MappingSource) -> Self {
        Self {
            column: column.clone(),
            source,
        }
    }

    pub fn null(column: &SqlColumn) -> Self {
        Self::new(column, MappingSource::Null)
    }

    pub fn constant(column: &SqlColumn, text: impl Into<String>) -> Self {
        Self::new(column, MappingSource::Constant(text.into()))
    }

    pub fn string_constant(column: &SqlColumn, text: impl Into<String>) -> Self {
        Self::new(column, MappingSource::StringConstant(text.into()))
    }

    pub fn value(column: &SqlColumn, value: impl Into<Value>) -> Self {
        Self::new(column, MappingSource::Value(value.into()))
    }

    pub fn value_when_present<T: Into<Value>>(column: &SqlColumn, value: Option<T>) -> Self {
        Self::new(column, MappingSource::ValueWhenPresent(value.map(Into::into)))
    }

    pub fn property(column: &SqlColumn, property: impl Into<String>) -> Self {
        Self::new(column, MappingSource::Property(property.into()))
    }

    pub fn property_when_present(column: &SqlColumn, property: impl Into<String>) -> Self {
        Self::new(column, MappingSource::PropertyWhenPresent(property.into()))
    }

    pub fn row(column: &SqlColumn) -> Self {
        Self::new(column, MappingSource::Row)
    }

    pub fn column(column: &SqlColumn, other: impl Into<BasicColumn>) -> Self {
        Self::new(column, MappingSource::Column(other.into()))
    }

    pub fn subquery(column: &SqlColumn, select: SelectModel) -> Self {
        Self::new(column, MappingSource::Subquery(Arc::new(select)))
    }

    pub fn target(&self) -> &SqlColumn {
        &self.column
    }

    pub fn source(&self) -> &MappingSource {
        &self.source
    }

    /// True for mappings that read from a record.
    pub fn is_record_bound(&self) -> bool {
        matches!(
            self.source,
            MappingSource::Property(_) | MappingSource::PropertyWhenPresent(_) | MappingSource::Row
        )
    }

    fn field(&self) -> String {
        self.column.name().to_string()
    }

    fn pair(&self, value: String) -> Option<FieldAndValue> {
        Some(FieldAndValue {
            field: self.field(),
            value,
        })
    }

    /// Render a mapping that needs no record.
    ///
    /// Record-bound mappings are reported as unknown properties.
    pub(crate) fn render(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<Option<FieldAndValue>> {
        match &self.source {
            MappingSource::Null => Ok(self.pair("null".to_string())),
            MappingSource::Constant(text) => Ok(self.pair(text.clone())),
            MappingSource::StringConstant(text) => Ok(self.pair(quote_string(text))),
            MappingSource::Value(value) => {
                let placeholder = ctx.bind(Some(&self.column), value.clone())?;
                Ok(self.pair(placeholder))
            }
            MappingSource::ValueWhenPresent(None) => Ok(None),
            MappingSource::ValueWhenPresent(Some(value)) => {
                let placeholder = ctx.bind(Some(&self.column), value.clone())?;
                Ok(self.pair(placeholder))
            }
            MappingSource::Column(other) => {
                let rendered = other.render(ctx)?;
                Ok(self.pair(rendered))
            }
            MappingSource::Subquery(select) => {
                let rendered = select.render_fragment(ctx)?;
                Ok(self.pair(format!("({rendered})")))
            }
            MappingSource::Property(name) | MappingSource::PropertyWhenPresent(name) => {
                Err(SqlError::UnknownProperty(name.clone()))
            }
            MappingSource::Row => Err(SqlError::UnknownProperty("row".to_string())),
        }
    }

    /// Render against a record whose properties live under `prefix`
    /// (`row`, `records[2]`).
    pub(crate) fn render_for_record(
        &self,
        ctx: &mut RenderingContext<'_>,
        record: &dyn Record,
        prefix: &str,
        absence: Absence,
    ) -> SqlResult<Option<FieldAndValue>> {
        match &self.source {
            MappingSource::Property(name) => {
                let value = lookup(record, name)?;
                self.bind_property(ctx, prefix, name, value)
            }
            MappingSource::PropertyWhenPresent(name) => {
                let value = lookup(record, name)?;
                if value.is_null() && absence == Absence::Omit {
                    return Ok(None);
                }
                self.bind_property(ctx, prefix, name, value)
            }
            MappingSource::Row => {
                let placeholder = ctx.bind_row(&self.column, prefix, record.row_value())?;
                Ok(self.pair(placeholder))
            }
            _ => self.render(ctx),
        }
    }

    fn bind_property(
        &self,
        ctx: &mut RenderingContext<'_>,
        prefix: &str,
        name: &str,
        value: Value,
    ) -> SqlResult<Option<FieldAndValue>> {
        let path = format!("{prefix}.{name}");
        let placeholder = ctx.bind_row(&self.column, &path, value)?;
        Ok(self.pair(placeholder))
    }
}

fn lookup(record: &dyn Record, name: &str) -> SqlResult<Value> {
    record
        .property(name)
        .ok_or_else(|| SqlError::UnknownProperty(name.to_string()))
}

/// Render every mapping, dropping those that suppress themselves.
pub(crate) fn render_all(
    mappings: &[ColumnMapping],
    ctx: &mut RenderingContext<'_>,
) -> SqlResult<Vec<FieldAndValue>> {
    let mut rendered = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        if let Some(fv) = mapping.render(ctx)? {
            rendered.push(fv);
        }
    }
    Ok(rendered)
}

/// Render every mapping against one record.
pub(crate) fn render_all_for_record(
    mappings: &[ColumnMapping],
    ctx: &mut RenderingContext<'_>,
    record: &dyn Record,
    prefix: &str,
    absence: Absence,
) -> SqlResult<Vec<FieldAndValue>> {
    let mut rendered = Vec::with_capacity(mappings.len());
    for mapping in mappings {
        if let Some(fv) = mapping.render_for_record(ctx, record, prefix, absence)? {
            rendered.push(fv);
        }
    }
    Ok(rendered)
}
