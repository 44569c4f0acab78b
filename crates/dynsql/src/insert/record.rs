use super::{column_list, render_insert, value_list};
use crate::column::SqlColumn;
use crate::config::StatementConfiguration;
use crate::error::{SqlError, SqlResult};
use crate::mapping::{Absence, ColumnMapping, Record, render_all_for_record};
use crate::render::{
    ParameterBindings, PlaceholderStrategy, RenderingContext, SqlStatement, trace_build_error,
    trace_rendered,
};
use crate::table::SqlTable;
use crate::value::Value;

/// Mapping methods shared by the record-based insert builders.
macro_rules! impl_record_mappings {
    ($builder:ident) => {
        impl<R: Record> $builder<R> {
            pub fn into_table(mut self, table: &SqlTable) -> Self {
                self.table = Some(table.clone());
                self
            }

            pub fn map(mut self, mapping: ColumnMapping) -> Self {
                self.mappings.push(mapping);
                self
            }

            /// Bind the record property `property` to `column`.
            pub fn map_property(self, column: &SqlColumn, property: &str) -> Self {
                self.map(ColumnMapping::property(column, property))
            }

            /// Like [`map_property`](Self::map_property), omitted for records
            /// holding null when rendering a single record.
            pub fn map_property_when_present(self, column: &SqlColumn, property: &str) -> Self {
                self.map(ColumnMapping::property_when_present(column, property))
            }

            /// Bind the whole record to `column`.
            pub fn map_row(self, column: &SqlColumn) -> Self {
                self.map(ColumnMapping::row(column))
            }

            pub fn map_null(self, column: &SqlColumn) -> Self {
                self.map(ColumnMapping::null(column))
            }

            pub fn map_constant(self, column: &SqlColumn, text: &str) -> Self {
                self.map(ColumnMapping::constant(column, text))
            }

            pub fn map_string_constant(self, column: &SqlColumn, text: &str) -> Self {
                self.map(ColumnMapping::string_constant(column, text))
            }

            pub fn map_value(self, column: &SqlColumn, value: impl Into<Value>) -> Self {
                self.map(ColumnMapping::value(column, value))
            }

            pub fn with_configuration(mut self, config: StatementConfiguration) -> Self {
                self.config = config;
                self
            }
        }
    };
}

fn validate(
    table: Option<SqlTable>,
    mappings: &[ColumnMapping],
    statement: &'static str,
) -> SqlResult<SqlTable> {
    let table = table.ok_or(SqlError::MissingTable(statement))?;
    if mappings.is_empty() {
        return Err(SqlError::EmptyColumnMappings(statement));
    }
    Ok(table)
}

fn traced<T>(statement: &'static str, result: SqlResult<T>) -> SqlResult<T> {
    if let Err(e) = &result {
        trace_build_error(statement, e);
    }
    result
}

// ==================== Single record ====================

/// Builder for [`InsertModel`].
pub struct InsertBuilder<R> {
    record: R,
    table: Option<SqlTable>,
    mappings: Vec<ColumnMapping>,
    config: StatementConfiguration,
}

/// Insert one record: `insert into t (id, name) values (#{row.id}, #{row.name})`.
pub fn insert<R: Record>(record: R) -> InsertBuilder<R> {
    InsertBuilder {
        record,
        table: None,
        mappings: Vec::new(),
        config: StatementConfiguration::default(),
    }
}

impl_record_mappings!(InsertBuilder);

impl<R: Record> InsertBuilder<R> {
    pub fn build(self) -> SqlResult<InsertModel<R>> {
        let table = traced("insert", validate(self.table, &self.mappings, "insert"))?;
        Ok(InsertModel {
            record: self.record,
            table,
            mappings: self.mappings,
            config: self.config,
        })
    }
}

/// A single-record insert.
#[derive(Debug, Clone)]
pub struct InsertModel<R> {
    record: R,
    table: SqlTable,
    mappings: Vec<ColumnMapping>,
    config: StatementConfiguration,
}

impl<R: Record> InsertModel<R> {
    pub fn record(&self) -> &R {
        &self.record
    }

    pub fn render(&self, strategy: &dyn PlaceholderStrategy) -> SqlResult<SqlStatement> {
        self.render_with(RenderingContext::new(strategy))
    }

    /// Render; properties whose value is null under a when-present mapping
    /// are left out of the column list.
    pub fn render_with(&self, mut ctx: RenderingContext<'_>) -> SqlResult<SqlStatement> {
        let sql = render_insert(&self.table, &self.config, &mut ctx, |ctx| {
            let fields =
                render_all_for_record(&self.mappings, ctx, &self.record, "row", Absence::Omit)?;
            if fields.is_empty() {
                return Err(SqlError::NoRenderingMappings("insert"));
            }
            Ok(format!("{} values {}", column_list(&fields), value_list(&fields)))
        })?;
        trace_rendered("insert", ctx.strategy().name(), &sql, ctx.bindings().len());
        Ok(SqlStatement {
            sql,
            parameters: ctx.into_bindings(),
        })
    }
}

// ==================== Batch ====================

/// Builder for [`BatchInsertModel`].
pub struct BatchInsertBuilder<R> {
    records: Vec<R>,
    table: Option<SqlTable>,
    mappings: Vec<ColumnMapping>,
    config: StatementConfiguration,
}

/// Insert many records with one statement text executed once per record.
pub fn insert_batch<R: Record>(records: impl IntoIterator<Item = R>) -> BatchInsertBuilder<R> {
    BatchInsertBuilder {
        records: records.into_iter().collect(),
        table: None,
        mappings: Vec::new(),
        config: StatementConfiguration::default(),
    }
}

impl_record_mappings!(BatchInsertBuilder);

impl<R: Record> BatchInsertBuilder<R> {
    pub fn build(self) -> SqlResult<BatchInsertModel<R>> {
        let result = validate(self.table, &self.mappings, "batch insert").and_then(|table| {
            if self.records.is_empty() {
                return Err(SqlError::EmptyRecords("batch insert"));
            }
            Ok(table)
        });
        let table = traced("batch_insert", result)?;
        Ok(BatchInsertModel {
            records: self.records,
            table,
            mappings: self.mappings,
            config: self.config,
        })
    }
}

/// A batch insert.
#[derive(Debug, Clone)]
pub struct BatchInsertModel<R> {
    records: Vec<R>,
    table: SqlTable,
    mappings: Vec<ColumnMapping>,
    config: StatementConfiguration,
}

/// One statement text with a binding set per record.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchInsertStatement {
    pub sql: String,
    pub records: Vec<ParameterBindings>,
}

impl<R: Record> BatchInsertModel<R> {
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Render the shared text and each record's bindings.
    ///
    /// Every record sees the same column list; absent when-present
    /// properties are bound as null.
    pub fn render(&self, strategy: &dyn PlaceholderStrategy) -> SqlResult<BatchInsertStatement> {
        let mut sql = String::new();
        let mut records = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut ctx = RenderingContext::new(strategy);
            let text = render_insert(&self.table, &self.config, &mut ctx, |ctx| {
                let fields =
                    render_all_for_record(&self.mappings, ctx, record, "row", Absence::Bind)?;
                if fields.is_empty() {
                    return Err(SqlError::NoRenderingMappings("batch insert"));
                }
                Ok(format!("{} values {}", column_list(&fields), value_list(&fields)))
            })?;
            if sql.is_empty() {
                sql = text;
            }
            records.push(ctx.into_bindings());
        }
        trace_rendered(
            "batch_insert",
            strategy.name(),
            &sql,
            records.first().map(ParameterBindings::len).unwrap_or_default(),
        );
        Ok(BatchInsertStatement { sql, records })
    }
}

// ==================== Multi-row ====================

/// Builder for [`MultiRowInsertModel`].
pub struct MultiRowInsertBuilder<R> {
    records: Vec<R>,
    table: Option<SqlTable>,
    mappings: Vec<ColumnMapping>,
    config: StatementConfiguration,
}

/// Insert many records with one `values (...), (...)` statement.
pub fn insert_multiple<R: Record>(
    records: impl IntoIterator<Item = R>,
) -> MultiRowInsertBuilder<R> {
    MultiRowInsertBuilder {
        records: records.into_iter().collect(),
        table: None,
        mappings: Vec::new(),
        config: StatementConfiguration::default(),
    }
}

impl_record_mappings!(MultiRowInsertBuilder);

impl<R: Record> MultiRowInsertBuilder<R> {
    pub fn build(self) -> SqlResult<MultiRowInsertModel<R>> {
        let result = validate(self.table, &self.mappings, "multi-row insert").and_then(|table| {
            if self.records.is_empty() {
                return Err(SqlError::EmptyRecords("multi-row insert"));
            }
            Ok(table)
        });
        let table = traced("multi_row_insert", result)?;
        Ok(MultiRowInsertModel {
            records: self.records,
            table,
            mappings: self.mappings,
            config: self.config,
        })
    }
}

/// A multi-row insert.
#[derive(Debug, Clone)]
pub struct MultiRowInsertModel<R> {
    records: Vec<R>,
    table: SqlTable,
    mappings: Vec<ColumnMapping>,
    config: StatementConfiguration,
}

impl<R: Record> MultiRowInsertModel<R> {
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn render(&self, strategy: &dyn PlaceholderStrategy) -> SqlResult<SqlStatement> {
        self.render_with(RenderingContext::new(strategy))
    }

    pub fn render_with(&self, mut ctx: RenderingContext<'_>) -> SqlResult<SqlStatement> {
        let sql = render_insert(&self.table, &self.config, &mut ctx, |ctx| {
            let mut columns = String::new();
            let mut rows = Vec::with_capacity(self.records.len());
            for (i, record) in self.records.iter().enumerate() {
                let prefix = format!("records[{i}]");
                let fields =
                    render_all_for_record(&self.mappings, ctx, record, &prefix, Absence::Bind)?;
                if fields.is_empty() {
                    return Err(SqlError::NoRenderingMappings("multi-row insert"));
                }
                if i == 0 {
                    columns = column_list(&fields);
                }
                rows.push(value_list(&fields));
            }
            Ok(format!("{columns} values {}", rows.join(", ")))
        })?;
        trace_rendered("multi_row_insert", ctx.strategy().name(), &sql, ctx.bindings().len());
        Ok(SqlStatement {
            sql,
            parameters: ctx.into_bindings(),
        })
    }
}
