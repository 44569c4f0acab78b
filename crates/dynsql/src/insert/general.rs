use super::{column_list, render_insert, value_list};
use crate::column::SqlColumn;
use crate::config::StatementConfiguration;
use crate::error::{SqlError, SqlResult};
use crate::mapping::{ColumnMapping, render_all};
use crate::render::{
    PlaceholderStrategy, RenderingContext, SqlStatement, trace_build_error, trace_rendered,
};
use crate::select::SelectModel;
use crate::table::SqlTable;
use crate::value::Value;

// ==================== General insert ====================

/// Builder for [`GeneralInsertModel`].
///
/// ```ignore
/// let model = insert_into(&person)
///     .set_value(&id, 3)
///     .set_value_when_present(&name, None::<&str>)
///     .build()?;
/// // insert into Person (id) values (#{parameters.p1})
/// ```
#[derive(Debug)]
pub struct GeneralInsertBuilder {
    table: SqlTable,
    mappings: Vec<ColumnMapping>,
    config: StatementConfiguration,
}

/// Insert explicit values without a record.
pub fn insert_into(table: &SqlTable) -> GeneralInsertBuilder {
    GeneralInsertBuilder {
        table: table.clone(),
        mappings: Vec::new(),
        config: StatementConfiguration::default(),
    }
}

impl GeneralInsertBuilder {
    fn push(mut self, mapping: ColumnMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn set_value(self, column: &SqlColumn, value: impl Into<Value>) -> Self {
        self.push(ColumnMapping::value(column, value))
    }

    /// Bind `value`; the column is left out when it is `None`.
    pub fn set_value_when_present<T: Into<Value>>(self, column: &SqlColumn, value: Option<T>) -> Self {
        self.push(ColumnMapping::value_when_present(column, value))
    }

    pub fn set_null(self, column: &SqlColumn) -> Self {
        self.push(ColumnMapping::null(column))
    }

    pub fn set_constant(self, column: &SqlColumn, text: &str) -> Self {
        self.push(ColumnMapping::constant(column, text))
    }

    pub fn set_string_constant(self, column: &SqlColumn, text: &str) -> Self {
        self.push(ColumnMapping::string_constant(column, text))
    }

    pub fn with_configuration(mut self, config: StatementConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> SqlResult<GeneralInsertModel> {
        if self.mappings.is_empty() {
            let err = SqlError::EmptyColumnMappings("insert");
            trace_build_error("general_insert", &err);
            return Err(err);
        }
        Ok(GeneralInsertModel {
            table: self.table,
            mappings: self.mappings,
            config: self.config,
        })
    }
}

/// An insert of explicit values.
#[derive(Debug, Clone)]
pub struct GeneralInsertModel {
    table: SqlTable,
    mappings: Vec<ColumnMapping>,
    config: StatementConfiguration,
}

impl GeneralInsertModel {
    pub fn render(&self, strategy: &dyn PlaceholderStrategy) -> SqlResult<SqlStatement> {
        self.render_with(RenderingContext::new(strategy))
    }

    pub fn render_with(&self, mut ctx: RenderingContext<'_>) -> SqlResult<SqlStatement> {
        let sql = render_insert(&self.table, &self.config, &mut ctx, |ctx| {
            let fields = render_all(&self.mappings, ctx)?;
            if fields.is_empty() {
                return Err(SqlError::NoRenderingMappings("insert"));
            }
            Ok(format!("{} values {}", column_list(&fields), value_list(&fields)))
        })?;
        trace_rendered("general_insert", ctx.strategy().name(), &sql, ctx.bindings().len());
        Ok(SqlStatement {
            sql,
            parameters: ctx.into_bindings(),
        })
    }
}

// ==================== Insert select ====================

/// Builder for [`InsertSelectModel`].
#[derive(Debug)]
pub struct InsertSelectBuilder {
    table: SqlTable,
    columns: Option<Vec<SqlColumn>>,
    select: SelectModel,
    config: StatementConfiguration,
}

/// `insert into <table>[ (<columns>)] <select>`
pub fn insert_select(table: &SqlTable, select: SelectModel) -> InsertSelectBuilder {
    InsertSelectBuilder {
        table: table.clone(),
        columns: None,
        select,
        config: StatementConfiguration::default(),
    }
}

impl InsertSelectBuilder {
    /// Name the target columns; an empty list is an error.
    pub fn columns<'a>(mut self, columns: impl IntoIterator<Item = &'a SqlColumn>) -> Self {
        self.columns = Some(columns.into_iter().cloned().collect());
        self
    }

    pub fn with_configuration(mut self, config: StatementConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> SqlResult<InsertSelectModel> {
        if self.columns.as_ref().is_some_and(Vec::is_empty) {
            let err = SqlError::EmptyColumnMappings("insert select");
            trace_build_error("insert_select", &err);
            return Err(err);
        }
        Ok(InsertSelectModel {
            table: self.table,
            columns: self.columns,
            select: self.select,
            config: self.config,
        })
    }
}

/// An insert fed by a select.
#[derive(Debug, Clone)]
pub struct InsertSelectModel {
    table: SqlTable,
    columns: Option<Vec<SqlColumn>>,
    select: SelectModel,
    config: StatementConfiguration,
}

impl InsertSelectModel {
    pub fn render(&self, strategy: &dyn PlaceholderStrategy) -> SqlResult<SqlStatement> {
        self.render_with(RenderingContext::new(strategy))
    }

    pub fn render_with(&self, mut ctx: RenderingContext<'_>) -> SqlResult<SqlStatement> {
        let sql = render_insert(&self.table, &self.config, &mut ctx, |ctx| {
            let select = self.select.render_fragment(ctx)?;
            Ok(match &self.columns {
                Some(columns) => {
                    let names: Vec<&str> = columns.iter().map(SqlColumn::name).collect();
                    format!("({}) {select}", names.join(", "))
                }
                None => select,
            })
        })?;
        trace_rendered("insert_select", ctx.strategy().name(), &sql, ctx.bindings().len());
        Ok(SqlStatement {
            sql,
            parameters: ctx.into_bindings(),
        })
    }
}
