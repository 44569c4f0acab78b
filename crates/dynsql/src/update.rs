//! UPDATE statements.
//!
//! ```ignore
//! let model = update(&person)
//!     .set_value(&occupation, "Programmer")
//!     .set_value_when_present(&first_name, None::<&str>)
//!     .where_(&id, is_equal_to(3))
//!     .build()?;
//! // update Person set occupation = ? where id = ?
//! ```

use crate::column::{BasicColumn, SortSpec, SqlColumn};
use crate::config::StatementConfiguration;
use crate::criterion::{ClauseBuilder, CriterionTree, impl_where_methods};
use crate::error::{Clause, SqlError, SqlResult};
use crate::mapping::{ColumnMapping, render_all};
use crate::render::{
    ExplicitAliases, PlaceholderStrategy, RenderingContext, SqlStatement, join_fragments,
    trace_build_error, trace_rendered,
};
use crate::select::{SelectModel, render_limit, render_order_by};
use crate::table::{SqlTable, TableAliases};
use crate::value::Value;
use std::sync::Arc;

/// Builder for [`UpdateModel`].
#[derive(Debug)]
pub struct UpdateBuilder {
    table: SqlTable,
    aliases: TableAliases,
    mappings: Vec<ColumnMapping>,
    where_: ClauseBuilder,
    order_by: Vec<SortSpec>,
    limit: Option<i64>,
    config: StatementConfiguration,
    build_error: Option<SqlError>,
}

/// Start an UPDATE of `table`.
pub fn update(table: &SqlTable) -> UpdateBuilder {
    UpdateBuilder {
        table: table.clone(),
        aliases: TableAliases::new(),
        mappings: Vec::new(),
        where_: ClauseBuilder::default(),
        order_by: Vec::new(),
        limit: None,
        config: StatementConfiguration::default(),
        build_error: None,
    }
}

/// Start an UPDATE of `table <alias>`; WHERE columns are qualified with the alias.
pub fn update_as(table: &SqlTable, alias: &str) -> UpdateBuilder {
    let mut builder = update(table);
    if let Err(e) = builder.aliases.insert(table, alias) {
        builder.record_error(e);
    }
    builder
}

impl UpdateBuilder {
    fn record_error(&mut self, err: SqlError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    pub fn set(mut self, mapping: ColumnMapping) -> Self {
        self.mappings.push(mapping);
        self
    }

    pub fn set_value(self, column: &SqlColumn, value: impl Into<Value>) -> Self {
        self.set(ColumnMapping::value(column, value))
    }

    /// Set the column only when `value` is present.
    pub fn set_value_when_present<T: Into<Value>>(self, column: &SqlColumn, value: Option<T>) -> Self {
        self.set(ColumnMapping::value_when_present(column, value))
    }

    pub fn set_null(self, column: &SqlColumn) -> Self {
        self.set(ColumnMapping::null(column))
    }

    pub fn set_constant(self, column: &SqlColumn, text: &str) -> Self {
        self.set(ColumnMapping::constant(column, text))
    }

    pub fn set_string_constant(self, column: &SqlColumn, text: &str) -> Self {
        self.set(ColumnMapping::string_constant(column, text))
    }

    /// `<column> = <other column or expression>`
    pub fn set_column(self, column: &SqlColumn, other: impl Into<BasicColumn>) -> Self {
        self.set(ColumnMapping::column(column, other))
    }

    /// `<column> = (select ...)`
    pub fn set_select(self, column: &SqlColumn, select: SelectModel) -> Self {
        self.set(ColumnMapping::subquery(column, select))
    }

    pub fn order_by<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SortSpec>,
    {
        let specs: Vec<SortSpec> = specs.into_iter().map(Into::into).collect();
        if specs.is_empty() {
            self.record_error(SqlError::EmptyOrderBy);
            return self;
        }
        self.order_by.extend(specs);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_configuration(mut self, config: StatementConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn allow_non_rendering_where(mut self, allowed: bool) -> Self {
        self.config.non_rendering_where_allowed = allowed;
        self
    }

    pub fn build(self) -> SqlResult<UpdateModel> {
        let result = self.build_inner();
        if let Err(e) = &result {
            trace_build_error("update", e);
        }
        result
    }

    fn build_inner(mut self) -> SqlResult<UpdateModel> {
        if let Some(err) = self.build_error.take() {
            return Err(err);
        }
        if self.mappings.is_empty() {
            return Err(SqlError::EmptyColumnMappings("update"));
        }
        Ok(UpdateModel {
            table: self.table,
            aliases: Arc::new(ExplicitAliases(self.aliases)),
            mappings: self.mappings,
            where_: self.where_.build(),
            order_by: self.order_by,
            limit: self.limit,
            config: self.config,
        })
    }
}

impl_where_methods!(UpdateBuilder, .where_);

/// A built UPDATE statement.
#[derive(Debug, Clone)]
pub struct UpdateModel {
    table: SqlTable,
    aliases: Arc<ExplicitAliases>,
    mappings: Vec<ColumnMapping>,
    where_: Option<CriterionTree>,
    order_by: Vec<SortSpec>,
    limit: Option<i64>,
    config: StatementConfiguration,
}

impl UpdateModel {
    pub fn render(&self, strategy: &dyn PlaceholderStrategy) -> SqlResult<SqlStatement> {
        self.render_with(RenderingContext::new(strategy))
    }

    /// Render; an update whose set mappings all dropped is an error.
    pub fn render_with(&self, mut ctx: RenderingContext<'_>) -> SqlResult<SqlStatement> {
        let sql = ctx.with_aliases(self.aliases.clone(), |ctx| self.render_fragment(ctx))?;
        trace_rendered("update", ctx.strategy().name(), &sql, ctx.bindings().len());
        Ok(SqlStatement {
            sql,
            parameters: ctx.into_bindings(),
        })
    }

    fn render_fragment(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        let before = self.config.render_before_statement(ctx)?;
        let after_keyword = self.config.render_after_keyword(ctx)?;
        let table = ctx.table_with_alias(&self.table);

        let fields = render_all(&self.mappings, ctx)?;
        if fields.is_empty() {
            return Err(SqlError::NoRenderingMappings("update"));
        }
        let sets: Vec<String> = fields
            .iter()
            .map(|fv| format!("{} = {}", fv.field, fv.value))
            .collect();
        let sets = format!("set {}", sets.join(", "));

        let where_clause =
            CriterionTree::render_clause(self.where_.as_ref(), Clause::Where, &self.config, ctx)?;
        let order_by = render_order_by(&self.order_by);
        let limit = render_limit(self.limit, ctx)?;
        let after = self.config.render_after_statement(ctx)?;

        Ok(join_fragments([
            before.as_str(),
            "update",
            after_keyword.as_str(),
            table.as_str(),
            sets.as_str(),
            where_clause.as_str(),
            order_by.as_str(),
            limit.as_str(),
            after.as_str(),
        ]))
    }
}
