//! DELETE statements.

use crate::column::SortSpec;
use crate::config::StatementConfiguration;
use crate::criterion::{ClauseBuilder, CriterionTree, impl_where_methods};
use crate::error::{Clause, SqlError, SqlResult};
use crate::render::{
    ExplicitAliases, PlaceholderStrategy, RenderingContext, SqlStatement, join_fragments,
    trace_build_error, trace_rendered,
};
use crate::select::{render_limit, render_order_by};
use crate::table::{SqlTable, TableAliases};
use std::sync::Arc;

/// Builder for [`DeleteModel`].
#[derive(Debug)]
pub struct DeleteBuilder {
    table: SqlTable,
    aliases: TableAliases,
    where_: ClauseBuilder,
    order_by: Vec<SortSpec>,
    limit: Option<i64>,
    config: StatementConfiguration,
    build_error: Option<SqlError>,
}

/// `delete from <table>`
pub fn delete_from(table: &SqlTable) -> DeleteBuilder {
    DeleteBuilder {
        table: table.clone(),
        aliases: TableAliases::new(),
        where_: ClauseBuilder::default(),
        order_by: Vec::new(),
        limit: None,
        config: StatementConfiguration::default(),
        build_error: None,
    }
}

/// `delete from <table> <alias>`
pub fn delete_from_as(table: &SqlTable, alias: &str) -> DeleteBuilder {
    let mut builder = delete_from(table);
    if let Err(e) = builder.aliases.insert(table, alias) {
        builder.record_error(e);
    }
    builder
}

impl DeleteBuilder {
    fn record_error(&mut self, err: SqlError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
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

    pub fn build(mut self) -> SqlResult<DeleteModel> {
        if let Some(err) = self.build_error.take() {
            trace_build_error("delete", &err);
            return Err(err);
        }
        Ok(DeleteModel {
            table: self.table,
            aliases: Arc::new(ExplicitAliases(self.aliases)),
            where_: self.where_.build(),
            order_by: self.order_by,
            limit: self.limit,
            config: self.config,
        })
    }
}

impl_where_methods!(DeleteBuilder, .where_);

/// A built DELETE statement.
#[derive(Debug, Clone)]
pub struct DeleteModel {
    table: SqlTable,
    aliases: Arc<ExplicitAliases>,
    where_: Option<CriterionTree>,
    order_by: Vec<SortSpec>,
    limit: Option<i64>,
    config: StatementConfiguration,
}

impl DeleteModel {
    pub fn render(&self, strategy: &dyn PlaceholderStrategy) -> SqlResult<SqlStatement> {
        self.render_with(RenderingContext::new(strategy))
    }

    pub fn render_with(&self, mut ctx: RenderingContext<'_>) -> SqlResult<SqlStatement> {
        let sql = ctx.with_aliases(self.aliases.clone(), |ctx| self.render_fragment(ctx))?;
        trace_rendered("delete", ctx.strategy().name(), &sql, ctx.bindings().len());
        Ok(SqlStatement {
            sql,
            parameters: ctx.into_bindings(),
        })
    }

    fn render_fragment(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        let before = self.config.render_before_statement(ctx)?;
        let after_keyword = self.config.render_after_keyword(ctx)?;
        let table = ctx.table_with_alias(&self.table);
        let where_clause =
            CriterionTree::render_clause(self.where_.as_ref(), Clause::Where, &self.config, ctx)?;
        let order_by = render_order_by(&self.order_by);
        let limit = render_limit(self.limit, ctx)?;
        let after = self.config.render_after_statement(ctx)?;

        Ok(join_fragments([
            before.as_str(),
            "delete from",
            after_keyword.as_str(),
            table.as_str(),
            where_clause.as_str(),
            order_by.as_str(),
            limit.as_str(),
            after.as_str(),
        ]))
    }
}
