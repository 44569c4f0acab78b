use super::model::{Join, Paging, QueryExpression, SelectModel, TableExpression};
use crate::column::SortSpec;
use crate::config::StatementConfiguration;
use crate::criterion::CriterionTree;
use crate::error::{Clause, SqlError, SqlResult};
use crate::render::{
    PlaceholderStrategy, RenderingContext, SqlStatement, join_fragments, trace_rendered,
};

impl SelectModel {
    /// Render with a fresh context for `strategy`.
    pub fn render(&self, strategy: &dyn PlaceholderStrategy) -> SqlResult<SqlStatement> {
        self.render_with(RenderingContext::new(strategy))
    }

    /// Render with a caller-prepared context (parameter name, outer aliases).
    pub fn render_with(&self, mut ctx: RenderingContext<'_>) -> SqlResult<SqlStatement> {
        let sql = self.render_fragment(&mut ctx)?;
        trace_rendered("select", ctx.strategy().name(), &sql, ctx.bindings().len());
        Ok(SqlStatement {
            sql,
            parameters: ctx.into_bindings(),
        })
    }

    /// Render into an existing context; used for subqueries and derived tables.
    pub(crate) fn render_fragment(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        let before = self.config.render_before_statement(ctx)?;
        let mut parts = vec![before];
        for (i, expression) in self.expressions.iter().enumerate() {
            let after_keyword = if i == 0 {
                self.config.render_after_keyword(ctx)?
            } else {
                String::new()
            };
            let config = &self.config;
            let rendered = ctx.with_aliases(expression.aliases.clone(), |ctx| {
                render_query_expression(expression, &after_keyword, config, ctx)
            })?;
            parts.push(rendered);
        }
        parts.push(render_order_by(&self.order_by));
        if let Some(paging) = &self.paging {
            parts.push(render_paging(paging, ctx)?);
        }
        parts.push(self.config.render_after_statement(ctx)?);
        Ok(join_fragments(parts))
    }
}

fn render_query_expression(
    expression: &QueryExpression,
    after_keyword: &str,
    config: &StatementConfiguration,
    ctx: &mut RenderingContext<'_>,
) -> SqlResult<String> {
    let mut items = Vec::with_capacity(expression.items.len());
    for item in &expression.items {
        items.push(item.render_for_select(ctx)?);
    }
    let table = render_table_expression(&expression.table, ctx)?;

    let mut joins = Vec::with_capacity(expression.joins.len());
    for join in &expression.joins {
        joins.push(render_join(join, ctx)?);
    }

    let where_clause =
        CriterionTree::render_clause(expression.where_.as_ref(), Clause::Where, config, ctx)?;

    let group_by = if expression.group_by.is_empty() {
        String::new()
    } else {
        let mut columns = Vec::with_capacity(expression.group_by.len());
        for column in &expression.group_by {
            columns.push(column.render(ctx)?);
        }
        format!("group by {}", columns.join(", "))
    };

    let having =
        CriterionTree::render_clause(expression.having.as_ref(), Clause::Having, config, ctx)?;

    let items = items.join(", ");
    let joins = joins.join(" ");
    Ok(join_fragments([
        expression.connector.map(|c| c.as_str()).unwrap_or_default(),
        "select",
        after_keyword,
        if expression.distinct { "distinct" } else { "" },
        items.as_str(),
        "from",
        table.as_str(),
        joins.as_str(),
        where_clause.as_str(),
        group_by.as_str(),
        having.as_str(),
    ]))
}

fn render_table_expression(
    table: &TableExpression,
    ctx: &mut RenderingContext<'_>,
) -> SqlResult<String> {
    match table {
        TableExpression::Table(t) => Ok(ctx.table_with_alias(t)),
        TableExpression::Subquery { select, alias } => {
            let inner = select.render_fragment(ctx)?;
            Ok(match alias {
                Some(alias) => format!("({inner}) {alias}"),
                None => format!("({inner})"),
            })
        }
    }
}

fn render_join(join: &Join, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
    let table = render_table_expression(&join.table, ctx)?;
    match join.criteria.render(ctx)? {
        Some(on) => Ok(format!("{} {table} on {on}", join.join_type.as_str())),
        None => Err(SqlError::NonRenderingClause(Clause::Join)),
    }
}

pub(crate) fn render_order_by(order_by: &[SortSpec]) -> String {
    if order_by.is_empty() {
        return String::new();
    }
    let specs: Vec<String> = order_by.iter().map(SortSpec::render).collect();
    format!("order by {}", specs.join(", "))
}

fn render_paging(paging: &Paging, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
    if let Some(limit) = paging.limit {
        let limit = format!("limit {}", ctx.bind(None, limit)?);
        let offset = match paging.offset {
            Some(offset) => format!("offset {}", ctx.bind(None, offset)?),
            None => String::new(),
        };
        return Ok(join_fragments([limit, offset]));
    }
    let offset = match paging.offset {
        Some(offset) => format!("offset {} rows", ctx.bind(None, offset)?),
        None => String::new(),
    };
    let fetch = match paging.fetch_first {
        Some(fetch) => format!("fetch first {} rows only", ctx.bind(None, fetch)?),
        None => String::new(),
    };
    Ok(join_fragments([offset, fetch]))
}

/// `limit ?` for update and delete statements.
pub(crate) fn render_limit(limit: Option<i64>, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
    match limit {
        Some(limit) => Ok(format!("limit {}", ctx.bind(None, limit)?)),
        None => Ok(String::new()),
    }
}
