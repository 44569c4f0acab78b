//! Immutable SELECT models.

use crate::column::{BasicColumn, SortSpec};
use crate::config::StatementConfiguration;
use crate::criterion::CriterionTree;
use crate::render::TableAliasCalculator;
use crate::table::SqlTable;
use std::sync::Arc;

/// A built SELECT statement: one or more query expressions joined by set
/// operators, followed by the shared order by and paging.
///
/// Created by [`SelectBuilder::build`](super::SelectBuilder::build); render it
/// as often as needed.
#[derive(Debug, Clone)]
pub struct SelectModel {
    pub(crate) expressions: Vec<QueryExpression>,
    pub(crate) order_by: Vec<SortSpec>,
    pub(crate) paging: Option<Paging>,
    pub(crate) config: StatementConfiguration,
}

impl SelectModel {
    pub fn query_expressions(&self) -> &[QueryExpression] {
        &self.expressions
    }

    pub fn configuration(&self) -> &StatementConfiguration {
        &self.config
    }
}

/// Set operator placed before a query expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperator {
    Union,
    UnionAll,
}

impl SetOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetOperator::Union => "union",
            SetOperator::UnionAll => "union all",
        }
    }
}

/// `select ... from ... [joins] [where] [group by] [having]`
#[derive(Debug, Clone)]
pub struct QueryExpression {
    pub(crate) connector: Option<SetOperator>,
    pub(crate) distinct: bool,
    pub(crate) items: Vec<BasicColumn>,
    pub(crate) table: TableExpression,
    pub(crate) aliases: Arc<dyn TableAliasCalculator>,
    pub(crate) joins: Vec<Join>,
    pub(crate) where_: Option<CriterionTree>,
    pub(crate) group_by: Vec<BasicColumn>,
    pub(crate) having: Option<CriterionTree>,
}

impl QueryExpression {
    pub fn items(&self) -> &[BasicColumn] {
        &self.items
    }

    pub fn is_distinct(&self) -> bool {
        self.distinct
    }
}

/// What follows `from` or a join keyword.
#[derive(Debug, Clone)]
pub enum TableExpression {
    Table(SqlTable),
    /// Derived table: `(select ...)[ alias]`
    Subquery {
        select: Arc<SelectModel>,
        alias: Option<String>,
    },
}

impl TableExpression {
    pub(crate) fn is_subquery(&self) -> bool {
        matches!(self, TableExpression::Subquery { .. })
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            TableExpression::Table(t) => t.name().to_string(),
            TableExpression::Subquery { alias, .. } => {
                alias.clone().unwrap_or_else(|| "subquery".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "join",
            JoinType::Left => "left join",
            JoinType::Right => "right join",
            JoinType::Full => "full join",
        }
    }
}

/// `<join-type> <table>[ <alias>] on <criteria>`
#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) join_type: JoinType,
    pub(crate) table: TableExpression,
    pub(crate) criteria: CriterionTree,
}

/// Paging suffix.
///
/// With a limit the `limit ? offset ?` form is used; otherwise the
/// `offset ? rows fetch first ? rows only` form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub fetch_first: Option<i64>,
}

impl Paging {
    pub(crate) fn is_empty(&self) -> bool {
        self.limit.is_none() && self.offset.is_none() && self.fetch_first.is_none()
    }
}
