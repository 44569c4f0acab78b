use super::model::{
    Join, JoinType, Paging, QueryExpression, SelectModel, SetOperator, TableExpression,
};
use crate::column::{BasicColumn, SortSpec, SqlColumn, count, count_all, count_distinct};
use crate::condition::IntoCondition;
use crate::config::StatementConfiguration;
use crate::criterion::{
    ClauseBuilder, Connector, CriteriaGroup, Criterion, CriterionTree, criterion,
    impl_where_methods,
};
use crate::error::{Clause, SqlError, SqlResult};
use crate::render::{ExplicitAliases, GuaranteedAliases, TableAliasCalculator, trace_build_error};
use crate::table::{SqlTable, TableAliases};
use std::sync::Arc;

/// Query expression under construction.
#[derive(Debug)]
struct ExpressionBuilder {
    connector: Option<SetOperator>,
    distinct: bool,
    items: Vec<BasicColumn>,
    table: Option<TableExpression>,
    aliases: TableAliases,
    joins: Vec<Join>,
    where_: ClauseBuilder,
    group_by: Vec<BasicColumn>,
    having: ClauseBuilder,
}

impl ExpressionBuilder {
    fn new(connector: Option<SetOperator>, distinct: bool, items: Vec<BasicColumn>) -> Self {
        Self {
            connector,
            distinct,
            items,
            table: None,
            aliases: TableAliases::new(),
            joins: Vec::new(),
            where_: ClauseBuilder::default(),
            group_by: Vec::new(),
            having: ClauseBuilder::default(),
        }
    }

    fn build(self) -> SqlResult<QueryExpression> {
        if self.items.is_empty() {
            return Err(SqlError::EmptySelectList);
        }
        let table = self.table.ok_or(SqlError::MissingTable("select"))?;
        let aliases: Arc<dyn TableAliasCalculator> =
            if !self.joins.is_empty() && !self.joins.iter().any(|j| j.table.is_subquery()) {
                Arc::new(GuaranteedAliases(self.aliases))
            } else {
                Arc::new(ExplicitAliases(self.aliases))
            };
        Ok(QueryExpression {
            connector: self.connector,
            distinct: self.distinct,
            items: self.items,
            table,
            aliases,
            joins: self.joins,
            where_: self.where_.build(),
            group_by: self.group_by,
            having: self.having.build(),
        })
    }
}

/// Builder for [`SelectModel`].
///
/// Methods are chainable; validation errors are kept and reported by
/// [`build`](SelectBuilder::build).
///
/// # Example
///
/// ```ignore
/// use dynsql::prelude::*;
///
/// let model = select([&id, &name])
///     .from(&animal)
///     .where_(&id, is_less_than(20))
///     .order_by([&id])
///     .build()?;
/// ```
#[derive(Debug)]
pub struct SelectBuilder {
    finished: Vec<ExpressionBuilder>,
    current: ExpressionBuilder,
    order_by: Vec<SortSpec>,
    paging: Paging,
    config: StatementConfiguration,
    build_error: Option<SqlError>,
}

/// Start a SELECT with the given select list.
pub fn select<I, C>(items: I) -> SelectBuilder
where
    I: IntoIterator<Item = C>,
    C: Into<BasicColumn>,
{
    SelectBuilder::start(false, items.into_iter().map(Into::into).collect())
}

/// Start a `select distinct`.
pub fn select_distinct<I, C>(items: I) -> SelectBuilder
where
    I: IntoIterator<Item = C>,
    C: Into<BasicColumn>,
{
    SelectBuilder::start(true, items.into_iter().map(Into::into).collect())
}

/// `select count(*) from <table>`
pub fn count_from(table: &SqlTable) -> SelectBuilder {
    SelectBuilder::start(false, vec![count_all()]).from(table)
}

/// `select count(<column>)`; supply the table with `from`.
pub fn count_column(column: &SqlColumn) -> SelectBuilder {
    SelectBuilder::start(false, vec![count(column)])
}

/// `select count(distinct <column>)`; supply the table with `from`.
pub fn count_distinct_column(column: &SqlColumn) -> SelectBuilder {
    SelectBuilder::start(false, vec![count_distinct(column)])
}

impl SelectBuilder {
    fn start(distinct: bool, items: Vec<BasicColumn>) -> Self {
        Self {
            finished: Vec::new(),
            current: ExpressionBuilder::new(None, distinct, items),
            order_by: Vec::new(),
            paging: Paging::default(),
            config: StatementConfiguration::default(),
            build_error: None,
        }
    }

    fn record_error(&mut self, err: SqlError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    // ==================== FROM ====================

    fn set_table(mut self, table: TableExpression) -> Self {
        if self.current.table.is_some() {
            self.record_error(SqlError::TableAlreadySet);
            return self;
        }
        self.current.table = Some(table);
        self
    }

    fn register_alias(&mut self, table: &SqlTable, alias: &str) {
        if let Err(e) = self.current.aliases.insert(table, alias) {
            self.record_error(e);
        }
    }

    pub fn from(self, table: &SqlTable) -> Self {
        self.set_table(TableExpression::Table(table.clone()))
    }

    /// `from <table> <alias>`; columns of the table are qualified with the alias.
    pub fn from_as(mut self, table: &SqlTable, alias: &str) -> Self {
        self.register_alias(table, alias);
        self.set_table(TableExpression::Table(table.clone()))
    }

    /// `from (select ...)`
    pub fn from_select(self, select: SelectModel) -> Self {
        self.set_table(TableExpression::Subquery {
            select: Arc::new(select),
            alias: None,
        })
    }

    /// `from (select ...) <alias>`
    pub fn from_select_as(self, select: SelectModel, alias: &str) -> Self {
        self.set_table(TableExpression::Subquery {
            select: Arc::new(select),
            alias: Some(alias.to_string()),
        })
    }

    // ==================== JOIN ====================

    fn push_join(mut self, join_type: JoinType, table: TableExpression, criteria: CriterionTree) -> Self {
        if criteria.is_empty() {
            self.record_error(SqlError::EmptyJoinCriteria(table.describe()));
            return self;
        }
        self.current.joins.push(Join {
            join_type,
            table,
            criteria,
        });
        self
    }

    fn table_join(
        mut self,
        join_type: JoinType,
        table: &SqlTable,
        alias: Option<&str>,
        on: CriterionTree,
    ) -> Self {
        if let Some(alias) = alias {
            self.register_alias(table, alias);
        }
        self.push_join(join_type, TableExpression::Table(table.clone()), on)
    }

    pub fn join(self, table: &SqlTable, on: CriteriaGroup) -> Self {
        self.table_join(JoinType::Inner, table, None, on.into())
    }

    pub fn join_as(self, table: &SqlTable, alias: &str, on: CriteriaGroup) -> Self {
        self.table_join(JoinType::Inner, table, Some(alias), on.into())
    }

    pub fn left_join(self, table: &SqlTable, on: CriteriaGroup) -> Self {
        self.table_join(JoinType::Left, table, None, on.into())
    }

    pub fn left_join_as(self, table: &SqlTable, alias: &str, on: CriteriaGroup) -> Self {
        self.table_join(JoinType::Left, table, Some(alias), on.into())
    }

    pub fn right_join(self, table: &SqlTable, on: CriteriaGroup) -> Self {
        self.table_join(JoinType::Right, table, None, on.into())
    }

    pub fn right_join_as(self, table: &SqlTable, alias: &str, on: CriteriaGroup) -> Self {
        self.table_join(JoinType::Right, table, Some(alias), on.into())
    }

    pub fn full_join(self, table: &SqlTable, on: CriteriaGroup) -> Self {
        self.table_join(JoinType::Full, table, None, on.into())
    }

    pub fn full_join_as(self, table: &SqlTable, alias: &str, on: CriteriaGroup) -> Self {
        self.table_join(JoinType::Full, table, Some(alias), on.into())
    }

    /// Join with an explicit list of `on` criteria, joined with `and`.
    ///
    /// An empty list is an error.
    pub fn join_on_all(
        self,
        join_type: JoinType,
        table: &SqlTable,
        alias: Option<&str>,
        criteria: impl IntoIterator<Item = Criterion>,
    ) -> Self {
        self.table_join(join_type, table, alias, CriterionTree::from_criteria(criteria))
    }

    /// `<join-type> (select ...) <alias> on ...`
    ///
    /// Query expressions with a subquery join only qualify columns whose
    /// tables carry explicit aliases.
    pub fn join_select(
        self,
        join_type: JoinType,
        select: SelectModel,
        alias: &str,
        on: CriteriaGroup,
    ) -> Self {
        let table = TableExpression::Subquery {
            select: Arc::new(select),
            alias: Some(alias.to_string()),
        };
        self.push_join(join_type, table, on.into())
    }

    // ==================== GROUP BY / HAVING ====================

    pub fn group_by<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<BasicColumn>,
    {
        let columns: Vec<BasicColumn> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            self.record_error(SqlError::EmptyGroupBy);
            return self;
        }
        self.current.group_by.extend(columns);
        self
    }

    /// Start the HAVING clause; a second call is an error.
    pub fn having(self, column: impl Into<BasicColumn>, condition: impl IntoCondition) -> Self {
        self.having_criterion(criterion(column, condition))
    }

    pub fn having_criterion(mut self, c: impl Into<Criterion>) -> Self {
        if let Err(e) = self.current.having.set_initial(c.into(), Clause::Having) {
            self.record_error(e);
        }
        self
    }

    pub fn and_having(mut self, column: impl Into<BasicColumn>, condition: impl IntoCondition) -> Self {
        self.current
            .having
            .push(Connector::And, criterion(column, condition));
        self
    }

    pub fn or_having(mut self, column: impl Into<BasicColumn>, condition: impl IntoCondition) -> Self {
        self.current
            .having
            .push(Connector::Or, criterion(column, condition));
        self
    }

    // ==================== UNION ====================

    fn push_expression(mut self, connector: SetOperator, distinct: bool, items: Vec<BasicColumn>) -> Self {
        let next = ExpressionBuilder::new(Some(connector), distinct, items);
        let previous = std::mem::replace(&mut self.current, next);
        self.finished.push(previous);
        self
    }

    /// Start a `union select ...` expression.
    pub fn union<I, C>(self, items: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<BasicColumn>,
    {
        self.push_expression(SetOperator::Union, false, items.into_iter().map(Into::into).collect())
    }

    /// Start a `union all select ...` expression.
    pub fn union_all<I, C>(self, items: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<BasicColumn>,
    {
        self.push_expression(SetOperator::UnionAll, false, items.into_iter().map(Into::into).collect())
    }

    /// Start a `union select distinct ...` expression.
    pub fn union_distinct<I, C>(self, items: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<BasicColumn>,
    {
        self.push_expression(SetOperator::Union, true, items.into_iter().map(Into::into).collect())
    }

    // ==================== ORDER BY / paging ====================

    /// Order by aliases or bare column names, in the given order.
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

    /// `limit ?`; switches paging to the limit/offset form.
    pub fn limit(mut self, limit: i64) -> Self {
        self.paging.limit = Some(limit);
        self.paging.fetch_first = None;
        self
    }

    /// `offset ?` (or `offset ? rows` without a limit).
    pub fn offset(mut self, offset: i64) -> Self {
        self.paging.offset = Some(offset);
        self
    }

    /// `fetch first ? rows only`; switches paging to the fetch-first form.
    pub fn fetch_first(mut self, rows: i64) -> Self {
        self.paging.fetch_first = Some(rows);
        self.paging.limit = None;
        self
    }

    // ==================== Configuration ====================

    pub fn with_configuration(mut self, config: StatementConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Omit WHERE/HAVING clauses whose conditions all dropped instead of failing.
    pub fn allow_non_rendering_where(mut self, allowed: bool) -> Self {
        self.config.non_rendering_where_allowed = allowed;
        self
    }

    /// Validate and freeze the statement.
    pub fn build(self) -> SqlResult<SelectModel> {
        let result = self.build_inner();
        if let Err(e) = &result {
            trace_build_error("select", e);
        }
        result
    }

    fn build_inner(mut self) -> SqlResult<SelectModel> {
        if let Some(err) = self.build_error.take() {
            return Err(err);
        }
        let mut expressions = Vec::with_capacity(self.finished.len() + 1);
        for expression in self.finished {
            expressions.push(expression.build()?);
        }
        expressions.push(self.current.build()?);
        Ok(SelectModel {
            expressions,
            order_by: self.order_by,
            paging: (!self.paging.is_empty()).then_some(self.paging),
            config: self.config,
        })
    }
}

impl_where_methods!(SelectBuilder, .current.where_);
