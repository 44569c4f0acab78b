//! Column references, select-list items and sort specifications.

use crate::condition::IntoCondition;
use crate::criterion::{CriteriaGroup, CriterionTree, criterion};
use crate::error::{Clause, SqlError, SqlResult};
use crate::render::{PlaceholderStrategy, RenderingContext, join_fragments};
use crate::select::SelectModel;
use crate::table::SqlTable;
use crate::value::{SqlType, Value};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
struct ColumnInner {
    name: String,
    table: Option<SqlTable>,
    sql_type: Option<SqlType>,
    strategy: Option<Arc<dyn PlaceholderStrategy>>,
    alias: Option<String>,
    descending: bool,
}

/// A column reference.
///
/// Cheap to clone; the `with_*` / `as_alias` / `descending` methods return a new
/// column and leave the original untouched.
#[derive(Clone)]
pub struct SqlColumn(Arc<ColumnInner>);

impl SqlColumn {
    /// A column not bound to any table (rendered unqualified).
    pub fn new(name: impl Into<String>) -> Self {
        SqlColumn(Arc::new(ColumnInner {
            name: name.into(),
            table: None,
            sql_type: None,
            strategy: None,
            alias: None,
            descending: false,
        }))
    }

    pub(crate) fn for_table(table: SqlTable, name: impl Into<String>) -> Self {
        SqlColumn(Arc::new(ColumnInner {
            name: name.into(),
            table: Some(table),
            sql_type: None,
            strategy: None,
            alias: None,
            descending: false,
        }))
    }

    fn modify(&self, f: impl FnOnce(&mut ColumnInner)) -> Self {
        let mut inner = (*self.0).clone();
        f(&mut inner);
        SqlColumn(Arc::new(inner))
    }

    /// Attach a type tag carried by every binding of this column.
    pub fn with_type(&self, sql_type: SqlType) -> Self {
        self.modify(|c| c.sql_type = Some(sql_type))
    }

    /// Render placeholders for this column with a different strategy.
    pub fn with_strategy(&self, strategy: Arc<dyn PlaceholderStrategy>) -> Self {
        self.modify(|c| c.strategy = Some(strategy))
    }

    /// Alias used in the select list and by order by.
    pub fn as_alias(&self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.modify(|c| c.alias = Some(alias))
    }

    /// Sort this column descending when used in order by.
    pub fn descending(&self) -> Self {
        self.modify(|c| c.descending = true)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn table(&self) -> Option<&SqlTable> {
        self.0.table.as_ref()
    }

    pub fn sql_type(&self) -> Option<SqlType> {
        self.0.sql_type
    }

    pub fn strategy(&self) -> Option<&dyn PlaceholderStrategy> {
        self.0.strategy.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.0.alias.as_deref()
    }

    pub fn is_descending(&self) -> bool {
        self.0.descending
    }
}

impl fmt::Debug for SqlColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("SqlColumn");
        d.field("name", &self.0.name);
        if let Some(table) = &self.0.table {
            d.field("table", &table.name());
        }
        if let Some(sql_type) = self.0.sql_type {
            d.field("sql_type", &sql_type);
        }
        if let Some(alias) = &self.0.alias {
            d.field("alias", alias);
        }
        d.finish()
    }
}

/// Aggregate functions usable in select lists and HAVING.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    CountAll,
    Count,
    CountDistinct,
    Max,
    Min,
    Avg,
    Sum,
}

/// Anything that can appear in a select list, group by, or as the left side of a criterion.
#[derive(Debug, Clone)]
pub enum BasicColumn {
    Column(SqlColumn),
    /// Literal text rendered verbatim.
    Constant {
        value: String,
        alias: Option<String>,
    },
    /// Text rendered as a quoted SQL string literal.
    StringConstant {
        value: String,
        alias: Option<String>,
    },
    Aggregate {
        function: Aggregate,
        column: Option<SqlColumn>,
        alias: Option<String>,
    },
    /// Scalar subquery.
    Subquery {
        select: Arc<SelectModel>,
        alias: Option<String>,
    },
    Case {
        case: Arc<CaseExpression>,
        alias: Option<String>,
    },
    /// `<function> over (...)`
    Window {
        window: Arc<WindowExpression>,
        alias: Option<String>,
    },
}

impl BasicColumn {
    pub fn alias(&self) -> Option<&str> {
        match self {
            BasicColumn::Column(c) => c.alias(),
            BasicColumn::Constant { alias, .. }
            | BasicColumn::StringConstant { alias, .. }
            | BasicColumn::Aggregate { alias, .. }
            | BasicColumn::Subquery { alias, .. }
            | BasicColumn::Case { alias, .. }
            | BasicColumn::Window { alias, .. } => alias.as_deref(),
        }
    }

    /// Return a copy of this item carrying a select-list alias.
    pub fn as_alias(self, alias: impl Into<String>) -> Self {
        let alias: String = alias.into();
        match self {
            BasicColumn::Column(c) => BasicColumn::Column(c.as_alias(alias)),
            BasicColumn::Constant { value, .. } => BasicColumn::Constant {
                value,
                alias: Some(alias),
            },
            BasicColumn::StringConstant { value, .. } => BasicColumn::StringConstant {
                value,
                alias: Some(alias),
            },
            BasicColumn::Aggregate {
                function, column, ..
            } => BasicColumn::Aggregate {
                function,
                column,
                alias: Some(alias),
            },
            BasicColumn::Subquery { select, .. } => BasicColumn::Subquery {
                select,
                alias: Some(alias),
            },
            BasicColumn::Case { case, .. } => BasicColumn::Case {
                case,
                alias: Some(alias),
            },
            BasicColumn::Window { window, .. } => BasicColumn::Window {
                window,
                alias: Some(alias),
            },
        }
    }

    /// Start a window over this item (`sum(amount) over (...)`).
    pub fn over(self) -> WindowBuilder {
        WindowBuilder::new(self)
    }

    /// The underlying table column, if this item is one.
    pub fn sql_column(&self) -> Option<&SqlColumn> {
        match self {
            BasicColumn::Column(c) => Some(c),
            _ => None,
        }
    }

    /// Render without the alias (where, group by, join criteria).
    pub(crate) fn render(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        Ok(match self {
            BasicColumn::Column(c) => ctx.column_name(c),
            BasicColumn::Constant { value, .. } => value.clone(),
            BasicColumn::StringConstant { value, .. } => quote_string(value),
            BasicColumn::Aggregate {
                function, column, ..
            } => {
                let inner = match column {
                    Some(c) => ctx.column_name(c),
                    None => "*".to_string(),
                };
                match function {
                    Aggregate::CountAll => "count(*)".to_string(),
                    Aggregate::Count => format!("count({inner})"),
                    Aggregate::CountDistinct => format!("count(distinct {inner})"),
                    Aggregate::Max => format!("max({inner})"),
                    Aggregate::Min => format!("min({inner})"),
                    Aggregate::Avg => format!("avg({inner})"),
                    Aggregate::Sum => format!("sum({inner})"),
                }
            }
            BasicColumn::Subquery { select, .. } => {
                format!("({})", select.render_fragment(ctx)?)
            }
            BasicColumn::Case { case, .. } => case.render(ctx)?,
            BasicColumn::Window { window, .. } => window.render(ctx)?,
        })
    }

    /// Render for the select list (`<item>[ as <alias>]`).
    pub(crate) fn render_for_select(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        let rendered = self.render(ctx)?;
        Ok(match self.alias() {
            Some(alias) => format!("{rendered} as {alias}"),
            None => rendered,
        })
    }
}

impl From<SqlColumn> for BasicColumn {
    fn from(c: SqlColumn) -> Self {
        BasicColumn::Column(c)
    }
}

impl From<&SqlColumn> for BasicColumn {
    fn from(c: &SqlColumn) -> Self {
        BasicColumn::Column(c.clone())
    }
}

/// Quote text as a SQL string literal, doubling embedded single quotes.
pub(crate) fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Literal text rendered verbatim.
pub fn constant(value: impl Into<String>) -> BasicColumn {
    BasicColumn::Constant {
        value: value.into(),
        alias: None,
    }
}

/// Text rendered as a quoted string literal.
pub fn string_constant(value: impl Into<String>) -> BasicColumn {
    BasicColumn::StringConstant {
        value: value.into(),
        alias: None,
    }
}

fn aggregate(function: Aggregate, column: Option<SqlColumn>) -> BasicColumn {
    BasicColumn::Aggregate {
        function,
        column,
        alias: None,
    }
}

/// `count(*)`
pub fn count_all() -> BasicColumn {
    aggregate(Aggregate::CountAll, None)
}

/// `count(<col>)`
pub fn count(column: &SqlColumn) -> BasicColumn {
    aggregate(Aggregate::Count, Some(column.clone()))
}

/// `count(distinct <col>)`
pub fn count_distinct(column: &SqlColumn) -> BasicColumn {
    aggregate(Aggregate::CountDistinct, Some(column.clone()))
}

pub fn max(column: &SqlColumn) -> BasicColumn {
    aggregate(Aggregate::Max, Some(column.clone()))
}

pub fn min(column: &SqlColumn) -> BasicColumn {
    aggregate(Aggregate::Min, Some(column.clone()))
}

pub fn avg(column: &SqlColumn) -> BasicColumn {
    aggregate(Aggregate::Avg, Some(column.clone()))
}

pub fn sum(column: &SqlColumn) -> BasicColumn {
    aggregate(Aggregate::Sum, Some(column.clone()))
}

/// Scalar subquery as a select-list item.
pub fn subquery(select: SelectModel) -> BasicColumn {
    BasicColumn::Subquery {
        select: Arc::new(select),
        alias: None,
    }
}

#[derive(Debug, Clone)]
enum CaseCondition {
    /// Compared against the operand of a simple case.
    Value(Value),
    /// Searched case predicate.
    Criteria(CriterionTree),
}

#[derive(Debug, Clone)]
struct CaseWhen {
    condition: CaseCondition,
    then: Value,
}

/// A `case ... end` expression. Every `when`, `then` and `else` value is bound.
#[derive(Debug, Clone)]
pub struct CaseExpression {
    operand: Option<BasicColumn>,
    whens: Vec<CaseWhen>,
    otherwise: Option<Value>,
}

impl CaseExpression {
    fn render(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        if self.whens.is_empty() {
            return Err(SqlError::EmptyCaseExpression);
        }
        let bind_column = self.operand.as_ref().and_then(BasicColumn::sql_column);
        let mut parts = vec!["case".to_string()];
        if let Some(operand) = &self.operand {
            parts.push(operand.render(ctx)?);
        }
        for when in &self.whens {
            let condition = match &when.condition {
                CaseCondition::Value(value) => ctx.bind(bind_column, value.clone())?,
                CaseCondition::Criteria(tree) => tree
                    .render(ctx)?
                    .ok_or(SqlError::NonRenderingClause(Clause::Case))?,
            };
            let then = ctx.bind(None, when.then.clone())?;
            parts.push(format!("when {condition} then {then}"));
        }
        if let Some(value) = &self.otherwise {
            parts.push(format!("else {}", ctx.bind(None, value.clone())?));
        }
        parts.push("end".to_string());
        Ok(parts.join(" "))
    }
}

/// Builder for `case <operand> when <value> then <value> ... end`.
#[derive(Debug, Clone)]
pub struct SimpleCaseBuilder(CaseExpression);

impl SimpleCaseBuilder {
    pub fn when(mut self, value: impl Into<Value>, then: impl Into<Value>) -> Self {
        self.0.whens.push(CaseWhen {
            condition: CaseCondition::Value(value.into()),
            then: then.into(),
        });
        self
    }

    pub fn else_(mut self, value: impl Into<Value>) -> Self {
        self.0.otherwise = Some(value.into());
        self
    }

    pub fn end(self) -> BasicColumn {
        BasicColumn::Case {
            case: Arc::new(self.0),
            alias: None,
        }
    }
}

/// Builder for `case when <criteria> then <value> ... end`.
///
/// A `when` whose criteria all drop is an error at render.
#[derive(Debug, Clone)]
pub struct SearchedCaseBuilder(CaseExpression);

impl SearchedCaseBuilder {
    pub fn when(
        self,
        column: impl Into<BasicColumn>,
        condition: impl IntoCondition,
        then: impl Into<Value>,
    ) -> Self {
        let tree = CriterionTree::from_criteria([criterion(column, condition)]);
        self.push(tree, then.into())
    }

    /// `when` with a whole criteria group, e.g. `group(a, ..).or(b, ..)`.
    pub fn when_criteria(self, criteria: CriteriaGroup, then: impl Into<Value>) -> Self {
        self.push(CriterionTree::from(criteria), then.into())
    }

    fn push(mut self, tree: CriterionTree, then: Value) -> Self {
        self.0.whens.push(CaseWhen {
            condition: CaseCondition::Criteria(tree),
            then,
        });
        self
    }

    pub fn else_(mut self, value: impl Into<Value>) -> Self {
        self.0.otherwise = Some(value.into());
        self
    }

    pub fn end(self) -> BasicColumn {
        BasicColumn::Case {
            case: Arc::new(self.0),
            alias: None,
        }
    }
}

/// `case <operand> when ...`
pub fn case(operand: impl Into<BasicColumn>) -> SimpleCaseBuilder {
    SimpleCaseBuilder(CaseExpression {
        operand: Some(operand.into()),
        whens: Vec::new(),
        otherwise: None,
    })
}

/// `case when <criteria> ...`
pub fn case_when() -> SearchedCaseBuilder {
    SearchedCaseBuilder(CaseExpression {
        operand: None,
        whens: Vec::new(),
        otherwise: None,
    })
}

/// A window function call and its `over` clause.
#[derive(Debug, Clone)]
pub struct WindowExpression {
    function: BasicColumn,
    partition_by: Vec<BasicColumn>,
    order_by: Vec<SqlColumn>,
}

impl WindowExpression {
    fn render(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        let function = self.function.render(ctx)?;
        let mut partition = Vec::with_capacity(self.partition_by.len());
        for item in &self.partition_by {
            partition.push(item.render(ctx)?);
        }
        let partition = if partition.is_empty() {
            String::new()
        } else {
            format!("partition by {}", partition.join(", "))
        };
        let order = if self.order_by.is_empty() {
            String::new()
        } else {
            let specs: Vec<String> = self
                .order_by
                .iter()
                .map(|c| {
                    let name = ctx.column_name(c);
                    if c.is_descending() {
                        format!("{name} DESC")
                    } else {
                        name
                    }
                })
                .collect();
            format!("order by {}", specs.join(", "))
        };
        Ok(format!("{function} over ({})", join_fragments([partition, order])))
    }
}

/// Builder for a window item; finish with [`WindowBuilder::end`].
#[derive(Debug, Clone)]
pub struct WindowBuilder(WindowExpression);

impl WindowBuilder {
    fn new(function: BasicColumn) -> Self {
        WindowBuilder(WindowExpression {
            function,
            partition_by: Vec::new(),
            order_by: Vec::new(),
        })
    }

    pub fn partition_by<I, C>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<BasicColumn>,
    {
        self.0.partition_by.extend(items.into_iter().map(Into::into));
        self
    }

    /// Columns sort by their qualified name; `descending()` columns sort `DESC`.
    pub fn order_by<'c, I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = &'c SqlColumn>,
    {
        self.0.order_by.extend(columns.into_iter().cloned());
        self
    }

    pub fn end(self) -> BasicColumn {
        BasicColumn::Window {
            window: Arc::new(self.0),
            alias: None,
        }
    }
}

/// `row_number() over (...)`
pub fn row_number() -> WindowBuilder {
    WindowBuilder::new(constant("row_number()"))
}

/// `rank() over (...)`
pub fn rank() -> WindowBuilder {
    WindowBuilder::new(constant("rank()"))
}

/// `dense_rank() over (...)`
pub fn dense_rank() -> WindowBuilder {
    WindowBuilder::new(constant("dense_rank()"))
}

/// One order by entry.
///
/// A column sorts by its alias when it has one, otherwise by its bare name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    name: String,
    descending: bool,
}

impl SortSpec {
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    pub(crate) fn render(&self) -> String {
        if self.descending {
            format!("{} DESC", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Sort by a name as written (an alias, or `a.id`).
pub fn sort_column(name: impl Into<String>) -> SortSpec {
    SortSpec {
        name: name.into(),
        descending: false,
    }
}

/// Sort by a column qualified with an explicit table alias.
pub fn sort_qualified(table_alias: &str, column: &SqlColumn) -> SortSpec {
    SortSpec {
        name: format!("{table_alias}.{}", column.name()),
        descending: column.is_descending(),
    }
}

impl From<&SqlColumn> for SortSpec {
    fn from(c: &SqlColumn) -> Self {
        SortSpec {
            name: c.alias().unwrap_or(c.name()).to_string(),
            descending: c.is_descending(),
        }
    }
}

impl From<SqlColumn> for SortSpec {
    fn from(c: SqlColumn) -> Self {
        SortSpec::from(&c)
    }
}

impl From<&str> for SortSpec {
    fn from(name: &str) -> Self {
        sort_column(name)
    }
}
