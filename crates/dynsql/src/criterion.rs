//! Boolean criterion trees for WHERE, HAVING and join `on` clauses.
//!
//! Leaves whose condition is [`Condition::Empty`](crate::condition::Condition::Empty)
//! drop out, groups whose members all dropped drop out, and the first rendered
//! criterion of any level loses its connector:
//!
//! ```ignore
//! use dynsql::criterion::{group, not_of};
//!
//! // where not (id between ? and ? or name = ?)
//! let tree = not_of(group(&id, is_between(10, 60)).or(&name, is_equal_to("X")));
//! ```

use crate::column::BasicColumn;
use crate::condition::{Condition, IntoCondition};
use crate::config::StatementConfiguration;
use crate::error::{Clause, SqlError, SqlResult};
use crate::render::RenderingContext;
use crate::select::SelectModel;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Connector written before a non-initial criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Connector::And => "and",
            Connector::Or => "or",
        })
    }
}

/// One node of a criterion tree.
#[derive(Debug, Clone)]
pub enum Criterion {
    /// `<column> <condition>`
    Condition {
        column: BasicColumn,
        condition: Condition<Value>,
    },
    /// `exists (select ...)` / `not exists (select ...)`
    Exists {
        operator: &'static str,
        select: Arc<SelectModel>,
    },
    /// Nested criteria, optionally negated.
    Group {
        not: bool,
        criteria: Vec<ConnectedCriterion>,
    },
}

/// A criterion and the connector that precedes it (`None` for the first).
#[derive(Debug, Clone)]
pub struct ConnectedCriterion {
    pub connector: Option<Connector>,
    pub criterion: Criterion,
}

impl Criterion {
    /// Render this node, or `None` when every leaf beneath it dropped.
    pub(crate) fn render(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<Option<String>> {
        match self {
            Criterion::Condition { column, condition } => condition.render(column, ctx),
            Criterion::Exists { operator, select } => {
                let inner = select.render_fragment(ctx)?;
                Ok(Some(format!("{operator} ({inner})")))
            }
            Criterion::Group { not, criteria } => {
                let rendered = render_connected(criteria, ctx)?;
                if rendered.is_empty() {
                    return Ok(None);
                }
                let body = join_connected(&rendered);
                let body = if rendered.len() > 1 {
                    format!("({body})")
                } else {
                    body
                };
                Ok(Some(if *not { format!("not {body}") } else { body }))
            }
        }
    }
}

fn render_connected(
    criteria: &[ConnectedCriterion],
    ctx: &mut RenderingContext<'_>,
) -> SqlResult<Vec<(Option<Connector>, String)>> {
    let mut rendered = Vec::with_capacity(criteria.len());
    for item in criteria {
        if let Some(fragment) = item.criterion.render(ctx)? {
            rendered.push((item.connector, fragment));
        }
    }
    Ok(rendered)
}

fn join_connected(rendered: &[(Option<Connector>, String)]) -> String {
    let mut out = String::new();
    for (i, (connector, fragment)) in rendered.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            if let Some(connector) = connector {
                out.push_str(&connector.to_string());
                out.push(' ');
            }
        }
        out.push_str(fragment);
    }
    out
}

/// A `(column, condition)` leaf.
pub fn criterion(column: impl Into<BasicColumn>, condition: impl IntoCondition) -> Criterion {
    Criterion::Condition {
        column: column.into(),
        condition: condition.into_condition(),
    }
}

/// `exists (select ...)`
pub fn exists(select: SelectModel) -> Criterion {
    Criterion::Exists {
        operator: "exists",
        select: Arc::new(select),
    }
}

/// `not exists (select ...)`
pub fn not_exists(select: SelectModel) -> Criterion {
    Criterion::Exists {
        operator: "not exists",
        select: Arc::new(select),
    }
}

/// Builder for a parenthesized (and possibly negated) group of criteria.
#[derive(Debug, Clone)]
pub struct CriteriaGroup {
    not: bool,
    criteria: Vec<ConnectedCriterion>,
}

impl CriteriaGroup {
    fn starting_with(not: bool, first: Criterion) -> Self {
        Self {
            not,
            criteria: vec![ConnectedCriterion {
                connector: None,
                criterion: first,
            }],
        }
    }

    pub fn and(self, column: impl Into<BasicColumn>, condition: impl IntoCondition) -> Self {
        self.and_criterion(criterion(column, condition))
    }

    pub fn or(self, column: impl Into<BasicColumn>, condition: impl IntoCondition) -> Self {
        self.or_criterion(criterion(column, condition))
    }

    pub fn and_criterion(mut self, c: impl Into<Criterion>) -> Self {
        self.criteria.push(ConnectedCriterion {
            connector: Some(Connector::And),
            criterion: c.into(),
        });
        self
    }

    pub fn or_criterion(mut self, c: impl Into<Criterion>) -> Self {
        self.criteria.push(ConnectedCriterion {
            connector: Some(Connector::Or),
            criterion: c.into(),
        });
        self
    }
}

impl From<CriteriaGroup> for Criterion {
    fn from(g: CriteriaGroup) -> Self {
        Criterion::Group {
            not: g.not,
            criteria: g.criteria,
        }
    }
}

/// Group starting with a `(column, condition)` leaf.
pub fn group(column: impl Into<BasicColumn>, condition: impl IntoCondition) -> CriteriaGroup {
    CriteriaGroup::starting_with(false, criterion(column, condition))
}

/// Group starting with an arbitrary criterion.
pub fn group_of(first: impl Into<Criterion>) -> CriteriaGroup {
    CriteriaGroup::starting_with(false, first.into())
}

/// Negated group starting with a `(column, condition)` leaf.
pub fn not(column: impl Into<BasicColumn>, condition: impl IntoCondition) -> CriteriaGroup {
    CriteriaGroup::starting_with(true, criterion(column, condition))
}

/// Negated group starting with an arbitrary criterion.
pub fn not_of(first: impl Into<Criterion>) -> CriteriaGroup {
    CriteriaGroup::starting_with(true, first.into())
}

/// Join condition starting with a `(column, condition)` leaf.
///
/// ```ignore
/// select([&o.id, &l.qty]).from_as(&orders, "o").join_as(&lines, "l", on(&l.order_id, equal_to(&o.id)))
/// ```
pub fn on(column: impl Into<BasicColumn>, condition: impl IntoCondition) -> CriteriaGroup {
    group(column, condition)
}

/// Top-level criteria of a WHERE/HAVING/on clause.
#[derive(Debug, Clone, Default)]
pub struct CriterionTree {
    criteria: Vec<ConnectedCriterion>,
    initial_set: bool,
}

impl CriterionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Set the initial criterion; a second call is an error.
    pub(crate) fn set_initial(&mut self, c: Criterion, clause: Clause) -> SqlResult<()> {
        if self.initial_set {
            return Err(SqlError::CriterionAlreadySet(clause));
        }
        self.initial_set = true;
        self.criteria.insert(
            0,
            ConnectedCriterion {
                connector: None,
                criterion: c,
            },
        );
        if let Some(second) = self.criteria.get_mut(1) {
            if second.connector.is_none() {
                second.connector = Some(Connector::And);
            }
        }
        Ok(())
    }

    pub(crate) fn push(&mut self, connector: Connector, c: Criterion) {
        self.criteria.push(ConnectedCriterion {
            connector: Some(connector),
            criterion: c,
        });
    }

    /// Render the clause body, or `None` when every criterion dropped.
    pub(crate) fn render(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<Option<String>> {
        let rendered = render_connected(&self.criteria, ctx)?;
        if rendered.is_empty() {
            return Ok(None);
        }
        Ok(Some(join_connected(&rendered)))
    }

    /// Render `<keyword> <body>`, or nothing when the clause is absent.
    ///
    /// A tree that was declared but rendered nothing is an error unless the
    /// statement allows non-rendering clauses.
    pub(crate) fn render_clause(
        tree: Option<&CriterionTree>,
        clause: Clause,
        config: &StatementConfiguration,
        ctx: &mut RenderingContext<'_>,
    ) -> SqlResult<String> {
        let Some(tree) = tree else {
            return Ok(String::new());
        };
        match tree.render(ctx)? {
            Some(body) => Ok(format!("{clause} {body}")),
            None if config.non_rendering_where_allowed => Ok(String::new()),
            None => Err(SqlError::NonRenderingClause(clause)),
        }
    }
}

impl From<CriteriaGroup> for CriterionTree {
    fn from(g: CriteriaGroup) -> Self {
        if g.not {
            return CriterionTree::from_criteria([Criterion::from(g)]);
        }
        CriterionTree {
            criteria: g.criteria,
            initial_set: true,
        }
    }
}

impl CriterionTree {
    /// Tree of criteria joined with `and`.
    pub fn from_criteria(criteria: impl IntoIterator<Item = Criterion>) -> Self {
        let criteria: Vec<ConnectedCriterion> = criteria
            .into_iter()
            .enumerate()
            .map(|(i, criterion)| ConnectedCriterion {
                connector: (i > 0).then_some(Connector::And),
                criterion,
            })
            .collect();
        let initial_set = !criteria.is_empty();
        CriterionTree {
            criteria,
            initial_set,
        }
    }
}

/// Accumulates a clause on a statement builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct ClauseBuilder {
    tree: Option<CriterionTree>,
}

impl ClauseBuilder {
    pub(crate) fn set_initial(&mut self, c: Criterion, clause: Clause) -> SqlResult<()> {
        self.tree.get_or_insert_with(CriterionTree::new).set_initial(c, clause)
    }

    pub(crate) fn push(&mut self, connector: Connector, c: Criterion) {
        self.tree.get_or_insert_with(CriterionTree::new).push(connector, c);
    }

    pub(crate) fn build(self) -> Option<CriterionTree> {
        self.tree
    }
}

/// WHERE builder methods for a statement builder.
///
/// The builder provides `record_error(&mut self, SqlError)`; the macro takes
/// the field path of its WHERE [`ClauseBuilder`].
macro_rules! impl_where_methods {
    ($builder:ty, $(.$field:ident)+) => {
        impl $builder {
            /// Start the WHERE clause; a second call is an error.
            pub fn where_(
                self,
                column: impl Into<$crate::column::BasicColumn>,
                condition: impl $crate::condition::IntoCondition,
            ) -> Self {
                self.where_criterion($crate::criterion::criterion(column, condition))
            }

            /// Start the WHERE clause with a group, `exists` or other criterion.
            pub fn where_criterion(mut self, c: impl Into<$crate::criterion::Criterion>) -> Self {
                if let Err(e) = self$(.$field)+.set_initial(c.into(), $crate::error::Clause::Where) {
                    self.record_error(e);
                }
                self
            }

            pub fn and(
                self,
                column: impl Into<$crate::column::BasicColumn>,
                condition: impl $crate::condition::IntoCondition,
            ) -> Self {
                self.and_criterion($crate::criterion::criterion(column, condition))
            }

            pub fn or(
                self,
                column: impl Into<$crate::column::BasicColumn>,
                condition: impl $crate::condition::IntoCondition,
            ) -> Self {
                self.or_criterion($crate::criterion::criterion(column, condition))
            }

            pub fn and_criterion(mut self, c: impl Into<$crate::criterion::Criterion>) -> Self {
                self$(.$field)+.push($crate::criterion::Connector::And, c.into());
                self
            }

            pub fn or_criterion(mut self, c: impl Into<$crate::criterion::Criterion>) -> Self {
                self$(.$field)+.push($crate::criterion::Connector::Or, c.into());
                self
            }
        }
    };
}

pub(crate) use impl_where_methods;
