//! Condition algebra: the predicate attached to a column in a criterion.
//!
//! A [`Condition`] is either renderable or [`Condition::Empty`]. `Empty` is the
//! self-suppressing sentinel: a criterion holding it renders nothing and the
//! enclosing tree closes up around the gap.
//!
//! ```ignore
//! use dynsql::condition::*;
//!
//! is_less_than(20);                                   // id < ?
//! is_in([1, 2, 3]);                                   // id in (?,?,?)
//! is_equal_to_when_present(None::<i32>);             // dropped
//! is_in([Some(1), None]).map_present(|v| v);          // id in (?)
//! is_in([10, 22]).filter(|v| *v != 22);               // id in (?)
//! is_in(Vec::<i32>::new());                           // error at render
//! ```
//!
//! The last two lines are deliberately different: filtering every value away
//! yields `Empty` (silent), while an `in` list constructed with no values is a
//! caller error reported when the statement renders.

use crate::column::{BasicColumn, SqlColumn};
use crate::error::{SqlError, SqlResult};
use crate::render::RenderingContext;
use crate::select::SelectModel;
use crate::value::Value;
use std::sync::Arc;

/// A predicate over one column.
#[derive(Debug, Clone)]
pub enum Condition<T> {
    /// Absent; never rendered.
    Empty,
    /// `is null`, `is not null`
    NoValue { operator: &'static str },
    /// `= ?`, `like ?`, ...
    Single {
        operator: &'static str,
        value: T,
        upper: bool,
    },
    /// `between ? and ?`
    Two {
        operator1: &'static str,
        operator2: &'static str,
        value1: T,
        value2: T,
    },
    /// `in (?,?)`
    List {
        operator: &'static str,
        values: Vec<T>,
        upper: bool,
    },
    /// `in (select ...)`
    Subquery {
        operator: &'static str,
        select: Arc<SelectModel>,
    },
    /// `= other.column`
    Column {
        operator: &'static str,
        column: BasicColumn,
    },
}

impl<T> Condition<T> {
    /// Literal operator text, `None` for [`Condition::Empty`].
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            Condition::Empty => None,
            Condition::NoValue { operator }
            | Condition::Single { operator, .. }
            | Condition::List { operator, .. }
            | Condition::Subquery { operator, .. }
            | Condition::Column { operator, .. } => Some(*operator),
            Condition::Two { operator1, .. } => Some(*operator1),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Condition::Empty)
    }

    /// Whether this condition contributes to the rendered statement.
    ///
    /// A list condition constructed with no values is an error rather than a
    /// silent no-op.
    pub fn should_render(&self) -> SqlResult<bool> {
        match self {
            Condition::Empty => Ok(false),
            Condition::List {
                operator, values, ..
            } if values.is_empty() => Err(SqlError::EmptyInList(*operator)),
            _ => Ok(true),
        }
    }

    /// Transform every held value.
    pub fn map<R>(self, mut f: impl FnMut(T) -> R) -> Condition<R> {
        match self {
            Condition::Empty => Condition::Empty,
            Condition::NoValue { operator } => Condition::NoValue { operator },
            Condition::Single {
                operator,
                value,
                upper,
            } => Condition::Single {
                operator,
                value: f(value),
                upper,
            },
            Condition::Two {
                operator1,
                operator2,
                value1,
                value2,
            } => Condition::Two {
                operator1,
                operator2,
                value1: f(value1),
                value2: f(value2),
            },
            Condition::List {
                operator,
                values,
                upper,
            } => Condition::List {
                operator,
                values: values.into_iter().map(f).collect(),
                upper,
            },
            Condition::Subquery { operator, select } => Condition::Subquery { operator, select },
            Condition::Column { operator, column } => Condition::Column { operator, column },
        }
    }

    /// Transform held values; a `None` result marks the value absent.
    ///
    /// Single and two-value conditions become `Empty` when any value is absent.
    /// List conditions drop absent elements and become `Empty` when none remain.
    pub fn map_present<R>(self, mut f: impl FnMut(T) -> Option<R>) -> Condition<R> {
        match self {
            Condition::Single {
                operator,
                value,
                upper,
            } => match f(value) {
                Some(value) => Condition::Single {
                    operator,
                    value,
                    upper,
                },
                None => Condition::Empty,
            },
            Condition::Two {
                operator1,
                operator2,
                value1,
                value2,
            } => match (f(value1), f(value2)) {
                (Some(value1), Some(value2)) => Condition::Two {
                    operator1,
                    operator2,
                    value1,
                    value2,
                },
                _ => Condition::Empty,
            },
            Condition::List {
                operator,
                values,
                upper,
            } => {
                if values.is_empty() {
                    return Condition::List {
                        operator,
                        values: Vec::new(),
                        upper,
                    };
                }
                let values: Vec<R> = values.into_iter().filter_map(f).collect();
                if values.is_empty() {
                    Condition::Empty
                } else {
                    Condition::List {
                        operator,
                        values,
                        upper,
                    }
                }
            }
            Condition::Empty => Condition::Empty,
            Condition::NoValue { operator } => Condition::NoValue { operator },
            Condition::Subquery { operator, select } => Condition::Subquery { operator, select },
            Condition::Column { operator, column } => Condition::Column { operator, column },
        }
    }

    /// Keep the condition only if every held value satisfies `predicate`.
    ///
    /// List conditions keep the matching values and become `Empty` when
    /// filtering removes all of them.
    pub fn filter(self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        match self {
            Condition::Single { ref value, .. } => {
                if predicate(value) {
                    self
                } else {
                    Condition::Empty
                }
            }
            Condition::Two {
                ref value1,
                ref value2,
                ..
            } => {
                if predicate(value1) && predicate(value2) {
                    self
                } else {
                    Condition::Empty
                }
            }
            Condition::List {
                operator,
                values,
                upper,
            } => {
                if values.is_empty() {
                    return Condition::List {
                        operator,
                        values,
                        upper,
                    };
                }
                let values: Vec<T> = values.into_iter().filter(|v| predicate(v)).collect();
                if values.is_empty() {
                    Condition::Empty
                } else {
                    Condition::List {
                        operator,
                        values,
                        upper,
                    }
                }
            }
            other => other,
        }
    }

    /// Keep a two-value condition only if the pair satisfies `predicate`.
    pub fn filter_pair(self, predicate: impl FnOnce(&T, &T) -> bool) -> Self {
        match self {
            Condition::Two {
                ref value1,
                ref value2,
                ..
            } => {
                if predicate(value1, value2) {
                    self
                } else {
                    Condition::Empty
                }
            }
            other => other,
        }
    }

    /// Keep the condition when `keep` is true, otherwise drop it.
    pub fn when(self, keep: bool) -> Self {
        if keep { self } else { Condition::Empty }
    }
}

impl Condition<Value> {
    /// Render `<column> <predicate>`, or `None` when the condition is absent.
    pub(crate) fn render(
        &self,
        column: &BasicColumn,
        ctx: &mut RenderingContext<'_>,
    ) -> SqlResult<Option<String>> {
        if !self.should_render()? {
            return Ok(None);
        }
        let bind_column = column.sql_column();
        let rendered = match self {
            Condition::Empty => return Ok(None),
            Condition::NoValue { operator } => {
                format!("{} {operator}", column.render(ctx)?)
            }
            Condition::Single {
                operator,
                value,
                upper,
            } => {
                let left = render_left(column, *upper, ctx)?;
                let placeholder = ctx.bind(bind_column, upper_value(value, *upper))?;
                format!("{left} {operator} {placeholder}")
            }
            Condition::Two {
                operator1,
                operator2,
                value1,
                value2,
            } => {
                let left = column.render(ctx)?;
                let p1 = ctx.bind(bind_column, value1.clone())?;
                let p2 = ctx.bind(bind_column, value2.clone())?;
                format!("{left} {operator1} {p1} {operator2} {p2}")
            }
            Condition::List {
                operator,
                values,
                upper,
            } => {
                let left = render_left(column, *upper, ctx)?;
                let mut placeholders = Vec::with_capacity(values.len());
                for value in values {
                    placeholders.push(ctx.bind(bind_column, upper_value(value, *upper))?);
                }
                format!("{left} {operator} ({})", placeholders.join(","))
            }
            Condition::Subquery { operator, select } => {
                let left = column.render(ctx)?;
                let inner = select.render_fragment(ctx)?;
                format!("{left} {operator} ({inner})")
            }
            Condition::Column {
                operator,
                column: right,
            } => {
                let left = column.render(ctx)?;
                format!("{left} {operator} {}", right.render(ctx)?)
            }
        };
        Ok(Some(rendered))
    }
}

fn render_left(column: &BasicColumn, upper: bool, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
    let rendered = column.render(ctx)?;
    Ok(if upper {
        format!("upper({rendered})")
    } else {
        rendered
    })
}

fn upper_value(value: &Value, upper: bool) -> Value {
    if upper {
        value.to_uppercase()
    } else {
        value.clone()
    }
}

/// Conversion into the value-erased condition stored in a criterion.
pub trait IntoCondition {
    fn into_condition(self) -> Condition<Value>;
}

impl<T: Into<Value>> IntoCondition for Condition<T> {
    fn into_condition(self) -> Condition<Value> {
        self.map(Into::into)
    }
}

// ==================== No-value conditions ====================

pub fn is_null() -> Condition<Value> {
    Condition::NoValue {
        operator: "is null",
    }
}

pub fn is_not_null() -> Condition<Value> {
    Condition::NoValue {
        operator: "is not null",
    }
}

// ==================== Single-value conditions ====================

fn single<T>(operator: &'static str, value: T) -> Condition<T> {
    Condition::Single {
        operator,
        value,
        upper: false,
    }
}

fn single_when_present<T>(operator: &'static str, value: Option<T>) -> Condition<T> {
    match value {
        Some(value) => single(operator, value),
        None => Condition::Empty,
    }
}

macro_rules! single_value_conditions {
    ($($(#[$doc:meta])* $name:ident, $when_present:ident => $op:literal;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<T>(value: T) -> Condition<T> {
                single($op, value)
            }

            $(#[$doc])*
            ///
            /// Dropped when the value is `None`.
            pub fn $when_present<T>(value: Option<T>) -> Condition<T> {
                single_when_present($op, value)
            }
        )*
    };
}

single_value_conditions! {
    /// `= ?`
    is_equal_to, is_equal_to_when_present => "=";
    /// `<> ?`
    is_not_equal_to, is_not_equal_to_when_present => "<>";
    /// `> ?`
    is_greater_than, is_greater_than_when_present => ">";
    /// `>= ?`
    is_greater_than_or_equal_to, is_greater_than_or_equal_to_when_present => ">=";
    /// `< ?`
    is_less_than, is_less_than_when_present => "<";
    /// `<= ?`
    is_less_than_or_equal_to, is_less_than_or_equal_to_when_present => "<=";
    /// `like ?`
    is_like, is_like_when_present => "like";
    /// `not like ?`
    is_not_like, is_not_like_when_present => "not like";
}

// ==================== Two-value conditions ====================

/// `between ? and ?`
pub fn is_between<T>(value1: T, value2: T) -> Condition<T> {
    Condition::Two {
        operator1: "between",
        operator2: "and",
        value1,
        value2,
    }
}

/// `not between ? and ?`
pub fn is_not_between<T>(value1: T, value2: T) -> Condition<T> {
    Condition::Two {
        operator1: "not between",
        operator2: "and",
        value1,
        value2,
    }
}

/// `between ? and ?`, dropped when either bound is `None`.
pub fn is_between_when_present<T>(value1: Option<T>, value2: Option<T>) -> Condition<T> {
    match (value1, value2) {
        (Some(a), Some(b)) => is_between(a, b),
        _ => Condition::Empty,
    }
}

/// `not between ? and ?`, dropped when either bound is `None`.
pub fn is_not_between_when_present<T>(value1: Option<T>, value2: Option<T>) -> Condition<T> {
    match (value1, value2) {
        (Some(a), Some(b)) => is_not_between(a, b),
        _ => Condition::Empty,
    }
}

// ==================== List conditions ====================

fn list<T>(operator: &'static str, values: impl IntoIterator<Item = T>, upper: bool) -> Condition<T> {
    Condition::List {
        operator,
        values: values.into_iter().collect(),
        upper,
    }
}

fn list_when_present<T>(
    operator: &'static str,
    values: impl IntoIterator<Item = Option<T>>,
) -> Condition<T> {
    let values: Vec<T> = values.into_iter().flatten().collect();
    if values.is_empty() {
        Condition::Empty
    } else {
        list(operator, values, false)
    }
}

/// `in (?,?,...)`; constructing it with no values is an error at render time.
pub fn is_in<T>(values: impl IntoIterator<Item = T>) -> Condition<T> {
    list("in", values, false)
}

/// `not in (?,?,...)`; constructing it with no values is an error at render time.
pub fn is_not_in<T>(values: impl IntoIterator<Item = T>) -> Condition<T> {
    list("not in", values, false)
}

/// `in (...)` over the present values; dropped when none are present.
pub fn is_in_when_present<T>(values: impl IntoIterator<Item = Option<T>>) -> Condition<T> {
    list_when_present("in", values)
}

/// `not in (...)` over the present values; dropped when none are present.
pub fn is_not_in_when_present<T>(values: impl IntoIterator<Item = Option<T>>) -> Condition<T> {
    list_when_present("not in", values)
}

// ==================== Case-insensitive conditions ====================

fn upper_single(operator: &'static str, value: impl Into<String>) -> Condition<String> {
    Condition::Single {
        operator,
        value: value.into(),
        upper: true,
    }
}

/// `upper(col) = ?` with the value upper-cased.
pub fn is_equal_to_case_insensitive(value: impl Into<String>) -> Condition<String> {
    upper_single("=", value)
}

/// `upper(col) <> ?` with the value upper-cased.
pub fn is_not_equal_to_case_insensitive(value: impl Into<String>) -> Condition<String> {
    upper_single("<>", value)
}

/// `upper(col) like ?` with the pattern upper-cased.
pub fn is_like_case_insensitive(value: impl Into<String>) -> Condition<String> {
    upper_single("like", value)
}

/// `upper(col) not like ?` with the pattern upper-cased.
pub fn is_not_like_case_insensitive(value: impl Into<String>) -> Condition<String> {
    upper_single("not like", value)
}

/// `upper(col) in (...)` with every value upper-cased.
pub fn is_in_case_insensitive<S: Into<String>>(
    values: impl IntoIterator<Item = S>,
) -> Condition<String> {
    list("in", values.into_iter().map(Into::into), true)
}

/// `upper(col) not in (...)` with every value upper-cased.
pub fn is_not_in_case_insensitive<S: Into<String>>(
    values: impl IntoIterator<Item = S>,
) -> Condition<String> {
    list("not in", values.into_iter().map(Into::into), true)
}

// ==================== Subquery conditions ====================

macro_rules! subquery_conditions {
    ($($(#[$doc:meta])* $name:ident => $op:literal;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(select: SelectModel) -> Condition<Value> {
                Condition::Subquery {
                    operator: $op,
                    select: Arc::new(select),
                }
            }
        )*
    };
}

subquery_conditions! {
    /// `in (select ...)`
    is_in_select => "in";
    /// `not in (select ...)`
    is_not_in_select => "not in";
    /// `= (select ...)`
    is_equal_to_select => "=";
    /// `<> (select ...)`
    is_not_equal_to_select => "<>";
    /// `> (select ...)`
    is_greater_than_select => ">";
    /// `>= (select ...)`
    is_greater_than_or_equal_to_select => ">=";
    /// `< (select ...)`
    is_less_than_select => "<";
    /// `<= (select ...)`
    is_less_than_or_equal_to_select => "<=";
}

// ==================== Column comparisons ====================

macro_rules! column_conditions {
    ($($(#[$doc:meta])* $name:ident => $op:literal;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(column: impl Into<BasicColumn>) -> Condition<Value> {
                Condition::Column {
                    operator: $op,
                    column: column.into(),
                }
            }
        )*
    };
}

column_conditions! {
    /// `= <column>`; also the usual join condition.
    equal_to => "=";
    /// `<> <column>`
    not_equal_to => "<>";
    /// `> <column>`
    greater_than => ">";
    /// `>= <column>`
    greater_than_or_equal_to => ">=";
    /// `< <column>`
    less_than => "<";
    /// `<= <column>`
    less_than_or_equal_to => "<=";
}

/// `= <column>` from a borrowed column.
pub fn is_equal_to_column(column: &SqlColumn) -> Condition<Value> {
    equal_to(column.clone())
}

#[cfg(test)]
mod tests;
