//! SELECT statements.
//!
//! A select is built once with [`SelectBuilder`] and rendered any number of
//! times. Subqueries (in conditions, select lists, `from` and joins) render
//! into the enclosing statement's context, so parameter numbering continues
//! across them:
//!
//! ```ignore
//! use dynsql::prelude::*;
//!
//! let inner = select([&id]).from(&animal).where_(&id, is_equal_to(2)).build()?;
//! let model = select([&id])
//!     .from(&animal)
//!     .where_(&id, is_less_than(22))
//!     .union([&id])
//!     .from(&animal)
//!     .where_(&id, is_in_select(inner))
//!     .build()?;
//!
//! let stmt = model.render(&SequentialDollar)?;
//! // select id from AnimalData where id < $1 union select id from AnimalData
//! //   where id in (select id from AnimalData where id = $2)
//! ```

mod builder;
mod model;
mod render;

pub use builder::{
    SelectBuilder, count_column, count_distinct_column, count_from, select, select_distinct,
};
pub use model::{
    Join, JoinType, Paging, QueryExpression, SelectModel, SetOperator, TableExpression,
};

pub(crate) use render::{render_limit, render_order_by};

#[cfg(test)]
mod tests;
