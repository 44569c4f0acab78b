//! # dynsql
//!
//! Typed SQL statement models rendered to text plus ordered parameter bindings.
//!
//! ## Features
//!
//! - **Build once, render many**: builders produce immutable models; every
//!   render starts a fresh parameter sequence
//! - **Self-suppressing conditions**: `*_when_present`, `filter` and `map`
//!   drop criteria that have nothing to say, and the surrounding tree closes up
//! - **Pluggable placeholders**: `#{parameters.p1}`, `:p1`, `?` or `$1`
//! - **Continuous numbering**: subqueries, unions and hooks share one sequence
//! - **No execution**: output is `(sql, bindings)` for whatever driver you use
//!
//! ## Example
//!
//! ```ignore
//! use dynsql::prelude::*;
//!
//! let animal = SqlTable::new("AnimalData");
//! let id = animal.column("id");
//! let name = animal.column("animal_name");
//!
//! let model = select([&id, &name])
//!     .from(&animal)
//!     .where_(&id, is_between(1, 10))
//!     .and(&name, is_like_when_present(None::<&str>))
//!     .order_by([&id])
//!     .build()?;
//!
//! let stmt = model.render(&SequentialDollar)?;
//! assert_eq!(stmt.sql, "select id, animal_name from AnimalData where id between $1 and $2 order by id");
//! ```

pub mod column;
pub mod condition;
pub mod config;
pub mod criterion;
pub mod delete;
pub mod error;
pub mod insert;
pub mod mapping;
pub mod prelude;
pub mod render;
pub mod select;
pub mod table;
pub mod update;
pub mod value;

pub use column::{BasicColumn, SortSpec, SqlColumn};
pub use condition::{Condition, IntoCondition};
pub use config::{PlaceholderStyle, RenderSettings, StatementConfiguration, StatementHook};
pub use criterion::{CriteriaGroup, Criterion, CriterionTree};
pub use error::{Clause, SqlError, SqlResult};
pub use mapping::{ColumnMapping, Record};
pub use render::{
    ColonNamed, NamedMap, ParameterBinding, ParameterBindings, PlaceholderStrategy, Positional,
    RenderingContext, SequentialDollar, SqlStatement,
};
pub use table::{SqlTable, TableAliases};
pub use value::{SqlType, Value};

pub use delete::{DeleteModel, delete_from, delete_from_as};
pub use insert::{insert, insert_batch, insert_into, insert_multiple, insert_select};
pub use select::{SelectModel, select, select_distinct};
pub use update::{UpdateModel, update, update_as};
