//! Convenient imports for building and rendering statements.
//!
//! ```ignore
//! use dynsql::prelude::*;
//! ```

pub use crate::column::*;
pub use crate::condition::*;
pub use crate::config::{StatementConfiguration, StatementHook};
pub use crate::criterion::{
    CriteriaGroup, Criterion, CriterionTree, criterion, exists, group, group_of, not, not_exists,
    not_of, on,
};
pub use crate::delete::*;
pub use crate::error::{SqlError, SqlResult};
pub use crate::insert::*;
pub use crate::mapping::{ColumnMapping, Record};
pub use crate::render::{
    ColonNamed, NamedMap, PlaceholderStrategy, Positional, SequentialDollar, SqlStatement,
};
pub use crate::select::*;
pub use crate::table::SqlTable;
pub use crate::update::*;
pub use crate::value::{SqlType, Value};
