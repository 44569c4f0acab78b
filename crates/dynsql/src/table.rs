//! Table descriptors.

use crate::column::SqlColumn;
use std::fmt;
use std::sync::Arc;

/// A table descriptor shared by every column and statement that references it.
///
/// Identity is the descriptor instance, not the name: two `SqlTable::new("t")`
/// calls produce two tables that may carry different aliases in one statement.
///
/// # Example
///
/// ```ignore
/// use dynsql::{SqlTable, SqlType};
///
/// let animal = SqlTable::new("AnimalData");
/// let id = animal.column("id").with_type(SqlType::Integer);
/// let name = animal.column("animal_name");
/// ```
#[derive(Clone)]
pub struct SqlTable(Arc<str>);

impl SqlTable {
    pub fn new(name: impl AsRef<str>) -> Self {
        SqlTable(Arc::from(name.as_ref()))
    }

    /// Name rendered into statements.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Create a column bound to this table.
    pub fn column(&self, name: impl Into<String>) -> SqlColumn {
        SqlColumn::for_table(self.clone(), name)
    }

    /// True when both handles point at the same descriptor.
    pub fn same_as(&self, other: &SqlTable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for SqlTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SqlTable").field(&&*self.0).finish()
    }
}

/// Ordered table → alias map for one query expression.
#[derive(Clone, Debug, Default)]
pub struct TableAliases {
    entries: Vec<(SqlTable, String)>,
}

impl TableAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias; a second distinct alias for the same table is rejected.
    pub fn insert(&mut self, table: &SqlTable, alias: impl Into<String>) -> crate::SqlResult<()> {
        let alias = alias.into();
        if let Some(existing) = self.get(table) {
            if existing == alias {
                return Ok(());
            }
            return Err(crate::SqlError::duplicate_alias(
                table.name(),
                existing,
                alias,
            ));
        }
        self.entries.push((table.clone(), alias));
        Ok(())
    }

    pub fn get(&self, table: &SqlTable) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t.same_as(table))
            .map(|(_, alias)| alias.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
