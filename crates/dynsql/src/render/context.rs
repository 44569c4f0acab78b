//! Render-scoped state: strategy, parameter sequence, bindings and table aliases.

use super::bindings::{ParameterBinding, ParameterBindings};
use super::strategy::PlaceholderStrategy;
use crate::column::SqlColumn;
use crate::error::SqlResult;
use crate::table::{SqlTable, TableAliases};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Resolves the alias used to qualify columns and to name tables.
pub trait TableAliasCalculator: Send + Sync + fmt::Debug {
    /// Qualifier for columns of `table`.
    fn alias_for_column(&self, table: &SqlTable) -> Option<String>;

    /// Alias written after the table name in `from` / `join`.
    fn alias_for_table(&self, table: &SqlTable) -> Option<String>;
}

/// Only aliases the caller declared.
#[derive(Debug, Clone, Default)]
pub struct ExplicitAliases(pub TableAliases);

impl TableAliasCalculator for ExplicitAliases {
    fn alias_for_column(&self, table: &SqlTable) -> Option<String> {
        self.0.get(table).map(str::to_string)
    }

    fn alias_for_table(&self, table: &SqlTable) -> Option<String> {
        self.0.get(table).map(str::to_string)
    }
}

/// Declared aliases, falling back to the table name for columns.
///
/// Used for joined query expressions so every column is qualified.
#[derive(Debug, Clone, Default)]
pub struct GuaranteedAliases(pub TableAliases);

impl TableAliasCalculator for GuaranteedAliases {
    fn alias_for_column(&self, table: &SqlTable) -> Option<String> {
        Some(
            self.0
                .get(table)
                .map(str::to_string)
                .unwrap_or_else(|| table.name().to_string()),
        )
    }

    fn alias_for_table(&self, table: &SqlTable) -> Option<String> {
        self.0.get(table).map(str::to_string)
    }
}

/// State threaded through one render call.
///
/// Subqueries and union branches render against the same context, so the
/// parameter sequence is continuous across the whole statement. Build a fresh
/// context for every render.
pub struct RenderingContext<'a> {
    strategy: &'a dyn PlaceholderStrategy,
    parameter_name: Option<String>,
    sequence: usize,
    bindings: ParameterBindings,
    aliases: Vec<Arc<dyn TableAliasCalculator>>,
}

impl<'a> RenderingContext<'a> {
    pub fn new(strategy: &'a dyn PlaceholderStrategy) -> Self {
        Self {
            strategy,
            parameter_name: None,
            sequence: 1,
            bindings: ParameterBindings::new(),
            aliases: Vec::new(),
        }
    }

    /// Prefix the parameter map path (`#{record.parameters.p1}`).
    pub fn with_parameter_name(mut self, name: impl Into<String>) -> Self {
        self.parameter_name = Some(name.into());
        self
    }

    /// Outermost alias calculator, consulted after every statement-level one.
    pub fn with_alias_calculator(mut self, calculator: Arc<dyn TableAliasCalculator>) -> Self {
        self.aliases.insert(0, calculator);
        self
    }

    pub fn strategy(&self) -> &dyn PlaceholderStrategy {
        self.strategy
    }

    /// Map path used by map-based placeholders.
    pub fn parameter_prefix(&self) -> String {
        match &self.parameter_name {
            Some(name) => format!("{name}.parameters"),
            None => "parameters".to_string(),
        }
    }

    /// Run `f` with an additional alias scope that shadows the enclosing ones.
    pub(crate) fn with_aliases<T>(
        &mut self,
        calculator: Arc<dyn TableAliasCalculator>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.aliases.push(calculator);
        let out = f(self);
        self.aliases.pop();
        out
    }

    /// Alias-qualified column name.
    pub fn column_name(&self, column: &SqlColumn) -> String {
        match column.table().and_then(|t| self.column_alias(t)) {
            Some(alias) => format!("{alias}.{}", column.name()),
            None => column.name().to_string(),
        }
    }

    fn column_alias(&self, table: &SqlTable) -> Option<String> {
        self.aliases
            .iter()
            .rev()
            .find_map(|calc| calc.alias_for_column(table))
    }

    /// Alias written after a table name.
    pub fn table_alias(&self, table: &SqlTable) -> Option<String> {
        self.aliases
            .iter()
            .rev()
            .find_map(|calc| calc.alias_for_table(table))
    }

    /// `<table>[ <alias>]`
    pub fn table_with_alias(&self, table: &SqlTable) -> String {
        match self.table_alias(table) {
            Some(alias) => format!("{} {alias}", table.name()),
            None => table.name().to_string(),
        }
    }

    /// Bind a value and return its placeholder text.
    ///
    /// The key comes from the active strategy; the placeholder text from the
    /// column's own strategy when it carries one.
    pub fn bind(&mut self, column: Option<&SqlColumn>, value: impl Into<Value>) -> SqlResult<String> {
        let sequence = self.sequence;
        self.sequence += 1;
        let key = self.strategy.parameter_key(sequence);
        let text_strategy = column.and_then(SqlColumn::strategy).unwrap_or(self.strategy);
        let placeholder = text_strategy.placeholder(column, &self.parameter_prefix(), &key);
        let binding = ParameterBinding::new(key, value).with_type(column.and_then(SqlColumn::sql_type));
        self.bindings.push(binding)?;
        Ok(placeholder)
    }

    /// Bind a record property under `path` (`row.id`, `records[2].id`).
    ///
    /// Row bindings are keyed by path and do not consume sequence numbers. A
    /// path already bound to the same value is reused.
    pub fn bind_row(&mut self, column: &SqlColumn, path: &str, value: Value) -> SqlResult<String> {
        let placeholder = self.strategy.row_placeholder(column, path)?;
        if self.bindings.get(path) == Some(&value) {
            return Ok(placeholder);
        }
        let binding = ParameterBinding::new(path, value).with_type(column.sql_type());
        self.bindings.push(binding)?;
        Ok(placeholder)
    }

    /// Record a caller-keyed binding that has no generated placeholder.
    pub fn push_binding(&mut self, binding: ParameterBinding) -> SqlResult<()> {
        self.bindings.push(binding)?;
        Ok(())
    }

    /// Placeholder for a record property without binding a value.
    pub fn row_placeholder(&self, column: &SqlColumn, path: &str) -> SqlResult<String> {
        self.strategy.row_placeholder(column, path)
    }

    pub fn bindings(&self) -> &ParameterBindings {
        &self.bindings
    }

    /// Consume the context, returning the accumulated bindings.
    pub fn into_bindings(self) -> ParameterBindings {
        self.bindings
    }
}

impl fmt::Debug for RenderingContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderingContext")
            .field("strategy", &self.strategy.name())
            .field("sequence", &self.sequence)
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

#[cfg(feature = "tracing")]
const MAX_LOGGED_SQL: usize = 200;

/// Emit a debug event for a finished render.
#[allow(unused_variables)]
pub(crate) fn trace_rendered(statement: &'static str, strategy: &str, sql: &str, param_count: usize) {
    #[cfg(feature = "tracing")]
    {
        let shown = truncate_sql_bytes(sql, MAX_LOGGED_SQL);
        tracing::debug!(
            target: "dynsql.render",
            statement,
            strategy,
            param_count,
            sql = %shown,
        );
    }
}

/// Emit a debug event for a rejected build.
#[allow(unused_variables)]
pub(crate) fn trace_build_error(statement: &'static str, err: &crate::SqlError) {
    #[cfg(feature = "tracing")]
    tracing::debug!(target: "dynsql.build", statement, code = err.code(), error = %err);
}

#[cfg(any(feature = "tracing", test))]
fn truncate_sql_bytes(sql: &str, max: usize) -> &str {
    if sql.len() <= max {
        return sql;
    }
    let mut end = max;
    while !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::strategy::{NamedMap, Positional, SequentialDollar};
    use crate::value::SqlType;

    #[test]
    fn test_sequence_is_shared() {
        let mut ctx = RenderingContext::new(&SequentialDollar);
        assert_eq!(ctx.bind(None, 1).unwrap(), "$1");
        assert_eq!(ctx.bind(None, 2).unwrap(), "$2");
        let bindings = ctx.into_bindings();
        assert_eq!(bindings.keys(), vec!["$1", "$2"]);
    }

    #[test]
    fn test_parameter_name_prefix() {
        let id = SqlTable::new("t").column("id").with_type(SqlType::Integer);
        let mut ctx = RenderingContext::new(&NamedMap).with_parameter_name("record");
        assert_eq!(
            ctx.bind(Some(&id), 4).unwrap(),
            "#{record.parameters.p1,jdbcType=INTEGER}"
        );
        assert_eq!(ctx.bindings().iter().next().unwrap().sql_type, Some(SqlType::Integer));
    }

    #[test]
    fn test_column_strategy_override_keeps_key() {
        let id = SqlTable::new("t")
            .column("id")
            .with_strategy(Arc::new(Positional));
        let mut ctx = RenderingContext::new(&NamedMap);
        assert_eq!(ctx.bind(Some(&id), 4).unwrap(), "?");
        assert_eq!(ctx.bindings().keys(), vec!["p1"]);
    }

    #[test]
    fn test_row_path_reused_for_equal_value() {
        let t = SqlTable::new("t");
        let a = t.column("a");
        let b = t.column("b");
        let mut ctx = RenderingContext::new(&NamedMap);
        assert_eq!(ctx.bind_row(&a, "row.id", Value::Int(1)).unwrap(), "#{row.id}");
        assert_eq!(ctx.bind_row(&b, "row.id", Value::Int(1)).unwrap(), "#{row.id}");
        assert_eq!(ctx.bindings().len(), 1);

        let err = ctx.bind_row(&b, "row.id", Value::Int(2)).unwrap_err();
        assert!(matches!(err, crate::SqlError::DuplicateParameterKey(key) if key == "row.id"));
    }

    #[test]
    fn test_alias_scopes() {
        let outer = SqlTable::new("outer_t");
        let inner = SqlTable::new("inner_t");
        let mut outer_aliases = TableAliases::new();
        outer_aliases.insert(&outer, "o").unwrap();

        let mut ctx = RenderingContext::new(&Positional);
        let outer_col = outer.column("id");
        let inner_col = inner.column("id");

        ctx.with_aliases(Arc::new(ExplicitAliases(outer_aliases)), |ctx| {
            assert_eq!(ctx.column_name(&outer_col), "o.id");
            assert_eq!(ctx.column_name(&inner_col), "id");
            ctx.with_aliases(Arc::new(GuaranteedAliases::default()), |ctx| {
                assert_eq!(ctx.column_name(&inner_col), "inner_t.id");
                assert_eq!(ctx.table_with_alias(&inner), "inner_t");
            });
            assert_eq!(ctx.table_with_alias(&outer), "outer_t o");
        });
        assert_eq!(ctx.column_name(&outer_col), "id");
    }

    #[test]
    fn test_truncate_on_char_boundary() {
        assert_eq!(truncate_sql_bytes("abcdef", 3), "abc");
        assert_eq!(truncate_sql_bytes("aé", 2), "a");
    }
}
