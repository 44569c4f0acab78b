//! Error types for dynsql

use thiserror::Error;

/// Result type alias for dynsql operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Criterion-bearing clauses of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Where,
    Having,
    Join,
    Case,
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Clause::Where => "where",
            Clause::Having => "having",
            Clause::Join => "join",
            Clause::Case => "case when",
        })
    }
}

/// Error types for building and rendering statements
#[derive(Debug, Error)]
pub enum SqlError {
    /// A statement needs a table and none was given
    #[error("Missing table: {0}")]
    MissingTable(&'static str),

    /// `from()` called twice on one query expression
    #[error("Table already set: from() may only be called once per query expression")]
    TableAlreadySet,

    /// A select or subquery has no columns
    #[error("Empty select list: a select statement must project at least one column")]
    EmptySelectList,

    /// An insert/update was built without any column mappings
    #[error("Empty column mappings: {0}")]
    EmptyColumnMappings(&'static str),

    /// Every mapping of an insert/update suppressed itself
    #[error("No rendering mappings: all optional column mappings were dropped from the {0}")]
    NoRenderingMappings(&'static str),

    /// Batch or multi-row insert without records
    #[error("Empty records: {0} requires at least one record")]
    EmptyRecords(&'static str),

    /// The same table was given two different aliases
    #[error("Duplicate table alias: table '{table}' is already aliased as '{existing}', cannot alias it as '{requested}'")]
    DuplicateTableAlias {
        table: String,
        existing: String,
        requested: String,
    },

    /// A join was declared without any `on` criteria
    #[error("Empty join criteria: join to '{0}' requires at least one criterion")]
    EmptyJoinCriteria(String),

    /// `group_by` called with no columns
    #[error("Empty group by: group by requires at least one column")]
    EmptyGroupBy,

    /// `order_by` called with no columns
    #[error("Empty order by: order by requires at least one column")]
    EmptyOrderBy,

    /// An `in`-style condition was constructed with zero values
    #[error("Empty in list: {0} condition was constructed with no values")]
    EmptyInList(&'static str),

    /// A case expression without any `when`
    #[error("Empty case expression: case requires at least one when clause")]
    EmptyCaseExpression,

    /// `where_()` / `having()` called twice on one statement
    #[error("{0} clause already started: use and()/or() to add further criteria")]
    CriterionAlreadySet(Clause),

    /// A WHERE/HAVING tree rendered nothing and the statement does not allow that
    #[error("Non-rendering {0} clause: all conditions were dropped and non-rendering clauses are not allowed")]
    NonRenderingClause(Clause),

    /// Row-bound mapping under a strategy that cannot express it
    #[error("Unsupported row binding: the {0} placeholder strategy cannot bind record properties")]
    UnsupportedRowBinding(&'static str),

    /// Two bindings with the same key in one rendered statement
    #[error("Duplicate parameter key: '{0}'")]
    DuplicateParameterKey(String),

    /// A row-bound property could not be resolved on a record
    #[error("Unknown property '{0}' on record")]
    UnknownProperty(String),

    /// Settings could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SqlError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a duplicate table alias error
    pub fn duplicate_alias(
        table: impl Into<String>,
        existing: impl Into<String>,
        requested: impl Into<String>,
    ) -> Self {
        Self::DuplicateTableAlias {
            table: table.into(),
            existing: existing.into(),
            requested: requested.into(),
        }
    }

    /// Stable, machine-checkable identifier for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTable(_) => "missing_table",
            Self::TableAlreadySet => "table_already_set",
            Self::EmptySelectList => "empty_select_list",
            Self::EmptyColumnMappings(_) => "empty_column_mappings",
            Self::NoRenderingMappings(_) => "no_rendering_mappings",
            Self::EmptyRecords(_) => "empty_records",
            Self::DuplicateTableAlias { .. } => "duplicate_table_alias",
            Self::EmptyJoinCriteria(_) => "empty_join_criteria",
            Self::EmptyGroupBy => "empty_group_by",
            Self::EmptyOrderBy => "empty_order_by",
            Self::EmptyInList(_) => "empty_in_list",
            Self::CriterionAlreadySet(_) => "criterion_already_set",
            Self::NonRenderingClause(Clause::Where) => "non_rendering_where_clause",
            Self::NonRenderingClause(Clause::Having) => "non_rendering_having_clause",
            Self::NonRenderingClause(Clause::Join) => "non_rendering_join_clause",
            Self::NonRenderingClause(Clause::Case) => "non_rendering_case_clause",
            Self::EmptyCaseExpression => "empty_case_expression",
            Self::UnsupportedRowBinding(_) => "unsupported_row_binding",
            Self::DuplicateParameterKey(_) => "duplicate_parameter_key",
            Self::UnknownProperty(_) => "unknown_property",
            Self::Config(_) => "config",
        }
    }

    /// Check if this is a build-time validation error
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::NonRenderingClause(_) | Self::EmptyInList(_) | Self::Config(_)
        )
    }

    /// Check if this is a non-rendering clause error
    pub fn is_non_rendering(&self) -> bool {
        matches!(self, Self::NonRenderingClause(_))
    }

    /// Check if this is an unsupported row binding error
    pub fn is_unsupported_row_binding(&self) -> bool {
        matches!(self, Self::UnsupportedRowBinding(_))
    }
}

impl From<toml::de::Error> for SqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
