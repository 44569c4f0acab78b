//! Statement configuration and render settings.
//!
//! [`StatementConfiguration`] travels with one statement model.
//! [`RenderSettings`] are caller-loaded defaults (for example from a TOML file)
//! that hand out a strategy and a configured statement configuration; nothing
//! here is process-global.

use crate::error::{SqlError, SqlResult};
use crate::render::{
    ColonNamed, NamedMap, ParameterBinding, PlaceholderStrategy, Positional, RenderingContext,
    SequentialDollar,
};
use crate::value::Value;
use serde::Deserialize;
use std::path::Path;

/// A literal SQL fragment spliced into a statement, with optional caller-keyed bindings.
///
/// ```ignore
/// let hook = StatementHook::new("/* some comment */").with_parameter("name", "fred");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementHook {
    fragment: String,
    parameters: Vec<ParameterBinding>,
}

impl StatementHook {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            fragment: fragment.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push(ParameterBinding::new(key, value));
        self
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    fn render(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        for binding in &self.parameters {
            ctx.push_binding(binding.clone())?;
        }
        Ok(self.fragment.clone())
    }
}

/// Per-statement options.
///
/// By default a WHERE/HAVING clause whose conditions all drop out is an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementConfiguration {
    /// Omit a WHERE/HAVING clause that rendered nothing instead of failing.
    pub non_rendering_where_allowed: bool,
    /// Fragment before the statement keyword.
    pub before_statement: Option<StatementHook>,
    /// Fragment right after the statement keyword (`delete from <here> t`).
    pub after_keyword: Option<StatementHook>,
    /// Fragment after the whole statement.
    pub after_statement: Option<StatementHook>,
}

impl StatementConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_non_rendering_where(mut self, allowed: bool) -> Self {
        self.non_rendering_where_allowed = allowed;
        self
    }

    pub fn with_before_statement(mut self, hook: StatementHook) -> Self {
        self.before_statement = Some(hook);
        self
    }

    pub fn with_after_keyword(mut self, hook: StatementHook) -> Self {
        self.after_keyword = Some(hook);
        self
    }

    pub fn with_after_statement(mut self, hook: StatementHook) -> Self {
        self.after_statement = Some(hook);
        self
    }

    pub(crate) fn render_before_statement(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        render_hook(self.before_statement.as_ref(), ctx)
    }

    pub(crate) fn render_after_keyword(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        render_hook(self.after_keyword.as_ref(), ctx)
    }

    pub(crate) fn render_after_statement(&self, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
        render_hook(self.after_statement.as_ref(), ctx)
    }
}

fn render_hook(hook: Option<&StatementHook>, ctx: &mut RenderingContext<'_>) -> SqlResult<String> {
    match hook {
        Some(hook) => hook.render(ctx),
        None => Ok(String::new()),
    }
}

/// Placeholder convention selectable from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    #[default]
    Named,
    ColonNamed,
    Positional,
    Dollar,
}

impl PlaceholderStyle {
    pub fn strategy(self) -> &'static dyn PlaceholderStrategy {
        match self {
            PlaceholderStyle::Named => &NamedMap,
            PlaceholderStyle::ColonNamed => &ColonNamed,
            PlaceholderStyle::Positional => &Positional,
            PlaceholderStyle::Dollar => &SequentialDollar,
        }
    }
}

/// Caller-owned render defaults.
///
/// ```toml
/// placeholder = "dollar"
/// parameter_name = "record"
/// non_rendering_where_allowed = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RenderSettings {
    #[serde(default)]
    pub placeholder: PlaceholderStyle,
    #[serde(default)]
    pub parameter_name: Option<String>,
    #[serde(default)]
    pub non_rendering_where_allowed: bool,
}

impl RenderSettings {
    pub fn from_toml_str(raw: &str) -> SqlResult<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SqlError::config(format!("failed to read settings file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn strategy(&self) -> &'static dyn PlaceholderStrategy {
        self.placeholder.strategy()
    }

    /// A fresh context for one render under these settings.
    pub fn context(&self) -> RenderingContext<'static> {
        let ctx = RenderingContext::new(self.strategy());
        match &self.parameter_name {
            Some(name) => ctx.with_parameter_name(name.clone()),
            None => ctx,
        }
    }

    /// Statement configuration seeded from these settings.
    pub fn statement_configuration(&self) -> StatementConfiguration {
        StatementConfiguration::new().allow_non_rendering_where(self.non_rendering_where_allowed)
    }
}
