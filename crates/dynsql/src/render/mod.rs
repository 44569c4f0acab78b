//! Rendering pipeline shared by every statement kind.
//!
//! A render walks an immutable statement model with a [`RenderingContext`],
//! which owns the parameter sequence and the bindings collected so far. The
//! [`PlaceholderStrategy`] decides how each bound value is written:
//!
//! ```ignore
//! use dynsql::render::{NamedMap, Positional};
//!
//! let stmt = model.render(&NamedMap)?;   // where id < #{parameters.p1}
//! let stmt = model.render(&Positional)?; // where id < ?
//! ```

mod bindings;
mod context;
mod strategy;

pub use bindings::{ParameterBinding, ParameterBindings};
pub use context::{
    ExplicitAliases, GuaranteedAliases, RenderingContext, TableAliasCalculator,
};
pub use strategy::{ColonNamed, NamedMap, PlaceholderStrategy, Positional, SequentialDollar};

pub(crate) use context::{trace_build_error, trace_rendered};

/// Rendered SQL text plus its bindings in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub parameters: ParameterBindings,
}

impl SqlStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn parameters(&self) -> &ParameterBindings {
        &self.parameters
    }
}

/// Join non-empty fragments with single spaces.
pub(crate) fn join_fragments<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for part in parts {
        let part = part.as_ref();
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_fragments_skips_empty() {
        assert_eq!(join_fragments(["select a", "", "from t"]), "select a from t");
        assert_eq!(join_fragments(Vec::<String>::new()), "");
    }
}
