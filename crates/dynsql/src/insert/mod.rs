//! INSERT statements.
//!
//! | builder                    | renders                                                  |
//! |----------------------------|----------------------------------------------------------|
//! | [`insert`]                 | `insert into t (id, name) values (#{row.id}, #{row.name})` |
//! | [`insert_batch`]           | same text once, one binding set per record               |
//! | [`insert_multiple`]        | `values (#{records[0].id}, ...), (#{records[1].id}, ...)` |
//! | [`insert_into`]            | `insert into t (id) values (#{parameters.p1})`           |
//! | [`insert_select`]          | `insert into t (id) select ...`                          |
//!
//! Record-based inserts bind properties by path, which only map-based
//! strategies can express; positional and dollar strategies report
//! [`SqlError::UnsupportedRowBinding`](crate::SqlError::UnsupportedRowBinding).

mod general;
mod record;

pub use general::{
    GeneralInsertBuilder, GeneralInsertModel, InsertSelectBuilder, InsertSelectModel, insert_into,
    insert_select,
};
pub use record::{
    BatchInsertBuilder, BatchInsertModel, BatchInsertStatement, InsertBuilder, InsertModel,
    MultiRowInsertBuilder, MultiRowInsertModel, insert, insert_batch, insert_multiple,
};

use crate::config::StatementConfiguration;
use crate::error::SqlResult;
use crate::mapping::FieldAndValue;
use crate::render::{RenderingContext, join_fragments};
use crate::table::SqlTable;

/// `(a, b)`
fn column_list(fields: &[FieldAndValue]) -> String {
    let names: Vec<&str> = fields.iter().map(|fv| fv.field.as_str()).collect();
    format!("({})", names.join(", "))
}

/// `(x, y)`
fn value_list(fields: &[FieldAndValue]) -> String {
    let values: Vec<&str> = fields.iter().map(|fv| fv.value.as_str()).collect();
    format!("({})", values.join(", "))
}

/// Wrap an insert body with the statement hooks.
///
/// `body` renders the mapping part and runs between the after-keyword and
/// after-statement hooks so bindings stay in text order.
fn render_insert(
    table: &SqlTable,
    config: &StatementConfiguration,
    ctx: &mut RenderingContext<'_>,
    body: impl FnOnce(&mut RenderingContext<'_>) -> SqlResult<String>,
) -> SqlResult<String> {
    let before = config.render_before_statement(ctx)?;
    let after_keyword = config.render_after_keyword(ctx)?;
    let body = body(ctx)?;
    let after = config.render_after_statement(ctx)?;
    Ok(join_fragments([
        before.as_str(),
        "insert into",
        after_keyword.as_str(),
        table.name(),
        body.as_str(),
        after.as_str(),
    ]))
}
