use super::*;
use crate::error::SqlError;
use crate::render::{NamedMap, ParameterBindings, Positional};
use crate::table::SqlTable;

fn render_with(
    column: &SqlColumn,
    condition: impl IntoCondition,
) -> (Option<String>, ParameterBindings) {
    let mut ctx = RenderingContext::new(&Positional);
    let rendered = condition
        .into_condition()
        .render(&BasicColumn::from(column), &mut ctx)
        .unwrap();
    (rendered, ctx.into_bindings())
}

#[test]
fn test_single_value() {
    let id = SqlTable::new("t").column("id");
    let (sql, bindings) = render_with(&id, is_less_than(20));
    assert_eq!(sql.as_deref(), Some("id < ?"));
    assert_eq!(bindings.values(), vec![&Value::Int(20)]);
}

#[test]
fn test_no_value() {
    let id = SqlTable::new("t").column("id");
    let (sql, bindings) = render_with(&id, is_not_null());
    assert_eq!(sql.as_deref(), Some("id is not null"));
    assert!(bindings.is_empty());
}

#[test]
fn test_between_binds_two_values() {
    let id = SqlTable::new("t").column("id");
    let (sql, bindings) = render_with(&id, is_not_between(1, 5));
    assert_eq!(sql.as_deref(), Some("id not between ? and ?"));
    assert_eq!(bindings.keys(), vec!["1", "2"]);
}

#[test]
fn test_in_list_has_no_spaces() {
    let id = SqlTable::new("t").column("id");
    let (sql, bindings) = render_with(&id, is_in([1, 2, 3]));
    assert_eq!(sql.as_deref(), Some("id in (?,?,?)"));
    assert_eq!(bindings.len(), 3);
}

#[test]
fn test_when_present_drops_none() {
    let id = SqlTable::new("t").column("id");
    let (sql, bindings) = render_with(&id, is_equal_to_when_present(None::<i32>));
    assert_eq!(sql, None);
    assert!(bindings.is_empty());

    let (sql, _) = render_with(&id, is_equal_to_when_present(Some(4)));
    assert_eq!(sql.as_deref(), Some("id = ?"));
}

#[test]
fn test_between_when_present_needs_both() {
    let cond = is_between_when_present(Some(1), None);
    assert!(cond.is_empty());
    let cond = is_between_when_present(Some(1), Some(3));
    assert_eq!(cond.operator(), Some("between"));
}

#[test]
fn test_map_transforms_values() {
    match is_equal_to(3).map(|v| v * 2) {
        Condition::Single { value, .. } => assert_eq!(value, 6),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_map_present_single_none_is_empty() {
    let cond = is_equal_to(Some(3)).map_present(|_: Option<i32>| None::<i32>);
    assert!(cond.is_empty());
}

#[test]
fn test_map_present_list_drops_absent() {
    match is_in([Some(1), None, Some(3)]).map_present(|v| v) {
        Condition::List { values, .. } => assert_eq!(values, vec![1, 3]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(is_in([None::<i32>, None]).map_present(|v| v).is_empty());
}

#[test]
fn test_in_when_present() {
    let id = SqlTable::new("t").column("id");
    let (sql, bindings) = render_with(&id, is_in_when_present([Some(1), None, Some(3)]));
    assert_eq!(sql.as_deref(), Some("id in (?,?)"));
    assert_eq!(bindings.values(), vec![&Value::Int(1), &Value::Int(3)]);

    let (sql, _) = render_with(&id, is_in_when_present([None::<i32>]));
    assert_eq!(sql, None);
}

#[test]
fn test_filter() {
    match is_in([10, 22]).filter(|v| *v != 22) {
        Condition::List { values, .. } => assert_eq!(values, vec![10]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(is_in([22]).filter(|v| *v != 22).is_empty());
    assert!(is_equal_to(5).filter(|v| *v > 10).is_empty());
    assert!(!is_equal_to(15).filter(|v| *v > 10).is_empty());
    assert!(is_between(1, 20).filter(|v| *v < 10).is_empty());
}

#[test]
fn test_filter_pair() {
    assert!(!is_between(1, 5).filter_pair(|a, b| a < b).is_empty());
    assert!(is_between(5, 1).filter_pair(|a, b| a < b).is_empty());
}

#[test]
fn test_when() {
    assert!(is_equal_to(1).when(false).is_empty());
    assert!(!is_equal_to(1).when(true).is_empty());
}

#[test]
fn test_empty_in_list_is_error_not_silent() {
    let explicit = is_in(Vec::<i32>::new());
    assert!(matches!(
        explicit.should_render(),
        Err(SqlError::EmptyInList("in"))
    ));

    // filtering an explicitly empty list keeps the error
    let filtered = is_not_in(Vec::<i32>::new()).filter(|_| true);
    assert!(matches!(
        filtered.should_render(),
        Err(SqlError::EmptyInList("not in"))
    ));

    // filtering values away is silent
    let dropped = is_in([1, 2]).filter(|_| false);
    assert!(!dropped.should_render().unwrap());
}

#[test]
fn test_empty_in_list_fails_render() {
    let id = SqlTable::new("t").column("id");
    let mut ctx = RenderingContext::new(&Positional);
    let err = is_in(Vec::<i32>::new())
        .into_condition()
        .render(&BasicColumn::from(&id), &mut ctx)
        .unwrap_err();
    assert_eq!(err.code(), "empty_in_list");
}

#[test]
fn test_case_insensitive() {
    let name = SqlTable::new("t").column("name");
    let (sql, bindings) = render_with(&name, is_like_case_insensitive("fr%"));
    assert_eq!(sql.as_deref(), Some("upper(name) like ?"));
    assert_eq!(bindings.values(), vec![&Value::from("FR%")]);

    let (sql, bindings) = render_with(&name, is_in_case_insensitive(["a", "b"]));
    assert_eq!(sql.as_deref(), Some("upper(name) in (?,?)"));
    assert_eq!(bindings.values(), vec![&Value::from("A"), &Value::from("B")]);
}

#[test]
fn test_column_comparison_binds_nothing() {
    let t = SqlTable::new("t");
    let (sql, bindings) = render_with(&t.column("id"), equal_to(&t.column("owner_id")));
    assert_eq!(sql.as_deref(), Some("id = owner_id"));
    assert!(bindings.is_empty());
}

#[test]
fn test_typed_column_under_named_map() {
    let id = SqlTable::new("t")
        .column("id")
        .with_type(crate::value::SqlType::Integer);
    let mut ctx = RenderingContext::new(&NamedMap);
    let sql = is_greater_than(2)
        .into_condition()
        .render(&BasicColumn::from(&id), &mut ctx)
        .unwrap();
    assert_eq!(
        sql.as_deref(),
        Some("id > #{parameters.p1,jdbcType=INTEGER}")
    );
}
