use super::*;
use crate::column::{
    BasicColumn, SortSpec, SqlColumn, case, case_when, count_all, max, rank, row_number, subquery,
    sum,
};
use crate::condition::*;
use crate::config::{StatementConfiguration, StatementHook};
use crate::criterion::{criterion, exists, group, not, on};
use crate::error::{Clause, SqlError};
use crate::render::{NamedMap, Positional, SequentialDollar};
use crate::table::SqlTable;
use crate::value::{SqlType, Value};

struct Animal {
    table: SqlTable,
    id: SqlColumn,
    name: SqlColumn,
}

fn animal() -> Animal {
    let table = SqlTable::new("AnimalData");
    Animal {
        id: table.column("id"),
        name: table.column("animal_name"),
        table,
    }
}

struct OrderTables {
    orders: SqlTable,
    lines: SqlTable,
    order_id: SqlColumn,
    line_order_id: SqlColumn,
    quantity: SqlColumn,
}

fn order_tables() -> OrderTables {
    let orders = SqlTable::new("OrderMaster");
    let lines = SqlTable::new("OrderLine");
    OrderTables {
        order_id: orders.column("order_id"),
        line_order_id: lines.column("order_id"),
        quantity: lines.column("quantity"),
        orders,
        lines,
    }
}

#[test]
fn test_named_map_render() {
    let a = animal();
    let stmt = select([&a.id, &a.name])
        .from(&a.table)
        .where_(&a.id, is_less_than(20))
        .build()
        .unwrap()
        .render(&NamedMap)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id, animal_name from AnimalData where id < #{parameters.p1}"
    );
    assert_eq!(stmt.parameters.keys(), vec!["p1"]);
    assert_eq!(stmt.parameters.get("p1"), Some(&Value::Int(20)));
}

#[test]
fn test_positional_render() {
    let a = animal();
    let stmt = select([&a.id, &a.name])
        .from(&a.table)
        .where_(&a.id, is_less_than(20))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(stmt.sql, "select id, animal_name from AnimalData where id < ?");
    assert_eq!(stmt.parameters.keys(), vec!["1"]);
}

#[test]
fn test_type_tag_in_named_placeholder() {
    let a = animal();
    let id = a.id.with_type(SqlType::Integer);
    let stmt = select([&id])
        .from(&a.table)
        .where_(&id, is_equal_to(5))
        .build()
        .unwrap()
        .render(&NamedMap)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id from AnimalData where id = #{parameters.p1,jdbcType=INTEGER}"
    );
}

#[test]
fn test_explicit_alias_qualifies_columns() {
    let a = animal();
    let stmt = select([&a.id, &a.name])
        .from_as(&a.table, "a")
        .where_(&a.id, is_less_than(20))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select a.id, a.animal_name from AnimalData a where a.id < ?"
    );
}

#[test]
fn test_column_alias_and_order_by_alias() {
    let a = animal();
    let aliased = a.id.as_alias("A_ID");
    let stmt = select([&aliased, &a.name])
        .from(&a.table)
        .order_by([aliased.descending()])
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id as A_ID, animal_name from AnimalData order by A_ID DESC"
    );
}

#[test]
fn test_join_with_aliases() {
    let o = order_tables();
    let stmt = select([&o.order_id, &o.quantity])
        .from_as(&o.orders, "om")
        .join_as(&o.lines, "ol", on(&o.line_order_id, equal_to(&o.order_id)))
        .where_(&o.order_id, is_equal_to(2))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select om.order_id, ol.quantity from OrderMaster om join OrderLine ol \
         on ol.order_id = om.order_id where om.order_id = ?"
    );
}

#[test]
fn test_join_without_aliases_qualifies_with_table_names() {
    let o = order_tables();
    let stmt = select([&o.order_id, &o.quantity])
        .from(&o.orders)
        .left_join(&o.lines, on(&o.line_order_id, equal_to(&o.order_id)))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select OrderMaster.order_id, OrderLine.quantity from OrderMaster left join OrderLine \
         on OrderLine.order_id = OrderMaster.order_id"
    );
}

#[test]
fn test_join_with_extra_criteria() {
    let o = order_tables();
    let stmt = select([&o.quantity])
        .from_as(&o.orders, "om")
        .full_join_as(
            &o.lines,
            "ol",
            on(&o.line_order_id, equal_to(&o.order_id)).and(&o.quantity, is_greater_than(1)),
        )
        .build()
        .unwrap()
        .render(&SequentialDollar)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select ol.quantity from OrderMaster om full join OrderLine ol \
         on ol.order_id = om.order_id and ol.quantity > $1"
    );
}

#[test]
fn test_join_select_uses_explicit_aliases_only() {
    let o = order_tables();
    let a = animal();
    let inner = select([&a.id]).from(&a.table).build().unwrap();
    let joined_id = SqlColumn::new("x.id");
    let stmt = select([&o.order_id])
        .from(&o.orders)
        .join_select(JoinType::Inner, inner, "x", on(&joined_id, equal_to(&o.order_id)))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select order_id from OrderMaster join (select id from AnimalData) x on x.id = order_id"
    );
}

#[test]
fn test_non_rendering_join_is_error() {
    let o = order_tables();
    let err = select([&o.order_id])
        .from(&o.orders)
        .join(&o.lines, on(&o.line_order_id, is_equal_to_when_present(None::<i32>)))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap_err();
    assert!(matches!(err, SqlError::NonRenderingClause(Clause::Join)));
}

#[test]
fn test_union_continues_dollar_sequence() {
    let a = animal();
    let stmt = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_less_than(22))
        .union([&a.id])
        .from(&a.table)
        .where_(&a.id, is_greater_than(40))
        .order_by([&a.id])
        .build()
        .unwrap()
        .render(&SequentialDollar)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id from AnimalData where id < $1 union select id from AnimalData \
         where id > $2 order by id"
    );
    assert_eq!(stmt.parameters.keys(), vec!["$1", "$2"]);
    assert_eq!(
        stmt.parameters.values(),
        vec![&Value::Int(22), &Value::Int(40)]
    );
}

#[test]
fn test_union_all() {
    let a = animal();
    let stmt = select([&a.id])
        .from(&a.table)
        .union_all([&a.id])
        .from(&a.table)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id from AnimalData union all select id from AnimalData"
    );
}

#[test]
fn test_subquery_in_where_shares_sequence() {
    let a = animal();
    let inner = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_equal_to(2))
        .build()
        .unwrap();
    let stmt = select([&a.name])
        .from(&a.table)
        .where_(&a.id, is_greater_than(1))
        .and(&a.id, is_in_select(inner))
        .build()
        .unwrap()
        .render(&SequentialDollar)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select animal_name from AnimalData where id > $1 \
         and id in (select id from AnimalData where id = $2)"
    );
}

#[test]
fn test_derived_table() {
    let a = animal();
    let inner = select([&a.id, &a.name])
        .from(&a.table)
        .where_(&a.id, is_less_than(10))
        .build()
        .unwrap();
    let outer_id = SqlColumn::new("id");
    let stmt = select([&outer_id])
        .from_select_as(inner, "x")
        .where_(&outer_id, is_greater_than(2))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id from (select id, animal_name from AnimalData where id < ?) x where id > ?"
    );
    assert_eq!(stmt.parameters.values(), vec![&Value::Int(10), &Value::Int(2)]);
}

#[test]
fn test_scalar_subquery_in_select_list() {
    let a = animal();
    let top = select([max(&a.id)]).from(&a.table).build().unwrap();
    let stmt = select([BasicColumn::from(&a.name), subquery(top).as_alias("top_id")])
        .from(&a.table)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select animal_name, (select max(id) from AnimalData) as top_id from AnimalData"
    );
}

#[test]
fn test_exists() {
    let a = animal();
    let inner = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_equal_to(3))
        .build()
        .unwrap();
    let stmt = select([&a.name])
        .from(&a.table)
        .where_criterion(exists(inner))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select animal_name from AnimalData where exists (select id from AnimalData where id = ?)"
    );
}

#[test]
fn test_non_rendering_where() {
    let a = animal();
    let model = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_equal_to_when_present(None::<i32>))
        .build()
        .unwrap();
    let err = model.render(&Positional).unwrap_err();
    assert!(matches!(err, SqlError::NonRenderingClause(Clause::Where)));

    let allowed = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_equal_to_when_present(None::<i32>))
        .allow_non_rendering_where(true)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(allowed.sql, "select id from AnimalData");
    assert!(allowed.parameters.is_empty());
}

#[test]
fn test_dropped_first_condition_loses_connector() {
    let a = animal();
    let stmt = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_equal_to_when_present(None::<i32>))
        .or(&a.name, is_equal_to("Fred"))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(stmt.sql, "select id from AnimalData where animal_name = ?");
}

#[test]
fn test_not_group_in_where() {
    let a = animal();
    let stmt = select([&a.id])
        .from(&a.table)
        .where_criterion(not(&a.id, is_between(10, 60)).or(&a.name, is_equal_to("X")))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id from AnimalData where not (id between ? and ? or animal_name = ?)"
    );
    assert_eq!(stmt.parameters.len(), 3);
}

#[test]
fn test_distinct_group_by_having() {
    let a = animal();
    let stmt = select([BasicColumn::from(&a.name), count_all().as_alias("total")])
        .from(&a.table)
        .group_by([&a.name])
        .having(count_all(), is_greater_than(1))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select animal_name, count(*) as total from AnimalData group by animal_name having count(*) > ?"
    );

    let stmt = select_distinct([&a.name])
        .from(&a.table)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(stmt.sql, "select distinct animal_name from AnimalData");
}

#[test]
fn test_simple_case_binds_every_value() {
    let a = animal();
    let size = case(&a.name)
        .when("Mole", "small")
        .when("Cow", "large")
        .else_("other")
        .end()
        .as_alias("size");
    let stmt = select([BasicColumn::from(&a.id), size])
        .from(&a.table)
        .where_(&a.id, is_less_than(10))
        .build()
        .unwrap()
        .render(&SequentialDollar)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id, case animal_name when $1 then $2 when $3 then $4 else $5 end as size \
         from AnimalData where id < $6"
    );
    assert_eq!(
        stmt.parameters.values(),
        vec![
            &Value::from("Mole"),
            &Value::from("small"),
            &Value::from("Cow"),
            &Value::from("large"),
            &Value::from("other"),
            &Value::Int(10),
        ]
    );
}

#[test]
fn test_searched_case() {
    let a = animal();
    let band = case_when()
        .when(&a.id, is_less_than(5), "low")
        .when_criteria(
            group(&a.id, is_between(5, 9)).or(&a.name, is_equal_to("Cow")),
            "mid",
        )
        .else_("high")
        .end()
        .as_alias("band");
    let stmt = select([BasicColumn::from(&a.id), band])
        .from(&a.table)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id, case when id < ? then ? when id between ? and ? or animal_name = ? then ? \
         else ? end as band from AnimalData"
    );
    assert_eq!(stmt.parameters.len(), 7);
}

#[test]
fn test_case_errors() {
    let a = animal();
    let dropped = case_when()
        .when(&a.id, is_less_than_when_present(None::<i32>), "low")
        .end();
    let err = select([dropped])
        .from(&a.table)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap_err();
    assert!(matches!(err, SqlError::NonRenderingClause(Clause::Case)));

    let err = select([case(&a.name).end()])
        .from(&a.table)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap_err();
    assert!(matches!(err, SqlError::EmptyCaseExpression));
    assert_eq!(err.code(), "empty_case_expression");
}

#[test]
fn test_window_items() {
    let o = order_tables();
    let stmt = select([
        BasicColumn::from(&o.line_order_id),
        row_number()
            .partition_by([&o.line_order_id])
            .order_by([&o.quantity.descending()])
            .end()
            .as_alias("rn"),
        sum(&o.quantity)
            .over()
            .partition_by([&o.line_order_id])
            .end()
            .as_alias("order_total"),
        rank().end(),
    ])
    .from(&o.lines)
    .build()
    .unwrap()
    .render(&Positional)
    .unwrap();
    assert_eq!(
        stmt.sql,
        "select order_id, row_number() over (partition by order_id order by quantity DESC) as rn, \
         sum(quantity) over (partition by order_id) as order_total, rank() over () from OrderLine"
    );
    assert!(stmt.parameters.is_empty());
}

#[test]
fn test_window_columns_follow_join_aliases() {
    let o = order_tables();
    let stmt = select([
        BasicColumn::from(&o.order_id),
        row_number()
            .partition_by([&o.order_id])
            .order_by([&o.quantity])
            .end()
            .as_alias("line_no"),
    ])
    .from_as(&o.orders, "om")
    .join_as(&o.lines, "ol", on(&o.line_order_id, is_equal_to_column(&o.order_id)))
    .build()
    .unwrap()
    .render(&Positional)
    .unwrap();
    assert_eq!(
        stmt.sql,
        "select om.order_id, row_number() over (partition by om.order_id order by ol.quantity) \
         as line_no from OrderMaster om join OrderLine ol on ol.order_id = om.order_id"
    );
}

#[test]
fn test_non_rendering_having_honours_flag() {
    let a = animal();
    let model = select([&a.name])
        .from(&a.table)
        .group_by([&a.name])
        .having(count_all(), is_greater_than_when_present(None::<i64>))
        .build()
        .unwrap();
    let err = model.render(&Positional).unwrap_err();
    assert!(matches!(err, SqlError::NonRenderingClause(Clause::Having)));
}

#[test]
fn test_limit_offset_are_bound() {
    let a = animal();
    let stmt = select([&a.id])
        .from(&a.table)
        .order_by([&a.id])
        .limit(3)
        .offset(2)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(stmt.sql, "select id from AnimalData order by id limit ? offset ?");
    assert_eq!(stmt.parameters.values(), vec![&Value::Int(3), &Value::Int(2)]);
}

#[test]
fn test_fetch_first() {
    let a = animal();
    let stmt = select([&a.id])
        .from(&a.table)
        .offset(2)
        .fetch_first(3)
        .build()
        .unwrap()
        .render(&SequentialDollar)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select id from AnimalData offset $1 rows fetch first $2 rows only"
    );
    assert_eq!(stmt.parameters.values(), vec![&Value::Int(2), &Value::Int(3)]);
}

#[test]
fn test_count_helpers() {
    let a = animal();
    let stmt = count_from(&a.table)
        .where_(&a.id, is_greater_than(3))
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(stmt.sql, "select count(*) from AnimalData where id > ?");

    let stmt = count_distinct_column(&a.name)
        .from(&a.table)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(stmt.sql, "select count(distinct animal_name) from AnimalData");
}

#[test]
fn test_hooks() {
    let a = animal();
    let config = StatementConfiguration::new()
        .with_before_statement(StatementHook::new("/* before */"))
        .with_after_keyword(StatementHook::new("/*+ hint */"))
        .with_after_statement(StatementHook::new("for update"));
    let stmt = select([&a.id])
        .from(&a.table)
        .with_configuration(config)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "/* before */ select /*+ hint */ id from AnimalData for update"
    );
}

#[test]
fn test_render_is_repeatable() {
    let a = animal();
    let model = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_in([1, 2, 3]))
        .build()
        .unwrap();
    let first = model.render(&NamedMap).unwrap();
    let second = model.render(&NamedMap).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_build_errors() {
    let a = animal();
    let err = select(Vec::<SqlColumn>::new()).from(&a.table).build().unwrap_err();
    assert!(matches!(err, SqlError::EmptySelectList));

    let err = select([&a.id]).build().unwrap_err();
    assert!(matches!(err, SqlError::MissingTable("select")));

    let err = select([&a.id]).from(&a.table).from(&a.table).build().unwrap_err();
    assert!(matches!(err, SqlError::TableAlreadySet));

    let err = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_equal_to(1))
        .where_(&a.id, is_equal_to(2))
        .build()
        .unwrap_err();
    assert!(matches!(err, SqlError::CriterionAlreadySet(Clause::Where)));

    let err = select([&a.id])
        .from(&a.table)
        .group_by(Vec::<SqlColumn>::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, SqlError::EmptyGroupBy));

    let err = select([&a.id])
        .from(&a.table)
        .order_by(Vec::<SortSpec>::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, SqlError::EmptyOrderBy));
}

#[test]
fn test_union_branch_without_columns_fails_build() {
    let a = animal();
    let err = select([&a.id])
        .from(&a.table)
        .union(Vec::<SqlColumn>::new())
        .from(&a.table)
        .build()
        .unwrap_err();
    assert!(matches!(err, SqlError::EmptySelectList));
}

#[test]
fn test_conflicting_table_alias() {
    let a = animal();
    let err = select([&a.id])
        .from_as(&a.table, "a")
        .join_as(&a.table, "b", on(&a.id, equal_to(&a.id)))
        .build()
        .unwrap_err();
    assert_eq!(err.code(), "duplicate_table_alias");
}

#[test]
fn test_empty_join_criteria() {
    let o = order_tables();
    let err = select([&o.order_id])
        .from(&o.orders)
        .join_on_all(JoinType::Inner, &o.lines, None, Vec::new())
        .build()
        .unwrap_err();
    assert!(matches!(err, SqlError::EmptyJoinCriteria(ref t) if t == "OrderLine"));

    let stmt = select([&o.order_id])
        .from_as(&o.orders, "om")
        .join_on_all(
            JoinType::Right,
            &o.lines,
            Some("ol"),
            [
                criterion(&o.line_order_id, equal_to(&o.order_id)),
                criterion(&o.quantity, is_not_null()),
            ],
        )
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(
        stmt.sql,
        "select om.order_id from OrderMaster om right join OrderLine ol \
         on ol.order_id = om.order_id and ol.quantity is not null"
    );
}

#[test]
fn test_binding_count_matches_placeholders() {
    let a = animal();
    let stmt = select([&a.id])
        .from(&a.table)
        .where_(&a.id, is_in([1, 2, 3]))
        .and(&a.name, is_like("F%"))
        .or(&a.id, is_between(5, 9))
        .limit(10)
        .build()
        .unwrap()
        .render(&Positional)
        .unwrap();
    assert_eq!(stmt.sql.matches('?').count(), stmt.parameters.len());
    assert_eq!(stmt.parameters.len(), 7);
}
