use super::*;
use crate::Template;
use crate::compiled::PlaceholderStyle;
use crate::operator::ComparisonOperator;
use crate::param::Param;

fn pg() -> Template {
    Template::postgres()
}

fn sql(f: &impl Fragment, t: &Template) -> String {
    f.compile(t).render(t.placeholder_style())
}

fn cond(column: &str) -> Condition {
    ColumnValue::placeholder(Column::new(column)).into()
}

#[test]
fn column_quoting_and_alias() {
    let t = pg();
    assert_eq!(sql(&Column::new("id"), &t), r#""id""#);
    assert_eq!(sql(&Column::new("u.name"), &t), r#""u"."name""#);
    assert_eq!(sql(&Column::new("u.*"), &t), r#""u".*"#);
    assert_eq!(sql(&Column::new("name AS n"), &t), r#""name" AS "n""#);
    assert_eq!(sql(&Column::new("name as n"), &t), r#""name" AS "n""#);
    assert_eq!(sql(&Column::new("name n"), &t), r#""name" AS "n""#);
    assert_eq!(sql(&Column::raw(Raw::new("COUNT(*)")), &t), "COUNT(*)");
}

#[test]
fn table_list_and_alias() {
    let t = pg();
    assert_eq!(sql(&Table::new("users"), &t), r#""users""#);
    assert_eq!(
        sql(&Table::new("public.users u, posts AS p"), &t),
        r#""public"."users" AS "u", "posts" AS "p""#
    );
    assert_eq!(sql(&Table::new("users"), &Template::mysql()), "`users`");
}

#[test]
fn values_and_groups() {
    let t = pg();
    let row = ValueGroup::new(Values::placeholders(2).with(Value::literal("x")));
    assert_eq!(sql(&row, &t), "($1, $2, 'x')");

    let rows = ValueGroups::new(vec![
        ValueGroup::new(Values::placeholders(2)),
        ValueGroup::new(Values::placeholders(2)),
    ]);
    assert_eq!(sql(&rows, &t), "($1, $2), ($3, $4)");
}

#[test]
fn literal_question_mark_is_not_a_placeholder() {
    let t = pg();
    let cv = ColumnValue::new("q", Operator::Default, Value::literal("why?"));
    let compiled = cv.compile(&t);
    assert_eq!(compiled.param_count(), 0);
    assert_eq!(compiled.render(PlaceholderStyle::Dollar), r#""q" = 'why?'"#);
}

#[test]
fn column_value_operators() {
    let t = pg();
    let cv = ColumnValue::new("age", Operator::Cmp(ComparisonOperator::Gte), Value::placeholder());
    assert_eq!(sql(&cv, &t), r#""age" >= $1"#);

    let cv = ColumnValue::new("tags", Operator::parse("@>"), Value::placeholder());
    assert_eq!(sql(&cv, &t), r#""tags" @> $1"#);

    let cv = ColumnValue::new("name", Operator::Cmp(ComparisonOperator::ILike), Value::placeholder());
    assert_eq!(sql(&cv, &t), r#""name" ILIKE $1"#);
    assert_eq!(sql(&cv, &Template::mysql()), "`name` LIKE ?");
}

#[test]
fn where_groups_conditions() {
    let t = pg();
    let w = Where::new(vec![cond("id")]);
    assert_eq!(sql(&w, &t), r#"WHERE ("id" = $1)"#);

    let w = Where::new(vec![cond("a"), Or::new(vec![cond("b"), cond("c")]).into()]);
    assert_eq!(sql(&w, &t), r#"WHERE ("a" = $1 AND ("b" = $2 OR "c" = $3))"#);
}

#[test]
fn single_group_child_is_not_wrapped_twice() {
    let t = pg();
    let w = Where::new(vec![And::new(vec![cond("a"), cond("b")]).into()]);
    assert_eq!(sql(&w, &t), r#"WHERE ("a" = $1 AND "b" = $2)"#);

    let nested = And::new(vec![Or::new(vec![cond("a"), cond("b")]).into()]);
    assert_eq!(sql(&nested, &t), r#"("a" = $1 OR "b" = $2)"#);
}

#[test]
fn raw_conditions_are_grouped_among_siblings() {
    let t = pg();
    let w = Where::new(vec![cond("a"), Raw::new("b = ? OR c = ?").into()]);
    assert_eq!(sql(&w, &t), r#"WHERE ("a" = $1 AND (b = $2 OR c = $3))"#);

    let w = Where::new(vec![Raw::new("b = ? OR c = ?").into()]);
    assert_eq!(sql(&w, &t), "WHERE (b = $1 OR c = $2)");
}

#[test]
fn empty_groups_vanish() {
    let t = pg();
    assert_eq!(sql(&Where::default(), &t), "");
    let w = Where::new(vec![And::default().into(), Or::new(vec![And::default().into()]).into()]);
    assert_eq!(sql(&w, &t), "");

    let w = Where::new(vec![And::default().into(), cond("id")]);
    assert_eq!(sql(&w, &t), r#"WHERE ("id" = $1)"#);
}

#[test]
fn joins() {
    let t = pg();
    let on = On::new(vec![
        Raw::new(r#""u"."id" = "p"."user_id""#).into(),
    ]);
    let joins = Joins::default()
        .with(Join::on(JoinKind::Left, Table::new("posts p"), on))
        .with(Join::using(
            JoinKind::Inner,
            Table::new("roles"),
            Using::new(Columns::parse("role_id")),
        ))
        .with(Join::new(JoinKind::Default, Table::new("teams"), JoinConstraint::None))
        .with(Join::new(JoinKind::Cross, Table::new("days"), JoinConstraint::None));

    assert_eq!(
        sql(&joins, &t),
        concat!(
            r#"LEFT JOIN "posts" AS "p" ON ("u"."id" = "p"."user_id") "#,
            r#"INNER JOIN "roles" USING ("role_id") "#,
            r#"NATURAL JOIN "teams" "#,
            r#"CROSS JOIN "days""#
        )
    );
}

#[test]
fn sort_columns() {
    let t = pg();
    let order = OrderBy::new(SortColumns::parse("-created_at, name ASC, id"));
    assert_eq!(sql(&order, &t), r#"ORDER BY "created_at" DESC, "name" ASC, "id""#);
    assert_eq!(sql(&OrderBy::new(SortColumns::default()), &t), "");
    assert_eq!(SortColumn::parse("x desc").order(), Order::Desc);
}

#[test]
fn group_by() {
    let t = pg();
    assert_eq!(sql(&GroupBy::new(Columns::parse("a, b")), &t), r#"GROUP BY "a", "b""#);
}

#[test]
fn hash_is_structural() {
    let a = Where::new(vec![cond("id")]);
    let b = Where::new(vec![cond("id")]);
    let c = Where::new(vec![cond("uid")]);
    assert_eq!(a.hash(), b.hash());
    assert_ne!(a.hash(), c.hash());

    let and = And::new(vec![cond("id")]);
    let or = Or::new(vec![cond("id")]);
    assert_ne!(and.hash(), or.hash());

    let lit1 = Value::literal(1);
    let lit2 = Value::literal(2);
    assert_ne!(lit1.hash(), lit2.hash());
    assert_ne!(Value::literal("1").hash(), lit1.hash());
}

#[test]
fn with_resets_memoized_hash() {
    let t = pg();
    let cvs = ColumnValues::new(vec![ColumnValue::assign("a", Value::placeholder())]);
    let before = cvs.hash().clone();
    assert_eq!(sql(&cvs, &t), r#""a" = $1"#);

    let cvs = cvs.with(ColumnValue::assign("b", Value::placeholder()));
    assert_ne!(cvs.hash(), &before);
    assert_eq!(sql(&cvs, &t), r#""a" = $1, "b" = $2"#);
}

#[test]
fn statement_select_layout() {
    let t = pg();
    let stmt = Statement::new(StatementType::Select)
        .table(Table::new("users"))
        .columns(Columns::parse("id, name"))
        .where_(Where::new(vec![cond("status")]))
        .order_by(OrderBy::new(SortColumns::parse("-id")))
        .limit(10)
        .offset(20);
    assert_eq!(
        sql(&stmt, &t),
        r#"SELECT "id", "name" FROM "users" WHERE ("status" = $1) ORDER BY "id" DESC LIMIT 10 OFFSET 20"#
    );
}

#[test]
fn statement_select_defaults() {
    let t = pg();
    let stmt = Statement::new(StatementType::Select).table(Table::new("users"));
    assert_eq!(sql(&stmt, &t), r#"SELECT * FROM "users""#);

    let stmt = stmt.distinct(true).columns(Columns::parse("email"));
    assert_eq!(sql(&stmt, &t), r#"SELECT DISTINCT "email" FROM "users""#);

    let stmt = Statement::new(StatementType::Select).columns(Columns::new(vec![Column::raw(Raw::new("1"))]));
    assert_eq!(sql(&stmt, &t), "SELECT 1");
}

#[test]
fn offset_without_limit_uses_limit_all() {
    let stmt = Statement::new(StatementType::Select)
        .table(Table::new("t"))
        .offset(5);
    assert_eq!(sql(&stmt, &pg()), r#"SELECT * FROM "t" OFFSET 5"#);
    assert_eq!(sql(&stmt, &Template::sqlite()), r#"SELECT * FROM "t" LIMIT -1 OFFSET 5"#);
}

#[test]
fn statement_validate() {
    assert!(Statement::new(StatementType::Select).validate().is_err());
    assert!(Statement::new(StatementType::Update).table(Table::new("t")).validate().is_err());
    assert!(Statement::new(StatementType::DropDatabase).validate().is_err());
    assert!(Statement::raw(Raw::new("  ")).validate().is_err());

    let err = Statement::new(StatementType::Delete).validate().unwrap_err();
    assert_eq!(err.to_string(), "Empty statement: DELETE requires a table");

    assert!(Statement::raw(Raw::new("SELECT 1")).validate().is_ok());
}

#[test]
fn insert_with_columns_needs_values() {
    let stmt = Statement::new(StatementType::Insert)
        .table(Table::new("t"))
        .columns(Columns::parse("a, b"));
    let err = stmt.validate().unwrap_err();
    assert_eq!(err.to_string(), "Empty statement: INSERT requires values for its columns");
    assert!(stmt.clone().values(ValueGroups::default()).validate().is_err());

    let stmt = stmt.values(ValueGroups::new(vec![ValueGroup::new(Values::placeholders(2))]));
    assert!(stmt.validate().is_ok());
    assert_eq!(sql(&stmt, &pg()), r#"INSERT INTO "t" ("a", "b") VALUES ($1, $2)"#);

    let defaults = Statement::new(StatementType::Insert).table(Table::new("t"));
    assert!(defaults.validate().is_ok());
    assert_eq!(sql(&defaults, &pg()), r#"INSERT INTO "t" DEFAULT VALUES"#);
}

#[test]
fn parts_outside_the_layout_are_not_compiled() {
    let update = Statement::new(StatementType::Update)
        .table(Table::new("t"))
        .column_values(ColumnValues::new(vec![ColumnValue::assign("a", Value::placeholder())]))
        .where_(Where::new(vec![cond("id")]));
    let sorted = update
        .clone()
        .order_by(OrderBy::new(SortColumns::parse("-id")))
        .group_by(GroupBy::new(Columns::parse("a")));

    let plain = pg();
    let with_extras = pg();
    let expected = r#"UPDATE "t" SET "a" = $1 WHERE ("id" = $2)"#;
    assert_eq!(sql(&update, &plain), expected);
    assert_eq!(sql(&sorted, &with_extras), expected);
    assert_eq!(plain.cache_stats().len, with_extras.cache_stats().len);
}

#[test]
fn compile_is_deterministic_across_cache_clears() {
    let t = pg();
    let stmt = Statement::new(StatementType::Delete)
        .table(Table::new("sessions"))
        .where_(Where::new(vec![
            cond("user_id"),
            ColumnValue::new("expires_at", Operator::Cmp(ComparisonOperator::Lt), Value::raw("NOW()")).into(),
        ]));
    let first = sql(&stmt, &t);
    let cached = sql(&stmt, &t);
    t.clear_cache();
    let rebuilt = sql(&stmt, &t);
    assert_eq!(first, cached);
    assert_eq!(first, rebuilt);
    assert_eq!(
        first,
        r#"DELETE FROM "sessions" WHERE ("user_id" = $1 AND "expires_at" < NOW())"#
    );
}

#[test]
fn literal_values_render_inline() {
    let t = pg();
    let cv = ColumnValue::new("active", Operator::Default, Value::literal(Param::Bool(true)));
    assert_eq!(sql(&cv, &t), r#""active" = TRUE"#);
    assert_eq!(sql(&cv, &Template::sqlite()), r#""active" = 1"#);
}
