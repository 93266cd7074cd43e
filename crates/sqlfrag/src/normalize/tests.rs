use super::*;
use crate::fragment::Fragment;
use crate::template::Template;

fn pg(f: &impl Fragment) -> String {
    let t = Template::postgres();
    f.compile(&t).render(t.placeholder_style())
}

fn lite(f: &impl Fragment) -> String {
    let t = Template::sqlite();
    f.compile(&t).render(t.placeholder_style())
}

fn ints(params: &ParamList) -> Vec<i64> {
    params
        .as_slice()
        .iter()
        .map(|p| match p {
            Param::Int(v) => *v,
            other => panic!("expected int, got {other:?}"),
        })
        .collect()
}

#[test]
fn operator_from_key() {
    let (w, args) = to_where(Term::constraint("id >", 5)).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" > $1)"#);
    assert_eq!(lite(&w), r#"WHERE ("id" > ?)"#);
    assert_eq!(args.into_vec(), vec![Param::Int(5)]);
}

#[test]
fn null_infers_is() {
    let (w, args) = to_where(Term::constraint("deleted_at", Param::Null)).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("deleted_at" IS NULL)"#);
    assert!(args.is_empty());

    let (w, args) = to_where(Term::constraint("deleted_at IS NOT", Param::Null)).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("deleted_at" IS NOT NULL)"#);
    assert!(args.is_empty());
}

#[test]
fn list_infers_in() {
    let (w, args) = to_where(Term::constraint("id", Arg::list([1, 2, 3]))).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" IN ($1, $2, $3))"#);
    assert_eq!(ints(&args), vec![1, 2, 3]);

    let (w, args) = to_where(Term::constraint("id NOT IN", Arg::list([7]))).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" NOT IN ($1))"#);
    assert_eq!(ints(&args), vec![7]);
}

#[test]
fn empty_list_renders_null_group() {
    let (w, args) = to_where(Term::constraint("id", Arg::List(Vec::new()))).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" IN (NULL))"#);
    assert!(args.is_empty());
}

#[test]
fn function_values() {
    let (w, args) = to_where(Term::constraint("created_at <", FuncExpr::new("NOW", vec![]))).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("created_at" < NOW())"#);
    assert!(args.is_empty());

    let f = FuncExpr::new("COALESCE", vec![Arg::value(1), Arg::value(2)]);
    let (w, args) = to_where(Term::constraint("x", f)).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("x" = COALESCE($1, $2))"#);
    assert_eq!(ints(&args), vec![1, 2]);
}

#[test]
fn argument_order_follows_placeholders() {
    let term = Term::and(vec![
        Term::raw("col1 = ?", vec![Arg::value(1)]),
        Term::or(vec![
            Term::raw("col2 = ?", vec![Arg::value(2)]),
            Term::constraint("col3", Arg::list([3, 4])),
        ]),
    ]);
    let (w, args) = to_where(term).unwrap();
    assert_eq!(
        pg(&w),
        r#"WHERE (col1 = $1 AND (col2 = $2 OR "col3" IN ($3, $4)))"#
    );
    assert_eq!(ints(&args), vec![1, 2, 3, 4]);
}

#[test]
fn raw_expansion_keeps_surrounding_text() {
    let term = Term::raw(
        "name LIKE ? OR name LIKE ?",
        vec![Arg::value("%A%"), Arg::value("%B%")],
    );
    let (w, args) = to_where(term).unwrap();
    assert_eq!(pg(&w), "WHERE (name LIKE $1 OR name LIKE $2)");
    assert_eq!(lite(&w), "WHERE (name LIKE ? OR name LIKE ?)");
    assert_eq!(
        args.into_vec(),
        vec![Param::Text("%A%".into()), Param::Text("%B%".into())]
    );
}

#[test]
fn raw_list_argument_expands_in_place() {
    let term = Term::raw("a = ? AND b IN ? AND c = ?", vec![
        Arg::value(1),
        Arg::list([2, 3]),
        Arg::value(4),
    ]);
    let (w, args) = to_where(term).unwrap();
    assert_eq!(pg(&w), "WHERE (a = $1 AND b IN ($2, $3) AND c = $4)");
    assert_eq!(ints(&args), vec![1, 2, 3, 4]);
}

#[test]
fn raw_nested_values_splice() {
    let inner = RawValue::new("LOWER(?)", vec![Arg::value("X")]);
    let term = Term::raw("name = ?", vec![Arg::Raw(inner)]);
    let (w, args) = to_where(term).unwrap();
    assert_eq!(pg(&w), "WHERE (name = LOWER($1))");
    assert_eq!(args.len(), 1);
}

#[test]
fn placeholder_mismatch_is_an_error() {
    let err = to_where(Term::raw("a = ? AND b = ?", vec![Arg::value(1)])).unwrap_err();
    assert!(err.is_placeholder_mismatch());
    assert_eq!(
        err.to_string(),
        "placeholder mismatch: 2 placeholder(s) but 1 argument(s)"
    );

    let err = to_where(Term::raw("a = ?", vec![Arg::value(1), Arg::value(2)])).unwrap_err();
    assert!(err.is_placeholder_mismatch());
}

#[test]
fn empty_groups_are_pruned() {
    let term = Term::and(vec![
        Term::and(vec![]),
        Term::constraint("id", 1),
        Term::or(vec![Term::all(vec![])]),
    ]);
    let (w, args) = to_where(term).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" = $1)"#);
    assert_eq!(args.len(), 1);

    let (w, args) = to_where(Term::and(vec![Term::or(vec![])])).unwrap();
    assert_eq!(pg(&w), "");
    assert!(args.is_empty());
}

#[test]
fn implicit_and_flattens_into_parent() {
    let term = Term::map([("a", 1), ("b", 2)]);
    let (w, _) = to_where(term).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("a" = $1 AND "b" = $2)"#);

    let term = Term::or(vec![Term::map([("a", 1), ("b", 2)]), Term::constraint("c", 3)]);
    let (w, args) = to_where(term).unwrap();
    assert_eq!(pg(&w), r#"WHERE (("a" = $1 AND "b" = $2) OR "c" = $3)"#);
    assert_eq!(ints(&args), vec![1, 2, 3]);
}

#[test]
fn slice_rule() {
    assert!(matches!(
        Term::expr("id = ?", vec![Arg::value(1)]).unwrap(),
        Term::Raw(_)
    ));
    assert!(matches!(Term::expr("1 = 1", vec![]).unwrap(), Term::Raw(_)));

    let term = Term::expr("id >", vec![Arg::value(3)]).unwrap();
    let (w, _) = to_where(term).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" > $1)"#);

    let term = Term::expr("id", vec![Arg::value(1), Arg::value(2)]).unwrap();
    let (w, args) = to_where(term).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" IN ($1, $2))"#);
    assert_eq!(ints(&args), vec![1, 2]);

    let err = Term::expr("id", vec![Arg::value(1), Arg::list([2])]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedArgument(_)));
}

#[test]
fn typed_comparisons() {
    let term = Term::all(vec![
        Term::constraint("name", Comparison::ilike("%a%")),
        Term::constraint("age", Comparison::between(18, 30)),
        Term::constraint("email", Comparison::is_not_null()),
        Term::constraint("id", Comparison::not_in_list([1, 2])),
        Term::constraint("tags", Comparison::custom("@>", "{x}")),
    ]);
    let (w, args) = to_where(term).unwrap();
    assert_eq!(
        pg(&w),
        concat!(
            r#"WHERE ("name" ILIKE $1 AND "age" BETWEEN $2 AND $3 AND "email" IS NOT NULL "#,
            r#"AND "id" NOT IN ($4, $5) AND "tags" @> $6)"#
        )
    );
    assert_eq!(args.len(), 6);

    let t = Template::mysql();
    assert!(w.compile(&t).to_string().starts_with("WHERE (`name` LIKE ?"));
}

#[test]
fn comparison_with_key_operator_is_rejected() {
    let err = to_where(Term::constraint("id >", Comparison::eq(1))).unwrap_err();
    assert!(matches!(err, Error::InvalidOperator(_)));
}

#[test]
fn raw_key() {
    let key = RawValue::new("LOWER(?)", vec![Arg::value("Email")]);
    let term = Term::Constraint(Constraint::with_raw_key(key, "a@b.c"));
    let (w, args) = to_where(term).unwrap();
    assert_eq!(pg(&w), "WHERE (LOWER($1) = $2)");
    assert_eq!(
        args.into_vec(),
        vec![Param::Text("Email".into()), Param::Text("a@b.c".into())]
    );
}

#[test]
fn column_values() {
    let (cvs, args) = to_column_values(vec![
        Term::constraint("name", "alice"),
        Term::constraint("deleted_at", Param::Null),
        Term::raw("login_count = login_count + ?", vec![Arg::value(1)]),
        Term::constraint("updated_at", FuncExpr::new("NOW", vec![])),
    ])
    .unwrap();
    assert_eq!(
        pg(&cvs),
        r#""name" = $1, "deleted_at" = NULL, "login_count" = login_count + $2, "updated_at" = NOW()"#
    );
    assert_eq!(args.len(), 2);
}

#[test]
fn column_values_reject_groups_and_operators() {
    assert!(to_column_values(vec![Term::or(vec![])]).is_err());
    assert!(to_column_values(vec![Term::constraint("n >", 1)]).is_err());
    assert!(to_column_values(vec![Term::raw("NOW()", vec![])]).is_err());
}

#[test]
fn columns() {
    let (cols, args) = to_columns(vec![
        ColumnTerm::from("id, name AS n"),
        ColumnTerm::from(RawValue::new("COALESCE(nick, ?) AS nick", vec![Arg::value("anon")])),
        ColumnTerm::from(FuncExpr::new("COUNT", vec![Arg::Raw(RawValue::sql_only("*"))])),
    ])
    .unwrap();
    assert_eq!(
        pg(&cols),
        r#""id", "name" AS "n", COALESCE(nick, $1) AS nick, COUNT(*)"#
    );
    assert_eq!(args.len(), 1);
}

#[test]
fn values_for_insert() {
    let (cols, rows, args) = to_values(
        ["name", "age", "created_at"],
        vec![
            vec![Arg::value("a"), Arg::value(1), FuncExpr::new("NOW", vec![]).into()],
            vec![Arg::value("b"), Arg::Value(Param::Null), FuncExpr::new("NOW", vec![]).into()],
        ],
    )
    .unwrap();
    assert_eq!(pg(&cols), r#""name", "age", "created_at""#);
    assert_eq!(pg(&rows), "($1, $2, NOW()), ($3, $4, NOW())");
    assert_eq!(args.len(), 4);
    assert!(args.as_slice()[3].is_null());

    let err = to_values(["a", "b"], vec![vec![Arg::value(1)]]).unwrap_err();
    assert!(err.to_string().contains("row 0"));
}

#[test]
fn set_entries_must_be_assignments_to_plain_columns() {
    for sql in ["count >= ?", "count <= ?", "count != ?", "x := ?", "count == ?"] {
        let err = to_column_values(vec![Term::raw(sql, vec![Arg::value(1)])]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedArgument(_)), "{sql}: {err}");
    }
    assert!(to_column_values(vec![Term::raw("count =", vec![])]).is_err());
    for sql in ["count + 1 = ?", "t.count AS c = ?", "LOWER(name) = ?"] {
        let err = to_column_values(vec![Term::raw(sql, vec![Arg::value(1)])]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedArgument(_)), "{sql}: {err}");
    }

    let (cvs, args) =
        to_column_values(vec![Term::raw("t.hits = t.hits + ?", vec![Arg::value(1)])]).unwrap();
    assert_eq!(pg(&cvs), r#""t"."hits" = t.hits + $1"#);
    assert_eq!(args.len(), 1);
}

#[test]
fn list_operator_with_scalar_gets_a_group() {
    let (w, args) = to_where(Term::constraint("id IN", 5)).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" IN ($1))"#);
    assert_eq!(ints(&args), vec![5]);

    let (w, _) = to_where(Term::constraint("id", Comparison::custom("NOT IN", 5))).unwrap();
    assert_eq!(pg(&w), r#"WHERE ("id" NOT IN ($1))"#);

    let (w, _) = to_where(Term::constraint("id", Comparison::custom("IN", 5))).unwrap();
    assert_eq!(lite(&w), r#"WHERE ("id" IN (?))"#);
}
