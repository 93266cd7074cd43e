use sqlfrag::fragment::{Statement, StatementType, Table};
use sqlfrag::normalize::{Arg, Term, to_where};
use sqlfrag::{CacheConfig, Compiler, CompilerConfig, Template, TemplateConfig};
use std::sync::Arc;
use std::thread;

fn statement(i: usize) -> (Statement, sqlfrag::ParamList) {
    let (w, args) = to_where(Term::all(vec![
        Term::constraint(format!("c{}", i % 8), Arg::value(i as i64)),
        Term::constraint("tags", Arg::list([1, 2])),
    ]))
    .unwrap();
    let stmt = Statement::new(StatementType::Select)
        .table(Table::new(format!("t{}", i % 4)))
        .where_(w);
    (stmt, args)
}

#[test]
fn shared_compiler_gives_identical_sql() {
    let compiler = Arc::new(Compiler::new(Arc::new(Template::postgres())));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let compiler = Arc::clone(&compiler);
            thread::spawn(move || {
                (0..200)
                    .map(|i| {
                        let (stmt, args) = statement(i);
                        compiler.compile(&stmt, args).unwrap().sql
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for other in &results[1..] {
        assert_eq!(other, &results[0]);
    }
    assert_eq!(
        results[0][5],
        r#"SELECT * FROM "t1" WHERE ("c5" = $1 AND "tags" IN ($2, $3))"#
    );

    // 8 distinct column names x 4 tables, with the period of 8 covering both.
    assert_eq!(compiler.cache_stats().len, 8);
}

#[test]
fn small_caches_stay_bounded_under_contention() {
    let template = Template::new(TemplateConfig::postgres().cache(CacheConfig::new().capacity(4)))
        .unwrap();
    let compiler = Arc::new(Compiler::with_config(
        Arc::new(template),
        CompilerConfig::new().statement_cache(CacheConfig::new().capacity(2)),
    ));
    let reference = Compiler::new(Arc::new(Template::postgres()));

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let compiler = Arc::clone(&compiler);
            thread::spawn(move || {
                (0..100)
                    .map(|i| {
                        let (stmt, args) = statement(i + n);
                        (i + n, compiler.compile(&stmt, args).unwrap().sql)
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for h in handles {
        for (i, sql) in h.join().unwrap() {
            let (stmt, args) = statement(i);
            assert_eq!(sql, reference.compile(&stmt, args).unwrap().sql);
        }
    }

    assert!(compiler.cache_stats().len <= 2);
    assert!(compiler.cache_stats().evictions > 0);
    assert!(compiler.template().cache_stats().len <= 4);
}
