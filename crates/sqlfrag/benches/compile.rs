use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlfrag::fragment::{Fragment, Statement, StatementType, Table};
use sqlfrag::normalize::{Arg, Term, to_where};
use sqlfrag::{CacheConfig, Compiler, CompilerConfig, Template, TemplateConfig};
use std::sync::Arc;

/// `n` equality constraints plus an `IN` list of `n` values, under one `OR`.
fn build_term(n: usize) -> Term {
    let mut terms: Vec<Term> = (0..n)
        .map(|i| Term::constraint(format!("col{i}"), Arg::value(i as i64)))
        .collect();
    terms.push(Term::or(vec![
        Term::constraint("id", Arg::list(0..n as i64)),
        Term::raw("deleted_at IS NULL", vec![]),
    ]));
    Term::all(terms)
}

fn build_select(n: usize) -> (Statement, sqlfrag::ParamList) {
    let (w, args) = to_where(build_term(n)).expect("normalize");
    let stmt = Statement::new(StatementType::Select)
        .table(Table::new("t"))
        .where_(w)
        .limit(10);
    (stmt, args)
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/normalize");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(to_where(build_term(n)).expect("normalize")));
        });
    }

    group.finish();
}

fn bench_compile_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/cold");

    for n in [1, 5, 10, 50] {
        let template =
            Template::new(TemplateConfig::postgres().cache(CacheConfig::disabled())).expect("template");
        let compiler = Compiler::with_config(
            Arc::new(template),
            CompilerConfig::new().statement_cache(CacheConfig::disabled()),
        );
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let (stmt, args) = build_select(n);
                black_box(compiler.compile(&stmt, args).expect("compile"));
            });
        });
    }

    group.finish();
}

fn bench_compile_cached(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/cached");

    for n in [1, 5, 10, 50] {
        let compiler = Compiler::new(Arc::new(Template::postgres()));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let (stmt, args) = build_select(n);
                black_box(compiler.compile(&stmt, args).expect("compile"));
            });
        });
    }

    group.finish();
}

fn bench_render_styles(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile/render");
    let template = Template::postgres();
    let (stmt, _) = build_select(50);
    let compiled = stmt.compile(&template);

    for style in [
        sqlfrag::PlaceholderStyle::Question,
        sqlfrag::PlaceholderStyle::Dollar,
        sqlfrag::PlaceholderStyle::AtP,
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{style:?}")),
            &style,
            |b, &style| {
                b.iter(|| black_box(compiled.render(style)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_compile_cold,
    bench_compile_cached,
    bench_render_styles
);
criterion_main!(benches);
