use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dynsql::condition::{is_equal_to, is_equal_to_when_present, is_in};
use dynsql::render::{NamedMap, Positional, SequentialDollar};
use dynsql::{SelectModel, SqlColumn, SqlTable, select};

/// select c0, c1, ... from t where c0 = ? and c1 = ? ...
fn build_select(n: usize) -> SelectModel {
    let table = SqlTable::new("t");
    let columns: Vec<SqlColumn> = (0..n).map(|i| table.column(format!("c{i}"))).collect();
    let mut builder = select(columns.iter()).from(&table).where_(&columns[0], is_equal_to(0));
    for (i, column) in columns.iter().enumerate().skip(1) {
        builder = builder.and(column, is_equal_to(i as i64));
    }
    builder.build().unwrap()
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select");

    for n in [1, 5, 10, 50, 100] {
        let model = build_select(n);
        group.bench_with_input(BenchmarkId::new("positional", n), &model, |b, model| {
            b.iter(|| black_box(model.render(&Positional).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("named", n), &model, |b, model| {
            b.iter(|| black_box(model.render(&NamedMap).unwrap()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_and_render");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let model = build_select(n);
                black_box(model.render(&SequentialDollar).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/in_list");
    let table = SqlTable::new("t");
    let id = table.column("id");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let model = select([&id])
                    .from(&table)
                    .where_(&id, is_in(values.iter().copied()))
                    .build()
                    .unwrap();
                black_box(model.render(&SequentialDollar).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_suppressed_criteria(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/suppressed_criteria");
    let table = SqlTable::new("t");
    let id = table.column("id");

    for n in [1, 10, 50] {
        let model = {
            let mut builder = select([&id])
                .from(&table)
                .where_(&id, is_equal_to_when_present(None::<i64>))
                .allow_non_rendering_where(true);
            for i in 0..n {
                let value = (i % 2 == 0).then_some(i as i64);
                builder = builder.or(&id, is_equal_to_when_present(value));
            }
            builder.build().unwrap()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &model, |b, model| {
            b.iter(|| black_box(model.render(&Positional).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_render,
    bench_build_and_render,
    bench_in_list,
    bench_suppressed_criteria
);
criterion_main!(benches);
