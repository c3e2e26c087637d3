use bencher::{TestCase, column};
#[cfg(feature = "codspeed")]
use codspeed_criterion_compat::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
#[cfg(not(feature = "codspeed"))]
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lightful_query::{Bindings, Connection, ConnectionError, QueryBuilder, Row};
use std::hint::black_box;

struct NoopConnection;

impl Connection for NoopConnection {
    fn fetch_all(&self, _sql: &str, _bindings: &Bindings) -> Result<Vec<Row>, ConnectionError> {
        Ok(Vec::new())
    }

    fn execute(&self, _sql: &str, _bindings: &Bindings) -> Result<bool, ConnectionError> {
        Ok(true)
    }

    fn last_insert_id(&self) -> Result<String, ConnectionError> {
        Ok(String::from("0"))
    }
}

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::small("small_query"), TestCase::normal("normal_query"), TestCase::large("large_query")]
}

fn benchmark_select(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("query_select");
    let connection = NoopConnection;

    for case in create_test_cases() {
        let columns = (0..case.size()).map(column).collect::<Vec<_>>();
        group.throughput(Throughput::Elements(case.size() as u64));

        group.bench_with_input(BenchmarkId::new("build_and_render", case.name()), &columns, |b, columns| {
            b.iter(|| {
                let mut query = QueryBuilder::new(&connection)
                    .select(columns.iter().map(String::as_str))
                    .and_then(|query| query.table("events"))
                    .expect("benchmark identifiers should be valid");
                for (index, name) in columns.iter().enumerate() {
                    let value = index as i64;
                    let next =
                        if index % 2 == 0 { query.where_(name, "=", value) } else { query.or_where(name, ">", value) };
                    query = next.expect("benchmark clauses should be valid");
                }
                black_box(query.statement().expect("benchmark query should render"))
            });
        });
    }

    group.finish();
}

fn benchmark_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("query_insert");
    let connection = NoopConnection;

    for case in create_test_cases() {
        let row = (0..case.size()).map(|index| (column(index), index as i64)).collect::<Vec<_>>();
        group.throughput(Throughput::Elements(case.size() as u64));

        group.bench_with_input(BenchmarkId::new("render", case.name()), &row, |b, row| {
            b.iter(|| {
                let query = QueryBuilder::new(&connection)
                    .table("events")
                    .and_then(|query| query.insert(row.iter().map(|(name, value)| (name.as_str(), *value))))
                    .expect("benchmark row should be valid");
                black_box(query.get_sql().expect("benchmark insert should render"))
            });
        });
    }

    group.finish();
}

criterion_group!(query, benchmark_select, benchmark_insert);
criterion_main!(query);
