//! Merge throughput benchmarks.
//!
//! Run with:
//! ```
//! cargo bench --bench merge_benchmark
//! ```

#[path = "../src/test_support.rs"]
mod test_support;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use test_support::generate_dataset;
use unimerge::resolver::{Candidate, FieldResolver};
use unimerge::{FieldSpec, NoopAuditSink, Unimerge, Value};

// =============================================================================
// RUN BENCHMARKS
// =============================================================================

/// Full orchestration over generated health/education collections.
fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge/run");
    group.sample_size(20);
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));

    for entity_count in [1_000u32, 10_000] {
        let dataset = generate_dataset(entity_count, 0.25, 42);
        let engine = Unimerge::with_audit_sink(dataset.spec.clone(), Arc::new(NoopAuditSink));

        group.throughput(Throughput::Elements(entity_count as u64));
        group.bench_with_input(
            BenchmarkId::new("citizens", format!("{entity_count}_ids")),
            &dataset.sources,
            |b, sources| b.iter(|| black_box(engine.run(sources))),
        );
    }

    group.finish();
}

// =============================================================================
// RESOLVER BENCHMARKS
// =============================================================================

fn bench_resolve(c: &mut Criterion) {
    let spec = FieldSpec::new("id").with_source_priority(["a", "b", "c", "d"]);
    let resolver = FieldResolver::new(&spec);
    let candidates: Vec<Candidate> = ["a", "b", "c", "d"]
        .iter()
        .enumerate()
        .map(|(i, source)| Candidate::new(Some(Value::Integer((i % 2) as i64)), *source))
        .collect();

    c.bench_function("merge/resolve_tie", |b| {
        b.iter(|| black_box(resolver.resolve("field", black_box(&candidates))))
    });
}

criterion_group!(benches, bench_run, bench_resolve);
criterion_main!(benches);
