//! Payload classification benchmark.
//!
//! Run with: cargo bench --bench classify
//! Results saved to: target/criterion/

use std::hint::black_box;

use build_notifier::alert::{AlertConfig, decide};
use build_notifier::BuildResult;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

// ============================================================================
// Payloads
// ============================================================================

const PAYLOADS: &[(&str, &str)] = &[
    ("tagged", "FAILURE:Build #42 broken"),
    ("tagged_lowercase", "  unstable : 3 tests failed "),
    ("json", r#"{"result":"SUCCESS","message":"Build #43 ok"}"#),
    ("unknown", "server restarting for maintenance"),
];

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for &(name, payload) in PAYLOADS {
        group.bench_with_input(BenchmarkId::from_parameter(name), payload, |b, payload| {
            b.iter(|| BuildResult::parse(black_box(payload)));
        });
    }

    group.finish();
}

fn bench_parse_and_decide(c: &mut Criterion) {
    let config = AlertConfig {
        show_error_only: true,
        ..AlertConfig::default()
    };

    c.bench_function("parse_and_decide", |b| {
        b.iter(|| {
            for &(_, payload) in PAYLOADS {
                let result = BuildResult::parse(black_box(payload));
                black_box(decide(result.outcome(), &config));
            }
        });
    });
}

criterion_group!(benches, bench_parse, bench_parse_and_decide);
criterion_main!(benches);
