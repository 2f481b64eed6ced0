use criterion::{black_box, criterion_group, criterion_main, Criterion};

use roundtrip_core::prelude::*;

fn bench_quick_matrix(c: &mut Criterion) {
    let runner = ParameterMatrixRunner::new(Fixture::standard_set(), &HarnessConfig::default())
        .expect("runner");
    c.bench_function("quick_matrix_standard_set", |b| {
        b.iter(|| {
            let report = runner.run().expect("matrix");
            black_box(report.passed())
        })
    });
}

fn bench_single_pipeline(c: &mut Criterion) {
    let image = Fixture::random("person.jpg", 45 * 1024, 0x5eed);
    let mut group = c.benchmark_group("pipeline_person_jpg");
    for pair in TransformPair::ALL {
        group.bench_function(pair.to_string(), |b| {
            b.iter(|| {
                let case = TestCase::new(0, image.clone(), Configuration::default(), pair);
                black_box(PipelineRunner::run_to_completion(case).expect("pipeline"))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_quick_matrix, bench_single_pipeline);
criterion_main!(benches);
