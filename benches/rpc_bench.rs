use criterion::{criterion_group, criterion_main, Criterion};
use rand::prelude::*;
use scalaris::{classify, Operation, RpcRequest, RpcResult, TxSuite};
use serde_json::json;

fn compose_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("compose");

    group.bench_function("serialize_100_writes", |b| {
        b.iter_batched(
            || {
                let mut rng = thread_rng();
                (0..100)
                    .map(|i| Operation::write(format!("key{}", rng.gen_range(0..1000)), i))
                    .collect::<Vec<_>>()
            },
            |ops| {
                let suite = TxSuite::compose(ops);
                let request = RpcRequest::new("req_list", vec![suite.to_descriptors().into()]);
                serde_json::to_vec(&request).unwrap()
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn classify_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    let results: Vec<_> = (0..100).map(|_| json!({"status": "ok"})).collect();
    let tx: RpcResult = serde_json::from_value(json!({
        "id": 0,
        "error": null,
        "result": {"tlog": "opaque", "results": results}
    }))
    .unwrap();
    group.bench_function("tx_results", |b| b.iter(|| classify(&tx)));

    let read: RpcResult = serde_json::from_value(json!({
        "result": {"status": "fail", "reason": "not_found"}
    }))
    .unwrap();
    group.bench_function("read_failure", |b| b.iter(|| classify(&read)));

    group.finish();
}

criterion_group!(benches, compose_bench, classify_bench);
criterion_main!(benches);
