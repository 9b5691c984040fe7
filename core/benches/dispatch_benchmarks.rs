use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use proc_chain::{async_trait, terminal, Call, ChainResult, ContextData, Interceptor, Next, ProcessRegistry, SharedInterceptor};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
  user_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BenchParam {
  order_id: String,
  iterations: u64,
}

/// Pass-through check, shaped like a login guard.
struct PassThrough;

#[async_trait]
impl Interceptor<BenchContext> for PassThrough {
  async fn handle(&self, call: Call<BenchContext>, next: Next<'_, BenchContext>) -> ChainResult {
    call.ctx().write().counter += 1;
    next.run(call).await
  }
}

/// Stops the chain unless a user is present.
struct Gate;

#[async_trait]
impl Interceptor<BenchContext> for Gate {
  async fn handle(&self, call: Call<BenchContext>, next: Next<'_, BenchContext>) -> ChainResult {
    if call.ctx().read().user_id.is_none() {
      return Err(proc_chain::ChainError::failure("BENCH.NOT_LOGGED_IN"));
    }
    next.run(call).await
  }
}

fn work_handler() -> SharedInterceptor<BenchContext> {
  terminal(|call: Call<BenchContext>| async move {
    let param = call.param::<BenchParam>()?;
    let mut data = call.ctx().write();
    for _ in 0..param.iterations {
      data.counter = data.counter.wrapping_add(1);
    }
    Ok(json!({ "order_id": param.order_id, "counter": data.counter }))
  })
}

fn build_registry(depth: usize) -> ProcessRegistry<BenchContext> {
  let registry = ProcessRegistry::new();
  let mut chain: Vec<SharedInterceptor<BenchContext>> = (0..depth)
    .map(|_| Arc::new(PassThrough) as SharedInterceptor<BenchContext>)
    .collect();
  chain.push(work_handler());
  registry.register::<BenchParam>("bench.run", chain);
  registry.register::<BenchParam>("bench.gated", vec![Arc::new(Gate), work_handler()]);
  registry
}

fn bench_dispatch_by_chain_depth(c: &mut Criterion) {
  let mut group = c.benchmark_group("DispatchChainDepth");
  let rt = Runtime::new().unwrap();

  for depth in [0usize, 3, 10].iter() {
    let registry = build_registry(*depth);
    group.throughput(Throughput::Elements(1));
    group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, _| {
      b.to_async(&rt).iter(|| async {
        registry
          .dispatch(
            Some("bench.run"),
            json!({ "order_id": "o-1", "iterations": 10 }),
            ContextData::new(BenchContext::default()),
          )
          .await
          .unwrap()
      });
    });
  }
  group.finish();
}

fn bench_short_circuit_and_misses(c: &mut Criterion) {
  let mut group = c.benchmark_group("DispatchEarlyExit");
  let rt = Runtime::new().unwrap();
  let registry = build_registry(3);

  group.bench_function("gate_rejects", |b| {
    b.to_async(&rt).iter(|| async {
      registry
        .dispatch(Some("bench.gated"), json!({}), ContextData::new(BenchContext::default()))
        .await
        .unwrap()
    });
  });

  group.bench_function("no_such_process", |b| {
    b.to_async(&rt).iter(|| async {
      registry
        .dispatch(Some("bench.missing"), json!({}), ContextData::new(BenchContext::default()))
        .await
        .unwrap()
    });
  });
  group.finish();
}

criterion_group!(benches, bench_dispatch_by_chain_depth, bench_short_circuit_and_misses);
criterion_main!(benches);
