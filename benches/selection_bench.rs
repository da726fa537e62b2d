use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use bank_queue_sim::algorithms::{build_strategy, SelectionContext};
use bank_queue_sim::customer::Customer;
use bank_queue_sim::models::{AssignmentPolicy, PriorityClass};
use bank_queue_sim::teller::TellerPool;

const TELLERS: usize = 16;
const ITERATIONS: usize = 1_000;

fn build_pool(count: usize) -> TellerPool {
    let efficiencies: Vec<f64> = (0..count).map(|idx| 0.5 + 0.1 * idx as f64).collect();
    let mut pool = TellerPool::new(&efficiencies);
    // keep every third teller busy
    for id in (0..count).step_by(3) {
        let customer = Customer::new(id as u64, 0.0, PriorityClass::Regular, 5.0, f64::INFINITY);
        pool.start_service(id, customer, 0.0)
            .expect("fresh tellers are idle");
    }
    pool
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    let size_label = format!("{}x{}", ITERATIONS, TELLERS);

    for policy in AssignmentPolicy::ALL {
        group.bench_with_input(
            BenchmarkId::new(policy.to_string(), &size_label),
            &policy,
            |b, &policy| {
                b.iter_batched(
                    || (build_pool(TELLERS), build_strategy(policy)),
                    |(pool, mut strategy)| {
                        for idx in 0..ITERATIONS {
                            let ctx = SelectionContext {
                                tellers: pool.tellers(),
                                priority: PriorityClass::ALL[idx % PriorityClass::ALL.len()],
                            };
                            black_box(strategy.pick(&ctx));
                        }
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_selection);
criterion_main!(benches);
