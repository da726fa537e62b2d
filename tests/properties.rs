use proptest::prelude::*;

use bank_queue_sim::customer::Customer;
use bank_queue_sim::engine::SimulationEngine;
use bank_queue_sim::events::{EventKind, Timeline};
use bank_queue_sim::models::{AssignmentPolicy, PriorityAging, PriorityClass, SimConfig};
use bank_queue_sim::queue::WaitingLine;

fn priority_class() -> impl Strategy<Value = PriorityClass> {
    prop::sample::select(PriorityClass::ALL.to_vec())
}

proptest! {
    #[test]
    fn timeline_pops_in_time_then_insertion_order(times in prop::collection::vec(0u32..50, 1..40)) {
        let mut timeline = Timeline::new();
        for time in &times {
            timeline.schedule(f64::from(*time), EventKind::CustomerArrival).unwrap();
        }

        let mut previous: Option<(f64, u64)> = None;
        while let Some(event) = timeline.pop() {
            if let Some((time, sequence)) = previous {
                prop_assert!(time < event.time || (time == event.time && sequence < event.sequence));
            }
            prop_assert_eq!(timeline.now(), event.time);
            previous = Some((event.time, event.sequence));
        }
    }

    #[test]
    fn waiting_line_pops_by_class_then_arrival(
        arrivals in prop::collection::vec((priority_class(), 0u32..100), 1..40)
    ) {
        let mut line = WaitingLine::new(None);
        for (index, (priority, time)) in arrivals.iter().enumerate() {
            let customer = Customer::new(index as u64, f64::from(*time), *priority, 1.0, f64::INFINITY);
            prop_assert!(line.add(customer));
        }

        let mut popped = Vec::new();
        while let Some(customer) = line.pop_highest_priority() {
            popped.push((customer.priority, customer.arrival_time, customer.id));
        }
        prop_assert_eq!(popped.len(), arrivals.len());
        for pair in popped.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn abandonment_scan_is_idempotent(
        patience in prop::collection::vec(1u32..20, 1..30),
        now in 0u32..40
    ) {
        let mut line = WaitingLine::new(None);
        for (index, limit) in patience.iter().enumerate() {
            line.add(Customer::new(index as u64, 0.0, PriorityClass::Regular, 1.0, f64::from(*limit)));
        }

        let now = f64::from(now);
        let evicted = line.scan_and_evict(now);
        prop_assert!(evicted.iter().all(|customer| customer.abandoned));
        prop_assert!(line.iter().all(|customer| !customer.should_abandon(now)));
        prop_assert_eq!(evicted.len() + line.len(), patience.len());
        prop_assert!(line.scan_and_evict(now).is_empty());
    }

    #[test]
    fn bounded_line_never_exceeds_capacity(capacity in 0usize..10, count in 0usize..30) {
        let mut line = WaitingLine::new(Some(capacity));
        let admitted = (0..count)
            .filter(|id| {
                line.add(Customer::new(*id as u64, 0.0, PriorityClass::Regular, 1.0, 1.0))
            })
            .count();
        prop_assert_eq!(admitted, count.min(capacity));
        prop_assert!(line.len() <= capacity);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn random_runs_keep_accounting_invariants(
        seed in any::<u64>(),
        tellers in 1usize..5,
        capacity in prop::option::of(0usize..8),
        biased in any::<bool>(),
        aging in any::<bool>()
    ) {
        let config = SimConfig {
            teller_count: tellers,
            run_duration: 120.0,
            mean_arrival_interval: 1.0,
            queue_capacity: capacity,
            random_seed: Some(seed),
            assignment_policy: if biased {
                AssignmentPolicy::PriorityBiased
            } else {
                AssignmentPolicy::IdleLongest
            },
            priority_aging: aging.then_some(PriorityAging {
                threshold: 5.0,
                patience_bonus: 2.0,
            }),
            ..SimConfig::default()
        };
        let mut engine = SimulationEngine::new(config).unwrap();
        let report = engine.run().unwrap();

        let finished = (report.customers.served + report.customers.abandoned) as u64;
        prop_assert_eq!(finished + report.customers.turned_away, report.customers.arrivals);
        prop_assert!(report.metadata.elapsed.is_finite());
        for teller in &report.tellers {
            prop_assert!(teller.busy_time >= 0.0);
            prop_assert!(teller.busy_time <= report.metadata.elapsed + 1e-9);
        }
        if let Some(capacity) = capacity {
            prop_assert!(report.queue.max_length <= capacity);
        }

        for customer in engine.statistics().served() {
            let start = customer.service_start_time.unwrap();
            let end = customer.service_end_time.unwrap();
            prop_assert!(customer.arrival_time <= start);
            prop_assert!(start <= end);
            prop_assert!(!customer.abandoned);
        }
        for customer in engine.statistics().abandoned() {
            prop_assert!(customer.service_start_time.is_none());
        }
    }
}
