use std::fmt::Write;

use crate::models::{ArrivalProfile, PriorityClass, SimConfig};
use crate::state::SimulationReport;

pub trait Formatter {
    fn write(&self, report: &SimulationReport) -> String;
}

pub struct HumanFormatter;
pub struct SummaryFormatter;
pub struct JsonFormatter;

impl Formatter for HumanFormatter {
    fn write(&self, report: &SimulationReport) -> String {
        let mut out = String::new();
        write_metadata(&mut out, report);
        let _ = writeln!(out, "tellers: {}", report.metadata.teller_count);
        let _ = writeln!(out, "run_duration: {:.2}", report.metadata.run_duration);

        let customers = &report.customers;
        out.push_str("Customers:\n");
        let _ = writeln!(out, "arrivals: {}", customers.arrivals);
        let _ = writeln!(out, "served: {}", customers.served);
        let _ = writeln!(out, "abandoned: {}", customers.abandoned);
        let _ = writeln!(out, "turned_away: {}", customers.turned_away);
        let _ = writeln!(
            out,
            "abandonment_rate: {}",
            percent(customers.abandonment_rate)
        );
        for (class, count) in &customers.served_by_priority {
            let _ = writeln!(out, "served {}: {}", class, count);
        }

        out.push_str("Wait:\n");
        let _ = writeln!(out, "average: {:.2}", report.wait.average);
        let _ = writeln!(out, "max: {:.2}", report.wait.max);
        let _ = writeln!(out, "min: {:.2}", report.wait.min);
        for (class, average) in &report.wait.by_priority {
            let _ = writeln!(out, "average {}: {:.2}", class, average);
        }

        out.push_str("Service:\n");
        let _ = writeln!(
            out,
            "average_service_time: {:.2}",
            report.service.average_service_time
        );
        let _ = writeln!(
            out,
            "average_total_time: {:.2}",
            report.service.average_total_time
        );

        out.push_str("Queue:\n");
        let _ = writeln!(out, "average_length: {:.2}", report.queue.average_length);
        let _ = writeln!(out, "max_length: {}", report.queue.max_length);

        out.push_str("Tellers:\n");
        for teller in &report.tellers {
            let _ = writeln!(
                out,
                "teller {} (efficiency {:.2}x): utilization {}, busy {:.2}, {} served",
                teller.id,
                teller.efficiency,
                percent(teller.utilization),
                teller.busy_time,
                teller.customers_served
            );
        }
        let _ = writeln!(
            out,
            "average_utilization: {}",
            percent(report.average_utilization)
        );
        out
    }
}

impl Formatter for SummaryFormatter {
    fn write(&self, report: &SimulationReport) -> String {
        let mut out = String::new();
        write_metadata(&mut out, report);
        out.push_str("Summary:\n");
        let _ = writeln!(out, "served: {}", report.customers.served);
        let _ = writeln!(out, "abandoned: {}", report.customers.abandoned);
        let _ = writeln!(out, "turned_away: {}", report.customers.turned_away);
        let _ = writeln!(out, "average_wait: {:.2}", report.wait.average);
        let _ = writeln!(
            out,
            "average_queue_length: {:.2}",
            report.queue.average_length
        );
        let _ = writeln!(
            out,
            "average_utilization: {}",
            percent(report.average_utilization)
        );
        out
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, report: &SimulationReport) -> String {
        let mut out = serde_json::to_string_pretty(report).unwrap_or_default();
        out.push('\n');
        out
    }
}

/// Renders a resolved configuration for `show-config`.
pub fn render_config(config: &SimConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Policy: {}", config.assignment_policy);
    let _ = writeln!(out, "Tellers: {}", config.teller_count);
    let efficiencies = config
        .efficiencies()
        .iter()
        .map(|value| format!("{:.2}", value))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "Efficiencies: {}", efficiencies);
    let _ = writeln!(out, "Duration: {:.2}", config.run_duration);
    let _ = writeln!(out, "Arrival interval: {:.2}", config.mean_arrival_interval);
    let _ = writeln!(
        out,
        "Service time: {:.2} (sd {:.2})",
        config.mean_service_time, config.service_time_variance
    );
    if config.mean_patience.is_infinite() {
        out.push_str("Patience: unbounded\n");
    } else {
        let _ = writeln!(
            out,
            "Patience: {:.2} (sd {:.2})",
            config.mean_patience, config.patience_variance
        );
    }
    match config.queue_capacity {
        Some(capacity) => {
            let _ = writeln!(out, "Queue capacity: {}", capacity);
        }
        None => out.push_str("Queue capacity: unbounded\n"),
    }
    match config.random_seed {
        Some(seed) => {
            let _ = writeln!(out, "Seed: {}", seed);
        }
        None => out.push_str("Seed: none\n"),
    }
    let distribution = &config.priority_distribution;
    let mix = distribution
        .explicit()
        .iter()
        .copied()
        .chain(std::iter::once((
            PriorityClass::Regular,
            distribution.regular_share(),
        )))
        .map(|(class, share)| format!("{} {:.2}", class, share))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "Priority mix: {}", mix);
    match &config.priority_aging {
        Some(aging) => {
            let _ = writeln!(
                out,
                "Aging: after {:.2} (+{:.2} patience)",
                aging.threshold, aging.patience_bonus
            );
        }
        None => out.push_str("Aging: off\n"),
    }
    match &config.arrivals {
        ArrivalProfile::Random => out.push_str("Arrivals: random\n"),
        ArrivalProfile::Scripted { customers } => {
            let _ = writeln!(out, "Arrivals: scripted ({} customers)", customers.len());
        }
    }
    out
}

fn write_metadata(out: &mut String, report: &SimulationReport) {
    let metadata = &report.metadata;
    out.push_str("Metadata:\n");
    let _ = writeln!(out, "policy: {}", metadata.policy);
    match metadata.seed {
        Some(seed) => {
            let _ = writeln!(out, "seed: {}", seed);
        }
        None => out.push_str("seed: none\n"),
    }
    let _ = writeln!(out, "elapsed: {:.2}", metadata.elapsed);
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}
