use std::collections::BTreeMap;

use crate::customer::Customer;
use crate::models::PriorityClass;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueueSample {
    pub time: f64,
    pub length: usize,
}

/// Append-only record of finished customers and queue-length samples.
///
/// Every metric is derived on demand from the recorded observations, and every
/// average returns 0.0 when there is nothing to average.
#[derive(Clone, Debug, Default)]
pub struct SimulationStatistics {
    served: Vec<Customer>,
    abandoned: Vec<Customer>,
    queue_samples: Vec<QueueSample>,
}

impl SimulationStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_served(&mut self, customer: Customer) {
        self.served.push(customer);
    }

    pub fn record_abandoned(&mut self, customer: Customer) {
        self.abandoned.push(customer);
    }

    pub fn record_queue_length(&mut self, time: f64, length: usize) {
        self.queue_samples.push(QueueSample { time, length });
    }

    pub fn served(&self) -> &[Customer] {
        &self.served
    }

    pub fn abandoned(&self) -> &[Customer] {
        &self.abandoned
    }

    pub fn queue_samples(&self) -> &[QueueSample] {
        &self.queue_samples
    }

    pub fn total_served(&self) -> usize {
        self.served.len()
    }

    pub fn total_abandoned(&self) -> usize {
        self.abandoned.len()
    }

    pub fn abandonment_rate(&self) -> f64 {
        let total = self.served.len() + self.abandoned.len();
        ratio(self.abandoned.len() as f64, total)
    }

    pub fn wait_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.served.iter().filter_map(Customer::wait_time)
    }

    pub fn average_wait_time(&self) -> f64 {
        mean(self.wait_times())
    }

    pub fn max_wait_time(&self) -> f64 {
        self.wait_times().reduce(f64::max).unwrap_or(0.0)
    }

    pub fn min_wait_time(&self) -> f64 {
        self.wait_times().reduce(f64::min).unwrap_or(0.0)
    }

    pub fn wait_time_by_priority(&self) -> BTreeMap<PriorityClass, f64> {
        PriorityClass::ALL
            .iter()
            .map(|class| {
                let waits = self
                    .served
                    .iter()
                    .filter(|customer| customer.priority == *class)
                    .filter_map(Customer::wait_time);
                (*class, mean(waits))
            })
            .collect()
    }

    pub fn served_by_priority(&self) -> BTreeMap<PriorityClass, usize> {
        PriorityClass::ALL
            .iter()
            .map(|class| {
                let count = self
                    .served
                    .iter()
                    .filter(|customer| customer.priority == *class)
                    .count();
                (*class, count)
            })
            .collect()
    }

    pub fn average_service_time(&self) -> f64 {
        mean(self.served.iter().filter_map(Customer::service_duration))
    }

    pub fn average_total_time(&self) -> f64 {
        mean(self.served.iter().filter_map(Customer::total_time))
    }

    /// Area under the queue-length step function divided by the sampled span.
    pub fn average_queue_length(&self) -> f64 {
        let mut area = 0.0;
        let mut span = 0.0;
        for pair in self.queue_samples.windows(2) {
            let duration = pair[1].time - pair[0].time;
            area += pair[0].length as f64 * duration;
            span += duration;
        }
        if span > 0.0 {
            area / span
        } else {
            0.0
        }
    }

    pub fn max_queue_length(&self) -> usize {
        self.queue_samples
            .iter()
            .map(|sample| sample.length)
            .max()
            .unwrap_or(0)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| {
        (sum + value, count + 1)
    });
    ratio(sum, count)
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator / denominator as f64
    }
}
