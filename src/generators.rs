use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal};
use std::collections::VecDeque;

use crate::customer::{Customer, CustomerId};
use crate::error::{Error, Result};
use crate::models::{ArrivalProfile, PriorityClass, ScriptedArrival, SimConfig};

/// Floor for sampled service times and patience.
pub const DURATION_FLOOR: f64 = 1.0;
/// Floor for inter-arrival gaps so the clock always moves forward.
pub const MIN_ARRIVAL_INTERVAL: f64 = 1e-9;

/// Supplies arrival times and the customers who arrive at them.
pub trait CustomerSource {
    /// Time of the next arrival after `now`, or `None` once the source is exhausted.
    fn next_arrival_time(&mut self, now: f64) -> Option<f64>;

    fn next_customer(&mut self, id: CustomerId, now: f64) -> Customer;
}

pub fn build_source(config: &SimConfig) -> Result<Box<dyn CustomerSource>> {
    match &config.arrivals {
        ArrivalProfile::Random => Ok(Box::new(RandomCustomers::new(config)?)),
        ArrivalProfile::Scripted { customers } => {
            Ok(Box::new(ScriptedCustomers::new(customers.clone())))
        }
    }
}

/// Stochastic arrivals: exponential gaps, Gaussian service time and patience, and a
/// class drawn against the cumulative priority distribution. Owns its generator.
pub struct RandomCustomers {
    rng: StdRng,
    arrival: Exp<f64>,
    service: Normal<f64>,
    patience: Option<Normal<f64>>,
    priority_thresholds: Vec<(PriorityClass, f64)>,
}

impl RandomCustomers {
    pub fn new(config: &SimConfig) -> Result<Self> {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &SimConfig, rng: StdRng) -> Result<Self> {
        let arrival = Exp::new(1.0 / config.mean_arrival_interval)
            .map_err(|_| Error::InvalidArrivalInterval(config.mean_arrival_interval))?;
        let service = Normal::new(config.mean_service_time, config.service_time_variance)
            .map_err(|_| Error::InvalidVariance {
                name: "service_time_variance",
                value: config.service_time_variance,
            })?;
        let patience = if config.mean_patience.is_infinite() {
            None
        } else {
            Some(
                Normal::new(config.mean_patience, config.patience_variance).map_err(|_| {
                    Error::InvalidVariance {
                        name: "patience_variance",
                        value: config.patience_variance,
                    }
                })?,
            )
        };

        Ok(Self {
            rng,
            arrival,
            service,
            patience,
            priority_thresholds: config.priority_distribution.cumulative(),
        })
    }

    pub fn arrival_interval(&mut self) -> f64 {
        self.arrival.sample(&mut self.rng).max(MIN_ARRIVAL_INTERVAL)
    }

    pub fn service_time(&mut self) -> f64 {
        self.service.sample(&mut self.rng).max(DURATION_FLOOR)
    }

    pub fn patience(&mut self) -> f64 {
        match &self.patience {
            Some(distribution) => distribution.sample(&mut self.rng).max(DURATION_FLOOR),
            None => f64::INFINITY,
        }
    }

    pub fn priority(&mut self) -> PriorityClass {
        let draw: f64 = self.rng.gen();
        self.priority_thresholds
            .iter()
            .find(|(_, threshold)| draw < *threshold)
            .map(|(class, _)| *class)
            .unwrap_or(PriorityClass::Regular)
    }
}

impl CustomerSource for RandomCustomers {
    fn next_arrival_time(&mut self, now: f64) -> Option<f64> {
        Some(now + self.arrival_interval())
    }

    fn next_customer(&mut self, id: CustomerId, now: f64) -> Customer {
        let priority = self.priority();
        let service_time = self.service_time();
        let patience = self.patience();
        Customer::new(id, now, priority, service_time, patience)
    }
}

/// Replays a fixed list of arrivals, in the order given.
#[derive(Debug, Default)]
pub struct ScriptedCustomers {
    pending: VecDeque<ScriptedArrival>,
}

impl ScriptedCustomers {
    pub fn new(arrivals: Vec<ScriptedArrival>) -> Self {
        Self {
            pending: arrivals.into(),
        }
    }
}

impl CustomerSource for ScriptedCustomers {
    fn next_arrival_time(&mut self, now: f64) -> Option<f64> {
        self.pending.front().map(|arrival| arrival.time.max(now))
    }

    fn next_customer(&mut self, id: CustomerId, now: f64) -> Customer {
        match self.pending.pop_front() {
            Some(arrival) => Customer::new(
                id,
                now,
                arrival.priority,
                arrival.service_time,
                arrival.patience.unwrap_or(f64::INFINITY),
            ),
            None => Customer::new(id, now, PriorityClass::Regular, DURATION_FLOOR, f64::INFINITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriorityDistribution;

    fn seeded(config: &SimConfig, seed: u64) -> RandomCustomers {
        RandomCustomers::with_rng(config, StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn same_seed_same_customers() {
        let config = SimConfig::default();
        let mut a = seeded(&config, 42);
        let mut b = seeded(&config, 42);

        for id in 0..50 {
            assert_eq!(a.arrival_interval(), b.arrival_interval());
            assert_eq!(a.next_customer(id, 0.0), b.next_customer(id, 0.0));
        }
    }

    #[test]
    fn sampled_durations_respect_floors() {
        let config = SimConfig {
            mean_service_time: 0.5,
            service_time_variance: 3.0,
            mean_patience: 0.5,
            patience_variance: 3.0,
            mean_arrival_interval: 0.001,
            ..SimConfig::default()
        };
        let mut source = seeded(&config, 7);

        for _ in 0..500 {
            assert!(source.service_time() >= DURATION_FLOOR);
            assert!(source.patience() >= DURATION_FLOOR);
            assert!(source.arrival_interval() >= MIN_ARRIVAL_INTERVAL);
        }
    }

    #[test]
    fn infinite_mean_patience_never_abandons() {
        let config = SimConfig {
            mean_patience: f64::INFINITY,
            ..SimConfig::default()
        };
        let mut source = seeded(&config, 1);
        assert!(source.patience().is_infinite());
    }

    #[test]
    fn degenerate_distribution_always_picks_one_class() {
        let config = SimConfig {
            priority_distribution: PriorityDistribution {
                vip: 1.0,
                elderly: 0.0,
                appointment: 0.0,
                regular: None,
            },
            ..SimConfig::default()
        };
        let mut source = seeded(&config, 3);
        assert!((0..100).all(|_| source.priority() == PriorityClass::Vip));

        let config = SimConfig {
            priority_distribution: PriorityDistribution {
                vip: 0.0,
                elderly: 0.0,
                appointment: 0.0,
                regular: None,
            },
            ..SimConfig::default()
        };
        let mut source = seeded(&config, 3);
        assert!((0..100).all(|_| source.priority() == PriorityClass::Regular));
    }

    #[test]
    fn scripted_source_replays_in_order() {
        let mut source = ScriptedCustomers::new(vec![
            ScriptedArrival {
                time: 0.0,
                priority: PriorityClass::Regular,
                service_time: 5.0,
                patience: None,
            },
            ScriptedArrival {
                time: 3.0,
                priority: PriorityClass::Vip,
                service_time: 2.0,
                patience: Some(4.0),
            },
        ]);

        assert_eq!(source.next_arrival_time(0.0), Some(0.0));
        let first = source.next_customer(1, 0.0);
        assert_eq!(first.patience, f64::INFINITY);

        assert_eq!(source.next_arrival_time(0.0), Some(3.0));
        let second = source.next_customer(2, 3.0);
        assert_eq!(second.priority, PriorityClass::Vip);
        assert_eq!(second.arrival_time, 3.0);
        assert_eq!(second.patience, 4.0);

        assert_eq!(source.next_arrival_time(3.0), None);
    }
}
