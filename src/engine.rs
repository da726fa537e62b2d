use log::{info, trace};

use crate::algorithms::{build_strategy, AssignmentStrategy};
use crate::customer::CustomerId;
use crate::error::{Error, Result};
use crate::events::{EventKind, ScheduledEvent, Timeline};
use crate::facility::Facility;
use crate::generators::{build_source, CustomerSource};
use crate::models::{ArrivalProfile, PriorityClass, SimConfig};
use crate::observer::SimObserver;
use crate::queue::WaitingLine;
use crate::state::{
    CustomerSummary, QueueSummary, RunMetadata, ServiceSummary, SimulationReport, TellerSummary,
    WaitSummary,
};
use crate::stats::SimulationStatistics;
use crate::teller::{TellerId, TellerPool};

/// Headroom for floating-point noise when summing class probabilities.
const PROBABILITY_EPSILON: f64 = 1e-9;

pub struct SimulationEngine {
    config: SimConfig,
    timeline: Timeline,
    facility: Facility,
    source: Box<dyn CustomerSource>,
    stats: SimulationStatistics,
    observers: Vec<Box<dyn SimObserver>>,
    now: f64,
    next_customer_id: CustomerId,
    initialized: bool,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Result<Self> {
        validate_config(&config)?;
        let strategy = build_strategy(config.assignment_policy);
        let source = build_source(&config)?;
        Ok(Self::assemble(config, strategy, source))
    }

    /// Builds an engine around a caller-supplied assignment strategy and arrival source.
    pub fn with_parts(
        config: SimConfig,
        strategy: Box<dyn AssignmentStrategy>,
        source: Box<dyn CustomerSource>,
    ) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self::assemble(config, strategy, source))
    }

    fn assemble(
        config: SimConfig,
        strategy: Box<dyn AssignmentStrategy>,
        source: Box<dyn CustomerSource>,
    ) -> Self {
        let facility = Facility::new(
            TellerPool::new(&config.efficiencies()),
            WaitingLine::new(config.queue_capacity),
            strategy,
        );

        Self {
            config,
            timeline: Timeline::new(),
            facility,
            source,
            stats: SimulationStatistics::new(),
            observers: Vec::new(),
            now: 0.0,
            next_customer_id: 0,
            initialized: false,
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn SimObserver>) {
        self.observers.push(observer);
    }

    /// Schedules opening, the first arrival and closing. Runs once; later calls do nothing.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;

        info!(
            "starting run: {} tellers, duration {}, policy {}",
            self.config.teller_count, self.config.run_duration, self.config.assignment_policy
        );
        self.timeline.schedule(0.0, EventKind::FacilityOpen)?;
        self.schedule_next_arrival()?;
        self.timeline
            .schedule(self.config.run_duration, EventKind::FacilityClose)?;
        Ok(())
    }

    /// Processes exactly one event. Returns `None` once the timeline has drained.
    pub fn step(&mut self) -> Result<Option<ScheduledEvent>> {
        self.initialize()?;
        let event = match self.timeline.pop() {
            Some(event) => event,
            None => return Ok(None),
        };
        self.now = event.time;
        trace!("t={:.3} seq={} {:?}", event.time, event.sequence, event.kind);

        self.handle_abandonments();
        self.apply_aging();

        match event.kind {
            EventKind::FacilityOpen => {
                self.facility.open(self.now)?;
                self.stats
                    .record_queue_length(self.now, self.facility.queue_len());
            }
            EventKind::FacilityClose => self.facility.close(),
            EventKind::CustomerArrival => self.handle_arrival()?,
            EventKind::ServiceComplete { teller_id } => {
                self.handle_service_complete(teller_id)?
            }
        }

        Ok(Some(event))
    }

    /// Runs until no events remain and returns the final report.
    pub fn run(&mut self) -> Result<SimulationReport> {
        self.initialize()?;
        while self.step()?.is_some() {}

        self.stats
            .record_queue_length(self.now, self.facility.queue_len());
        info!(
            "run finished at {:.3}: {} served, {} abandoned, {} turned away",
            self.now,
            self.stats.total_served(),
            self.stats.total_abandoned(),
            self.facility.turned_away()
        );
        Ok(self.report())
    }

    pub fn report(&self) -> SimulationReport {
        let elapsed = self.now;
        let tellers = self
            .facility
            .tellers()
            .tellers()
            .iter()
            .map(|teller| TellerSummary {
                id: teller.id,
                efficiency: teller.efficiency,
                busy_time: teller.busy_time,
                utilization: teller.utilization(elapsed),
                customers_served: teller.customers_served,
            })
            .collect::<Vec<_>>();
        let average_utilization = if tellers.is_empty() {
            0.0
        } else {
            tellers.iter().map(|teller| teller.utilization).sum::<f64>() / tellers.len() as f64
        };

        SimulationReport {
            metadata: RunMetadata {
                policy: self.config.assignment_policy.to_string(),
                seed: self.config.random_seed,
                teller_count: self.config.teller_count,
                run_duration: self.config.run_duration,
                elapsed,
            },
            customers: CustomerSummary {
                arrivals: self.facility.arrivals(),
                served: self.stats.total_served(),
                abandoned: self.stats.total_abandoned(),
                turned_away: self.facility.turned_away(),
                abandonment_rate: self.stats.abandonment_rate(),
                served_by_priority: self.stats.served_by_priority(),
            },
            wait: WaitSummary {
                average: self.stats.average_wait_time(),
                max: self.stats.max_wait_time(),
                min: self.stats.min_wait_time(),
                by_priority: self.stats.wait_time_by_priority(),
            },
            service: ServiceSummary {
                average_service_time: self.stats.average_service_time(),
                average_total_time: self.stats.average_total_time(),
            },
            queue: QueueSummary {
                average_length: self.stats.average_queue_length(),
                max_length: self.stats.max_queue_length(),
            },
            tellers,
            average_utilization,
        }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn statistics(&self) -> &SimulationStatistics {
        &self.stats
    }

    pub fn facility(&self) -> &Facility {
        &self.facility
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    fn schedule_next_arrival(&mut self) -> Result<()> {
        if let Some(time) = self.source.next_arrival_time(self.now) {
            if time < self.config.run_duration {
                self.timeline.schedule(time, EventKind::CustomerArrival)?;
            }
        }
        Ok(())
    }

    fn handle_arrival(&mut self) -> Result<()> {
        self.next_customer_id += 1;
        let customer = self.source.next_customer(self.next_customer_id, self.now);
        let snapshot = customer.clone();
        let admitted = self.facility.accept_arrival(customer);
        for observer in self.observers.iter_mut() {
            observer.on_arrival(&snapshot, admitted);
        }

        if admitted {
            self.stats
                .record_queue_length(self.now, self.facility.queue_len());
            self.start_waiting_customers()?;
        }

        self.schedule_next_arrival()
    }

    fn handle_service_complete(&mut self, teller_id: TellerId) -> Result<()> {
        let customer = self.facility.complete_service(teller_id, self.now)?;
        let teller = self.facility.tellers().get(teller_id)?;
        for observer in self.observers.iter_mut() {
            observer.on_service_complete(teller, &customer);
        }
        self.stats.record_served(customer);

        self.start_waiting_customers()
    }

    fn start_waiting_customers(&mut self) -> Result<()> {
        let started = self.facility.assign_waiting(self.now)?;
        if started.is_empty() {
            return Ok(());
        }

        for start in &started {
            self.timeline.schedule(
                start.completion_time,
                EventKind::ServiceComplete {
                    teller_id: start.teller_id,
                },
            )?;
            let teller = self.facility.tellers().get(start.teller_id)?;
            if let Some(customer) = teller.current_customer() {
                for observer in self.observers.iter_mut() {
                    observer.on_service_start(teller, customer);
                }
            }
        }

        self.stats
            .record_queue_length(self.now, self.facility.queue_len());
        Ok(())
    }

    fn handle_abandonments(&mut self) {
        let abandoned = self.facility.process_abandonments(self.now);
        if abandoned.is_empty() {
            return;
        }

        for customer in abandoned {
            for observer in self.observers.iter_mut() {
                observer.on_abandon(&customer);
            }
            self.stats.record_abandoned(customer);
        }
        self.stats
            .record_queue_length(self.now, self.facility.queue_len());
    }

    fn apply_aging(&mut self) {
        if let Some(aging) = self.config.priority_aging {
            self.facility.promote_waiting(self.now, &aging);
        }
    }
}

pub fn run_simulation(config: &SimConfig) -> Result<SimulationReport> {
    let mut engine = SimulationEngine::new(config.clone())?;
    engine.run()
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

pub fn validate_config(config: &SimConfig) -> Result<()> {
    if config.teller_count == 0 {
        return Err(Error::NoTellers);
    }
    if let Some(efficiencies) = &config.teller_efficiencies {
        if efficiencies.len() != config.teller_count {
            return Err(Error::EfficiencyCountMismatch {
                expected: config.teller_count,
                actual: efficiencies.len(),
            });
        }
        if let Some(bad) = efficiencies.iter().find(|value| !positive(**value)) {
            return Err(Error::InvalidEfficiency(*bad));
        }
    }

    if !positive(config.run_duration) {
        return Err(Error::InvalidDuration(config.run_duration));
    }
    if !positive(config.mean_arrival_interval) {
        return Err(Error::InvalidArrivalInterval(config.mean_arrival_interval));
    }
    if !positive(config.mean_service_time) {
        return Err(Error::InvalidServiceTime(config.mean_service_time));
    }
    if !non_negative(config.service_time_variance) {
        return Err(Error::InvalidVariance {
            name: "service_time_variance",
            value: config.service_time_variance,
        });
    }
    // infinite patience is allowed and means nobody abandons
    if config.mean_patience.is_nan() || config.mean_patience <= 0.0 {
        return Err(Error::InvalidPatience(config.mean_patience));
    }
    if !non_negative(config.patience_variance) {
        return Err(Error::InvalidVariance {
            name: "patience_variance",
            value: config.patience_variance,
        });
    }

    let distribution = &config.priority_distribution;
    let regular = distribution
        .regular
        .map(|value| (PriorityClass::Regular, value));
    for (class, value) in distribution.explicit().into_iter().chain(regular) {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidProbability {
                class: class.to_string(),
                value,
            });
        }
    }
    let total = distribution.total();
    if total > 1.0 + PROBABILITY_EPSILON {
        return Err(Error::PriorityDistributionSum(total));
    }

    if let Some(aging) = &config.priority_aging {
        if !positive(aging.threshold) {
            return Err(Error::InvalidAgingThreshold(aging.threshold));
        }
        if !non_negative(aging.patience_bonus) {
            return Err(Error::InvalidAgingBonus(aging.patience_bonus));
        }
    }

    if let ArrivalProfile::Scripted { customers } = &config.arrivals {
        let mut previous = 0.0;
        for (index, arrival) in customers.iter().enumerate() {
            let reason = if !non_negative(arrival.time) {
                Some("time must be finite and >= 0")
            } else if arrival.time < previous {
                Some("times must be non-decreasing")
            } else if !positive(arrival.service_time) {
                Some("service_time must be > 0")
            } else if matches!(arrival.patience, Some(p) if p.is_nan() || p <= 0.0) {
                Some("patience must be > 0")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(Error::InvalidScriptedArrival {
                    index,
                    reason: reason.to_string(),
                });
            }
            previous = arrival.time;
        }
    }

    Ok(())
}
