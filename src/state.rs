use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::PriorityClass;
use crate::teller::TellerId;

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub metadata: RunMetadata,
    pub customers: CustomerSummary,
    pub wait: WaitSummary,
    pub service: ServiceSummary,
    pub queue: QueueSummary,
    pub tellers: Vec<TellerSummary>,
    pub average_utilization: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunMetadata {
    pub policy: String,
    pub seed: Option<u64>,
    pub teller_count: usize,
    pub run_duration: f64,
    /// Simulation time of the last processed event.
    pub elapsed: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct CustomerSummary {
    pub arrivals: u64,
    pub served: usize,
    pub abandoned: usize,
    pub turned_away: u64,
    pub abandonment_rate: f64,
    pub served_by_priority: BTreeMap<PriorityClass, usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct WaitSummary {
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub by_priority: BTreeMap<PriorityClass, f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ServiceSummary {
    pub average_service_time: f64,
    pub average_total_time: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct QueueSummary {
    pub average_length: f64,
    pub max_length: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct TellerSummary {
    pub id: TellerId,
    pub efficiency: f64,
    pub busy_time: f64,
    pub utilization: f64,
    pub customers_served: u32,
}
