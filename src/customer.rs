use crate::models::PriorityClass;

pub type CustomerId = u64;

#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: CustomerId,
    pub arrival_time: f64,
    pub priority: PriorityClass,
    /// Nominal service demand before the teller's efficiency is applied.
    pub service_time_required: f64,
    /// Longest tolerable wait; `f64::INFINITY` never abandons.
    pub patience: f64,
    pub service_start_time: Option<f64>,
    pub service_end_time: Option<f64>,
    pub abandoned: bool,
    /// When the customer entered its current class; reset by promotions.
    pub priority_since: f64,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        arrival_time: f64,
        priority: PriorityClass,
        service_time_required: f64,
        patience: f64,
    ) -> Self {
        Self {
            id,
            arrival_time,
            priority,
            service_time_required,
            patience,
            service_start_time: None,
            service_end_time: None,
            abandoned: false,
            priority_since: arrival_time,
        }
    }

    pub fn wait_time(&self) -> Option<f64> {
        self.service_start_time
            .map(|started| started - self.arrival_time)
    }

    pub fn service_duration(&self) -> Option<f64> {
        match (self.service_start_time, self.service_end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    pub fn total_time(&self) -> Option<f64> {
        self.service_end_time.map(|ended| ended - self.arrival_time)
    }

    pub fn should_abandon(&self, now: f64) -> bool {
        if self.service_start_time.is_some() {
            return false;
        }
        now - self.arrival_time > self.patience
    }
}
