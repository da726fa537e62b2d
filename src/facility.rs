use log::debug;

use crate::algorithms::{AssignmentStrategy, SelectionContext};
use crate::customer::{Customer, CustomerId};
use crate::error::{Error, Result};
use crate::models::PriorityAging;
use crate::queue::WaitingLine;
use crate::teller::{TellerId, TellerPool};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FacilityState {
    /// Not yet opened.
    Closed,
    Open,
    /// Closed for the rest of the run.
    ClosedForDay,
}

/// A customer handed to a teller by [`Facility::assign_waiting`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServiceStart {
    pub teller_id: TellerId,
    pub customer_id: CustomerId,
    pub completion_time: f64,
}

/// Owns the tellers and the waiting line, and is the only thing that mutates them.
pub struct Facility {
    tellers: TellerPool,
    line: WaitingLine,
    strategy: Box<dyn AssignmentStrategy>,
    state: FacilityState,
    arrivals: u64,
    turned_away: u64,
}

impl Facility {
    pub fn new(
        tellers: TellerPool,
        line: WaitingLine,
        strategy: Box<dyn AssignmentStrategy>,
    ) -> Self {
        Self {
            tellers,
            line,
            strategy,
            state: FacilityState::Closed,
            arrivals: 0,
            turned_away: 0,
        }
    }

    pub fn open(&mut self, now: f64) -> Result<()> {
        match self.state {
            FacilityState::ClosedForDay => Err(Error::FacilityReopened),
            FacilityState::Open => Ok(()),
            FacilityState::Closed => {
                self.state = FacilityState::Open;
                self.tellers.mark_idle_since(now);
                debug!("facility opened at {:.3}", now);
                Ok(())
            }
        }
    }

    /// Stops admitting arrivals. Customers already queued or in service stay.
    pub fn close(&mut self) {
        if self.state != FacilityState::ClosedForDay {
            debug!(
                "facility closed with {} waiting and {} in service",
                self.line.len(),
                self.tellers.busy_count()
            );
        }
        self.state = FacilityState::ClosedForDay;
    }

    pub fn is_open(&self) -> bool {
        self.state == FacilityState::Open
    }

    pub fn state(&self) -> FacilityState {
        self.state
    }

    /// Queues the customer, or turns them away when closed or when the line is full.
    pub fn accept_arrival(&mut self, customer: Customer) -> bool {
        self.arrivals += 1;
        let id = customer.id;

        if !self.is_open() {
            self.turned_away += 1;
            debug!("customer {} turned away: facility closed", id);
            return false;
        }
        if !self.line.add(customer) {
            self.turned_away += 1;
            debug!("customer {} turned away: line full", id);
            return false;
        }
        true
    }

    /// Hands waiting customers to free tellers until one side runs out.
    pub fn assign_waiting(&mut self, now: f64) -> Result<Vec<ServiceStart>> {
        let mut started = Vec::new();

        while let Some(priority) = self.line.peek().map(|customer| customer.priority) {
            if !self.tellers.has_available() {
                break;
            }
            let ctx = SelectionContext {
                tellers: self.tellers.tellers(),
                priority,
            };
            let teller_id = match self.strategy.pick(&ctx) {
                Some(id) => id,
                None => break,
            };
            let customer = match self.line.pop_highest_priority() {
                Some(customer) => customer,
                None => break,
            };
            let customer_id = customer.id;
            let completion_time = self.tellers.start_service(teller_id, customer, now)?;
            debug!(
                "teller {} serving customer {} ({}) until {:.3}",
                teller_id, customer_id, priority, completion_time
            );
            started.push(ServiceStart {
                teller_id,
                customer_id,
                completion_time,
            });
        }

        Ok(started)
    }

    pub fn complete_service(&mut self, teller_id: TellerId, now: f64) -> Result<Customer> {
        let customer = self.tellers.complete_service(teller_id, now)?;
        debug!("teller {} finished customer {}", teller_id, customer.id);
        Ok(customer)
    }

    pub fn process_abandonments(&mut self, now: f64) -> Vec<Customer> {
        let abandoned = self.line.scan_and_evict(now);
        for customer in &abandoned {
            debug!(
                "customer {} abandoned after waiting {:.3}",
                customer.id,
                now - customer.arrival_time
            );
        }
        abandoned
    }

    /// Promotes every waiting customer who has spent `aging.threshold` in their class.
    pub fn promote_waiting(&mut self, now: f64, aging: &PriorityAging) -> Vec<CustomerId> {
        let due: Vec<(CustomerId, _)> = self
            .line
            .iter()
            .filter(|customer| now - customer.priority_since >= aging.threshold)
            .filter_map(|customer| customer.priority.promoted().map(|next| (customer.id, next)))
            .collect();

        due.into_iter()
            .filter(|(id, next)| self.line.upgrade(*id, *next, aging.patience_bonus, now))
            .map(|(id, next)| {
                debug!("customer {} promoted to {}", id, next);
                id
            })
            .collect()
    }

    pub fn tellers(&self) -> &TellerPool {
        &self.tellers
    }

    pub fn line(&self) -> &WaitingLine {
        &self.line
    }

    pub fn queue_len(&self) -> usize {
        self.line.len()
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn turned_away(&self) -> u64 {
        self.turned_away
    }
}
