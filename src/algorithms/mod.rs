mod idle_longest;
mod priority_biased;

use crate::models::{AssignmentPolicy, PriorityClass};
use crate::teller::{Teller, TellerId};

pub use idle_longest::IdleLongestStrategy;
pub use priority_biased::PriorityBiasedStrategy;

/// Chooses which free teller serves the customer at the head of the waiting line.
pub trait AssignmentStrategy {
    /// Returns `None` only when no teller in the context is available.
    fn pick(&mut self, ctx: &SelectionContext) -> Option<TellerId>;
}

pub struct SelectionContext<'a> {
    pub tellers: &'a [Teller],
    pub priority: PriorityClass,
}

impl<'a> SelectionContext<'a> {
    pub fn available(&self) -> impl Iterator<Item = &'a Teller> {
        self.tellers.iter().filter(|teller| teller.is_available())
    }
}

pub fn build_strategy(policy: AssignmentPolicy) -> Box<dyn AssignmentStrategy> {
    match policy {
        AssignmentPolicy::IdleLongest => Box::new(IdleLongestStrategy),
        AssignmentPolicy::PriorityBiased => Box::new(PriorityBiasedStrategy),
    }
}

#[cfg(test)]
pub(crate) fn teller_at(
    id: TellerId,
    efficiency: f64,
    busy_time: f64,
    idle_since: Option<f64>,
) -> Teller {
    use crate::customer::Customer;

    let mut teller = Teller::new(id, efficiency);
    teller.busy_time = busy_time;
    if idle_since.is_none() {
        let customer = Customer::new(
            1_000 + id as u64,
            0.0,
            PriorityClass::Regular,
            1.0,
            f64::INFINITY,
        );
        teller
            .start_service(customer, 0.0)
            .expect("fresh teller should accept a customer");
    }
    teller.idle_since = idle_since;
    teller
}
