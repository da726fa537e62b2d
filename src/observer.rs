//! Listener hooks invoked synchronously by the engine.

use crate::customer::Customer;
use crate::teller::Teller;

/// Callbacks fired by [`SimulationEngine`][crate::engine::SimulationEngine] as
/// customers move through the facility.
///
/// Observers only ever see shared references, so they can record what happened
/// but cannot change the simulation. Registered observers run in registration
/// order. Every method defaults to a no-op.
pub trait SimObserver {
    /// Called for every arrival, whether or not the customer was admitted.
    fn on_arrival(&mut self, _customer: &Customer, _admitted: bool) {}

    fn on_service_start(&mut self, _teller: &Teller, _customer: &Customer) {}

    fn on_service_complete(&mut self, _teller: &Teller, _customer: &Customer) {}

    fn on_abandon(&mut self, _customer: &Customer) {}
}

/// A [`SimObserver`] that ignores everything.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
