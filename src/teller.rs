use crate::customer::Customer;
use crate::error::{Error, Result};

pub type TellerId = usize;

#[derive(Clone, Debug)]
pub struct Teller {
    pub id: TellerId,
    /// Service-rate multiplier: 2.0 serves twice as fast as nominal.
    pub efficiency: f64,
    current_customer: Option<Customer>,
    pub busy_time: f64,
    /// Set exactly while the teller has no customer.
    pub idle_since: Option<f64>,
    pub customers_served: u32,
}

impl Teller {
    pub fn new(id: TellerId, efficiency: f64) -> Self {
        Self {
            id,
            efficiency,
            current_customer: None,
            busy_time: 0.0,
            idle_since: Some(0.0),
            customers_served: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        self.current_customer.is_none()
    }

    pub fn current_customer(&self) -> Option<&Customer> {
        self.current_customer.as_ref()
    }

    pub fn service_duration(&self, customer: &Customer) -> f64 {
        customer.service_time_required / self.efficiency
    }

    /// Takes `customer` into service and returns the completion time. Scheduling the
    /// completion is left to the caller.
    pub fn start_service(&mut self, mut customer: Customer, now: f64) -> Result<f64> {
        if !self.is_available() {
            return Err(Error::InvalidState {
                teller_id: self.id,
                reason: "is already serving a customer",
            });
        }

        customer.service_start_time = Some(now);
        let completion_time = now + self.service_duration(&customer);
        self.current_customer = Some(customer);
        self.idle_since = None;
        Ok(completion_time)
    }

    pub fn complete_service(&mut self, now: f64) -> Result<Customer> {
        let mut customer = self.current_customer.take().ok_or(Error::InvalidState {
            teller_id: self.id,
            reason: "has no customer to complete",
        })?;

        customer.service_end_time = Some(now);
        let started = customer.service_start_time.unwrap_or(now);
        self.busy_time += now - started;
        self.customers_served += 1;
        self.idle_since = Some(now);
        Ok(customer)
    }

    pub fn utilization(&self, elapsed: f64) -> f64 {
        let ratio = self.busy_time / elapsed;
        if elapsed <= 0.0 || !ratio.is_finite() {
            return 0.0;
        }
        ratio.clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, Default)]
pub struct TellerPool {
    tellers: Vec<Teller>,
}

impl TellerPool {
    pub fn new(efficiencies: &[f64]) -> Self {
        Self {
            tellers: efficiencies
                .iter()
                .enumerate()
                .map(|(id, efficiency)| Teller::new(id, *efficiency))
                .collect(),
        }
    }

    pub fn tellers(&self) -> &[Teller] {
        &self.tellers
    }

    pub fn get(&self, id: TellerId) -> Result<&Teller> {
        self.tellers.get(id).ok_or(Error::UnknownTeller(id))
    }

    pub fn available_tellers(&self) -> Vec<&Teller> {
        self.tellers
            .iter()
            .filter(|teller| teller.is_available())
            .collect()
    }

    pub fn has_available(&self) -> bool {
        self.tellers.iter().any(Teller::is_available)
    }

    pub fn busy_count(&self) -> usize {
        self.tellers
            .iter()
            .filter(|teller| !teller.is_available())
            .count()
    }

    /// Restarts the idle clock of every free teller.
    pub fn mark_idle_since(&mut self, now: f64) {
        for teller in self.tellers.iter_mut().filter(|teller| teller.is_available()) {
            teller.idle_since = Some(now);
        }
    }

    pub fn start_service(&mut self, id: TellerId, customer: Customer, now: f64) -> Result<f64> {
        self.teller_mut(id)?.start_service(customer, now)
    }

    pub fn complete_service(&mut self, id: TellerId, now: f64) -> Result<Customer> {
        self.teller_mut(id)?.complete_service(now)
    }

    pub fn len(&self) -> usize {
        self.tellers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tellers.is_empty()
    }

    fn teller_mut(&mut self, id: TellerId) -> Result<&mut Teller> {
        self.tellers.get_mut(id).ok_or(Error::UnknownTeller(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriorityClass;

    fn customer(id: u64, service: f64) -> Customer {
        Customer::new(id, 0.0, PriorityClass::Regular, service, f64::INFINITY)
    }

    #[test]
    fn efficiency_scales_service_time() {
        let mut teller = Teller::new(0, 2.0);
        let completion = teller.start_service(customer(1, 10.0), 3.0).unwrap();
        assert_eq!(completion, 8.0);
        assert!(!teller.is_available());
        assert_eq!(teller.idle_since, None);
        assert_eq!(teller.current_customer().and_then(|c| c.service_start_time), Some(3.0));
    }

    #[test]
    fn starting_on_a_busy_teller_fails() {
        let mut teller = Teller::new(0, 1.0);
        teller.start_service(customer(1, 5.0), 0.0).unwrap();
        let err = teller.start_service(customer(2, 5.0), 1.0).unwrap_err();
        assert!(matches!(err, Error::InvalidState { teller_id: 0, .. }));
        assert_eq!(teller.current_customer().map(|c| c.id), Some(1));
    }

    #[test]
    fn completing_on_an_idle_teller_fails() {
        let mut teller = Teller::new(3, 1.0);
        let err = teller.complete_service(1.0).unwrap_err();
        assert_eq!(err.to_string(), "invalid state: teller 3 has no customer to complete");
    }

    #[test]
    fn completion_accumulates_busy_time() {
        let mut teller = Teller::new(0, 1.0);
        teller.start_service(customer(1, 5.0), 2.0).unwrap();
        let served = teller.complete_service(7.0).unwrap();

        assert_eq!(served.service_start_time, Some(2.0));
        assert_eq!(served.service_end_time, Some(7.0));
        assert_eq!(teller.busy_time, 5.0);
        assert_eq!(teller.idle_since, Some(7.0));
        assert_eq!(teller.customers_served, 1);
        assert!(teller.is_available());
        assert_eq!(teller.utilization(10.0), 0.5);
    }

    #[test]
    fn utilization_guards_degenerate_ratios() {
        let mut teller = Teller::new(0, 1.0);
        assert_eq!(teller.utilization(0.0), 0.0);

        teller.busy_time = f64::INFINITY;
        assert_eq!(teller.utilization(f64::INFINITY), 0.0);
    }

    #[test]
    fn pool_filters_available_tellers() {
        let mut pool = TellerPool::new(&[1.0, 1.5, 0.8]);
        pool.start_service(1, customer(1, 3.0), 0.0).unwrap();

        let ids: Vec<TellerId> = pool.available_tellers().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert_eq!(pool.busy_count(), 1);
        assert!(matches!(
            pool.complete_service(9, 1.0),
            Err(Error::UnknownTeller(9))
        ));
    }

    #[test]
    fn mark_idle_since_skips_busy_tellers() {
        let mut pool = TellerPool::new(&[1.0, 1.0]);
        pool.start_service(0, customer(1, 3.0), 0.0).unwrap();
        pool.mark_idle_since(4.0);

        assert_eq!(pool.get(0).unwrap().idle_since, None);
        assert_eq!(pool.get(1).unwrap().idle_since, Some(4.0));
    }
}
