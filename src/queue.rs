use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, HashMap};

use crate::customer::{Customer, CustomerId};
use crate::models::PriorityClass;

/// Ordering key: class first, then arrival time, with the id keeping keys unique.
type LineKey = (PriorityClass, OrderedFloat<f64>, CustomerId);

fn key_of(customer: &Customer) -> LineKey {
    (
        customer.priority,
        OrderedFloat(customer.arrival_time),
        customer.id,
    )
}

/// Customers who have arrived but not yet started service.
///
/// Entries live in an ordered map so the head is always the most urgent customer,
/// and any member can be pulled out without disturbing the rest of the order.
#[derive(Debug, Default)]
pub struct WaitingLine {
    entries: BTreeMap<LineKey, Customer>,
    positions: HashMap<CustomerId, LineKey>,
    capacity: Option<usize>,
}

impl WaitingLine {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: BTreeMap::new(),
            positions: HashMap::new(),
            capacity,
        }
    }

    /// Returns false when the line is full or the customer is already queued.
    pub fn add(&mut self, customer: Customer) -> bool {
        if self.is_full() || self.positions.contains_key(&customer.id) {
            return false;
        }
        self.insert(customer);
        true
    }

    pub fn pop_highest_priority(&mut self) -> Option<Customer> {
        let (key, customer) = self.entries.pop_first()?;
        self.positions.remove(&key.2);
        Some(customer)
    }

    pub fn peek(&self) -> Option<&Customer> {
        self.entries.values().next()
    }

    pub fn remove(&mut self, id: CustomerId) -> Option<Customer> {
        let key = self.positions.remove(&id)?;
        self.entries.remove(&key)
    }

    pub fn get(&self, id: CustomerId) -> Option<&Customer> {
        self.positions.get(&id).and_then(|key| self.entries.get(key))
    }

    pub fn contains(&self, id: CustomerId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Moves a waiting customer into `priority`, extending its patience by `patience_bonus`.
    pub fn upgrade(
        &mut self,
        id: CustomerId,
        priority: PriorityClass,
        patience_bonus: f64,
        now: f64,
    ) -> bool {
        match self.remove(id) {
            Some(mut customer) => {
                customer.priority = priority;
                customer.patience += patience_bonus;
                customer.priority_since = now;
                self.insert(customer);
                true
            }
            None => false,
        }
    }

    /// Removes every customer whose wait has exceeded their patience and marks them abandoned.
    /// The returned order carries no meaning.
    pub fn scan_and_evict(&mut self, now: f64) -> Vec<Customer> {
        let expired: Vec<CustomerId> = self
            .entries
            .values()
            .filter(|customer| customer.should_abandon(now))
            .map(|customer| customer.id)
            .collect();

        expired
            .into_iter()
            .filter_map(|id| self.remove(id))
            .map(|mut customer| {
                customer.abandoned = true;
                customer
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Customer> {
        self.entries.values()
    }

    pub fn counts_by_priority(&self) -> BTreeMap<PriorityClass, usize> {
        let mut counts: BTreeMap<PriorityClass, usize> =
            PriorityClass::ALL.iter().map(|class| (*class, 0)).collect();
        for customer in self.entries.values() {
            *counts.entry(customer.priority).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        match self.capacity {
            Some(capacity) => self.entries.len() >= capacity,
            None => false,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn insert(&mut self, customer: Customer) {
        let key = key_of(&customer);
        self.positions.insert(customer.id, key);
        self.entries.insert(key, customer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: CustomerId, arrival: f64, priority: PriorityClass) -> Customer {
        Customer::new(id, arrival, priority, 5.0, f64::INFINITY)
    }

    fn drain(line: &mut WaitingLine) -> Vec<CustomerId> {
        std::iter::from_fn(|| line.pop_highest_priority())
            .map(|customer| customer.id)
            .collect()
    }

    #[test]
    fn pops_by_class_then_arrival() {
        let mut line = WaitingLine::new(None);
        line.add(customer(1, 0.0, PriorityClass::Regular));
        line.add(customer(2, 1.0, PriorityClass::Vip));
        line.add(customer(3, 2.0, PriorityClass::Elderly));
        line.add(customer(4, 0.5, PriorityClass::Vip));
        line.add(customer(5, 0.1, PriorityClass::Regular));

        assert_eq!(drain(&mut line), vec![4, 2, 3, 1, 5]);
    }

    #[test]
    fn equal_keys_fall_back_to_id() {
        let mut line = WaitingLine::new(None);
        line.add(customer(7, 1.0, PriorityClass::Regular));
        line.add(customer(3, 1.0, PriorityClass::Regular));

        assert_eq!(line.len(), 2);
        assert_eq!(drain(&mut line), vec![3, 7]);
    }

    #[test]
    fn rejects_when_capacity_reached() {
        let mut line = WaitingLine::new(Some(1));
        assert!(line.add(customer(1, 0.0, PriorityClass::Regular)));
        assert!(line.is_full());
        assert!(!line.add(customer(2, 1.0, PriorityClass::Vip)));
        assert_eq!(line.len(), 1);
    }

    #[test]
    fn zero_capacity_rejects_everyone() {
        let mut line = WaitingLine::new(Some(0));
        assert!(!line.add(customer(1, 0.0, PriorityClass::Vip)));
        assert!(line.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut line = WaitingLine::new(None);
        assert!(line.add(customer(1, 0.0, PriorityClass::Regular)));
        assert!(!line.add(customer(1, 3.0, PriorityClass::Vip)));
        assert_eq!(line.len(), 1);
    }

    #[test]
    fn removes_arbitrary_members() {
        let mut line = WaitingLine::new(None);
        line.add(customer(1, 0.0, PriorityClass::Regular));
        line.add(customer(2, 1.0, PriorityClass::Regular));
        line.add(customer(3, 2.0, PriorityClass::Regular));

        assert_eq!(line.remove(2).map(|c| c.id), Some(2));
        assert!(line.remove(2).is_none());
        assert!(!line.contains(2));
        assert_eq!(drain(&mut line), vec![1, 3]);
    }

    #[test]
    fn upgrade_relocates_customer() {
        let mut line = WaitingLine::new(None);
        line.add(customer(1, 0.0, PriorityClass::Appointment));
        line.add(Customer::new(2, 1.0, PriorityClass::Regular, 5.0, 4.0));

        assert!(line.upgrade(2, PriorityClass::Elderly, 6.0, 3.0));
        let upgraded = line.get(2).expect("customer should still be queued");
        assert_eq!(upgraded.priority, PriorityClass::Elderly);
        assert_eq!(upgraded.patience, 10.0);
        assert_eq!(upgraded.priority_since, 3.0);

        assert_eq!(drain(&mut line), vec![2, 1]);
        assert!(!line.upgrade(2, PriorityClass::Vip, 0.0, 4.0));
    }

    #[test]
    fn scan_evicts_impatient_customers() {
        let mut line = WaitingLine::new(None);
        line.add(Customer::new(1, 0.0, PriorityClass::Regular, 5.0, 2.0));
        line.add(Customer::new(2, 0.0, PriorityClass::Regular, 5.0, 50.0));

        let evicted = line.scan_and_evict(2.01);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, 1);
        assert!(evicted[0].abandoned);
        assert_eq!(evicted[0].service_start_time, None);
        assert!(!line.contains(1));
        assert_eq!(line.len(), 1);
    }

    #[test]
    fn scan_before_any_deadline_is_a_no_op() {
        let mut line = WaitingLine::new(None);
        line.add(Customer::new(1, 0.0, PriorityClass::Regular, 5.0, 2.0));
        line.add(Customer::new(2, 1.0, PriorityClass::Vip, 5.0, 3.0));

        assert!(line.scan_and_evict(2.0).is_empty());
        assert!(line.scan_and_evict(2.0).is_empty());
        assert_eq!(line.len(), 2);
        assert_eq!(line.peek().map(|c| c.id), Some(2));
    }

    #[test]
    fn counts_cover_every_class() {
        let mut line = WaitingLine::new(None);
        line.add(customer(1, 0.0, PriorityClass::Vip));
        line.add(customer(2, 0.0, PriorityClass::Vip));
        line.add(customer(3, 0.0, PriorityClass::Regular));

        let counts = line.counts_by_priority();
        assert_eq!(counts[&PriorityClass::Vip], 2);
        assert_eq!(counts[&PriorityClass::Elderly], 0);
        assert_eq!(counts[&PriorityClass::Appointment], 0);
        assert_eq!(counts[&PriorityClass::Regular], 1);
    }
}
