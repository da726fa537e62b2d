use ordered_float::OrderedFloat;

use crate::algorithms::{AssignmentStrategy, SelectionContext};
use crate::teller::TellerId;

/// Sends VIP, elderly and appointment customers to the fastest free teller; regular
/// customers go to the free teller with the least accumulated busy time.
#[derive(Default)]
pub struct PriorityBiasedStrategy;

impl AssignmentStrategy for PriorityBiasedStrategy {
    fn pick(&mut self, ctx: &SelectionContext) -> Option<TellerId> {
        let mut best: Option<(TellerId, (OrderedFloat<f64>, OrderedFloat<f64>))> = None;

        for teller in ctx.available() {
            let score = if ctx.priority.is_priority() {
                (OrderedFloat(-teller.efficiency), OrderedFloat(0.0))
            } else {
                (OrderedFloat(teller.busy_time), OrderedFloat(teller.efficiency))
            };
            match best {
                Some((_, current)) if score >= current => {}
                _ => best = Some((teller.id, score)),
            }
        }

        best.map(|(id, _)| id)
    }
}
