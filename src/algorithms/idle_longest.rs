use ordered_float::OrderedFloat;

use crate::algorithms::{AssignmentStrategy, SelectionContext};
use crate::teller::TellerId;

/// Balances load by handing work to whichever free teller has waited longest.
#[derive(Default)]
pub struct IdleLongestStrategy;

impl AssignmentStrategy for IdleLongestStrategy {
    fn pick(&mut self, ctx: &SelectionContext) -> Option<TellerId> {
        // min_by_key keeps the first minimum, so ties go to the lowest id
        ctx.available()
            .min_by_key(|teller| OrderedFloat(teller.idle_since.unwrap_or(f64::INFINITY)))
            .map(|teller| teller.id)
    }
}
