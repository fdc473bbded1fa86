//! Offer tracker - decides when the buff layer should present a choice

use crate::types::{DEFAULT_MIN_OFFER_CHAIN, DEFAULT_SCORE_STEP};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferTracker {
    score_step: u32,
    next_milestone: u32,
    min_chain: u32,
}

impl OfferTracker {
    pub fn new(score_step: u32, min_chain: u32) -> Self {
        let score_step = score_step.max(1);
        Self {
            score_step,
            next_milestone: score_step,
            min_chain,
        }
    }

    /// Call after every score increment. A positive answer moves the
    /// milestone one step further.
    pub fn should_offer_on_score(&mut self, total: u32) -> bool {
        if total >= self.next_milestone {
            self.next_milestone = self.next_milestone.saturating_add(self.score_step);
            return true;
        }
        false
    }

    pub fn should_offer_on_chain(&self, chain_depth: u32) -> bool {
        chain_depth >= self.min_chain
    }

    pub fn next_milestone(&self) -> u32 {
        self.next_milestone
    }

    /// Line the milestone up after a restored score so old milestones are not
    /// offered again.
    pub fn sync_to_score(&mut self, total: u32) {
        self.next_milestone = self.score_step;
        while self.next_milestone <= total && self.next_milestone != u32::MAX {
            self.next_milestone = self.next_milestone.saturating_add(self.score_step);
        }
    }

    pub fn reset(&mut self) {
        self.next_milestone = self.score_step;
    }
}

impl Default for OfferTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SCORE_STEP, DEFAULT_MIN_OFFER_CHAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_milestones_advance_one_step() {
        let mut offers = OfferTracker::default();
        assert!(!offers.should_offer_on_score(1999));
        assert!(offers.should_offer_on_score(2000));
        assert!(!offers.should_offer_on_score(2100));
        // A big jump only advances one step per call
        assert!(offers.should_offer_on_score(6500));
        assert!(offers.should_offer_on_score(6500));
        assert!(!offers.should_offer_on_score(6500));
        assert_eq!(offers.next_milestone(), 8000);
    }

    #[test]
    fn test_chain_threshold() {
        let offers = OfferTracker::default();
        assert!(!offers.should_offer_on_chain(2));
        assert!(offers.should_offer_on_chain(3));
        assert!(offers.should_offer_on_chain(7));
    }

    #[test]
    fn test_sync_and_reset() {
        let mut offers = OfferTracker::new(100, 3);
        offers.sync_to_score(250);
        assert_eq!(offers.next_milestone(), 300);
        offers.reset();
        assert_eq!(offers.next_milestone(), 100);
    }
}
