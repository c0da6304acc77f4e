use crate::fixer_rules::FixerRule;

/// Counters gathered over one repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    pub edges_visited: u32,
    /// Endpoints abandoned because the edge's own data was missing.
    pub endpoints_skipped: u32,
    /// Connected edges passed over because their data was missing.
    pub neighbors_skipped: u32,
    /// Fixes per rule, indexed by `FixerRule::index`.
    pub rule_hits: [u32; FixerRule::ORDERED.len()],
}

impl RepairSummary {
    pub fn record_fix(&mut self, rule: FixerRule) {
        self.rule_hits[rule.index()] += 1;
    }

    pub fn pairs_fixed(&self) -> u32 {
        self.rule_hits.iter().sum()
    }

    pub fn hits(&self, rule: FixerRule) -> u32 {
        self.rule_hits[rule.index()]
    }

    pub fn merge(&mut self, other: &RepairSummary) {
        self.edges_visited += other.edges_visited;
        self.endpoints_skipped += other.endpoints_skipped;
        self.neighbors_skipped += other.neighbors_skipped;
        for (acc, hits) in self.rule_hits.iter_mut().zip(other.rule_hits) {
            *acc += hits;
        }
    }
}
