//! Running totals of what the repair pass did.

use bevy::prelude::*;

use crate::fixer_rules::FixerRule;
use crate::propagation::RepairSummary;

#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct FixerStats {
    /// Passes that found at least one changed edge.
    pub passes: u32,
    pub totals: RepairSummary,
    pub last_pass: RepairSummary,
    /// Record writes queued by the most recent pass.
    pub last_pass_writes: usize,
}

impl FixerStats {
    pub fn record_pass(&mut self, summary: &RepairSummary, writes: usize) {
        self.passes += 1;
        self.totals.merge(summary);
        self.last_pass = *summary;
        self.last_pass_writes = writes;
    }

    pub fn fixes_for(&self, rule: FixerRule) -> u32 {
        self.totals.hits(rule)
    }
}

pub fn report_fixer_stats(stats: Res<FixerStats>) {
    if !stats.is_changed() || stats.passes == 0 {
        return;
    }
    let pass = &stats.last_pass;
    let per_rule: Vec<String> = FixerRule::ORDERED
        .iter()
        .filter(|rule| pass.hits(**rule) > 0)
        .map(|rule| format!("{}={}", rule.name(), pass.hits(*rule)))
        .collect();
    debug!(
        "Fixer pass {}: {} edges, {} fixes [{}], {} writes, {} endpoints and {} neighbours skipped",
        stats.passes,
        pass.edges_visited,
        pass.pairs_fixed(),
        per_rule.join(", "),
        stats.last_pass_writes,
        pass.endpoints_skipped,
        pass.neighbors_skipped
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_pass_accumulates() {
        let mut stats = FixerStats::default();
        let mut pass = RepairSummary {
            edges_visited: 2,
            ..Default::default()
        };
        pass.record_fix(FixerRule::ConnectedTunnels);
        stats.record_pass(&pass, 4);
        stats.record_pass(&pass, 4);

        assert_eq!(stats.passes, 2);
        assert_eq!(stats.totals.edges_visited, 4);
        assert_eq!(stats.fixes_for(FixerRule::ConnectedTunnels), 2);
        assert_eq!(stats.last_pass, pass);
        assert_eq!(stats.last_pass_writes, 4);
    }
}
