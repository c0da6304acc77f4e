use bevy::prelude::*;

use crate::fixer_rules::{run_fixers, FixOutcome, FixerContext, FixerPair, FixerRule};
use crate::graph::{GraphAccessor, LookupMiss};
use crate::net_composition::NetCompositionData;
use crate::topology::Endpoint;
use crate::write_batch::WriteBatch;

use super::matching::flags_match;
use super::types::RepairSummary;

/// One composition record together with the handle it was read from.
#[derive(Debug, Clone, Copy)]
struct Snapshot {
    handle: Entity,
    /// Value as read from the host this tick.
    host: NetCompositionData,
    /// Value including fixes already queued this tick.
    current: NetCompositionData,
}

impl Snapshot {
    fn read<G: GraphAccessor>(graph: &G, handle: Entity) -> Result<Self, LookupMiss> {
        let host = graph.require_record(handle)?;
        Ok(Self {
            handle,
            host,
            current: host,
        })
    }

    fn queue(&self, batch: &mut WriteBatch) {
        batch.push(self.handle, self.current, self.host.flags);
    }
}

/// Runs endpoint repair for a stream of edges against one graph snapshot.
///
/// Reads go through `graph` only; every fix is appended to the batch, so
/// nothing written here is visible to later edges of the same pass.
pub struct EdgeRepairer<'g, G: GraphAccessor> {
    graph: &'g G,
    batch: WriteBatch,
    summary: RepairSummary,
    log_fixes: bool,
}

impl<'g, G: GraphAccessor> EdgeRepairer<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self {
            graph,
            batch: WriteBatch::default(),
            summary: RepairSummary::default(),
            log_fixes: false,
        }
    }

    /// Report each fix at info level instead of debug.
    pub fn with_fix_logging(mut self, log_fixes: bool) -> Self {
        self.log_fixes = log_fixes;
        self
    }

    pub fn batch(&self) -> &WriteBatch {
        &self.batch
    }

    pub fn summary(&self) -> &RepairSummary {
        &self.summary
    }

    pub fn finish(self) -> (WriteBatch, RepairSummary) {
        (self.batch, self.summary)
    }

    /// Repair the start node, then the end node of `edge`. A miss on one
    /// endpoint does not stop the other.
    pub fn repair_edge(&mut self, edge: Entity) {
        self.summary.edges_visited += 1;
        for endpoint in Endpoint::BOTH {
            if let Err(miss) = self.repair_endpoint(edge, endpoint) {
                trace!("Skipping {endpoint:?} of {edge:?}: {miss}");
                self.summary.endpoints_skipped += 1;
            }
        }
    }

    /// Repair the node at one end of `edge`.
    ///
    /// Fails only when the edge's own topology or records are missing. Misses
    /// on neighbouring edges skip that neighbour and carry on.
    pub fn repair_endpoint(&mut self, edge: Entity, endpoint: Endpoint) -> Result<(), LookupMiss> {
        let graph = self.graph;
        let node = graph.require_edge(edge)?.node(endpoint);
        let composition = graph.require_composition(edge)?;
        let mut current_edge = Snapshot::read(graph, composition.edge)?;
        let mut current_node = Snapshot::read(graph, composition.node_record(endpoint))?;

        if current_node.current.is_dead_end() {
            let pair = FixerPair::dead_end(current_edge.current, current_node.current);
            let outcome = run_fixers(pair, FixerContext::dead_end());
            if let Some(rule) = outcome.applied {
                current_edge.current = outcome.pair.current_edge;
                current_node.current = outcome.pair.current_node;
                self.note_fix(rule, edge, node, None);
                current_edge.queue(&mut self.batch);
                current_node.queue(&mut self.batch);
            }
            return Ok(());
        }

        for &other in graph.connected_edges(node) {
            if other == edge {
                continue;
            }
            let (mut connected_edge, mut connected_node) =
                match self.resolve_neighbor(other, endpoint) {
                    Ok(neighbor) => neighbor,
                    Err(miss) => {
                        trace!("Skipping neighbour {other:?} of {edge:?} at {node:?}: {miss}");
                        self.summary.neighbors_skipped += 1;
                        continue;
                    }
                };

            let is_start = endpoint.is_start();
            let (start_op, end_op) = if is_start {
                (current_node.current, connected_node.current)
            } else {
                (connected_node.current, current_node.current)
            };
            let ctx = FixerContext::neighbor(flags_match(start_op.flags, end_op.flags, is_start));

            let pair = FixerPair::new(
                current_edge.current,
                current_node.current,
                connected_edge.current,
                connected_node.current,
            );
            let FixOutcome {
                pair: fixed,
                applied: Some(rule),
            } = run_fixers(pair, ctx)
            else {
                continue;
            };

            current_edge.current = fixed.current_edge;
            current_node.current = fixed.current_node;
            connected_edge.current = fixed.connected_edge;
            connected_node.current = fixed.connected_node;
            self.note_fix(rule, edge, node, Some(other));

            current_edge.queue(&mut self.batch);
            current_node.queue(&mut self.batch);
            connected_edge.queue(&mut self.batch);
            connected_node.queue(&mut self.batch);
        }
        Ok(())
    }

    /// The connected edge's own record and its node record at the endpoint
    /// opposite to `endpoint`: a start node is compared against the
    /// neighbour's end record and vice versa.
    fn resolve_neighbor(
        &self,
        other: Entity,
        endpoint: Endpoint,
    ) -> Result<(Snapshot, Snapshot), LookupMiss> {
        let composition = self.graph.require_composition(other)?;
        let edge = Snapshot::read(self.graph, composition.edge)?;
        let far = Snapshot::read(self.graph, composition.node_record(endpoint.opposite()))?;
        Ok((edge, far))
    }

    fn note_fix(&mut self, rule: FixerRule, edge: Entity, node: Entity, neighbor: Option<Entity>) {
        self.summary.record_fix(rule);
        if self.log_fixes {
            info!(
                "{} fixed {edge:?} at node {node:?} (neighbour {neighbor:?})",
                rule.name()
            );
        } else {
            debug!(
                "{} fixed {edge:?} at node {node:?} (neighbour {neighbor:?})",
                rule.name()
            );
        }
    }
}
