//! Logs the composition records of an edge on request.

use std::fmt;

use bevy::prelude::*;

use crate::flags::CompositionFlags;
use crate::graph::{GraphAccessor, LookupMiss, NetGraph};

/// Ask for the records of `edge` to be logged.
#[derive(Event, Debug, Clone, Copy)]
pub struct InspectEdge {
    pub edge: Entity,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordReport {
    pub handle: Entity,
    pub flags: CompositionFlags,
    /// Flags before the fixer's first rewrite, if kept.
    pub original: Option<CompositionFlags>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeReport {
    pub edge: Entity,
    pub edge_record: RecordReport,
    pub start_node: RecordReport,
    pub end_node: RecordReport,
}

impl EdgeReport {
    /// Whether the fixer has rewritten any of the three records.
    pub fn was_fixed(&self) -> bool {
        [self.edge_record, self.start_node, self.end_node]
            .iter()
            .any(|r| r.original.is_some())
    }
}

impl fmt::Display for RecordReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.handle, self.flags)?;
        if let Some(original) = self.original {
            write!(f, " (was {original:?})")?;
        }
        Ok(())
    }
}

impl fmt::Display for EdgeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Edge {:?}", self.edge)?;
        writeln!(f, "  edge:  {}", self.edge_record)?;
        writeln!(f, "  start: {}", self.start_node)?;
        write!(f, "  end:   {}", self.end_node)
    }
}

fn describe_record<G: GraphAccessor>(graph: &G, handle: Entity) -> Result<RecordReport, LookupMiss> {
    Ok(RecordReport {
        handle,
        flags: graph.require_record(handle)?.flags,
        original: graph.original_flags(handle).map(|o| o.flags),
    })
}

/// Current and original flags of the three records behind `edge`.
pub fn describe_edge<G: GraphAccessor>(graph: &G, edge: Entity) -> Result<EdgeReport, LookupMiss> {
    let composition = graph.require_composition(edge)?;
    Ok(EdgeReport {
        edge,
        edge_record: describe_record(graph, composition.edge)?,
        start_node: describe_record(graph, composition.start_node)?,
        end_node: describe_record(graph, composition.end_node)?,
    })
}

pub fn inspect_edges(mut events: EventReader<InspectEdge>, graph: NetGraph) {
    for request in events.read() {
        match describe_edge(&graph, request.edge) {
            Ok(report) => info!("{report}"),
            Err(miss) => debug!("Cannot inspect {:?}: {miss}", request.edge),
        }
    }
}
