use crate::flags::{CompositionFlags, GeneralFlags};

/// Whether two endpoint flag sets describe the same cross-section.
///
/// The start operand is mirrored when it sits on a start node or carries
/// `INVERT`. After that, equal left groups or equal right groups count as a
/// match.
// NOTE: it is unclear whether the mirroring should apply to every start node
// or only to nodes carrying INVERT. Both triggers are kept; see
// `test_flags_match_mirrors_on_start_nodes` before changing this.
pub fn flags_match(start: CompositionFlags, end: CompositionFlags, is_start_node: bool) -> bool {
    let start = if is_start_node || start.has_general(GeneralFlags::INVERT) {
        start.inverted()
    } else {
        start
    };
    start.left == end.left || start.right == end.right
}
