use super::rules::FixerRule;
use super::types::{FixOutcome, FixerContext, FixerPair};

/// Run the rule table over one pair, first match wins.
///
/// The first rule whose precondition holds owns the pair. If its mutation
/// leaves every flag set as it was, the pair is already consistent and the
/// outcome reports nothing applied, which keeps repeated passes quiet.
pub fn run_fixers(pair: FixerPair, ctx: FixerContext) -> FixOutcome {
    if !ctx.allows_rules() {
        return FixOutcome::unchanged(pair);
    }

    let Some(rule) = FixerRule::ORDERED
        .into_iter()
        .find(|rule| rule.precondition(&pair, ctx))
    else {
        return FixOutcome::unchanged(pair);
    };

    let patched = rule.apply(pair);
    if patched.same_flags(&pair) {
        return FixOutcome::unchanged(pair);
    }

    FixOutcome {
        pair: patched,
        applied: Some(rule),
    }
}
