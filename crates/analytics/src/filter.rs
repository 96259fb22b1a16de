use crate::selection::{Predicate, Selection};
use core_types::FundamentalsRecord;
use tracing::debug;

/// Returns the rows that satisfy every condition of `selection`.
///
/// Rows are borrowed, not copied, and keep their input order. An empty result
/// is a normal outcome; callers decide how to report "no data".
pub fn apply_filters<'a>(
    records: &'a [FundamentalsRecord],
    selection: &Selection,
) -> Vec<&'a FundamentalsRecord> {
    let predicates = selection.predicates();
    let filtered = apply_predicates(records, &predicates);
    debug!(
        input = records.len(),
        output = filtered.len(),
        predicates = predicates.len(),
        "Applied selection."
    );
    filtered
}

/// Keeps the rows matching all `predicates`. The predicates are independent,
/// so their order never changes the result.
pub fn apply_predicates<'a, I>(records: I, predicates: &[Predicate]) -> Vec<&'a FundamentalsRecord>
where
    I: IntoIterator<Item = &'a FundamentalsRecord>,
{
    records
        .into_iter()
        .filter(|record| predicates.iter().all(|p| p.matches(record)))
        .collect()
}
