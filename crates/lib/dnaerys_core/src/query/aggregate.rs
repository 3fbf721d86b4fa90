//! Result aggregation.
//!
//! Streams are drained completely before anything is returned. A list
//! that ends up empty is replaced by [`EMPTY_SENTINEL`] so callers always
//! receive at least one element.

use futures_util::{Stream, TryStreamExt};

use crate::store::models::Cohort;

/// The single element returned in place of an empty list.
pub const EMPTY_SENTINEL: &str = "{}";

/// Which sex partition a sample listing covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SexFilter {
    #[default]
    All,
    Female,
    Male,
}

/// Drain a batch stream into one list, keeping arrival order.
///
/// Any error discards what was already received.
pub async fn drain<T, S, E>(batches: S) -> Result<Vec<T>, E>
where
    S: Stream<Item = Result<Vec<T>, E>>,
{
    batches
        .try_fold(Vec::new(), |mut all, batch| async move {
            all.extend(batch);
            Ok(all)
        })
        .await
}

/// Apply the "empty is not an error" rule.
pub fn or_empty_sentinel(items: Vec<String>) -> Vec<String> {
    if items.is_empty() {
        vec![EMPTY_SENTINEL.to_string()]
    } else {
        items
    }
}

/// Sample names of the requested partition. For [`SexFilter::All`],
/// every female precedes every male; within a partition cohort order and
/// store order are kept.
pub fn partition_by_sex(cohorts: &[Cohort], filter: SexFilter) -> Vec<String> {
    let females = cohorts.iter().flat_map(|c| c.female_samples_names.iter());
    let males = cohorts.iter().flat_map(|c| c.male_samples_names.iter());
    match filter {
        SexFilter::All => females.chain(males).cloned().collect(),
        SexFilter::Female => females.cloned().collect(),
        SexFilter::Male => males.cloned().collect(),
    }
}
