use super::resolution::ResolutionLabel;
use crate::infrastructure::media::Dimensions;
use std::collections::BTreeSet;

/// Requested resolutions worth producing for a `width`x`height` source.
///
/// A resolution qualifies only when it is strictly smaller on both axes, so a
/// 720p request against a 1280x720 source yields nothing. An empty result is
/// a normal outcome the caller has to check for.
pub fn plan(requested: &BTreeSet<ResolutionLabel>, width: u32, height: u32) -> BTreeSet<ResolutionLabel> {
    plan_with(requested, Dimensions::new(width, height), |label| Some(label.dimensions()))
}

/// [`plan`] against an arbitrary catalog; labels the catalog does not know are dropped.
pub fn plan_with<L, F>(requested: &BTreeSet<L>, source: Dimensions, catalog: F) -> BTreeSet<L>
where
    L: Ord + Clone,
    F: Fn(&L) -> Option<Dimensions>,
{
    requested
        .iter()
        .filter(|label| catalog(*label).is_some_and(|dims| dims.strictly_within(&source)))
        .cloned()
        .collect()
}
