use crate::{error::*, memory::*, KMeansState, PointVector};
use rand::prelude::*;

/// Random sample initialization (Forgy, with replacement): every centroid is an independently drawn
/// sample, so two centroids may start on the same sample.
#[inline(always)]
pub fn calculate<T: Primitive, R: Rng + ?Sized>(samples: &[PointVector<T>], state: &mut KMeansState<T>, rnd: &mut R) -> Result<()> {
    if samples.is_empty() {
        return Err(KMeansError::invalid("cannot initialize centroids from an empty sample set"));
    }
    for ci in 0..state.k {
        let sample_idx = rnd.gen_range(0, samples.len());
        state.set_centroid_from_iter(ci, samples[sample_idx].features.iter().cloned());
    }
    Ok(())
}
