use crate::{error::*, memory::*, KMeansState};

/// Start from caller-supplied centroids, given row-major (`[<centroid0>,<centroid1>,...]`).
#[inline(always)]
pub fn calculate<T: Primitive>(state: &mut KMeansState<T>, computed: &[T]) -> Result<()> {
    if computed.len() != state.k * state.sample_dims {
        return Err(KMeansError::invalid(format!(
            "expected {} precomputed centroids of dimensionality {} ({} values), got {} values",
            state.k, state.sample_dims, state.k * state.sample_dims, computed.len()
        )));
    }
    computed.chunks_exact(state.sample_dims).enumerate().for_each(|(ci, c)| {
        state.set_centroid_from_iter(ci, c.iter().cloned());
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_centroids() {
        let mut state = KMeansState::<f64>::new(4, 2, 2);
        calculate(&mut state, &[0.0, 21.0, 3.0, 4.0]).unwrap();
        assert_eq!(state.centroids, vec![0.0, 21.0, 3.0, 4.0]);
    }

    #[test]
    fn dimensionality_mismatch() {
        let mut state = KMeansState::<f64>::new(4, 2, 2);
        let res = calculate(&mut state, &[0.0, 21.0, 3.0]);
        assert!(matches!(res, Err(KMeansError::InvalidInput(_))));
    }
}
