pub(crate) fn div_roundup(val: usize, divisor: usize) -> usize {
    if val % divisor != 0 {
        val / divisor + 1
    } else {
        val / divisor
    }
}

/// Split `sample_cnt` samples into `min(parallelism, sample_cnt)` contiguous work-packets.
/// Returns the packet size; the last packet may be shorter.
pub(crate) fn work_packet_size(sample_cnt: usize, parallelism: usize) -> usize {
    let packets = parallelism.max(1).min(sample_cnt).max(1);
    div_roundup(sample_cnt, packets).max(1)
}

#[cfg(test)]
macro_rules! assert_approx_eq {
	($left: expr, $right: expr, $tol: expr) => ({
		match ($left, $right, $tol) {
			(left_val , right_val, tol_val) => {
				let delta = (left_val - right_val).abs();
				if !(delta < tol_val) {
					panic!(
						"assertion failed: `(left ≈ right)` \
						(left: `{}`, right: `{}`) \
						with ∆={:1.1e} (allowed ∆={:e})",
						left_val , right_val, delta, tol_val
					)
				}
			}
		}
	});
	($left: expr, $right: expr) => (assert_approx_eq!(($left), ($right), 1e-9))
}



#[cfg(test)]
mod tests {
	#[test]
    fn div_roundup() {
		for o in 1..20 {
			assert_eq!(super::div_roundup(0, o), 0);
			for i in 1..=o {
				assert_eq!(super::div_roundup(i, o), 1);
			}
			for i in o+1..=2*o {
				assert_eq!(super::div_roundup(i, o), 2);
			}
		}
    }

	#[test]
	fn work_packet_size() {
		assert_eq!(super::work_packet_size(10, 1), 10);
		assert_eq!(super::work_packet_size(10, 3), 4);
		assert_eq!(super::work_packet_size(10, 4), 3);
		// more workers than samples: one sample per packet
		assert_eq!(super::work_packet_size(3, 8), 1);
		assert_eq!(super::work_packet_size(1, 4), 1);
		assert_eq!(super::work_packet_size(0, 4), 1);
	}
}
