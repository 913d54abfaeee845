//! Wrap-aware comparisons over 32-bit modular sequence numbers.
//!
//! TCP-style sequence numbers wrap at 2^32; a plain `a < b` comparison breaks
//! near the wraparound point, so every comparison here goes through
//! `wrapping_sub` and inspects the sign of the result as a signed 32-bit
//! delta. This is the same trick `tcp_seq_*` helpers use in the host stack.

/// Returns `true` if `a` is strictly before `b` on the sequence number line,
/// accounting for 2^32 wraparound.
#[must_use]
pub fn seq_lt(a: u32, b: u32) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}

/// Returns `true` if `a` is strictly after `b`.
#[must_use]
pub fn seq_gt(a: u32, b: u32) -> bool {
    seq_lt(b, a)
}

/// Returns `true` if `a` is at or before `b`.
#[must_use]
pub fn seq_le(a: u32, b: u32) -> bool {
    !seq_gt(a, b)
}

/// Returns `true` if `a` is at or after `b`.
#[must_use]
pub fn seq_ge(a: u32, b: u32) -> bool {
    !seq_lt(a, b)
}

/// Returns the larger of `a` and `b` under wrap-aware ordering.
#[must_use]
pub fn seq_max(a: u32, b: u32) -> u32 {
    if seq_gt(a, b) { a } else { b }
}

/// Returns the smaller of `a` and `b` under wrap-aware ordering.
#[must_use]
pub fn seq_min(a: u32, b: u32) -> u32 {
    if seq_lt(a, b) { a } else { b }
}

/// Number of bytes from `a` to `b` moving forward on the sequence line,
/// i.e. `b - a` performed modulo 2^32. Undefined (but harmless) if `b` is
/// actually behind `a`; callers are expected to check ordering first.
#[must_use]
pub fn seq_diff(a: u32, b: u32) -> u32 {
    b.wrapping_sub(a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn seq_gt_is_the_converse_of_seq_lt(a: u32, b: u32) {
            prop_assert_eq!(seq_gt(a, b), seq_lt(b, a));
            if a == b {
                prop_assert!(!seq_lt(a, b) && !seq_gt(a, b));
            }
        }

        #[test]
        fn seq_diff_recovers_small_forward_steps(start: u32, delta in 0u32..(1u32 << 30)) {
            let end = start.wrapping_add(delta);
            prop_assert_eq!(seq_diff(start, end), delta);
            prop_assert!(seq_le(start, end));
        }
    }

    #[test]
    fn orders_without_wrap() {
        assert!(seq_lt(10, 20));
        assert!(seq_gt(20, 10));
        assert!(seq_le(10, 10));
        assert!(seq_ge(10, 10));
    }

    #[test]
    fn orders_across_wraparound() {
        let near_max = u32::MAX - 5;
        let wrapped = 5u32;
        assert!(seq_lt(near_max, wrapped));
        assert!(seq_gt(wrapped, near_max));
    }

    #[test]
    fn min_max_pick_wrap_aware_extremes() {
        let near_max = u32::MAX - 5;
        let wrapped = 5u32;
        assert_eq!(seq_min(near_max, wrapped), near_max);
        assert_eq!(seq_max(near_max, wrapped), wrapped);
    }

    #[test]
    fn diff_counts_forward_bytes() {
        assert_eq!(seq_diff(100, 150), 50);
        assert_eq!(seq_diff(u32::MAX - 4, 5), 10);
    }
}
