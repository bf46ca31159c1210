//! Distribution bucket boundaries.
//!
//! These lists are shared with existing dashboards; changing a single value
//! splits historical series.

/// Bucket boundaries for byte-size distributions, 0 through 4 GiB.
pub const BYTES_BOUNDARIES: [f64; 15] = [
    0.0,
    1024.0,
    2048.0,
    4096.0,
    16384.0,
    65536.0,
    262144.0,
    1048576.0,
    4194304.0,
    16777216.0,
    67108864.0,
    268435456.0,
    1073741824.0,
    2147483648.0,
    4294967296.0,
];

/// Bucket boundaries for latency distributions in milliseconds, 0 through
/// 500 seconds.
pub const MILLISECONDS_BOUNDARIES: [f64; 31] = [
    0.0, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 1.5, 2.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0,
    200.0, 400.0, 600.0, 800.0, 1000.0, 1500.0, 2000.0, 2500.0, 5000.0, 10000.0, 20000.0,
    40000.0, 100000.0, 200000.0, 500000.0,
];

/// Which boundary list a distribution uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    /// Byte sizes.
    Bytes,
    /// Latencies in milliseconds.
    Milliseconds,
}

/// Returns the bucket boundaries for `kind`.
pub fn distribution_boundaries(kind: BucketKind) -> &'static [f64] {
    match kind {
        BucketKind::Bytes => &BYTES_BOUNDARIES,
        BucketKind::Milliseconds => &MILLISECONDS_BOUNDARIES,
    }
}

/// Returns the index of the bucket `value` falls into.
///
/// Bucket `0` holds values below the first boundary; bucket `i` holds
/// values in `[boundaries[i - 1], boundaries[i])`; the last bucket is
/// unbounded above. A list of `n` boundaries therefore yields `n + 1`
/// buckets.
pub fn bucket_index(boundaries: &[f64], value: f64) -> usize {
    boundaries.partition_point(|b| *b <= value)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn test_bytes_boundaries_literal() {
        let expected = [
            0.0,
            1024.0,
            2048.0,
            4096.0,
            16384.0,
            65536.0,
            262144.0,
            1048576.0,
            4194304.0,
            16777216.0,
            67108864.0,
            268435456.0,
            1073741824.0,
            2147483648.0,
            4294967296.0,
        ];
        assert_eq!(distribution_boundaries(BucketKind::Bytes), &expected[..]);
    }

    #[test]
    fn test_milliseconds_boundaries_literal() {
        let expected = [
            0.0, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 1.5, 2.0, 2.5, 5.0, 10.0, 25.0, 50.0,
            100.0, 200.0, 400.0, 600.0, 800.0, 1000.0, 1500.0, 2000.0, 2500.0, 5000.0, 10000.0,
            20000.0, 40000.0, 100000.0, 200000.0, 500000.0,
        ];
        assert_eq!(distribution_boundaries(BucketKind::Milliseconds), &expected[..]);
    }

    #[test_case(BucketKind::Bytes ; "bytes")]
    #[test_case(BucketKind::Milliseconds ; "milliseconds")]
    fn test_boundaries_strictly_increasing(kind: BucketKind) {
        let b = distribution_boundaries(kind);
        assert!(b.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(b[0], 0.0);
    }

    #[test_case(-1.0, 0 ; "below first boundary")]
    #[test_case(0.0, 1 ; "exactly zero")]
    #[test_case(0.0005, 1 ; "sub microsecond")]
    #[test_case(0.001, 2 ; "on a boundary")]
    #[test_case(999.9, 20 ; "just under a second")]
    #[test_case(1_000_000.0, 31 ; "overflow bucket")]
    fn test_bucket_index_milliseconds(value: f64, expected: usize) {
        assert_eq!(bucket_index(&MILLISECONDS_BOUNDARIES, value), expected);
    }
}
