//! Segment-count selection for circular tessellation.

/// Segments added per curve-quality tier.
pub const SEGMENTS_PER_TIER: u32 = 8;

/// Hi-res primitives never tessellate below this.
pub const HI_RES_FLOOR: u32 = 48;

const QUALITY_RANGE: std::ops::RangeInclusive<u32> = 1..=12;

fn f_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

/// How many of `num` segments a fraction-of-circle request actually emits.
pub fn used_segments(num: u32, fraction: f32) -> u32 {
    (num as f32 * fraction + 1e-6) as u32
}

/// Pick the tessellation segment count for a circular feature.
///
/// Starts at `quality` tiers of [`SEGMENTS_PER_TIER`], raised to the hi-res
/// floor when requested, then raised tier by tier until the fraction maps
/// to a whole number of segments (bounded by the top tier). Non-decreasing
/// in `quality` for any fixed fraction.
pub fn circle_segments(quality: u32, fraction: f32, hi_res: bool) -> u32 {
    let quality = quality.clamp(*QUALITY_RANGE.start(), *QUALITY_RANGE.end());
    let mut num = quality * SEGMENTS_PER_TIER;
    if hi_res && num < HI_RES_FLOOR {
        num = HI_RES_FLOOR;
    }
    if fraction != 0.0 {
        let mut tier = quality;
        while !f_eq(fraction * num as f32, used_segments(num, fraction) as f32)
            && tier < *QUALITY_RANGE.end()
        {
            let next = (tier + 1) * SEGMENTS_PER_TIER;
            if next > num {
                num = next;
            }
            tier += 1;
        }
    }
    num
}

/// Decode a torus size field into the minor-radius fraction.
///
/// Repdigit sizes encode ninths (`4444` is `4/9`); other positive sizes are
/// ten-thousandths. Negative sizes (the `r`-prefixed outer tori) put whole
/// units in the thousands and a repdigit ninth in the low three digits.
pub fn torus_minor_fraction(size: i32) -> f32 {
    if size < 0 {
        let size = -size;
        let frac = size % 1000;
        for i in 0..10 {
            if frac == i + i * 10 + i * 100 {
                return i as f32 / 9.0 + (size / 1000) as f32;
            }
        }
        size as f32 / 1000.0
    } else {
        for i in 0..10 {
            if size == i + i * 10 + i * 100 + i * 1000 {
                return i as f32 / 9.0;
            }
        }
        size as f32 / 10_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_used_segments() {
        assert_eq!(used_segments(16, 1.0), 16);
        assert_eq!(used_segments(16, 0.25), 4);
        assert_eq!(used_segments(48, 1.0 / 3.0), 16);
    }

    #[test]
    fn test_base_segments_scale_with_quality() {
        assert_eq!(circle_segments(1, 1.0, false), 8);
        assert_eq!(circle_segments(2, 1.0, false), 16);
        assert_eq!(circle_segments(4, 1.0, false), 32);
    }

    #[test]
    fn test_hi_res_floor() {
        assert_eq!(circle_segments(2, 1.0, true), 48);
        assert_eq!(circle_segments(8, 1.0, true), 64);
    }

    #[test]
    fn test_awkward_fraction_bumps_count() {
        // A third of 16 segments is not whole; the count is raised until
        // the fraction divides evenly.
        let n = circle_segments(2, 1.0 / 3.0, false);
        assert_eq!(n, 24);
        assert_eq!(used_segments(n, 1.0 / 3.0), 8);
    }

    #[test]
    fn test_monotonic_in_quality() {
        for &fraction in &[1.0, 0.5, 0.25, 1.0 / 3.0, 3.0 / 16.0, 1.0 / 16.0] {
            for hi_res in [false, true] {
                let mut last = 0;
                for quality in 1..=12 {
                    let n = circle_segments(quality, fraction, hi_res);
                    assert!(
                        n >= last,
                        "segments decreased at quality {quality} for {fraction}"
                    );
                    last = n;
                }
            }
        }
    }

    #[test]
    fn test_torus_minor_fraction() {
        assert!((torus_minor_fraction(4444) - 4.0 / 9.0).abs() < 1e-6);
        assert!((torus_minor_fraction(2500) - 0.25).abs() < 1e-6);
        assert!((torus_minor_fraction(-2333) - (2.0 + 3.0 / 9.0)).abs() < 1e-6);
        assert!((torus_minor_fraction(-1500) - 1.5).abs() < 1e-6);
    }
}
