//! Small math helpers shared across the module library.

use libm::{powf, sinf, sqrtf};

/// Unnormalized sinc: `sin(x) / x`, with the removable singularity at zero.
#[inline]
pub fn sinc(x: f32) -> f32 {
    if x.abs() < 1e-9 { 1.0 } else { sinf(x) / x }
}

/// Frequency ratio for a signed number of equal-tempered semitones.
///
/// `semitone_ratio(12.0) == 2.0` (one octave up).
#[inline]
pub fn semitone_ratio(semitones: f32) -> f32 {
    powf(2.0, semitones / 12.0)
}

/// Converts decibels of gain to a linear amplitude factor.
///
/// Uses the power-domain convention `sqrt(10^(dB/10))`, which is
/// numerically `10^(dB/20)`: +6.02 dB doubles amplitude.
#[inline]
pub fn db_to_amplitude(decibels: f32) -> f32 {
    sqrtf(powf(10.0, decibels / 10.0))
}

/// Flushes denormal floats to zero.
///
/// Denormals cause massive CPU spikes on some architectures. Recursive
/// filter state decaying toward zero will hit the denormal range without
/// this.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinc_at_zero_is_one() {
        assert_eq!(sinc(0.0), 1.0);
    }

    #[test]
    fn sinc_zero_crossings_at_pi() {
        assert!(sinc(core::f32::consts::PI).abs() < 1e-6);
        assert!(sinc(2.0 * core::f32::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn octave_is_a_doubling() {
        assert!((semitone_ratio(12.0) - 2.0).abs() < 1e-6);
        assert!((semitone_ratio(-12.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn db_known_values() {
        assert!((db_to_amplitude(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_amplitude(-6.0205999) - 0.5).abs() < 1e-4);
        assert!((db_to_amplitude(20.0) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn flush_denormal_passes_normals() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(-1e-10), -1e-10);
        assert_eq!(flush_denormal(1e-30), 0.0);
    }
}
