//! Stochastic wake times and big-tick synchronization arithmetic.
//!
//! Two clocks run through the simulation. Ordinary spike events land at
//! "little tick" resolution, offset by a stochastic delta drawn from the
//! configured distribution. On top of that, every entity re-aligns to a
//! coarse "big tick" grid (one simulated unit per master-clock cycle) by
//! emitting a heartbeat at each boundary, which keeps the distributed
//! entity clocks loosely synchronized without a global barrier.
//!
//! Every `next_event_time` call consumes exactly one draw from the
//! entity's stream regardless of the selected distribution. A branch
//! that drew zero or two values would shift the stream position and
//! break bit-identical replay.

use synfire_core::EntityRng;
use synfire_types::{SimConfig, SimTime, TimeDistribution};

/// Smallest delta `next_event_time` will return. Keeps the
/// strictly-positive guarantee even for extreme draws.
pub const MIN_DELTA: f64 = 1.0e-9;

/// Largest fraction of one big tick a stochastic delta may span.
const MAX_FRACTION: f64 = 1.0 - 1.0e-9;

/// Mean exponential gap, as a fraction of one big tick.
const EXP_SCALE: f64 = 0.125;

/// Center and spread of the normal-based draw, in big-tick fractions.
const NORM_MEAN: f64 = 0.5;
const NORM_SDEV: f64 = 0.25;

/// Long offset returned by the two-point (`Bin`) distribution.
const BIN_LONG: f64 = 0.5;

/// Draw the next stochastic event offset for an entity.
///
/// The result is strictly positive, below one big tick, and scaled by
/// the configured `clock_random_adj`. Exactly one uniform value is
/// consumed from `rng`.
pub fn next_event_time(config: &SimConfig, rng: &mut dyn EntityRng) -> SimTime {
    // Pull the draw away from 0 so ln() and the inverse CDF stay finite.
    let u = rng.next_uniform().clamp(MIN_DELTA, MAX_FRACTION);

    let fraction = match config.clock_rnd_mode {
        TimeDistribution::Uniform => u,
        TimeDistribution::NormBased => NORM_MEAN + NORM_SDEV * inverse_normal_cdf(u),
        TimeDistribution::Exp => -u.ln() * EXP_SCALE,
        TimeDistribution::Bin => {
            if u < config.bin_probability {
                config.little_tick
            } else {
                BIN_LONG
            }
        }
    };

    SimTime((fraction * config.clock_random_adj).clamp(MIN_DELTA, MAX_FRACTION))
}

/// The big-tick boundary governing `now`.
///
/// Floors to the big-tick grid, except that a timestamp within the
/// configured tolerance *below* a boundary snaps forward to it: after
/// thousands of little-tick steps a clock can sit at `0.999999…` when it
/// has, for every synchronization purpose, reached tick `1.0`.
pub fn current_big_tick(config: &SimConfig, now: SimTime) -> SimTime {
    let period = config.big_tick_period;
    let tick = (now.0 / period).floor() * period;
    let next = tick + period;
    if next - now.0 <= config.big_tick_err {
        SimTime(next)
    } else {
        SimTime(tick)
    }
}

/// The first big-tick boundary strictly after `now`.
///
/// A boundary already reached (exactly, or within the tolerance band)
/// is never returned again; the crossing would otherwise be counted
/// twice and the heartbeat schedule would stall at one boundary.
pub fn next_big_tick(config: &SimConfig, now: SimTime) -> SimTime {
    SimTime(current_big_tick(config, now).0 + config.big_tick_period)
}

/// Number of whole big ticks between two timestamps, tolerance-adjusted.
///
/// Used by the leak rule: decay is applied per elapsed boundary, not per
/// delivered message.
pub fn elapsed_big_ticks(config: &SimConfig, from: SimTime, to: SimTime) -> u32 {
    let delta = current_big_tick(config, to).0 - current_big_tick(config, from).0;
    if delta <= 0.0 {
        0
    } else {
        (delta / config.big_tick_period).round() as u32
    }
}

/// Inverse CDF of the standard normal distribution (Acklam's rational
/// approximation, |relative error| < 1.15e-9 over the open unit
/// interval). Lets the normal-based mode consume a single uniform draw;
/// Box-Muller would consume two and shift the replay stream.
fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic xorshift stream for exercising the draw paths.
    struct TestRng {
        state: u64,
        draws: u64,
    }

    impl TestRng {
        fn new(seed: u64) -> Self {
            Self {
                state: seed.max(1),
                draws: 0,
            }
        }
    }

    impl EntityRng for TestRng {
        fn next_uniform(&mut self) -> f64 {
            self.state ^= self.state << 13;
            self.state ^= self.state >> 7;
            self.state ^= self.state << 17;
            self.draws += 1;
            (self.state >> 11) as f64 / (1u64 << 53) as f64
        }

        fn draw_count(&self) -> u64 {
            self.draws
        }
    }

    fn config_with_mode(mode: TimeDistribution) -> SimConfig {
        let mut config = SimConfig::new(1, 1, 1, 1).with_grid(1, 1);
        config.clock_rnd_mode = mode;
        config
    }

    #[test]
    fn test_delta_strictly_positive_all_modes() {
        for mode in [
            TimeDistribution::Uniform,
            TimeDistribution::NormBased,
            TimeDistribution::Exp,
            TimeDistribution::Bin,
        ] {
            let config = config_with_mode(mode);
            let mut rng = TestRng::new(42);
            for _ in 0..10_000 {
                let delta = next_event_time(&config, &mut rng);
                assert!(delta.0 > 0.0, "{mode:?} produced non-positive delta");
                assert!(delta.0 < config.big_tick_period, "{mode:?} overshot a big tick");
            }
        }
    }

    #[test]
    fn test_exactly_one_draw_per_call() {
        for mode in [
            TimeDistribution::Uniform,
            TimeDistribution::NormBased,
            TimeDistribution::Exp,
            TimeDistribution::Bin,
        ] {
            let config = config_with_mode(mode);
            let mut rng = TestRng::new(7);
            for expected in 1..=100 {
                next_event_time(&config, &mut rng);
                assert_eq!(rng.draw_count(), expected, "{mode:?} draw count drifted");
            }
        }
    }

    #[test]
    fn test_big_tick_brackets_now() {
        let config = SimConfig::new(1, 1, 1, 1).with_grid(1, 1);
        for raw in [0.0, 0.25, 0.999, 1.0, 1.5, 7.001, 1000.25] {
            let now = SimTime(raw);
            let current = current_big_tick(&config, now);
            let next = next_big_tick(&config, now);
            assert!(current <= now, "current {current} after now {now}");
            assert!(now < next, "next {next} not after now {now}");
            assert_eq!(next.0 - current.0, config.big_tick_period);
        }
    }

    #[test]
    fn test_tolerance_band_snaps_forward() {
        let mut config = SimConfig::new(1, 1, 1, 1).with_grid(1, 1);
        config.big_tick_err = 1.0e-6;

        // Just inside the band below 1.0: already at the boundary.
        let now = SimTime(1.0 - 5.0e-7);
        assert_eq!(current_big_tick(&config, now), SimTime(1.0));
        // The following boundary, never the one just reached.
        assert_eq!(next_big_tick(&config, now), SimTime(2.0));

        // Just outside the band: still in the previous tick.
        let now = SimTime(1.0 - 2.0e-6);
        assert_eq!(current_big_tick(&config, now), SimTime(0.0));
        assert_eq!(next_big_tick(&config, now), SimTime(1.0));
    }

    #[test]
    fn test_boundary_is_its_own_current_tick() {
        let config = SimConfig::new(1, 1, 1, 1).with_grid(1, 1);
        assert_eq!(current_big_tick(&config, SimTime(3.0)), SimTime(3.0));
        assert_eq!(next_big_tick(&config, SimTime(3.0)), SimTime(4.0));
    }

    #[test]
    fn test_elapsed_big_ticks() {
        let config = SimConfig::new(1, 1, 1, 1).with_grid(1, 1);
        assert_eq!(elapsed_big_ticks(&config, SimTime(0.2), SimTime(0.8)), 0);
        assert_eq!(elapsed_big_ticks(&config, SimTime(0.2), SimTime(1.1)), 1);
        assert_eq!(elapsed_big_ticks(&config, SimTime(0.5), SimTime(4.5)), 4);
        // Tolerance band counts as the boundary itself.
        let mut config = config;
        config.big_tick_err = 1.0e-6;
        assert_eq!(
            elapsed_big_ticks(&config, SimTime(0.1), SimTime(1.0 - 5.0e-7)),
            1
        );
    }

    #[test]
    fn test_inverse_normal_cdf_symmetry() {
        assert!(inverse_normal_cdf(0.5).abs() < 1.0e-9);
        let hi = inverse_normal_cdf(0.975);
        assert!((hi - 1.959964).abs() < 1.0e-4);
        assert!((inverse_normal_cdf(0.025) + hi).abs() < 1.0e-6);
    }

    #[test]
    fn test_bin_mode_two_point_support() {
        let mut config = config_with_mode(TimeDistribution::Bin);
        config.bin_probability = 0.5;
        let mut rng = TestRng::new(99);
        let mut saw_short = false;
        let mut saw_long = false;
        for _ in 0..1_000 {
            let delta = next_event_time(&config, &mut rng);
            if (delta.0 - config.little_tick).abs() < 1.0e-12 {
                saw_short = true;
            } else {
                assert!((delta.0 - 0.5).abs() < 1.0e-12);
                saw_long = true;
            }
        }
        assert!(saw_short && saw_long);
    }
}
