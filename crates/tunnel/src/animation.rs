//! Per-frame animation state for the wormhole.
//!
//! The updater advances three independent things every frame:
//!
//! - shader time, scaled from the monotonic clock by `time_scale`;
//! - a cyclic texture offset that creeps forward and wraps at `offset_modulus`;
//! - the camera roll and the cylinder spin.
//!
//! Scroll input nudges the cyclic offset directly. That nudge is deliberately
//! left unwrapped: only the next [`Animator::tick`] folds the offset back into
//! range, so a reader inspecting the state between a scroll event and the next
//! frame can see values outside `[0, offset_modulus)`.

use std::f64::consts::TAU;

use crate::clock::ClockReading;

/// Base per-frame offset increment.
pub const NORMAL_SPEED: f64 = 0.005;
/// Multiplier applied to [`NORMAL_SPEED`]; nothing changes it at runtime.
pub const SPEED_MULTIPLIER: f64 = 1.0;
/// Cylinder spin added per frame (radians).
pub const ROTATION_STEP: f64 = 0.001;
/// Camera roll per epoch second (radians).
pub const CAMERA_ROLL_RATE: f64 = 0.1;
/// Scale from monotonic milliseconds to shader time.
pub const TIME_SCALE: f64 = 0.009;
/// Offset change per scroll event.
pub const SCROLL_STEP: f64 = 0.05;
/// Wrap modulus for the cyclic offset.
pub const OFFSET_MODULUS: f64 = 10.0;

/// Constants that drive the animation, overridable from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTunables {
    pub normal_speed: f64,
    pub speed_multiplier: f64,
    pub rotation_step: f64,
    pub camera_roll_rate: f64,
    pub time_scale: f64,
    pub scroll_step: f64,
    pub offset_modulus: f64,
}

impl AnimationTunables {
    /// Offset added by every tick.
    pub fn offset_increment(&self) -> f64 {
        self.normal_speed * self.speed_multiplier
    }
}

impl Default for AnimationTunables {
    fn default() -> Self {
        Self {
            normal_speed: NORMAL_SPEED,
            speed_multiplier: SPEED_MULTIPLIER,
            rotation_step: ROTATION_STEP,
            camera_roll_rate: CAMERA_ROLL_RATE,
            time_scale: TIME_SCALE,
            scroll_step: SCROLL_STEP,
            offset_modulus: OFFSET_MODULUS,
        }
    }
}

/// Direction of the most recent scroll adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    #[default]
    Increase,
    Decrease,
}

impl ScrollDirection {
    /// Only strictly positive deltas increase the offset; zero counts as a decrease.
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            ScrollDirection::Increase
        } else {
            ScrollDirection::Decrease
        }
    }

    fn sign(self) -> f64 {
        match self {
            ScrollDirection::Increase => 1.0,
            ScrollDirection::Decrease => -1.0,
        }
    }
}

/// Snapshot of everything the updater owns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationState {
    /// Scaled shader time; not seconds despite feeding a `time` uniform.
    pub elapsed_time: f64,
    pub cyclic_offset: f64,
    pub scroll_direction: ScrollDirection,
    /// Camera roll about the view axis, reduced to `[0, TAU)`.
    pub camera_roll: f64,
    /// Accumulated cylinder spin about its own axis.
    pub mesh_spin: f64,
}

impl Default for AnimationState {
    /// Shader time starts at 2.0 until the first tick overwrites it.
    fn default() -> Self {
        Self {
            elapsed_time: 2.0,
            cyclic_offset: 0.0,
            scroll_direction: ScrollDirection::default(),
            camera_roll: 0.0,
            mesh_spin: 0.0,
        }
    }
}

/// Reduces `value` into `[0, modulus)`.
pub fn wrap_offset(value: f64, modulus: f64) -> f64 {
    let wrapped = value.rem_euclid(modulus);
    // rem_euclid rounds tiny negative inputs up to exactly `modulus`.
    if wrapped >= modulus {
        0.0
    } else {
        wrapped
    }
}

/// Owns [`AnimationState`] and applies frame ticks and scroll events to it.
#[derive(Debug, Clone)]
pub struct Animator {
    tunables: AnimationTunables,
    state: AnimationState,
}

impl Animator {
    pub fn new(tunables: AnimationTunables) -> Self {
        Self {
            tunables,
            state: AnimationState::default(),
        }
    }

    pub fn tunables(&self) -> &AnimationTunables {
        &self.tunables
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Advances the animation by one rendered frame.
    pub fn tick(&mut self, reading: ClockReading) -> &AnimationState {
        let tunables = &self.tunables;
        let increment = tunables.offset_increment();
        tracing::trace!(increment, "advancing uv offset");

        self.state.elapsed_time = reading.monotonic_millis * tunables.time_scale;
        self.state.cyclic_offset = wrap_offset(
            self.state.cyclic_offset + increment,
            tunables.offset_modulus,
        );

        let seconds = reading.epoch_millis / 1000.0;
        self.state.camera_roll = (tunables.camera_roll_rate * seconds).rem_euclid(TAU);
        self.state.mesh_spin += tunables.rotation_step;

        &self.state
    }

    /// Applies one scroll event. Only the sign of `delta` matters.
    ///
    /// Returns the adjusted offset, which is not wrapped until the next tick.
    pub fn scroll(&mut self, delta: f64) -> f64 {
        let direction = ScrollDirection::from_delta(delta);
        self.state.scroll_direction = direction;
        self.state.cyclic_offset += direction.sign() * self.tunables.scroll_step;
        tracing::debug!(
            offset = self.state.cyclic_offset,
            ?direction,
            "adjusted uv offset"
        );
        self.state.cyclic_offset
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(AnimationTunables::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(millis: f64) -> ClockReading {
        ClockReading::new(millis, 1_700_000_000_000.0 + millis)
    }

    #[test]
    fn ticks_accumulate_offset_modulo_ten() {
        for frames in [1_u32, 150, 2_500, 4_321] {
            let mut animator = Animator::default();
            for frame in 0..frames {
                animator.tick(reading(f64::from(frame) * 16.0));
            }
            let expected = (f64::from(frames) * NORMAL_SPEED * SPEED_MULTIPLIER) % 10.0;
            let offset = animator.state().cyclic_offset;
            assert!(
                (offset - expected).abs() < 1e-9,
                "{frames} frames: {offset} != {expected}"
            );
        }
    }

    #[test]
    fn offset_stays_in_range_across_many_ticks() {
        let mut animator = Animator::default();
        for frame in 0..5_000 {
            let offset = animator.tick(reading(f64::from(frame))).cyclic_offset;
            assert!((0.0..10.0).contains(&offset), "offset {offset} escaped range");
        }
    }

    #[test]
    fn scroll_is_not_wrapped_until_next_tick() {
        let mut animator = Animator::default();
        // 1995 ticks leave the offset at ~9.975, one scroll away from the modulus.
        for frame in 0..1_995 {
            animator.tick(reading(f64::from(frame)));
        }
        let before = animator.state().cyclic_offset;
        let after = animator.scroll(3.0);
        assert!((after - (before + SCROLL_STEP)).abs() < 1e-12);
        assert!(after >= 10.0, "scroll adjustment should not be wrapped yet");
        assert_eq!(animator.state().scroll_direction, ScrollDirection::Increase);

        let wrapped = animator.tick(reading(2_000.0)).cyclic_offset;
        assert!((0.0..10.0).contains(&wrapped));
        assert!((wrapped - (after + NORMAL_SPEED - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn downward_scroll_below_zero_wraps_on_tick() {
        let mut animator = Animator::default();
        let adjusted = animator.scroll(-120.0);
        assert!((adjusted + SCROLL_STEP).abs() < 1e-12);
        assert_eq!(animator.state().scroll_direction, ScrollDirection::Decrease);

        let wrapped = animator.tick(reading(0.0)).cyclic_offset;
        assert!((wrapped - (10.0 - SCROLL_STEP + NORMAL_SPEED)).abs() < 1e-9);
    }

    #[test]
    fn zero_delta_counts_as_decrease() {
        let mut animator = Animator::default();
        animator.scroll(0.0);
        assert_eq!(animator.state().scroll_direction, ScrollDirection::Decrease);
        assert!((animator.state().cyclic_offset + SCROLL_STEP).abs() < 1e-12);
    }

    #[test]
    fn scroll_magnitude_is_ignored() {
        let mut small = Animator::default();
        let mut large = Animator::default();
        assert_eq!(small.scroll(0.001), large.scroll(1_000.0));
    }

    #[test]
    fn elapsed_time_tracks_clock_not_frame_count() {
        let mut animator = Animator::default();
        assert_eq!(animator.state().elapsed_time, 2.0);
        let mut last = f64::NEG_INFINITY;
        for millis in [0.0, 5.0, 5.0, 100.0, 1_000.0, 1_000.5] {
            let time = animator.tick(reading(millis)).elapsed_time;
            assert!(time >= last);
            assert!((time - millis * TIME_SCALE).abs() < 1e-12);
            last = time;
        }
    }

    #[test]
    fn camera_roll_and_spin_advance() {
        let mut animator = Animator::default();
        animator.tick(ClockReading::new(0.0, 10_000.0));
        assert!((animator.state().camera_roll - 1.0).abs() < 1e-12);
        animator.tick(ClockReading::new(16.0, 10_016.0));
        assert!((animator.state().mesh_spin - 2.0 * ROTATION_STEP).abs() < 1e-12);
    }

    #[test]
    fn wrap_offset_handles_edges() {
        assert_eq!(wrap_offset(10.0, 10.0), 0.0);
        assert_eq!(wrap_offset(-1e-18, 10.0), 0.0);
        assert!((wrap_offset(-0.5, 10.0) - 9.5).abs() < 1e-12);
        assert!((wrap_offset(23.25, 10.0) - 3.25).abs() < 1e-12);
    }
}
