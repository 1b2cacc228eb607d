//! Wandering motion for the header avatar.
//!
//! The avatar walks towards a random point inside its container at a constant
//! step per frame, picks a new point once it is close enough, tilts back and
//! forth while walking and mirrors itself to face the direction of travel.
//! Everything here is pure: randomness and container geometry are injected so
//! the walker (see `walker.rs`) is the only place that touches the page.

use rand::Rng;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Facing {
    /// Artwork as drawn.
    #[default]
    Left,
    /// Horizontally mirrored.
    Right,
}

impl Facing {
    pub fn scale_x(self) -> f64 {
        match self {
            Facing::Left => 1.0,
            Facing::Right => -1.0,
        }
    }

    // Sticky: only a move against the current facing flips it, and a purely
    // vertical move (dx == 0) never does.
    fn after_move(self, dx: f64) -> Facing {
        match self {
            Facing::Left if dx > 0.0 => Facing::Right,
            Facing::Right if dx < 0.0 => Facing::Left,
            current => current,
        }
    }
}

/// Container size and avatar size, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
    pub subject_size: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64, subject_size: f64) -> Self {
        Self {
            width,
            height,
            subject_size,
        }
    }

    /// Largest x the avatar's top-left corner may take.
    pub fn max_x(&self) -> f64 {
        free_span(self.width, self.subject_size)
    }

    /// Largest y the avatar's top-left corner may take.
    pub fn max_y(&self) -> f64 {
        free_span(self.height, self.subject_size)
    }

    pub fn contains(&self, point: (f64, f64)) -> bool {
        (0.0..=self.max_x()).contains(&point.0) && (0.0..=self.max_y()).contains(&point.1)
    }
}

#[inline]
fn free_span(extent: f64, subject: f64) -> f64 {
    let span = extent - subject;
    if span.is_finite() && span > 0.0 {
        span
    } else {
        0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionParams {
    /// Distance covered per tick, in pixels.
    pub speed: f64,
    /// Phase advance per tick, in radians.
    pub tilt_speed: f64,
    pub tilt_amplitude_deg: f64,
    /// A new target is picked once the avatar is closer than this.
    pub arrival_threshold: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            speed: 0.5,
            tilt_speed: 0.1,
            tilt_amplitude_deg: 5.0,
            arrival_threshold: 5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionState {
    pub position: (f64, f64),
    pub target: (f64, f64),
    pub phase: f64,
    pub facing: Facing,
}

impl MotionState {
    /// Starts parked on a random target, so the first tick has nothing to
    /// walk and immediately picks the next one.
    pub fn new<R: Rng + ?Sized>(bounds: Bounds, rng: &mut R) -> Self {
        let target = pick_new_target(bounds, rng);
        Self::at(target, target)
    }

    pub fn at(position: (f64, f64), target: (f64, f64)) -> Self {
        Self {
            position,
            target,
            phase: 0.0,
            facing: Facing::Left,
        }
    }

    pub fn distance_to_target(&self) -> f64 {
        let (dx, dy) = displacement(self.position, self.target);
        dx.hypot(dy)
    }
}

/// What the page has to apply to the avatar for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderInstruction {
    pub translate: (f64, f64),
    pub facing: Facing,
    pub tilt_deg: f64,
}

impl RenderInstruction {
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scaleX({}) rotate({}deg)",
            self.translate.0,
            self.translate.1,
            self.facing.scale_x(),
            self.tilt_deg
        )
    }
}

/// Uniform point in `[0, max_x] x [0, max_y]`. A subject larger than its
/// container collapses that axis to 0.
pub fn pick_new_target<R: Rng + ?Sized>(bounds: Bounds, rng: &mut R) -> (f64, f64) {
    (
        rng.gen_range(0.0..=bounds.max_x()),
        rng.gen_range(0.0..=bounds.max_y()),
    )
}

/// Advances the avatar by one frame.
///
/// `bounds` is only called when a new target has to be picked, so callers can
/// defer the layout read until it is actually needed.
pub fn tick<R, B>(
    mut state: MotionState,
    params: &MotionParams,
    rng: &mut R,
    bounds: B,
) -> (MotionState, RenderInstruction)
where
    R: Rng + ?Sized,
    B: FnOnce() -> Bounds,
{
    if state.distance_to_target() < params.arrival_threshold {
        state.target = pick_new_target(bounds(), rng);
    }

    let (dx, dy) = displacement(state.position, state.target);
    let distance = dx.hypot(dy);
    // Also false for NaN, which keeps a broken layout read from poisoning
    // the position.
    if distance > 0.0 {
        state.position.0 += dx / distance * params.speed;
        state.position.1 += dy / distance * params.speed;
    }

    state.phase += params.tilt_speed;
    let tilt_deg = state.phase.sin() * params.tilt_amplitude_deg;
    state.facing = state.facing.after_move(dx);

    let instruction = RenderInstruction {
        translate: state.position,
        facing: state.facing,
        tilt_deg,
    };
    (state, instruction)
}

#[inline]
fn displacement(from: (f64, f64), to: (f64, f64)) -> (f64, f64) {
    (to.0 - from.0, to.1 - from.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::f64::consts::TAU;

    const EPS: f64 = 1e-9;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(0x5eed)
    }

    fn no_retarget() -> Bounds {
        panic!("target should not be replaced while far away")
    }

    #[test]
    fn targets_stay_inside_the_safe_area() {
        let mut rng = rng();
        let bounds = Bounds::new(640.0, 360.0, 96.0);
        for _ in 0..10_000 {
            let point = pick_new_target(bounds, &mut rng);
            assert!(bounds.contains(point), "{point:?} escaped {bounds:?}");
        }
    }

    #[test]
    fn oversized_subject_clamps_to_origin() {
        let mut rng = rng();
        let bounds = Bounds::new(50.0, 200.0, 60.0);
        for _ in 0..100 {
            let (x, y) = pick_new_target(bounds, &mut rng);
            assert_eq!(x, 0.0);
            assert!((0.0..=140.0).contains(&y));
        }
    }

    #[test]
    fn broken_geometry_does_not_panic() {
        let mut rng = rng();
        let bounds = Bounds::new(f64::NAN, f64::INFINITY, 10.0);
        assert_eq!(pick_new_target(bounds, &mut rng), (0.0, 0.0));
    }

    #[test]
    fn new_state_starts_parked_on_its_target() {
        let mut rng = rng();
        let bounds = Bounds::new(400.0, 300.0, 50.0);
        let state = MotionState::new(bounds, &mut rng);
        assert_eq!(state.position, state.target);
        assert!(bounds.contains(state.target));
        assert_eq!(state.facing, Facing::Left);
        assert_eq!(state.phase, 0.0);
    }

    #[test]
    fn arrival_picks_a_new_target_and_moves_in_the_same_tick() {
        let mut rng = rng();
        let bounds = Bounds::new(400.0, 300.0, 50.0);
        let state = MotionState::at((0.0, 0.0), (0.0, 0.0));

        let (next, instruction) = tick(state, &MotionParams::default(), &mut rng, || bounds);

        assert_ne!(next.target, (0.0, 0.0));
        assert!(bounds.contains(next.target));
        let moved = next.position.0.hypot(next.position.1);
        assert!((moved - 0.5).abs() < EPS);
        assert_eq!(instruction.translate, next.position);
    }

    #[test]
    fn walks_right_by_one_step_and_mirrors() {
        let mut rng = rng();
        let state = MotionState::at((0.0, 0.0), (100.0, 0.0));

        let (next, instruction) = tick(state, &MotionParams::default(), &mut rng, no_retarget);

        assert_eq!(next.position, (0.5, 0.0));
        assert_eq!(next.facing, Facing::Right);
        assert_eq!(instruction.facing, Facing::Right);
    }

    #[test]
    fn each_step_closes_the_gap_by_exactly_speed() {
        let mut rng = rng();
        let params = MotionParams::default();
        let mut state = MotionState::at((0.0, 0.0), (300.0, 400.0));

        for _ in 0..200 {
            let before = state.distance_to_target();
            state = tick(state, &params, &mut rng, no_retarget).0;
            let after = state.distance_to_target();
            assert!((before - after - params.speed).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_displacement_without_retarget_keeps_position() {
        let mut rng = rng();
        // A negative threshold never triggers arrival, so the zero-length
        // displacement reaches the movement guard.
        let params = MotionParams {
            arrival_threshold: -1.0,
            ..MotionParams::default()
        };
        let mut state = MotionState::at((12.0, 34.0), (12.0, 34.0));
        for _ in 0..10 {
            state = tick(state, &params, &mut rng, no_retarget).0;
            assert_eq!(state.position, (12.0, 34.0));
            assert!(state.position.0.is_finite() && state.position.1.is_finite());
        }
        assert!((state.phase - 1.0).abs() < EPS);
    }

    #[test]
    fn tilt_is_bounded_by_the_amplitude() {
        let mut rng = rng();
        let params = MotionParams::default();
        let bounds = Bounds::new(300.0, 200.0, 40.0);
        let mut state = MotionState::new(bounds, &mut rng);
        for _ in 0..5_000 {
            let (next, instruction) = tick(state, &params, &mut rng, || bounds);
            assert!(instruction.tilt_deg.abs() <= params.tilt_amplitude_deg + EPS);
            state = next;
        }
    }

    #[test]
    fn tilt_repeats_every_full_turn_of_phase() {
        let mut rng = rng();
        let params = MotionParams::default();
        let mut state = MotionState::at((0.0, 0.0), (1_000.0, 0.0));
        let mut shifted = MotionState {
            phase: state.phase + TAU,
            ..state
        };

        for k in 1..=100 {
            let (next, a) = tick(state, &params, &mut rng, no_retarget);
            let (next_shifted, b) = tick(shifted, &params, &mut rng, no_retarget);
            state = next;
            shifted = next_shifted;

            let expected = (k as f64 * params.tilt_speed + TAU).sin() * params.tilt_amplitude_deg;
            assert!((a.tilt_deg - b.tilt_deg).abs() < EPS, "tick {k}");
            assert!((b.tilt_deg - expected).abs() < EPS, "tick {k}");
        }
    }

    #[test]
    fn facing_flips_once_per_direction_change() {
        let mut rng = rng();
        let params = MotionParams::default();
        let mut state = MotionState::at((0.0, 0.0), (100.0, 10.0));
        let mut flips = 0;
        for _ in 0..150 {
            let before = state.facing;
            state = tick(state, &params, &mut rng, no_retarget).0;
            if state.facing != before {
                flips += 1;
            }
        }
        assert_eq!(flips, 1);
        assert_eq!(state.facing, Facing::Right);

        state.target = (0.0, state.position.1);
        let before = state.facing;
        state = tick(state, &params, &mut rng, no_retarget).0;
        assert_ne!(state.facing, before);
        assert_eq!(state.facing, Facing::Left);
    }

    #[test]
    fn vertical_moves_keep_the_current_facing() {
        let mut rng = rng();
        let mut state = MotionState::at((10.0, 0.0), (10.0, 100.0));
        state.facing = Facing::Right;

        let (next, _) = tick(state, &MotionParams::default(), &mut rng, no_retarget);
        assert_eq!(next.facing, Facing::Right);
        assert_eq!(next.position, (10.0, 0.5));
    }

    #[test]
    fn transform_matches_css_syntax() {
        let instruction = RenderInstruction {
            translate: (10.0, 20.5),
            facing: Facing::Right,
            tilt_deg: 2.5,
        };
        assert_eq!(
            instruction.css_transform(),
            "translate(10px, 20.5px) scaleX(-1) rotate(2.5deg)"
        );
    }

    #[test]
    fn params_fill_missing_fields_with_defaults() {
        let params: MotionParams = serde_json::from_str(r#"{"speed": 1.25}"#).unwrap();
        assert_eq!(params.speed, 1.25);
        assert_eq!(params.tilt_speed, 0.1);
        assert_eq!(params.arrival_threshold, 5.0);
    }
}
