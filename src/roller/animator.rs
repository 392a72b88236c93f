//! Roll animator
//!
//! Picks the outcome of a roll and turns it into forward-only rotation state
//! for the cube or coin visual. Everything here is independent of Bevy so the
//! CLI and the 3D window share one implementation.

use bevy::log::{error, info};
use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};
use std::time::Duration;

use super::types::{
    CubeFace, DiceConfig, RollPlan, RollState, RollVisual, CUBE_FACES, MIN_SIDES,
};

/// Minimum number of full turns added to every roll.
pub const MIN_SPINS: u32 = 5;
/// Extra full turns are drawn from `0..EXTRA_SPIN_CHOICES`.
pub const EXTRA_SPIN_CHOICES: u32 = 3;
/// Draws allowed per decoy face before falling back to a fixed value.
pub const DECOY_ATTEMPTS: u32 = 10;
/// Time between triggering a roll and revealing its title.
pub const REVEAL_DELAY: Duration = Duration::from_millis(1000);

/// Source of uniform random integers.
pub trait RandomSource {
    /// Uniform integer in `[0, n)`. `n` is always at least 1.
    fn below(&mut self, n: u32) -> u32;
}

/// Adapter from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn below(&mut self, n: u32) -> u32 {
        self.0.gen_range(0..n.max(1))
    }
}

/// Draw from the source and reject values outside the requested range.
fn draw(rng: &mut impl RandomSource, n: u32) -> Result<u32, String> {
    let n = n.max(1);
    let value = rng.below(n);
    if value >= n {
        return Err(format!(
            "Random source returned {} for range [0, {})",
            value, n
        ));
    }
    Ok(value)
}

/// Uniform outcome in `[1, sides]`. Side counts below two are treated as two.
pub fn select_outcome(rng: &mut impl RandomSource, sides: u32) -> Result<u32, String> {
    Ok(draw(rng, sides.max(MIN_SIDES))? + 1)
}

/// Full turns for one roll: the minimum plus up to two extra.
pub fn spin_count(rng: &mut impl RandomSource) -> Result<u32, String> {
    Ok(MIN_SPINS + draw(rng, EXTRA_SPIN_CHOICES)?)
}

/// Result of advancing the cube rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiceSpin {
    pub state: RollState,
    pub target: (f64, f64),
    /// The NaN guard fired and the cube fields were reset.
    pub recovered: bool,
}

/// Advance the cube rotation so `landing` ends up at the front.
///
/// The delta between targets is applied raw, without wrapping; the targets are
/// small fixed angles so the full turns always dominate.
pub fn accumulate_dice_rotation(state: RollState, landing: CubeFace, spins: u32) -> DiceSpin {
    let (target_x, target_y) = landing.orientation();
    let turns = f64::from(spins) * 360.0;

    let delta_x = target_x - state.last_target_x;
    let delta_y = target_y - state.last_target_y;

    let mut next = state;
    next.accumulated_x += turns + delta_x;
    next.accumulated_y += turns + delta_y;
    next.last_target_x = target_x;
    next.last_target_y = target_y;

    let recovered = next.is_corrupted();
    if recovered {
        error!(
            "Cube rotation is NaN (x={}, y={}, delta=({}, {}), target=({}, {})); resetting",
            next.accumulated_x, next.accumulated_y, delta_x, delta_y, target_x, target_y
        );
        next.reset_cube();
    }

    DiceSpin {
        state: next,
        target: (target_x, target_y),
        recovered,
    }
}

/// Forward-only turn needed to bring the coin from `accumulated` to `target`,
/// always in `[0, 360)`.
pub fn coin_turn(accumulated: f64, target: f64) -> f64 {
    let current = accumulated % 360.0;
    let mut diff = target - current;
    if diff < 0.0 {
        diff += 360.0;
    }
    diff
}

/// Advance the coin rotation so the requested side faces the viewer.
pub fn accumulate_coin_rotation(state: RollState, heads: bool, spins: u32) -> RollState {
    let target = if heads { 0.0 } else { 180.0 };
    let diff = coin_turn(state.accumulated_coin, target);

    let mut next = state;
    next.accumulated_coin += f64::from(spins) * 360.0 + diff;
    next
}

/// Pick a number for a non-landing face that differs from the outcome.
pub fn pick_decoy(rng: &mut impl RandomSource, outcome: u32, sides: u32) -> Result<u32, String> {
    let sides = sides.max(MIN_SIDES);
    let mut decoy = outcome;
    for _ in 0..DECOY_ATTEMPTS {
        decoy = draw(rng, sides)? + 1;
        if decoy != outcome {
            return Ok(decoy);
        }
    }
    if decoy == outcome {
        decoy = (outcome % sides) + 1;
    }
    Ok(decoy)
}

/// Numbers for all six faces: the outcome on the landing face and decoys
/// everywhere else. Decoys may repeat among themselves.
pub fn fill_faces(
    rng: &mut impl RandomSource,
    outcome: u32,
    sides: u32,
    landing: CubeFace,
) -> Result<[u32; CUBE_FACES as usize], String> {
    let mut faces = [outcome; CUBE_FACES as usize];
    for face in CubeFace::ALL {
        if face != landing {
            faces[usize::from(face.index() - 1)] = pick_decoy(rng, outcome, sides)?;
        }
    }
    Ok(faces)
}

/// Owner of the session rotation state.
#[derive(Debug, Clone, Default)]
pub struct RollAnimator {
    state: RollState,
}

impl RollAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: RollState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> RollState {
        self.state
    }

    /// Run one roll: choose the outcome, commit the rotation and describe the
    /// visual. The title is resolved later, when the reveal fires.
    pub fn roll(
        &mut self,
        config: &DiceConfig,
        rng: &mut impl RandomSource,
    ) -> Result<RollPlan, String> {
        let sides = config.sides.max(MIN_SIDES);
        let outcome = select_outcome(rng, sides)?;

        let visual = if sides == MIN_SIDES {
            let heads = outcome == 1;
            let spins = spin_count(rng)?;
            self.state = accumulate_coin_rotation(self.state, heads, spins);
            info!(
                "Flipped {} ({})",
                if heads { "heads" } else { "tails" },
                self.state.coin_transform()
            );
            RollVisual::Coin {
                heads,
                spins,
                rotation_y: self.state.accumulated_coin,
            }
        } else {
            let landing_index = draw(rng, u32::from(CUBE_FACES))? + 1;
            let landing = CubeFace::new(landing_index as u8)
                .ok_or_else(|| format!("Invalid landing face {}", landing_index))?;
            let faces = fill_faces(rng, outcome, sides, landing)?;
            let spins = spin_count(rng)?;

            let spin = accumulate_dice_rotation(self.state, landing, spins);
            self.state = spin.state;
            info!(
                "Rolled {} of {} on {} ({})",
                outcome,
                sides,
                landing,
                self.state.cube_transform()
            );
            RollVisual::Dice {
                landing_face: landing,
                faces,
                spins,
                rotation_x: self.state.accumulated_x,
                rotation_y: self.state.accumulated_y,
                recovered: spin.recovered,
            }
        };

        Ok(RollPlan {
            outcome,
            sides,
            visual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Replays fixed values; panics if the script runs dry.
    struct Scripted(VecDeque<u32>);

    impl Scripted {
        fn new(values: &[u32]) -> Self {
            Self(values.iter().copied().collect())
        }
    }

    impl RandomSource for Scripted {
        fn below(&mut self, _n: u32) -> u32 {
            self.0.pop_front().expect("script exhausted")
        }
    }

    #[test]
    fn test_spin_count_range() {
        let mut rng = Scripted::new(&[0, 1, 2]);
        assert_eq!(spin_count(&mut rng).unwrap(), 5);
        assert_eq!(spin_count(&mut rng).unwrap(), 6);
        assert_eq!(spin_count(&mut rng).unwrap(), 7);
    }

    #[test]
    fn test_out_of_range_source_is_an_error() {
        let mut rng = Scripted::new(&[6]);
        assert!(select_outcome(&mut rng, 6).is_err());
    }

    #[test]
    fn test_dice_rotation_first_roll() {
        let face = CubeFace::new(2).unwrap();
        let spin = accumulate_dice_rotation(RollState::default(), face, 5);
        assert_eq!(spin.target, (0.0, -90.0));
        assert_eq!(spin.state.accumulated_x, 1800.0);
        assert_eq!(spin.state.accumulated_y, 1710.0);
        assert_eq!(spin.state.last_target_y, -90.0);
        assert!(!spin.recovered);
    }

    #[test]
    fn test_dice_rotation_uses_raw_delta() {
        let start = RollState {
            accumulated_y: 1710.0,
            last_target_y: -90.0,
            accumulated_x: 1800.0,
            ..Default::default()
        };
        let spin = accumulate_dice_rotation(start, CubeFace::new(4).unwrap(), 6);
        // 90 - (-90) = 180 on top of six turns
        assert_eq!(spin.state.accumulated_y, 1710.0 + 2160.0 + 180.0);
        assert_eq!(spin.state.accumulated_x, 1800.0 + 2160.0);
    }

    #[test]
    fn test_nan_guard_resets_cube_fields() {
        let corrupted = RollState {
            accumulated_x: f64::NAN,
            accumulated_y: 400.0,
            last_target_x: 90.0,
            last_target_y: -180.0,
            accumulated_coin: 540.0,
        };
        let spin = accumulate_dice_rotation(corrupted, CubeFace::new(1).unwrap(), 5);
        assert!(spin.recovered);
        assert_eq!(spin.state.accumulated_x, 0.0);
        assert_eq!(spin.state.accumulated_y, 0.0);
        assert_eq!(spin.state.last_target_x, 0.0);
        assert_eq!(spin.state.last_target_y, 0.0);
        assert_eq!(spin.state.accumulated_coin, 540.0);
    }

    #[test]
    fn test_coin_turn_wraps_forward() {
        assert_eq!(coin_turn(0.0, 0.0), 0.0);
        assert_eq!(coin_turn(0.0, 180.0), 180.0);
        assert_eq!(coin_turn(1980.0, 0.0), 180.0);
        assert_eq!(coin_turn(1980.0, 180.0), 0.0);
    }

    #[test]
    fn test_coin_rotation_lands_on_target() {
        let state = accumulate_coin_rotation(RollState::default(), false, 5);
        assert_eq!(state.accumulated_coin, 1980.0);
        let state = accumulate_coin_rotation(state, true, 7);
        assert_eq!(state.accumulated_coin, 1980.0 + 2520.0 + 180.0);
        assert_eq!(state.accumulated_coin % 360.0, 0.0);
    }

    #[test]
    fn test_decoy_retries_then_accepts() {
        // outcome 3 -> draws 2 (=3), 2 (=3), 0 (=1)
        let mut rng = Scripted::new(&[2, 2, 0]);
        assert_eq!(pick_decoy(&mut rng, 3, 6).unwrap(), 1);
    }

    #[test]
    fn test_decoy_fallback_after_ten_collisions() {
        let mut rng = Scripted::new(&[5; 10]);
        assert_eq!(pick_decoy(&mut rng, 6, 6).unwrap(), 1);
        assert!(rng.0.is_empty());

        let mut rng = Scripted::new(&[1; 10]);
        assert_eq!(pick_decoy(&mut rng, 2, 2).unwrap(), 1);
    }

    #[test]
    fn test_fill_faces_keeps_outcome_on_landing_face() {
        let mut rng = Scripted::new(&[0, 1, 3, 4, 5]);
        let faces = fill_faces(&mut rng, 3, 6, CubeFace::new(3).unwrap()).unwrap();
        assert_eq!(faces, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_roll_coin_draw_order() {
        let mut animator = RollAnimator::new();
        // outcome index 1 -> tails, extra spins 0
        let mut rng = Scripted::new(&[1, 0]);
        let plan = animator.roll(&DiceConfig::new(2), &mut rng).unwrap();
        assert_eq!(plan.outcome, 2);
        assert!(plan.is_coin());
        assert_eq!(
            plan.visual,
            RollVisual::Coin {
                heads: false,
                spins: 5,
                rotation_y: 1980.0
            }
        );
    }
}
