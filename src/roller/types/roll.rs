//! Roll state types
//!
//! This module contains the session rotation state, the fixed cube face
//! orientation table and the plan produced for each roll.

use std::fmt;

/// Number of faces on the cube visual.
pub const CUBE_FACES: u8 = 6;

/// Accumulated rotation of the cube and coin across all rolls of a session.
///
/// Angles are in degrees. The dice fields only ever grow between rolls so the
/// renderer always spins forward; they are zeroed only when the NaN guard trips.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollState {
    pub accumulated_x: f64,
    pub accumulated_y: f64,
    pub last_target_x: f64,
    pub last_target_y: f64,
    pub accumulated_coin: f64,
}

impl RollState {
    /// Combined cube transform in CSS notation, used for logging.
    pub fn cube_transform(&self) -> String {
        format!(
            "rotateX({}deg) rotateY({}deg)",
            self.accumulated_x, self.accumulated_y
        )
    }

    /// Coin transform in CSS notation, used for logging.
    pub fn coin_transform(&self) -> String {
        format!("rotateY({}deg)", self.accumulated_coin)
    }

    pub fn is_corrupted(&self) -> bool {
        self.accumulated_x.is_nan() || self.accumulated_y.is_nan()
    }

    /// Zero the four cube fields. The coin rotation is left alone.
    pub fn reset_cube(&mut self) {
        self.accumulated_x = 0.0;
        self.accumulated_y = 0.0;
        self.last_target_x = 0.0;
        self.last_target_y = 0.0;
    }
}

/// One of the six cube faces, numbered 1..=6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubeFace(u8);

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace(1),
        CubeFace(2),
        CubeFace(3),
        CubeFace(4),
        CubeFace(5),
        CubeFace(6),
    ];

    pub fn new(index: u8) -> Option<Self> {
        (1..=CUBE_FACES).contains(&index).then_some(CubeFace(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Canonical `(x, y)` angles in degrees that bring this face to the front.
    pub fn orientation(self) -> (f64, f64) {
        match self.0 {
            1 => (0.0, 0.0),
            2 => (0.0, -90.0),
            3 => (0.0, -180.0),
            4 => (0.0, 90.0),
            5 => (-90.0, 0.0),
            _ => (90.0, 0.0),
        }
    }
}

impl fmt::Display for CubeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face {}", self.0)
    }
}

/// Lifecycle of the most recent roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RollPhase {
    #[default]
    Idle,
    Rolling,
    Settled,
}

/// What the renderer must show for a roll.
#[derive(Debug, Clone, PartialEq)]
pub enum RollVisual {
    Dice {
        landing_face: CubeFace,
        /// Number printed on faces 1..=6, in face order.
        faces: [u32; CUBE_FACES as usize],
        spins: u32,
        rotation_x: f64,
        rotation_y: f64,
        /// True when the NaN guard reset the cube rotation during this roll.
        recovered: bool,
    },
    Coin {
        heads: bool,
        spins: u32,
        rotation_y: f64,
    },
}

/// Result of triggering a roll: the outcome plus everything needed to render it.
#[derive(Debug, Clone, PartialEq)]
pub struct RollPlan {
    pub outcome: u32,
    pub sides: u32,
    pub visual: RollVisual,
}

impl RollPlan {
    pub fn is_coin(&self) -> bool {
        matches!(self.visual, RollVisual::Coin { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_orientation_table() {
        let expected = [
            (0.0, 0.0),
            (0.0, -90.0),
            (0.0, -180.0),
            (0.0, 90.0),
            (-90.0, 0.0),
            (90.0, 0.0),
        ];
        for (face, want) in CubeFace::ALL.iter().zip(expected) {
            assert_eq!(face.orientation(), want, "{}", face);
        }
    }

    #[test]
    fn test_cube_face_bounds() {
        assert!(CubeFace::new(0).is_none());
        assert!(CubeFace::new(7).is_none());
        assert_eq!(CubeFace::new(6).map(CubeFace::index), Some(6));
    }

    #[test]
    fn test_roll_state_default_is_zeroed() {
        let state = RollState::default();
        assert_eq!(state.accumulated_x, 0.0);
        assert_eq!(state.accumulated_coin, 0.0);
        assert!(!state.is_corrupted());
    }

    #[test]
    fn test_reset_cube_keeps_coin() {
        let mut state = RollState {
            accumulated_x: f64::NAN,
            accumulated_y: 10.0,
            last_target_x: 90.0,
            last_target_y: -90.0,
            accumulated_coin: 1980.0,
        };
        assert!(state.is_corrupted());
        state.reset_cube();
        assert_eq!(state.accumulated_x, 0.0);
        assert_eq!(state.last_target_y, 0.0);
        assert_eq!(state.accumulated_coin, 1980.0);
    }

    #[test]
    fn test_transform_strings() {
        let state = RollState {
            accumulated_x: 1800.0,
            accumulated_y: 1620.0,
            accumulated_coin: 2160.0,
            ..Default::default()
        };
        assert_eq!(state.cube_transform(), "rotateX(1800deg) rotateY(1620deg)");
        assert_eq!(state.coin_transform(), "rotateY(2160deg)");
    }
}
