//! Bevy components, resources and messages for the 3D roller window

use bevy::prelude::*;
use rand::rngs::StdRng;

use super::config::{DiceConfig, PresetEntry};
use super::roll::{CubeFace, RollPhase};
use super::settings::ConfigStore;
use crate::roller::animator::{RngSource, RollAnimator, REVEAL_DELAY};

/// Length of the spin tween, matching the reveal delay.
pub const SPIN_SECONDS: f32 = 1.0;

// ============================================================================
// Scene markers
// ============================================================================

/// Pivot entity of the cube. Its rotation is driven by [`SpinAnimation`].
#[derive(Component)]
pub struct CubeRoot;

/// Pivot entity of the coin.
#[derive(Component)]
pub struct CoinRoot;

/// Number label on one cube face.
#[derive(Component)]
pub struct FaceLabel {
    pub face: CubeFace,
}

#[derive(Component)]
pub struct MainCamera;

// ============================================================================
// UI markers
// ============================================================================

/// Large text showing the rolled title.
#[derive(Component)]
pub struct ResultTitleText;

/// Side count and preset line.
#[derive(Component)]
pub struct StatusText;

#[derive(Component)]
pub struct RollButton;

/// Adds its value to the side count when clicked.
#[derive(Component, Clone, Copy)]
pub struct SidesButton(pub i32);

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetButton {
    Previous,
    Next,
    Load,
    Delete,
}

// ============================================================================
// Animation
// ============================================================================

/// Eased tween between two `(x, y)` rotations in degrees.
///
/// Angles use the cube convention: `x` around the horizontal axis, `y` around
/// the vertical one. The coin only uses `y`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SpinAnimation {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub elapsed: f32,
    pub duration: f32,
}

impl Default for SpinAnimation {
    fn default() -> Self {
        Self {
            from: (0.0, 0.0),
            to: (0.0, 0.0),
            elapsed: SPIN_SECONDS,
            duration: SPIN_SECONDS,
        }
    }
}

impl SpinAnimation {
    /// Start a new tween from wherever the current one is showing.
    pub fn retarget(&mut self, to: (f64, f64)) {
        self.from = self.current();
        self.to = to;
        self.elapsed = 0.0;
    }

    pub fn advance(&mut self, delta: f32) {
        self.elapsed = (self.elapsed + delta).min(self.duration);
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        f64::from((self.elapsed / self.duration).clamp(0.0, 1.0))
    }

    /// Angles shown at the current point of the tween.
    pub fn current(&self) -> (f64, f64) {
        let t = ease_out_cubic(self.progress());
        (
            self.from.0 + (self.to.0 - self.from.0) * t,
            self.from.1 + (self.to.1 - self.from.1) * t,
        )
    }
}

pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Cube orientation for `(x, y)` degrees. The cube is turned about X first and
/// then about Y, with X negated so positive angles tip the top face away.
pub fn cube_rotation(x_deg: f64, y_deg: f64) -> Quat {
    let x = (-x_deg).rem_euclid(360.0).to_radians() as f32;
    let y = y_deg.rem_euclid(360.0).to_radians() as f32;
    Quat::from_rotation_x(x) * Quat::from_rotation_y(y)
}

pub fn coin_rotation(y_deg: f64) -> Quat {
    Quat::from_rotation_y(y_deg.rem_euclid(360.0).to_radians() as f32)
}

/// Outward direction of a cube face in the resting (unrotated) cube.
pub fn face_normal(face: CubeFace) -> Vec3 {
    match face.index() {
        1 => Vec3::Z,
        2 => Vec3::X,
        3 => Vec3::NEG_Z,
        4 => Vec3::NEG_X,
        5 => Vec3::Y,
        _ => Vec3::NEG_Y,
    }
}

/// Label placement for a face: the inverse of the rotation that brings the face
/// to the front, so the label reads upright when that face lands.
pub fn face_label_transform(face: CubeFace, offset: f32, scale: f32) -> Transform {
    let (x, y) = face.orientation();
    let rotation = cube_rotation(x, y).inverse();
    Transform::from_translation(rotation * Vec3::new(0.0, 0.0, offset))
        .with_rotation(rotation)
        .with_scale(Vec3::splat(scale))
}

// ============================================================================
// Session state
// ============================================================================

/// A title reveal waiting for its roll's animation to finish.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReveal {
    pub remaining: f32,
    pub outcome: u32,
    /// Configuration as it was when the roll was triggered.
    pub config: DiceConfig,
}

/// Reveals fire in trigger order and are never cancelled.
#[derive(Resource, Debug, Default)]
pub struct RevealQueue {
    pub pending: Vec<PendingReveal>,
}

impl RevealQueue {
    pub fn schedule(&mut self, outcome: u32, config: DiceConfig) {
        self.pending.push(PendingReveal {
            remaining: REVEAL_DELAY.as_secs_f32(),
            outcome,
            config,
        });
    }

    /// Count down every reveal and return the titles that are due, oldest first.
    pub fn tick(&mut self, delta: f32) -> Vec<String> {
        let mut due = Vec::new();
        self.pending.retain_mut(|reveal| {
            reveal.remaining -= delta;
            if reveal.remaining <= 0.0 {
                due.push(reveal.config.title_for(reveal.outcome));
                false
            } else {
                true
            }
        });
        due
    }
}

/// Everything the window needs between frames.
#[derive(Resource)]
pub struct RollerSession {
    pub animator: RollAnimator,
    pub config: DiceConfig,
    pub phase: RollPhase,
    pub store: Option<ConfigStore>,
    pub presets: Vec<PresetEntry>,
    pub preset_cursor: usize,
    /// Short notice shown after the status line (save errors, preset actions).
    pub notice: Option<String>,
}

impl RollerSession {
    pub fn new(config: DiceConfig, store: Option<ConfigStore>) -> Self {
        Self {
            animator: RollAnimator::new(),
            config,
            phase: RollPhase::Idle,
            store,
            presets: Vec::new(),
            preset_cursor: 0,
            notice: None,
        }
    }

    pub fn selected_preset(&self) -> Option<&PresetEntry> {
        self.presets.get(self.preset_cursor)
    }

    pub fn status_line(&self) -> String {
        let kind = if self.config.is_coin() { "coin" } else { "die" };
        let mut line = format!("{} sides ({})", self.config.sides, kind);
        match self.selected_preset() {
            Some(entry) => line.push_str(&format!("  |  Preset: {}", entry.label())),
            None => line.push_str("  |  No presets"),
        }
        if self.phase == RollPhase::Rolling {
            line.push_str("  |  Rolling");
        }
        if let Some(notice) = &self.notice {
            line.push_str(&format!("  |  {}", notice));
        }
        line
    }
}

/// Random source for rolls made in the window.
#[derive(Resource)]
pub struct RollRng(pub RngSource<StdRng>);

impl Default for RollRng {
    fn default() -> Self {
        Self(RngSource::from_entropy())
    }
}

/// Request a roll with the current configuration.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct RollRequested;

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn assert_quat_close(a: Quat, b: Quat) {
        assert!(a.dot(b).abs() > 0.9999, "{:?} vs {:?}", a, b);
    }

    #[test]
    fn test_landing_rotation_brings_face_to_front() {
        for face in CubeFace::ALL {
            let (x, y) = face.orientation();
            let turned = cube_rotation(x + 1800.0, y + 2160.0) * face_normal(face);
            assert!(turned.distance(Vec3::Z) < 1e-4, "{} -> {:?}", face, turned);
        }
    }

    #[test]
    fn test_label_sits_on_its_face() {
        for face in CubeFace::ALL {
            let transform = face_label_transform(face, 1.0, 1.0);
            assert!(transform.translation.distance(face_normal(face)) < 1e-4);
        }
    }

    #[test]
    fn test_coin_tails_faces_front_at_180() {
        assert_quat_close(coin_rotation(1980.0), Quat::from_rotation_y(PI));
        assert_quat_close(coin_rotation(2160.0), Quat::IDENTITY);
    }

    #[test]
    fn test_spin_animation_eases_to_target() {
        let mut spin = SpinAnimation::default();
        assert!(spin.is_finished());
        spin.retarget((1800.0, 1710.0));
        assert_eq!(spin.current(), (0.0, 0.0));
        spin.advance(0.5);
        let (x, _) = spin.current();
        assert!(x > 900.0 && x < 1800.0);
        spin.advance(1.0);
        assert!(spin.is_finished());
        assert_eq!(spin.current(), (1800.0, 1710.0));
    }

    #[test]
    fn test_retarget_mid_spin_starts_from_shown_angle() {
        let mut spin = SpinAnimation::default();
        spin.retarget((720.0, 0.0));
        spin.advance(0.5);
        let shown = spin.current();
        spin.retarget((2000.0, 0.0));
        assert_eq!(spin.from, shown);
    }

    #[test]
    fn test_reveal_queue_fires_each_roll_with_its_own_title() {
        let mut queue = RevealQueue::default();
        let mut config = DiceConfig::new(6);
        config.set_title(3, "Lucky");
        queue.schedule(3, config.clone());

        config.set_title(3, "Changed");
        queue.schedule(3, config);

        assert!(queue.tick(0.5).is_empty());
        assert_eq!(queue.tick(0.6), vec!["Lucky".to_string(), "Changed".to_string()]);
        assert!(queue.pending.is_empty());
    }

    #[test]
    fn test_status_line() {
        let mut session = RollerSession::new(DiceConfig::new(2), None);
        assert_eq!(session.status_line(), "2 sides (coin)  |  No presets");
        session.presets.push(PresetEntry {
            id: 1,
            name: "Chores".to_string(),
            sides: 4,
        });
        assert!(session.status_line().ends_with("Preset: Chores (4 sides)"));

        session.phase = RollPhase::Rolling;
        assert!(session.status_line().ends_with("Chores (4 sides)  |  Rolling"));
    }
}
