//! Systems module for the roller window
//!
//! - `setup`: Scene initialization (camera, lights, cube, coin, UI)
//! - `input`: Keyboard and button handling
//! - `animation`: Roll tweens, face labels and delayed title reveals

mod animation;
mod input;
pub mod setup;

// Re-export all public systems
pub use animation::{
    animate_spins, reveal_titles, start_rolls, sync_visual_kind, update_status_text,
};
pub use input::{
    apply_preset_action, change_sides, handle_keyboard, handle_preset_buttons,
    handle_roll_button, handle_sides_buttons, refresh_presets,
};
pub use setup::setup;
