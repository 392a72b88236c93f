//! Type definitions for the SideRoll dice and coin roller
//!
//! This module is organized into submodules:
//! - `config` - Side count, custom titles, presets and title resolution
//! - `roll` - Rotation state, cube face table and roll plans
//! - `database` - Embedded SurrealDB storage for settings and presets
//! - `settings` - Configuration store used by both front ends
//! - `ui` - Bevy components and resources for the 3D window

pub mod config;
pub mod database;
pub mod roll;
pub mod settings;
pub mod ui;

// Re-export all public types for convenient access
pub use config::*;
pub use database::*;
pub use roll::*;
pub use settings::*;
pub use ui::*;
