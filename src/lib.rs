//! SideRoll - dice and coin roller with custom side titles and presets
//!
//! The `roller` module holds the roll animator, the configuration store and
//! the Bevy systems for the 3D window. The binary adds a command line front
//! end over the same pieces.

pub mod roller;
