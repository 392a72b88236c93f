pub mod animator;
pub mod meshes;
pub mod systems;
pub mod types;

pub use animator::*;
pub use meshes::*;
pub use systems::*;
pub use types::*;
