//! Hub world building blocks

pub mod camera;
pub mod indicator;
pub mod interactable;
pub mod player;

pub use camera::Camera;
pub use indicator::Indicator;
pub use interactable::Interactable;
pub use player::{Anim, Player, PlayerBounds};
