//! Branching dialogue: JSON scripts and the walker that presents them

pub mod script;
pub mod walker;

pub use script::{Actor, Actors, Choice, DialogueNode, DialogueScript, Side, Step};
pub use walker::DialogueWalker;
