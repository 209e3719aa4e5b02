//! Rendering
//!
//! Scenes build a retained [`stage::Stage`]; each frame it is flattened into
//! a z-sorted draw list, turned into triangles and drawn with WebGPU.

pub mod pipeline;
pub mod shapes;
pub mod stage;
pub mod vertex;

pub use pipeline::RenderState;
pub use stage::{DrawItem, Node, NodeId, Shape, Stage};
