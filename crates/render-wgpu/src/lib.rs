//! wgpu shading stage for render plans.
//!
//! Points are drawn as screen-space quads sized by the plan's point size;
//! lines as a line list over consecutive position pairs. Colors are resolved
//! per vertex in the shader according to the plan's color mode.
//!
//! # Invariants
//! - Group 0 `@binding(n)` numbers are the plan's slot numbers.
//! - The renderer never reads back or mutates geometry.
//! - Group 1 holds only backend-private state (viewport size).

mod gpu;
pub mod shaders;

pub use gpu::{WgpuFrame, WgpuPlanRenderer, binding_contents, layout_entries, vertex_count};
pub use shaders::{ShaderKey, plan_shader};
