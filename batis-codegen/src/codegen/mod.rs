//! Code generation module

mod artifacts;
mod model;
mod naming;
mod renderer;
mod session;
mod type_mapper;

pub use artifacts::*;
pub use model::*;
pub use naming::*;
pub use renderer::*;
pub use session::*;
pub use type_mapper::*;
