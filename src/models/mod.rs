pub mod coefficient;
pub mod event;
pub mod farm;
pub mod fertilizer;
pub mod id;
pub mod reference;
pub mod registry;

pub use coefficient::*;
pub use event::*;
pub use farm::*;
pub use fertilizer::*;
pub use id::*;
pub use reference::*;
pub use registry::*;
