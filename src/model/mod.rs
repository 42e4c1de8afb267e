pub mod common;
pub mod folder;
pub mod query;
pub mod render;
pub mod template;

pub use common::*;
pub use folder::*;
pub use query::*;
pub use render::*;
pub use template::*;
