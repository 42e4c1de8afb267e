pub mod collections;
pub mod creation_guard;
pub mod folder_chain;
pub mod merge;
pub mod path;
pub mod reference;
pub mod resolve;

pub use collections::{FolderCollection, TemplateCollection};
pub use creation_guard::*;
pub use folder_chain::*;
pub use merge::*;
pub use path::*;
pub use reference::*;
pub use resolve::*;
