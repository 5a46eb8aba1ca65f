//! rdoc-dictionary - Build a desktop dictionary from ri documentation
//!
//! Renders documented classes, modules and methods into `d:entry`
//! fragments, caches them per entity, assembles the dictionary source
//! document and hands it to the dictionary compiler.

pub mod assemble;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod markup;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod toolchain;

// Re-export main types
pub use assemble::assemble;
pub use cache::{FragmentCache, RunContext};
pub use config::Config;
pub use error::{Error, Result};
pub use markup::{CommentNode, Markup};
pub use model::{EntityKind, EntityRecord, MethodRecord, RenderedFragment};
pub use pipeline::{Pipeline, RunOptions, RunReport};
pub use render::{escape, normalize, IdKind, Renderer};
pub use store::{Catalog, DocStore, JsonStore, StoredEntity, StoredMethod};
pub use toolchain::{CommandRunner, ExternalCommand, SystemRunner};
