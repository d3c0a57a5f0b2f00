#![warn(missing_docs)]

//! Scene-graph builder for brickforge.
//!
//! One call per root model walks the document tree depth-first, resolves
//! colors and winding certification, deduplicates sub-models through the
//! scene cache, substitutes procedural primitives, and produces a
//! [`brickforge_scene::SceneGraph`] ready for a renderer. The build is a
//! single synchronous traversal with cooperative cancellation through the
//! progress callback.

mod compile;
mod config;
mod error;
mod overlay;
mod texture;

pub use compile::{compile, Compiler, ProgressFn};
pub use config::BuildConfig;
pub use error::{BuildError, Result};
pub use overlay::{guard_passes, OverlayEntry, OverlayStack};
pub use texture::TextureTracker;
