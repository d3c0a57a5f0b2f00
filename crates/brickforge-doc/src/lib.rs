#![warn(missing_docs)]

//! In-memory brick-model document tree for the brickforge scene compiler.
//!
//! This crate defines the read-only input side of a scene build: named
//! models made of typed file-lines (sub-model references, shapes, meta
//! comments) and the palette their color codes resolve against. Loading
//! documents from disk formats is the job of an outer layer; everything
//! here is constructed in memory and is `serde`-serializable for
//! interchange with that layer.

mod line;
mod model;
mod palette;

pub use line::{
    ActionAttrs, BfcHint, ConditionalLine, FileLine, ImageId, LineSeg, Meta, OverlayCommand,
    OverlayGuard, Quad, SubModelRef, TextureMarker, TextureMethod, TexturePayload, Triangle,
};
pub use model::{BfcCert, Document, Model, ModelKind};
pub use palette::{ColorDef, PackedColor, Palette, CODE_EDGE, CODE_MAIN};
