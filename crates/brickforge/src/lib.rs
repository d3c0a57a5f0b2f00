#![warn(missing_docs)]

//! brickforge: a scene-graph compiler for hierarchical brick-model
//! documents.
//!
//! A parsed document tree (named models made of typed file-lines) is
//! compiled into a deduplicated, color-resolved, winding-correct scene
//! graph of tessellated geometry. Standard round primitives (studs,
//! cylinders, cones, tori, discs, rings) are generated procedurally at a
//! configurable resolution instead of expanding their literal files.
//!
//! # Example
//!
//! ```
//! use brickforge::{
//!     BuildConfig, Document, FileLine, Model, ModelKind, Palette, SubModelRef, Transform,
//! };
//!
//! let mut doc = Document::new(Palette::standard());
//! doc.add_model(Model::new("4-4cyli.dat", ModelKind::Part));
//! let mut root = Model::new("root.ldr", ModelKind::Assembly);
//! root.push(FileLine::SubModel(SubModelRef::colored(
//!     "4-4cyli.dat",
//!     Transform::identity(),
//!     4,
//! )));
//! doc.add_model(root);
//!
//! let graph = brickforge::compile(&doc, "root.ldr", &BuildConfig::default()).unwrap();
//! assert_eq!(graph.root_node().instances.len(), 1);
//! ```

pub use brickforge_build;
pub use brickforge_doc;
pub use brickforge_math;
pub use brickforge_primitives;
pub use brickforge_scene;

pub use brickforge_build::{compile, BuildConfig, BuildError, Compiler, Result};
pub use brickforge_doc::{
    BfcCert, BfcHint, ColorDef, ConditionalLine, Document, FileLine, LineSeg, Meta, Model,
    ModelKind, OverlayCommand, OverlayGuard, PackedColor, Palette, Quad, SubModelRef,
    TextureMarker, TexturePayload, Triangle, CODE_EDGE, CODE_MAIN,
};
pub use brickforge_math::{Point3, Transform, Vec3};
pub use brickforge_scene::{
    GeometrySet, Instance, NodeKey, SceneGraph, SceneNode, ShapeColor,
};
