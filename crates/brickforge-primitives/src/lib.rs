#![warn(missing_docs)]

//! Procedural substitution of standard round primitives.
//!
//! The brick-model part library spells common round shapes (studs,
//! cylinders, cones, tori, discs, rings) as literal tessellated files at a
//! fixed resolution. This crate recognizes those files by name and
//! generates their geometry procedurally instead, at a resolution chosen
//! from the caller's curve-quality settings.
//!
//! [`name::recognize`] parses a model name once into a tagged
//! [`Primitive`]; [`generate::generate`] dispatches on the tag and writes
//! tessellated geometry into a scene node.

pub mod generate;
pub mod name;
pub mod segments;

pub use generate::{generate, GenOptions};
pub use name::{recognize, CircleFraction, LowStud, Primitive, PrimitiveKind, LOWRES_PREFIX};
pub use segments::{circle_segments, torus_minor_fraction, used_segments};
