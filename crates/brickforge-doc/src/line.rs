//! Typed file-lines: the per-model line list the scene compiler walks.

use brickforge_math::{Point3, Transform};
use serde::{Deserialize, Serialize};

/// Opaque handle to a decoded texture image owned by the loading layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u64);

/// Projection used to map a texture onto bracketed geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureMethod {
    /// Planar projection through three points.
    Planar,
    /// Cylindrical projection; `extra` carries the wrap angle.
    Cylindrical,
    /// Spherical projection; `extra` carries both wrap angles.
    Spherical,
}

/// Texture payload carried on action lines inside a textured region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TexturePayload {
    /// Projection method.
    pub method: TextureMethod,
    /// Source image filename, as written in the document.
    pub filename: String,
    /// Decoded image handle, if the loading layer resolved the file.
    pub image: Option<ImageId>,
    /// The three projection points.
    pub points: [Point3; 3],
    /// Wrap angles for the non-planar methods.
    pub extra: Option<[f32; 2]>,
}

/// Attributes shared by every action line (references and shapes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionAttrs {
    /// Texture payload when this line sits inside a textured region.
    pub texture: Option<TexturePayload>,
    /// Marks the untextured fallback geometry for a textured region.
    pub texture_fallback: bool,
}

/// Per-line BFC hint: a reference or shape may opt out of winding
/// certification even inside a certified model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BfcHint {
    /// No per-line token; certification is inherited.
    #[default]
    Unspecified,
    /// Winding is not meaningful for this line.
    Off,
    /// Winding is explicitly declared meaningful.
    On,
}

impl BfcHint {
    /// Whether the line participates in winding-certified emission.
    pub fn enabled(self) -> bool {
        !matches!(self, BfcHint::Off)
    }
}

/// A sub-model reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubModelRef {
    /// Name of the referenced model.
    pub model: String,
    /// Placement of the referenced model in the parent's space.
    pub transform: Transform,
    /// Raw color code (16/24 inherit).
    pub color: u32,
    /// Declared winding inversion for the referenced sub-tree.
    pub invert: bool,
    /// Per-reference BFC token.
    pub bfc: BfcHint,
    /// Shared action-line attributes.
    pub attrs: ActionAttrs,
}

impl SubModelRef {
    /// A plain reference with inherited color and no inversion.
    pub fn new(model: &str, transform: Transform) -> Self {
        Self {
            model: model.to_string(),
            transform,
            color: crate::palette::CODE_MAIN,
            invert: false,
            bfc: BfcHint::default(),
            attrs: ActionAttrs::default(),
        }
    }

    /// Same, with a literal color code.
    pub fn colored(model: &str, transform: Transform, color: u32) -> Self {
        Self {
            color,
            ..Self::new(model, transform)
        }
    }
}

/// A line segment shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeg {
    /// Endpoints.
    pub points: [Point3; 2],
    /// Raw color code.
    pub color: u32,
    /// Shared action-line attributes.
    pub attrs: ActionAttrs,
}

/// A triangle shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    /// Vertices in declared order.
    pub points: [Point3; 3],
    /// Raw color code.
    pub color: u32,
    /// Declared winding: `true` when the vertices run counter-clockwise.
    pub ccw: bool,
    /// Per-shape BFC token.
    pub bfc: BfcHint,
    /// Shared action-line attributes.
    pub attrs: ActionAttrs,
}

/// A quadrilateral shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    /// Vertices in declared order.
    pub points: [Point3; 4],
    /// Raw color code.
    pub color: u32,
    /// Declared winding: `true` when the vertices run counter-clockwise.
    pub ccw: bool,
    /// Per-shape BFC token.
    pub bfc: BfcHint,
    /// Shared action-line attributes.
    pub attrs: ActionAttrs,
}

/// A conditional line: rendered only on silhouette edges, decided by the
/// renderer from the two control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalLine {
    /// Endpoints.
    pub points: [Point3; 2],
    /// Control points steering silhouette detection.
    pub controls: [Point3; 2],
    /// Raw color code.
    pub color: u32,
    /// Shared action-line attributes.
    pub attrs: ActionAttrs,
}

/// Guard on an overlay start/next command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayGuard {
    /// Token tested against the builder's token set (case-insensitive).
    pub token: String,
    /// `true` for IFSET (token must be present), `false` for IFNSET.
    pub must_be_set: bool,
}

/// Overlay meta-commands: a push/pop color override for a sub-tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayCommand {
    /// Add a token to the token set.
    Set {
        /// Token text.
        token: String,
    },
    /// Remove a token from the token set.
    Unset {
        /// Token text.
        token: String,
    },
    /// Open a sticky override that lasts until `End`.
    Start {
        /// Color code forced onto subsequent geometry.
        color: u32,
        /// Optional conditional guard.
        guard: Option<OverlayGuard>,
    },
    /// Open a one-shot override popped after the next action line.
    Next {
        /// Color code forced onto the next action line.
        color: u32,
        /// Optional conditional guard.
        guard: Option<OverlayGuard>,
    },
    /// Close the innermost open override.
    End,
}

/// Texture region markers. Payload travels on the action lines, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureMarker {
    /// The next action line opens a new textured region.
    Start,
    /// The next action line opens a region closed right after it.
    Next,
    /// Close the open region.
    End,
}

/// Meta information carried on comment lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Meta {
    /// Build-step boundary.
    Step,
    /// Overlay color command.
    Overlay(OverlayCommand),
    /// Texture region marker.
    Texture(TextureMarker),
}

/// One typed line of a model file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FileLine {
    /// Meta comment.
    Comment(Meta),
    /// Sub-model reference.
    SubModel(SubModelRef),
    /// Line segment.
    Line(LineSeg),
    /// Triangle.
    Triangle(Triangle),
    /// Quadrilateral.
    Quad(Quad),
    /// Conditional line.
    Conditional(ConditionalLine),
}

impl FileLine {
    /// Whether this is an action line (emits geometry or instances).
    pub fn is_action(&self) -> bool {
        !matches!(self, FileLine::Comment(_))
    }

    /// The shared action attributes, for action lines.
    pub fn attrs(&self) -> Option<&ActionAttrs> {
        match self {
            FileLine::Comment(_) => None,
            FileLine::SubModel(r) => Some(&r.attrs),
            FileLine::Line(l) => Some(&l.attrs),
            FileLine::Triangle(t) => Some(&t.attrs),
            FileLine::Quad(q) => Some(&q.attrs),
            FileLine::Conditional(c) => Some(&c.attrs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bfc_hint_enabled() {
        assert!(BfcHint::Unspecified.enabled());
        assert!(BfcHint::On.enabled());
        assert!(!BfcHint::Off.enabled());
    }

    #[test]
    fn test_action_classification() {
        let quad = FileLine::Quad(Quad {
            points: [Point3::origin(); 4],
            color: 16,
            ccw: true,
            bfc: BfcHint::default(),
            attrs: ActionAttrs::default(),
        });
        assert!(quad.is_action());
        assert!(quad.attrs().is_some());
        let step = FileLine::Comment(Meta::Step);
        assert!(!step.is_action());
        assert!(step.attrs().is_none());
    }
}
