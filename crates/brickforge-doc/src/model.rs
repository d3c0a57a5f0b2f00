//! Models and the document that owns them.

use std::collections::{HashMap, HashSet};

use brickforge_math::{Point3, Transform};
use serde::{Deserialize, Serialize};

use crate::line::FileLine;
use crate::palette::Palette;

/// Whether a model is a shareable leaf part or an assembly that is always
/// expanded in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// Leaf part; instances may share one compiled node.
    Part,
    /// Assembly; expanded wherever referenced.
    Assembly,
}

/// BFC winding certification declared by a model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BfcCert {
    /// No certification statement.
    #[default]
    NotCertified,
    /// Certified with culling disabled.
    CertifiedOff,
    /// Certified with culling enabled; inherited from the parent.
    CertifiedOn,
    /// Culling unconditionally forced for this sub-tree.
    ForcedOn,
}

/// A named model: an ordered list of typed file-lines plus its own
/// certification state and kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Canonical model name; lookups are case-insensitive.
    pub name: String,
    /// Part or assembly.
    pub kind: ModelKind,
    /// Winding certification.
    pub bfc: BfcCert,
    /// The line list, in file order.
    pub lines: Vec<FileLine>,
}

impl Model {
    /// A new empty model.
    pub fn new(name: &str, kind: ModelKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            bfc: BfcCert::default(),
            lines: Vec::new(),
        }
    }

    /// A new empty model with a certification state.
    pub fn certified(name: &str, kind: ModelKind, bfc: BfcCert) -> Self {
        Self {
            bfc,
            ..Self::new(name, kind)
        }
    }

    /// Whether this model is a shareable leaf part.
    pub fn is_part(&self) -> bool {
        self.kind == ModelKind::Part
    }

    /// Append a line.
    pub fn push(&mut self, line: FileLine) -> &mut Self {
        self.lines.push(line);
        self
    }

    fn fold_points(&self, doc: &Document, transform: &Transform, visited: &mut HashSet<String>, acc: &mut BoundsAcc) {
        for line in &self.lines {
            match line {
                FileLine::Line(l) => acc.extend(transform, &l.points),
                FileLine::Triangle(t) => acc.extend(transform, &t.points),
                FileLine::Quad(q) => acc.extend(transform, &q.points),
                FileLine::Conditional(c) => acc.extend(transform, &c.points),
                FileLine::SubModel(r) => {
                    let key = r.model.to_ascii_lowercase();
                    if let Some(child) = doc.model(&r.model) {
                        if visited.insert(key.clone()) {
                            let child_transform = transform.then(&r.transform);
                            child.fold_points(doc, &child_transform, visited, acc);
                            visited.remove(&key);
                        }
                    }
                }
                FileLine::Comment(_) => {}
            }
        }
    }

    /// Axis-aligned bounding box over this model's shapes and referenced
    /// sub-models. `None` when the model tree holds no geometry.
    /// Self-referential cycles are skipped rather than recursed.
    pub fn bounding_box(&self, doc: &Document) -> Option<(Point3, Point3)> {
        let mut acc = BoundsAcc::default();
        let mut visited = HashSet::new();
        visited.insert(self.name.to_ascii_lowercase());
        self.fold_points(doc, &Transform::identity(), &mut visited, &mut acc);
        acc.finish()
    }
}

#[derive(Default)]
struct BoundsAcc {
    bounds: Option<(Point3, Point3)>,
}

impl BoundsAcc {
    fn extend(&mut self, transform: &Transform, points: &[Point3]) {
        for p in points {
            let p = transform.apply_point(p);
            match &mut self.bounds {
                None => self.bounds = Some((p, p)),
                Some((min, max)) => {
                    for i in 0..3 {
                        min[i] = min[i].min(p[i]);
                        max[i] = max[i].max(p[i]);
                    }
                }
            }
        }
    }

    fn finish(self) -> Option<(Point3, Point3)> {
        self.bounds
    }
}

/// The parsed document tree: a set of named models plus the palette they
/// resolve colors against. Read-only during a scene build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    models: HashMap<String, Model>,
    palette: Palette,
}

impl Document {
    /// A new document with the given palette.
    pub fn new(palette: Palette) -> Self {
        Self {
            models: HashMap::new(),
            palette,
        }
    }

    /// Add (or replace) a model, keyed case-insensitively by its name.
    pub fn add_model(&mut self, model: Model) -> &mut Self {
        self.models.insert(model.name.to_ascii_lowercase(), model);
        self
    }

    /// Case-insensitive model lookup.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(&name.to_ascii_lowercase())
    }

    /// The document palette.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Number of models in the document.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::SubModelRef;
    use crate::line::{ActionAttrs, BfcHint, Quad};

    fn unit_quad(color: u32) -> FileLine {
        FileLine::Quad(Quad {
            points: [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            color,
            ccw: true,
            bfc: BfcHint::default(),
            attrs: ActionAttrs::default(),
        })
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut doc = Document::new(Palette::standard());
        doc.add_model(Model::new("4-4Cyli.dat", ModelKind::Part));
        assert!(doc.model("4-4cyli.dat").is_some());
        assert!(doc.model("4-4CYLI.DAT").is_some());
        assert!(doc.model("other.dat").is_none());
    }

    #[test]
    fn test_bounding_box_folds_references() {
        let mut doc = Document::new(Palette::standard());
        let mut leaf = Model::new("leaf.dat", ModelKind::Part);
        leaf.push(unit_quad(16));
        doc.add_model(leaf);

        let mut root = Model::new("root.ldr", ModelKind::Assembly);
        root.push(FileLine::SubModel(SubModelRef::new(
            "leaf.dat",
            Transform::translation(10.0, 0.0, 0.0),
        )));
        root.push(FileLine::SubModel(SubModelRef::new(
            "leaf.dat",
            Transform::translation(-5.0, 2.0, 0.0),
        )));
        doc.add_model(root);

        let (min, max) = doc.model("root.ldr").unwrap().bounding_box(&doc).unwrap();
        assert!((min.x + 5.0).abs() < 1e-6);
        assert!((max.x - 11.0).abs() < 1e-6);
        assert!((max.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box_survives_cycles() {
        let mut doc = Document::new(Palette::standard());
        let mut a = Model::new("a.dat", ModelKind::Part);
        a.push(unit_quad(16));
        a.push(FileLine::SubModel(SubModelRef::new(
            "a.dat",
            Transform::translation(1.0, 0.0, 0.0),
        )));
        doc.add_model(a);
        // Must terminate; the self-reference is skipped.
        assert!(doc.model("a.dat").unwrap().bounding_box(&doc).is_some());
    }

    #[test]
    fn test_empty_model_has_no_bounds() {
        let mut doc = Document::new(Palette::standard());
        doc.add_model(Model::new("empty.dat", ModelKind::Part));
        assert!(doc.model("empty.dat").unwrap().bounding_box(&doc).is_none());
    }
}
