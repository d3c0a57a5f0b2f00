//! Scene nodes: compiled geometry buffers plus child instances.

use brickforge_math::{Point3, Transform, Vec3};
use brickforge_doc::{PackedColor, TexturePayload};

use crate::NodeKey;

/// Resolved color slot on a compiled shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeColor {
    /// Rendered in whatever color the instance resolves to.
    Inherit,
    /// Rendered in a fixed packed color.
    Packed(PackedColor),
}

/// A compiled triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleShape {
    /// Vertices in emission order.
    pub points: [Point3; 3],
    /// Per-vertex normals for generated curved geometry.
    pub normals: Option<[Vec3; 3]>,
    /// Per-vertex texture coordinates (stud-logo caps).
    pub uvs: Option<[[f32; 2]; 3]>,
    /// Color slot.
    pub color: ShapeColor,
}

/// A compiled quadrilateral.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadShape {
    /// Vertices in emission order.
    pub points: [Point3; 4],
    /// Per-vertex normals for generated curved geometry.
    pub normals: Option<[Vec3; 4]>,
    /// Color slot.
    pub color: ShapeColor,
}

/// A compiled line segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LineShape {
    /// Endpoints.
    pub points: [Point3; 2],
    /// Color slot.
    pub color: ShapeColor,
}

/// A compiled conditional line with its silhouette control points.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalShape {
    /// Endpoints.
    pub points: [Point3; 2],
    /// Control points.
    pub controls: [Point3; 2],
    /// Color slot.
    pub color: ShapeColor,
}

/// One pool of compiled geometry. A node owns two: a plain pool and a
/// winding-certified pool the renderer may cull.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometrySet {
    /// Triangles.
    pub triangles: Vec<TriangleShape>,
    /// Quadrilaterals.
    pub quads: Vec<QuadShape>,
    /// Plain lines.
    pub lines: Vec<LineShape>,
    /// Edge lines.
    pub edge_lines: Vec<LineShape>,
    /// Conditional lines.
    pub conditional_lines: Vec<ConditionalShape>,
}

impl GeometrySet {
    /// Total number of stored shapes.
    pub fn shape_count(&self) -> usize {
        self.triangles.len()
            + self.quads.len()
            + self.lines.len()
            + self.edge_lines.len()
            + self.conditional_lines.len()
    }

    /// Whether the pool holds nothing.
    pub fn is_empty(&self) -> bool {
        self.shape_count() == 0
    }
}

/// Resolved color override on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceColor {
    /// Main color.
    pub color: PackedColor,
    /// Edge color.
    pub edge: PackedColor,
}

/// A placed reference to a child node.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// The shared child node.
    pub node: NodeKey,
    /// Placement in the parent's space.
    pub transform: Transform,
    /// Color override; `None` when the child inherits.
    pub color: Option<InstanceColor>,
    /// The placement mirrors (negative determinant); the renderer must
    /// correct normals and front-face orientation.
    pub mirrored: bool,
    /// Specular reflectance from the palette entry of the override color.
    pub specular: Option<[f32; 4]>,
    /// Specular exponent from the palette entry of the override color.
    pub shininess: Option<f32>,
    /// Marks a reference to the well-known light fixture part.
    pub light: bool,
}

/// Marks the size of both geometry pools at some point of emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryMark {
    /// Shapes in the plain pool.
    pub plain: usize,
    /// Shapes in the winding-certified pool.
    pub certified: usize,
    /// Instances attached.
    pub instances: usize,
}

/// A recorded textured region: the payload plus the span of geometry
/// emitted while the region was open.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureRegion {
    /// Projection and image payload from the opening action line.
    pub payload: TexturePayload,
    /// Pool sizes when the region opened.
    pub start: GeometryMark,
    /// Pool sizes when the region closed; `None` while still open.
    pub end: Option<GeometryMark>,
}

/// A compiled, shareable scene model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    /// Display name (the bare source model name).
    pub name: String,
    /// Whether the source model was a leaf part.
    pub part: bool,
    /// Geometry emitted through the plain path.
    pub plain: GeometrySet,
    /// Geometry emitted through the winding-certified path.
    pub certified: GeometrySet,
    /// Child instances.
    pub instances: Vec<Instance>,
    /// Step boundaries as pool marks, in document order.
    pub steps: Vec<GeometryMark>,
    /// Textured regions recorded during emission.
    pub texture_regions: Vec<TextureRegion>,
    open_region: Option<usize>,
}

impl SceneNode {
    /// A new empty node.
    pub fn new(name: &str, part: bool) -> Self {
        Self {
            name: name.to_string(),
            part,
            ..Self::default()
        }
    }

    fn mark(&self) -> GeometryMark {
        GeometryMark {
            plain: self.plain.shape_count(),
            certified: self.certified.shape_count(),
            instances: self.instances.len(),
        }
    }

    fn pool(&mut self, certified: bool) -> &mut GeometrySet {
        if certified {
            &mut self.certified
        } else {
            &mut self.plain
        }
    }

    /// Total shape count across both pools.
    pub fn shape_count(&self) -> usize {
        self.plain.shape_count() + self.certified.shape_count()
    }

    /// Record a step boundary.
    pub fn next_step(&mut self) {
        let mark = self.mark();
        self.steps.push(mark);
    }

    /// Append a triangle.
    pub fn add_triangle(&mut self, certified: bool, points: [Point3; 3], color: ShapeColor) {
        self.pool(certified).triangles.push(TriangleShape {
            points,
            normals: None,
            uvs: None,
            color,
        });
    }

    /// Append a triangle with per-vertex normals.
    pub fn add_shaded_triangle(
        &mut self,
        certified: bool,
        points: [Point3; 3],
        normals: [Vec3; 3],
        uvs: Option<[[f32; 2]; 3]>,
        color: ShapeColor,
    ) {
        self.pool(certified).triangles.push(TriangleShape {
            points,
            normals: Some(normals),
            uvs,
            color,
        });
    }

    /// Append a quad.
    pub fn add_quad(&mut self, certified: bool, points: [Point3; 4], color: ShapeColor) {
        self.pool(certified).quads.push(QuadShape {
            points,
            normals: None,
            color,
        });
    }

    /// Append a quad with per-vertex normals.
    pub fn add_shaded_quad(
        &mut self,
        certified: bool,
        points: [Point3; 4],
        normals: [Vec3; 4],
        color: ShapeColor,
    ) {
        self.pool(certified).quads.push(QuadShape {
            points,
            normals: Some(normals),
            color,
        });
    }

    /// Append a plain line.
    pub fn add_line(&mut self, points: [Point3; 2], color: ShapeColor) {
        self.plain.lines.push(LineShape { points, color });
    }

    /// Append an edge line.
    pub fn add_edge_line(&mut self, points: [Point3; 2], color: ShapeColor) {
        self.plain.edge_lines.push(LineShape { points, color });
    }

    /// Append a conditional line.
    pub fn add_conditional_line(
        &mut self,
        points: [Point3; 2],
        controls: [Point3; 2],
        color: ShapeColor,
    ) {
        self.plain
            .conditional_lines
            .push(ConditionalShape {
                points,
                controls,
                color,
            });
    }

    /// Expand a quad strip (pairs of bottom/top vertices) into quads.
    /// `points` and `normals` hold `2 + 2n` entries.
    pub fn add_quad_strip(
        &mut self,
        certified: bool,
        points: &[Point3],
        normals: &[Vec3],
        color: ShapeColor,
    ) {
        debug_assert_eq!(points.len(), normals.len());
        for i in 0..points.len() / 2 - 1 {
            let b = i * 2;
            self.add_shaded_quad(
                certified,
                [points[b], points[b + 1], points[b + 3], points[b + 2]],
                [normals[b], normals[b + 1], normals[b + 3], normals[b + 2]],
                color,
            );
        }
    }

    /// Expand a triangle fan around `points[0]` into triangles.
    pub fn add_triangle_fan(
        &mut self,
        certified: bool,
        points: &[Point3],
        normals: &[Vec3],
        uvs: Option<&[[f32; 2]]>,
        color: ShapeColor,
    ) {
        debug_assert_eq!(points.len(), normals.len());
        for i in 1..points.len() - 1 {
            let tri_uvs = uvs.map(|uv| [uv[0], uv[i], uv[i + 1]]);
            self.add_shaded_triangle(
                certified,
                [points[0], points[i], points[i + 1]],
                [normals[0], normals[i], normals[i + 1]],
                tri_uvs,
                color,
            );
        }
    }

    /// Expand a triangle strip into triangles, keeping a consistent
    /// orientation by swapping every other triangle.
    pub fn add_triangle_strip(
        &mut self,
        certified: bool,
        points: &[Point3],
        normals: &[Vec3],
        color: ShapeColor,
    ) {
        debug_assert_eq!(points.len(), normals.len());
        for i in 0..points.len().saturating_sub(2) {
            let (a, b) = if i % 2 == 0 { (i, i + 1) } else { (i + 1, i) };
            self.add_shaded_triangle(
                certified,
                [points[a], points[b], points[i + 2]],
                [normals[a], normals[b], normals[i + 2]],
                None,
                color,
            );
        }
    }

    /// Attach a child instance.
    pub fn add_instance(&mut self, instance: Instance) {
        self.instances.push(instance);
    }

    /// Open a textured region before the next geometry is emitted.
    pub fn start_texture(&mut self, payload: TexturePayload) {
        self.end_texture();
        let start = self.mark();
        self.texture_regions.push(TextureRegion {
            payload,
            start,
            end: None,
        });
        self.open_region = Some(self.texture_regions.len() - 1);
    }

    /// Close the open textured region, if any.
    pub fn end_texture(&mut self) {
        if let Some(index) = self.open_region.take() {
            let mark = self.mark();
            self.texture_regions[index].end = Some(mark);
        }
    }

    /// Whether a textured region is currently open.
    pub fn texture_open(&self) -> bool {
        self.open_region.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickforge_doc::TextureMethod;

    fn pt(x: f32, y: f32, z: f32) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn test_quad_strip_expansion() {
        let mut node = SceneNode::new("strip", true);
        let points = [
            pt(0.0, 0.0, 0.0),
            pt(0.0, 1.0, 0.0),
            pt(1.0, 0.0, 0.0),
            pt(1.0, 1.0, 0.0),
            pt(2.0, 0.0, 0.0),
            pt(2.0, 1.0, 0.0),
        ];
        let normals = [Vec3::y(); 6];
        node.add_quad_strip(true, &points, &normals, ShapeColor::Inherit);
        assert_eq!(node.certified.quads.len(), 2);
        let q = &node.certified.quads[0];
        assert_eq!(q.points, [points[0], points[1], points[3], points[2]]);
    }

    #[test]
    fn test_triangle_fan_expansion() {
        let mut node = SceneNode::new("fan", true);
        let points = [
            pt(0.0, 0.0, 0.0),
            pt(1.0, 0.0, 0.0),
            pt(1.0, 0.0, 1.0),
            pt(0.0, 0.0, 1.0),
        ];
        let normals = [-Vec3::y(); 4];
        node.add_triangle_fan(false, &points, &normals, None, ShapeColor::Inherit);
        assert_eq!(node.plain.triangles.len(), 2);
        assert_eq!(
            node.plain.triangles[1].points,
            [points[0], points[2], points[3]]
        );
    }

    #[test]
    fn test_triangle_strip_alternates() {
        let mut node = SceneNode::new("strip", false);
        let points = [
            pt(0.0, 0.0, 0.0),
            pt(1.0, 0.0, 0.0),
            pt(0.0, 1.0, 0.0),
            pt(1.0, 1.0, 0.0),
        ];
        let normals = [Vec3::z(); 4];
        node.add_triangle_strip(false, &points, &normals, ShapeColor::Inherit);
        assert_eq!(node.plain.triangles.len(), 2);
        assert_eq!(
            node.plain.triangles[0].points,
            [points[0], points[1], points[2]]
        );
        // Second triangle swaps its leading pair to keep orientation.
        assert_eq!(
            node.plain.triangles[1].points,
            [points[2], points[1], points[3]]
        );
    }

    #[test]
    fn test_texture_region_spans() {
        let mut node = SceneNode::new("tex", true);
        node.add_triangle(
            false,
            [pt(0.0, 0.0, 0.0), pt(1.0, 0.0, 0.0), pt(0.0, 1.0, 0.0)],
            ShapeColor::Inherit,
        );
        node.start_texture(TexturePayload {
            method: TextureMethod::Planar,
            filename: "logo.png".into(),
            image: None,
            points: [pt(0.0, 0.0, 0.0); 3],
            extra: None,
        });
        node.add_triangle(
            false,
            [pt(0.0, 0.0, 0.0), pt(1.0, 0.0, 0.0), pt(0.0, 1.0, 0.0)],
            ShapeColor::Inherit,
        );
        node.end_texture();
        assert_eq!(node.texture_regions.len(), 1);
        let region = &node.texture_regions[0];
        assert_eq!(region.start.plain, 1);
        assert_eq!(region.end.unwrap().plain, 2);
        assert!(!node.texture_open());
    }

    #[test]
    fn test_step_marks() {
        let mut node = SceneNode::new("steps", false);
        node.add_line([pt(0.0, 0.0, 0.0), pt(1.0, 0.0, 0.0)], ShapeColor::Inherit);
        node.next_step();
        node.add_line([pt(0.0, 0.0, 0.0), pt(0.0, 1.0, 0.0)], ShapeColor::Inherit);
        node.next_step();
        assert_eq!(node.steps.len(), 2);
        assert_eq!(node.steps[0].plain, 1);
        assert_eq!(node.steps[1].plain, 2);
    }
}
