//! Procedural geometry generators.
//!
//! Each generator writes tessellated geometry straight into a scene node's
//! buffers, replacing the literal file the primitive name stands for. All
//! primitives are generated in their canonical space (unit radius at the
//! origin unless the family dictates otherwise); the instance transform
//! does the placement.

use std::f32::consts::PI;

use brickforge_doc::PackedColor;
use brickforge_math::{Point3, Vec3};
use brickforge_scene::{SceneNode, ShapeColor};

use crate::name::{LowStud, Primitive, PrimitiveKind, TorusKind};
use crate::segments::{circle_segments, torus_minor_fraction, used_segments};

/// Build-time options a generator consults.
#[derive(Debug, Clone, Copy)]
pub struct GenOptions {
    /// Emit through the winding-certified pool.
    pub bfc: bool,
    /// Edge-line generators may emit.
    pub edge_lines: bool,
    /// Conditional seam lines may emit.
    pub conditional_lines: bool,
    /// Curve-quality tier (1..=12).
    pub curve_quality: u32,
    /// Promote every primitive to the hi-res segment floor.
    pub hi_res: bool,
    /// Generate stud-logo texture coordinates on stud caps.
    pub stud_logo: bool,
    /// Forced color for stud walls and edges under an active overlay.
    pub stud_cap_color: Option<PackedColor>,
}

impl GenOptions {
    fn shape_color(&self, color: Option<PackedColor>) -> ShapeColor {
        color.map_or(ShapeColor::Inherit, ShapeColor::Packed)
    }
}

const LOW_SEGMENTS: u32 = 8;

/// Generate geometry for a recognized primitive into `node`.
pub fn generate(node: &mut SceneNode, primitive: &Primitive, opts: &GenOptions) {
    let hi_res = primitive.hi_res || opts.hi_res;
    let origin = Point3::origin();
    match primitive.kind {
        PrimitiveKind::Stud => {
            let num = circle_segments(opts.curve_quality, 0.0, false);
            add_stud(node, opts, num);
        }
        PrimitiveKind::LowResStud(variant) => add_low_stud(node, opts, variant),
        PrimitiveKind::EighthSphere => {
            let num = circle_segments(opts.curve_quality, 1.0, hi_res);
            add_eighth_sphere(node, opts, origin, 1.0, num);
        }
        PrimitiveKind::Cylinder(f) => {
            let num = circle_segments(opts.curve_quality, f.value(), hi_res);
            let used = used_segments(num, f.value());
            add_open_cone(node, opts, origin, 1.0, 1.0, 1.0, num, used, None, None);
        }
        PrimitiveKind::SlopedCylinder(f) => {
            let num = circle_segments(opts.curve_quality, f.value(), hi_res);
            add_sloped_cylinder(node, opts, origin, 1.0, 1.0, num, used_segments(num, f.value()));
        }
        PrimitiveKind::SlopedCylinder2(f) => {
            let num = circle_segments(opts.curve_quality, f.value(), hi_res);
            add_sloped_cylinder2(node, opts, origin, 1.0, 1.0, num, used_segments(num, f.value()));
        }
        PrimitiveKind::Chord(f) => {
            let num = circle_segments(opts.curve_quality, f.value(), hi_res);
            add_chord(node, opts, origin, 1.0, num, used_segments(num, f.value()));
        }
        PrimitiveKind::Disc(f) => {
            let num = circle_segments(opts.curve_quality, f.value(), hi_res);
            add_disc(node, opts, origin, 1.0, num, used_segments(num, f.value()), false);
        }
        PrimitiveKind::NotDisc(f) => {
            let num = circle_segments(opts.curve_quality, f.value(), hi_res);
            add_not_disc(node, opts, origin, 1.0, num, used_segments(num, f.value()));
        }
        PrimitiveKind::Tangent(f) => {
            let mut num = circle_segments(opts.curve_quality, f.value(), hi_res);
            // The corner table spans sixteenths; round up to keep chunks whole.
            while num % 16 != 0 {
                num += LOW_SEGMENTS;
            }
            add_tangent(node, opts, origin, 1.0, num, used_segments(num, f.value()));
        }
        PrimitiveKind::CircularEdge(f) => {
            if opts.edge_lines {
                let num = circle_segments(opts.curve_quality, f.value(), hi_res);
                add_circular_edge(node, origin, 1.0, num, used_segments(num, f.value()), None);
            }
        }
        PrimitiveKind::Cone { fraction, size } => {
            let num = circle_segments(opts.curve_quality, fraction.value(), hi_res);
            let used = used_segments(num, fraction.value());
            add_open_cone(
                node,
                opts,
                origin,
                size as f32 + 1.0,
                size as f32,
                1.0,
                num,
                used,
                None,
                None,
            );
        }
        PrimitiveKind::Ring { fraction, size } => {
            let num = circle_segments(opts.curve_quality, fraction.value(), hi_res);
            let used = used_segments(num, fraction.value());
            add_open_cone(
                node,
                opts,
                origin,
                size as f32,
                size as f32 + 1.0,
                0.0,
                num,
                used,
                None,
                None,
            );
        }
        PrimitiveKind::Torus { kind, fraction, size, mixed } => {
            let num = circle_segments(opts.curve_quality, fraction.value(), hi_res);
            let minor = circle_segments(opts.curve_quality, 0.0, hi_res && !mixed);
            let used = used_segments(num, fraction.value());
            let minor_radius = torus_minor_fraction(size);
            match kind {
                TorusKind::Inner => {
                    add_torus_io(node, opts, origin, 1.0, minor_radius, num, used, minor, true);
                }
                TorusKind::Outer => {
                    add_torus_io(node, opts, origin, 1.0, minor_radius, num, used, minor, false);
                }
                TorusKind::Quarter => {
                    for inner in [true, false] {
                        for radius in [minor_radius, -minor_radius] {
                            add_torus_io(node, opts, origin, 1.0, radius, num, used, minor, inner);
                        }
                    }
                }
            }
        }
    }
}

fn circle_point(angle: f32, radius: f32, center: Point3) -> Point3 {
    Point3::new(
        center.x + radius * angle.cos(),
        center.y,
        center.z + radius * angle.sin(),
    )
}

/// The next conditional control point past the end of a partial circle:
/// tangent to the circle at the last emitted point.
fn tangent_control_point(mut point: Point3, index: u32, num: u32) -> Point3 {
    let angle = 2.0 * PI / num as f32 * index as f32 + PI / 2.0;
    point.x += angle.cos() * 0.1;
    point.z += angle.sin() * 0.1;
    point
}

#[allow(clippy::too_many_arguments)]
fn add_open_cone(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius1: f32,
    radius2: f32,
    height: f32,
    num: u32,
    used: u32,
    color: Option<PackedColor>,
    edge_color: Option<PackedColor>,
) {
    if radius1 == 0.0 || radius2 == 0.0 {
        let radius = if radius1 == 0.0 { radius2 } else { radius1 };
        add_point_cone(node, opts, center, radius, height, num, used, color, edge_color);
        return;
    }
    let down = Vec3::new(0.0, -1.0, 0.0);
    let adjust = if height < 0.0 { -1.0 } else { 1.0 };
    let top = center + Vec3::new(0.0, height, 0.0);
    let (normal_point, top_normal_point) = if height != 0.0 {
        (
            center - down * radius1 * (radius2 - radius1) / height,
            top - down * radius2 * (radius2 - radius1) / height,
        )
    } else {
        (center, top)
    };
    let count = (used as usize + 1) * 2;
    let mut points = vec![Point3::origin(); count];
    let mut normals = vec![Vec3::zeros(); count];
    for i in 0..=used as usize {
        let angle = 2.0 * PI / num as f32 * i as f32;
        points[i * 2] = circle_point(angle, radius1, center);
        points[i * 2 + 1] = circle_point(angle, radius2, top);
        if height == 0.0 {
            normals[i * 2] = down;
            normals[i * 2 + 1] = down;
        } else {
            normals[i * 2] = (points[i * 2] - normal_point).normalize() * adjust;
            normals[i * 2 + 1] = (points[i * 2 + 1] - top_normal_point).normalize() * adjust;
        }
    }
    node.add_quad_strip(opts.bfc, &points, &normals, opts.shape_color(color));
    if opts.conditional_lines && height != 0.0 {
        add_open_cone_conditionals(node, opts, &points, num, used, edge_color);
    }
}

fn add_open_cone_conditionals(
    node: &mut SceneNode,
    opts: &GenOptions,
    points: &[Point3],
    num: u32,
    used: u32,
    edge_color: Option<PackedColor>,
) {
    let color = opts.shape_color(edge_color);
    let tol = 1e-6;
    for i in 0..=used as usize {
        let p1 = points[i * 2];
        let p2 = points[i * 2 + 1];
        if (p1 - p2).norm() < tol {
            continue;
        }
        let c0 = if i == 0 {
            if num == used {
                points[num as usize * 2 - 2]
            } else {
                let mut c = p1;
                c.z -= 1.0;
                c
            }
        } else {
            points[(i - 1) * 2]
        };
        let c1 = if i == used as usize {
            if num == used {
                // Closed surface; the seam was already covered.
                return;
            }
            tangent_control_point(p1, i as u32, num)
        } else {
            points[(i + 1) * 2]
        };
        node.add_conditional_line([p1, p2], [c0, c1], color);
    }
}

#[allow(clippy::too_many_arguments)]
fn add_point_cone(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    height: f32,
    num: u32,
    used: u32,
    color: Option<PackedColor>,
    edge_color: Option<PackedColor>,
) {
    let shape_color = opts.shape_color(color);
    let edge = opts.shape_color(edge_color);
    let top = center + Vec3::new(0.0, height, 0.0);
    let step = 2.0 * PI / num as f32;
    // Facet normal of the side triangle starting at segment index `i`.
    let cross_at = |i: f32| {
        let pa = circle_point(step * i, radius, center);
        let pb = circle_point(step * (i + 1.0), radius, center);
        (pa - top).cross(&(pa - pb))
    };
    for i in 0..used {
        let fi = i as f32;
        let p1 = circle_point(step * fi, radius, center);
        let p2 = circle_point(step * (fi + 1.0), radius, center);
        let p3 = circle_point(step * (fi + 2.0), radius, center);
        let tri0 = cross_at(fi - 1.0);
        let tri1 = cross_at(fi);
        let tri2 = cross_at(fi + 1.0);
        if opts.conditional_lines {
            if i == 0 {
                let mut c0 = p1;
                c0.z -= 1.0;
                node.add_conditional_line([p1, top], [c0, p2], edge);
            }
            let c1 = if i == used - 1 {
                tangent_control_point(p2, i + 1, num)
            } else {
                p3
            };
            node.add_conditional_line([p2, top], [p1, c1], edge);
        }
        node.add_shaded_triangle(
            opts.bfc,
            [p2, p1, top],
            [
                (tri2 + tri1).normalize(),
                (tri1 + tri0).normalize(),
                tri1.normalize(),
            ],
            None,
            shape_color,
        );
    }
}

fn add_sloped_cylinder(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    height: f32,
    num: u32,
    used: u32,
) {
    let up = Vec3::new(0.0, 1.0, 0.0);
    let count = (used as usize + 1) * 2;
    let mut points = vec![Point3::origin(); count];
    let mut normals = vec![Vec3::zeros(); count];
    let mut top = center;
    for i in 0..=used as usize {
        let angle = 2.0 * PI / num as f32 * i as f32;
        points[i * 2] = circle_point(angle, radius, center);
        top.y = center.y + height - (height / radius) * points[i * 2].x;
        points[i * 2 + 1] = circle_point(angle, radius, top);
        if height == 0.0 {
            normals[i * 2] = up;
            normals[i * 2 + 1] = up;
        } else {
            normals[i * 2] = (points[i * 2] - center).normalize();
            normals[i * 2 + 1] = (points[i * 2 + 1] - top).normalize();
        }
    }
    node.add_quad_strip(opts.bfc, &points, &normals, ShapeColor::Inherit);
    if opts.conditional_lines && height != 0.0 {
        add_open_cone_conditionals(node, opts, &points, num, used, None);
    }
}

fn add_sloped_cylinder2(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    height: f32,
    num: u32,
    used: u32,
) {
    let up = Vec3::new(0.0, 1.0, 0.0);
    let count = (used as usize + 1) * 2;
    let mut points = vec![Point3::origin(); count];
    let mut normals = vec![Vec3::zeros(); count];
    let mut top = center;
    for i in 0..=used as usize {
        // Starts a quarter turn in so the slope peaks over the x axis.
        let angle = 2.0 * PI / num as f32 * i as f32 + PI / 2.0;
        points[i * 2] = circle_point(angle, radius, center);
        top.y = points[i * 2].x.abs();
        points[i * 2 + 1] = circle_point(angle, radius, top);
        if height == 0.0 {
            normals[i * 2] = up;
            normals[i * 2 + 1] = up;
        } else {
            normals[i * 2] = (points[i * 2] - center).normalize();
            normals[i * 2 + 1] = (points[i * 2 + 1] - top).normalize();
        }
    }
    node.add_quad_strip(opts.bfc, &points, &normals, ShapeColor::Inherit);
    if opts.conditional_lines && height != 0.0 {
        add_sloped_cylinder2_conditionals(node, &points, num, used);
    }
}

fn add_sloped_cylinder2_conditionals(
    node: &mut SceneNode,
    points: &[Point3],
    num: u32,
    used: u32,
) {
    for i in 1..=used as usize {
        let p1 = points[i * 2];
        let p2 = points[i * 2 + 1];
        let c0 = points[(i - 1) * 2];
        let c1 = if i == used as usize {
            if num == used {
                points[2]
            } else {
                // This surface starts a quarter turn in, so the tangent is
                // computed a quarter turn further around.
                tangent_control_point(p1, i as u32 + num / 4, num)
            }
        } else {
            points[(i + 1) * 2]
        };
        node.add_conditional_line([p1, p2], [c0, c1], ShapeColor::Inherit);
    }
}

fn add_chord(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    num: u32,
    used: u32,
) {
    let down = Vec3::new(0.0, -1.0, 0.0);
    let count = used as usize + 1;
    let mut points = Vec::with_capacity(count);
    for i in 0..count {
        let angle = 2.0 * PI / num as f32 * i as f32;
        points.push(circle_point(angle, radius, center));
    }
    let normals = vec![down; count];
    node.add_triangle_fan(opts.bfc, &points, &normals, None, ShapeColor::Inherit);
}

fn add_disc(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    num: u32,
    used: u32,
    stud: bool,
) {
    let down = Vec3::new(0.0, -1.0, 0.0);
    let count = used as usize + 2;
    let mut points = Vec::with_capacity(count);
    points.push(center);
    for i in 0..=used as usize {
        let angle = 2.0 * PI / num as f32 * i as f32;
        points.push(circle_point(angle, radius, center));
    }
    let normals = vec![down; count];
    let uvs = (stud && opts.stud_logo).then(|| stud_logo_uvs(count));
    node.add_triangle_fan(
        opts.bfc,
        &points,
        &normals,
        uvs.as_deref(),
        ShapeColor::Inherit,
    );
}

/// Texture coordinates mapping the stud logo onto a stud cap fan.
fn stud_logo_uvs(vertex_count: usize) -> Vec<[f32; 2]> {
    let mut uvs = Vec::with_capacity(vertex_count);
    uvs.push([0.5, 0.5]);
    let num = vertex_count - 2;
    for i in 1..vertex_count {
        let angle = 2.0 * PI / num as f32 * (i - 1) as f32;
        let x = angle.cos() * 0.5;
        let z = angle.sin() * 0.5;
        uvs.push([z + 0.5, 0.5 - x]);
    }
    uvs
}

fn add_not_disc(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    num: u32,
    used: u32,
) {
    let down = Vec3::new(0.0, -1.0, 0.0);
    let quarter = num / 4;
    let num_quarters = (used + quarter - 1) / quarter;
    for q in 0..num_quarters {
        let z_mult = if q >= 2 { -1.0 } else { 1.0 };
        let x_mult = if q == 1 || q == 2 { -1.0 } else { 1.0 };
        let quarter_segments = if q == num_quarters - 1 {
            let rem = used % quarter;
            if rem == 0 {
                quarter
            } else {
                rem
            }
        } else {
            quarter
        };
        let count = quarter_segments as usize + 2;
        let mut points = vec![Point3::origin(); count];
        points[0] = center + Vec3::new(x_mult * radius, 0.0, z_mult * radius);
        // The arc runs backwards so the fan's winding matches the discs'.
        for j in 0..=quarter_segments as usize {
            let angle = 2.0 * PI / num as f32 * (j as f32 + (q * quarter) as f32);
            points[quarter_segments as usize - j + 1] = circle_point(angle, radius, center);
        }
        let normals = vec![down; count];
        node.add_triangle_fan(opts.bfc, &points, &normals, None, ShapeColor::Inherit);
    }
}

const TANGENT_CORNERS: [[f32; 2]; 4] = [
    [1.0, 0.1989],
    [0.8478, 0.5665],
    [0.5665, 0.8478],
    [0.1989, 1.0],
];

fn add_tangent(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    num: u32,
    used: u32,
) {
    let down = Vec3::new(0.0, -1.0, 0.0);
    let quarter = num / 4;
    let per_chunk = quarter / 4;
    let num_quarters = (used + quarter - 1) / quarter;
    for q in 0..num_quarters {
        let z_mult = if q >= 2 { -1.0 } else { 1.0 };
        let x_mult = if q == 1 || q == 2 { -1.0 } else { 1.0 };
        let quarter_segments = if q == num_quarters - 1 {
            let rem = used % quarter;
            if rem == 0 {
                quarter
            } else {
                rem
            }
        } else {
            quarter
        };
        for j in 0..quarter_segments {
            let corner = TANGENT_CORNERS[(j / per_chunk) as usize];
            let p0 = center + Vec3::new(corner[0] * x_mult, 0.0, corner[1] * z_mult);
            let (idx1, idx2) = if q == 1 || q == 3 {
                (quarter_segments - j, quarter_segments - j - 1)
            } else {
                (j + 1, j)
            };
            let angle1 = 2.0 * PI / num as f32 * (idx1 + q * quarter) as f32;
            let angle2 = 2.0 * PI / num as f32 * (idx2 + q * quarter) as f32;
            let p1 = circle_point(angle1, radius, center);
            let p2 = circle_point(angle2, radius, center);
            node.add_shaded_triangle(
                opts.bfc,
                [p0, p1, p2],
                [down, down, down],
                None,
                ShapeColor::Inherit,
            );
        }
    }
}

fn add_circular_edge(
    node: &mut SceneNode,
    center: Point3,
    radius: f32,
    num: u32,
    used: u32,
    color: Option<PackedColor>,
) {
    let shape_color = color.map_or(ShapeColor::Inherit, ShapeColor::Packed);
    let mut prev = circle_point(0.0, radius, center);
    for i in 1..=used {
        let next = circle_point(2.0 * PI / num as f32 * i as f32, radius, center);
        node.add_edge_line([prev, next], shape_color);
        prev = next;
    }
}

#[allow(clippy::too_many_arguments)]
fn add_torus_io(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    y_radius: f32,
    xz_radius: f32,
    num: u32,
    used: u32,
    minor_segments: u32,
    inner: bool,
) {
    let y_segments = (minor_segments / 4) as usize;
    let cols = used as usize + 1;
    let mut grid = vec![Point3::origin(); (y_segments + 1) * cols];
    for i in 0..cols {
        let xz_angle = 2.0 * PI / num as f32 * i as f32;
        for j in 0..=y_segments {
            let y_angle = if inner {
                PI - 2.0 * PI / minor_segments as f32 * j as f32
            } else {
                2.0 * PI / minor_segments as f32 * j as f32
            };
            let ring_center = Point3::new(
                center.x,
                xz_radius * y_angle.sin() + center.y,
                center.z,
            );
            let current_radius = xz_radius * y_angle.cos() + y_radius;
            grid[i * (y_segments + 1) + j] = circle_point(xz_angle, current_radius, ring_center);
        }
    }
    let strip_size = (y_segments + 1) * 2;
    let mut strip_points = vec![Point3::origin(); strip_size];
    let mut strip_normals = vec![Vec3::zeros(); strip_size];
    let (ofs1, ofs2) = if inner { (0usize, 1usize) } else { (1, 0) };
    for i in 0..used as usize {
        let p1 = circle_point(2.0 * PI / num as f32 * (i + ofs2) as f32, y_radius, center);
        let p2 = circle_point(2.0 * PI / num as f32 * (i + ofs1) as f32, y_radius, center);
        let mut spot = 0;
        for j in 0..=y_segments {
            strip_points[spot] = grid[(i + ofs1) * (y_segments + 1) + j];
            strip_normals[spot] = (strip_points[spot] - p2).normalize();
            spot += 1;
            strip_points[spot] = grid[(i + ofs2) * (y_segments + 1) + j];
            strip_normals[spot] = (strip_points[spot] - p1).normalize();
            spot += 1;
        }
        node.add_quad_strip(opts.bfc, &strip_points, &strip_normals, ShapeColor::Inherit);
    }
    if opts.conditional_lines {
        add_torus_conditionals(
            node, &grid, num, used, y_segments, center, y_radius, xz_radius, inner,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn add_torus_conditionals(
    node: &mut SceneNode,
    grid: &[Point3],
    num: u32,
    used: u32,
    y_segments: usize,
    center: Point3,
    y_radius: f32,
    xz_radius: f32,
    inner: bool,
) {
    let at = |i: usize, j: usize| grid[i * (y_segments + 1) + j];
    let radius = if (inner && xz_radius > 0.0) || (!inner && xz_radius < 0.0) {
        y_radius + 0.1
    } else {
        y_radius - 0.1
    };
    for i in 0..=used as usize {
        for j in 0..y_segments {
            let p1 = at(i, j);
            let p2 = at(i, j + 1);
            let c0 = if i == 0 {
                let mut c = p1;
                c.z -= 0.1;
                c
            } else {
                at(i - 1, j)
            };
            let c1 = if i == used as usize {
                tangent_control_point(p1, i as u32, num)
            } else {
                at(i + 1, j)
            };
            node.add_conditional_line([p1, p2], [c0, c1], ShapeColor::Inherit);
        }
    }
    for i in 0..used as usize {
        for j in 0..=y_segments {
            let p1 = at(i, j);
            let p2 = at(i + 1, j);
            let c0 = if j == 0 {
                let mut c = p1;
                c.y -= 0.1_f32.copysign(xz_radius);
                c
            } else {
                at(i, j - 1)
            };
            let c1 = if j == y_segments {
                let angle = 2.0 * PI / num as f32 * i as f32;
                let mut c = circle_point(angle, radius, center);
                c.y = xz_radius;
                c
            } else {
                at(i, j + 1)
            };
            node.add_conditional_line([p1, p2], [c0, c1], ShapeColor::Inherit);
        }
    }
}

fn add_eighth_sphere(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    num: u32,
) {
    let used = (num / 4) as usize;
    let mut zero_x = vec![Vec3::zeros(); used + 1];
    let mut zero_y = vec![Vec3::zeros(); used + 1];
    let mut zero_z = vec![Vec3::zeros(); used + 1];
    for i in 0..=used {
        let angle = 2.0 * PI / num as f32 * i as f32;
        let x = 1.0 / (angle.tan() + 1.0);
        let z = 1.0 - x;
        zero_y[i] = Vec3::new(x, 0.0, z);
        zero_z[i] = Vec3::new(z, x, 0.0);
        zero_x[i] = Vec3::new(0.0, z, x);
    }
    // Intersection of the three great-circle fans through a grid cell,
    // blended for interior cells.
    let intersection = |i: usize, j: usize| -> Vec3 {
        if i + j == used {
            zero_x[j]
        } else if i == 0 {
            zero_z[used - j]
        } else if j == 0 {
            zero_y[i]
        } else {
            (zero_y[i] + zero_x[used - i] + zero_z[used - j] + zero_x[j] + zero_y[i + j]
                + zero_z[used - i - j]
                - zero_x[0]
                - zero_y[0]
                - zero_z[0])
                / 9.0
        }
    };
    let project = |v: Vec3| -> Point3 { center + v * (radius / v.norm()) };
    for j in 0..used {
        let strip_count = used - j;
        let mut points = Vec::with_capacity(strip_count * 2 + 1);
        let mut normals = Vec::with_capacity(strip_count * 2 + 1);
        let push = |p: Point3, normals: &mut Vec<Vec3>, points: &mut Vec<Point3>| {
            normals.push((p - center).normalize());
            points.push(p);
        };
        for i in 0..strip_count {
            if i == 0 {
                push(project(intersection(i, j)), &mut normals, &mut points);
            }
            push(project(intersection(i, j + 1)), &mut normals, &mut points);
            push(project(intersection(i + 1, j)), &mut normals, &mut points);
        }
        node.add_triangle_strip(opts.bfc, &points, &normals, ShapeColor::Inherit);
    }
}

fn add_cylinder(
    node: &mut SceneNode,
    opts: &GenOptions,
    center: Point3,
    radius: f32,
    height: f32,
    num: u32,
    color: Option<PackedColor>,
) {
    add_open_cone(node, opts, center, radius, radius, height, num, num, color, color);
}

fn add_stud(node: &mut SceneNode, opts: &GenOptions, num: u32) {
    let cap = opts.stud_cap_color;
    let base = Point3::new(0.0, -4.0, 0.0);
    add_cylinder(node, opts, base, 6.0, 4.0, num, cap);
    add_disc(node, opts, base, 6.0, num, num, true);
    if opts.edge_lines {
        add_circular_edge(node, base, 6.0, num, num, cap);
        add_circular_edge(node, Point3::origin(), 6.0, num, num, cap);
    }
}

fn add_low_stud(node: &mut SceneNode, opts: &GenOptions, variant: LowStud) {
    let num = LOW_SEGMENTS;
    let base = Point3::new(0.0, -4.0, 0.0);
    let origin = Point3::origin();
    match variant {
        LowStud::Stud => add_stud(node, opts, num),
        LowStud::Open { base_edges } => {
            add_cylinder(node, opts, origin, 4.0, -4.0, num, None);
            add_cylinder(node, opts, base, 6.0, 4.0, num, None);
            add_open_cone(node, opts, base, 4.0, 6.0, 0.0, num, num, None, None);
            if opts.edge_lines {
                add_circular_edge(node, base, 4.0, num, num, None);
                add_circular_edge(node, base, 6.0, num, num, None);
                if base_edges {
                    add_circular_edge(node, origin, 4.0, num, num, None);
                    add_circular_edge(node, origin, 6.0, num, num, None);
                }
            }
        }
        LowStud::Small { base_edges } => {
            add_cylinder(node, opts, base, 4.0, 4.0, num, None);
            add_disc(node, opts, base, 4.0, num, num, false);
            if opts.edge_lines {
                add_circular_edge(node, base, 4.0, num, num, None);
                if base_edges {
                    add_circular_edge(node, origin, 4.0, num, num, None);
                }
            }
        }
        LowStud::Hollow { base_edges } => {
            add_cylinder(node, opts, origin, 6.0, -4.0, num, None);
            add_cylinder(node, opts, base, 8.0, 4.0, num, None);
            add_open_cone(node, opts, base, 6.0, 8.0, 0.0, num, num, None, None);
            if opts.edge_lines {
                add_circular_edge(node, base, 6.0, num, num, None);
                add_circular_edge(node, base, 8.0, num, num, None);
                if base_edges {
                    add_circular_edge(node, origin, 6.0, num, num, None);
                    add_circular_edge(node, origin, 8.0, num, num, None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::recognize;

    fn options() -> GenOptions {
        GenOptions {
            bfc: true,
            edge_lines: true,
            conditional_lines: true,
            curve_quality: 2,
            hi_res: false,
            stud_logo: false,
            stud_cap_color: None,
        }
    }

    fn generate_named(name: &str, opts: &GenOptions) -> SceneNode {
        let mut node = SceneNode::new(name, true);
        let primitive = recognize(name).unwrap();
        generate(&mut node, &primitive, opts);
        node
    }

    #[test]
    fn test_full_cylinder_quad_count() {
        let node = generate_named("4-4cyli.dat", &options());
        // 16 segments at quality 2, one quad per segment.
        assert_eq!(node.certified.quads.len(), 16);
        assert!(node.plain.quads.is_empty());
    }

    #[test]
    fn test_quarter_cylinder_quad_count() {
        let node = generate_named("1-4cyli.dat", &options());
        assert_eq!(node.certified.quads.len(), 4);
        // Open surface: one conditional per interior seam.
        assert!(!node.plain.conditional_lines.is_empty());
    }

    #[test]
    fn test_plain_pool_without_bfc() {
        let mut opts = options();
        opts.bfc = false;
        let node = generate_named("4-4cyli.dat", &opts);
        assert!(node.certified.quads.is_empty());
        assert_eq!(node.plain.quads.len(), 16);
    }

    #[test]
    fn test_disc_triangle_count() {
        let node = generate_named("4-4disc.dat", &options());
        assert_eq!(node.certified.triangles.len(), 16);
    }

    #[test]
    fn test_conditionals_gated() {
        let mut opts = options();
        opts.conditional_lines = false;
        let node = generate_named("1-4cyli.dat", &opts);
        assert!(node.plain.conditional_lines.is_empty());
    }

    #[test]
    fn test_circular_edge_respects_edge_flag() {
        let node = generate_named("4-4edge.dat", &options());
        assert_eq!(node.plain.edge_lines.len(), 16);
        let mut opts = options();
        opts.edge_lines = false;
        let node = generate_named("4-4edge.dat", &opts);
        assert!(node.plain.edge_lines.is_empty());
    }

    #[test]
    fn test_stud_cap_color_forced() {
        let cap = PackedColor::from_rgba(10, 20, 30, 255);
        let mut opts = options();
        opts.stud_cap_color = Some(cap);
        let node = generate_named("stud.dat", &opts);
        // Stud walls carry the forced color, the cap disc inherits.
        assert!(node
            .certified
            .quads
            .iter()
            .all(|q| q.color == ShapeColor::Packed(cap)));
        assert!(node
            .certified
            .triangles
            .iter()
            .all(|t| t.color == ShapeColor::Inherit));
        assert!(node
            .plain
            .edge_lines
            .iter()
            .all(|e| e.color == ShapeColor::Packed(cap)));
    }

    #[test]
    fn test_stud_logo_uvs() {
        let mut opts = options();
        opts.stud_logo = true;
        let node = generate_named("stud.dat", &opts);
        assert!(node.certified.triangles.iter().all(|t| t.uvs.is_some()));
    }

    #[test]
    fn test_hi_res_name_raises_segments() {
        let lo = generate_named("4-4cyli.dat", &options());
        let hi = generate_named("48/4-4cyli.dat", &options());
        assert_eq!(hi.certified.quads.len(), 48);
        assert!(hi.certified.quads.len() > lo.certified.quads.len());
    }

    #[test]
    fn test_torus_emits_quads() {
        let node = generate_named("t04o4000.dat", &options());
        assert!(!node.certified.quads.is_empty());
    }

    #[test]
    fn test_quarter_torus_covers_both_sides() {
        let q = generate_named("t04q4000.dat", &options());
        let o = generate_named("t04o4000.dat", &options());
        assert_eq!(q.certified.quads.len(), o.certified.quads.len() * 4);
    }

    #[test]
    fn test_eighth_sphere_triangle_count() {
        let node = generate_named("1-8sphe.dat", &options());
        // 16 segments -> 4 rows of strips: 4^2 = 16 triangles.
        assert_eq!(node.certified.triangles.len(), 16);
    }

    #[test]
    fn test_ring_is_flat() {
        let node = generate_named("1-4ring3.dat", &options());
        assert_eq!(node.certified.quads.len(), 4);
        for quad in &node.certified.quads {
            for p in &quad.points {
                assert_eq!(p.y, 0.0);
            }
        }
        // Flat surfaces grow no conditional seams.
        assert!(node.plain.conditional_lines.is_empty());
    }

    #[test]
    fn test_low_stud_open_edges() {
        let with_base = generate_named("lowres:stu22.dat", &options());
        let without = generate_named("lowres:stu22a.dat", &options());
        assert!(with_base.plain.edge_lines.len() > without.plain.edge_lines.len());
        assert_eq!(
            with_base.certified.quads.len(),
            without.certified.quads.len()
        );
    }

    #[test]
    fn test_tangent_triangles() {
        let node = generate_named("4-4tang.dat", &options());
        assert_eq!(node.certified.triangles.len(), 16);
    }

    #[test]
    fn test_not_disc_covers_corners() {
        let node = generate_named("4-4ndis.dat", &options());
        assert_eq!(node.certified.triangles.len(), 16);
        // Every corner point sits outside the unit circle.
        assert!(node
            .certified
            .triangles
            .iter()
            .any(|t| t.points[0].coords.norm() > 1.2));
    }
}
