//! The scene-graph builder: one depth-first traversal per root model.

use std::collections::BTreeSet;

use log::{debug, warn};

use brickforge_doc::{
    ConditionalLine, Document, FileLine, LineSeg, Meta, Model, OverlayCommand, PackedColor, Quad,
    SubModelRef, Triangle, CODE_EDGE, CODE_MAIN,
};
use brickforge_math::Point3;
use brickforge_primitives::{self as primitives, GenOptions};
use brickforge_scene::{
    CacheKey, Instance, InstanceColor, ModelCache, SceneGraph, SceneNode, ShapeColor,
};

use crate::config::BuildConfig;
use crate::error::{BuildError, Result};
use crate::overlay::{guard_passes, OverlayStack};
use crate::texture::TextureTracker;

/// Name of the light fixture part, referenced for its placement.
const LIGHT_NAME: &str = "light.dat";

/// Palette name of the reserved overlay stud color.
const OVERLAY_STUD_COLOR: &str = "OBI_BLACK";

/// Overlay token cancelling forced stud coloring.
const STUD_CANCEL_TOKEN: &str = "obi_stud_cancel";

/// Immutable per-recursion-level traversal state.
#[derive(Debug, Clone, Copy)]
struct Ctx {
    /// Active color code.
    color: u32,
    /// Winding-certified emission is active.
    bfc: bool,
    /// Accumulated winding inversion (declared flags and mirroring).
    invert: bool,
}

/// A raw color code resolved against the active context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolved {
    /// Inherit the active main color.
    Main,
    /// Inherit the active edge color.
    Edge,
    /// A concrete packed color.
    Packed(PackedColor),
}

/// Progress callback: receives a fraction in `[0, 1]`, returns `false` to
/// request cancellation.
pub type ProgressFn<'a> = dyn FnMut(f32) -> bool + 'a;

/// Compiles one document model into a [`SceneGraph`].
pub struct Compiler<'a> {
    doc: &'a Document,
    cfg: BuildConfig,
    progress: Option<Box<ProgressFn<'a>>>,
    graph: SceneGraph,
    cache: ModelCache,
    tokens: BTreeSet<String>,
    texture: TextureTracker,
    unique_seq: u32,
    abort: bool,
}

impl<'a> Compiler<'a> {
    /// A new compiler over `doc` with the given configuration.
    pub fn new(doc: &'a Document, cfg: BuildConfig) -> Self {
        Self {
            doc,
            cfg,
            progress: None,
            graph: SceneGraph::new(""),
            cache: ModelCache::new(),
            tokens: BTreeSet::new(),
            texture: TextureTracker::new(),
            unique_seq: 0,
            abort: false,
        }
    }

    /// Install a progress callback. It is invoked once per top-level line
    /// with `(line + 1) / (count + 1)`; returning `false` aborts the build.
    pub fn on_progress(&mut self, callback: impl FnMut(f32) -> bool + 'a) {
        self.progress = Some(Box::new(callback));
    }

    /// Run the build for `root_name`.
    pub fn compile(mut self, root_name: &str) -> Result<SceneGraph> {
        let doc = self.doc;
        let root_model = doc
            .model(root_name)
            .ok_or_else(|| BuildError::UnknownModel(root_name.to_string()))?;
        debug!(
            "compiling `{}` ({} models in document)",
            root_model.name,
            doc.model_count()
        );
        let mut root_node = SceneNode::new(&root_model.name, root_model.is_part());
        let ctx = Ctx {
            color: self.cfg.default_color,
            bfc: self.cfg.bfc,
            invert: false,
        };
        self.tokens.clear();
        let outcome = self.parse_model(root_model, &mut root_node, ctx, None, true);
        self.report((1.0, 1.0));
        outcome?;
        if self.abort {
            return Err(BuildError::Cancelled);
        }
        self.graph.set_root_node(root_node);
        Ok(self.graph)
    }

    fn report(&mut self, (done, total): (f32, f32)) {
        if let Some(callback) = self.progress.as_mut() {
            if !callback(done / total) {
                self.abort = true;
            }
        }
    }

    /// Walk one model's lines into `node`. `seed` carries the caller's
    /// open overlay colors for re-establishment inside the child.
    fn parse_model(
        &mut self,
        model: &Model,
        node: &mut SceneNode,
        ctx: Ctx,
        seed: Option<(PackedColor, PackedColor)>,
        top: bool,
    ) -> Result<()> {
        use brickforge_doc::BfcCert;

        let bfc = ((ctx.bfc && model.bfc == BfcCert::CertifiedOn)
            || model.bfc == BfcCert::ForcedOn)
            && self.cfg.bfc;
        let ctx = Ctx { bfc, ..ctx };
        let mut overlay = OverlayStack::new();
        if let Some((color, edge)) = seed {
            if !self.doc.palette().is_transparent(ctx.color) {
                overlay.push(color, edge, true);
            }
        }
        if self.try_substitute(model, node, ctx, &overlay) {
            return Ok(());
        }
        let saved_tokens = self.tokens.clone();
        let count = model.lines.len();
        for (i, line) in model.lines.iter().enumerate() {
            if self.abort {
                break;
            }
            match line {
                FileLine::Comment(meta) => self.parse_comment(meta, node, &mut overlay),
                action if self.action_line_active(action) => {
                    self.texture.before_action(action.attrs(), node);
                    match action {
                        FileLine::SubModel(r) => self.parse_ref(r, node, ctx, &mut overlay)?,
                        FileLine::Line(l) => self.parse_line(l, node, ctx, &overlay),
                        FileLine::Triangle(t) => self.parse_triangle(t, node, ctx, &overlay),
                        FileLine::Quad(q) => self.parse_quad(q, node, ctx, &overlay),
                        FileLine::Conditional(c) => self.parse_conditional(c, node, ctx, &overlay),
                        FileLine::Comment(_) => unreachable!(),
                    }
                    overlay.action_happened();
                    self.texture.after_action(node);
                }
                _ => {}
            }
            if top {
                self.report(((i + 1) as f32, (count + 1) as f32));
            }
        }
        self.tokens = saved_tokens;
        if self.abort {
            Err(BuildError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Whether an action line takes part in emission under the current
    /// texturing capability.
    fn action_line_active(&self, line: &FileLine) -> bool {
        line.attrs()
            .is_none_or(|attrs| TextureTracker::line_active(self.cfg.texmaps, attrs))
    }

    fn parse_comment(&mut self, meta: &Meta, node: &mut SceneNode, overlay: &mut OverlayStack) {
        match meta {
            Meta::Step => node.next_step(),
            Meta::Overlay(command) => {
                if self.cfg.overlay {
                    self.parse_overlay_command(command, overlay);
                }
            }
            Meta::Texture(marker) => {
                if self.cfg.texmaps {
                    self.texture.on_marker(*marker, node);
                }
            }
        }
    }

    fn parse_overlay_command(&mut self, command: &OverlayCommand, overlay: &mut OverlayStack) {
        let palette = self.doc.palette();
        match command {
            OverlayCommand::Set { token } => {
                self.tokens.insert(token.to_ascii_lowercase());
            }
            OverlayCommand::Unset { token } => {
                self.tokens.remove(&token.to_ascii_lowercase());
            }
            OverlayCommand::Start { color, guard } | OverlayCommand::Next { color, guard } => {
                if guard_passes(guard.as_ref(), &self.tokens) {
                    let packed = palette.packed_rgba(*color);
                    let edge = palette.packed_rgba(palette.edge_code(*color));
                    let sticky = matches!(command, OverlayCommand::Start { .. });
                    overlay.push(packed, edge, sticky);
                }
            }
            OverlayCommand::End => overlay.pop(),
        }
    }

    /// Resolve a raw color code against the active context, honoring an
    /// open overlay for opaque active colors.
    fn resolve_color(&self, raw: u32, ctx: Ctx, overlay: &OverlayStack) -> Resolved {
        if raw == CODE_MAIN || raw == CODE_EDGE {
            if !self.doc.palette().is_transparent(ctx.color) {
                if let Some(entry) = overlay.top() {
                    return Resolved::Packed(if raw == CODE_MAIN {
                        entry.color
                    } else {
                        entry.edge
                    });
                }
            }
            if raw == CODE_MAIN {
                Resolved::Main
            } else {
                Resolved::Edge
            }
        } else {
            Resolved::Packed(self.doc.palette().packed_rgba(raw))
        }
    }

    fn parse_line(&mut self, line: &LineSeg, node: &mut SceneNode, ctx: Ctx, overlay: &OverlayStack) {
        match self.resolve_color(line.color, ctx, overlay) {
            Resolved::Main => node.add_line(line.points, ShapeColor::Inherit),
            Resolved::Edge => {
                if self.cfg.edge_lines {
                    node.add_edge_line(line.points, ShapeColor::Inherit);
                }
            }
            Resolved::Packed(color) => node.add_line(line.points, ShapeColor::Packed(color)),
        }
    }

    /// The color a filled shape is stored under: inherit-edge resolves to
    /// the edge color paired with the active color.
    fn face_color(&self, raw: u32, ctx: Ctx, overlay: &OverlayStack) -> ShapeColor {
        let palette = self.doc.palette();
        match self.resolve_color(raw, ctx, overlay) {
            Resolved::Main => ShapeColor::Inherit,
            Resolved::Edge => ShapeColor::Packed(palette.packed_rgba(palette.edge_code(ctx.color))),
            Resolved::Packed(color) => ShapeColor::Packed(color),
        }
    }

    fn parse_triangle(
        &mut self,
        triangle: &Triangle,
        node: &mut SceneNode,
        ctx: Ctx,
        overlay: &OverlayStack,
    ) {
        let color = self.face_color(triangle.color, ctx, overlay);
        let bfc = ctx.bfc && triangle.bfc.enabled();
        if bfc {
            let p = &triangle.points;
            let points = if should_flip_winding(ctx.invert, triangle.ccw) {
                [p[2], p[1], p[0]]
            } else {
                *p
            };
            node.add_triangle(true, points, color);
        } else {
            node.add_triangle(false, triangle.points, color);
        }
    }

    fn parse_quad(&mut self, quad: &Quad, node: &mut SceneNode, ctx: Ctx, overlay: &OverlayStack) {
        let color = self.face_color(quad.color, ctx, overlay);
        let bfc = ctx.bfc && quad.bfc.enabled();
        if bfc {
            let p = &quad.points;
            let points = if should_flip_winding(ctx.invert, quad.ccw) {
                [p[3], p[2], p[1], p[0]]
            } else {
                *p
            };
            node.add_quad(true, points, color);
        } else {
            node.add_quad(false, quad.points, color);
        }
    }

    fn parse_conditional(
        &mut self,
        line: &ConditionalLine,
        node: &mut SceneNode,
        ctx: Ctx,
        overlay: &OverlayStack,
    ) {
        if !(self.cfg.edge_lines && self.cfg.conditional_lines) {
            return;
        }
        let color = match self.resolve_color(line.color, ctx, overlay) {
            Resolved::Main | Resolved::Edge => ShapeColor::Inherit,
            Resolved::Packed(color) => ShapeColor::Packed(color),
        };
        node.add_conditional_line(line.points, line.controls, color);
    }

    /// The active color a reference establishes for its sub-tree.
    fn active_color_for_ref(&self, r: &SubModelRef, active: u32) -> u32 {
        match r.color {
            CODE_MAIN => active,
            CODE_EDGE => self.doc.palette().edge_code(active),
            literal => literal,
        }
    }

    fn parse_ref(
        &mut self,
        r: &SubModelRef,
        parent: &mut SceneNode,
        ctx: Ctx,
        overlay: &mut OverlayStack,
    ) -> Result<()> {
        let doc = self.doc;
        let Some(child) = doc.model(&r.model) else {
            warn!("unresolved reference to `{}`; instance skipped", r.model);
            return Ok(());
        };
        let bfc = ctx.bfc && r.bfc.enabled();
        let mirrored = r.transform.determinant() < 0.0;
        let invert = bfc && (ctx.invert ^ r.invert ^ mirrored);
        let active = self.active_color_for_ref(r, ctx.color);
        let child_ctx = Ctx {
            color: active,
            bfc,
            invert,
        };
        let key = if doc.palette().is_transparent(active) {
            // Transparency wins over overlay forcing for the sub-tree.
            overlay.pop();
            CacheKey::shared(&child.name, true, bfc, invert)
        } else if !self.tokens.is_empty() || overlay.is_active() {
            let token = self.unique_seq;
            self.unique_seq += 1;
            CacheKey::unique(&child.name, token, bfc, invert)
        } else {
            CacheKey::shared(&child.name, false, bfc, invert)
        };
        let node_key = if let Some(existing) = self.cache.lookup(&key) {
            existing
        } else {
            if !self.cache.begin(&key) {
                warn!(
                    "reference cycle through `{}`; instance skipped",
                    child.name
                );
                return Ok(());
            }
            let mut node = SceneNode::new(&child.name, child.is_part());
            let outcome = if self.cfg.bounding_boxes_only && child.is_part() {
                self.add_bounding_box(child, &mut node);
                Ok(())
            } else {
                let seed = overlay.top().map(|entry| (entry.color, entry.edge));
                self.parse_model(child, &mut node, child_ctx, seed, false)
            };
            self.cache.finish(&key);
            outcome?;
            let node_key = self.graph.insert(node);
            if key.token.is_none() {
                self.cache.register(key, node_key);
            } else {
                self.graph.note_unregistered();
            }
            node_key
        };
        self.attach(parent, node_key, r, ctx, active, overlay, child.is_part());
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn attach(
        &mut self,
        parent: &mut SceneNode,
        node_key: brickforge_scene::NodeKey,
        r: &SubModelRef,
        ctx: Ctx,
        active: u32,
        overlay: &OverlayStack,
        child_is_part: bool,
    ) {
        let palette = self.doc.palette();
        let mut specular = None;
        let mut shininess = None;
        // The overlay redirection keys off the color the reference resolved
        // to, not the parent's active color.
        let color = match self.resolve_color(r.color, Ctx { color: active, ..ctx }, overlay) {
            Resolved::Main | Resolved::Edge => None,
            Resolved::Packed(packed) => {
                // Literal codes carry the palette's lighting attributes;
                // overlay-forced packed colors have none to carry.
                if r.color != CODE_MAIN && r.color != CODE_EDGE {
                    specular = palette.specular(r.color);
                    shininess = palette.shininess(r.color);
                    Some(InstanceColor {
                        color: packed,
                        edge: palette.packed_rgba(palette.edge_code(r.color)),
                    })
                } else {
                    Some(InstanceColor {
                        color: packed,
                        edge: overlay.top_edge(palette.packed_rgba(palette.edge_code(active))),
                    })
                }
            }
        };
        let light = child_is_part && !parent.part && r.model.eq_ignore_ascii_case(LIGHT_NAME);
        let mirrored = r.transform.determinant() < 0.0;
        parent.add_instance(Instance {
            node: node_key,
            transform: r.transform.clone(),
            color,
            mirrored,
            specular,
            shininess,
            light,
        });
    }

    /// The forced stud wall color, when overlay forcing applies.
    fn stud_cap_color(&self, ctx: Ctx, overlay: &OverlayStack) -> Option<PackedColor> {
        let palette = self.doc.palette();
        if self.cfg.overlay
            && overlay.is_active()
            && !palette.is_transparent(ctx.color)
            && !self.tokens.contains(STUD_CANCEL_TOKEN)
        {
            let code = palette.code_for_name(OVERLAY_STUD_COLOR).unwrap_or(0);
            Some(palette.packed_rgba(code))
        } else {
            None
        }
    }

    /// Try generating the model procedurally. Returns `true` when the
    /// caller must not expand the literal file.
    fn try_substitute(
        &mut self,
        model: &Model,
        node: &mut SceneNode,
        ctx: Ctx,
        overlay: &OverlayStack,
    ) -> bool {
        if self.cfg.primitive_substitution {
            if let Some(primitive) = primitives::recognize(&model.name) {
                let opts = GenOptions {
                    bfc: ctx.bfc,
                    edge_lines: self.cfg.edge_lines,
                    conditional_lines: self.cfg.edge_lines && self.cfg.conditional_lines,
                    curve_quality: self.cfg.curve_quality,
                    hi_res: self.cfg.hi_res_primitives,
                    stud_logo: self.cfg.stud_logo,
                    stud_cap_color: self.stud_cap_color(ctx, overlay),
                };
                primitives::generate(node, &primitive, &opts);
                return true;
            }
        }
        if self.cfg.no_light_geom && model.name.eq_ignore_ascii_case(LIGHT_NAME) {
            // The light part places a light source; it draws nothing.
            return true;
        }
        false
    }

    /// Six quads approximating a part by its bounding box.
    fn add_bounding_box(&mut self, model: &Model, node: &mut SceneNode) {
        const FACES: [[[usize; 3]; 4]; 6] = [
            [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]],
            [[1, 1, 1], [0, 1, 1], [0, 0, 1], [1, 0, 1]],
            [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
            [[1, 1, 1], [1, 0, 1], [1, 0, 0], [1, 1, 0]],
            [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
            [[1, 1, 1], [1, 1, 0], [0, 1, 0], [0, 1, 1]],
        ];
        let Some((min, max)) = model.bounding_box(self.doc) else {
            return;
        };
        let ends = [min, max];
        for face in &FACES {
            let mut quad = [Point3::origin(); 4];
            for (corner, pick) in quad.iter_mut().zip(face) {
                for axis in 0..3 {
                    corner[axis] = ends[pick[axis]][axis];
                }
            }
            node.add_quad(self.cfg.bfc, quad, ShapeColor::Inherit);
        }
    }
}

/// Whether declared winding and accumulated inversion require reversing
/// vertex order before certified emission.
fn should_flip_winding(invert: bool, ccw: bool) -> bool {
    (invert && ccw) || (!invert && !ccw)
}

/// Convenience entry point: compile `root_name` without progress reporting.
pub fn compile(doc: &Document, root_name: &str, cfg: &BuildConfig) -> Result<SceneGraph> {
    Compiler::new(doc, cfg.clone()).compile(root_name)
}
