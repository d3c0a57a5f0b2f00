//! Build configuration, read once per build and immutable for its
//! duration.

/// Settings consumed by the scene-graph builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Honor winding certification and emit through the certified pools.
    pub bfc: bool,
    /// Emit edge lines and edge-line generators.
    pub edge_lines: bool,
    /// Load conditional lines (also requires `edge_lines`).
    pub conditional_lines: bool,
    /// Substitute recognized round primitives procedurally.
    pub primitive_substitution: bool,
    /// Curve-quality tier, 1..=12.
    pub curve_quality: u32,
    /// Promote all primitives to the hi-res segment floor.
    pub hi_res_primitives: bool,
    /// Register 6-quad bounding boxes instead of tessellating parts.
    pub bounding_boxes_only: bool,
    /// Texturing capability: selects textured geometry over its fallback.
    pub texmaps: bool,
    /// Enable the overlay color feature.
    pub overlay: bool,
    /// Active color code at the root of the build.
    pub default_color: u32,
    /// Generate stud-logo texture coordinates on stud caps.
    pub stud_logo: bool,
    /// Emit no geometry for the light fixture part.
    pub no_light_geom: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            bfc: true,
            edge_lines: true,
            conditional_lines: true,
            primitive_substitution: true,
            curve_quality: 2,
            hi_res_primitives: false,
            bounding_boxes_only: false,
            texmaps: true,
            overlay: false,
            default_color: 7,
            stud_logo: false,
            no_light_geom: false,
        }
    }
}
