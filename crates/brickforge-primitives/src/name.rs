//! Primitive-name recognition.
//!
//! Model names encoding one of the standard round primitives are parsed
//! once into a [`Primitive`] value; generation dispatches on the tag
//! instead of re-probing strings.

/// Fraction-of-circle encoded in a primitive name (`1-4cyli` is a quarter
/// cylinder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleFraction {
    /// Numerator.
    pub num: u32,
    /// Denominator.
    pub den: u32,
}

impl CircleFraction {
    /// The full circle.
    pub const FULL: Self = Self { num: 1, den: 1 };

    /// The fraction as a float in `(0, 1]`.
    pub fn value(self) -> f32 {
        self.num as f32 / self.den as f32
    }
}

/// Which part of a torus surface a torus primitive covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorusKind {
    /// Inside of the tube.
    Inner,
    /// Outside of the tube.
    Outer,
    /// Full tube cross-section.
    Quarter,
}

/// Low-resolution stud variants substituted by the loading layer under the
/// `lowres:` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LowStud {
    /// Plain stud at fixed low resolution.
    Stud,
    /// Hollow underside stud; `base_edges` keeps the base-plane edge rings.
    Open {
        /// Emit the base-plane edge rings.
        base_edges: bool,
    },
    /// Small solid stud.
    Small {
        /// Emit the base-plane edge rings.
        base_edges: bool,
    },
    /// Large hollow underside stud.
    Hollow {
        /// Emit the base-plane edge rings.
        base_edges: bool,
    },
}

/// A recognized primitive family with its numeric parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveKind {
    /// Standard stud.
    Stud,
    /// Low-resolution stud family.
    LowResStud(LowStud),
    /// One eighth of a unit sphere.
    EighthSphere,
    /// Open cylinder wall.
    Cylinder(CircleFraction),
    /// Cylinder sloped along one axis.
    SlopedCylinder(CircleFraction),
    /// Cylinder sloped to a peak.
    SlopedCylinder2(CircleFraction),
    /// Filled chord between the first and last circle points.
    Chord(CircleFraction),
    /// Filled disc.
    Disc(CircleFraction),
    /// Square with a disc removed.
    NotDisc(CircleFraction),
    /// Tangent ring between a circle and its bounding polygon.
    Tangent(CircleFraction),
    /// Circular edge line.
    CircularEdge(CircleFraction),
    /// Open cone shell from radius `size + 1` down to `size`.
    Cone {
        /// Circle fraction.
        fraction: CircleFraction,
        /// Inner radius of the cone ring.
        size: u32,
    },
    /// Flat ring from radius `size` to `size + 1`.
    Ring {
        /// Circle fraction.
        fraction: CircleFraction,
        /// Inner radius.
        size: u32,
    },
    /// Torus section. `size` encodes the minor radius; negative values use
    /// the extended encoding of the `r`-prefixed outer tori.
    Torus {
        /// Covered part of the tube surface.
        kind: TorusKind,
        /// Major-circle fraction.
        fraction: CircleFraction,
        /// Encoded minor radius.
        size: i32,
        /// Mixed-resolution torus (`tm` prefix): minor circle stays at
        /// standard resolution even for hi-res names.
        mixed: bool,
    },
}

/// A recognized primitive plus its resolution request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    /// The family and parameters.
    pub kind: PrimitiveKind,
    /// Name carried the hi-res (`48/`) prefix.
    pub hi_res: bool,
}

/// Prefix marking the loader-substituted low-resolution stud files.
pub const LOWRES_PREFIX: &str = "lowres:";

/// Recognize a primitive name. Returns `None` for names that must be
/// expanded from their literal file instead.
pub fn recognize(name: &str) -> Option<Primitive> {
    let name = name.to_ascii_lowercase().replace('\\', "/");
    let (name, hi_res) = match name.strip_prefix("48/") {
        Some(rest) => (rest, true),
        None => (name.as_str(), false),
    };
    let kind = recognize_bare(name)?;
    Some(Primitive { kind, hi_res })
}

fn recognize_bare(name: &str) -> Option<PrimitiveKind> {
    if let Some(stud) = name.strip_prefix(LOWRES_PREFIX) {
        let variant = match stud {
            "stu2.dat" => LowStud::Stud,
            "stu22.dat" => LowStud::Open { base_edges: true },
            "stu22a.dat" => LowStud::Open { base_edges: false },
            "stu23.dat" => LowStud::Small { base_edges: true },
            "stu23a.dat" => LowStud::Small { base_edges: false },
            "stu24.dat" => LowStud::Hollow { base_edges: true },
            "stu24a.dat" => LowStud::Hollow { base_edges: false },
            _ => return None,
        };
        return Some(PrimitiveKind::LowResStud(variant));
    }
    match name {
        "stud.dat" => return Some(PrimitiveKind::Stud),
        "1-8sphe.dat" => return Some(PrimitiveKind::EighthSphere),
        _ => {}
    }
    if let Some(kind) = recognize_torus(name) {
        return Some(kind);
    }
    if let Some(size) = old_ring_size(name) {
        return Some(PrimitiveKind::Ring {
            fraction: CircleFraction::FULL,
            size,
        });
    }
    let (fraction, rest) = parse_fraction(name)?;
    let suffix = rest.strip_suffix(".dat")?;
    let kind = match suffix {
        "cyli" => PrimitiveKind::Cylinder(fraction),
        "cyls" => PrimitiveKind::SlopedCylinder(fraction),
        "cyls2" => PrimitiveKind::SlopedCylinder2(fraction),
        "chrd" => PrimitiveKind::Chord(fraction),
        "disc" => PrimitiveKind::Disc(fraction),
        "ndis" => PrimitiveKind::NotDisc(fraction),
        "tang" => PrimitiveKind::Tangent(fraction),
        "edge" => PrimitiveKind::CircularEdge(fraction),
        _ => {
            if let Some(size) = sized_suffix(suffix, "con", 2) {
                PrimitiveKind::Cone { fraction, size }
            } else if let Some(size) = ring_size(suffix) {
                PrimitiveKind::Ring { fraction, size }
            } else {
                return None;
            }
        }
    };
    Some(kind)
}

/// `N-M` prefix: one numerator digit, one or two denominator digits.
fn parse_fraction(name: &str) -> Option<(CircleFraction, &str)> {
    let bytes = name.as_bytes();
    if bytes.len() < 4 || !bytes[0].is_ascii_digit() || bytes[1] != b'-' {
        return None;
    }
    let den_len = if bytes[2].is_ascii_digit() && bytes.get(3).is_some_and(u8::is_ascii_digit) {
        2
    } else if bytes[2].is_ascii_digit() {
        1
    } else {
        return None;
    };
    if bytes.get(2 + den_len).is_some_and(u8::is_ascii_digit) {
        return None;
    }
    let num = u32::from(bytes[0] - b'0');
    let den: u32 = name[2..2 + den_len].parse().ok()?;
    if num == 0 || den == 0 || num > den {
        return None;
    }
    Some((CircleFraction { num, den }, &name[2 + den_len..]))
}

/// `<tag><digits>` suffix with a bounded digit count.
fn sized_suffix(suffix: &str, tag: &str, max_digits: usize) -> Option<u32> {
    let digits = suffix.strip_prefix(tag)?;
    if digits.is_empty() || digits.len() > max_digits {
        return None;
    }
    digits.parse().ok()
}

/// Ring suffixes accept the progressively truncated spellings the catalog
/// grew as sizes got longer: `ring`, `rin`, `ri`, `r`.
fn ring_size(suffix: &str) -> Option<u32> {
    for tag in ["ring", "rin", "ri", "r"] {
        if let Some(size) = sized_suffix(suffix, tag, 4) {
            return Some(size);
        }
    }
    None
}

/// Old-style full-circle rings carry no fraction prefix: `ring3.dat`.
fn old_ring_size(name: &str) -> Option<u32> {
    sized_suffix(name.strip_suffix(".dat")?, "ring", 4)
}

/// Tori: `t<DD><i|o|q><SSSS>.dat`, mixed-resolution `tm` variant, and
/// `r`-prefixed outer tori whose size is negated into the extended minor
/// radius encoding.
fn recognize_torus(name: &str) -> Option<PrimitiveKind> {
    let bytes = name.as_bytes();
    let (mixed, rest, negate) = if let Some(rest) = name.strip_prefix("tm") {
        (true, rest, false)
    } else if bytes.first() == Some(&b't') {
        (false, &name[1..], false)
    } else if bytes.first() == Some(&b'r') {
        (false, &name[1..], true)
    } else {
        return None;
    };
    let body = rest.strip_suffix(".dat")?;
    let body_bytes = body.as_bytes();
    if body_bytes.len() != 7 {
        return None;
    }
    if !body_bytes[..2].iter().all(u8::is_ascii_digit)
        || !body_bytes[3..].iter().all(u8::is_ascii_digit)
    {
        return None;
    }
    let kind = match body_bytes[2] {
        b'i' => TorusKind::Inner,
        b'o' => TorusKind::Outer,
        b'q' => TorusKind::Quarter,
        _ => return None,
    };
    if negate && kind != TorusKind::Outer {
        return None;
    }
    let den: u32 = body[..2].parse().ok()?;
    if den == 0 {
        return None;
    }
    let mut size: i32 = body[3..].parse().ok()?;
    if negate {
        size = -size;
    }
    Some(PrimitiveKind::Torus {
        kind,
        fraction: CircleFraction { num: 1, den },
        size,
        mixed,
    })
}
