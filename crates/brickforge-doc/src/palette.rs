//! Color palette: packed colors, transparency classification, edge-color
//! and name lookup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw color code meaning "inherit the active main color".
pub const CODE_MAIN: u32 = 16;

/// Raw color code meaning "inherit the active edge color".
pub const CODE_EDGE: u32 = 24;

/// A packed RGBA color in `0xRRGGBBAA` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackedColor(pub u32);

impl PackedColor {
    /// Opaque black, also the fallback for undefined palette codes.
    pub const BLACK: Self = Self(0x0000_00FF);

    /// Pack from individual channel bytes.
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(u32::from(r) << 24 | u32::from(g) << 16 | u32::from(b) << 8 | u32::from(a))
    }

    /// Red channel.
    pub fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Green channel.
    pub fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Blue channel.
    pub fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Alpha channel.
    pub fn a(self) -> u8 {
        self.0 as u8
    }
}

/// One palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorDef {
    /// Human-readable color name, e.g. `"Red"` or `"OBI_BLACK"`.
    pub name: String,
    /// Channel bytes `[r, g, b, a]`.
    pub rgba: [u8; 4],
    /// Whether geometry in this color renders translucent.
    pub transparent: bool,
    /// Color code used for edge lines around geometry in this color.
    pub edge: u32,
    /// Optional specular reflectance for lighting.
    pub specular: Option<[f32; 4]>,
    /// Optional specular exponent.
    pub shininess: Option<f32>,
}

impl ColorDef {
    /// A plain opaque entry with the default edge color.
    pub fn opaque(name: &str, r: u8, g: u8, b: u8, edge: u32) -> Self {
        Self {
            name: name.to_string(),
            rgba: [r, g, b, 255],
            transparent: false,
            edge,
            specular: None,
            shininess: None,
        }
    }

    /// A translucent entry.
    pub fn translucent(name: &str, r: u8, g: u8, b: u8, edge: u32) -> Self {
        Self {
            name: name.to_string(),
            rgba: [r, g, b, TRANS_ALPHA],
            transparent: true,
            edge,
            specular: None,
            shininess: None,
        }
    }

    /// Packed form of this entry's RGBA.
    pub fn packed(&self) -> PackedColor {
        PackedColor::from_rgba(self.rgba[0], self.rgba[1], self.rgba[2], self.rgba[3])
    }
}

const TRANS_ALPHA: u8 = 160;

/// Palette mapping raw color codes to concrete colors.
///
/// Codes [`CODE_MAIN`] and [`CODE_EDGE`] are reserved and never stored;
/// they resolve against the active color context instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colors: HashMap<u32, ColorDef>,
}

impl Palette {
    /// An empty palette. Lookups fall back to opaque black.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard palette: the 16 classic opaque colors plus their
    /// translucent counterparts at codes 32..=47.
    pub fn standard() -> Self {
        let mut palette = Self::default();
        let opaque: [(&str, u8, u8, u8, u32); 16] = [
            ("Black", 51, 51, 51, 8),
            ("Blue", 0, 51, 178, 9),
            ("Green", 0, 127, 51, 10),
            ("Teal", 0, 181, 166, 11),
            ("Red", 204, 0, 0, 12),
            ("Dark Pink", 255, 51, 153, 13),
            ("Brown", 102, 51, 0, 8),
            ("Gray", 153, 153, 153, 8),
            ("Dark Gray", 102, 102, 88, 0),
            ("Light Blue", 0, 128, 255, 1),
            ("Light Green", 51, 255, 102, 2),
            ("Turquoise", 171, 253, 249, 3),
            ("Light Red", 255, 0, 0, 4),
            ("Pink", 255, 176, 204, 5),
            ("Yellow", 255, 229, 0, 8),
            ("White", 255, 255, 255, 8),
        ];
        let translucent: [(&str, u8, u8, u8, u32); 16] = [
            ("Trans Black", 102, 102, 102, 40),
            ("Trans Blue", 0, 0, 153, 41),
            ("Trans Green", 0, 80, 24, 42),
            ("Trans Dark Cyan", 0, 181, 166, 43),
            ("Trans Red", 204, 0, 0, 44),
            ("Trans Purple", 255, 51, 153, 45),
            ("Trans Brown", 102, 51, 0, 32),
            ("Trans Light Gray", 153, 153, 153, 40),
            ("Trans Gray", 102, 102, 88, 32),
            ("Trans Light Cyan", 153, 192, 240, 33),
            ("Trans Yellow Green", 204, 255, 0, 34),
            ("Trans Cyan", 171, 253, 249, 35),
            ("Trans Light Red", 255, 0, 0, 36),
            ("Trans Pink", 255, 176, 204, 37),
            ("Trans Yellow", 240, 196, 0, 40),
            ("Clear", 255, 255, 255, 40),
        ];
        for (code, (name, r, g, b, edge)) in opaque.iter().enumerate() {
            palette.define(code as u32, ColorDef::opaque(name, *r, *g, *b, *edge));
        }
        for (i, (name, r, g, b, edge)) in translucent.iter().enumerate() {
            palette.define(32 + i as u32, ColorDef::translucent(name, *r, *g, *b, *edge));
        }
        palette
    }

    /// Define or replace the entry for `code`. Reserved codes are ignored.
    pub fn define(&mut self, code: u32, def: ColorDef) {
        if code != CODE_MAIN && code != CODE_EDGE {
            self.colors.insert(code, def);
        }
    }

    /// The entry for `code`, if defined.
    pub fn color(&self, code: u32) -> Option<&ColorDef> {
        self.colors.get(&code)
    }

    /// Packed RGBA for `code`, falling back to opaque black for undefined
    /// codes.
    pub fn packed_rgba(&self, code: u32) -> PackedColor {
        self.colors
            .get(&code)
            .map_or(PackedColor::BLACK, ColorDef::packed)
    }

    /// Whether `code` resolves to a translucent color.
    pub fn is_transparent(&self, code: u32) -> bool {
        self.colors.get(&code).is_some_and(|c| c.transparent)
    }

    /// The edge color code paired with `code` (0 for undefined codes).
    pub fn edge_code(&self, code: u32) -> u32 {
        self.colors.get(&code).map_or(0, |c| c.edge)
    }

    /// Case-insensitive reverse lookup by entry name.
    pub fn code_for_name(&self, name: &str) -> Option<u32> {
        self.colors
            .iter()
            .find(|(_, def)| def.name.eq_ignore_ascii_case(name))
            .map(|(code, _)| *code)
    }

    /// Specular reflectance for `code`, if the entry declares one.
    pub fn specular(&self, code: u32) -> Option<[f32; 4]> {
        self.colors.get(&code).and_then(|c| c.specular)
    }

    /// Specular exponent for `code`, if the entry declares one.
    pub fn shininess(&self, code: u32) -> Option<f32> {
        self.colors.get(&code).and_then(|c| c.shininess)
    }
}
