//! Visual theming for the service sphere.
//!
//! Provides colors, the ordinal node palette and per-element styles.

use super::types::Node;

/// Fallback for colors that cannot be parsed.
const GRAY: Color = Color::rgb(128, 128, 128);

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Build from a `0xRRGGBB` literal.
	pub const fn hex(value: u32) -> Self {
		Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses a CSS color string.
	/// Supports hex (`#RRGGBB`, `#RGB`) and `rgb()`/`rgba()` functional notation;
	/// anything else becomes neutral gray.
	pub fn parse(color_str: &str) -> Color {
		let s = color_str.trim();
		if let Some(hex) = s.strip_prefix('#') {
			match parse_hex(hex) {
				Some((r, g, b)) => Color::rgb(r, g, b),
				None => GRAY,
			}
		} else if s.starts_with("rgb") {
			let nums: Vec<&str> = s
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.collect();
			let channel = |i: usize| {
				nums.get(i)
					.and_then(|s| s.trim().parse().ok())
					.unwrap_or(128)
			};
			let a = nums
				.get(3)
				.and_then(|s| s.trim().parse().ok())
				.unwrap_or(1.0);
			Color::rgba(channel(0), channel(1), channel(2), a)
		} else {
			GRAY
		}
	}
}

/// `RRGGBB` or `RGB` hex digits; `None` if any digit is invalid.
fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
	let digit = |i: usize| {
		hex.get(i..i + 1)
			.and_then(|h| u8::from_str_radix(h, 16).ok())
	};
	match hex.len() {
		6 => {
			let byte = |i: usize| Some(digit(i)? << 4 | digit(i + 1)?);
			Some((byte(0)?, byte(2)?, byte(4)?))
		}
		3 => Some((digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
		_ => None,
	}
}

/// Ordinal color palette for nodes without an explicit color.
#[derive(Clone, Debug)]
pub struct NodePalette {
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// The ten-color categorical palette (default).
	pub fn category10() -> Self {
		Self {
			colors: [
				0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f,
				0xbcbd22, 0x17becf,
			]
			.into_iter()
			.map(Color::hex)
			.collect(),
		}
	}

	/// Color for ordinal `index`; an empty palette yields gray.
	pub fn get(&self, index: usize) -> Color {
		match self.colors.len() {
			0 => GRAY,
			len => self.colors[index % len],
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Center color of the radial gradient
	pub color_secondary: Color,
	pub use_gradient: bool,
}

/// Link and connector style.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// Base link color; links are tinted by their service when `None`.
	pub color: Option<Color>,
	pub alpha: f64,
	/// Alpha of links outside the selected neighborhood.
	pub dimmed_alpha: f64,
	pub width: f64,
	pub connector_width: f64,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Service sphere radius in world units.
	pub service_radius: f64,
	/// Table sphere radius in world units.
	pub table_radius: f64,
	pub use_gradient: bool,
	pub halo_color: Color,
	pub label_color: Color,
	pub count_color: Color,
	/// Alpha applied to nodes on the far side of the globe.
	pub depth_fade: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub link: LinkStyle,
	pub node: NodeStyle,
	pub palette: NodePalette,
}

impl Theme {
	/// Deep navy background with categorical node colors (default).
	pub fn default_theme() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::hex(0x072541),
				color_secondary: Color::hex(0x0d3563),
				use_gradient: true,
			},
			link: LinkStyle {
				color: None,
				alpha: 0.55,
				dimmed_alpha: 0.12,
				width: 1.0,
				connector_width: 2.5,
			},
			node: NodeStyle {
				service_radius: 0.3,
				table_radius: 0.2,
				use_gradient: true,
				halo_color: Color::rgba(255, 255, 255, 0.85),
				label_color: Color::rgba(255, 255, 255, 0.9),
				count_color: Color::rgb(255, 255, 255),
				depth_fade: 0.45,
			},
			palette: NodePalette::category10(),
		}
	}

	/// Color of `node` at graph position `index`: explicit color first,
	/// then the palette.
	pub fn node_color(&self, node: &Node, index: usize) -> Color {
		match &node.color {
			Some(css) => Color::parse(css),
			None => self.palette.get(index),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
