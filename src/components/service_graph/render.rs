//! Canvas rendering for the service sphere.
//!
//! Draws one frame from the scene held by [`CanvasPort`]. Two views exist:
//! 1. Globe: background, links, then nodes back to front with labels and halo
//! 2. Detail: the expanded service in the middle with its tables on a ring

use std::cmp::Ordering;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::graph::Graph;
use super::port::{DecorationStyle, DecorationTarget};
use super::scene::{CanvasPort, Projected};
use super::theme::{Color, Theme};
use super::types::{Node, Vec3};

const LABEL_FONT: &str = "12px sans-serif";
const COUNT_FONT: &str = "bold 10px sans-serif";
const DETAIL_FONT: &str = "bold 14px sans-serif";

/// Renders the complete scene to the canvas.
pub fn render(
	ctx: &CanvasRenderingContext2d,
	port: &CanvasPort,
	graph: &Graph,
	expanded: Option<&str>,
	theme: &Theme,
) {
	draw_background(ctx, port, theme);

	match expanded.filter(|_| port.is_detail_view()) {
		Some(service_id) => draw_detail(ctx, port, graph, service_id, theme),
		None => {
			draw_links(ctx, port, graph, theme);
			draw_nodes(ctx, port, graph, theme);
		}
	}
}

fn draw_background(ctx: &CanvasRenderingContext2d, port: &CanvasPort, theme: &Theme) {
	let (w, h) = (port.width(), port.height());
	let gradient = theme
		.background
		.use_gradient
		.then(|| ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8))
		.and_then(Result::ok);

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, w, h);
}

/// Alpha for a node at `depth`: full in front of the globe center, faded behind.
fn depth_alpha(port: &CanvasPort, depth: f64, theme: &Theme) -> f64 {
	if depth <= port.distance() {
		1.0
	} else {
		theme.node.depth_fade
	}
}

fn node_radius(node: &Node, theme: &Theme) -> f64 {
	if node.is_service() {
		theme.node.service_radius
	} else {
		theme.node.table_radius
	}
}

fn draw_links(ctx: &CanvasRenderingContext2d, port: &CanvasPort, graph: &Graph, theme: &Theme) {
	let any_connector = port
		.decorations()
		.iter()
		.any(|(_, style)| *style == DecorationStyle::Connector);

	for link in graph.links() {
		let (Some(source), Some(target)) = (graph.node(&link.source_id), graph.node(&link.target_id))
		else {
			continue;
		};
		let (Some(a), Some(b)) = (port.project(source.position), port.project(target.position))
		else {
			continue;
		};

		let highlighted = port.is_decorated(&DecorationTarget::Link(link.clone()));
		let base = theme.link.color.unwrap_or_else(|| {
			let index = graph.index_of(&source.id).unwrap_or_default();
			theme.node_color(source, index)
		});
		let alpha = if highlighted {
			1.0
		} else if any_connector {
			theme.link.dimmed_alpha
		} else {
			theme.link.alpha
		};

		ctx.set_stroke_style_str(&base.with_alpha(alpha * base.a).to_css());
		if highlighted {
			ctx.set_line_width(theme.link.connector_width);
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(6.0),
				&JsValue::from_f64(4.0),
			));
		} else {
			ctx.set_line_width(theme.link.width);
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}

	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(ctx: &CanvasRenderingContext2d, port: &CanvasPort, graph: &Graph, theme: &Theme) {
	let mut visible: Vec<(usize, &Node, Projected)> = graph
		.nodes()
		.iter()
		.enumerate()
		.filter_map(|(index, node)| port.project(node.position).map(|p| (index, node, p)))
		.collect();
	// Farthest first so nearer spheres paint over them.
	visible.sort_by(|a, b| b.2.depth.partial_cmp(&a.2.depth).unwrap_or(Ordering::Equal));

	for (index, node, p) in visible {
		let radius = node_radius(node, theme) * p.scale;
		let alpha = depth_alpha(port, p.depth, theme);
		let color = theme.node_color(node, index);

		draw_sphere(ctx, p.x, p.y, radius, color, alpha, theme);

		if port.is_decorated(&DecorationTarget::Node(node.id.clone())) {
			draw_halo(ctx, p.x, p.y, radius, theme);
		}

		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str(&theme.node.label_color.to_css());
		ctx.set_font(LABEL_FONT);
		let _ = ctx.fill_text(&node.name, p.x + radius + 4.0, p.y + 4.0);
		if let Some(count) = node.related_count {
			draw_count(ctx, p.x, p.y, count, theme);
		}
		ctx.set_global_alpha(1.0);
	}
}

fn draw_detail(
	ctx: &CanvasRenderingContext2d,
	port: &CanvasPort,
	graph: &Graph,
	service_id: &str,
	theme: &Theme,
) {
	let Some(center) = port.project_camera_space(Vec3::ZERO) else {
		return;
	};
	let (color, name) = match (graph.index_of(service_id), graph.node(service_id)) {
		(Some(index), Some(node)) => (theme.node_color(node, index), node.name.as_str()),
		_ => (theme.palette.get(0), service_id),
	};

	for (_, position) in port.ring_slots() {
		let Some(p) = port.project_camera_space(position) else {
			continue;
		};
		ctx.set_stroke_style_str(&color.with_alpha(theme.link.alpha).to_css());
		ctx.set_line_width(theme.link.connector_width);
		ctx.begin_path();
		ctx.move_to(center.x, center.y);
		ctx.line_to(p.x, p.y);
		ctx.stroke();
	}

	let radius = theme.node.service_radius * center.scale;
	draw_sphere(ctx, center.x, center.y, radius, color, 1.0, theme);
	draw_halo(ctx, center.x, center.y, radius, theme);
	ctx.set_fill_style_str(&theme.node.label_color.to_css());
	ctx.set_font(DETAIL_FONT);
	ctx.set_text_align("center");
	let _ = ctx.fill_text(name, center.x, center.y + radius + 18.0);

	for (target, style) in port.decorations() {
		let (DecorationTarget::Node(id), DecorationStyle::RingSlot { position, label, count }) =
			(target, style)
		else {
			continue;
		};
		let Some(p) = port.project_camera_space(*position) else {
			continue;
		};
		let slot_color = match (graph.index_of(id), graph.node(id)) {
			(Some(index), Some(node)) => theme.node_color(node, index),
			_ => theme.palette.get(0),
		};
		let r = theme.node.table_radius * p.scale;
		draw_sphere(ctx, p.x, p.y, r, slot_color, 1.0, theme);
		if let Some(count) = count {
			draw_count(ctx, p.x, p.y, *count, theme);
		}
		ctx.set_fill_style_str(&theme.node.label_color.to_css());
		ctx.set_font(LABEL_FONT);
		ctx.set_text_align("center");
		let _ = ctx.fill_text(label, p.x, p.y + r + 14.0);
	}
	ctx.set_text_align("start");
}

fn draw_sphere(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	color: Color,
	alpha: f64,
	theme: &Theme,
) {
	ctx.set_global_alpha(alpha);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);

	let gradient = theme
		.node
		.use_gradient
		.then(|| ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius))
		.and_then(Result::ok);
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &color.to_css());
			let _ = gradient.add_color_stop(1.0, &color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&color.to_css()),
	}
	ctx.fill();
	ctx.set_global_alpha(1.0);
}

fn draw_halo(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, theme: &Theme) {
	let halo = theme.node.halo_color;
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius * 1.6, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&halo.to_css());
	ctx.set_line_width(2.0);
	ctx.stroke();

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius * 2.2, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&halo.with_alpha(halo.a * 0.35).to_css());
	ctx.set_line_width(1.0);
	ctx.stroke();
}

/// Row count printed on top of a table sphere.
fn draw_count(ctx: &CanvasRenderingContext2d, x: f64, y: f64, count: u32, theme: &Theme) {
	ctx.set_fill_style_str(&theme.node.count_color.to_css());
	ctx.set_font(COUNT_FONT);
	ctx.set_text_align("center");
	let _ = ctx.fill_text(&count.to_string(), x, y + 3.0);
	ctx.set_text_align("start");
}
