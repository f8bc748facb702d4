//! Leptos component wrapping the service sphere canvas.
//!
//! The component creates an HTML canvas element and wires mouse and wheel
//! handlers into a [`ViewportController`]. An animation loop runs via
//! `requestAnimationFrame`, advancing the controller and redrawing each frame.
//! Host events raised by the controller drive the cursor, the legend and the
//! reset button.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::WidgetConfig;
use super::legend::{LegendEntry, legend};
use super::port::{HostEvent, ScreenPoint};
use super::render;
use super::scene::CanvasPort;
use super::theme::Theme;
use super::types::Dataset;
use super::viewport::ViewportController;

/// Longest step fed to the controller, in milliseconds.
const MAX_FRAME_MS: f64 = 100.0;

/// Turns `requestAnimationFrame` timestamps into frame deltas.
#[derive(Clone, Copy, Debug, Default)]
struct FrameClock {
	last: Option<f64>,
}

impl FrameClock {
	/// Milliseconds since the previous frame, clamped to `[0, MAX_FRAME_MS]`.
	/// The first frame advances nothing.
	fn advance(&mut self, now: f64) -> f64 {
		let dt = self.last.map_or(0.0, |last| (now - last).clamp(0.0, MAX_FRAME_MS));
		self.last = Some(now);
		dt
	}
}

/// Bundles the controller with the theme it is drawn in.
struct WidgetContext {
	viewport: ViewportController<CanvasPort>,
	theme: Theme,
}

/// Reactive state the view reads.
#[derive(Clone, Copy)]
struct HostSignals {
	expanded: RwSignal<Option<String>>,
	cursor: RwSignal<&'static str>,
}

impl HostSignals {
	fn apply(self, events: Vec<HostEvent>) {
		for event in events {
			match event {
				HostEvent::Hover(Some(_)) => self.cursor.set("pointer"),
				HostEvent::Hover(None) => self.cursor.set("grab"),
				HostEvent::Expand { service_id, .. } => self.expanded.set(Some(service_id)),
				HostEvent::Reset => self.expanded.set(None),
				HostEvent::Rejected(err) => warn!("service-sphere: {err}"),
			}
		}
	}
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	let w = window.inner_width().ok()?.as_f64()?;
	let h = window.inner_height().ok()?.as_f64()?;
	Some((w, h))
}

/// Pointer position relative to the canvas' top-left corner.
fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<ScreenPoint> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(ScreenPoint::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders the interactive service sphere on a canvas element.
///
/// Pass services via the reactive `data` signal. The component sizes itself
/// to its parent container by default; set `fullscreen = true` to fill the
/// viewport and resize automatically with the window. Explicit `width`/`height`
/// override automatic sizing, otherwise the config's viewport size is the
/// fallback.
#[component]
pub fn ServiceGraphCanvas(
	#[prop(into)] data: Signal<Dataset>,
	#[prop(optional)] config: WidgetConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<WidgetContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	let signals = HostSignals {
		expanded: RwSignal::new(None),
		cursor: RwSignal::new("grab"),
	};
	let legend_entries: RwSignal<Vec<LegendEntry>> = RwSignal::new(Vec::new());
	let load_error: RwSignal<Option<String>> = RwSignal::new(None);
	// Legend clicks are applied by the animation loop, which owns the context.
	let legend_pick: RwSignal<Option<String>> = RwSignal::new(None);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((config.viewport_width, config.viewport_height))
		} else {
			let parent = canvas.parent_element();
			(
				width
					.or_else(|| parent.as_ref().map(|p| p.client_width() as f64))
					.filter(|w| *w > 0.0)
					.unwrap_or(config.viewport_width),
				height
					.or_else(|| parent.as_ref().map(|p| p.client_height() as f64))
					.filter(|h| *h > 0.0)
					.unwrap_or(config.viewport_height),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				error!("service-sphere: canvas has no 2d context");
				return;
			}
		};

		let port = CanvasPort::new(w, h, config.camera_distance);
		let viewport = match ViewportController::from_dataset(&data.get(), config.clone(), port) {
			Ok(viewport) => viewport,
			Err(err) => {
				error!("service-sphere: {err}");
				load_error.set(Some(err.to_string()));
				*context_init.borrow_mut() = None;
				return;
			}
		};
		let theme = Theme::default();
		legend_entries.set(legend(viewport.graph(), &theme));
		load_error.set(None);
		signals.expanded.set(None);
		*context_init.borrow_mut() = Some(WidgetContext { viewport, theme });

		if fullscreen && resize_cb_init.borrow().is_none() {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.viewport.port_mut().resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		// Data changes swap the context; the running loop picks it up.
		if animate_init.borrow().is_some() {
			return;
		}
		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		let mut clock = FrameClock::default();
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let dt = clock.advance(now);
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				if let Some(id) = legend_pick.get_untracked() {
					legend_pick.set(None);
					if let Err(err) = c.viewport.select_service(&id) {
						warn!("service-sphere: {err}");
					}
				}
				c.viewport.tick(dt);
				signals.apply(c.viewport.take_events());
				render::render(
					&ctx,
					c.viewport.port(),
					c.viewport.graph(),
					c.viewport.selection().expanded_node_id(),
					&c.theme,
				);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(point) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.viewport.pointer_down(point);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(point) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.viewport.pointer_move(point);
			if c.viewport.is_dragging() {
				signals.cursor.set("grabbing");
			}
			signals.apply(c.viewport.take_events());
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.viewport.pointer_up();
			let cursor = if c.viewport.hovered().is_some() { "pointer" } else { "grab" };
			signals.cursor.set(cursor);
		}
	};

	let context_click = context.clone();
	let on_click = move |ev: MouseEvent| {
		let Some(point) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_click.borrow_mut() {
			c.viewport.pointer_click(point);
			signals.apply(c.viewport.take_events());
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.viewport.pointer_leave();
			signals.apply(c.viewport.take_events());
		}
		signals.cursor.set("grab");
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.viewport.wheel(ev.delta_y());
		}
	};

	let context_reset = context.clone();
	let on_reset = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_reset.borrow_mut() {
			c.viewport.reset();
			signals.apply(c.viewport.take_events());
		}
	};

	let context_zoom_in = context.clone();
	let on_zoom_in = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_zoom_in.borrow_mut() {
			c.viewport.zoom_in();
		}
	};

	let context_zoom_out = context.clone();
	let on_zoom_out = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_zoom_out.borrow_mut() {
			c.viewport.zoom_out();
		}
	};

	view! {
		<div class="service-sphere">
			<canvas
				node_ref=canvas_ref
				class="service-sphere-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:click=on_click
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style=move || format!("display: block; cursor: {};", signals.cursor.get())
			/>
			<ul class="service-sphere-legend">
				<For
					each=move || legend_entries.get()
					key=|entry| entry.id.clone()
					children=move |entry| {
						let id = entry.id.clone();
						view! {
							<li on:click=move |_| legend_pick.set(Some(id.clone()))>
								<span
									class="swatch"
									style=format!("background: {};", entry.color)
								></span>
								{entry.name}
							</li>
						}
					}
				/>
			</ul>
			<div class="service-sphere-controls">
				<button class="zoom-in" on:click=on_zoom_in>"+"</button>
				<button class="zoom-out" on:click=on_zoom_out>"−"</button>
				<button
					class="reset"
					on:click=on_reset
					style=move || if signals.expanded.get().is_some() { "" } else { "display: none;" }
				>
					"Reset"
				</button>
			</div>
			<Show when=move || load_error.get().is_some()>
				<div class="service-sphere-error">
					{move || load_error.get().unwrap_or_default()}
				</div>
			</Show>
		</div>
	}
}
