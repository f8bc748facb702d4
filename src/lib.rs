//! service-sphere: Interactive 3D globe of web services and their data tables.
//!
//! This crate provides a WASM-based visualization component that places
//! services and tables on a Fibonacci sphere, and expands a clicked service
//! into a ring of its tables after rotating it to the front.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, error, info};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::service_graph::{
	CanvasPort, ClickOutcome, Dataset, GraphError, HostEvent, Phase, RenderPort, ScreenPoint,
	ServiceGraphCanvas, ServiceRecord, TableRecord, ViewportController, WidgetConfig,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("service-sphere: logging initialized");
}

/// Text content of the script element with the given id, if present.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Parse a dataset from JSON.
/// Accepts `{ "webServices": [...] }` or a bare array of services.
pub fn parse_dataset(json: &str) -> Result<Dataset, GraphError> {
	let data: Dataset = serde_json::from_str(json)?;
	Ok(data)
}

/// Load the dataset from a script element with id="graph-data".
/// A missing element yields an empty dataset.
fn load_dataset() -> Result<Dataset, GraphError> {
	match script_text("graph-data") {
		Some(json) => {
			let data = parse_dataset(&json)?;
			info!("service-sphere: loaded {} services", data.services().len());
			Ok(data)
		}
		None => Ok(Dataset::default()),
	}
}

/// Load widget options from a script element with id="graph-config".
fn load_config() -> Result<WidgetConfig, GraphError> {
	match script_text("graph-config") {
		Some(json) => WidgetConfig::from_json(&json),
		None => Ok(WidgetConfig::default()),
	}
}

/// Main application component.
/// Loads the dataset and options from the DOM and renders the service sphere.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let loaded = load_dataset().and_then(|data| Ok((data, load_config()?)));

	let body = match loaded {
		Ok((data, config)) => {
			let data_signal = Signal::derive(move || data.clone());
			view! {
				<ServiceGraphCanvas data=data_signal config=config fullscreen=true />
				<div class="graph-overlay">
					<h1>"Service Map"</h1>
					<p class="subtitle">
						"Click a service to expand its tables. Drag to orbit. Scroll to zoom."
					</p>
				</div>
			}
			.into_any()
		}
		Err(err) => {
			error!("service-sphere: failed to initialize: {err}");
			view! {
				<div class="service-sphere-error">
					<h1>"Unable to load the service map"</h1>
					<p>{err.to_string()}</p>
				</div>
			}
			.into_any()
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Service Map" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">{body}</div>
	}
}
