//! Client-side enhancements for the document upload pages.
//!
//! Two independent components are installed once the document is parsed:
//! - [`page::PageEnhancer`]: alert auto-dismiss, small-screen notice, smooth
//!   in-page scrolling and a required-field gate on every form.
//! - [`upload::UploadWidget`]: drag-and-drop / click file selection with
//!   type and size validation, a preview, and a simulated progress bar.

use log::{debug, error, LevelFilter};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event};

pub mod config;
pub mod dom;
pub mod fade;
pub mod logging;
pub mod page;
pub mod upload;
pub mod utils;

use config::{Config, ConfigError, CONFIG_ATTRIBUTE};
use dom::{Notifier, WindowAlert};
use page::PageEnhancer;
use upload::UploadWidget;

/// Failures while wiring components to the DOM.
#[derive(Debug)]
pub enum EnhanceError {
    MissingElement(&'static str),
    WrongElementType(&'static str),
    Config(ConfigError),
    Js(String),
}

impl fmt::Display for EnhanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnhanceError::MissingElement(id) => write!(f, "Element {:?} not found", id),
            EnhanceError::WrongElementType(id) => {
                write!(f, "Element {:?} has an unexpected type", id)
            }
            EnhanceError::Config(err) => write!(f, "{}", err),
            EnhanceError::Js(msg) => write!(f, "DOM call failed: {}", msg),
        }
    }
}

impl std::error::Error for EnhanceError {}

impl From<JsValue> for EnhanceError {
    fn from(value: JsValue) -> Self {
        EnhanceError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

impl From<ConfigError> for EnhanceError {
    fn from(err: ConfigError) -> Self {
        EnhanceError::Config(err)
    }
}

impl From<EnhanceError> for JsValue {
    fn from(err: EnhanceError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Components installed on the current page.
pub struct Installed {
    pub page: PageEnhancer,
    pub upload: Option<UploadWidget>,
}

thread_local! {
    /// Keeps listeners and timers alive for the lifetime of the page.
    static INSTALLED: RefCell<Option<Installed>> = const { RefCell::new(None) };
}

/// Read the `data-enhance-config` override from `<body>`, falling back to
/// defaults when it is absent or invalid.
pub fn load_config(doc: &Document) -> Config {
    let raw = doc.body().and_then(|body| body.get_attribute(CONFIG_ATTRIBUTE));
    match raw {
        None => Config::default(),
        Some(raw) => Config::from_json(&raw).unwrap_or_else(|err| {
            error!("ignoring {}: {}", CONFIG_ATTRIBUTE, err);
            Config::default()
        }),
    }
}

/// Install both components on `doc`. A page without the upload markup still
/// gets the page enhancer.
pub fn install(
    doc: &Document,
    viewport_width: Option<f64>,
    config: &Config,
    notifier: Rc<dyn Notifier>,
) -> Result<Installed, EnhanceError> {
    let page = PageEnhancer::install(doc, viewport_width, &config.page, notifier.clone())?;
    let upload = match UploadWidget::install(doc, &config.upload, notifier) {
        Ok(widget) => Some(widget),
        Err(err) => {
            debug!("upload widget not installed: {}", err);
            None
        }
    };
    Ok(Installed { page, upload })
}

fn initialize() -> Result<(), EnhanceError> {
    let doc = gloo_utils::document();
    let config = load_config(&doc);
    log::set_max_level(config.log_level);

    let installed = install(&doc, dom::viewport_width(), &config, Rc::new(WindowAlert))?;
    INSTALLED.with(|slot| *slot.borrow_mut() = Some(installed));
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Set the panic hook to log detailed errors to the console
    console_error_panic_hook::set_once();
    logging::init(LevelFilter::Info);

    let doc = gloo_utils::document();
    if doc.ready_state() == "loading" {
        let on_ready = Closure::once_into_js(move |_event: Event| {
            if let Err(err) = initialize() {
                error!("initialization failed: {}", err);
            }
        });
        doc.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
    } else {
        initialize()?;
    }
    Ok(())
}
