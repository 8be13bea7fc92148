//! Small wrappers over `web_sys` shared by the page enhancer and the upload
//! widget: element lookup, inline styles, owned event listeners and the
//! blocking-notification seam.

use crate::EnhanceError;
use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, EventTarget, HtmlElement, NodeList};

/// Something that can put a blocking message in front of the user.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Production notifier backed by `window.alert`.
pub struct WindowAlert;

impl Notifier for WindowAlert {
    fn notify(&self, message: &str) {
        if let Err(err) = gloo_utils::window().alert_with_message(message) {
            warn!("window.alert failed: {:?}", err);
        }
    }
}

/// An event listener that stays registered for as long as this value lives.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self, EnhanceError>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Look up a required element by id and check its concrete type.
pub fn element_by_id<T: JsCast>(doc: &Document, id: &'static str) -> Result<T, EnhanceError> {
    doc.get_element_by_id(id)
        .ok_or(EnhanceError::MissingElement(id))?
        .dyn_into::<T>()
        .map_err(|_| EnhanceError::WrongElementType(id))
}

/// Collect the nodes of a `NodeList` that are of type `T`, skipping the rest.
pub fn collect_nodes<T: JsCast>(list: &NodeList) -> Vec<T> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

pub fn set_style(el: &HtmlElement, property: &str, value: &str) -> Result<(), EnhanceError> {
    el.style().set_property(property, value)?;
    Ok(())
}

pub fn show(el: &HtmlElement) -> Result<(), EnhanceError> {
    set_style(el, "display", "block")
}

pub fn hide(el: &HtmlElement) -> Result<(), EnhanceError> {
    set_style(el, "display", "none")
}

/// The `value` property of a form control, or "" for elements without one.
pub fn control_value(el: &HtmlElement) -> String {
    js_sys::Reflect::get(el, &JsValue::from_str("value"))
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

/// Current viewport width in CSS pixels, if the window reports one.
pub fn viewport_width() -> Option<f64> {
    gloo_utils::window().inner_width().ok().and_then(|w| w.as_f64())
}
