//! Page-wide enhancements bound once at startup: alert auto-dismiss, the
//! small-screen notice, smooth in-page scrolling and the required-field gate.
//!
//! Only elements present at install time are covered; nothing watches for
//! elements added later.

use crate::config::{
    PageConfig, ALERT_SELECTOR, ANCHOR_SELECTOR, FORM_SELECTOR, MOBILE_NOTICE_CLASS,
    MOBILE_NOTICE_STYLE, MOBILE_NOTICE_TEXT, REQUIRED_FIELDS_MESSAGE, REQUIRED_SELECTOR,
};
use crate::dom::{collect_nodes, control_value, set_style, Listener, Notifier};
use crate::fade::FadeOut;
use crate::utils::{anchor_selector, check_required, wants_mobile_notice};
use crate::EnhanceError;
use log::{debug, info, warn};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlFormElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

/// Everything the page enhancer scheduled or bound. Dropping it cancels
/// pending fades and unbinds the listeners.
pub struct PageEnhancer {
    fades: Vec<FadeOut>,
    mobile_notice: Option<HtmlElement>,
    _listeners: Vec<Listener>,
}

impl PageEnhancer {
    pub fn install(
        doc: &Document,
        viewport_width: Option<f64>,
        config: &PageConfig,
        notifier: Rc<dyn Notifier>,
    ) -> Result<Self, EnhanceError> {
        let mut fades = schedule_alert_dismissal(doc, config)?;

        let mut mobile_notice = None;
        if let Some(width) = viewport_width {
            if wants_mobile_notice(width, config.mobile_breakpoint_px) {
                let notice = insert_mobile_notice(doc)?;
                fades.push(FadeOut::schedule(
                    notice.clone(),
                    config.mobile_notice_ms,
                    config.fade_ms,
                ));
                info!("viewport {}px is below breakpoint, mobile notice shown", width);
                mobile_notice = Some(notice);
            }
        }

        let mut listeners = bind_smooth_scroll(doc)?;
        listeners.extend(bind_required_gate(doc, notifier)?);

        Ok(Self {
            fades,
            mobile_notice,
            _listeners: listeners,
        })
    }

    /// Number of fade-outs scheduled at install, mobile notice included.
    pub fn scheduled_fades(&self) -> usize {
        self.fades.len()
    }

    pub fn mobile_notice(&self) -> Option<&HtmlElement> {
        self.mobile_notice.as_ref()
    }
}

fn schedule_alert_dismissal(doc: &Document, config: &PageConfig) -> Result<Vec<FadeOut>, EnhanceError> {
    let alerts: Vec<HtmlElement> = collect_nodes(&doc.query_selector_all(ALERT_SELECTOR)?);
    debug!("scheduling dismissal of {} alert(s)", alerts.len());
    Ok(alerts
        .into_iter()
        .map(|alert| FadeOut::schedule(alert, config.alert_dismiss_ms, config.fade_ms))
        .collect())
}

fn insert_mobile_notice(doc: &Document) -> Result<HtmlElement, EnhanceError> {
    let body = doc.body().ok_or(EnhanceError::MissingElement("body"))?;
    let notice: HtmlElement = doc
        .create_element("div")?
        .dyn_into()
        .map_err(|_| EnhanceError::WrongElementType("div"))?;
    notice.set_class_name(MOBILE_NOTICE_CLASS);
    notice.set_text_content(Some(MOBILE_NOTICE_TEXT));
    for (property, value) in MOBILE_NOTICE_STYLE {
        set_style(&notice, property, value)?;
    }
    body.insert_before(&notice, body.first_child().as_ref())?;
    Ok(notice)
}

fn bind_smooth_scroll(doc: &Document) -> Result<Vec<Listener>, EnhanceError> {
    let links: Vec<Element> = collect_nodes(&doc.query_selector_all(ANCHOR_SELECTOR)?);
    debug!("binding smooth scroll on {} link(s)", links.len());
    links
        .iter()
        .map(|link| {
            let doc = doc.clone();
            let href_source = link.clone();
            Listener::new(link, "click", move |event: Event| {
                event.prevent_default();
                let href = href_source.get_attribute("href").unwrap_or_default();
                scroll_to_fragment(&doc, &href);
            })
        })
        .collect()
}

/// Smoothly scroll to the element `href` names. Unresolvable targets are a
/// silent no-op for the user.
fn scroll_to_fragment(doc: &Document, href: &str) {
    let Some(selector) = anchor_selector(href) else {
        debug!("link href {:?} names no fragment", href);
        return;
    };
    match doc.query_selector(selector) {
        Ok(Some(target)) => {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);
        }
        Ok(None) => debug!("no element matches {}", selector),
        Err(err) => debug!("{} is not a usable selector: {:?}", selector, err),
    }
}

fn bind_required_gate(doc: &Document, notifier: Rc<dyn Notifier>) -> Result<Vec<Listener>, EnhanceError> {
    let forms: Vec<HtmlFormElement> = collect_nodes(&doc.query_selector_all(FORM_SELECTOR)?);
    debug!("binding required-field check on {} form(s)", forms.len());
    forms
        .iter()
        .map(|form| {
            let form_ref = form.clone();
            let notifier = notifier.clone();
            Listener::new(form, "submit", move |event: Event| {
                match mark_required_fields(&form_ref) {
                    Ok(true) => {}
                    Ok(false) => {
                        event.prevent_default();
                        notifier.notify(REQUIRED_FIELDS_MESSAGE);
                    }
                    Err(err) => warn!("required-field check failed: {}", err),
                }
            })
        })
        .collect()
}

/// Style every required field of `form` and report whether all are filled.
fn mark_required_fields(form: &HtmlFormElement) -> Result<bool, EnhanceError> {
    let fields: Vec<HtmlElement> = collect_nodes(&form.query_selector_all(REQUIRED_SELECTOR)?);
    let check = check_required(fields.iter().map(control_value));
    for (field, mark) in fields.iter().zip(&check.marks) {
        set_style(field, "border-color", mark.border_color())?;
    }
    if !check.is_valid() {
        debug!("{} required field(s) left empty", check.invalid_count());
    }
    Ok(check.is_valid())
}
