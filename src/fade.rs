//! Fade-then-remove scheduling for transient banners.

use crate::dom::set_style;
use gloo_timers::callback::Timeout;
use log::warn;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::HtmlElement;

/// A pending fade-out of one element.
///
/// After `delay_ms` the element's opacity drops to 0, and `fade_ms` later it
/// is removed from the document. Dropping the handle cancels whichever phase
/// has not fired yet.
pub struct FadeOut {
    _fade: Timeout,
    _removal: Rc<RefCell<Option<Timeout>>>,
}

impl FadeOut {
    pub fn schedule(element: HtmlElement, delay_ms: u32, fade_ms: u32) -> Self {
        let removal = Rc::new(RefCell::new(None));
        let removal_slot = Rc::downgrade(&removal);

        let fade = Timeout::new(delay_ms, move || {
            if let Err(err) = set_style(&element, "opacity", "0") {
                warn!("could not fade element: {}", err);
            }
            // The handle was dropped between phases: nothing left to do.
            let Some(slot) = removal_slot.upgrade() else {
                return;
            };
            let pending = Timeout::new(fade_ms, move || element.remove());
            *slot.borrow_mut() = Some(pending);
        });

        Self {
            _fade: fade,
            _removal: removal,
        }
    }
}
