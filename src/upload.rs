//! Drag-and-drop upload widget with client-side validation, a file preview
//! and a cosmetic progress bar.
//!
//! The progress shown after submit is simulated: it is driven by timers and
//! has no relation to the bytes the browser's native form post transfers.

use crate::config::{ids, UploadConfig, DRAGOVER_CLASS};
use crate::dom::{element_by_id, hide, set_style, show, Listener, Notifier};
use crate::utils::{format_file_size, width_percent, FileMeta, ProgressSimulator, Selection};
use crate::EnhanceError;
use gloo_timers::callback::{Interval, Timeout};
use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{DataTransfer, Document, DragEvent, Event, File, HtmlElement, HtmlFormElement, HtmlInputElement};

/// DOM handles the widget binds to.
#[derive(Clone)]
pub struct UploadElements {
    pub area: HtmlElement,
    pub input: HtmlInputElement,
    pub form: HtmlFormElement,
    pub progress: HtmlElement,
    pub fill: HtmlElement,
    pub preview: HtmlElement,
    pub file_name: HtmlElement,
    pub file_size: HtmlElement,
    pub remove: HtmlElement,
}

impl UploadElements {
    pub fn bind(doc: &Document) -> Result<Self, EnhanceError> {
        Ok(Self {
            area: element_by_id(doc, ids::UPLOAD_AREA)?,
            input: element_by_id(doc, ids::FILE_INPUT)?,
            form: element_by_id(doc, ids::UPLOAD_FORM)?,
            progress: element_by_id(doc, ids::UPLOAD_PROGRESS)?,
            fill: element_by_id(doc, ids::PROGRESS_FILL)?,
            preview: element_by_id(doc, ids::FILE_PREVIEW)?,
            file_name: element_by_id(doc, ids::FILE_NAME)?,
            file_size: element_by_id(doc, ids::FILE_SIZE)?,
            remove: element_by_id(doc, ids::REMOVE_FILE)?,
        })
    }
}

/// A running progress animation. Dropping it stops both timers.
struct ProgressRun {
    _ticker: Rc<RefCell<Option<Interval>>>,
    _finish: Timeout,
    finished: Rc<Cell<bool>>,
}

impl ProgressRun {
    fn start(fill: &HtmlElement, config: &UploadConfig) -> Result<Self, EnhanceError> {
        let simulator = Rc::new(RefCell::new(ProgressSimulator::from_config(config)?));
        set_style(fill, "width", &width_percent(0.0))?;

        let tick_fill = fill.clone();
        let tick_sim = simulator.clone();
        let interval = Interval::new(config.progress_tick_ms, move || {
            let value = tick_sim.borrow_mut().advance(&mut rand::rng());
            if let Err(err) = set_style(&tick_fill, "width", &width_percent(value)) {
                warn!("progress update failed: {}", err);
            }
        });
        let ticker = Rc::new(RefCell::new(Some(interval)));

        let stop = Rc::downgrade(&ticker);
        let done_fill = fill.clone();
        let finished = Rc::new(Cell::new(false));
        let done_flag = finished.clone();
        let finish = Timeout::new(config.progress_complete_ms, move || {
            if let Some(ticker) = stop.upgrade() {
                ticker.borrow_mut().take();
            }
            done_flag.set(true);
            let value = simulator.borrow_mut().complete();
            if let Err(err) = set_style(&done_fill, "width", &width_percent(value)) {
                warn!("progress completion failed: {}", err);
            }
            debug!("simulated upload progress complete");
        });

        Ok(Self {
            _ticker: ticker,
            _finish: finish,
            finished,
        })
    }

    fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

struct WidgetState {
    els: UploadElements,
    selection: Selection,
    /// The accepted file, kept so a rejected pick can be undone in the input.
    selected_file: Option<File>,
    progress: Option<ProgressRun>,
    config: UploadConfig,
    notifier: Rc<dyn Notifier>,
}

/// The installed widget. Listeners stay bound while this value lives.
pub struct UploadWidget {
    state: Rc<RefCell<WidgetState>>,
    _listeners: Vec<Listener>,
}

impl UploadWidget {
    pub fn install(
        doc: &Document,
        config: &UploadConfig,
        notifier: Rc<dyn Notifier>,
    ) -> Result<Self, EnhanceError> {
        config.validate()?;
        let els = UploadElements::bind(doc)?;
        let state = Rc::new(RefCell::new(WidgetState {
            els: els.clone(),
            selection: Selection::default(),
            selected_file: None,
            progress: None,
            config: config.clone(),
            notifier,
        }));

        let listeners = vec![
            Listener::new(&els.area, "click", {
                let input = els.input.clone();
                move |_event: Event| input.click()
            })?,
            Listener::new(&els.area, "dragover", {
                let area = els.area.clone();
                move |event: Event| {
                    event.prevent_default();
                    if let Err(err) = area.class_list().add_1(DRAGOVER_CLASS) {
                        warn!("could not mark drop target: {:?}", err);
                    }
                }
            })?,
            Listener::new(&els.area, "dragleave", {
                let area = els.area.clone();
                move |event: Event| {
                    event.prevent_default();
                    clear_drop_target(&area);
                }
            })?,
            Listener::new(&els.area, "drop", {
                let state = state.clone();
                move |event: Event| on_drop(&state, event)
            })?,
            Listener::new(&els.input, "change", {
                let state = state.clone();
                move |_event: Event| on_input_change(&state)
            })?,
            Listener::new(&els.remove, "click", {
                let state = state.clone();
                move |_event: Event| {
                    if let Err(err) = remove_selection(&mut state.borrow_mut()) {
                        warn!("could not reset upload widget: {}", err);
                    }
                }
            })?,
            Listener::new(&els.form, "submit", {
                let state = state.clone();
                move |event: Event| on_submit(&state, &event)
            })?,
        ];

        info!("upload widget installed");
        Ok(Self {
            state,
            _listeners: listeners,
        })
    }

    /// The currently accepted file, if any.
    pub fn selected(&self) -> Option<FileMeta> {
        self.state.borrow().selection.current().cloned()
    }

    /// True between a submit and the moment the bar is forced to 100%.
    pub fn progress_running(&self) -> bool {
        self.state
            .borrow()
            .progress
            .as_ref()
            .is_some_and(|run| !run.is_finished())
    }
}

fn file_meta(file: &File) -> FileMeta {
    FileMeta {
        name: file.name(),
        size: file.size() as u64,
        mime: file.type_(),
    }
}

fn on_drop(state: &Rc<RefCell<WidgetState>>, event: Event) {
    event.prevent_default();
    let mut state = state.borrow_mut();
    clear_drop_target(&state.els.area);

    let first = event
        .dyn_ref::<DragEvent>()
        .and_then(|drag| drag.data_transfer())
        .and_then(|transfer| transfer.files())
        .and_then(|files| files.get(0));
    if let Some(file) = first {
        if let Err(err) = process_file(&mut state, file, true) {
            warn!("could not process dropped file: {}", err);
        }
    }
}

fn clear_drop_target(area: &HtmlElement) {
    if let Err(err) = area.class_list().remove_1(DRAGOVER_CLASS) {
        warn!("could not clear drop target: {:?}", err);
    }
}

fn on_input_change(state: &Rc<RefCell<WidgetState>>) {
    let mut state = state.borrow_mut();
    let first = state.els.input.files().and_then(|files| files.get(0));
    if let Some(file) = first {
        if let Err(err) = process_file(&mut state, file, false) {
            warn!("could not process selected file: {}", err);
        }
    }
}

/// Validate `file` and, if accepted, make it the selection and show its preview.
fn process_file(state: &mut WidgetState, file: File, dropped: bool) -> Result<(), EnhanceError> {
    let meta = file_meta(&file);
    let offered = state
        .selection
        .offer(meta, &state.config)
        .map(|accepted| (accepted.name.clone(), format_file_size(accepted.size)));
    let (name, size) = match offered {
        Ok(shown) => shown,
        Err(err) => {
            info!("rejected {}: {:?}", file.name(), err);
            state.notifier.notify(&err.to_string());
            return restore_input(state);
        }
    };
    info!("accepted {} ({})", name, size);

    if dropped {
        attach_to_input(&state.els.input, &file)?;
    }
    state.selected_file = Some(file);
    state.els.file_name.set_text_content(Some(&name));
    state.els.file_size.set_text_content(Some(&size));
    hide(&state.els.area)?;
    show(&state.els.preview)?;
    Ok(())
}

/// Point the input back at the accepted file (or at nothing) so a rejected
/// pick never reaches the native form post.
fn restore_input(state: &WidgetState) -> Result<(), EnhanceError> {
    match &state.selected_file {
        Some(file) => attach_to_input(&state.els.input, file),
        None => {
            state.els.input.set_value("");
            Ok(())
        }
    }
}

/// Put a dropped file into the hidden input so the native form post carries it.
fn attach_to_input(input: &HtmlInputElement, file: &File) -> Result<(), EnhanceError> {
    let transfer = DataTransfer::new()?;
    transfer.items().add_with_file(file)?;
    input.set_files(transfer.files().as_ref());
    Ok(())
}

fn remove_selection(state: &mut WidgetState) -> Result<(), EnhanceError> {
    if let Some(previous) = state.selection.clear() {
        debug!("removed {}", previous.name);
    }
    state.selected_file = None;
    state.els.input.set_value("");
    hide(&state.els.preview)?;
    show(&state.els.area)?;
    Ok(())
}

fn on_submit(state: &Rc<RefCell<WidgetState>>, event: &Event) {
    let mut state = state.borrow_mut();
    if let Err(err) = state.selection.require() {
        event.prevent_default();
        state.notifier.notify(&err.to_string());
        return;
    }
    if let Err(err) = start_progress(&mut state) {
        warn!("could not start progress display: {}", err);
    }
}

/// Swap the preview for the progress bar and restart the animation. The
/// native submission is left to proceed.
fn start_progress(state: &mut WidgetState) -> Result<(), EnhanceError> {
    // Cancel any earlier run before its timers can race the new one.
    state.progress.take();

    hide(&state.els.preview)?;
    show(&state.els.progress)?;
    state.progress = Some(ProgressRun::start(&state.els.fill, &state.config)?);
    info!("upload submitted, showing simulated progress");
    Ok(())
}
