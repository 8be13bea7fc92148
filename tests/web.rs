//! Browser tests for the DOM wiring. Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use gloo_timers::future::TimeoutFuture;
use std::cell::RefCell;
use std::rc::Rc;
use upload_enhance::config::{Config, PageConfig, UploadConfig};
use upload_enhance::dom::Notifier;
use upload_enhance::page::PageEnhancer;
use upload_enhance::upload::UploadWidget;
use upload_enhance::load_config;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{
    DataTransfer, Document, DragEvent, DragEventInit, Event, EventInit, File, FilePropertyBag,
    HtmlElement, HtmlInputElement,
};

wasm_bindgen_test_configure!(run_in_browser);

#[derive(Default)]
struct Recorder {
    messages: RefCell<Vec<String>>,
}

impl Notifier for Recorder {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

fn fixture(body: &str) -> Document {
    let doc = gloo_utils::document()
        .implementation()
        .unwrap()
        .create_html_document_with_title("fixture")
        .unwrap();
    doc.body().unwrap().set_inner_html(body);
    doc
}

fn fast_page() -> PageConfig {
    PageConfig {
        alert_dismiss_ms: 50,
        fade_ms: 100,
        mobile_breakpoint_px: 768.0,
        mobile_notice_ms: 80,
    }
}

fn fast_upload() -> UploadConfig {
    UploadConfig {
        progress_tick_ms: 10,
        progress_complete_ms: 100,
        ..UploadConfig::default()
    }
}

fn by_id<T: JsCast>(doc: &Document, id: &str) -> T {
    doc.get_element_by_id(id).unwrap().dyn_into::<T>().unwrap()
}

fn style_of(doc: &Document, id: &str, property: &str) -> String {
    by_id::<HtmlElement>(doc, id)
        .style()
        .get_property_value(property)
        .unwrap()
}

/// Dispatch a cancelable event and return whether the default action survived.
fn dispatch(target: &web_sys::EventTarget, kind: &str) -> bool {
    let init = EventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    let event = Event::new_with_event_init_dict(kind, &init).unwrap();
    target.dispatch_event(&event).unwrap()
}

fn make_file(name: &str, mime: &str, contents: &str) -> File {
    let parts = js_sys::Array::of1(&JsValue::from_str(contents));
    let options = FilePropertyBag::new();
    options.set_type(mime);
    File::new_with_str_sequence_and_options(&parts, name, &options).unwrap()
}

/// Dispatch a cancelable drag event, optionally carrying one file.
fn drag(target: &web_sys::EventTarget, kind: &str, file: Option<&File>) -> bool {
    let init = DragEventInit::new();
    init.set_bubbles(true);
    init.set_cancelable(true);
    if let Some(file) = file {
        let transfer = DataTransfer::new().unwrap();
        transfer.items().add_with_file(file).unwrap();
        init.set_data_transfer(Some(&transfer));
    }
    let event = DragEvent::new_with_event_init_dict(kind, &init).unwrap();
    target.dispatch_event(&event).unwrap()
}

fn input_file_names(doc: &Document) -> Vec<String> {
    let files = by_id::<HtmlInputElement>(doc, "fileInput").files().unwrap();
    (0..files.length())
        .filter_map(|i| files.get(i))
        .map(|f| f.name())
        .collect()
}

fn choose(doc: &Document, file: &File) {
    let input: HtmlInputElement = by_id(doc, "fileInput");
    let transfer = DataTransfer::new().unwrap();
    transfer.items().add_with_file(file).unwrap();
    input.set_files(transfer.files().as_ref());
    dispatch(&input, "change");
}

const UPLOAD_MARKUP: &str = r#"
    <form id="uploadForm" action="/upload" method="post" enctype="multipart/form-data">
        <div id="uploadArea" style="display: block">Drop a file</div>
        <input type="file" id="fileInput" name="file" style="display: none">
        <div id="filePreview" style="display: none">
            <span id="fileName"></span><span id="fileSize"></span>
            <button type="button" id="removeFile">Remove</button>
        </div>
        <div id="uploadProgress" style="display: none"><div id="progressFill"></div></div>
    </form>
"#;

#[wasm_bindgen_test]
async fn alerts_fade_then_disappear() {
    let doc = fixture(r#"<div class="alert" id="a1">Saved</div><p>text</p><div class="alert" id="a2">Done</div>"#);
    let page = PageEnhancer::install(&doc, Some(1280.0), &fast_page(), Rc::new(Recorder::default())).unwrap();
    assert_eq!(page.scheduled_fades(), 2);

    TimeoutFuture::new(75).await;
    assert_eq!(style_of(&doc, "a1", "opacity"), "0");
    assert_eq!(style_of(&doc, "a2", "opacity"), "0");

    TimeoutFuture::new(150).await;
    assert!(doc.get_element_by_id("a1").is_none());
    assert!(doc.get_element_by_id("a2").is_none());
}

#[wasm_bindgen_test]
async fn dropped_enhancer_cancels_pending_fades() {
    let doc = fixture(r#"<div class="alert" id="a1">Saved</div>"#);
    let page = PageEnhancer::install(&doc, Some(1280.0), &fast_page(), Rc::new(Recorder::default())).unwrap();
    drop(page);

    TimeoutFuture::new(150).await;
    assert!(doc.get_element_by_id("a1").is_some());
    assert_eq!(style_of(&doc, "a1", "opacity"), "");
}

#[wasm_bindgen_test]
async fn narrow_viewport_gets_temporary_notice() {
    let doc = fixture(r#"<main id="content">Hello</main>"#);
    let page = PageEnhancer::install(&doc, Some(375.0), &fast_page(), Rc::new(Recorder::default())).unwrap();

    let notice = page.mobile_notice().cloned().expect("notice inserted");
    let body = doc.body().unwrap();
    let first: HtmlElement = body.first_element_child().unwrap().dyn_into().unwrap();
    assert_eq!(first, notice);
    assert_eq!(notice.class_name(), "alert alert-info");
    assert!(notice.text_content().unwrap().contains("desktop computer"));
    assert_eq!(notice.style().get_property_value("position").unwrap(), "fixed");

    TimeoutFuture::new(300).await;
    assert!(notice.parent_node().is_none());
}

#[wasm_bindgen_test]
fn wide_viewport_gets_no_notice() {
    let doc = fixture(r#"<main id="content">Hello</main>"#);
    let page = PageEnhancer::install(&doc, Some(768.0), &fast_page(), Rc::new(Recorder::default())).unwrap();
    assert!(page.mobile_notice().is_none());
    assert_eq!(page.scheduled_fades(), 0);
    assert_eq!(doc.body().unwrap().first_element_child().unwrap().id(), "content");
}

#[wasm_bindgen_test]
fn anchor_clicks_never_navigate() {
    let doc = fixture(
        r##"<a id="ok" href="#target">Go</a><a id="missing" href="#nowhere">Lost</a>
            <a id="bare" href="#">Top</a><section id="target">Here</section>"##,
    );
    let _page = PageEnhancer::install(&doc, None, &fast_page(), Rc::new(Recorder::default())).unwrap();

    for id in ["ok", "missing", "bare"] {
        let link: HtmlElement = by_id(&doc, id);
        assert!(!dispatch(&link, "click"), "default navigation of #{} not suppressed", id);
    }
}

#[wasm_bindgen_test]
fn required_gate_marks_blank_fields_and_alerts_once() {
    let doc = fixture(
        r#"<form id="f">
            <input id="name" required value="Ada">
            <input id="email" required value="   ">
            <textarea id="notes" required></textarea>
            <input id="optional" value="">
        </form>"#,
    );
    let recorder = Rc::new(Recorder::default());
    let _page = PageEnhancer::install(&doc, None, &fast_page(), recorder.clone()).unwrap();
    let form: HtmlElement = by_id(&doc, "f");

    assert!(!dispatch(&form, "submit"));
    assert_eq!(style_of(&doc, "name", "border-color"), "rgb(209, 213, 219)");
    assert_eq!(style_of(&doc, "email", "border-color"), "rgb(220, 38, 38)");
    assert_eq!(style_of(&doc, "notes", "border-color"), "rgb(220, 38, 38)");
    assert_eq!(style_of(&doc, "optional", "border-color"), "");
    assert_eq!(*recorder.messages.borrow(), vec!["Please fill in all required fields."]);

    by_id::<HtmlInputElement>(&doc, "email").set_value("ada@example.com");
    by_id::<web_sys::HtmlTextAreaElement>(&doc, "notes").set_value("n/a");
    assert!(dispatch(&form, "submit"));
    assert_eq!(style_of(&doc, "email", "border-color"), "rgb(209, 213, 219)");
    assert_eq!(recorder.messages.borrow().len(), 1);
}

#[wasm_bindgen_test]
fn upload_requires_a_selection_before_submit() {
    let doc = fixture(UPLOAD_MARKUP);
    let recorder = Rc::new(Recorder::default());
    let widget = UploadWidget::install(&doc, &fast_upload(), recorder.clone()).unwrap();

    let form: HtmlElement = by_id(&doc, "uploadForm");
    assert!(!dispatch(&form, "submit"));
    assert_eq!(*recorder.messages.borrow(), vec!["Please select a file to upload."]);
    assert!(!widget.progress_running());
    assert_eq!(style_of(&doc, "uploadProgress", "display"), "none");
}

#[wasm_bindgen_test]
fn valid_file_is_previewed_and_removable() {
    let doc = fixture(UPLOAD_MARKUP);
    let recorder = Rc::new(Recorder::default());
    let widget = UploadWidget::install(&doc, &fast_upload(), recorder.clone()).unwrap();

    choose(&doc, &make_file("scan.pdf", "application/pdf", "hello"));
    assert_eq!(widget.selected().map(|f| f.name), Some("scan.pdf".to_string()));
    assert_eq!(by_id::<HtmlElement>(&doc, "fileName").text_content().unwrap(), "scan.pdf");
    assert_eq!(by_id::<HtmlElement>(&doc, "fileSize").text_content().unwrap(), "5.00 Bytes");
    assert_eq!(style_of(&doc, "uploadArea", "display"), "none");
    assert_eq!(style_of(&doc, "filePreview", "display"), "block");
    assert!(recorder.messages.borrow().is_empty());

    by_id::<HtmlElement>(&doc, "removeFile").click();
    assert!(widget.selected().is_none());
    assert_eq!(by_id::<HtmlInputElement>(&doc, "fileInput").value(), "");
    assert_eq!(style_of(&doc, "filePreview", "display"), "none");
    assert_eq!(style_of(&doc, "uploadArea", "display"), "block");

    choose(&doc, &make_file("scan.pdf", "application/pdf", "hello"));
    assert!(widget.selected().is_some());
}

#[wasm_bindgen_test]
fn rejected_files_leave_state_untouched() {
    let doc = fixture(UPLOAD_MARKUP);
    let recorder = Rc::new(Recorder::default());
    let config = UploadConfig {
        max_file_size: 4,
        ..fast_upload()
    };
    let widget = UploadWidget::install(&doc, &config, recorder.clone()).unwrap();

    choose(&doc, &make_file("notes.txt", "text/plain", "hi"));
    choose(&doc, &make_file("photo.png", "image/png", "too big"));

    assert!(widget.selected().is_none());
    let messages = recorder.messages.borrow();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], "Invalid file type. Please use JPG, PNG, or PDF files.");
    assert!(messages[1].starts_with("File size is too large"));
    assert_eq!(style_of(&doc, "filePreview", "display"), "none");
    assert!(input_file_names(&doc).is_empty());
}

#[wasm_bindgen_test]
fn rejected_pick_restores_previous_file_in_input() {
    let doc = fixture(UPLOAD_MARKUP);
    let recorder = Rc::new(Recorder::default());
    let widget = UploadWidget::install(&doc, &fast_upload(), recorder.clone()).unwrap();

    choose(&doc, &make_file("a.png", "image/png", "png"));
    choose(&doc, &make_file("notes.txt", "text/plain", "text"));

    assert_eq!(widget.selected().map(|f| f.name), Some("a.png".to_string()));
    assert_eq!(input_file_names(&doc), vec!["a.png"]);
    assert_eq!(by_id::<HtmlElement>(&doc, "fileName").text_content().unwrap(), "a.png");
    assert_eq!(recorder.messages.borrow().len(), 1);
}

#[wasm_bindgen_test]
fn drag_toggles_drop_target_and_drop_selects_file() {
    let doc = fixture(UPLOAD_MARKUP);
    let recorder = Rc::new(Recorder::default());
    let widget = UploadWidget::install(&doc, &fast_upload(), recorder.clone()).unwrap();
    let area: HtmlElement = by_id(&doc, "uploadArea");

    assert!(!drag(&area, "dragover", None));
    assert!(area.class_list().contains("dragover"));
    assert!(!drag(&area, "dragleave", None));
    assert!(!area.class_list().contains("dragover"));

    drag(&area, "dragover", None);
    let photo = make_file("photo.png", "image/png", "png bytes");
    assert!(!drag(&area, "drop", Some(&photo)));
    assert!(!area.class_list().contains("dragover"));
    assert_eq!(widget.selected().map(|f| f.name), Some("photo.png".to_string()));
    assert_eq!(input_file_names(&doc), vec!["photo.png"]);
    assert_eq!(style_of(&doc, "filePreview", "display"), "block");
    assert!(recorder.messages.borrow().is_empty());
}

#[wasm_bindgen_test]
fn rejected_drop_leaves_input_empty() {
    let doc = fixture(UPLOAD_MARKUP);
    let recorder = Rc::new(Recorder::default());
    let widget = UploadWidget::install(&doc, &fast_upload(), recorder.clone()).unwrap();
    let area: HtmlElement = by_id(&doc, "uploadArea");

    drag(&area, "drop", Some(&make_file("clip.gif", "image/gif", "gif")));
    assert!(widget.selected().is_none());
    assert!(input_file_names(&doc).is_empty());
    assert_eq!(recorder.messages.borrow().len(), 1);
}

#[wasm_bindgen_test]
fn clicking_upload_area_opens_file_input() {
    let doc = fixture(UPLOAD_MARKUP);
    let _widget = UploadWidget::install(&doc, &fast_upload(), Rc::new(Recorder::default())).unwrap();
    let input: HtmlInputElement = by_id(&doc, "fileInput");

    let clicks = Rc::new(RefCell::new(0));
    let counter = clicks.clone();
    let on_click = Closure::wrap(Box::new(move |_event: Event| {
        *counter.borrow_mut() += 1;
    }) as Box<dyn FnMut(Event)>);
    input
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .unwrap();

    by_id::<HtmlElement>(&doc, "uploadArea").click();
    assert_eq!(*clicks.borrow(), 1);
}

#[wasm_bindgen_test]
async fn submit_with_selection_runs_progress_to_completion() {
    let doc = fixture(UPLOAD_MARKUP);
    let recorder = Rc::new(Recorder::default());
    let widget = UploadWidget::install(&doc, &fast_upload(), recorder.clone()).unwrap();
    choose(&doc, &make_file("photo.jpg", "image/jpeg", "jpeg bytes"));

    let form: HtmlElement = by_id(&doc, "uploadForm");
    assert!(dispatch(&form, "submit"), "native submission must not be suppressed");
    assert!(widget.progress_running());
    assert_eq!(style_of(&doc, "filePreview", "display"), "none");
    assert_eq!(style_of(&doc, "uploadProgress", "display"), "block");

    TimeoutFuture::new(50).await;
    let midway = style_of(&doc, "progressFill", "width");
    assert!(midway.ends_with('%'));
    let percent: f64 = midway.trim_end_matches('%').parse().unwrap();
    assert!((0.0..=90.0).contains(&percent));

    TimeoutFuture::new(150).await;
    assert_eq!(style_of(&doc, "progressFill", "width"), "100%");
    assert!(!widget.progress_running());
    assert!(recorder.messages.borrow().is_empty());
}

#[wasm_bindgen_test]
async fn resubmit_replaces_running_progress() {
    let doc = fixture(UPLOAD_MARKUP);
    let config = UploadConfig {
        progress_complete_ms: 150,
        ..fast_upload()
    };
    let widget = UploadWidget::install(&doc, &config, Rc::new(Recorder::default())).unwrap();
    choose(&doc, &make_file("photo.jpg", "image/jpeg", "jpeg bytes"));
    let form: HtmlElement = by_id(&doc, "uploadForm");

    dispatch(&form, "submit");
    TimeoutFuture::new(100).await;
    dispatch(&form, "submit");

    // The first run would have forced 100% at 150 ms.
    TimeoutFuture::new(80).await;
    assert_ne!(style_of(&doc, "progressFill", "width"), "100%");
    assert!(widget.progress_running());

    TimeoutFuture::new(150).await;
    assert_eq!(style_of(&doc, "progressFill", "width"), "100%");
    assert!(!widget.progress_running());
}

#[wasm_bindgen_test]
fn body_attribute_overrides_config() {
    let doc = fixture("");
    let body = doc.body().unwrap();
    assert_eq!(load_config(&doc), Config::default());

    body.set_attribute(
        "data-enhance-config",
        r#"{"page": {"alert_dismiss_ms": 10}, "upload": {"max_file_size": 2048}}"#,
    )
    .unwrap();
    let config = load_config(&doc);
    assert_eq!(config.page.alert_dismiss_ms, 10);
    assert_eq!(config.upload.max_file_size, 2048);
    assert_eq!(config.page.fade_ms, PageConfig::default().fade_ms);
}

#[wasm_bindgen_test]
fn malformed_body_config_falls_back_to_defaults() {
    let doc = fixture("");
    let body = doc.body().unwrap();
    body.set_attribute("data-enhance-config", "{oops").unwrap();
    assert_eq!(load_config(&doc), Config::default());

    body.set_attribute("data-enhance-config", r#"{"upload": {"progress_ceiling": 0}}"#)
        .unwrap();
    assert_eq!(load_config(&doc), Config::default());
}
