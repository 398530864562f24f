//! WASM browser tests for playpen-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::future::TimeoutFuture;
use playpen_browser::{
    DomIds, DomView, IframeSurface, LocalStore, MessageBridge, TimeoutScheduler,
    char_to_utf16_offset, combo_from_keyboard_event, utf16_to_char_offset,
};
use playpen_core::{
    CompletionState, Debouncer, FeedbackChannel, FeedbackEvent, FeedbackKind, HostView, Key,
    KeyCombo, KeyValueStore, Modifiers, PersistedProjectState, PersistenceAdapter,
    PreviewSurface, SourceBuffer, SourceKind, Sources, Theme, TaskScheduler, compose,
};
use wasm_bindgen::JsCast;
use web_sys::HtmlIFrameElement;

fn mount_frame() -> HtmlIFrameElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let frame: HtmlIFrameElement = document.create_element("iframe").unwrap().unchecked_into();
    document.body().unwrap().append_child(&frame).unwrap();
    frame
}

/// Poll until `events` holds at least `count` entries, or give up after ~3s.
async fn wait_for(events: &Rc<RefCell<Vec<FeedbackEvent>>>, count: usize) {
    for _ in 0..60 {
        if events.borrow().len() >= count {
            return;
        }
        TimeoutFuture::new(50).await;
    }
}

fn collect(channel: &FeedbackChannel) -> Rc<RefCell<Vec<FeedbackEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    channel.on_event(move |event| sink.borrow_mut().push(event));
    events
}

// === Preview round trip ===

#[wasm_bindgen_test]
async fn test_preview_log_reaches_channel() {
    let frame = mount_frame();
    let channel = FeedbackChannel::new();
    let events = collect(&channel);
    let window = web_sys::window().unwrap();
    let _bridge = MessageBridge::attach_to_frame(&window, channel.sender(), frame.clone());

    let surface = IframeSurface::new(frame.clone());
    surface
        .load(&compose("<p>x</p>", "", "console.log('hi')"))
        .unwrap();

    wait_for(&events, 1).await;
    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, FeedbackKind::Log);
    assert_eq!(events[0].message, "hi");
    frame.remove();
}

#[wasm_bindgen_test]
async fn test_preview_throw_reports_script_error() {
    let frame = mount_frame();
    let channel = FeedbackChannel::new();
    let events = collect(&channel);
    let window = web_sys::window().unwrap();
    let _bridge = MessageBridge::attach_to_frame(&window, channel.sender(), frame.clone());

    let surface = IframeSurface::new(frame.clone());
    surface
        .load(&compose("", "", "throw new Error('boom')"))
        .unwrap();

    wait_for(&events, 1).await;
    let events = events.borrow();
    assert!(!events.is_empty());
    assert_eq!(events[0].kind, FeedbackKind::Error);
    assert_eq!(events[0].message, "JavaScript error: boom");
    frame.remove();
}

#[wasm_bindgen_test]
fn test_detached_frame_fails_to_load() {
    let document = web_sys::window().unwrap().document().unwrap();
    let frame: HtmlIFrameElement = document.create_element("iframe").unwrap().unchecked_into();
    let surface = IframeSurface::new(frame);
    assert!(surface.load(&compose("", "", "")).is_err());
}

// === Scheduler ===

#[wasm_bindgen_test]
async fn test_debounced_burst_runs_once() {
    let debouncer = Debouncer::new(TimeoutScheduler::new(), Duration::from_millis(30));
    let runs = Rc::new(RefCell::new(0));
    for _ in 0..5 {
        let runs = runs.clone();
        debouncer.trigger(move || *runs.borrow_mut() += 1);
    }
    assert!(debouncer.is_pending());
    TimeoutFuture::new(120).await;
    assert_eq!(*runs.borrow(), 1);
    assert!(!debouncer.is_pending());
}

#[wasm_bindgen_test]
async fn test_cancelled_timeout_never_fires() {
    let scheduler = TimeoutScheduler::new();
    let fired = Rc::new(RefCell::new(false));
    let flag = fired.clone();
    let token = scheduler.schedule(
        Duration::from_millis(20),
        Box::new(move || *flag.borrow_mut() = true),
    );
    scheduler.cancel(token);
    assert_eq!(scheduler.pending(), 0);
    TimeoutFuture::new(80).await;
    assert!(!*fired.borrow());
}

// === localStorage ===

#[wasm_bindgen_test]
fn test_local_store_round_trip() {
    let store = LocalStore::open().unwrap();
    let adapter = PersistenceAdapter::with_keys(store, "playpen-test-project", "playpen-test-theme");
    let state = PersistedProjectState::new(
        Sources::new("<h1>Hi</h1>", "h1{color:red}", "console.log(1)"),
        Theme::Light,
    );
    adapter.save(&state).unwrap();
    assert_eq!(adapter.load(), state);

    adapter.save_theme(Theme::Light).unwrap();
    assert_eq!(adapter.load_theme(), Some(Theme::Light));

    adapter.clear().unwrap();
    assert_eq!(adapter.try_load().unwrap(), None);
}

#[wasm_bindgen_test]
fn test_local_store_malformed_record_loads_default() {
    let store = LocalStore::open().unwrap();
    store.set("playpen-test-malformed", "{not json").unwrap();
    let adapter = PersistenceAdapter::with_keys(
        store.clone(),
        "playpen-test-malformed",
        "playpen-test-malformed-theme",
    );
    assert!(adapter.try_load().is_err());
    assert_eq!(adapter.load(), PersistedProjectState::default());
    store.remove("playpen-test-malformed").unwrap();
}

#[wasm_bindgen_test]
fn test_unavailable_store_fails_soft() {
    let adapter = PersistenceAdapter::new(LocalStore::unavailable());
    assert!(adapter.save(&PersistedProjectState::default()).is_err());
    assert_eq!(adapter.load(), PersistedProjectState::default());
    assert_eq!(adapter.load_theme(), None);
}

// === Event extraction ===

#[wasm_bindgen_test]
fn test_utf16_offsets() {
    let text = "a😀b";
    assert_eq!(utf16_to_char_offset(text, 0), 0);
    assert_eq!(utf16_to_char_offset(text, 1), 1);
    assert_eq!(utf16_to_char_offset(text, 3), 2);
    assert_eq!(utf16_to_char_offset(text, 99), 3);
    assert_eq!(char_to_utf16_offset(text, 2), 3);
    assert_eq!(char_to_utf16_offset(text, 3), 4);
}

#[wasm_bindgen_test]
fn test_combo_from_keyboard_event() {
    let init = web_sys::KeyboardEventInit::new();
    init.set_key("s");
    init.set_ctrl_key(true);
    let event = web_sys::KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    let combo = combo_from_keyboard_event(&event);
    assert_eq!(combo, KeyCombo::with_modifiers(Key::from_dom("s"), Modifiers::CTRL));
}

// === Host view ===

#[wasm_bindgen_test]
fn test_dropdown_items_resolve_to_suggestions() {
    let document = web_sys::window().unwrap().document().unwrap();
    let ids = DomIds::default();
    let dropdown = document.create_element("div").unwrap();
    dropdown.set_id(&ids.completion);
    document.body().unwrap().append_child(&dropdown).unwrap();
    let editor = document.create_element("textarea").unwrap();
    editor.set_id(&ids.css_editor);
    document.body().unwrap().append_child(&editor).unwrap();
    let view = DomView::new(ids).unwrap();

    let buffer = SourceBuffer::with_text(SourceKind::Style, "a{bor");
    let mut state = CompletionState::new(8);
    state.refresh(&buffer);
    view.show_completions(SourceKind::Style, &state);

    let items = dropdown.children();
    assert_eq!(items.length() as usize, state.suggestions().len());
    let second = items.item(1).unwrap();
    assert_eq!(
        view.completion_item(&second),
        Some((SourceKind::Style, 1))
    );
    assert_eq!(view.completion_item(&dropdown), None);

    assert_eq!(view.editor_kind(&editor), Some(SourceKind::Style));
    assert_eq!(view.editor_kind(&dropdown), None);

    dropdown.remove();
    editor.remove();
}
