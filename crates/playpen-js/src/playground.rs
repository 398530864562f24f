//! The mountable playground exposed to JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use playpen_browser::{
    BrowserPlatform, DomView, IframeSurface, KeydownResult, LocalStore, MessageBridge,
    PlaygroundAction, PlaygroundSession, SourceKind, TimeoutScheduler, action_for_key,
    combo_from_keyboard_event, is_mac, utf16_to_char_offset,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::KeyboardEvent;

use crate::types::{JsConsoleCounts, JsPlaygroundConfig, JsProjectSnapshot};

type Session = PlaygroundSession<BrowserPlatform>;

const RESET_PROMPT: &str = "Are you sure you want to reset all editors? This cannot be undone.";

/// A live HTML/CSS/JS playground bound to elements of the current page.
#[wasm_bindgen]
pub struct Playground {
    session: Option<Rc<RefCell<Session>>>,
    bridge: Option<MessageBridge>,
    listeners: Vec<EventListener>,
    on_change: Option<js_sys::Function>,
}

impl Default for Playground {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Playground {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            session: None,
            bridge: None,
            listeners: Vec::new(),
            on_change: None,
        }
    }

    // === Mounting ===

    /// Bind to the page, restore the saved project and render it.
    ///
    /// `config` may be omitted. The onChange callback is called after each
    /// edit made in one of the editors.
    #[wasm_bindgen]
    pub fn mount(
        &mut self,
        config: JsValue,
        on_change: Option<js_sys::Function>,
    ) -> Result<(), JsError> {
        if self.is_mounted() {
            self.unmount();
        }

        let config: JsPlaygroundConfig = if config.is_undefined() || config.is_null() {
            JsPlaygroundConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
        };
        let window = web_sys::window().ok_or_else(|| JsError::new("No window"))?;

        let surface = IframeSurface::by_id(&config.ids.output)
            .map_err(|e| JsError::new(&format!("Preview frame: {}", e)))?;
        let view = Rc::new(
            DomView::new(config.ids).map_err(|e| JsError::new(&format!("Host page: {}", e)))?,
        );
        let store = LocalStore::open().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "local storage unavailable, project will not persist");
            LocalStore::unavailable()
        });

        let session = Session::new(
            config.options,
            surface.clone(),
            TimeoutScheduler::new(),
            store,
            view.clone(),
        )
        .into_shared();

        // Attached before the first render so its messages are not missed.
        let sender = session.borrow().feedback_sender();
        self.bridge = Some(MessageBridge::attach_to_frame(
            &window,
            sender,
            surface.element().clone(),
        ));
        self.on_change = on_change;
        self.session = Some(session.clone());

        self.bind_editors(&session, &view);
        self.bind_completion(&session, &view);
        self.bind_buttons(&session, &view);
        self.bind_console_shortcut(&session, &view);

        let persist_on_exit = session.clone();
        self.listeners
            .push(EventListener::new(&window, "beforeunload", move |_| {
                if let Ok(session) = persist_on_exit.try_borrow() {
                    if let Err(e) = session.persist() {
                        tracing::warn!(error = %e, "project not saved on exit");
                    }
                }
            }));

        session.borrow_mut().start();
        tracing::debug!(listeners = self.listeners.len(), "playground mounted");
        Ok(())
    }

    /// Check if the playground is mounted.
    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.session.is_some()
    }

    /// Remove every listener and drop the session. A pending render is
    /// cancelled with it.
    #[wasm_bindgen]
    pub fn unmount(&mut self) {
        self.listeners.clear();
        self.bridge = None;
        self.session = None;
        self.on_change = None;
    }

    // === Actions ===

    /// Render now, cancelling any pending debounced render.
    #[wasm_bindgen]
    pub fn run(&self) -> Result<(), JsError> {
        self.session()?.borrow_mut().run();
        Ok(())
    }

    /// Save the project and log "Code saved".
    #[wasm_bindgen]
    pub fn save(&self) -> Result<(), JsError> {
        self.session()?
            .borrow_mut()
            .save()
            .map_err(|e| JsError::new(&format!("Save failed: {}", e)))
    }

    /// Empty every editor after asking the user. Returns whether the reset
    /// happened.
    #[wasm_bindgen]
    pub fn reset(&self) -> Result<bool, JsError> {
        let session = self.session()?;
        if !confirm_reset() {
            return Ok(false);
        }
        session.borrow_mut().reset();
        self.notify_change();
        Ok(true)
    }

    /// Switch between dark and light. Returns the new theme name.
    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&self) -> Result<String, JsError> {
        let theme = self.session()?.borrow_mut().toggle_theme();
        Ok(theme.as_str().to_string())
    }

    #[wasm_bindgen(js_name = clearConsole)]
    pub fn clear_console(&self) -> Result<(), JsError> {
        self.session()?.borrow_mut().clear_console();
        Ok(())
    }

    /// Expand or collapse the console. Returns whether it is now expanded.
    #[wasm_bindgen(js_name = toggleConsole)]
    pub fn toggle_console(&self) -> Result<bool, JsError> {
        Ok(self.session()?.borrow_mut().toggle_console())
    }

    /// Download one pane: `"html"`, `"css"` or `"js"`.
    #[wasm_bindgen]
    pub fn download(&self, kind: &str) -> Result<(), JsError> {
        let kind = SourceKind::parse(kind)
            .ok_or_else(|| JsError::new(&format!("Unknown source kind: {}", kind)))?;
        self.session()?
            .borrow()
            .download(kind)
            .map_err(|e| JsError::new(&format!("Download failed: {}", e)))
    }

    /// Download all three panes as `project.zip`.
    #[wasm_bindgen(js_name = downloadAll)]
    pub fn download_all(&self) -> Result<(), JsError> {
        self.session()?
            .borrow()
            .download_all()
            .map_err(|e| JsError::new(&format!("Export failed: {}", e)))
    }

    // === Queries ===

    /// Current project as `{html, css, js, theme}`.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        let snapshot = JsProjectSnapshot::from(self.session()?.borrow().snapshot());
        serde_wasm_bindgen::to_value(&snapshot)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    #[wasm_bindgen(js_name = consoleCounts)]
    pub fn console_counts(&self) -> Result<JsValue, JsError> {
        let session = self.session()?.borrow();
        let console = session.console();
        let counts = JsConsoleCounts {
            error_count: console.error_count(),
            warning_count: console.warning_count(),
            expanded: console.is_expanded(),
        };
        serde_wasm_bindgen::to_value(&counts)
            .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
    }

    /// Render cycles completed since mount.
    #[wasm_bindgen]
    pub fn cycles(&self) -> Result<f64, JsError> {
        Ok(self.session()?.borrow().cycles() as f64)
    }
}

impl Playground {
    fn session(&self) -> Result<&Rc<RefCell<Session>>, JsError> {
        self.session
            .as_ref()
            .ok_or_else(|| JsError::new("Playground is not mounted"))
    }

    fn notify_change(&self) {
        if let Some(callback) = &self.on_change {
            let _ = callback.call0(&JsValue::NULL);
        }
    }

    fn bind_editors(&mut self, session: &Rc<RefCell<Session>>, view: &Rc<DomView>) {
        for kind in SourceKind::ALL {
            let Some(editor) = view.editor(kind) else {
                tracing::warn!(%kind, id = view.ids().editor(kind), "editor element missing");
                continue;
            };

            let input_session = session.clone();
            let input_view = view.clone();
            let input_change = self.on_change.clone();
            self.listeners
                .push(EventListener::new(&editor, "input", move |_| {
                    let Some((text, cursor)) = input_view.read_source(kind) else {
                        return;
                    };
                    Session::input(&input_session, kind, &text, cursor);
                    if let Some(callback) = &input_change {
                        let _ = callback.call0(&JsValue::NULL);
                    }
                }));

            let key_session = session.clone();
            let key_editor = editor.clone();
            let key_change = self.on_change.clone();
            self.listeners.push(EventListener::new_with_options(
                &editor,
                "keydown",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };

                    // The caret may have moved by mouse since the last input.
                    let text = key_editor.value();
                    let start = key_editor.selection_start().ok().flatten().unwrap_or(0);
                    let end = key_editor.selection_end().ok().flatten().unwrap_or(start);
                    key_session.borrow_mut().select(
                        kind,
                        utf16_to_char_offset(&text, start as usize),
                        utf16_to_char_offset(&text, end as usize),
                    );

                    let combo = combo_from_keyboard_event(event);
                    if Session::handle_key(&key_session, kind, &combo) == KeydownResult::Handled {
                        event.prevent_default();
                        if let Some(callback) = &key_change {
                            let _ = callback.call0(&JsValue::NULL);
                        }
                    }
                },
            ));

            let blur_session = session.clone();
            self.listeners
                .push(EventListener::new(&editor, "blur", move |_| {
                    if let Ok(mut session) = blur_session.try_borrow_mut() {
                        session.hide_completions(kind);
                    }
                }));
        }
    }

    /// Pointer interaction with the completion dropdown.
    fn bind_completion(&mut self, session: &Rc<RefCell<Session>>, view: &Rc<DomView>) {
        let Some(dropdown) = view.element(&view.ids().completion) else {
            tracing::debug!("no completion dropdown on the page");
            return;
        };

        // Keeps focus in the editor, whose blur would hide the dropdown
        // before the click lands.
        self.listeners.push(EventListener::new_with_options(
            &dropdown,
            "mousedown",
            EventListenerOptions::enable_prevent_default(),
            |event| event.prevent_default(),
        ));

        let hover_session = session.clone();
        let hover_view = view.clone();
        self.listeners
            .push(EventListener::new(&dropdown, "mouseover", move |event| {
                let Some((kind, index)) = event
                    .target()
                    .and_then(|target| hover_view.completion_item(&target))
                else {
                    return;
                };
                hover_session.borrow_mut().highlight_completion(kind, index);
            }));

        let click_session = session.clone();
        let click_view = view.clone();
        let click_change = self.on_change.clone();
        self.listeners
            .push(EventListener::new(&dropdown, "click", move |event| {
                let Some((kind, index)) = event
                    .target()
                    .and_then(|target| click_view.completion_item(&target))
                else {
                    return;
                };
                if !Session::accept_completion(&click_session, kind, index) {
                    return;
                }
                if let Some(editor) = click_view.editor(kind) {
                    let _ = editor.focus();
                }
                if let Some(callback) = &click_change {
                    let _ = callback.call0(&JsValue::NULL);
                }
            }));
    }

    /// The console toggle shortcut anywhere on the page. Editors route their
    /// own keys through the session.
    fn bind_console_shortcut(&mut self, session: &Rc<RefCell<Session>>, view: &Rc<DomView>) {
        let session = session.clone();
        let key_view = view.clone();
        self.listeners.push(EventListener::new_with_options(
            view.document(),
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if event
                    .target()
                    .is_some_and(|target| key_view.editor_kind(&target).is_some())
                {
                    return;
                }
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let combo = combo_from_keyboard_event(event);
                if action_for_key(&combo, is_mac()) == Some(PlaygroundAction::ToggleConsole) {
                    event.prevent_default();
                    session.borrow_mut().toggle_console();
                }
            },
        ));
    }

    fn bind_buttons(&mut self, session: &Rc<RefCell<Session>>, view: &Rc<DomView>) {
        let ids = view.ids().clone();

        let mut on_click = |id: &str, action: Box<dyn Fn(&Rc<RefCell<Session>>)>| {
            let Some(element) = view.element(id) else {
                return;
            };
            let session = session.clone();
            self.listeners
                .push(EventListener::new(&element, "click", move |_| {
                    action(&session)
                }));
        };

        on_click(&ids.run_button, Box::new(|s| s.borrow_mut().run()));
        on_click(&ids.refresh_button, Box::new(|s| s.borrow_mut().run()));
        on_click(
            &ids.theme_button,
            Box::new(|s| {
                s.borrow_mut().toggle_theme();
            }),
        );
        on_click(
            &ids.clear_console_button,
            Box::new(|s| s.borrow_mut().clear_console()),
        );
        on_click(
            &ids.console_toggle,
            Box::new(|s| {
                s.borrow_mut().toggle_console();
            }),
        );
        on_click(
            &ids.console_minimize,
            Box::new(|s| s.borrow_mut().collapse_console()),
        );

        for kind in SourceKind::ALL {
            on_click(
                ids.download(kind),
                Box::new(move |s| {
                    // Empty panes are already reported on the console.
                    let _ = s.borrow().download(kind);
                }),
            );
        }
        on_click(
            &ids.download_all,
            Box::new(|s| {
                let _ = s.borrow().download_all();
            }),
        );

        let on_change = self.on_change.clone();
        on_click(
            &ids.reset_button,
            Box::new(move |s| {
                if !confirm_reset() {
                    return;
                }
                s.borrow_mut().reset();
                if let Some(callback) = &on_change {
                    let _ = callback.call0(&JsValue::NULL);
                }
            }),
        );
    }
}

fn confirm_reset() -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(RESET_PROMPT).ok())
        .unwrap_or(false)
}
