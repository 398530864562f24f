// End-to-end session tests over a fake platform.
//
// The surface stands in for the preview runtime: it pulls the user script out
// of the composed document and "executes" simple console calls and throws,
// reporting them over the feedback channel the way the instrumentation does.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use playpen_core::{
    ComposedDocument, ConsoleStatus, ConsoleUpdate, FeedbackEvent, FeedbackKind, FeedbackSender,
    HostView, Key, KeyCombo, KeyValueStore, KeydownResult, ManualScheduler, MemoryStore, Modifiers,
    PersistedProjectState, Platform, PlatformError, PlaygroundConfig, PlaygroundSession,
    PreviewSurface, SourceKind, Sources, Theme,
};

#[derive(Default)]
struct SurfaceState {
    sender: RefCell<Option<FeedbackSender>>,
    loaded: RefCell<Vec<String>>,
    fail: Cell<bool>,
}

#[derive(Clone, Default)]
struct ScriptedSurface(Rc<SurfaceState>);

impl ScriptedSurface {
    fn connect(&self, sender: FeedbackSender) {
        *self.0.sender.borrow_mut() = Some(sender);
    }

    fn loads(&self) -> usize {
        self.0.loaded.borrow().len()
    }

    fn last_document(&self) -> String {
        self.0.loaded.borrow().last().cloned().unwrap_or_default()
    }

    fn emit(&self, event: FeedbackEvent) {
        if let Some(sender) = self.0.sender.borrow().as_ref() {
            sender.send(event);
        }
    }

    fn execute(&self, script: &str) {
        for statement in script.split(['\n', ';']).map(str::trim) {
            if let Some(msg) = call_arg(statement, "throw new Error(") {
                self.emit(FeedbackEvent::error(format!("JavaScript error: {msg}")));
                return;
            }
            let calls = [
                ("console.log(", FeedbackKind::Log),
                ("console.warn(", FeedbackKind::Warning),
                ("console.error(", FeedbackKind::Error),
            ];
            for (prefix, kind) in calls {
                if let Some(msg) = call_arg(statement, prefix) {
                    self.emit(FeedbackEvent::new(kind, msg));
                }
            }
        }
    }
}

fn call_arg<'a>(statement: &'a str, prefix: &str) -> Option<&'a str> {
    let inner = statement.strip_prefix(prefix)?.strip_suffix(')')?;
    inner
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
}

fn user_script(document: &str) -> &str {
    let start = document.find("<script>try {\n").map(|i| i + "<script>try {\n".len());
    let end = document.rfind("\n} catch (e)");
    match (start, end) {
        (Some(start), Some(end)) if start <= end => &document[start..end],
        _ => "",
    }
}

impl PreviewSurface for ScriptedSurface {
    fn load(&self, document: &ComposedDocument) -> Result<(), PlatformError> {
        if self.0.fail.get() {
            return Err(PlatformError::from("iframe detached"));
        }
        self.0.loaded.borrow_mut().push(document.as_str().to_string());
        self.execute(user_script(document.as_str()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingView {
    sources: RefCell<Vec<(SourceKind, String, usize)>>,
    themes: RefCell<Vec<Theme>>,
    updates: RefCell<Vec<ConsoleUpdate>>,
    cleared: RefCell<Vec<ConsoleStatus>>,
    expanded: Cell<Option<bool>>,
    busy: RefCell<Vec<bool>>,
    downloads: RefCell<Vec<(String, String, Vec<u8>)>>,
}

impl RecordingView {
    fn last_source(&self, kind: SourceKind) -> Option<(String, usize)> {
        self.sources
            .borrow()
            .iter()
            .rev()
            .find(|(k, _, _)| *k == kind)
            .map(|(_, text, cursor)| (text.clone(), *cursor))
    }
}

impl HostView for RecordingView {
    fn write_source(&self, kind: SourceKind, text: &str, cursor: usize) {
        self.sources.borrow_mut().push((kind, text.to_string(), cursor));
    }

    fn apply_theme(&self, theme: Theme) {
        self.themes.borrow_mut().push(theme);
    }

    fn console_updated(&self, update: &ConsoleUpdate) {
        self.updates.borrow_mut().push(update.clone());
    }

    fn console_cleared(&self, status: ConsoleStatus) {
        self.cleared.borrow_mut().push(status);
    }

    fn set_console_expanded(&self, expanded: bool) {
        self.expanded.set(Some(expanded));
    }

    fn set_busy(&self, busy: bool) {
        self.busy.borrow_mut().push(busy);
    }

    fn offer_download(&self, name: &str, mime: &str, bytes: &[u8]) -> Result<(), PlatformError> {
        self.downloads
            .borrow_mut()
            .push((name.to_string(), mime.to_string(), bytes.to_vec()));
        Ok(())
    }
}

struct TestPlatform;

impl Platform for TestPlatform {
    type Surface = ScriptedSurface;
    type Scheduler = ManualScheduler;
    type Store = Rc<MemoryStore>;
    type View = RecordingView;
}

type Session = PlaygroundSession<TestPlatform>;

struct Harness {
    session: Rc<RefCell<Session>>,
    surface: ScriptedSurface,
    scheduler: ManualScheduler,
    store: Rc<MemoryStore>,
    view: Rc<RecordingView>,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(Rc::new(MemoryStore::new()))
    }

    fn with_store(store: Rc<MemoryStore>) -> Self {
        let surface = ScriptedSurface::default();
        let scheduler = ManualScheduler::new();
        let view = Rc::new(RecordingView::default());
        let session = Session::new(
            PlaygroundConfig::default(),
            surface.clone(),
            scheduler.clone(),
            store.clone(),
            view.clone(),
        )
        .into_shared();
        surface.connect(session.borrow().feedback_sender());
        Self {
            session,
            surface,
            scheduler,
            store,
            view,
        }
    }

    fn set_sources(&self, markup: &str, style: &str, script: &str) {
        let mut session = self.session.borrow_mut();
        for (kind, text) in [
            (SourceKind::Markup, markup),
            (SourceKind::Style, style),
            (SourceKind::Script, script),
        ] {
            session.apply_edit(kind, text, text.chars().count());
        }
    }

    fn run(&self) {
        self.session.borrow_mut().run();
    }
}

#[test]
fn console_log_scenario_reports_one_log() {
    let h = Harness::new();
    h.set_sources("<h1>Hi</h1>", "h1{color:red}", "console.log('x')");
    h.run();

    let session = h.session.borrow();
    let console = session.console();
    assert_eq!(console.error_count(), 0);
    assert_eq!(console.warning_count(), 0);
    assert_eq!(console.scrollback().len(), 1);
    let entry = console.latest().unwrap();
    assert_eq!(entry.kind(), FeedbackKind::Log);
    assert_eq!(entry.message(), "x");
    assert_eq!(console.status(), ConsoleStatus::Clean);

    let doc = h.surface.last_document();
    assert!(doc.contains("<h1>Hi</h1>"));
    assert!(doc.contains("h1{color:red}</style>"));
}

#[test]
fn throwing_script_reports_one_error_and_keeps_markup() {
    let h = Harness::new();
    h.set_sources("<h1>Hi</h1>", "", "throw new Error('boom')");
    h.run();

    let session = h.session.borrow();
    let console = session.console();
    assert_eq!(console.error_count(), 1);
    assert_eq!(console.scrollback().len(), 1);
    assert!(console.latest().unwrap().message().contains("boom"));
    assert!(h.surface.last_document().contains("<h1>Hi</h1>"));

    let updates = h.view.updates.borrow();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].status, ConsoleStatus::Errors(1));
    assert!(updates[0].toast.as_ref().unwrap().text.contains("boom"));
}

#[test]
fn statements_after_a_throw_do_not_run() {
    let h = Harness::new();
    h.set_sources("", "", "console.log('a');\nthrow new Error('stop');\nconsole.log('b')");
    h.run();

    let session = h.session.borrow();
    let messages: Vec<String> = session
        .console()
        .scrollback()
        .iter()
        .map(|e| e.message().to_string())
        .collect();
    assert_eq!(messages, vec!["a", "JavaScript error: stop"]);
}

#[test]
fn rapid_edits_render_once_with_last_state() {
    let h = Harness::new();
    for i in 0..5 {
        let script = format!("console.log('edit {i}')");
        Session::input(&h.session, SourceKind::Script, &script, script.len());
        h.scheduler.advance(Duration::from_millis(100));
    }
    assert_eq!(h.surface.loads(), 0);
    assert!(h.session.borrow().is_run_pending());

    h.scheduler.advance(Duration::from_millis(500));
    assert_eq!(h.surface.loads(), 1);
    assert!(h.surface.last_document().contains("console.log('edit 4')"));

    let session = h.session.borrow();
    assert_eq!(session.cycles(), 1);
    assert_eq!(session.console().latest().unwrap().message(), "edit 4");
}

#[test]
fn explicit_run_supersedes_pending_debounce() {
    let h = Harness::new();
    Session::input(&h.session, SourceKind::Markup, "<p>now</p>", 10);
    h.run();
    h.scheduler.advance(Duration::from_secs(2));
    assert_eq!(h.surface.loads(), 1);
}

#[test]
fn clear_resets_counters_and_scrollback() {
    let h = Harness::new();
    h.set_sources("", "", "console.error('e1');console.warn('w1');console.log('l')");
    h.run();
    {
        let session = h.session.borrow();
        assert_eq!(session.console().error_count(), 1);
        assert_eq!(session.console().warning_count(), 1);
    }

    h.session.borrow_mut().clear_console();
    let session = h.session.borrow();
    let console = session.console();
    assert_eq!(console.error_count(), 0);
    assert_eq!(console.warning_count(), 0);
    assert!(console.scrollback().is_empty());
    assert_eq!(*h.view.cleared.borrow(), vec![ConsoleStatus::Clean]);
}

#[test]
fn saved_project_restores_in_new_session() {
    let h = Harness::new();
    h.set_sources("<main>kept</main>", "main{color:blue}", "");
    h.session.borrow_mut().toggle_theme();
    h.session.borrow_mut().save().unwrap();

    let restored = Harness::with_store(h.store.clone());
    restored.session.borrow_mut().start();

    let session = restored.session.borrow();
    assert_eq!(
        session.sources(),
        Sources::new("<main>kept</main>", "main{color:blue}", "")
    );
    assert_eq!(session.theme(), Theme::Light);
    assert_eq!(*restored.view.themes.borrow(), vec![Theme::Light]);
    assert_eq!(
        restored.view.last_source(SourceKind::Markup),
        Some(("<main>kept</main>".to_string(), 17))
    );
    assert_eq!(restored.surface.loads(), 1);
}

#[test]
fn malformed_storage_starts_empty() {
    let store = Rc::new(MemoryStore::new());
    store.set("liveCodeEditor", "{\"html\": 12,").unwrap();
    let h = Harness::with_store(store);
    h.session.borrow_mut().start();

    let session = h.session.borrow();
    assert_eq!(session.sources(), Sources::default());
    assert_eq!(session.theme(), Theme::Dark);
    assert_eq!(session.console().warning_count(), 1);
    assert!(
        session
            .console()
            .latest()
            .unwrap()
            .message()
            .starts_with("Saved project unreadable:")
    );
    assert_eq!(h.surface.loads(), 1);
}

#[test]
fn unreadable_storage_warns_for_project_and_theme() {
    let store = Rc::new(MemoryStore::new());
    store.reject_reads(true);
    let h = Harness::with_store(store);
    h.session.borrow_mut().start();

    let session = h.session.borrow();
    let console = session.console();
    let messages: Vec<&str> = console
        .scrollback()
        .iter()
        .map(|entry| entry.message())
        .collect();
    assert_eq!(session.console().warning_count(), 2);
    assert!(messages[0].starts_with("Saved project unreadable:"));
    assert!(messages[1].starts_with("Theme preference unreadable:"));
    assert_eq!(session.theme(), Theme::Dark);
    assert_eq!(h.surface.loads(), 1);
}

#[test]
fn every_completed_cycle_persists() {
    let h = Harness::new();
    h.set_sources("<b>auto</b>", "", "");
    h.run();

    let raw = h.store.raw("liveCodeEditor").unwrap();
    let state: PersistedProjectState = serde_json::from_str(&raw).unwrap();
    assert_eq!(state.html, "<b>auto</b>");
    assert_eq!(state, h.session.borrow().snapshot());
}

#[test]
fn rejected_write_surfaces_as_warning() {
    let h = Harness::new();
    h.store.reject_writes(true);
    h.set_sources("<p>x</p>", "", "");
    h.run();

    let session = h.session.borrow();
    let console = session.console();
    assert_eq!(console.warning_count(), 1);
    assert!(console.latest().unwrap().message().starts_with("Project not saved"));
    assert_eq!(h.surface.loads(), 1);
}

#[test]
fn surface_failure_is_reported_and_next_cycle_recovers() {
    let h = Harness::new();
    h.surface.0.fail.set(true);
    h.run();
    {
        let session = h.session.borrow();
        let console = session.console();
        assert_eq!(console.error_count(), 1);
        assert_eq!(
            console.latest().unwrap().message(),
            "Execution error: iframe detached"
        );
        assert_eq!(session.cycles(), 0);
    }

    h.surface.0.fail.set(false);
    h.set_sources("", "", "console.log('back')");
    h.run();
    let session = h.session.borrow();
    assert_eq!(session.cycles(), 1);
    assert_eq!(session.console().latest().unwrap().message(), "back");
    assert_eq!(*h.view.busy.borrow(), vec![true, false, true, false]);
}

#[test]
fn dropped_session_ignores_pending_run() {
    let h = Harness::new();
    Session::input(&h.session, SourceKind::Markup, "<p>late</p>", 11);
    let Harness {
        session,
        surface,
        scheduler,
        ..
    } = h;
    drop(session);
    assert_eq!(scheduler.advance(Duration::from_secs(1)), 1);
    assert_eq!(surface.loads(), 0);
}

#[test]
fn busy_session_defers_debounced_run() {
    let h = Harness::new();
    Session::input(&h.session, SourceKind::Markup, "<p>held</p>", 11);
    {
        let _held = h.session.borrow();
        assert_eq!(h.scheduler.advance(Duration::from_millis(500)), 1);
    }
    assert_eq!(h.surface.loads(), 0);
    assert!(h.session.borrow().is_run_pending());

    h.scheduler.advance(Duration::from_millis(500));
    assert_eq!(h.surface.loads(), 1);
    assert!(h.surface.last_document().contains("<p>held</p>"));
    assert!(!h.session.borrow().is_run_pending());
}

#[test]
fn tab_indents_and_schedules_a_run() {
    let h = Harness::new();
    h.session
        .borrow_mut()
        .apply_edit(SourceKind::Script, "if (x) {\n}", 9);

    let result = Session::handle_key(&h.session, SourceKind::Script, &KeyCombo::new(Key::Tab));
    assert_eq!(result, KeydownResult::Handled);
    assert_eq!(
        h.view.last_source(SourceKind::Script),
        Some(("if (x) {\n    }".to_string(), 13))
    );
    assert!(h.session.borrow().is_run_pending());

    h.scheduler.advance(Duration::from_millis(500));
    assert_eq!(h.surface.loads(), 1);
}

#[test]
fn tab_replaces_a_reported_selection() {
    let h = Harness::new();
    h.session
        .borrow_mut()
        .apply_edit(SourceKind::Style, "abc xyz", 7);
    h.session.borrow_mut().select(SourceKind::Style, 0, 3);

    let result = Session::handle_key(&h.session, SourceKind::Style, &KeyCombo::new(Key::Tab));
    assert_eq!(result, KeydownResult::Handled);
    assert_eq!(
        h.view.last_source(SourceKind::Style),
        Some(("     xyz".to_string(), 4))
    );
}

#[test]
fn shortcuts_save_run_and_toggle_console() {
    let h = Harness::new();
    h.set_sources("<p>s</p>", "", "");

    let save = KeyCombo::ctrl(Key::character("s"));
    assert_eq!(
        Session::handle_key(&h.session, SourceKind::Markup, &save),
        KeydownResult::Handled
    );
    assert!(h.store.raw("liveCodeEditor").is_some());
    assert_eq!(
        h.session.borrow().console().latest().unwrap().message(),
        "Code saved"
    );

    let run = KeyCombo::ctrl(Key::Enter);
    Session::handle_key(&h.session, SourceKind::Markup, &run);
    assert_eq!(h.surface.loads(), 1);

    Session::handle_key(&h.session, SourceKind::Markup, &KeyCombo::new(Key::F12));
    assert_eq!(h.view.expanded.get(), Some(true));

    let plain = KeyCombo::with_modifiers(Key::character("s"), Modifiers::NONE);
    assert_eq!(
        Session::handle_key(&h.session, SourceKind::Markup, &plain),
        KeydownResult::NotHandled
    );
}

#[test]
fn completion_is_offered_and_applied() {
    let h = Harness::new();
    h.session
        .borrow_mut()
        .apply_edit(SourceKind::Style, "p { backgr", 10);
    assert_eq!(
        h.session.borrow().completion().suggestions(),
        &["background", "background-color"]
    );

    Session::handle_key(&h.session, SourceKind::Style, &KeyCombo::new(Key::ArrowDown));
    let result = Session::handle_key(&h.session, SourceKind::Style, &KeyCombo::new(Key::Enter));
    assert_eq!(result, KeydownResult::Handled);
    assert_eq!(
        h.view.last_source(SourceKind::Style),
        Some(("p { background".to_string(), 14))
    );
    assert!(!h.session.borrow().completion().is_visible());
}

#[test]
fn clicked_suggestion_is_applied_and_rendered() {
    let h = Harness::new();
    h.session
        .borrow_mut()
        .apply_edit(SourceKind::Style, "p { backgr", 10);

    h.session
        .borrow_mut()
        .highlight_completion(SourceKind::Style, 1);
    assert_eq!(
        h.session.borrow().completion().selected(),
        Some("background-color")
    );

    assert!(!Session::accept_completion(&h.session, SourceKind::Style, 7));
    assert!(!h.session.borrow().is_run_pending());

    assert!(Session::accept_completion(&h.session, SourceKind::Style, 1));
    assert_eq!(
        h.view.last_source(SourceKind::Style),
        Some(("p { background-color".to_string(), 20))
    );
    assert!(!h.session.borrow().completion().is_visible());
    assert!(h.session.borrow().is_run_pending());

    h.scheduler.advance(Duration::from_millis(500));
    assert_eq!(h.surface.loads(), 1);
}

#[test]
fn hidden_dropdown_stays_hidden_on_blur() {
    let h = Harness::new();
    h.session
        .borrow_mut()
        .apply_edit(SourceKind::Style, "p { backgr", 10);
    assert!(h.session.borrow().completion().is_visible());

    h.session.borrow_mut().hide_completions(SourceKind::Style);
    assert!(!h.session.borrow().completion().is_visible());
    assert!(!Session::accept_completion(&h.session, SourceKind::Style, 0));
    assert_eq!(h.session.borrow().buffer(SourceKind::Style).text(), "p { backgr");
    assert_eq!(h.view.last_source(SourceKind::Style), None);
}

#[test]
fn minimize_always_collapses_console() {
    let h = Harness::new();
    h.session.borrow_mut().collapse_console();
    assert!(!h.session.borrow().console().is_expanded());
    assert_eq!(h.view.expanded.get(), Some(false));

    assert!(h.session.borrow_mut().toggle_console());
    h.session.borrow_mut().collapse_console();
    h.session.borrow_mut().collapse_console();
    assert!(!h.session.borrow().console().is_expanded());
    assert_eq!(h.view.expanded.get(), Some(false));
}

#[test]
fn empty_download_warns_and_archive_is_offered() {
    let h = Harness::new();
    h.set_sources("<h1>Hi</h1>", "", "console.log('x')");

    let session = h.session.borrow();
    assert!(session.download(SourceKind::Style).is_err());
    assert_eq!(
        session.console().latest().unwrap().message(),
        "The CSS file is empty"
    );
    assert_eq!(session.console().warning_count(), 1);

    session.download(SourceKind::Markup).unwrap();
    session.download_all().unwrap();

    let downloads = h.view.downloads.borrow();
    assert_eq!(downloads.len(), 2);
    assert_eq!(downloads[0].0, "index.html");
    assert_eq!(downloads[0].1, "text/html");
    assert_eq!(downloads[1].0, "project.zip");
    assert!(downloads[1].2.starts_with(b"PK"));
}

#[test]
fn reset_clears_everything() {
    let h = Harness::new();
    h.set_sources("<p>a</p>", "p{}", "console.error('old')");
    h.run();

    h.session.borrow_mut().reset();
    let session = h.session.borrow();
    assert_eq!(session.sources(), Sources::default());
    let console = session.console();
    assert_eq!(console.error_count(), 0);
    assert_eq!(console.scrollback().len(), 1);
    assert_eq!(console.latest().unwrap().message(), "Editors reset");
    assert_eq!(h.surface.loads(), 2);
    assert_eq!(h.view.last_source(SourceKind::Script), Some((String::new(), 0)));
}

#[test]
fn theme_toggle_is_applied_and_stored() {
    let h = Harness::new();
    assert_eq!(h.session.borrow_mut().toggle_theme(), Theme::Light);
    assert_eq!(h.store.raw("editorTheme").as_deref(), Some("light"));
    assert_eq!(h.session.borrow_mut().toggle_theme(), Theme::Dark);
    assert_eq!(*h.view.themes.borrow(), vec![Theme::Light, Theme::Dark]);
}
