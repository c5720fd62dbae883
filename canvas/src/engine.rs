use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde_json::{Map, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::command::{Command, Request};
use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_CONSOLE_LINES, TIME_KEY};
use crate::doc::DocStore;
use crate::error::SceneError;
use crate::images::{ImageLoads, Settled};
use crate::input::{PointerEvent, PointerKind, PointerState};
use crate::lifecycle::{Lifecycle, OpenDecision, RunState, StopCause};
use crate::object::CanvasObject;
use crate::order::{RenderOrder, ZIndexOrder};
use crate::render::{Surface, WebSurface};
use crate::stats::Statistics;
use crate::translate;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Side effects returned from scene entry points for the host to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Forward a request to the engine.
    Send(Request),
    /// Append a line to the user-visible console.
    Log(String),
    /// Bring the console into view.
    RevealConsole,
    /// Start fetching an image resource.
    LoadImage { id: String, url: String },
    /// Reply to the engine once every outstanding image load has settled.
    AwaitImages,
    /// A time update changed the statistics and the run-time label.
    StatsUpdated,
}

/// Core scene state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Scene` so it can be driven headless by the host and
/// tested without WASM/browser dependencies. Every command, user request
/// and pointer event is applied synchronously; nothing here blocks.
pub struct SceneCore {
    doc: DocStore,
    lifecycle: Lifecycle,
    stats: Statistics,
    pointer: PointerState,
    order: Box<dyn RenderOrder + Send>,
    console: VecDeque<String>,
    width: f64,
    height: f64,
    dirty: bool,
    run_id: u64,
}

impl Default for SceneCore {
    fn default() -> Self {
        Self {
            doc: DocStore::new(),
            lifecycle: Lifecycle::new(),
            stats: Statistics::new(),
            pointer: PointerState::default(),
            order: Box::new(ZIndexOrder),
            console: VecDeque::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            dirty: true,
            run_id: 0,
        }
    }
}

impl SceneCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Engine commands ---

    /// Parse and apply one engine frame. Malformed frames are protocol
    /// violations: logged, then the run is stopped.
    pub fn apply_frame(&mut self, syscall: &str, data: &Value, now_ms: f64) -> Vec<Effect> {
        match Command::parse(syscall, data) {
            Ok(command) => self.apply(command, now_ms),
            Err(e) => {
                let effects = self.violation(&SceneError::MalformedCommand(e.to_string()));
                self.emit(effects)
            }
        }
    }

    /// Apply one typed engine command at scene time `now_ms`.
    pub fn apply(&mut self, command: Command, now_ms: f64) -> Vec<Effect> {
        let effects = match command {
            Command::Started => {
                if self.lifecycle.on_started() {
                    self.stats.reset();
                    self.doc.sort(self.order.as_ref());
                    self.dirty = true;
                }
                Vec::new()
            }
            Command::Halted => {
                let (mut effects, continuation) = self.lifecycle.on_halted();
                if let Some(pathname) = continuation {
                    effects.extend(self.load(&pathname, false));
                }
                effects
            }
            Command::EngineError { message } => self.lifecycle.on_error(&message),
            Command::Warning { message } => vec![Effect::Log(format!("Warning: {message}"))],
            Command::DefineObject { id, descriptor } => self.checked(|core| core.define(id, &descriptor)),
            Command::UpdateObject { id, properties } => self.checked(|core| core.update(id, &properties)),
            Command::AnimateObject { id, duration_ms, properties } => {
                self.checked(|core| core.animate(id, duration_ms, &properties, now_ms))
            }
            Command::LoadImage { id, url } => vec![Effect::LoadImage { id, url }],
            Command::WaitImagesLoaded => vec![Effect::AwaitImages],
            Command::TimeUpdate { snapshot } => self.time_update(&snapshot),
        };
        self.emit(effects)
    }

    fn checked<F>(&mut self, f: F) -> Vec<Effect>
    where
        F: FnOnce(&mut Self) -> Result<(), SceneError>,
    {
        match f(self) {
            Ok(()) => Vec::new(),
            Err(e) => self.violation(&e),
        }
    }

    fn violation(&mut self, err: &SceneError) -> Vec<Effect> {
        let mut effects = vec![Effect::Log(format!("Error: {err}"))];
        effects.extend(self.lifecycle.stop(StopCause::Forced));
        effects
    }

    fn define(&mut self, id: Option<String>, descriptor: &Map<String, Value>) -> Result<(), SceneError> {
        if let Some(id) = &id {
            if self.doc.contains(id) {
                return Err(SceneError::DuplicateIdentifier(id.clone()));
            }
        }
        let obj = CanvasObject::from_descriptor(descriptor).map_err(|reason| SceneError::InvalidDeclaration {
            id: id.clone().unwrap_or_else(|| "anonymous object".to_owned()),
            reason,
        })?;
        self.doc.insert(id.as_deref(), obj)?;
        self.dirty = true;
        Ok(())
    }

    fn update(&mut self, id: String, properties: &Map<String, Value>) -> Result<(), SceneError> {
        let Some(obj) = self.doc.get_mut(&id) else {
            return Err(SceneError::UnknownUpdateTarget(id));
        };
        obj.apply_properties(properties)
            .map_err(|e| SceneError::InvalidProperty { id, property: e.0 })?;
        self.doc.sort(self.order.as_ref());
        self.dirty = true;
        Ok(())
    }

    fn animate(
        &mut self,
        id: String,
        duration_ms: f64,
        properties: &Map<String, Value>,
        now_ms: f64,
    ) -> Result<(), SceneError> {
        let Some(obj) = self.doc.get_mut(&id) else {
            return Err(SceneError::UnknownAnimateTarget(id));
        };
        obj.add_animations(duration_ms, properties, now_ms)
            .map_err(|e| SceneError::InvalidProperty { id, property: e.0 })?;
        self.dirty = true;
        Ok(())
    }

    fn time_update(&mut self, snapshot: &Map<String, Value>) -> Vec<Effect> {
        self.stats.apply_update(snapshot);
        let time = match snapshot.get(TIME_KEY) {
            None | Some(Value::Null) => return vec![Effect::StatsUpdated],
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.as_f64().map_or_else(|| n.to_string(), translate::format_number),
            Some(other) => other.to_string(),
        };
        self.lifecycle.set_time(time.clone());
        vec![Effect::Log(format!("Time {time}")), Effect::StatsUpdated]
    }

    // --- User requests ---

    /// Open a program. While a run is live this stops it first and opens
    /// once the engine reports `halted`.
    pub fn open(&mut self, pathname: &str) -> Vec<Effect> {
        let effects = match self.lifecycle.request_open(pathname) {
            OpenDecision::Proceed => self.load(pathname, false),
            OpenDecision::StopFirst => self.lifecycle.stop(StopCause::User),
            OpenDecision::Rejected => Vec::new(),
        };
        self.emit(effects)
    }

    /// Reload the last opened program, if no run is active.
    pub fn restart(&mut self) -> Vec<Effect> {
        let Some(pathname) = self.lifecycle.restart_target() else {
            return Vec::new();
        };
        let effects = self.load(&pathname, true);
        self.emit(effects)
    }

    pub fn pause(&mut self) -> Vec<Effect> {
        let effects = self.lifecycle.pause();
        self.emit(effects)
    }

    pub fn resume(&mut self) -> Vec<Effect> {
        let effects = self.lifecycle.resume();
        self.emit(effects)
    }

    pub fn stop(&mut self) -> Vec<Effect> {
        let effects = self.lifecycle.stop(StopCause::User);
        self.emit(effects)
    }

    /// Forward typed console input to the engine verbatim, whatever the
    /// run state.
    pub fn console_input(&mut self, input: &str) -> Vec<Effect> {
        let effects = vec![
            Effect::Log(format!("Observing \"{input}\"")),
            Effect::Send(Request::Observe { input: input.to_owned() }),
        ];
        self.emit(effects)
    }

    /// Clear the scene and enter `Loading` in one step.
    fn load(&mut self, pathname: &str, restart: bool) -> Vec<Effect> {
        self.doc.clear();
        self.stats.reset();
        self.dirty = true;
        self.run_id += 1;
        self.lifecycle.begin_load(pathname, restart)
    }

    // --- Pointer input ---

    /// Track the pointer and, while running, translate the event into one
    /// observation batch for the engine.
    pub fn on_pointer(&mut self, event: PointerEvent) -> Vec<Effect> {
        let button_down = self.pointer.button_down;
        let delta = self.pointer.observe(&event);
        if !self.lifecycle.accepts_observations() {
            return Vec::new();
        }

        let literals = translate::translate(&event, delta, button_down, &mut self.doc);
        if event.kind == PointerKind::Release || (event.kind == PointerKind::Move && button_down) {
            self.dirty = true;
        }
        match translate::join_batch(&literals) {
            Some(input) => vec![Effect::Send(Request::Observe { input })],
            None => Vec::new(),
        }
    }

    // --- Image loading ---

    /// Every image requested before the barrier loaded.
    pub fn images_loaded(&mut self) -> Vec<Effect> {
        if !matches!(self.lifecycle.state(), RunState::Loading | RunState::Running | RunState::Paused) {
            return Vec::new();
        }
        vec![Effect::Send(Request::ImagesLoaded)]
    }

    /// An image failed to load: drop every object and stop the run.
    pub fn image_failed(&mut self, id: &str, url: &str) -> Vec<Effect> {
        self.doc.clear();
        self.dirty = true;
        let err = SceneError::ImageLoad { id: id.to_owned(), url: url.to_owned() };
        let mut effects = self.lifecycle.stop(StopCause::Forced);
        effects.push(Effect::Log(format!("Error: {err}")));
        self.emit(effects)
    }

    // --- Render ---

    /// Clear the surface, advance animations to `now_ms` and paint every
    /// object in draw order.
    ///
    /// # Errors
    ///
    /// Propagates the first surface failure.
    pub fn render<S: Surface>(&mut self, surface: &mut S, now_ms: f64) -> Result<(), S::Error> {
        surface.clear(self.width, self.height)?;
        self.doc.draw(surface, now_ms)?;
        self.dirty = false;
        Ok(())
    }

    /// Whether the next frame would differ from the last one painted.
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.dirty || self.doc.is_animating()
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.dirty = true;
    }

    /// Swap the render-order policy and re-sort immediately.
    pub fn set_order(&mut self, order: Box<dyn RenderOrder + Send>) {
        self.order = order;
        self.doc.sort(self.order.as_ref());
        self.dirty = true;
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> RunState {
        self.lifecycle.state()
    }

    /// Bumped every time a program starts loading; resources requested
    /// under an older id belong to a finished run.
    #[must_use]
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    #[must_use]
    pub fn time_label(&self) -> &str {
        self.lifecycle.time_label()
    }

    #[must_use]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    #[must_use]
    pub fn doc(&self) -> &DocStore {
        &self.doc
    }

    #[must_use]
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Console lines, oldest first.
    pub fn console(&self) -> impl Iterator<Item = &str> {
        self.console.iter().map(String::as_str)
    }

    /// Record log effects in the console before handing them out.
    fn emit(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        for effect in &effects {
            if let Effect::Log(line) = effect {
                self.console.push_back(line.clone());
                while self.console.len() > MAX_CONSOLE_LINES {
                    self.console.pop_front();
                }
            }
        }
        effects
    }
}

/// One browser image outcome, queued by the element's callbacks.
struct ImageOutcome {
    run: u64,
    id: String,
    url: String,
    ok: bool,
}

/// Callbacks attached to one image element; detached on drop.
struct ImageListeners {
    element: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl Drop for ImageListeners {
    fn drop(&mut self) {
        self.element.set_onload(None);
        self.element.set_onerror(None);
    }
}

/// The browser scene. Wraps `SceneCore` and owns the canvas element plus the
/// image elements loaded for the current run.
///
/// Image callbacks only queue their outcome; the page calls
/// [`Scene::poll_images`] (typically once per animation frame) to apply them.
pub struct Scene {
    canvas: HtmlCanvasElement,
    images: HashMap<String, HtmlImageElement>,
    listeners: HashMap<String, ImageListeners>,
    loads: ImageLoads,
    outcomes: Rc<RefCell<VecDeque<ImageOutcome>>>,
    pub core: SceneCore,
}

impl Scene {
    /// Create a scene bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        let mut core = SceneCore::new();
        core.set_viewport(f64::from(canvas.width()), f64::from(canvas.height()));
        Self {
            canvas,
            images: HashMap::new(),
            listeners: HashMap::new(),
            loads: ImageLoads::new(),
            outcomes: Rc::new(RefCell::new(VecDeque::new())),
            core,
        }
    }

    /// Apply an engine frame, starting any image loads it asks for and
    /// answering a load barrier that has nothing left to wait on.
    ///
    /// # Errors
    ///
    /// Fails if an image element cannot be created.
    pub fn apply_frame(&mut self, syscall: &str, data: &Value, now_ms: f64) -> Result<Vec<Effect>, JsValue> {
        let mut effects = self.core.apply_frame(syscall, data, now_ms);
        self.sync_images();
        let mut replies = Vec::new();
        for effect in &effects {
            match effect {
                Effect::LoadImage { id, url } => self.add_image(id, url)?,
                Effect::AwaitImages if self.loads.await_all() => replies.extend(self.core.images_loaded()),
                _ => {}
            }
        }
        effects.extend(replies);
        Ok(effects)
    }

    /// Create an image element for `id`, hook its load callbacks and point
    /// it at `url`.
    ///
    /// # Errors
    ///
    /// Fails if the element cannot be created.
    pub fn add_image(&mut self, id: &str, url: &str) -> Result<(), JsValue> {
        let image = HtmlImageElement::new()?;
        let onload = self.outcome_callback(id, url, true);
        let onerror = self.outcome_callback(id, url, false);
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        image.set_src(url);

        self.loads.begin(id);
        self.listeners.insert(
            id.to_owned(),
            ImageListeners { element: image.clone(), _onload: onload, _onerror: onerror },
        );
        self.images.insert(id.to_owned(), image);
        Ok(())
    }

    fn outcome_callback(&self, id: &str, url: &str, ok: bool) -> Closure<dyn FnMut()> {
        let queue = Rc::clone(&self.outcomes);
        let run = self.loads.run();
        let (id, url) = (id.to_owned(), url.to_owned());
        Closure::new(move || {
            queue.borrow_mut().push_back(ImageOutcome { run, id: id.clone(), url: url.clone(), ok });
        })
    }

    /// Apply every image outcome reported since the last poll.
    pub fn poll_images(&mut self) -> Vec<Effect> {
        self.sync_images();
        let outcomes: Vec<ImageOutcome> = self.outcomes.borrow_mut().drain(..).collect();
        let mut effects = Vec::new();
        for outcome in outcomes {
            match self.loads.settle(outcome.run, &outcome.id, outcome.ok) {
                Settled::Failed => effects.extend(self.image_failed(&outcome.id, &outcome.url)),
                Settled::BarrierReady => effects.extend(self.core.images_loaded()),
                Settled::Pending | Settled::Stale => {}
            }
        }
        effects
    }

    /// Drop images and pending loads left over from an earlier run.
    fn sync_images(&mut self) {
        let run = self.core.run_id();
        if self.loads.run() == run {
            return;
        }
        self.loads.sync_run(run);
        self.listeners.clear();
        self.images.clear();
        self.outcomes.borrow_mut().clear();
    }

    pub fn remove_image(&mut self, id: &str) {
        self.listeners.remove(id);
        self.images.remove(id);
    }

    /// Report a failed image load to the core.
    pub fn image_failed(&mut self, id: &str, url: &str) -> Vec<Effect> {
        self.remove_image(id);
        self.core.image_failed(id, url)
    }

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Fails if the 2D context is unavailable or a draw call throws.
    pub fn render(&mut self, now_ms: f64) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let mut surface = WebSurface::new(&ctx, &self.images);
        self.core.render(&mut surface, now_ms)
    }
}
