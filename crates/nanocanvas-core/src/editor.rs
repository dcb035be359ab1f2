//! Editor facade: owns the scene, viewport, tool machine and UI state.

use crate::camera::Camera;
use crate::config::EditorConfig;
use crate::events::{EditorEvent, EventBus, SubscriptionId};
use crate::generation::{
    GenerationBackend, GenerationContext, GenerationError, ImageResult, ModelId, assemble,
    integrate_image, integrate_video, now_millis,
};
use crate::input::{EditorKey, PointerEvent};
use crate::project::{Gallery, GalleryItem, ProjectRecord};
use crate::render_loop::RenderLoop;
use crate::scene::{ExportRegion, Scene, SceneAdapter, SceneError, SceneResult, Selection};
use crate::selection::{PropertyChange, SelectedProperties, apply_property_change};
use crate::shapes::{Image, ObjectId, Shape};
use crate::tools::{ToolContext, ToolEffect, ToolKind, ToolMachine, object_moving};
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Size, Vec2};
use std::cell::RefCell;

/// Raster multiplier for "flatten selection".
const FLATTEN_MULTIPLIER: f64 = 2.0;
/// Raster multiplier for "download selection".
const DOWNLOAD_MULTIPLIER: f64 = 4.0;
/// Raster multiplier for project thumbnails.
const THUMBNAIL_MULTIPLIER: f64 = 0.25;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextMenuState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub has_selection: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptPopupState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub prompt: String,
}

/// UI-facing editor state. Only the editor writes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub tool: ToolKind,
    pub properties: SelectedProperties,
    /// A generation call is in flight.
    pub generating: bool,
    pub context_menu: ContextMenuState,
    pub prompt_popup: PromptPopupState,
}

/// One-click generation actions on the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Merge the selected objects into one image.
    Compose,
    /// Cut the subject out of its background.
    Matting,
}

impl Preset {
    pub fn prompt(self) -> &'static str {
        match self {
            Preset::Compose => "Seamlessly merge these into one cohesive image.",
            Preset::Matting => "Remove the background.",
        }
    }

    pub fn model(self) -> ModelId {
        ModelId::FlashImage
    }
}

/// What a backend produced.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutput {
    Image(ImageResult),
    /// Playable video URL.
    Video(String),
}

/// A generation that has been assembled and is waiting on the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingGeneration {
    pub context: GenerationContext,
}

impl PendingGeneration {
    /// Call the backend. Does not touch the editor.
    pub async fn dispatch<B: GenerationBackend + ?Sized>(
        &self,
        backend: &B,
    ) -> Result<GenerationOutput, GenerationError> {
        let request = &self.context.request;
        if request.model.is_video() {
            backend.generate_video(request).await.map(GenerationOutput::Video)
        } else {
            backend.generate_image(request).await.map(GenerationOutput::Image)
        }
    }
}

pub struct Editor<S: SceneAdapter = Scene> {
    /// None once torn down.
    scene: Option<S>,
    pub camera: Camera,
    tools: ToolMachine,
    state: AppState,
    events: EventBus,
    render_loop: RenderLoop,
    gallery: Gallery,
    config: EditorConfig,
}

impl Editor<Scene> {
    /// Editor over an empty in-memory scene with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(Scene::default(), EditorConfig::default())
    }
}

impl<S: SceneAdapter> Editor<S> {
    /// Create an editor and start its render loop.
    pub fn new(scene: S, config: EditorConfig) -> Self {
        let mut render_loop = RenderLoop::new();
        render_loop.start();
        Self {
            scene: Some(scene),
            camera: Camera::new(),
            tools: ToolMachine::new(config.tool_settings()),
            state: AppState::default(),
            events: EventBus::new(),
            render_loop,
            gallery: Gallery::new(config.gallery_cap),
            config,
        }
    }

    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    pub fn scene_mut(&mut self) -> Option<&mut S> {
        self.scene.as_mut()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn tool(&self) -> ToolKind {
        self.state.tool
    }

    pub fn properties(&self) -> &SelectedProperties {
        &self.state.properties
    }

    pub fn is_generating(&self) -> bool {
        self.state.generating
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut Gallery {
        &mut self.gallery
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Switch tools, configuring free drawing and the selection for the new tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if !self.tools.is_idle() {
            self.tools.reset(scene);
        }

        let mut selection_cleared = false;
        match tool {
            ToolKind::Select => scene.set_free_drawing(false),
            ToolKind::Draw => {
                scene.set_free_drawing(true);
                scene.set_brush(self.state.properties.brush());
            }
            _ => {
                scene.set_free_drawing(false);
                selection_cleared = !scene.selection().is_empty();
                scene.clear_selection();
                scene.request_render();
            }
        }

        self.state.tool = tool;
        log::debug!("Tool changed to {}", tool);
        if selection_cleared {
            self.selection_changed();
        }
        self.events.emit(EditorEvent::ToolChanged { tool });
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.tool_step(|machine, ctx| machine.pointer_down(ctx, event));
    }

    pub fn pointer_move(&mut self, position: Point) {
        self.tool_step(|machine, ctx| machine.pointer_move(ctx, position));
    }

    pub fn pointer_up(&mut self, position: Point) {
        self.tool_step(|machine, ctx| machine.pointer_up(ctx, position));
    }

    fn tool_step<F>(&mut self, step: F)
    where
        F: FnOnce(&mut ToolMachine, ToolContext<'_, S>) -> Vec<ToolEffect>,
    {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        let ctx = ToolContext {
            scene,
            camera: &mut self.camera,
            tool: self.state.tool,
            properties: &self.state.properties,
        };
        let effects = step(&mut self.tools, ctx);
        for effect in effects {
            self.apply_effect(effect);
        }
    }

    fn apply_effect(&mut self, effect: ToolEffect) {
        match effect {
            ToolEffect::PopupsClosed => self.close_popups(),
            ToolEffect::SelectionChanged => self.selection_changed(),
            ToolEffect::ContextMenu { x, y, has_selection } => {
                self.state.context_menu = ContextMenuState {
                    visible: true,
                    x,
                    y,
                    has_selection,
                };
                self.events
                    .emit(EditorEvent::ContextMenuRequested { x, y, has_selection });
            }
            ToolEffect::RevertToSelect => self.set_tool(ToolKind::Select),
            ToolEffect::ViewportChanged => {}
        }
    }

    /// Zoom anchored at the pointer.
    pub fn wheel(&mut self, position: Point, delta_y: f64) {
        self.camera.wheel_zoom(position, delta_y);
        if let Some(scene) = self.scene.as_mut() {
            scene.request_render();
        }
    }

    /// Snapping hook for an object being dragged to `proposed`.
    pub fn object_moving(&self, id: ObjectId, proposed: Point) -> Option<Point> {
        let scene = self.scene.as_ref()?;
        object_moving(scene, id, proposed, &self.config.snap())
    }

    /// Returns true when the key was handled.
    pub fn key_down(&mut self, key: EditorKey, text_input_focused: bool) -> bool {
        if key.is_delete() && !text_input_focused {
            self.delete_selection();
            return true;
        }
        if key == EditorKey::Escape {
            self.close_popups();
            return true;
        }
        false
    }

    pub fn resize(&mut self, size: Size) {
        if let Some(scene) = self.scene.as_mut() {
            scene.set_viewport_size(size);
            scene.request_render();
        }
    }

    /// Apply a style-editor change.
    pub fn set_property(&mut self, change: PropertyChange) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        apply_property_change(&mut self.state.properties, &change, scene, self.state.tool)
    }

    /// Re-project the selected object's style and notify listeners.
    pub fn selection_changed(&mut self) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        self.state.properties.sync(scene);
        self.events
            .emit(EditorEvent::SelectionChanged(self.state.properties.clone()));
    }

    pub fn close_popups(&mut self) {
        self.state.context_menu.visible = false;
        self.state.prompt_popup.visible = false;
        self.events.emit(EditorEvent::PopupsClosed);
    }

    /// Show the prompt that produced a generated object. Returns false for
    /// objects without provenance.
    pub fn open_prompt_popup(&mut self, id: ObjectId, x: f64, y: f64) -> bool {
        let Some(prompt) = self
            .scene
            .as_ref()
            .and_then(|s| s.get(id))
            .and_then(Shape::ai_data)
            .map(|data| data.prompt.clone())
        else {
            return false;
        };
        self.state.prompt_popup = PromptPopupState {
            visible: true,
            x,
            y,
            prompt: prompt.clone(),
        };
        self.events
            .emit(EditorEvent::PromptPopupRequested { x, y, prompt });
        true
    }

    /// Remove every selected object. Returns how many were removed.
    pub fn delete_selection(&mut self) -> usize {
        let Some(scene) = self.scene.as_mut() else {
            return 0;
        };
        let ids = scene.selection().ids();
        if ids.is_empty() {
            return 0;
        }
        let removed = ids.into_iter().filter_map(|id| scene.remove(id)).count();
        scene.clear_selection();
        scene.request_render();
        self.state.context_menu.visible = false;
        self.selection_changed();
        removed
    }

    /// Replace the selection with a single raster image of it.
    pub fn flatten_selection(&mut self) -> SceneResult<Option<ObjectId>> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(None);
        };
        let Some(bounds) = scene.selection_bounds() else {
            return Ok(None);
        };
        let bytes = scene.export_png(ExportRegion::Selection, FLATTEN_MULTIPLIER)?;
        let mut image = Image::decode(bounds.origin(), &bytes)
            .map_err(|e| SceneError::Encode(e.to_string()))?;
        image.frame.scale_x = 1.0 / FLATTEN_MULTIPLIER;
        image.frame.scale_y = 1.0 / FLATTEN_MULTIPLIER;

        let originals = scene.selection().ids();
        for id in originals {
            scene.remove(id);
        }
        let id = scene.add(Shape::Image(image));
        scene.set_selection(Selection::Single(id));
        scene.request_render();
        self.state.context_menu.visible = false;
        self.selection_changed();
        Ok(Some(id))
    }

    /// PNG bytes of the selection at high resolution, if anything is selected.
    pub fn download_selection(&self) -> SceneResult<Option<Vec<u8>>> {
        match self.scene.as_ref() {
            Some(scene) if !scene.selection().is_empty() => scene
                .export_png(ExportRegion::Selection, DOWNLOAD_MULTIPLIER)
                .map(Some),
            _ => Ok(None),
        }
    }

    /// Add an uploaded image centered in the viewport and select it.
    pub fn insert_image(&mut self, bytes: &[u8]) -> Result<ObjectId, GenerationError> {
        let scene = self.scene.as_mut().ok_or(GenerationError::SceneUnavailable)?;
        let image = Image::decode(Point::ZERO, bytes)
            .map_err(|e| GenerationError::DecodeFailure(e.to_string()))?;
        let mut shape = Shape::Image(image);
        shape.scale_to_width(self.config.upload_width);

        let center = self.camera.viewport_center_world(scene.viewport_size());
        let half = Vec2::new(shape.scaled_width() / 2.0, shape.scaled_height() / 2.0);
        shape.frame_mut().position = center - half;

        let id = scene.add(shape);
        scene.set_selection(Selection::Single(id));
        scene.request_render();
        self.selection_changed();
        Ok(id)
    }

    /// Assemble a request and mark the editor busy.
    ///
    /// Fails with `Busy` while another generation is in flight.
    pub fn begin_generation(
        &mut self,
        prompt: &str,
        model: ModelId,
    ) -> Result<PendingGeneration, GenerationError> {
        if self.state.generating {
            return Err(GenerationError::Busy);
        }
        let scene = self.scene.as_ref().ok_or(GenerationError::SceneUnavailable)?;
        let context = match assemble(scene, &self.camera, prompt, model, &self.config.assembler())
        {
            Ok(context) => context,
            Err(e) => {
                log::error!("Failed to assemble generation context: {}", e);
                self.events.emit(EditorEvent::GenerationFailed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        self.state.generating = true;
        self.events.emit(EditorEvent::GenerationStarted {
            mode: context.mode,
            model,
        });
        Ok(PendingGeneration { context })
    }

    /// Start a preset action. Requires a selection.
    pub fn begin_preset(&mut self, preset: Preset) -> Result<PendingGeneration, GenerationError> {
        let has_selection = self
            .scene
            .as_ref()
            .is_some_and(|s| !s.selection().is_empty());
        if !has_selection {
            return Err(GenerationError::EmptySelection);
        }
        self.state.context_menu.visible = false;
        self.begin_generation(preset.prompt(), preset.model())
    }

    /// Apply a backend outcome. The busy flag is cleared whatever happens.
    pub fn finish_generation(
        &mut self,
        pending: PendingGeneration,
        outcome: Result<GenerationOutput, GenerationError>,
    ) -> Result<ObjectId, GenerationError> {
        self.state.generating = false;
        let result = self.integrate(&pending.context, outcome);
        match &result {
            Ok(id) => {
                self.selection_changed();
                self.events.emit(EditorEvent::GenerationSucceeded { id: *id });
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                self.events.emit(EditorEvent::GenerationFailed {
                    message: e.to_string(),
                });
            }
        }
        result
    }

    fn integrate(
        &mut self,
        context: &GenerationContext,
        outcome: Result<GenerationOutput, GenerationError>,
    ) -> Result<ObjectId, GenerationError> {
        let output = outcome?;
        let scene = self.scene.as_mut().ok_or(GenerationError::SceneUnavailable)?;
        let timestamp = now_millis();
        let (id, url) = match output {
            GenerationOutput::Image(result) => {
                let id = integrate_image(scene, context, result, timestamp)?;
                let url = match scene.get(id) {
                    Some(Shape::Image(image)) => image
                        .source_url
                        .clone()
                        .unwrap_or_else(|| image.data_url()),
                    _ => String::new(),
                };
                (id, url)
            }
            GenerationOutput::Video(url) => {
                let id = integrate_video(scene, context, url.clone(), timestamp)?;
                (id, url)
            }
        };
        self.gallery.push(GalleryItem::new(
            url,
            context.request.prompt.clone(),
            context.request.model,
            timestamp,
        ));
        Ok(id)
    }

    /// Build a project record from the live scene.
    pub fn snapshot_project(&self, name: &str) -> SceneResult<ProjectRecord> {
        let scene = self.scene.as_ref().ok_or(SceneError::EmptyRegion)?;
        let document = scene.to_json()?;
        let thumbnail = scene
            .export_png(ExportRegion::Viewport(self.camera.transform()), THUMBNAIL_MULTIPLIER)
            .map(|png| STANDARD.encode(png))
            .unwrap_or_else(|e| {
                log::warn!("Thumbnail export failed: {}", e);
                String::new()
            });
        Ok(ProjectRecord::new(name, document, thumbnail, now_millis()))
    }

    /// Replace the scene contents with a saved project.
    pub fn load_project(&mut self, record: &ProjectRecord) -> SceneResult<()> {
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };
        scene.load_json(&record.document)?;
        scene.request_render();
        self.camera.reset();
        self.state.context_menu.visible = false;
        self.state.prompt_popup.visible = false;
        log::info!("Loaded project {} ({})", record.name, record.id);
        self.selection_changed();
        Ok(())
    }

    /// Per-frame callback. Returns whether the host should schedule another frame.
    pub fn on_animation_frame(&mut self) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        if !self.render_loop.tick() {
            return false;
        }
        scene.request_render();
        true
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    /// Stop the render loop and drop the scene. Later calls are no-ops.
    pub fn teardown(&mut self) -> Option<S> {
        self.render_loop.cancel();
        self.scene.take()
    }
}

/// Run one generation end to end without holding the editor across the network call.
pub async fn generate<S, B>(
    editor: &RefCell<Editor<S>>,
    backend: &B,
    prompt: &str,
    model: ModelId,
) -> Result<ObjectId, GenerationError>
where
    S: SceneAdapter,
    B: GenerationBackend + ?Sized,
{
    let pending = editor.borrow_mut().begin_generation(prompt, model)?;
    let outcome = pending.dispatch(backend).await;
    editor.borrow_mut().finish_generation(pending, outcome)
}

/// Like [`generate`], for a preset action on the current selection.
pub async fn run_preset<S, B>(
    editor: &RefCell<Editor<S>>,
    backend: &B,
    preset: Preset,
) -> Result<ObjectId, GenerationError>
where
    S: SceneAdapter,
    B: GenerationBackend + ?Sized,
{
    let pending = editor.borrow_mut().begin_preset(preset)?;
    let outcome = pending.dispatch(backend).await;
    editor.borrow_mut().finish_generation(pending, outcome)
}
