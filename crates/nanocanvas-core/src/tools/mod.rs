//! Pointer-driven tool state machine.

use crate::camera::Camera;
use crate::input::PointerEvent;
use crate::scene::{SceneAdapter, Selection};
use crate::selection::SelectedProperties;
use crate::shapes::{Ellipse, ObjectId, Rectangle, Shape, ShapeStyle, Text};
use crate::snap::{SnapConfig, snap_moving_object};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    /// Drag pans the viewport.
    Move,
    Rect,
    Circle,
    Text,
    /// Free drawing with the scene's brush.
    Draw,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Move => "move",
            ToolKind::Rect => "rect",
            ToolKind::Circle => "circle",
            ToolKind::Text => "text",
            ToolKind::Draw => "draw",
        }
    }

    /// Tools that create a shape by dragging.
    pub fn draws_shape(self) -> bool {
        matches!(self, ToolKind::Rect | ToolKind::Circle)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(ToolKind::Select),
            "move" => Ok(ToolKind::Move),
            "rect" => Ok(ToolKind::Rect),
            "circle" => Ok(ToolKind::Circle),
            "text" => Ok(ToolKind::Text),
            "draw" => Ok(ToolKind::Draw),
            other => Err(UnknownTool(other.to_string())),
        }
    }
}

/// A drawn shape too small to keep.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("shape of {width}x{height} is below the minimum size")]
    InvalidGeometry { width: f64, height: f64 },
}

/// Check both measured extents against the minimum.
pub fn validate_extent(width: f64, height: f64, min: f64) -> Result<(), GeometryError> {
    if width < min || height < min {
        Err(GeometryError::InvalidGeometry { width, height })
    } else {
        Ok(())
    }
}

/// Settings that shape how tools create objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub min_shape_extent: f64,
    pub default_text: String,
    pub font_family: String,
    pub snap: SnapConfig,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            min_shape_extent: 5.0,
            default_text: "Type Here".to_string(),
            font_family: "Inter".to_string(),
            snap: SnapConfig::default(),
        }
    }
}

/// Interaction state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    /// Dragging the viewport; `last` is the previous screen position.
    Panning { last: Point },
    /// Sizing a new rectangle or circle from `anchor` (scene coordinates).
    DrawingShape { anchor: Point, id: ObjectId },
    /// The scene's brush is capturing a stroke.
    FreehandStroke,
    /// Moving selected objects. `grab` is pointer minus top-left of the primary object.
    Dragging {
        ids: Vec<ObjectId>,
        grab: Vec2,
        last: Point,
    },
    /// Rubber-band selection from `start` (scene coordinates).
    BoxSelecting { start: Point },
}

/// Side effects the editor turns into state changes and events.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEffect {
    PopupsClosed,
    SelectionChanged,
    ContextMenu { x: f64, y: f64, has_selection: bool },
    /// The active tool should go back to `select`.
    RevertToSelect,
    ViewportChanged,
}

/// Borrowed editor state a tool step works on.
pub struct ToolContext<'a, S: SceneAdapter + ?Sized> {
    pub scene: &'a mut S,
    pub camera: &'a mut Camera,
    pub tool: ToolKind,
    pub properties: &'a SelectedProperties,
}

/// The tool state machine.
#[derive(Debug, Clone, Default)]
pub struct ToolMachine {
    pub state: ToolState,
    pub settings: ToolSettings,
}

impl ToolMachine {
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            state: ToolState::Idle,
            settings,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == ToolState::Idle
    }

    /// Drop any in-progress interaction (used on tool switch).
    pub fn reset<S: SceneAdapter + ?Sized>(&mut self, scene: &mut S) {
        if let ToolState::DrawingShape { id, .. } = self.state {
            scene.remove(id);
        }
        if self.state == ToolState::FreehandStroke {
            scene.finish_stroke();
        }
        scene.set_selection_box_enabled(true);
        self.state = ToolState::Idle;
    }

    pub fn pointer_down<S: SceneAdapter + ?Sized>(
        &mut self,
        ctx: ToolContext<'_, S>,
        event: PointerEvent,
    ) -> Vec<ToolEffect> {
        if event.is_secondary() {
            return self.secondary_click(ctx, event.position);
        }

        let mut effects = vec![ToolEffect::PopupsClosed];

        if event.modifiers.alt || ctx.tool == ToolKind::Move {
            ctx.scene.set_selection_box_enabled(false);
            self.state = ToolState::Panning {
                last: event.position,
            };
            return effects;
        }

        let world = ctx.camera.screen_to_world(event.position);
        match ctx.tool {
            ToolKind::Rect | ToolKind::Circle => {
                let style = ShapeStyle::outline(
                    ctx.properties.outline_color(),
                    ctx.properties.stroke_width,
                );
                let shape = if ctx.tool == ToolKind::Rect {
                    Shape::Rectangle(Rectangle::new(world, 0.0, 0.0).with_style(style))
                } else {
                    Shape::Ellipse(Ellipse::new(world, 0.0).with_style(style))
                };
                let id = ctx.scene.add(shape);
                ctx.scene.set_selection_box_enabled(false);
                self.state = ToolState::DrawingShape { anchor: world, id };
            }
            ToolKind::Text => {
                let mut text = Text::new(world, self.settings.default_text.clone());
                text.font_family = self.settings.font_family.clone();
                text.style.fill = ctx.properties.text_color();
                if ctx.properties.font_size > 0.0 {
                    text.font_size = ctx.properties.font_size;
                }
                let id = ctx.scene.add(Shape::Text(text));
                ctx.scene.set_selection(Selection::Single(id));
                ctx.scene.request_render();
                effects.push(ToolEffect::SelectionChanged);
                effects.push(ToolEffect::RevertToSelect);
            }
            ToolKind::Draw => {
                if ctx.scene.is_free_drawing() {
                    ctx.scene.begin_stroke(world);
                    self.state = ToolState::FreehandStroke;
                }
            }
            ToolKind::Select => effects.extend(self.select_at(ctx, world)),
            ToolKind::Move => {}
        }
        effects
    }

    pub fn pointer_move<S: SceneAdapter + ?Sized>(
        &mut self,
        ctx: ToolContext<'_, S>,
        position: Point,
    ) -> Vec<ToolEffect> {
        match &mut self.state {
            ToolState::Panning { last } => {
                ctx.camera.pan(position - *last);
                *last = position;
                ctx.scene.request_render();
                vec![ToolEffect::ViewportChanged]
            }
            ToolState::DrawingShape { anchor, id } => {
                let world = ctx.camera.screen_to_world(position);
                if let Some(shape) = ctx.scene.get_mut(*id) {
                    resize_drawn_shape(shape, *anchor, world);
                }
                ctx.scene.request_render();
                Vec::new()
            }
            ToolState::FreehandStroke => {
                let world = ctx.camera.screen_to_world(position);
                ctx.scene.extend_stroke(world);
                Vec::new()
            }
            ToolState::Dragging { ids, grab, last } => {
                let world = ctx.camera.screen_to_world(position);
                if let [id] = ids.as_slice() {
                    let proposed = world - *grab;
                    let corrected = object_moving(ctx.scene, *id, proposed, &self.settings.snap);
                    if let (Some(point), Some(shape)) = (corrected, ctx.scene.get_mut(*id)) {
                        shape.frame_mut().position = point;
                    }
                } else {
                    // Group drags translate every member without snapping
                    let delta = world - *last;
                    for id in ids.iter() {
                        if let Some(shape) = ctx.scene.get_mut(*id) {
                            shape.frame_mut().position += delta;
                        }
                    }
                }
                *last = world;
                ctx.scene.request_render();
                Vec::new()
            }
            ToolState::Idle | ToolState::BoxSelecting { .. } => Vec::new(),
        }
    }

    pub fn pointer_up<S: SceneAdapter + ?Sized>(
        &mut self,
        ctx: ToolContext<'_, S>,
        position: Point,
    ) -> Vec<ToolEffect> {
        let state = std::mem::take(&mut self.state);
        match state {
            ToolState::Idle => Vec::new(),
            ToolState::Panning { .. } => {
                ctx.scene.set_selection_box_enabled(true);
                Vec::new()
            }
            ToolState::DrawingShape { id, .. } => {
                ctx.scene.set_selection_box_enabled(true);
                let mut effects = Vec::new();
                let extent = ctx.scene.get(id).map(measured_extent);
                match extent.map(|(w, h)| validate_extent(w, h, self.settings.min_shape_extent)) {
                    Some(Ok(())) => {
                        ctx.scene.set_selection(Selection::Single(id));
                        effects.push(ToolEffect::SelectionChanged);
                    }
                    Some(Err(e)) => {
                        log::debug!("Discarding accidental shape: {}", e);
                        ctx.scene.remove(id);
                    }
                    None => {}
                }
                ctx.scene.request_render();
                effects.push(ToolEffect::RevertToSelect);
                effects
            }
            ToolState::FreehandStroke => {
                if let Some(id) = ctx.scene.finish_stroke() {
                    log::debug!("Committed brush stroke {}", id);
                }
                ctx.scene.request_render();
                Vec::new()
            }
            ToolState::Dragging { .. } => Vec::new(),
            ToolState::BoxSelecting { start } => {
                let end = ctx.camera.screen_to_world(position);
                let rect = Rect::from_points(start, end);
                let ids = if rect.area() > 0.0 {
                    ctx.scene.objects_in_rect(rect)
                } else {
                    Vec::new()
                };
                let before = ctx.scene.selection().clone();
                ctx.scene.set_selection(Selection::from_ids(ids));
                if *ctx.scene.selection() != before {
                    ctx.scene.request_render();
                    vec![ToolEffect::SelectionChanged]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Secondary click never mutates the scene beyond selecting the object under the pointer.
    fn secondary_click<S: SceneAdapter + ?Sized>(
        &mut self,
        ctx: ToolContext<'_, S>,
        position: Point,
    ) -> Vec<ToolEffect> {
        let mut effects = Vec::new();
        let world = ctx.camera.screen_to_world(position);
        if let Some(target) = ctx.scene.object_at(world) {
            if !ctx.scene.selection().contains(target) {
                ctx.scene.set_selection(Selection::Single(target));
                ctx.scene.request_render();
                effects.push(ToolEffect::SelectionChanged);
            }
        }
        effects.push(ToolEffect::ContextMenu {
            x: position.x,
            y: position.y,
            has_selection: !ctx.scene.selection().is_empty(),
        });
        effects
    }

    /// Select tool: pick, start a drag, or start a rubber band.
    fn select_at<S: SceneAdapter + ?Sized>(
        &mut self,
        ctx: ToolContext<'_, S>,
        world: Point,
    ) -> Vec<ToolEffect> {
        let mut effects = Vec::new();
        let before = ctx.scene.selection().clone();
        match ctx.scene.object_at(world) {
            Some(target) => {
                if !before.contains(target) {
                    ctx.scene.set_selection(Selection::Single(target));
                }
                let ids = ctx.scene.selection().ids();
                let draggable = ids
                    .iter()
                    .all(|id| ctx.scene.get(*id).is_some_and(Shape::is_draggable));
                if draggable {
                    let grab = ctx
                        .scene
                        .get(target)
                        .map(|s| world - s.frame().position)
                        .unwrap_or(Vec2::ZERO);
                    self.state = ToolState::Dragging {
                        ids,
                        grab,
                        last: world,
                    };
                }
            }
            None => {
                ctx.scene.clear_selection();
                if ctx.scene.selection_box_enabled() {
                    self.state = ToolState::BoxSelecting { start: world };
                }
            }
        }
        if *ctx.scene.selection() != before {
            ctx.scene.request_render();
            effects.push(ToolEffect::SelectionChanged);
        }
        effects
    }
}

/// Extent used for the minimum-size check: width/height for rectangles, diameter for circles.
fn measured_extent(shape: &Shape) -> (f64, f64) {
    match shape {
        Shape::Rectangle(r) => (r.width, r.height),
        Shape::Ellipse(e) => (e.radius * 2.0, e.radius * 2.0),
        other => (other.scaled_width(), other.scaled_height()),
    }
}

/// Stretch a shape being drawn so it spans anchor to pointer with non-negative extents.
fn resize_drawn_shape(shape: &mut Shape, anchor: Point, pointer: Point) {
    let left = if anchor.x > pointer.x { pointer.x } else { anchor.x };
    let top = if anchor.y > pointer.y { pointer.y } else { anchor.y };
    match shape {
        Shape::Rectangle(rect) => {
            rect.width = (pointer.x - anchor.x).abs();
            rect.height = (pointer.y - anchor.y).abs();
        }
        // Circles follow the horizontal drag only
        Shape::Ellipse(circle) => circle.radius = (pointer.x - anchor.x).abs() / 2.0,
        _ => return,
    }
    shape.frame_mut().position = Point::new(left, top);
}

/// Snapping hook for an object being dragged to `proposed`.
///
/// Returns the corrected top-left, or None when the object is hidden, locked,
/// part of a group selection or unknown.
pub fn object_moving<S: SceneAdapter + ?Sized>(
    scene: &S,
    id: ObjectId,
    proposed: Point,
    config: &SnapConfig,
) -> Option<Point> {
    if scene.selection().is_group() && scene.selection().contains(id) {
        return None;
    }
    let moving = scene.get(id).filter(|s| s.is_draggable())?;
    Some(snap_moving_object(moving, proposed, scene.objects(), config).point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::scene::Scene;
    use crate::shapes::SerializableColor;

    struct Rig {
        scene: Scene,
        camera: Camera,
        props: SelectedProperties,
        machine: ToolMachine,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                scene: Scene::default(),
                camera: Camera::new(),
                props: SelectedProperties::default(),
                machine: ToolMachine::default(),
            }
        }

        fn down(&mut self, tool: ToolKind, event: PointerEvent) -> Vec<ToolEffect> {
            let ctx = ToolContext {
                scene: &mut self.scene,
                camera: &mut self.camera,
                tool,
                properties: &self.props,
            };
            self.machine.pointer_down(ctx, event)
        }

        fn moved(&mut self, tool: ToolKind, p: Point) -> Vec<ToolEffect> {
            let ctx = ToolContext {
                scene: &mut self.scene,
                camera: &mut self.camera,
                tool,
                properties: &self.props,
            };
            self.machine.pointer_move(ctx, p)
        }

        fn up(&mut self, tool: ToolKind, p: Point) -> Vec<ToolEffect> {
            let ctx = ToolContext {
                scene: &mut self.scene,
                camera: &mut self.camera,
                tool,
                properties: &self.props,
            };
            self.machine.pointer_up(ctx, p)
        }
    }

    #[test]
    fn test_tool_names_roundtrip() {
        for tool in [
            ToolKind::Select,
            ToolKind::Move,
            ToolKind::Rect,
            ToolKind::Circle,
            ToolKind::Text,
            ToolKind::Draw,
        ] {
            assert_eq!(tool.as_str().parse::<ToolKind>().unwrap(), tool);
        }
        assert!("lasso".parse::<ToolKind>().is_err());
        assert_eq!(serde_json::to_string(&ToolKind::Circle).unwrap(), "\"circle\"");
    }

    #[test]
    fn test_draw_rect_towards_upper_left() {
        let mut rig = Rig::new();
        rig.down(ToolKind::Rect, PointerEvent::left(Point::new(100.0, 100.0)));
        assert!(!rig.scene.selection_box_enabled());
        rig.moved(ToolKind::Rect, Point::new(80.0, 60.0));
        let effects = rig.up(ToolKind::Rect, Point::new(80.0, 60.0));

        assert!(effects.contains(&ToolEffect::RevertToSelect));
        assert!(effects.contains(&ToolEffect::SelectionChanged));
        assert!(rig.scene.selection_box_enabled());
        let id = rig.scene.selection().single().unwrap();
        match rig.scene.get(id).unwrap() {
            Shape::Rectangle(r) => {
                assert_eq!(r.frame.position, Point::new(80.0, 60.0));
                assert!((r.width - 20.0).abs() < f64::EPSILON);
                assert!((r.height - 40.0).abs() < f64::EPSILON);
            }
            other => panic!("expected rectangle, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_tiny_shape_discarded() {
        let mut rig = Rig::new();
        rig.down(ToolKind::Rect, PointerEvent::left(Point::new(10.0, 10.0)));
        rig.moved(ToolKind::Rect, Point::new(13.0, 12.0));
        let effects = rig.up(ToolKind::Rect, Point::new(13.0, 12.0));
        assert!(rig.scene.is_empty());
        assert_eq!(effects, vec![ToolEffect::RevertToSelect]);
    }

    #[test]
    fn test_thin_shape_discarded_on_either_axis() {
        let mut rig = Rig::new();
        rig.down(ToolKind::Rect, PointerEvent::left(Point::ZERO));
        rig.moved(ToolKind::Rect, Point::new(200.0, 3.0));
        rig.up(ToolKind::Rect, Point::new(200.0, 3.0));
        assert!(rig.scene.is_empty());
    }

    #[test]
    fn test_draw_circle_uses_horizontal_delta() {
        let mut rig = Rig::new();
        rig.props.stroke = "#3b82f6".to_string();
        rig.down(ToolKind::Circle, PointerEvent::left(Point::new(100.0, 100.0)));
        rig.moved(ToolKind::Circle, Point::new(40.0, 130.0));
        rig.up(ToolKind::Circle, Point::new(40.0, 130.0));
        let id = rig.scene.selection().single().unwrap();
        match rig.scene.get(id).unwrap() {
            Shape::Ellipse(c) => {
                assert!((c.radius - 30.0).abs() < f64::EPSILON);
                assert_eq!(c.frame.position, Point::new(40.0, 100.0));
                assert_eq!(c.style.stroke, Some(SerializableColor::rgb(0x3b, 0x82, 0xf6)));
                assert!(c.style.fill.is_none());
            }
            other => panic!("expected circle, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_drawing_maps_through_viewport() {
        let mut rig = Rig::new();
        rig.camera.zoom = 2.0;
        rig.camera.offset = Vec2::new(100.0, 0.0);
        rig.down(ToolKind::Rect, PointerEvent::left(Point::new(100.0, 0.0)));
        rig.moved(ToolKind::Rect, Point::new(300.0, 100.0));
        rig.up(ToolKind::Rect, Point::new(300.0, 100.0));
        let id = rig.scene.selection().single().unwrap();
        let bounds = rig.scene.get(id).unwrap().bounds();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_text_single_click_commit() {
        let mut rig = Rig::new();
        rig.props.font_size = 20.0;
        rig.props.fill = "#ef4444".to_string();
        let effects = rig.down(ToolKind::Text, PointerEvent::left(Point::new(5.0, 6.0)));
        assert!(effects.contains(&ToolEffect::RevertToSelect));
        assert!(rig.machine.is_idle());
        let id = rig.scene.selection().single().unwrap();
        match rig.scene.get(id).unwrap() {
            Shape::Text(t) => {
                assert_eq!(t.content, "Type Here");
                assert_eq!(t.font_family, "Inter");
                assert!((t.font_size - 20.0).abs() < f64::EPSILON);
                assert_eq!(t.style.fill, Some(SerializableColor::rgb(0xef, 0x44, 0x44)));
            }
            other => panic!("expected text, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_alt_drag_pans_by_raw_delta() {
        let mut rig = Rig::new();
        rig.camera.zoom = 3.0;
        rig.down(
            ToolKind::Rect,
            PointerEvent::left(Point::new(10.0, 10.0)).with_modifiers(Modifiers::alt()),
        );
        rig.moved(ToolKind::Rect, Point::new(30.0, 5.0));
        rig.moved(ToolKind::Rect, Point::new(40.0, 15.0));
        rig.up(ToolKind::Rect, Point::new(40.0, 15.0));
        assert_eq!(rig.camera.offset, Vec2::new(30.0, 5.0));
        assert!(rig.scene.is_empty());
        assert!(rig.machine.is_idle());
    }

    #[test]
    fn test_move_tool_pans() {
        let mut rig = Rig::new();
        rig.down(ToolKind::Move, PointerEvent::left(Point::ZERO));
        let effects = rig.moved(ToolKind::Move, Point::new(-5.0, 7.0));
        assert_eq!(effects, vec![ToolEffect::ViewportChanged]);
        assert_eq!(rig.camera.offset, Vec2::new(-5.0, 7.0));
    }

    #[test]
    fn test_right_click_selects_and_opens_menu() {
        let mut rig = Rig::new();
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), 50.0, 50.0);
        rect.style.fill = Some(SerializableColor::white());
        let id = rig.scene.add(Shape::Rectangle(rect));
        let count = rig.scene.len();

        let effects = rig.down(ToolKind::Rect, PointerEvent::right(Point::new(30.0, 30.0)));
        assert_eq!(rig.scene.len(), count);
        assert_eq!(rig.scene.selection(), &Selection::Single(id));
        assert_eq!(
            effects,
            vec![
                ToolEffect::SelectionChanged,
                ToolEffect::ContextMenu { x: 30.0, y: 30.0, has_selection: true }
            ]
        );
        assert!(rig.machine.is_idle());
    }

    #[test]
    fn test_right_click_keeps_group_selection() {
        let mut rig = Rig::new();
        let mut a = Rectangle::new(Point::ZERO, 50.0, 50.0);
        a.style.fill = Some(SerializableColor::white());
        let a = rig.scene.add(Shape::Rectangle(a));
        let b = rig.scene.add(Shape::Rectangle(Rectangle::new(Point::new(100.0, 0.0), 50.0, 50.0)));
        rig.scene.set_selection(Selection::Group(vec![a, b]));

        let effects = rig.down(ToolKind::Select, PointerEvent::right(Point::new(20.0, 20.0)));
        assert!(rig.scene.selection().is_group());
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_right_click_empty_space() {
        let mut rig = Rig::new();
        let effects = rig.down(ToolKind::Select, PointerEvent::right(Point::new(1.0, 2.0)));
        assert_eq!(
            effects,
            vec![ToolEffect::ContextMenu { x: 1.0, y: 2.0, has_selection: false }]
        );
    }

    #[test]
    fn test_left_click_closes_popups_first() {
        let mut rig = Rig::new();
        let effects = rig.down(ToolKind::Select, PointerEvent::left(Point::new(500.0, 500.0)));
        assert_eq!(effects.first(), Some(&ToolEffect::PopupsClosed));
    }

    #[test]
    fn test_select_drag_snaps_to_grid() {
        let mut rig = Rig::new();
        let mut rect = Rectangle::new(Point::new(20.0, 20.0), 30.0, 30.0);
        rect.style.fill = Some(SerializableColor::white());
        let id = rig.scene.add(Shape::Rectangle(rect));

        rig.down(ToolKind::Select, PointerEvent::left(Point::new(25.0, 25.0)));
        assert_eq!(rig.scene.selection(), &Selection::Single(id));
        // Proposed top-left (108, 233): x snaps to 100, y stays
        rig.moved(ToolKind::Select, Point::new(113.0, 238.0));
        rig.up(ToolKind::Select, Point::new(113.0, 238.0));
        assert_eq!(rig.scene.get(id).unwrap().frame().position, Point::new(100.0, 233.0));
    }

    #[test]
    fn test_group_drag_moves_by_raw_delta() {
        let mut rig = Rig::new();
        let filled = |x: f64| {
            let mut rect = Rectangle::new(Point::new(x, 10.0), 10.0, 10.0);
            rect.style.fill = Some(SerializableColor::white());
            Shape::Rectangle(rect)
        };
        let a = rig.scene.add(filled(10.0));
        let b = rig.scene.add(filled(40.0));

        rig.down(ToolKind::Select, PointerEvent::left(Point::new(0.0, 0.0)));
        rig.moved(ToolKind::Select, Point::new(60.0, 30.0));
        rig.up(ToolKind::Select, Point::new(60.0, 30.0));
        assert_eq!(rig.scene.selection(), &Selection::Group(vec![a, b]));

        // (52, 52) would grid-snap to (50, 50) if groups were snapped
        rig.down(ToolKind::Select, PointerEvent::left(Point::new(15.0, 15.0)));
        rig.moved(ToolKind::Select, Point::new(57.0, 57.0));
        rig.up(ToolKind::Select, Point::new(57.0, 57.0));
        assert_eq!(rig.scene.selection(), &Selection::Group(vec![a, b]));
        assert_eq!(rig.scene.get(a).unwrap().frame().position, Point::new(52.0, 52.0));
        assert_eq!(rig.scene.get(b).unwrap().frame().position, Point::new(82.0, 52.0));
    }

    #[test]
    fn test_locked_object_not_snapped() {
        let mut scene = Scene::default();
        let mut rect = Rectangle::new(Point::ZERO, 10.0, 10.0);
        rect.frame.locked = true;
        let id = scene.add(Shape::Rectangle(rect));
        assert_eq!(object_moving(&scene, id, Point::new(48.0, 48.0), &SnapConfig::default()), None);
    }

    #[test]
    fn test_box_select() {
        let mut rig = Rig::new();
        let a = rig.scene.add(Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 10.0, 10.0)));
        let b = rig.scene.add(Shape::Rectangle(Rectangle::new(Point::new(40.0, 10.0), 10.0, 10.0)));
        rig.scene.add(Shape::Rectangle(Rectangle::new(Point::new(400.0, 400.0), 10.0, 10.0)));

        rig.down(ToolKind::Select, PointerEvent::left(Point::new(0.0, 0.0)));
        rig.moved(ToolKind::Select, Point::new(60.0, 30.0));
        let effects = rig.up(ToolKind::Select, Point::new(60.0, 30.0));
        assert_eq!(effects, vec![ToolEffect::SelectionChanged]);
        assert_eq!(rig.scene.selection(), &Selection::Group(vec![a, b]));
    }

    #[test]
    fn test_freehand_stroke_through_scene_brush() {
        let mut rig = Rig::new();
        rig.scene.set_free_drawing(true);
        rig.down(ToolKind::Draw, PointerEvent::left(Point::new(0.0, 0.0)));
        assert_eq!(rig.machine.state, ToolState::FreehandStroke);
        rig.moved(ToolKind::Draw, Point::new(10.0, 10.0));
        rig.moved(ToolKind::Draw, Point::new(20.0, 5.0));
        rig.up(ToolKind::Draw, Point::new(20.0, 5.0));
        assert_eq!(rig.scene.len(), 1);
        assert_eq!(rig.scene.objects()[0].kind().tag(), "path");
    }

    #[test]
    fn test_validate_extent() {
        assert!(validate_extent(5.0, 5.0, 5.0).is_ok());
        assert!(validate_extent(3.0, 200.0, 5.0).is_err());
    }
}
