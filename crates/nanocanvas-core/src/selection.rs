//! Two-way sync between the active selection and the style editor.

use crate::scene::{Brush, SceneAdapter, Selection};
use crate::shapes::{SerializableColor, Shape};
use crate::tools::ToolKind;
use serde::{Deserialize, Serialize};

/// `type` value shown while a multi-object selection is active.
pub const GROUP_TAG: &str = "group";

/// Style-editor projection of the active object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedProperties {
    /// CSS color string.
    pub stroke: String,
    pub stroke_width: f64,
    /// Text color as a CSS color string.
    pub fill: String,
    pub font_size: f64,
    /// Variant tag, `"group"`, or empty when nothing is selected.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for SelectedProperties {
    fn default() -> Self {
        Self {
            stroke: "#000000".to_string(),
            stroke_width: 3.0,
            fill: "#000000".to_string(),
            font_size: 32.0,
            kind: String::new(),
        }
    }
}

impl SelectedProperties {
    /// Re-project from the current selection.
    ///
    /// Fields the object does not carry keep their previous values.
    pub fn sync<S: SceneAdapter + ?Sized>(&mut self, scene: &S) {
        match scene.selection() {
            Selection::None => self.kind.clear(),
            Selection::Group(_) => self.kind = GROUP_TAG.to_string(),
            Selection::Single(id) => match scene.get(*id) {
                Some(shape) => self.project(shape),
                None => self.kind.clear(),
            },
        }
    }

    fn project(&mut self, shape: &Shape) {
        let style = shape.style();
        if let Some(stroke) = style.stroke {
            self.stroke = stroke.to_hex();
        }
        if style.stroke_width > 0.0 {
            self.stroke_width = style.stroke_width;
        }
        if shape.is_text() {
            self.fill = style
                .fill
                .map(|c| c.to_hex())
                .unwrap_or_else(|| "transparent".to_string());
        }
        if let Some(size) = shape.font_size() {
            self.font_size = size;
        }
        self.kind = shape.kind().tag().to_string();
    }

    /// Style used for newly drawn rectangles and circles.
    pub fn outline_color(&self) -> SerializableColor {
        SerializableColor::from_css_lossy(&self.stroke).unwrap_or_else(SerializableColor::black)
    }

    /// Color for new text; an empty fill falls back to black.
    pub fn text_color(&self) -> Option<SerializableColor> {
        if self.fill.trim().is_empty() {
            return Some(SerializableColor::black());
        }
        SerializableColor::from_css_lossy(&self.fill)
    }

    pub fn brush(&self) -> Brush {
        Brush {
            color: self.outline_color(),
            width: self.stroke_width,
        }
    }
}

/// A single edit coming from the style editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "camelCase")]
pub enum PropertyChange {
    Stroke(String),
    StrokeWidth(f64),
    Fill(String),
    FontSize(f64),
}

impl PropertyChange {
    /// Stroke edits skip text; fill and font size edits only touch text.
    fn applies_to(&self, shape: &Shape) -> bool {
        match self {
            PropertyChange::Stroke(_) | PropertyChange::StrokeWidth(_) => !shape.is_text(),
            PropertyChange::Fill(_) | PropertyChange::FontSize(_) => shape.is_text(),
        }
    }

    fn apply_to(&self, shape: &mut Shape) {
        match (self, shape) {
            (PropertyChange::FontSize(size), Shape::Text(text)) => text.font_size = *size,
            (PropertyChange::FontSize(_), _) => {}
            (PropertyChange::Stroke(css), shape) => {
                shape.style_mut().stroke = SerializableColor::from_css_lossy(css);
            }
            (PropertyChange::StrokeWidth(width), shape) => shape.style_mut().stroke_width = *width,
            (PropertyChange::Fill(css), shape) => {
                shape.style_mut().fill = SerializableColor::from_css_lossy(css);
            }
        }
    }
}

/// Apply a style-editor change to the properties, the brush and the active object.
///
/// Returns true when an object was mutated.
pub fn apply_property_change<S: SceneAdapter + ?Sized>(
    properties: &mut SelectedProperties,
    change: &PropertyChange,
    scene: &mut S,
    tool: ToolKind,
) -> bool {
    match change {
        PropertyChange::Stroke(css) => properties.stroke = css.clone(),
        PropertyChange::StrokeWidth(w) => properties.stroke_width = *w,
        PropertyChange::Fill(css) => properties.fill = css.clone(),
        PropertyChange::FontSize(size) => properties.font_size = *size,
    }

    if tool == ToolKind::Draw
        && matches!(change, PropertyChange::Stroke(_) | PropertyChange::StrokeWidth(_))
    {
        scene.set_brush(properties.brush());
    }

    // Group selections are not restyled
    let Some(id) = scene.selection().single() else {
        return false;
    };
    let mutated = match scene.get_mut(id) {
        Some(shape) if change.applies_to(shape) => {
            change.apply_to(shape);
            true
        }
        _ => false,
    };
    scene.request_render();
    mutated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use crate::shapes::{Image, ImageFormat, Rectangle, ShapeStyle, Text};
    use kurbo::Point;

    fn scene_with(shape: Shape) -> (Scene, crate::shapes::ObjectId) {
        let mut scene = Scene::default();
        let id = scene.add(shape);
        scene.set_selection(Selection::Single(id));
        (scene, id)
    }

    #[test]
    fn test_sync_nothing_selected() {
        let scene = Scene::default();
        let mut props = SelectedProperties {
            kind: "rect".to_string(),
            ..Default::default()
        };
        props.sync(&scene);
        assert_eq!(props.kind, "");
        assert_eq!(props.stroke, "#000000");
    }

    #[test]
    fn test_sync_shape_keeps_previous_fill() {
        let rect = Rectangle::new(Point::ZERO, 10.0, 10.0)
            .with_style(ShapeStyle::outline(SerializableColor::rgb(0xef, 0x44, 0x44), 6.0));
        let (scene, _) = scene_with(Shape::Rectangle(rect));
        let mut props = SelectedProperties {
            fill: "#3b82f6".to_string(),
            ..Default::default()
        };
        props.sync(&scene);
        assert_eq!(props.kind, "rect");
        assert_eq!(props.stroke, "#ef4444");
        assert!((props.stroke_width - 6.0).abs() < f64::EPSILON);
        assert_eq!(props.fill, "#3b82f6");
    }

    #[test]
    fn test_sync_text_projects_fill_and_size() {
        let mut text = Text::new(Point::ZERO, "hi");
        text.font_size = 48.0;
        text.style.fill = Some(SerializableColor::rgb(0xa8, 0x55, 0xf7));
        let (scene, _) = scene_with(Shape::Text(text));
        let mut props = SelectedProperties::default();
        props.sync(&scene);
        assert_eq!(props.kind, "text");
        assert_eq!(props.fill, "#a855f7");
        assert!((props.font_size - 48.0).abs() < f64::EPSILON);
        // Text has no stroke, so the previous stroke stays
        assert_eq!(props.stroke, "#000000");
    }

    #[test]
    fn test_sync_group_freezes_fields() {
        let mut scene = Scene::default();
        let a = scene.add(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let image = Image::from_parts(Point::ZERO, 4, 4, ImageFormat::Png, String::new());
        let b = scene.add(Shape::Image(image));
        scene.set_selection(Selection::Group(vec![a, b]));
        let mut props = SelectedProperties {
            stroke: "#22c55e".to_string(),
            ..Default::default()
        };
        props.sync(&scene);
        assert_eq!(props.kind, GROUP_TAG);
        assert_eq!(props.stroke, "#22c55e");
    }

    #[test]
    fn test_stroke_change_skips_text() {
        let (mut scene, id) = scene_with(Shape::Text(Text::new(Point::ZERO, "hi")));
        let mut props = SelectedProperties::default();
        let mutated = apply_property_change(
            &mut props,
            &PropertyChange::Stroke("#ef4444".to_string()),
            &mut scene,
            ToolKind::Select,
        );
        assert!(!mutated);
        assert!(scene.get(id).unwrap().style().stroke.is_none());
        assert_eq!(props.stroke, "#ef4444");
        assert_eq!(scene.render_count(), 1);
    }

    #[test]
    fn test_fill_change_only_on_text() {
        let (mut scene, id) = scene_with(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let mut props = SelectedProperties::default();
        apply_property_change(
            &mut props,
            &PropertyChange::Fill("#ef4444".to_string()),
            &mut scene,
            ToolKind::Select,
        );
        assert!(scene.get(id).unwrap().style().fill.is_none());

        let (mut scene, id) = scene_with(Shape::Text(Text::new(Point::ZERO, "hi")));
        apply_property_change(
            &mut props,
            &PropertyChange::FontSize(64.0),
            &mut scene,
            ToolKind::Select,
        );
        apply_property_change(
            &mut props,
            &PropertyChange::Fill("#ef4444".to_string()),
            &mut scene,
            ToolKind::Select,
        );
        let shape = scene.get(id).unwrap();
        assert_eq!(shape.font_size(), Some(64.0));
        assert_eq!(shape.style().fill, Some(SerializableColor::rgb(0xef, 0x44, 0x44)));
    }

    #[test]
    fn test_draw_tool_mirrors_brush_without_selection() {
        let mut scene = Scene::default();
        let mut props = SelectedProperties::default();
        apply_property_change(
            &mut props,
            &PropertyChange::StrokeWidth(12.0),
            &mut scene,
            ToolKind::Draw,
        );
        apply_property_change(
            &mut props,
            &PropertyChange::Stroke("#3b82f6".to_string()),
            &mut scene,
            ToolKind::Draw,
        );
        assert!((scene.brush().width - 12.0).abs() < f64::EPSILON);
        assert_eq!(scene.brush().color, SerializableColor::rgb(0x3b, 0x82, 0xf6));
        assert_eq!(scene.render_count(), 0);

        apply_property_change(
            &mut props,
            &PropertyChange::StrokeWidth(2.0),
            &mut scene,
            ToolKind::Select,
        );
        assert!((scene.brush().width - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_property_change_wire_format() {
        let change: PropertyChange =
            serde_json::from_str(r##"{"key":"strokeWidth","value":5}"##).unwrap();
        assert_eq!(change, PropertyChange::StrokeWidth(5.0));
        let props = serde_json::to_value(SelectedProperties::default()).unwrap();
        assert_eq!(props["type"], "");
        assert_eq!(props["strokeWidth"], 3.0);
    }
}
