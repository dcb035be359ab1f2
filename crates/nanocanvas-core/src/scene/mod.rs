//! Scene adapter: the boundary between the interaction core and the scene graph.

mod document;
mod raster;

pub use document::{Scene, SceneDocument};
pub use raster::encode_png;

use crate::shapes::{ObjectId, SerializableColor, Shape};
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from scene operations.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("object not found: {0}")]
    UnknownObject(ObjectId),
    #[error("nothing to export")]
    EmptyRegion,
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("scene document error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// The active selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    None,
    Single(ObjectId),
    /// Ephemeral multi-object selection; members keep their order.
    Group(Vec<ObjectId>),
}

impl Selection {
    /// Build a selection from a list of ids: empty, one, or a group.
    pub fn from_ids(mut ids: Vec<ObjectId>) -> Self {
        match ids.len() {
            0 => Selection::None,
            1 => Selection::Single(ids.remove(0)),
            _ => Selection::Group(ids),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::None => true,
            Selection::Single(_) => false,
            Selection::Group(ids) => ids.is_empty(),
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Selection::Group(_))
    }

    /// Flattened member ids.
    pub fn ids(&self) -> Vec<ObjectId> {
        match self {
            Selection::None => Vec::new(),
            Selection::Single(id) => vec![*id],
            Selection::Group(ids) => ids.clone(),
        }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(s) => *s == id,
            Selection::Group(ids) => ids.contains(&id),
        }
    }

    /// The single selected object, if exactly one is selected.
    pub fn single(&self) -> Option<ObjectId> {
        match self {
            Selection::Single(id) => Some(*id),
            _ => None,
        }
    }
}

/// What to rasterize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportRegion {
    /// The selection's bounding box, selected objects only, transparent background.
    Selection,
    /// One object's bounding box, transparent background.
    Object(ObjectId),
    /// The visible viewport through the given scene-to-screen transform, on the background color.
    Viewport(Affine),
}

/// Free-drawing brush settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub color: SerializableColor,
    pub width: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            width: 3.0,
        }
    }
}

/// Capabilities the core consumes from the scene graph.
pub trait SceneAdapter {
    /// Add an object on top of the z-order.
    fn add(&mut self, shape: Shape) -> ObjectId;

    /// Remove an object. Removing a selected object drops it from the selection.
    fn remove(&mut self, id: ObjectId) -> Option<Shape>;

    fn get(&self, id: ObjectId) -> Option<&Shape>;

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut Shape>;

    /// All objects, back to front.
    fn objects(&self) -> Vec<&Shape>;

    /// Topmost visible object under a scene point.
    fn object_at(&self, point: Point) -> Option<ObjectId>;

    fn selection(&self) -> &Selection;

    fn set_selection(&mut self, selection: Selection);

    /// Rasterize a region to PNG bytes at `multiplier` output pixels per scene unit.
    fn export_png(&self, region: ExportRegion, multiplier: f64) -> SceneResult<Vec<u8>>;

    /// Serialize the whole scene.
    fn to_json(&self) -> SceneResult<String>;

    /// Replace the scene contents from a serialized document.
    fn load_json(&mut self, json: &str) -> SceneResult<()>;

    /// Canvas element size in screen pixels.
    fn viewport_size(&self) -> Size;

    fn set_viewport_size(&mut self, size: Size);

    fn set_free_drawing(&mut self, enabled: bool);

    fn is_free_drawing(&self) -> bool;

    fn set_brush(&mut self, brush: Brush);

    fn brush(&self) -> Brush;

    /// Start a brush stroke at a scene point. No-op unless free drawing is on.
    fn begin_stroke(&mut self, point: Point);

    fn extend_stroke(&mut self, point: Point);

    /// Finish the current stroke, committing it as a path object.
    fn finish_stroke(&mut self) -> Option<ObjectId>;

    /// Enable or disable rubber-band multi-selection.
    fn set_selection_box_enabled(&mut self, enabled: bool);

    fn selection_box_enabled(&self) -> bool;

    fn request_render(&mut self);

    /// Number of renders requested so far.
    fn render_count(&self) -> u64;

    /// Selected objects, flattened, in selection order.
    fn selected_objects(&self) -> Vec<&Shape> {
        self.selection()
            .ids()
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect()
    }

    /// Painted bounding box of the whole selection, strokes included.
    fn selection_bounds(&self) -> Option<Rect> {
        self.selected_objects()
            .into_iter()
            .map(Shape::visual_bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Visible objects whose bounds intersect `rect`, back to front.
    fn objects_in_rect(&self, rect: Rect) -> Vec<ObjectId> {
        self.objects()
            .into_iter()
            .filter(|s| s.frame().visible && rect.intersect(s.bounds()).area() > 0.0)
            .map(Shape::id)
            .collect()
    }

    /// Discard the active selection.
    fn clear_selection(&mut self) {
        self.set_selection(Selection::None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_selection_from_ids() {
        assert_eq!(Selection::from_ids(Vec::new()), Selection::None);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(Selection::from_ids(vec![a]), Selection::Single(a));
        let group = Selection::from_ids(vec![a, b]);
        assert!(group.is_group());
        assert!(group.contains(b));
        assert_eq!(group.ids(), vec![a, b]);
        assert_eq!(group.single(), None);
    }
}
