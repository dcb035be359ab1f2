//! In-memory scene: ordered object storage, selection, brush and export.

use super::raster::render_png;
use super::{Brush, ExportRegion, SceneAdapter, SceneError, SceneResult, Selection};
use crate::shapes::{Freehand, ObjectId, SerializableColor, Shape, ShapeStyle};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pick tolerance in scene units.
const HIT_TOLERANCE: f64 = 4.0;
const DOCUMENT_VERSION: u32 = 1;

fn default_background() -> SerializableColor {
    SerializableColor::white()
}

/// Serialized form of a scene: objects back to front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default = "default_background")]
    pub background: SerializableColor,
    pub objects: Vec<Shape>,
}

/// The in-memory scene graph.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: HashMap<ObjectId, Shape>,
    /// Z-order of objects (back to front).
    z_order: Vec<ObjectId>,
    selection: Selection,
    pub background: SerializableColor,
    viewport_size: Size,
    free_drawing: bool,
    brush: Brush,
    stroke: Option<Vec<Point>>,
    selection_box: bool,
    renders: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0))
    }
}

impl Scene {
    pub fn new(viewport_size: Size) -> Self {
        Self {
            objects: HashMap::new(),
            z_order: Vec::new(),
            selection: Selection::None,
            background: default_background(),
            viewport_size,
            free_drawing: false,
            brush: Brush::default(),
            stroke: None,
            selection_box: true,
            renders: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object and clear the selection.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.z_order.clear();
        self.selection = Selection::None;
    }

    pub fn document(&self) -> SceneDocument {
        SceneDocument {
            version: DOCUMENT_VERSION,
            background: self.background,
            objects: self.objects().into_iter().cloned().collect(),
        }
    }

    fn export_region(
        &self,
        region: ExportRegion,
    ) -> SceneResult<(Vec<&Shape>, Rect, f64, Option<SerializableColor>)> {
        match region {
            ExportRegion::Selection => {
                let bounds = self.selection_bounds().ok_or(SceneError::EmptyRegion)?;
                // Paint selected objects in z-order, not selection order
                let shapes = self
                    .objects()
                    .into_iter()
                    .filter(|s| self.selection.contains(s.id()))
                    .collect();
                Ok((shapes, bounds, 1.0, None))
            }
            ExportRegion::Object(id) => {
                let shape = self.get(id).ok_or(SceneError::UnknownObject(id))?;
                Ok((vec![shape], shape.visual_bounds(), 1.0, None))
            }
            ExportRegion::Viewport(transform) => {
                let screen = Rect::from_origin_size(Point::ZERO, self.viewport_size);
                let region = transform.inverse().transform_rect_bbox(screen);
                // One output pixel per screen pixel at multiplier 1
                let zoom = transform.as_coeffs()[0].abs();
                Ok((self.objects(), region, zoom, Some(self.background)))
            }
        }
    }
}

impl SceneAdapter for Scene {
    fn add(&mut self, shape: Shape) -> ObjectId {
        let id = shape.id();
        if self.objects.insert(id, shape).is_none() {
            self.z_order.push(id);
        }
        id
    }

    fn remove(&mut self, id: ObjectId) -> Option<Shape> {
        self.z_order.retain(|&oid| oid != id);
        let removed = self.objects.remove(&id);
        if removed.is_some() && self.selection.contains(id) {
            let remaining = self.selection.ids().into_iter().filter(|&s| s != id).collect();
            self.selection = Selection::from_ids(remaining);
        }
        removed
    }

    fn get(&self, id: ObjectId) -> Option<&Shape> {
        self.objects.get(&id)
    }

    fn get_mut(&mut self, id: ObjectId) -> Option<&mut Shape> {
        self.objects.get_mut(&id)
    }

    fn objects(&self) -> Vec<&Shape> {
        self.z_order
            .iter()
            .filter_map(|id| self.objects.get(id))
            .collect()
    }

    fn object_at(&self, point: Point) -> Option<ObjectId> {
        // Front to back for picking priority
        self.z_order.iter().rev().copied().find(|id| {
            self.objects
                .get(id)
                .is_some_and(|s| s.frame().visible && s.hit_test(point, HIT_TOLERANCE))
        })
    }

    fn selection(&self) -> &Selection {
        &self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        let ids: Vec<ObjectId> = selection
            .ids()
            .into_iter()
            .filter(|id| self.objects.contains_key(id))
            .collect();
        self.selection = Selection::from_ids(ids);
    }

    fn export_png(&self, region: ExportRegion, multiplier: f64) -> SceneResult<Vec<u8>> {
        let (shapes, rect, base_scale, background) = self.export_region(region)?;
        render_png(&shapes, rect, base_scale * multiplier, background)
    }

    fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(&self.document())?)
    }

    fn load_json(&mut self, json: &str) -> SceneResult<()> {
        let doc: SceneDocument = serde_json::from_str(json)?;
        self.clear();
        self.background = doc.background;
        for shape in doc.objects {
            self.add(shape);
        }
        log::debug!("Loaded scene document with {} objects", self.len());
        Ok(())
    }

    fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
    }

    fn set_free_drawing(&mut self, enabled: bool) {
        self.free_drawing = enabled;
        if !enabled {
            self.stroke = None;
        }
    }

    fn is_free_drawing(&self) -> bool {
        self.free_drawing
    }

    fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    fn brush(&self) -> Brush {
        self.brush
    }

    fn begin_stroke(&mut self, point: Point) {
        if self.free_drawing {
            self.stroke = Some(vec![point]);
        }
    }

    fn extend_stroke(&mut self, point: Point) {
        if let Some(points) = self.stroke.as_mut() {
            points.push(point);
        }
    }

    fn finish_stroke(&mut self) -> Option<ObjectId> {
        let points = self.stroke.take()?;
        if points.len() < 2 {
            return None;
        }
        let mut path = Freehand::from_points(points);
        path.style = ShapeStyle::outline(self.brush.color, self.brush.width);
        Some(self.add(Shape::Freehand(path)))
    }

    fn set_selection_box_enabled(&mut self, enabled: bool) {
        self.selection_box = enabled;
    }

    fn selection_box_enabled(&self) -> bool {
        self.selection_box
    }

    fn request_render(&mut self) {
        self.renders += 1;
    }

    fn render_count(&self) -> u64 {
        self.renders
    }
}
