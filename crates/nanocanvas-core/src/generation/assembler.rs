//! Turns the current selection (or the viewport) into a generation request.

use super::{
    Base64Image, GenerationContext, GenerationError, GenerationMode, GenerationRequest, ModelId,
    Placement,
};
use crate::camera::Camera;
use crate::scene::{ExportRegion, SceneAdapter};
use crate::shapes::{SerializableColor, Shape, ShapeKind};
use kurbo::{Rect, Vec2};

/// Sizing constants used while assembling a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblerConfig {
    /// Longest side a flattened selection is upscaled to.
    pub selection_target: f64,
    /// Longest side each image is upscaled to in multi-image mode.
    pub image_target: f64,
    /// Gap between the selection and the placed result.
    pub placement_gap: f64,
    /// Result width when nothing was selected.
    pub default_visual_width: f64,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            selection_target: 1536.0,
            image_target: 1024.0,
            placement_gap: 20.0,
            default_visual_width: 400.0,
        }
    }
}

/// Content flags for a flattened selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub has_images: bool,
    pub has_shapes: bool,
    pub count: usize,
}

impl Classification {
    pub fn mode(&self) -> GenerationMode {
        if self.has_images && !self.has_shapes && self.count > 1 {
            GenerationMode::MultiImage
        } else if self.has_images && self.has_shapes {
            GenerationMode::Annotation
        } else {
            GenerationMode::Standard
        }
    }
}

pub fn classify(members: &[&Shape]) -> Classification {
    Classification {
        has_images: members.iter().any(|m| m.kind().is_image_like()),
        has_shapes: members.iter().any(|m| m.kind().is_vector_shape()),
        count: members.len(),
    }
}

/// Raster multiplier that brings the longest side of `bounds` up to `target`.
/// Never downscales; a degenerate box gets 1.
pub fn upscale_multiplier(bounds: Rect, target: f64) -> f64 {
    let max_dim = bounds.width().max(bounds.height());
    if max_dim > 0.0 && max_dim < target {
        target / max_dim
    } else {
        1.0
    }
}

/// Human-readable name for a palette color; anything else is "colored".
pub fn color_name(color: Option<SerializableColor>) -> &'static str {
    let Some(color) = color else {
        return "colored";
    };
    match color.to_hex().as_str() {
        "#ffffff" => "white",
        "#000000" => "black",
        "#ef4444" => "red",
        "#f97316" => "orange",
        "#eab308" => "yellow",
        "#22c55e" => "green",
        "#3b82f6" => "blue",
        "#6366f1" => "indigo",
        "#a855f7" => "purple",
        "#ec4899" => "pink",
        _ => "colored",
    }
}

/// One "remove the ... annotation" instruction per rectangle or circle.
pub fn annotation_instructions(members: &[&Shape]) -> Vec<String> {
    members
        .iter()
        .filter_map(|m| {
            let shape_name = match m.kind() {
                ShapeKind::Rectangle => "rectangle",
                ShapeKind::Ellipse => "circle",
                _ => return None,
            };
            let style = m.style();
            let color = color_name(style.stroke.or(style.fill));
            Some(format!("remove the {color} {shape_name} annotation"))
        })
        .collect()
}

/// Prompt suffix naming all instructions, or None when there are none.
pub fn annotation_directive(instructions: &[String]) -> Option<String> {
    if instructions.is_empty() {
        return None;
    }
    Some(format!(
        " (IMPORTANT: {} from the final result, but use it as a reference for the edit).",
        instructions.join(", ")
    ))
}

/// Build a generation context from the scene's selection, or from the viewport when nothing
/// is selected.
pub fn assemble<S: SceneAdapter + ?Sized>(
    scene: &S,
    camera: &Camera,
    prompt: &str,
    model: ModelId,
    config: &AssemblerConfig,
) -> Result<GenerationContext, GenerationError> {
    let members = scene.selected_objects();
    match scene.selection_bounds() {
        Some(bounds) if !members.is_empty() => {
            assemble_selection(scene, &members, bounds, prompt, model, config)
        }
        _ => assemble_viewport(scene, camera, prompt, model, config),
    }
}

fn assemble_selection<S: SceneAdapter + ?Sized>(
    scene: &S,
    members: &[&Shape],
    bounds: Rect,
    prompt: &str,
    model: ModelId,
    config: &AssemblerConfig,
) -> Result<GenerationContext, GenerationError> {
    let classification = classify(members);
    let mode = classification.mode();
    let multiplier = upscale_multiplier(bounds, config.selection_target);
    let mut final_prompt = prompt.to_string();

    let images = match mode {
        GenerationMode::MultiImage => {
            log::info!("Multi-image mode detected");
            members
                .iter()
                .filter(|m| m.kind().is_image_like())
                .map(|m| {
                    let mult = upscale_multiplier(m.bounds(), config.image_target);
                    scene
                        .export_png(ExportRegion::Object(m.id()), mult)
                        .map(|png| Base64Image::from_png_bytes(&png))
                })
                .collect::<Result<Vec<_>, _>>()?
        }
        GenerationMode::Annotation => {
            log::info!("Annotation mode detected");
            let png = scene.export_png(ExportRegion::Selection, multiplier)?;
            if let Some(directive) = annotation_directive(&annotation_instructions(members)) {
                final_prompt.push_str(&directive);
            }
            vec![Base64Image::from_png_bytes(&png)]
        }
        _ => {
            log::info!("Standard mode detected");
            let png = scene.export_png(ExportRegion::Selection, multiplier)?;
            vec![Base64Image::from_png_bytes(&png)]
        }
    };

    Ok(GenerationContext {
        request: GenerationRequest {
            prompt: final_prompt,
            model,
            images,
            reference_width: bounds.width(),
            reference_height: bounds.height(),
        },
        mode,
        placement: Placement {
            anchor: (bounds.x1 + config.placement_gap, bounds.y0).into(),
            visual_width: bounds.width(),
        },
    })
}

fn assemble_viewport<S: SceneAdapter + ?Sized>(
    scene: &S,
    camera: &Camera,
    prompt: &str,
    model: ModelId,
    config: &AssemblerConfig,
) -> Result<GenerationContext, GenerationError> {
    let viewport = scene.viewport_size();
    let half = config.default_visual_width / 2.0;
    let anchor = camera.viewport_center_world(viewport) - Vec2::new(half, half);

    // Video with nothing selected is pure text-to-video
    let images = if model.is_video() {
        Vec::new()
    } else {
        let png = scene.export_png(ExportRegion::Viewport(camera.transform()), 1.0)?;
        vec![Base64Image::from_png_bytes(&png)]
    };
    log::info!("Viewport mode: {} image(s)", images.len());

    Ok(GenerationContext {
        request: GenerationRequest {
            prompt: prompt.to_string(),
            model,
            images,
            reference_width: viewport.width,
            reference_height: viewport.height,
        },
        mode: GenerationMode::Viewport,
        placement: Placement {
            anchor,
            visual_width: config.default_visual_width,
        },
    })
}
