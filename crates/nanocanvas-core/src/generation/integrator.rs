//! Places generation results on the canvas.

use super::{GenerationContext, GenerationError, ImageResult};
use crate::scene::{SceneAdapter, Selection};
use crate::shapes::{AiData, Image, ObjectId, Shape, Video};

/// Width used when the placement carries none.
const FALLBACK_WIDTH: f64 = 400.0;

fn stamp_and_place<S: SceneAdapter + ?Sized>(
    scene: &mut S,
    context: &GenerationContext,
    mut shape: Shape,
    timestamp: i64,
) -> ObjectId {
    let width = if context.placement.visual_width > 0.0 {
        context.placement.visual_width
    } else {
        FALLBACK_WIDTH
    };
    shape.scale_to_width(width);
    shape.frame_mut().position = context.placement.anchor;
    shape.set_ai_data(AiData {
        prompt: context.request.prompt.clone(),
        model: context.request.model,
        timestamp,
    });

    let id = scene.add(shape);
    scene.set_selection(Selection::Single(id));
    scene.request_render();
    id
}

/// Decode an image result and add it as the new active object.
///
/// Nothing is added when decoding fails.
pub fn integrate_image<S: SceneAdapter + ?Sized>(
    scene: &mut S,
    context: &GenerationContext,
    result: ImageResult,
    timestamp: i64,
) -> Result<ObjectId, GenerationError> {
    if result.bytes.is_empty() {
        return Err(GenerationError::MissingResultPayload);
    }
    let mut image = Image::decode(context.placement.anchor, &result.bytes).map_err(|e| {
        log::error!("Generated image could not be decoded: {}", e);
        GenerationError::DecodeFailure(e.to_string())
    })?;
    image.source_url = result.source_url;
    let id = stamp_and_place(scene, context, Shape::Image(image), timestamp);
    log::info!("Placed generated image {}", id);
    Ok(id)
}

/// Add a looping, muted, playing video surface as the new active object.
pub fn integrate_video<S: SceneAdapter + ?Sized>(
    scene: &mut S,
    context: &GenerationContext,
    url: String,
    timestamp: i64,
) -> Result<ObjectId, GenerationError> {
    if url.trim().is_empty() {
        return Err(GenerationError::MissingResultPayload);
    }
    let video = Video::new(context.placement.anchor, url);
    let id = stamp_and_place(scene, context, Shape::Video(video), timestamp);
    log::info!("Placed generated video {}", id);
    Ok(id)
}
