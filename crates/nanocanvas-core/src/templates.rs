//! Built-in prompt templates.

use crate::generation::ModelId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Create,
    Edit,
    Video,
}

/// A reusable prompt with `${placeholder}` slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub prompt_template: &'static str,
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    pub requires_image: bool,
    pub category: &'static str,
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "basic_create_1",
        name: "Text to Image",
        description: "Generate an image from a text prompt",
        prompt_template: "A detailed, high-quality image of ${subject}",
        kind: TemplateKind::Create,
        requires_image: false,
        category: "artistic",
    },
    Template {
        id: "basic_edit_1",
        name: "Single Image Edit",
        description: "Edit the selected image object with AI",
        prompt_template: "Enhance the selected object: ${instruction}",
        kind: TemplateKind::Edit,
        requires_image: true,
        category: "utility",
    },
    Template {
        id: "video_generate_1",
        name: "Video Motion",
        description: "Generate short motion video from a prompt",
        prompt_template: "Create a smooth motion video about ${subject}",
        kind: TemplateKind::Video,
        requires_image: false,
        category: "video",
    },
    Template {
        id: "logo_design_1",
        name: "Logo Concept",
        description: "Generate minimal logo concepts",
        prompt_template: "Minimal vector logo for ${brand}",
        kind: TemplateKind::Create,
        requires_image: false,
        category: "design",
    },
    Template {
        id: "portrait_retouch_1",
        name: "Portrait Retouch",
        description: "Retouch a portrait photo with natural tones",
        prompt_template: "Retouch the portrait to be natural and clean",
        kind: TemplateKind::Edit,
        requires_image: true,
        category: "photography",
    },
    Template {
        id: "sci_fi_scene_1",
        name: "Sci-Fi Scene",
        description: "Create a neon cyberpunk city scene",
        prompt_template: "Neon cyberpunk city at night, rain, reflections",
        kind: TemplateKind::Create,
        requires_image: false,
        category: "sci-fi",
    },
];

impl Template {
    pub fn by_id(id: &str) -> Option<&'static Template> {
        TEMPLATES.iter().find(|t| t.id == id)
    }

    /// Model to switch to when this template is picked while `current` is active.
    pub fn preferred_model(&self, current: ModelId, video_enabled: bool) -> ModelId {
        match (self.kind, current.is_video()) {
            (TemplateKind::Video, false) if video_enabled => ModelId::VideoFast,
            (TemplateKind::Video, true) if !video_enabled => ModelId::ProImage,
            (TemplateKind::Create | TemplateKind::Edit, true) => ModelId::FlashImage,
            _ => current,
        }
    }

    /// Substitute `${key}` placeholders. Unknown placeholders are left in place.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        values
            .iter()
            .fold(self.prompt_template.to_string(), |prompt, (key, value)| {
                prompt.replace(&format!("${{{}}}", key), value)
            })
    }

    fn matches(&self, query: &str) -> bool {
        [self.name, self.description, self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(query))
    }
}

/// Case-insensitive search over name, description and category, optionally
/// restricted to one category.
pub fn search(query: &str, category: Option<&str>) -> Vec<&'static Template> {
    let query = query.trim().to_lowercase();
    TEMPLATES
        .iter()
        .filter(|t| category.is_none_or(|c| t.category == c))
        .filter(|t| t.matches(&query))
        .collect()
}

/// Distinct categories, sorted.
pub fn categories() -> Vec<&'static str> {
    let mut cats: Vec<_> = TEMPLATES.iter().map(|t| t.category).collect();
    cats.sort_unstable();
    cats.dedup();
    cats
}
