//! Persisted project records and the generation gallery.

use crate::generation::ModelId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// A saved canvas: the serialized scene plus a thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    /// Scene document as JSON.
    pub document: String,
    /// Base64-encoded PNG.
    pub thumbnail: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProjectRecord {
    pub fn new(name: impl Into<String>, document: String, thumbnail: String, now: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            document,
            thumbnail,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the contents, keeping identity and creation time.
    pub fn update(&mut self, document: String, thumbnail: String, now: i64) {
        self.document = document;
        self.thumbnail = thumbnail;
        self.updated_at = now;
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryKind {
    Image,
    Video,
}

/// One past generation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    /// Remote URL or data URL.
    pub url: String,
    pub prompt: String,
    pub model: ModelId,
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: GalleryKind,
}

impl GalleryItem {
    pub fn new(url: String, prompt: String, model: ModelId, timestamp: i64) -> Self {
        let kind = if model.is_video() {
            GalleryKind::Video
        } else {
            GalleryKind::Image
        };
        Self {
            id: Uuid::new_v4().to_string(),
            url,
            prompt,
            model,
            timestamp,
            kind,
        }
    }
}

/// Generation history, newest first, holding at most `cap` items.
#[derive(Debug, Clone, PartialEq)]
pub struct Gallery {
    items: VecDeque<GalleryItem>,
    cap: usize,
}

impl Gallery {
    pub fn new(cap: usize) -> Self {
        Self {
            items: VecDeque::new(),
            cap,
        }
    }

    pub fn push(&mut self, item: GalleryItem) {
        self.items.push_front(item);
        self.items.truncate(self.cap);
    }

    pub fn remove(&mut self, id: &str) -> Option<GalleryItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        self.items.remove(index)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GalleryItem> {
        self.items.iter()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Restore from JSON, dropping anything beyond the cap.
    pub fn load_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let mut items: VecDeque<GalleryItem> = serde_json::from_str(json)?;
        items.truncate(self.cap);
        self.items = items;
        Ok(())
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(prompt: &str) -> GalleryItem {
        GalleryItem::new(
            "https://cdn.example/x.png".to_string(),
            prompt.to_string(),
            ModelId::FlashImage,
            1,
        )
    }

    #[test]
    fn test_gallery_newest_first_and_capped() {
        let mut gallery = Gallery::new(3);
        for i in 0..5 {
            gallery.push(item(&format!("p{}", i)));
        }
        assert_eq!(gallery.len(), 3);
        let prompts: Vec<_> = gallery.iter().map(|i| i.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["p4", "p3", "p2"]);
    }

    #[test]
    fn test_gallery_kind_follows_model() {
        let video = GalleryItem::new(String::new(), String::new(), ModelId::VideoHq, 0);
        assert_eq!(video.kind, GalleryKind::Video);
        assert_eq!(item("a").kind, GalleryKind::Image);
    }

    #[test]
    fn test_gallery_json_roundtrip() {
        let mut gallery = Gallery::default();
        gallery.push(item("a"));
        gallery.push(item("b"));
        let json = gallery.to_json().unwrap();
        assert!(json.contains("\"type\":\"image\""));

        let mut restored = Gallery::new(1);
        restored.load_json(&json).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.iter().next().unwrap().prompt, "b");
    }

    #[test]
    fn test_gallery_remove() {
        let mut gallery = Gallery::default();
        let first = item("a");
        let id = first.id.clone();
        gallery.push(first);
        assert!(gallery.remove(&id).is_some());
        assert!(gallery.remove(&id).is_none());
        assert!(gallery.is_empty());
    }

    #[test]
    fn test_project_update_keeps_identity() {
        let mut record = ProjectRecord::new("Untitled", "{}".to_string(), String::new(), 10);
        let id = record.id.clone();
        record.update("{\"objects\":[]}".to_string(), "AAAA".to_string(), 20);
        assert_eq!(record.id, id);
        assert_eq!(record.created_at, 10);
        assert_eq!(record.updated_at, 20);

        let json = record.to_json().unwrap();
        assert!(json.contains("createdAt"));
        assert_eq!(ProjectRecord::from_json(&json).unwrap(), record);
    }
}
