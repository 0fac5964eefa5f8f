//! Story render data pushed by the host.
//!
//! This is the parsed payload handed to the video renderer. The renderer
//! itself lives outside this crate.

use serde::{Deserialize, Serialize};

/// One detail slide: an image, a caption, or both.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slide {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A welcome story: a title card, detail slides, and a closing card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default)]
    pub slides: Vec<Slide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_hire_name: Option<String>,
}

impl StoryData {
    /// Image for the title card: the main image, else the first slide's.
    pub fn cover_image(&self) -> Option<&str> {
        self.main_image
            .as_deref()
            .or_else(|| self.slides.first().and_then(|slide| slide.image.as_deref()))
    }

    /// Closing line, personalized when a non-blank name is present.
    pub fn call_to_action(&self) -> String {
        match self
            .new_hire_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            Some(name) => format!("Welcome to Postman, {name}!"),
            None => "Welcome to Postman!".to_string(),
        }
    }

    /// Compact description for logs and CLI output.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "title": self.title,
            "slides": self.slides.len(),
            "coverImage": self.cover_image(),
            "callToAction": self.call_to_action(),
        })
    }
}
