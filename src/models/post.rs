use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PostForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub title: String,
    pub body: String,
    /// Comma separated.
    pub tags: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostData {
    pub title: String,
    pub body: String,
    /// Deduplicated case-insensitively, first-seen casing kept.
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TagView {
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub url: String,
    pub date_pub: chrono::DateTime<chrono::Utc>,
    pub author: String,
    pub author_url: String,
    pub tags: Vec<TagView>,
}
