use super::{required, structural, FieldErrors};
use crate::models::{PostData, PostForm};

pub const MAX_TAG_LENGTH: usize = 40;

pub fn validate_post(form: &PostForm) -> Result<PostData, FieldErrors> {
    let mut errors = structural(form);

    let title = required(&mut errors, "title", &form.title);
    let tags = parse_tags(&form.tags);
    if let Some(tag) = tags.iter().find(|t| t.chars().count() > MAX_TAG_LENGTH) {
        errors.add(
            "tags",
            format!("Tag '{}' is longer than {} characters.", tag, MAX_TAG_LENGTH),
        );
    }

    errors.into_result(PostData {
        title,
        body: form.body.clone(),
        tags,
    })
}

/// Splits a comma separated tag field. Tokens are trimmed, empty ones dropped
/// and repeats removed case-insensitively, keeping the first spelling.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let folded = token.to_lowercase();
        if !tags.iter().any(|seen| seen.to_lowercase() == folded) {
            tags.push(token.to_string());
        }
    }
    tags
}
