use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entities::group;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GroupForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub name: String,
    #[validate(length(max = 160, message = "Ensure this value has at most 160 characters."))]
    pub slug: String,
    pub description: String,
}

impl GroupForm {
    pub fn from_model(group: &group::Model) -> Self {
        GroupForm {
            name: group.name.clone(),
            slug: group.slug().to_string(),
            description: group.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupData {
    pub name: String,
    /// `None` when the submitter left the slug blank.
    pub slug: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub photo: String,
    pub url: String,
    pub date_create: chrono::DateTime<chrono::Utc>,
}

impl From<group::Model> for GroupSummary {
    fn from(group: group::Model) -> Self {
        GroupSummary {
            url: group.url(),
            slug: group.slug().to_string(),
            name: group.name,
            description: group.description,
            photo: group.photo,
            date_create: group.date_create,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupDetail {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub photo: String,
    pub date_create: chrono::DateTime<chrono::Utc>,
    pub url: String,
    pub update_url: String,
    pub delete_url: String,
    pub member_count: u64,
}
