use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use super::{required, structural, FieldErrors};
use crate::db::iexact;
use crate::entities::group;
use crate::error::AppResult;
use crate::models::{GroupData, GroupForm};

/// Slugs that would shadow fixed `/group/...` routes.
pub const RESERVED_GROUP_SLUGS: [&str; 2] = ["create", "list"];

pub fn is_reserved_slug(slug: &str) -> bool {
    RESERVED_GROUP_SLUGS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(slug))
}

/// Letters, numbers, underscores or hyphens only.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Group create/update form. `editing` is the group being updated, which is
/// excluded from the slug uniqueness check.
pub async fn validate_group<C>(
    db: &C,
    form: &GroupForm,
    editing: Option<&group::Model>,
) -> AppResult<Result<GroupData, FieldErrors>>
where
    C: ConnectionTrait,
{
    let mut errors = structural(form);

    let name = required(&mut errors, "name", &form.name);

    let slug = form.slug.trim();
    let slug = if slug.is_empty() {
        None
    } else if is_reserved_slug(slug) {
        errors.add("slug", "The URL cannot be 'create' or 'list'.");
        None
    } else if !is_valid_slug(slug) {
        errors.add(
            "slug",
            "Enter a valid URL consisting of letters, numbers, underscores or hyphens.",
        );
        None
    } else {
        let mut query = group::Entity::find().filter(iexact(group::Entity, group::Column::Slug, slug));
        if let Some(current) = editing {
            query = query.filter(group::Column::Id.ne(current.id));
        }
        if query.one(db).await?.is_some() {
            errors.add("slug", "A group with this URL already exists.");
        }
        Some(slug.to_string())
    };

    Ok(errors.into_result(GroupData {
        name,
        slug,
        description: form.description.trim().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_slugs_match_in_any_case() {
        assert!(is_reserved_slug("create"));
        assert!(is_reserved_slug("CrEaTe"));
        assert!(is_reserved_slug("LIST"));
        assert!(!is_reserved_slug("creators"));
        assert!(!is_reserved_slug("delete"));
    }

    #[test]
    fn slug_charset() {
        assert!(is_valid_slug("rust_users-2024"));
        assert!(!is_valid_slug("rust users"));
        assert!(!is_valid_slug("rust.users"));
        assert!(!is_valid_slug(""));
    }
}
