use sea_orm::{ConnectionTrait, EntityTrait};

use crate::entities::{account, account_group, group};
use crate::error::AppResult;
use crate::services;

#[derive(Debug)]
pub enum Access {
    Allowed(group::Model),
    /// Non-members are sent back to the group page instead of getting a 403.
    Denied { redirect_to: String },
}

/// Resolves the group by slug (case-insensitive, 404 when missing) and checks
/// that `account` belongs to it.
pub async fn require_membership<C>(
    db: &C,
    account: &account::Model,
    slug: &str,
) -> AppResult<Access>
where
    C: ConnectionTrait,
{
    let group = services::group::find_by_slug(db, slug).await?;

    let membership = account_group::Entity::find_by_id((account.id, group.id))
        .one(db)
        .await?;

    if membership.is_some() {
        Ok(Access::Allowed(group))
    } else {
        log::warn!(
            "Account {} is not a member of group {}; redirecting",
            account.id,
            group.slug()
        );
        Ok(Access::Denied {
            redirect_to: group.url(),
        })
    }
}
