use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::slug::{candidate, group_fallback_slug, slugify, truncate};
use crate::db::iexact;
use crate::entities::{account, account_group, group, post, post_tag};
use crate::error::{AppError, AppResult};
use crate::models::{GroupData, GroupDetail, GroupSummary};
use crate::pagination::{num_pages, Page, PageSelector};
use crate::validation::is_reserved_slug;

const MAX_SLUG_LENGTH: usize = 160;

/// Case-insensitive slug lookup; `NotFound` when nothing matches.
pub async fn find_by_slug<C>(db: &C, slug: &str) -> AppResult<group::Model>
where
    C: ConnectionTrait,
{
    group::Entity::find()
        .filter(iexact(group::Entity, group::Column::Slug, slug))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_page<C>(
    db: &C,
    selector: PageSelector,
    per_page: u64,
) -> AppResult<Page<GroupSummary>>
where
    C: ConnectionTrait,
{
    let count = group::Entity::find().count(db).await?;
    let num_pages = num_pages(count, per_page);
    let number = selector.resolve(num_pages);

    let groups = group::Entity::find()
        .order_by_desc(group::Column::DateCreate)
        .order_by_desc(group::Column::Id)
        .offset((number - 1) * per_page)
        .limit(per_page)
        .all(db)
        .await?;

    Ok(Page::new(
        groups.into_iter().map(GroupSummary::from).collect(),
        number,
        num_pages,
    ))
}

pub async fn create<C>(db: &C, data: GroupData, creator: &account::Model) -> AppResult<group::Model>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let slug = match data.slug {
        Some(slug) => Some(slug),
        None => derived_slug(&txn, &data.name).await?,
    };

    let mut group = group::ActiveModel {
        name: Set(data.name),
        slug: Set(slug),
        description: Set(data.description),
        photo: Set(group::DEFAULT_PHOTO.to_string()),
        date_create: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if group.slug.is_none() {
        let slug = free_slug(&txn, &group_fallback_slug(group.id), group.id).await?;
        let mut active: group::ActiveModel = group.into();
        active.slug = Set(Some(slug));
        group = active.update(&txn).await?;
    }

    account_group::ActiveModel {
        account_id: Set(creator.id),
        group_id: Set(group.id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    log::info!("Account {} created group {}", creator.id, group.slug());
    Ok(group)
}

/// A blank slug keeps the current one.
pub async fn update<C>(db: &C, group: group::Model, data: GroupData) -> AppResult<group::Model>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let mut active: group::ActiveModel = group.into();
    active.name = Set(data.name);
    active.description = Set(data.description);
    if let Some(slug) = data.slug {
        active.slug = Set(Some(slug));
    }
    let group = active.update(&txn).await?;

    txn.commit().await?;

    log::info!("Updated group {}", group.slug());
    Ok(group)
}

/// Removes the group along with its posts, their tag links and memberships.
pub async fn delete<C>(db: &C, group: group::Model) -> AppResult<()>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let post_ids: Vec<i64> = post::Entity::find()
        .select_only()
        .column(post::Column::Id)
        .filter(post::Column::GroupId.eq(group.id))
        .into_tuple()
        .all(&txn)
        .await?;

    post_tag::Entity::delete_many()
        .filter(post_tag::Column::PostId.is_in(post_ids))
        .exec(&txn)
        .await?;
    post::Entity::delete_many()
        .filter(post::Column::GroupId.eq(group.id))
        .exec(&txn)
        .await?;
    account_group::Entity::delete_many()
        .filter(account_group::Column::GroupId.eq(group.id))
        .exec(&txn)
        .await?;

    let slug = group.slug().to_string();
    group.delete(&txn).await?;

    txn.commit().await?;

    log::info!("Deleted group {}", slug);
    Ok(())
}

/// Adds `account` to the group; joining twice changes nothing.
pub async fn join<C>(db: &C, group: &group::Model, account: &account::Model) -> AppResult<bool>
where
    C: TransactionTrait,
{
    let txn = db.begin().await?;

    let existing = account_group::Entity::find_by_id((account.id, group.id))
        .one(&txn)
        .await?;
    let joined = existing.is_none();
    if joined {
        account_group::ActiveModel {
            account_id: Set(account.id),
            group_id: Set(group.id),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    if joined {
        log::info!("Account {} joined group {}", account.id, group.slug());
    }
    Ok(joined)
}

/// Removes `account` from the group; leaving when not a member is a no-op.
pub async fn leave<C>(db: &C, group: &group::Model, account: &account::Model) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let result = account_group::Entity::delete_by_id((account.id, group.id))
        .exec(db)
        .await?;

    let left = result.rows_affected > 0;
    if left {
        log::info!("Account {} left group {}", account.id, group.slug());
    }
    Ok(left)
}

pub async fn is_member<C>(db: &C, group: &group::Model, account: &account::Model) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    Ok(account_group::Entity::find_by_id((account.id, group.id))
        .one(db)
        .await?
        .is_some())
}

pub async fn detail<C>(db: &C, group: &group::Model) -> AppResult<GroupDetail>
where
    C: ConnectionTrait,
{
    let member_count = group.find_related(account_group::Entity).count(db).await?;

    Ok(GroupDetail {
        name: group.name.clone(),
        slug: group.slug().to_string(),
        description: group.description.clone(),
        photo: group.photo.clone(),
        date_create: group.date_create,
        url: group.url(),
        update_url: group.update_url(),
        delete_url: group.delete_url(),
        member_count,
    })
}

/// Slug derived from the name, or `None` when it is empty, reserved or taken.
async fn derived_slug<C>(db: &C, name: &str) -> AppResult<Option<String>>
where
    C: ConnectionTrait,
{
    let slug = truncate(&slugify(name), MAX_SLUG_LENGTH);
    if slug.is_empty() || is_reserved_slug(&slug) || slug_taken(db, &slug, None).await? {
        return Ok(None);
    }
    Ok(Some(slug))
}

/// First of `base`, `base-2`, ... not used by another group.
async fn free_slug<C>(db: &C, base: &str, own_id: i64) -> AppResult<String>
where
    C: ConnectionTrait,
{
    let mut attempt = 1;
    loop {
        let slug = candidate(base, attempt);
        if !slug_taken(db, &slug, Some(own_id)).await? {
            return Ok(slug);
        }
        attempt += 1;
    }
}

async fn slug_taken<C>(db: &C, slug: &str, exclude: Option<i64>) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let mut query = group::Entity::find().filter(iexact(group::Entity, group::Column::Slug, slug));
    if let Some(id) = exclude {
        query = query.filter(group::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}
