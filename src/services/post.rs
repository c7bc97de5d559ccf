use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::collections::HashSet;

use super::account::username_of;
use super::slug::{candidate, post_slug_base, slugify, tag_fallback_slug, truncate};
use crate::db::iexact;
use crate::entities::{account, group, post, post_tag, tag};
use crate::error::{AppError, AppResult};
use crate::models::{PostData, PostView, TagView};

const MAX_TAG_SLUG_LENGTH: usize = 50;

pub async fn create<C>(
    db: &C,
    group: &group::Model,
    author: &account::Model,
    data: PostData,
) -> AppResult<post::Model>
where
    C: TransactionTrait,
{
    let now = Utc::now();
    let txn = db.begin().await?;

    let slug = unique_post_slug(&txn, &post_slug_base(&data.title, now.timestamp())).await?;
    let post = post::ActiveModel {
        title: Set(data.title),
        author_id: Set(author.id),
        group_id: Set(group.id),
        slug: Set(slug),
        body: Set(data.body),
        date_pub: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut attached = HashSet::new();
    for title in &data.tags {
        let tag = find_or_create_tag(&txn, title).await?;
        if attached.insert(tag.id) {
            post_tag::ActiveModel {
                post_id: Set(post.id),
                tag_id: Set(tag.id),
            }
            .insert(&txn)
            .await?;
        }
    }

    txn.commit().await?;

    log::info!(
        "Account {} posted {} in group {} with {} tag(s)",
        author.id,
        post.slug,
        group.slug(),
        attached.len()
    );
    Ok(post)
}

/// Post addressed through its group; both slugs match case-insensitively.
pub async fn find_in_group<C>(
    db: &C,
    group_slug: &str,
    post_slug: &str,
) -> AppResult<(group::Model, post::Model)>
where
    C: ConnectionTrait,
{
    let group = super::group::find_by_slug(db, group_slug).await?;
    let post = post::Entity::find()
        .filter(post::Column::GroupId.eq(group.id))
        .filter(iexact(post::Entity, post::Column::Slug, post_slug))
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok((group, post))
}

pub async fn for_group<C>(db: &C, group: &group::Model) -> AppResult<Vec<PostView>>
where
    C: ConnectionTrait,
{
    let posts = post::Entity::find()
        .filter(post::Column::GroupId.eq(group.id))
        .order_by_desc(post::Column::DatePub)
        .order_by_desc(post::Column::Id)
        .all(db)
        .await?;

    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        views.push(view(db, post, group.slug()).await?);
    }
    Ok(views)
}

pub async fn view<C>(db: &C, post: post::Model, group_slug: &str) -> AppResult<PostView>
where
    C: ConnectionTrait,
{
    let tags = post
        .find_related(tag::Entity)
        .order_by_asc(tag::Column::Title)
        .all(db)
        .await?
        .into_iter()
        .map(|t| TagView {
            title: t.title,
            slug: t.slug,
        })
        .collect();

    Ok(PostView {
        url: post.url(group_slug),
        author: username_of(db, post.author_id).await?,
        author_url: format!("/profile/{}/", post.author_id),
        title: post.title,
        slug: post.slug,
        body: post.body,
        date_pub: post.date_pub,
        tags,
    })
}

/// Existing tag with the same title (case-insensitive) or slug, else a new one.
async fn find_or_create_tag<C>(db: &C, title: &str) -> AppResult<tag::Model>
where
    C: ConnectionTrait,
{
    let by_title = tag::Entity::find()
        .filter(iexact(tag::Entity, tag::Column::Title, title))
        .order_by_asc(tag::Column::Id)
        .one(db)
        .await?;
    if let Some(tag) = by_title {
        return Ok(tag);
    }

    let slug = truncate(&slugify(title), MAX_TAG_SLUG_LENGTH);
    if !slug.is_empty() {
        let by_slug = tag::Entity::find()
            .filter(tag::Column::Slug.eq(slug.as_str()))
            .one(db)
            .await?;
        if let Some(tag) = by_slug {
            return Ok(tag);
        }
    }

    let tag = tag::ActiveModel {
        title: Set(title.to_string()),
        slug: Set(slug),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if !tag.slug.is_empty() {
        return Ok(tag);
    }
    let fallback = tag_fallback_slug(tag.id);
    let mut active: tag::ActiveModel = tag.into();
    active.slug = Set(fallback);
    Ok(active.update(db).await?)
}

async fn unique_post_slug<C>(db: &C, base: &str) -> AppResult<String>
where
    C: ConnectionTrait,
{
    let mut attempt = 1;
    loop {
        let slug = candidate(base, attempt);
        let taken = post::Entity::find()
            .filter(iexact(post::Entity, post::Column::Slug, &slug))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Ok(slug);
        }
        attempt += 1;
    }
}
