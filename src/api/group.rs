use actix_web::{web, HttpResponse};
use serde::Serialize;
use tera::Tera;

use super::redirect;
use crate::auth::{require_membership, Access, CurrentUser, MaybeUser};
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::group;
use crate::error::{AppError, AppResult};
use crate::models::{GroupForm, PageQuery, PostView};
use crate::pagination::PageSelector;
use crate::services;
use crate::templates::{self, COLORS};
use crate::validation::{validate_group, FieldErrors};

#[derive(Serialize)]
struct PostCard {
    #[serde(flatten)]
    post: PostView,
    color: &'static str,
}

async fn edit_form(
    pool: &DbPool,
    tera: &Tera,
    current: &CurrentUser,
    group: &group::Model,
    form: &GroupForm,
    errors: &FieldErrors,
) -> AppResult<HttpResponse> {
    let mut context = templates::context(Some(current));
    context.insert("group", &services::group::detail(pool, group).await?);
    context.insert("form", form);
    context.insert("errors", errors);
    templates::render(tera, "group_edit.html", &context)
}

fn create_form(
    tera: &Tera,
    current: &CurrentUser,
    form: &GroupForm,
    errors: &FieldErrors,
) -> AppResult<HttpResponse> {
    let mut context = templates::context(Some(current));
    context.insert("form", form);
    context.insert("errors", errors);
    templates::render(tera, "group_create.html", &context)
}

pub async fn list(
    MaybeUser(user): MaybeUser,
    query: web::Query<PageQuery>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let selector = PageSelector::from_query(query.page.as_deref()).map_err(|e| {
        log::debug!("{}", e);
        AppError::NotFound
    })?;
    let page =
        services::group::list_page(pool.get_ref(), selector, config.pagination.groups_per_page)
            .await?;

    let mut context = templates::context(user.as_ref());
    context.insert("page", &page);
    templates::render(&tera, "group_list.html", &context)
}

pub async fn detail(
    MaybeUser(user): MaybeUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let db = pool.get_ref();
    let group = services::group::find_by_slug(db, &path).await?;

    let is_member = match &user {
        Some(current) => services::group::is_member(db, &group, &current.account).await?,
        None => false,
    };
    let posts: Vec<PostCard> = services::post::for_group(db, &group)
        .await?
        .into_iter()
        .zip(COLORS.iter().cycle())
        .map(|(post, color)| PostCard { post, color })
        .collect();

    let mut context = templates::context(user.as_ref());
    context.insert("group", &services::group::detail(db, &group).await?);
    context.insert("posts", &posts);
    context.insert("colors", &COLORS);
    context.insert("is_member", &is_member);
    templates::render(&tera, "group_info.html", &context)
}

pub async fn create_page(current: CurrentUser, tera: web::Data<Tera>) -> AppResult<HttpResponse> {
    create_form(&tera, &current, &GroupForm::default(), &FieldErrors::new())
}

pub async fn create(
    current: CurrentUser,
    form: web::Form<GroupForm>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let data = match validate_group(pool.get_ref(), &form, None).await? {
        Ok(data) => data,
        Err(errors) => return create_form(&tera, &current, &form, &errors),
    };

    let group = services::group::create(pool.get_ref(), data, &current.account).await?;
    Ok(redirect(&group.url()))
}

pub async fn update_page(
    current: CurrentUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let group = match require_membership(pool.get_ref(), &current.account, &path).await? {
        Access::Allowed(group) => group,
        Access::Denied { redirect_to } => return Ok(redirect(&redirect_to)),
    };

    let form = GroupForm::from_model(&group);
    edit_form(&pool, &tera, &current, &group, &form, &FieldErrors::new()).await
}

pub async fn update(
    current: CurrentUser,
    path: web::Path<String>,
    form: web::Form<GroupForm>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let group = match require_membership(pool.get_ref(), &current.account, &path).await? {
        Access::Allowed(group) => group,
        Access::Denied { redirect_to } => return Ok(redirect(&redirect_to)),
    };

    let form = form.into_inner();
    let data = match validate_group(pool.get_ref(), &form, Some(&group)).await? {
        Ok(data) => data,
        Err(errors) => return edit_form(&pool, &tera, &current, &group, &form, &errors).await,
    };

    let group = services::group::update(pool.get_ref(), group, data).await?;
    Ok(redirect(&group.url()))
}

pub async fn delete_page(
    current: CurrentUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let group = match require_membership(pool.get_ref(), &current.account, &path).await? {
        Access::Allowed(group) => group,
        Access::Denied { redirect_to } => return Ok(redirect(&redirect_to)),
    };

    let mut context = templates::context(Some(&current));
    context.insert("group", &services::group::detail(pool.get_ref(), &group).await?);
    templates::render(&tera, "obj_delete_confirm.html", &context)
}

pub async fn delete(
    current: CurrentUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group = match require_membership(pool.get_ref(), &current.account, &path).await? {
        Access::Allowed(group) => group,
        Access::Denied { redirect_to } => return Ok(redirect(&redirect_to)),
    };

    services::group::delete(pool.get_ref(), group).await?;
    Ok(redirect("/group/list/"))
}

pub async fn join(
    current: CurrentUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group = services::group::find_by_slug(pool.get_ref(), &path).await?;
    services::group::join(pool.get_ref(), &group, &current.account).await?;
    Ok(redirect(&group.url()))
}

pub async fn leave(
    current: CurrentUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let group = services::group::find_by_slug(pool.get_ref(), &path).await?;
    services::group::leave(pool.get_ref(), &group, &current.account).await?;
    Ok(redirect(&group.url()))
}
