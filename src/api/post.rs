use actix_web::{web, HttpResponse};
use tera::Tera;

use super::redirect;
use crate::auth::{require_membership, Access, CurrentUser, MaybeUser};
use crate::db::DbPool;
use crate::entities::group;
use crate::error::AppResult;
use crate::models::{GroupSummary, PostForm};
use crate::services;
use crate::templates;
use crate::validation::{validate_post, FieldErrors};

fn create_form(
    tera: &Tera,
    current: &CurrentUser,
    group: group::Model,
    form: &PostForm,
    errors: &FieldErrors,
) -> AppResult<HttpResponse> {
    let mut context = templates::context(Some(current));
    context.insert("group", &GroupSummary::from(group));
    context.insert("form", form);
    context.insert("errors", errors);
    templates::render(tera, "post_create.html", &context)
}

pub async fn create_page(
    current: CurrentUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    match require_membership(pool.get_ref(), &current.account, &path).await? {
        Access::Allowed(group) => {
            create_form(&tera, &current, group, &PostForm::default(), &FieldErrors::new())
        }
        Access::Denied { redirect_to } => Ok(redirect(&redirect_to)),
    }
}

pub async fn create(
    current: CurrentUser,
    path: web::Path<String>,
    form: web::Form<PostForm>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let group = match require_membership(pool.get_ref(), &current.account, &path).await? {
        Access::Allowed(group) => group,
        Access::Denied { redirect_to } => return Ok(redirect(&redirect_to)),
    };

    let form = form.into_inner();
    let data = match validate_post(&form) {
        Ok(data) => data,
        Err(errors) => return create_form(&tera, &current, group, &form, &errors),
    };

    let post = services::post::create(pool.get_ref(), &group, &current.account, data).await?;
    Ok(redirect(&post.url(group.slug())))
}

pub async fn detail(
    MaybeUser(user): MaybeUser,
    path: web::Path<(String, String)>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let (group_slug, post_slug) = path.into_inner();
    let db = pool.get_ref();
    let (group, post) = services::post::find_in_group(db, &group_slug, &post_slug).await?;
    let post = services::post::view(db, post, group.slug()).await?;

    let mut context = templates::context(user.as_ref());
    context.insert("group", &GroupSummary::from(group));
    context.insert("post", &post);
    templates::render(&tera, "post_detail.html", &context)
}
