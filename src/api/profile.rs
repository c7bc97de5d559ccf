use actix_web::{http::header, web, HttpResponse};
use tera::Tera;

use super::redirect;
use crate::auth::{login_cookie, CurrentUser};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::ProfileEditForm;
use crate::services;
use crate::templates;
use crate::validation::{validate_profile_edit, FieldErrors};

async fn show(
    pool: &DbPool,
    tera: &Tera,
    current: &CurrentUser,
    account_id: Option<i64>,
) -> AppResult<HttpResponse> {
    let profile = services::account::profile_view(pool, account_id, current).await?;
    let mut context = templates::context(Some(current));
    context.insert("profile", &profile);
    templates::render(tera, "profile_info.html", &context)
}

fn edit_form(
    tera: &Tera,
    current: &CurrentUser,
    form: &ProfileEditForm,
    errors: &FieldErrors,
) -> AppResult<HttpResponse> {
    let mut context = templates::context(Some(current));
    context.insert("form", form);
    context.insert("errors", errors);
    templates::render(tera, "profile_edit.html", &context)
}

pub async fn own_profile(
    current: CurrentUser,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    show(&pool, &tera, &current, None).await
}

/// Unknown ids show the viewer's own profile.
pub async fn profile(
    current: CurrentUser,
    path: web::Path<i64>,
    pool: web::Data<DbPool>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    show(&pool, &tera, &current, Some(path.into_inner())).await
}

pub async fn edit_page(current: CurrentUser, tera: web::Data<Tera>) -> AppResult<HttpResponse> {
    let form = ProfileEditForm::from_models(&current.user, &current.account);
    edit_form(&tera, &current, &form, &FieldErrors::new())
}

pub async fn edit(
    current: CurrentUser,
    form: web::Form<ProfileEditForm>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();
    let data = match validate_profile_edit(pool.get_ref(), &current.user, &form).await? {
        Ok(data) => data,
        Err(errors) => return edit_form(&tera, &current, &form, &errors),
    };

    let (user, password_changed) = services::account::apply_profile_edit(
        pool.get_ref(),
        &current,
        data,
        config.security.password_hash_cost,
    )
    .await?;

    if !password_changed {
        return Ok(redirect("/profile/"));
    }

    // the old token predates the change and is no longer accepted
    let cookie = login_cookie(&user, &config)?;
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/profile/"))
        .cookie(cookie)
        .finish())
}
