use actix_web::{http::header, web, HttpResponse};
use tera::Tera;

use super::redirect;
use crate::auth::{login_cookie, logout_cookie, safe_next, CurrentUser, MaybeUser};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{LoginForm, NextQuery, SignupForm};
use crate::services;
use crate::templates;
use crate::validation::{validate_login, validate_signup, FieldErrors, NON_FIELD_ERRORS};

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

fn signup_form(tera: &Tera, form: &SignupForm, errors: &FieldErrors) -> AppResult<HttpResponse> {
    let mut context = templates::context(None);
    context.insert("form", form);
    context.insert("errors", errors);
    templates::render(tera, "signup.html", &context)
}

fn login_form(
    tera: &Tera,
    form: &LoginForm,
    errors: &FieldErrors,
    next: &str,
) -> AppResult<HttpResponse> {
    let mut context = templates::context(None);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("next", next);
    templates::render(tera, "login.html", &context)
}

pub async fn signup_page(
    MaybeUser(user): MaybeUser,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    if user.is_some() {
        return Ok(redirect("/"));
    }
    signup_form(&tera, &SignupForm::default(), &FieldErrors::new())
}

pub async fn signup(
    MaybeUser(user): MaybeUser,
    form: web::Form<SignupForm>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    if user.is_some() {
        return Ok(redirect("/"));
    }

    let form = form.into_inner();
    let data = match validate_signup(pool.get_ref(), &form).await? {
        Ok(data) => data,
        Err(errors) => return signup_form(&tera, &form, &errors),
    };

    let user =
        services::account::register(pool.get_ref(), data, config.security.password_hash_cost)
            .await?;
    let cookie = login_cookie(&user, &config)?;

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish())
}

pub async fn login_page(
    MaybeUser(user): MaybeUser,
    query: web::Query<NextQuery>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    if user.is_some() {
        return Ok(redirect("/"));
    }
    let next = safe_next(query.next.as_deref());
    login_form(&tera, &LoginForm::default(), &FieldErrors::new(), next)
}

pub async fn login(
    MaybeUser(user): MaybeUser,
    query: web::Query<NextQuery>,
    form: web::Form<LoginForm>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    if user.is_some() {
        return Ok(redirect("/"));
    }

    let next = safe_next(query.next.as_deref());
    let form = form.into_inner();
    let credentials = match validate_login(&form) {
        Ok(credentials) => credentials,
        Err(errors) => return login_form(&tera, &form, &errors, next),
    };

    let Some(user) = services::account::authenticate(pool.get_ref(), &credentials).await? else {
        log::warn!("Rejected login for {:?}", credentials.username);
        let mut errors = FieldErrors::new();
        errors.add(NON_FIELD_ERRORS, INVALID_LOGIN);
        return login_form(&tera, &form, &errors, next);
    };

    let cookie = login_cookie(&user, &config)?;
    log::info!("User {} logged in", user.id);

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, next))
        .cookie(cookie)
        .finish())
}

pub async fn logout(current: CurrentUser, config: web::Data<Config>) -> HttpResponse {
    log::info!("User {} logged out", current.user.id);
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(logout_cookie(&config))
        .finish()
}
