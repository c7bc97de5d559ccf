use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};

use crate::auth::{create_token, Claims};
use crate::config::Config;
use crate::entities::user;

pub fn login_cookie(user: &user::Model, config: &Config) -> Result<Cookie<'static>, anyhow::Error> {
    let claims = Claims::for_user(user, config.session.expiration_hours);
    let token = create_token(&claims, &config.session.secret)?;

    Ok(Cookie::build(config.session.cookie_name.clone(), token)
        .path("/")
        .http_only(true)
        .secure(config.session.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(config.session.expiration_hours))
        .finish())
}

pub fn logout_cookie(config: &Config) -> Cookie<'static> {
    let mut cookie = Cookie::build(config.session.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}

/// Only same-site paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => url,
        _ => "/",
    }
}
