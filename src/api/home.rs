use actix_web::{web, HttpResponse};
use tera::Tera;

use crate::auth::MaybeUser;
use crate::error::AppResult;
use crate::templates;

pub async fn index(
    MaybeUser(user): MaybeUser,
    tera: web::Data<Tera>,
) -> AppResult<HttpResponse> {
    let context = templates::context(user.as_ref());
    templates::render(&tera, "index.html", &context)
}
