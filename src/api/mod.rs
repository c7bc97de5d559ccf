pub mod auth;
pub mod group;
pub mod home;
pub mod post;
pub mod profile;

use actix_web::{http::header, web, HttpResponse};

/// Registers every page route. Literal segments come before the `{slug}`
/// patterns they would otherwise be captured by.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(home::index))
        .service(
            web::resource("/reg/")
                .route(web::get().to(auth::signup_page))
                .route(web::post().to(auth::signup)),
        )
        .service(
            web::resource("/login/")
                .route(web::get().to(auth::login_page))
                .route(web::post().to(auth::login)),
        )
        .route("/logout/", web::get().to(auth::logout))
        .route("/profile/", web::get().to(profile::own_profile))
        .service(
            web::resource("/profile/edit/")
                .route(web::get().to(profile::edit_page))
                .route(web::post().to(profile::edit)),
        )
        .route("/profile/{pk:\\d+}/", web::get().to(profile::profile))
        .route("/group/list/", web::get().to(group::list))
        .service(
            web::resource("/group/create/")
                .route(web::get().to(group::create_page))
                .route(web::post().to(group::create)),
        )
        .service(
            web::resource("/group/{slug}/post/create/")
                .route(web::get().to(post::create_page))
                .route(web::post().to(post::create)),
        )
        .route("/group/{slug}/post/{post_slug}/", web::get().to(post::detail))
        .service(
            web::resource("/group/{slug}/join/")
                .route(web::get().to(group::join))
                .route(web::post().to(group::join)),
        )
        .service(
            web::resource("/group/{slug}/left/")
                .route(web::get().to(group::leave))
                .route(web::post().to(group::leave)),
        )
        .service(
            web::resource("/group/{slug}/delete/")
                .route(web::get().to(group::delete_page))
                .route(web::post().to(group::delete)),
        )
        .service(
            web::resource("/group/{slug}/update/")
                .route(web::get().to(group::update_page))
                .route(web::post().to(group::update)),
        )
        .route("/group/{slug}/", web::get().to(group::detail));
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
