use actix_web::{
    middleware::{Logger, NormalizePath, TrailingSlash},
    web, App, HttpServer,
};

use community_web_service::{api, config::Config, db, templates};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("Failed to load configuration");

    let pool = db::create_pool(&config)
        .await
        .expect("Failed to open the database");
    log::info!("Database ready at {}", config.database.url);

    let tera = templates::load().expect("Failed to parse templates");

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    log::info!("Starting server on {}:{}", server_host, server_port);

    let config = web::Data::new(config);
    let pool = web::Data::new(pool);
    let tera = web::Data::new(tera);

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Always))
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(pool.clone())
            .app_data(tera.clone())
            .configure(api::configure)
    })
    .bind((server_host, server_port))?
    .run()
    .await
}
