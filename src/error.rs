use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Login required to access {next}")]
    LoginRequired { next: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn login_url(next: &str) -> String {
        format!("/login/?next={}", urlencoding::encode(next))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::Database(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::NotFound => HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(crate::templates::NOT_FOUND_PAGE),
            AppError::LoginRequired { next } => HttpResponse::Found()
                .append_header((header::LOCATION, AppError::login_url(next)))
                .finish(),
            e => {
                log::error!("Request failed: {:?}", e);
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Internal server error")
            }
        }
    }
}
