use crate::auth::verify_token;
use crate::config::Config;
use crate::db::DbPool;
use crate::entities::{account, user};
use crate::error::AppError;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: user::Model,
    pub account: account::Model,
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let next = match req.uri().path_and_query() {
            Some(pq) => pq.as_str().to_string(),
            None => req.path().to_string(),
        };
        let config = req.app_data::<web::Data<Config>>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();
        let token = config
            .as_ref()
            .and_then(|c| req.cookie(&c.session.cookie_name))
            .map(|cookie| cookie.value().to_string());

        Box::pin(async move {
            let login_required = || AppError::LoginRequired { next: next.clone() };

            let (Some(config), Some(pool), Some(token)) = (config, pool, token) else {
                return Err(login_required());
            };

            let claims = match verify_token(&token, &config.session.secret) {
                Ok(claims) => claims,
                Err(e) => {
                    log::debug!("Rejected session token: {:?}", e);
                    return Err(login_required());
                }
            };
            let Some(user_id) = claims.user_id() else {
                return Err(login_required());
            };

            let Some(user) = user::Entity::find_by_id(user_id).one(pool.get_ref()).await? else {
                return Err(login_required());
            };
            if claims.is_stale_for(&user) {
                log::debug!("Session of user {} predates its password change", user.id);
                return Err(login_required());
            }

            let account = account::Entity::find()
                .filter(account::Column::UserId.eq(user.id))
                .one(pool.get_ref())
                .await?
                .ok_or_else(|| anyhow::anyhow!("User {} has no account", user.id))?;

            Ok(CurrentUser { user, account })
        })
    }
}

/// Optional login. Only a missing or rejected session becomes `None`;
/// storage failures during the lookup are still errors.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut actix_web::dev::Payload) -> Self::Future {
        let lookup = CurrentUser::from_request(req, payload);
        Box::pin(async move {
            match lookup.await {
                Ok(current) => Ok(MaybeUser(Some(current))),
                Err(AppError::LoginRequired { .. }) => Ok(MaybeUser(None)),
                Err(e) => Err(e),
            }
        })
    }
}
