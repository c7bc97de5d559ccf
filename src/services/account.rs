use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::db::iexact;
use crate::entities::{account, group, user};
use crate::error::{AppError, AppResult};
use crate::models::{GroupLink, LoginData, ProfileEditData, ProfileView, SignupData};

pub async fn register<C>(db: &C, data: SignupData, hash_cost: u32) -> AppResult<user::Model>
where
    C: TransactionTrait,
{
    let password_hash = hash_password(&data.password, hash_cost)?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let user = user::ActiveModel {
        username: Set(data.user.username),
        email: Set(data.user.email),
        password_hash: Set(password_hash),
        first_name: Set(data.user.first_name),
        last_name: Set(data.user.last_name),
        password_changed_at: Set(now.timestamp()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    account::ActiveModel {
        user_id: Set(user.id),
        age: Set(data.account.age),
        views: Set(data.account.views),
        photo: Set(account::DEFAULT_PHOTO.to_string()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    log::info!("Registered user {} (id {})", user.username, user.id);
    Ok(user)
}

/// Credential check; `None` for an unknown username or a wrong password.
pub async fn authenticate<C>(db: &C, login: &LoginData) -> AppResult<Option<user::Model>>
where
    C: ConnectionTrait,
{
    let user = user::Entity::find()
        .filter(iexact(user::Entity, user::Column::Username, &login.username))
        .one(db)
        .await?;

    Ok(user.filter(|u| verify_password(&login.password, &u.password_hash)))
}

/// Persists a validated profile edit. Returns the updated user and whether the
/// password changed, in which case older sessions stop being accepted.
pub async fn apply_profile_edit<C>(
    db: &C,
    current: &CurrentUser,
    data: ProfileEditData,
    hash_cost: u32,
) -> AppResult<(user::Model, bool)>
where
    C: TransactionTrait,
{
    let password_hash = match &data.new_password {
        Some(password) => Some(hash_password(password, hash_cost)?),
        None => None,
    };
    let password_changed = password_hash.is_some();

    let txn = db.begin().await?;

    let mut active: user::ActiveModel = current.user.clone().into();
    active.username = Set(data.user.username);
    active.email = Set(data.user.email);
    active.first_name = Set(data.user.first_name);
    active.last_name = Set(data.user.last_name);
    if let Some(hash) = password_hash {
        active.password_hash = Set(hash);
        active.password_changed_at = Set(Utc::now().timestamp());
    }
    let user = active.update(&txn).await?;

    let mut account: account::ActiveModel = current.account.clone().into();
    account.age = Set(data.account.age);
    account.views = Set(data.account.views);
    account.update(&txn).await?;

    txn.commit().await?;

    log::info!(
        "Updated profile of user {} (password changed: {})",
        user.id,
        password_changed
    );
    Ok((user, password_changed))
}

/// The account with `account_id`, or the viewer's own when absent or unknown.
pub async fn profile_view<C>(
    db: &C,
    account_id: Option<i64>,
    viewer: &CurrentUser,
) -> AppResult<ProfileView>
where
    C: ConnectionTrait,
{
    let target = match account_id {
        Some(id) => account::Entity::find_by_id(id).one(db).await?,
        None => None,
    };

    let (account, user) = match target {
        Some(account) if account.id != viewer.account.id => {
            let user = account
                .find_related(user::Entity)
                .one(db)
                .await?
                .ok_or(AppError::NotFound)?;
            (account, user)
        }
        _ => (viewer.account.clone(), viewer.user.clone()),
    };

    let groups = account
        .find_related(group::Entity)
        .order_by_desc(group::Column::DateCreate)
        .order_by_desc(group::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|g| GroupLink {
            url: g.url(),
            name: g.name,
        })
        .collect();

    Ok(ProfileView {
        is_own: account.id == viewer.account.id,
        account_id: account.id,
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        age: account.age,
        views: account.views,
        photo: account.photo,
        groups,
    })
}

pub async fn username_of<C>(db: &C, account_id: i64) -> AppResult<String>
where
    C: ConnectionTrait,
{
    let user = user::Entity::find()
        .inner_join(account::Entity)
        .filter(account::Column::Id.eq(account_id))
        .one(db)
        .await?;
    Ok(user.map(|u| u.username).unwrap_or_default())
}
