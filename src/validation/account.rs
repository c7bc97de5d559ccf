use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use validator::ValidateEmail;

use super::{required, structural, FieldErrors, REQUIRED};
use crate::auth::verify_password;
use crate::db::iexact;
use crate::entities::user;
use crate::error::AppResult;
use crate::models::{
    AccountData, AccountForm, LoginData, LoginForm, ProfileEditData, ProfileEditForm, SignupData,
    SignupForm, UserData,
};

pub const MAX_AGE: i32 = 150;
pub const MIN_PASSWORD_LENGTH: usize = 5;

pub async fn validate_signup<C>(
    db: &C,
    form: &SignupForm,
) -> AppResult<Result<SignupData, FieldErrors>>
where
    C: ConnectionTrait,
{
    let mut errors = structural(form);

    let user = check_user_fields(
        db,
        &mut errors,
        UserFields {
            username: &form.username,
            email: &form.email,
            first_name: &form.first_name,
            last_name: &form.last_name,
        },
        None,
    )
    .await?;

    for (field, value) in [("password1", &form.password1), ("password2", &form.password2)] {
        if value.is_empty() {
            errors.add(field, REQUIRED);
        } else {
            check_password_length(&mut errors, field, value);
        }
    }
    check_passwords_match(&mut errors, &form.password1, &form.password2);

    let account = validate_account(&form.account_part());
    let account = match account {
        Ok(account) => Some(account),
        Err(account_errors) => {
            errors.merge(account_errors);
            None
        }
    };

    Ok(match account {
        Some(account) if errors.is_empty() => Ok(SignupData {
            user,
            password: form.password1.clone(),
            account,
        }),
        _ => Err(errors),
    })
}

/// Profile edit of `current`. A password change needs the current password,
/// and a correct current password with no new one is itself an error.
pub async fn validate_profile_edit<C>(
    db: &C,
    current: &user::Model,
    form: &ProfileEditForm,
) -> AppResult<Result<ProfileEditData, FieldErrors>>
where
    C: ConnectionTrait,
{
    let mut errors = structural(form);

    let user = check_user_fields(
        db,
        &mut errors,
        UserFields {
            username: &form.username,
            email: &form.email,
            first_name: &form.first_name,
            last_name: &form.last_name,
        },
        Some(current.id),
    )
    .await?;

    for (field, value) in [("password1", &form.password1), ("password2", &form.password2)] {
        if !value.is_empty() {
            check_password_length(&mut errors, field, value);
        }
    }
    check_passwords_match(&mut errors, &form.password1, &form.password2);

    let mut new_password = None;
    if !form.old_password.is_empty() || !form.password1.is_empty() {
        if !verify_password(&form.old_password, &current.password_hash) {
            errors.add("old_password", "Enter your correct current password.");
        } else if form.password1.is_empty() {
            errors.add("password1", "New password is required.");
        } else {
            new_password = Some(form.password1.clone());
        }
    }

    let account = match validate_account(&form.account_part()) {
        Ok(account) => Some(account),
        Err(account_errors) => {
            errors.merge(account_errors);
            None
        }
    };

    Ok(match account {
        Some(account) if errors.is_empty() => Ok(ProfileEditData {
            user,
            new_password,
            account,
        }),
        _ => Err(errors),
    })
}

/// Account attributes: optional whole-number age up to 150, short views.
pub fn validate_account(form: &AccountForm) -> Result<AccountData, FieldErrors> {
    let mut errors = structural(form);

    let age = match parse_age(&form.age) {
        Ok(age) => age,
        Err(message) => {
            errors.add("age", message);
            None
        }
    };

    errors.into_result(AccountData {
        age,
        views: form.views.trim().to_string(),
    })
}

pub fn parse_age(raw: &str) -> Result<Option<i32>, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let age: i32 = raw.parse().map_err(|_| "Age must be a whole number.")?;
    if age > MAX_AGE {
        return Err("Age cannot be greater than 150.");
    }
    if age < 0 {
        return Err("Age cannot be negative.");
    }
    Ok(Some(age))
}

pub fn validate_login(form: &LoginForm) -> Result<LoginData, FieldErrors> {
    let mut errors = FieldErrors::new();
    let username = required(&mut errors, "username", &form.username);
    if form.password.is_empty() {
        errors.add("password", REQUIRED);
    }

    errors.into_result(LoginData {
        username,
        password: form.password.clone(),
    })
}

struct UserFields<'a> {
    username: &'a str,
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

async fn check_user_fields<C>(
    db: &C,
    errors: &mut FieldErrors,
    fields: UserFields<'_>,
    exclude_user: Option<i64>,
) -> AppResult<UserData>
where
    C: ConnectionTrait,
{
    let username = required(errors, "username", fields.username);
    if !username.is_empty() {
        if !is_valid_username(&username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        } else if is_taken(db, user::Column::Username, &username, exclude_user).await? {
            errors.add("username", "A user with that username already exists.");
        }
    }

    let email = required(errors, "email", fields.email).to_lowercase();
    if !email.is_empty() {
        if !email.validate_email() {
            errors.add("email", "Enter a valid email address.");
        } else if is_taken(db, user::Column::Email, &email, exclude_user).await? {
            errors.add("email", "Email must be unique.");
        }
    }

    let first_name = required(errors, "first_name", fields.first_name);
    let last_name = required(errors, "last_name", fields.last_name);

    Ok(UserData {
        username,
        email,
        first_name,
        last_name,
    })
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

async fn is_taken<C>(
    db: &C,
    column: user::Column,
    value: &str,
    exclude_user: Option<i64>,
) -> AppResult<bool>
where
    C: ConnectionTrait,
{
    let mut query = user::Entity::find().filter(iexact(user::Entity, column, value));
    if let Some(id) = exclude_user {
        query = query.filter(user::Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

fn check_password_length(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            "Ensure this value has at least 5 characters.",
        );
    }
}

fn check_passwords_match(errors: &mut FieldErrors, password1: &str, password2: &str) {
    if password1 != password2 {
        errors.add("password2", "The two password fields didn't match.");
    }
}
