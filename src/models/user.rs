use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SignupForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub username: String,
    #[validate(length(max = 254, message = "Ensure this value has at most 254 characters."))]
    pub email: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
    pub age: String,
    pub views: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProfileEditForm {
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub username: String,
    #[validate(length(max = 254, message = "Ensure this value has at most 254 characters."))]
    pub email: String,
    #[serde(skip_serializing)]
    pub old_password: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    pub age: String,
    pub views: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AccountForm {
    pub age: String,
    #[validate(length(max = 40, message = "Ensure this value has at most 40 characters."))]
    pub views: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

impl SignupForm {
    pub fn account_part(&self) -> AccountForm {
        AccountForm {
            age: self.age.clone(),
            views: self.views.clone(),
        }
    }
}

impl ProfileEditForm {
    pub fn account_part(&self) -> AccountForm {
        AccountForm {
            age: self.age.clone(),
            views: self.views.clone(),
        }
    }

    /// Pre-fills the edit page from stored values.
    pub fn from_models(
        user: &crate::entities::user::Model,
        account: &crate::entities::account::Model,
    ) -> Self {
        ProfileEditForm {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            age: account.age.map(|a| a.to_string()).unwrap_or_default(),
            views: account.views.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserData {
    pub username: String,
    /// Lowercased.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountData {
    pub age: Option<i32>,
    pub views: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignupData {
    pub user: UserData,
    pub password: String,
    pub account: AccountData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileEditData {
    pub user: UserData,
    /// Present only when a password change was requested and verified.
    pub new_password: Option<String>,
    pub account: AccountData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileView {
    pub account_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i32>,
    pub views: String,
    pub photo: String,
    pub groups: Vec<GroupLink>,
    pub is_own: bool,
}

#[derive(Debug, Serialize)]
pub struct GroupLink {
    pub name: String,
    pub url: String,
}
