use actix_web::HttpResponse;
use tera::{Context, Tera};

use crate::auth::CurrentUser;
use crate::error::AppResult;

macro_rules! template {
    ($name:literal) => {
        (
            $name,
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/", $name)),
        )
    };
}

/// Served by the error handler, which has no access to the template engine.
pub const NOT_FOUND_PAGE: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/404.html"));

/// Display categories cycled through when rendering a group's posts.
pub const COLORS: [&str; 7] = [
    "primary",
    "secondary",
    "success",
    "danger",
    "warning",
    "info",
    "dark",
];

pub fn load() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        template!("base.html"),
        template!("index.html"),
        template!("signup.html"),
        template!("login.html"),
        template!("profile_info.html"),
        template!("profile_edit.html"),
        template!("group_list.html"),
        template!("group_info.html"),
        template!("group_create.html"),
        template!("group_edit.html"),
        template!("group_fields.html"),
        template!("obj_delete_confirm.html"),
        template!("post_create.html"),
        template!("post_detail.html"),
    ])?;
    Ok(tera)
}

pub fn context(user: Option<&CurrentUser>) -> Context {
    let mut context = Context::new();
    if let Some(current) = user {
        context.insert("current_user", &current.user.username);
        context.insert("current_account_id", &current.account.id);
    }
    context
}

pub fn render(tera: &Tera, name: &str, context: &Context) -> AppResult<HttpResponse> {
    let body = tera.render(name, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_parse() {
        let tera = load().unwrap();
        assert!(tera.get_template_names().any(|n| n == "group_info.html"));
    }

    #[test]
    fn output_is_escaped() {
        let tera = load().unwrap();
        let mut context = context(None);
        context.insert("form", &crate::models::LoginForm {
            username: "<script>".to_string(),
            password: String::new(),
        });
        context.insert("errors", &crate::validation::FieldErrors::new());
        context.insert("next", "/");

        let html = tera.render("login.html", &context).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
