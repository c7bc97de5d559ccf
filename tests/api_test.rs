// Integration tests for the page routes, run against an in-memory SQLite database.
// Run with: cargo test --test api_test

use actix_web::{
    cookie::Cookie,
    dev::ServiceResponse,
    http::{header, StatusCode},
    test, web, App,
};
use community_web_service::{api, config::Config, db, templates};

const COOKIE: &str = "sessionid";
const PASSWORD: &str = "secret-pass";

fn test_config() -> Config {
    let mut config = Config::from_env().expect("Failed to load configuration");
    config.database.url = "sqlite::memory:".to_string();
    config.security.password_hash_cost = 4;
    config.session.cookie_name = COOKIE.to_string();
    config.session.cookie_secure = false;
    config.pagination.groups_per_page = 2;
    config
}

/// Helper function to create a test app with a fresh database
async fn create_test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let config = test_config();
    let pool = db::create_pool(&config)
        .await
        .expect("Failed to create SQLite pool");
    let tera = templates::load().expect("Failed to parse templates");

    App::new()
        .app_data(web::Data::new(config))
        .app_data(web::Data::new(pool))
        .app_data(web::Data::new(tera))
        .configure(api::configure)
}

fn signup_request(username: &str, email: &str) -> test::TestRequest {
    test::TestRequest::post().uri("/reg/").set_form([
        ("username", username),
        ("email", email),
        ("first_name", "Test"),
        ("last_name", "User"),
        ("password1", PASSWORD),
        ("password2", PASSWORD),
        ("age", "30"),
        ("views", "curious"),
    ])
}

fn login_request(uri: &str, username: &str, password: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .set_form([("username", username), ("password", password)])
}

fn session_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE)
        .expect("response should set the session cookie")
        .into_owned()
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("response should redirect")
        .to_str()
        .unwrap()
        .to_string()
}

async fn body_text(resp: ServiceResponse) -> String {
    let body = test::read_body(resp).await;
    String::from_utf8(body.to_vec()).unwrap()
}

fn profile_edit_request(cookie: &Cookie<'static>, passwords: [(&str, &str); 3]) -> test::TestRequest {
    let mut fields = vec![
        ("username", "alice"),
        ("email", "alice@example.com"),
        ("first_name", "Alice"),
        ("last_name", "Liddell"),
        ("age", ""),
        ("views", ""),
    ];
    fields.extend(passwords);
    test::TestRequest::post()
        .uri("/profile/edit/")
        .cookie(cookie.clone())
        .set_form(fields)
}

fn new_group_request(cookie: &Cookie<'static>, name: &str, slug: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/group/create/")
        .cookie(cookie.clone())
        .set_form([("name", name), ("slug", slug), ("description", "About things")])
}

fn new_post_request(
    cookie: &Cookie<'static>,
    group_slug: &str,
    title: &str,
    tags: &str,
) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/group/{}/post/create/", group_slug))
        .cookie(cookie.clone())
        .set_form([("title", title), ("body", "Some text"), ("tags", tags)])
}

#[actix_web::test]
async fn test_signup_logs_in_and_redirects_home() {
    let app = test::init_service(create_test_app().await).await;

    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Welcome, alice!"));
}

#[actix_web::test]
async fn test_signup_rejects_duplicate_email_ignoring_case() {
    let app = test::init_service(create_test_app().await).await;

    let resp = test::call_service(&app, signup_request("alice", "Alice@Example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = test::call_service(&app, signup_request("bob", "alice@example.COM").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().next().is_none());

    let body = body_text(resp).await;
    assert!(body.contains("Email must be unique."));
    assert!(!body.contains(PASSWORD));
}

#[actix_web::test]
async fn test_protected_page_redirects_to_login_with_next() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::get().uri("/group/create/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/login/?next=%2Fgroup%2Fcreate%2F");
}

#[actix_web::test]
async fn test_login_follows_next_and_rejects_bad_credentials() {
    let app = test::init_service(create_test_app().await).await;
    test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;

    let req = login_request("/login/?next=%2Fgroup%2Flist%2F", "ALICE", PASSWORD).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/group/list/");
    session_cookie(&resp);

    let req = login_request("/login/?next=https%3A%2F%2Fevil.example%2F", "alice", PASSWORD).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/");

    let req = login_request("/login/", "alice", "wrong-pass").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp)
        .await
        .contains("Please enter a correct username and password."));
}

#[actix_web::test]
async fn test_logged_in_user_skips_login_and_signup() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);

    for uri in ["/login/", "/reg/"] {
        let req = test::TestRequest::get().uri(uri).cookie(cookie.clone()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/");
    }
}

#[actix_web::test]
async fn test_logout_clears_session_cookie() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::get().uri("/logout/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert_eq!(session_cookie(&resp).value(), "");
}

#[actix_web::test]
async fn test_profile_edit_with_wrong_old_password_keeps_password() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);

    let req = profile_edit_request(
        &cookie,
        [
            ("old_password", "not-my-password"),
            ("password1", "brand-new"),
            ("password2", "brand-new"),
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp)
        .await
        .contains("Enter your correct current password."));

    let resp = test::call_service(&app, login_request("/login/", "alice", PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let resp = test::call_service(&app, login_request("/login/", "alice", "brand-new").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_profile_edit_requires_new_password_after_correct_old_one() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);

    let req = profile_edit_request(
        &cookie,
        [("old_password", PASSWORD), ("password1", ""), ("password2", "")],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("New password is required."));
}

#[actix_web::test]
async fn test_profile_edit_changes_password_and_refreshes_session() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);

    let req = profile_edit_request(
        &cookie,
        [
            ("old_password", PASSWORD),
            ("password1", "brand-new"),
            ("password2", "brand-new"),
        ],
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/");
    let refreshed = session_cookie(&resp);

    let req = test::TestRequest::get().uri("/profile/").cookie(refreshed).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Alice Liddell (alice)"));

    let resp = test::call_service(&app, login_request("/login/", "alice", "brand-new").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
}

#[actix_web::test]
async fn test_unknown_profile_id_shows_own_profile() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);

    let req = test::TestRequest::get().uri("/profile/999/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("(alice)"));
    assert!(body.contains("Edit profile"));
}

#[actix_web::test]
async fn test_group_slug_create_is_rejected_in_any_case() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);

    for slug in ["create", "CREATE", "Create"] {
        let resp = test::call_service(&app, new_group_request(&cookie, "Makers", slug).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "slug {:?} was accepted", slug);
        assert!(body_text(resp).await.contains("The URL cannot be"));
    }
}

#[actix_web::test]
async fn test_group_create_makes_creator_a_member() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);

    let resp = test::call_service(&app, new_group_request(&cookie, "My Group", "").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/group/my-group/");

    let req = test::TestRequest::get().uri("/group/MY-GROUP/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("1 member(s)"));
    assert!(body.contains("/group/my-group/left/"));
}

#[actix_web::test]
async fn test_group_update_with_blank_slug_keeps_slug() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);
    test::call_service(&app, new_group_request(&cookie, "Makers", "makers").to_request()).await;

    let req = test::TestRequest::post()
        .uri("/group/makers/update/")
        .cookie(cookie)
        .set_form([("name", "Makers United"), ("slug", ""), ("description", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/group/makers/");

    let req = test::TestRequest::get().uri("/group/makers/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(body_text(resp).await.contains("Makers United"));
}

#[actix_web::test]
async fn test_group_delete_confirms_then_removes_group() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);
    test::call_service(&app, new_group_request(&cookie, "Makers", "makers").to_request()).await;
    test::call_service(&app, new_post_request(&cookie, "makers", "Hello", "news").to_request()).await;

    let req = test::TestRequest::get()
        .uri("/group/makers/delete/")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Delete \"Makers\"?"));

    let req = test::TestRequest::post()
        .uri("/group/makers/delete/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/group/list/");

    let req = test::TestRequest::get().uri("/group/makers/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_non_member_is_redirected_to_group_page() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let alice = session_cookie(&resp);
    let resp = test::call_service(&app, signup_request("bob", "bob@example.com").to_request()).await;
    let bob = session_cookie(&resp);
    test::call_service(&app, new_group_request(&alice, "Makers", "makers").to_request()).await;

    let req = test::TestRequest::get()
        .uri("/group/makers/post/create/")
        .cookie(bob.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/group/makers/");

    let resp = test::call_service(&app, new_post_request(&bob, "makers", "Hi", "").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/group/makers/");

    let req = test::TestRequest::post()
        .uri("/group/makers/update/")
        .cookie(bob.clone())
        .set_form([("name", "Taken over"), ("slug", ""), ("description", "")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/group/makers/");

    let req = test::TestRequest::post()
        .uri("/group/makers/delete/")
        .cookie(bob.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/group/makers/");

    let req = test::TestRequest::get().uri("/group/makers/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert!(body.contains("No posts yet."));
    assert!(!body.contains("Taken over"));
}

#[actix_web::test]
async fn test_join_twice_is_idempotent_and_leave_removes_membership() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let alice = session_cookie(&resp);
    let resp = test::call_service(&app, signup_request("bob", "bob@example.com").to_request()).await;
    let bob = session_cookie(&resp);
    test::call_service(&app, new_group_request(&alice, "Makers", "makers").to_request()).await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/group/makers/join/")
            .cookie(bob.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/group/makers/");
    }

    let req = test::TestRequest::get().uri("/group/makers/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(body_text(resp).await.contains("2 member(s)"));

    let req = test::TestRequest::post()
        .uri("/group/makers/left/")
        .cookie(bob)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let req = test::TestRequest::get().uri("/group/makers/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(body_text(resp).await.contains("1 member(s)"));
}

#[actix_web::test]
async fn test_post_tags_merge_case_insensitively() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);
    test::call_service(&app, new_group_request(&cookie, "Makers", "makers").to_request()).await;

    let resp = test::call_service(
        &app,
        new_post_request(&cookie, "makers", "Tagged", "Foo, foo, Bar").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    let post_url = location(&resp);
    assert!(post_url.starts_with("/group/makers/post/tagged."));

    let req = test::TestRequest::get().uri(&post_url).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_text(resp).await;
    assert_eq!(body.matches("<li>").count(), 2);
    assert!(body.contains("<li>Foo</li>"));
    assert!(body.contains("<li>Bar</li>"));
}

#[actix_web::test]
async fn test_posts_with_same_title_get_distinct_slugs() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);
    test::call_service(&app, new_group_request(&cookie, "Makers", "makers").to_request()).await;

    let mut urls = Vec::new();
    for _ in 0..2 {
        let resp = test::call_service(&app, new_post_request(&cookie, "makers", "Hello", "").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        urls.push(location(&resp));
    }
    assert_ne!(urls[0], urls[1]);

    for url in &urls {
        let req = test::TestRequest::get().uri(url).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn test_missing_post_is_not_found() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);
    test::call_service(&app, new_group_request(&cookie, "Makers", "makers").to_request()).await;
    test::call_service(&app, new_group_request(&cookie, "Others", "others").to_request()).await;
    let resp = test::call_service(&app, new_post_request(&cookie, "makers", "Hello", "").to_request()).await;
    let post_url = location(&resp);

    let req = test::TestRequest::get()
        .uri(&post_url.replace("/makers/", "/others/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/group/makers/post/nothing-here/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_group_list_pagination() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);
    for name in ["Alpha", "Beta", "Gamma"] {
        test::call_service(&app, new_group_request(&cookie, name, "").to_request()).await;
    }

    let req = test::TestRequest::get().uri("/group/list/").to_request();
    let resp = test::call_service(&app, req).await;
    let body = body_text(resp).await;
    assert!(body.contains("Gamma"));
    assert!(body.contains("Beta"));
    assert!(!body.contains("Alpha"));

    for uri in ["/group/list/?page=last", "/group/list/?page=2", "/group/list/?page=99"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_text(resp).await;
        assert!(body.contains("Alpha"), "{} should show the last page", uri);
        assert!(body.contains("Page 2 of 2"));
        assert!(!body.contains("Gamma"));
    }

    for uri in ["/group/list/?page=xyz", "/group/list/?page=0", "/group/list/?page=-1"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[actix_web::test]
async fn test_unknown_group_is_not_found() {
    let app = test::init_service(create_test_app().await).await;

    let req = test::TestRequest::get().uri("/group/nowhere/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Not found"));
}

#[actix_web::test]
async fn test_non_ascii_username_logs_in_and_stays_unique() {
    let app = test::init_service(create_test_app().await).await;

    let resp = test::call_service(&app, signup_request("Иван", "ivan@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);

    let resp = test::call_service(&app, login_request("/login/", "Иван", PASSWORD).to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    session_cookie(&resp);

    let resp = test::call_service(&app, signup_request("Иван", "other@example.com").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp)
        .await
        .contains("A user with that username already exists."));
}

#[actix_web::test]
async fn test_profile_edit_rejects_another_users_email() {
    let app = test::init_service(create_test_app().await).await;
    let resp = test::call_service(&app, signup_request("alice", "alice@example.com").to_request()).await;
    let cookie = session_cookie(&resp);
    test::call_service(&app, signup_request("bob", "bob@example.com").to_request()).await;

    let req = test::TestRequest::post()
        .uri("/profile/edit/")
        .cookie(cookie.clone())
        .set_form([
            ("username", "alice"),
            ("email", "BOB@example.com"),
            ("first_name", "Alice"),
            ("last_name", "Liddell"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Email must be unique."));

    let req = test::TestRequest::get().uri("/profile/").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert!(body_text(resp).await.contains("alice@example.com"));
}
