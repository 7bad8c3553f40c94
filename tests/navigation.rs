mod common;

use std::sync::{Arc, Mutex};

use group_buy_client::router::{
    DEFAULT_APP_TITLE, Location, NavigationHooks, RouteTable, Router,
};
use group_buy_client::session::{MemorySessionStorage, SessionStore};

use common::{client, credentials, login, spawn_backend};

#[tokio::test]
async fn guest_pages_send_logged_in_users_to_role_home() {
    let backend = spawn_backend().await;

    let admin = client(&backend.base_url);
    login(&admin, "admin").await;
    let landed = admin.app.router.navigate("/login").unwrap();
    assert_eq!(landed.location.path, "/admin/dashboard");
    assert_eq!(landed.title, "仪表盘 - 拼团营销系统");

    let user = client(&backend.base_url);
    login(&user, "alice").await;
    let landed = user.app.router.navigate("/register").unwrap();
    assert_eq!(landed.location.path, "/customer/home");
}

#[tokio::test]
async fn role_mismatch_redirects_to_own_home() {
    let backend = spawn_backend().await;

    let user = client(&backend.base_url);
    login(&user, "alice").await;
    let landed = user.app.router.navigate("/admin/users").unwrap();
    assert_eq!(landed.location.path, "/customer/home");
    assert_eq!(landed.redirected_from.as_deref(), Some("/admin/users"));
    assert!(user.app.session.is_logged_in());

    let admin = client(&backend.base_url);
    login(&admin, "admin").await;
    let landed = admin.app.router.navigate("/customer/orders").unwrap();
    assert_eq!(landed.location.path, "/admin/dashboard");
}

#[test]
fn anonymous_access_to_protected_page_keeps_return_path() {
    let tc = client("http://127.0.0.1:9/api");
    let landed = tc.app.router.navigate("/customer/payment/TRD9?from=lock").unwrap();
    assert_eq!(landed.route_name, Some("Login"));
    assert_eq!(
        landed.location.query_value("redirect"),
        Some("/customer/payment/TRD9?from=lock")
    );

    let landed = tc.app.router.navigate("/admin").unwrap();
    assert_eq!(landed.location.query_value("redirect"), Some("/admin/dashboard"));
}

#[test]
fn progress_page_is_public() {
    let tc = client("http://127.0.0.1:9/api");
    let landed = tc.app.router.navigate("/customer/progress/ORD42").unwrap();
    assert_eq!(landed.route_name, Some("GroupProgress"));
    assert_eq!(landed.param("orderId"), Some("ORD42"));
    assert_eq!(landed.title, "拼团进度 - 拼团营销系统");
}

#[test]
fn unknown_route_renders_not_found() {
    let tc = client("http://127.0.0.1:9/api");
    let landed = tc.app.router.navigate("/customer/home/extra").unwrap();
    assert_eq!(landed.route_name, Some("NotFound"));
}

#[tokio::test]
async fn login_follows_redirect_query() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);

    let login_page = tc.app.router.navigate("/customer/product/SPU1").unwrap();
    let redirect = login_page.location.query_value("redirect").map(str::to_string);

    let landed = tc
        .app
        .login_and_enter(&credentials("alice"), redirect.as_deref())
        .await
        .unwrap();
    assert_eq!(landed.route_name, Some("ProductDetail"));
    assert_eq!(landed.param("spuId"), Some("SPU1"));
}

#[tokio::test]
async fn failed_login_keeps_guest_state() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);

    let mut bad = credentials("alice");
    bad.password = "wrong".into();
    let err = tc.app.login_and_enter(&bad, None).await.unwrap_err();
    assert_eq!(err.user_message(), "用户名或密码错误");
    assert!(!tc.app.session.is_logged_in());
    assert_eq!(tc.app.router.current(), None);
}

#[tokio::test]
async fn logout_lands_on_login() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);
    login(&tc, "alice").await;

    let landed = tc.app.logout().expect("navigated");
    assert_eq!(landed.location.path, "/login");
    assert!(!tc.app.session.is_logged_in());
    assert!(tc.storage.raw(tc.app.session.storage_key()).is_none());
}

#[derive(Default)]
struct Progress {
    events: Mutex<Vec<String>>,
}

impl NavigationHooks for Progress {
    fn before_each(&self, to: &Location, _from: Option<&Location>) {
        self.events.lock().unwrap().push(format!("start {}", to.path));
    }

    fn after_each(&self, to: &Location) {
        self.events.lock().unwrap().push(format!("done {}", to.path));
    }

    fn set_title(&self, title: &str) {
        self.events.lock().unwrap().push(format!("title {title}"));
    }
}

#[test]
fn hooks_wrap_each_navigation() {
    let session = SessionStore::new(Arc::new(MemorySessionStorage::new()), "hooks");
    let hooks = Arc::new(Progress::default());
    let router = Router::new(RouteTable::standard(), session, DEFAULT_APP_TITLE)
        .with_hooks(hooks.clone())
        .attach()
        .unwrap();

    router.navigate("/").unwrap();
    assert_eq!(
        *hooks.events.lock().unwrap(),
        vec![
            "start /".to_string(),
            "title 登录 - 拼团营销系统".to_string(),
            "done /login".to_string(),
        ]
    );
}
