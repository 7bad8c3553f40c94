mod common;

use serde_json::{Value, json};

use group_buy_client::features::PageQuery;
use group_buy_client::features::goods::{SpuListQuery, TrialQuery};
use group_buy_client::features::payment::CreatePaymentRequest;
use group_buy_client::features::trade::LockOrderRequest;

use common::{client, login, spawn_backend};

#[tokio::test]
async fn goods_endpoints_use_expected_paths() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);
    login(&tc, "alice").await;
    let goods = tc.app.http.goods();

    let list = goods
        .spu_list(&SpuListQuery {
            keyword: Some("好物".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(list[0].spu_id, "SPU1");
    let req = backend.state.last_request();
    assert_eq!((req.method.as_str(), req.path.as_str()), ("GET", "/goods/spu/list"));
    assert!(req.query.unwrap_or_default().starts_with("keyword="));

    let trial = goods
        .trial_price(
            "SKU1",
            &TrialQuery {
                source: Some("s01".into()),
                channel: Some("c01".into()),
                user_id: None,
            },
        )
        .await
        .unwrap();
    assert!(trial.hit_activity);
    assert_eq!(trial.deduction(), 20.0);
    let query = backend.state.last_request().query.unwrap_or_default();
    assert!(query.contains("source=s01"));
    assert!(query.contains("channel=c01"));
    assert!(!query.contains("userId"));

    let teams = goods.teams("SKU1").await.unwrap();
    assert_eq!(teams[0].missing_members(), 2);

    let detail: Value = goods.spu_detail("SPU 1").await.unwrap();
    assert_eq!(detail["path"], "/goods/spu/SPU%201");
}

#[tokio::test]
async fn lock_order_posts_prices_from_trial() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);
    login(&tc, "alice").await;
    let http = &tc.app.http;

    let trial = http
        .goods()
        .trial_price("SKU1", &TrialQuery::default())
        .await
        .unwrap();
    let request = LockOrderRequest::from_trial(&trial, Some("ORD1".into()))
        .unwrap()
        .with_channel("s01", "c01");
    let order = http.trade().lock_order(&request).await.unwrap();
    assert_eq!(order.trade_order_id, "TRD1");
    assert_eq!(order.out_trade_no.as_deref(), Some(request.out_trade_no.as_str()));

    let sent = backend.state.last_request().body.expect("json body");
    assert_eq!(sent["activityId"], "ACT1");
    assert_eq!(sent["orderId"], "ORD1");
    assert_eq!(sent["originalPrice"], 100.0);
    assert_eq!(sent["deductionPrice"], 20.0);
    assert_eq!(sent["payPrice"], 80.0);
    assert_eq!(sent["source"], "s01");
}

#[tokio::test]
async fn trade_refund_and_progress() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);
    login(&tc, "alice").await;
    let trade = tc.app.http.trade();

    trade.refund("TRD1", "不想要了").await.unwrap();
    let req = backend.state.last_request();
    assert_eq!((req.method.as_str(), req.path.as_str()), ("POST", "/trade/refund/TRD1"));
    assert_eq!(
        req.body,
        Some(json!({ "tradeOrderId": "TRD1", "reason": "不想要了" }))
    );

    let progress = trade.order_progress("ORD1").await.unwrap();
    assert_eq!(progress["path"], "/trade/order/ORD1/progress");
}

#[tokio::test]
async fn payment_and_user_center() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);
    login(&tc, "alice").await;
    let http = &tc.app.http;

    let page = http
        .payment()
        .create(&CreatePaymentRequest {
            out_trade_no: "OTN1".into(),
            amount: 80.0,
            subject: "拼团好物".into(),
        })
        .await
        .unwrap();
    assert_eq!(page, "<form>pay</form>");

    let status = http.payment().query("OTN1").await.unwrap();
    assert!(status.is_paid());
    assert_eq!(
        backend.state.last_request().query.as_deref(),
        Some("outTradeNo=OTN1")
    );

    let orders = http.user().orders(PageQuery::new(2, 5)).await.unwrap();
    assert_eq!(orders[0].trade_order_id, "TRD1");
    assert_eq!(backend.state.last_request().query.as_deref(), Some("page=2&size=5"));

    let profile = http.user().sync_profile().await.unwrap();
    assert_eq!(profile.nickname.as_deref(), Some("新昵称"));
    assert_eq!(tc.app.session.nickname(), "新昵称");
    assert_eq!(
        tc.app.session.avatar().as_deref(),
        Some("https://cdn.example.com/u1.png")
    );
}

#[tokio::test]
async fn admin_endpoints_use_expected_verbs() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);
    login(&tc, "admin").await;
    let admin = tc.app.http.admin();

    let echo = admin.dashboard_stats().await.unwrap();
    assert_eq!(echo["method"], "GET");
    assert_eq!(echo["path"], "/admin/dashboard/stats");

    let echo = admin.update_activity_status("ACT1", 2).await.unwrap();
    assert_eq!(echo["method"], "PUT");
    assert_eq!(echo["path"], "/admin/activities/ACT1/status");
    assert_eq!(echo["body"], json!({ "status": 2 }));

    let echo = admin.on_sale_spu("SPU1").await.unwrap();
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["path"], "/admin/goods/spu/SPU1/on-sale");

    let echo = admin.add_sku_stock("SKU1", 50).await.unwrap();
    assert_eq!(echo["path"], "/admin/goods/sku/SKU1/add-stock");
    assert_eq!(echo["query"], "quantity=50");

    let echo = admin.update_config("order.timeout.seconds", "300").await.unwrap();
    assert_eq!(echo["path"], "/admin/config/update");
    assert_eq!(echo["query"], "key=order.timeout.seconds&value=300");

    let echo = admin.users(&PageQuery::new(1, 20)).await.unwrap();
    assert_eq!(echo["query"], "page=1&size=20");

    let echo = admin
        .create_tag(&json!({ "tagName": "高价值用户" }))
        .await
        .unwrap();
    assert_eq!(echo["method"], "POST");
    assert_eq!(echo["body"]["tagName"], "高价值用户");

    let echo = admin.update_user_status("U9", "DISABLED").await.unwrap();
    assert_eq!(echo["path"], "/admin/users/U9/status");
    assert_eq!(echo["body"]["status"], "DISABLED");

    let echo = admin.discounts_page(&()).await.unwrap();
    assert_eq!(echo["path"], "/admin/activities/discounts/page");
    assert_eq!(echo["query"], Value::Null);
}

#[tokio::test]
async fn register_does_not_touch_session() {
    let backend = spawn_backend().await;
    let tc = client(&backend.base_url);

    let data = group_buy_client::features::auth::RegisterRequest {
        username: "carol".into(),
        password: "secret1".into(),
        nickname: Some("Carol".into()),
        phone: None,
    };
    tc.app.session.register(&tc.app.http, &data).await.unwrap();
    assert!(!tc.app.session.is_logged_in());

    let sent = backend.state.last_request();
    assert_eq!(sent.path, "/auth/register");
    assert_eq!(sent.body.unwrap()["nickname"], "Carol");
}
