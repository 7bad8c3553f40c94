//! 拼团营销系统命令行客户端：
//! - 登录 / 注册 / 退出，会话持久化到本地
//! - 模拟站内导航，查看守卫裁决结果
//! - 调用商品、交易、支付、用户中心与管理后台接口

use std::env;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use group_buy_client::config::AppConfig;
use group_buy_client::error::ClientError;
use group_buy_client::features::PageQuery;
use group_buy_client::features::auth::{LoginRequest, RegisterRequest};
use group_buy_client::features::goods::{SpuListQuery, TrialQuery};
use group_buy_client::features::payment::CreatePaymentRequest;
use group_buy_client::features::trade::LockOrderRequest;
use group_buy_client::logging::init_tracing;
use group_buy_client::router::NavigationResult;
use group_buy_client::state::AppState;

const PASSWORD_ENV: &str = "GROUP_BUY_PASSWORD";
const DEFAULT_REFUND_REASON: &str = "用户申请退款";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("参数错误: {0}")]
    Args(String),
    #[error("配置错误: {0}")]
    Config(String),
    #[error("{0}")]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone)]
struct Args {
    help: bool,
    json: bool,
    base_url: Option<String>,
    config: Option<PathBuf>,
    cmd: Option<Command>,
}

#[derive(Debug, Clone)]
enum Command {
    Help,
    Login {
        username: String,
        password: Option<String>,
        redirect: Option<String>,
    },
    Register(RegisterRequest),
    Logout,
    WhoAmI,
    Refresh,
    Navigate(String),
    GoodsList(SpuListQuery),
    GoodsDetail(String),
    GoodsTrial {
        sku_id: String,
        query: TrialQuery,
    },
    GoodsTeams(String),
    TradeLock {
        sku_id: String,
        order_id: Option<String>,
        query: TrialQuery,
    },
    TradeGet(String),
    TradeRefund {
        trade_order_id: String,
        reason: String,
    },
    TradeProgress(String),
    PayCreate(CreatePaymentRequest),
    PayQuery(String),
    Profile,
    Orders(PageQuery),
    AdminStats,
    AdminUsers(PageQuery),
    AdminOrders(PageQuery),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse(env::args().skip(1).collect())?;
    if args.help || matches!(args.cmd, None | Some(Command::Help)) {
        print_help();
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::init_global().cloned(),
    }
    .map_err(|e| CliError::Config(e.to_string()))?;
    if let Some(base_url) = args.base_url.clone() {
        config.api.base_url = base_url;
    }
    init_tracing(&config.logging);

    let state = AppState::new(config)?;
    let Some(cmd) = args.cmd else {
        return Ok(());
    };

    if let Err(err) = run(&state, cmd, args.json).await {
        eprintln!("{err}");
        std::process::exit(2);
    }
    Ok(())
}

async fn run(state: &AppState, cmd: Command, as_json: bool) -> Result<(), CliError> {
    let http = &state.http;
    match cmd {
        Command::Help => print_help(),
        Command::Login {
            username,
            password,
            redirect,
        } => {
            let password = match password.or_else(|| env::var(PASSWORD_ENV).ok()) {
                Some(p) => p,
                None => {
                    return Err(CliError::Args(format!(
                        "缺少 --password（或环境变量 {PASSWORD_ENV}）"
                    )));
                }
            };
            let credentials = LoginRequest { username, password };
            let landed = state
                .login_and_enter(&credentials, redirect.as_deref())
                .await?;
            if as_json {
                print_json(&state.session.user_info())?;
            } else {
                println!("登录成功，欢迎 {}", state.session.nickname());
                print_navigation(&landed);
            }
        }
        Command::Register(data) => {
            state.session.register(http, &data).await?;
            println!("注册成功，请使用 {} 登录", data.username);
        }
        Command::Logout => {
            let landed = state.logout();
            println!("已退出登录");
            if let Some(landed) = landed {
                print_navigation(&landed);
            }
        }
        Command::WhoAmI => {
            let session = state.session.snapshot();
            if as_json {
                print_json(&session.user_info)?;
            } else if let Some(info) = &session.user_info {
                println!("userId: {}", info.user_id);
                println!("username: {}", info.username);
                println!("nickname: {}", session.nickname());
                println!("role: {}", info.role);
                println!("avatar: {}", session.avatar().unwrap_or("-"));
            } else {
                println!("未登录");
            }
        }
        Command::Refresh => {
            if state.session.refresh_access_token(http).await {
                println!("Token 已刷新");
            } else {
                println!("刷新失败，已退出登录");
            }
        }
        Command::Navigate(target) => {
            let landed = state.router.navigate(&target)?;
            if as_json {
                print_json(&navigation_json(&landed))?;
            } else {
                print_navigation(&landed);
            }
        }
        Command::GoodsList(query) => {
            let items = http.goods().spu_list(&query).await?;
            if as_json {
                print_json(&items)?;
            } else {
                println!("spuId\tspuName\toriginal\tgroup\tactivity");
                for x in items {
                    println!(
                        "{}\t{}\t{}\t{}\t{}",
                        x.spu_id,
                        x.spu_name,
                        fmt_price(x.min_original_price),
                        fmt_price(x.min_group_price),
                        x.activity_id.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Command::GoodsDetail(spu_id) => print_json(&http.goods().spu_detail(&spu_id).await?)?,
        Command::GoodsTrial { sku_id, query } => {
            let trial = http.goods().trial_price(&sku_id, &query).await?;
            if as_json {
                print_json(&trial)?;
            } else {
                println!("skuId: {}", trial.sku_id);
                println!("originalPrice: {:.2}", trial.original_price);
                println!("groupPrice: {:.2}", trial.discount_price);
                println!("deduction: {:.2}", trial.deduction());
                println!(
                    "activity: {}",
                    trial.activity_name.as_deref().unwrap_or("-")
                );
            }
        }
        Command::GoodsTeams(spu_id) => {
            let teams = http.goods().teams(&spu_id).await?;
            if as_json {
                print_json(&teams)?;
            } else {
                println!("orderId\tleader\tprogress\tremainingSecs");
                for t in teams {
                    println!(
                        "{}\t{}\t{}/{}\t{}",
                        t.order_id,
                        t.leader_nickname.as_deref().unwrap_or("-"),
                        t.current_count,
                        t.target_count,
                        t.remaining_seconds
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "-".to_string())
                    );
                }
            }
        }
        Command::TradeLock {
            sku_id,
            order_id,
            query,
        } => {
            let trial = http.goods().trial_price(&sku_id, &query).await?;
            let mut request = LockOrderRequest::from_trial(&trial, order_id)?;
            if let (Some(source), Some(channel)) = (query.source, query.channel) {
                request = request.with_channel(source, channel);
            }
            let order = http.trade().lock_order(&request).await?;
            if as_json {
                print_json(&order)?;
            } else {
                println!("tradeOrderId: {}", order.trade_order_id);
                println!("outTradeNo: {}", request.out_trade_no);
                println!("payPrice: {}", fmt_price(order.pay_price));
                println!("status: {}", order.status.as_deref().unwrap_or("-"));
            }
        }
        Command::TradeGet(id) => print_json(&http.trade().get_trade_order(&id).await?)?,
        Command::TradeRefund {
            trade_order_id,
            reason,
        } => {
            http.trade().refund(&trade_order_id, &reason).await?;
            println!("退款申请已提交: {trade_order_id}");
        }
        Command::TradeProgress(order_id) => {
            print_json(&http.trade().order_progress(&order_id).await?)?
        }
        Command::PayCreate(request) => {
            let page = http.payment().create(&request).await?;
            println!("{page}");
        }
        Command::PayQuery(out_trade_no) => {
            let result = http.payment().query(&out_trade_no).await?;
            if as_json {
                print_json(&result)?;
            } else {
                println!("outTradeNo: {out_trade_no}");
                println!("paid: {}", result.is_paid());
                println!(
                    "tradeStatus: {}",
                    result.trade_status.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Profile => print_json(&http.user().sync_profile().await?)?,
        Command::Orders(page) => {
            let orders = http.user().orders(page).await?;
            if as_json {
                print_json(&orders)?;
            } else {
                println!("tradeOrderId\tgoods\tpayPrice\tstatus");
                for o in orders {
                    println!(
                        "{}\t{}\t{}\t{}",
                        o.trade_order_id,
                        o.goods_name.as_deref().unwrap_or("-"),
                        fmt_price(o.pay_price),
                        o.trade_status.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Command::AdminStats => print_json(&http.admin().dashboard_stats().await?)?,
        Command::AdminUsers(page) => print_json(&http.admin().users(&page).await?)?,
        Command::AdminOrders(page) => print_json(&http.admin().orders(&page).await?)?,
    }
    Ok(())
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Self, CliError> {
        let mut help = false;
        let mut json = false;
        let mut base_url = None;
        let mut config = None;
        let mut idx = 0usize;

        while idx < argv.len() {
            match argv[idx].as_str() {
                "-h" | "--help" => {
                    help = true;
                    idx += 1;
                }
                "--json" => {
                    json = true;
                    idx += 1;
                }
                "--base-url" => {
                    base_url = Some(take_value(&argv, &mut idx, "--base-url")?);
                }
                "--config" => {
                    config = Some(PathBuf::from(take_value(&argv, &mut idx, "--config")?));
                }
                _ => break,
            }
        }

        let cmd = if idx >= argv.len() {
            None
        } else {
            Some(parse_command(&argv[idx], &argv[(idx + 1)..])?)
        };

        Ok(Self {
            help,
            json,
            base_url,
            config,
            cmd,
        })
    }
}

/// 读取 `argv[idx]` 之后的值，并把游标移过该值
fn take_value(argv: &[String], idx: &mut usize, flag: &str) -> Result<String, CliError> {
    *idx += 1;
    let value = argv
        .get(*idx)
        .ok_or_else(|| CliError::Args(format!("缺少 {flag} 的值")))?
        .to_string();
    *idx += 1;
    Ok(value)
}

fn positional(rest: &[String], cmd: &str, what: &str) -> Result<String, CliError> {
    rest.first()
        .filter(|s| !s.starts_with("--"))
        .cloned()
        .ok_or_else(|| CliError::Args(format!("{cmd} 缺少 {what}")))
}

fn parse_command(name: &str, rest: &[String]) -> Result<Command, CliError> {
    match name {
        "login" => parse_login_cmd(rest),
        "register" => parse_register_cmd(rest).map(Command::Register),
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::WhoAmI),
        "refresh" => Ok(Command::Refresh),
        "navigate" => positional(rest, "navigate", "目标路径").map(Command::Navigate),
        "goods" => parse_goods_cmd(rest),
        "trade" => parse_trade_cmd(rest),
        "pay" => parse_pay_cmd(rest),
        "profile" => Ok(Command::Profile),
        "orders" => parse_page(rest, "orders").map(Command::Orders),
        "admin" => parse_admin_cmd(rest),
        "help" => Ok(Command::Help),
        _ => Err(CliError::Args(format!("未知命令: {name}"))),
    }
}

fn parse_login_cmd(rest: &[String]) -> Result<Command, CliError> {
    let mut username = None;
    let mut password = None;
    let mut redirect = None;

    let mut idx = 0usize;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--username" | "-u" => username = Some(take_value(rest, &mut idx, "--username")?),
            "--password" | "-p" => password = Some(take_value(rest, &mut idx, "--password")?),
            "--redirect" => redirect = Some(take_value(rest, &mut idx, "--redirect")?),
            unknown => return Err(CliError::Args(format!("login 不支持参数: {unknown}"))),
        }
    }

    Ok(Command::Login {
        username: username.ok_or_else(|| CliError::Args("login 缺少 --username".to_string()))?,
        password,
        redirect,
    })
}

fn parse_register_cmd(rest: &[String]) -> Result<RegisterRequest, CliError> {
    let mut data = RegisterRequest::default();
    let mut idx = 0usize;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--username" | "-u" => data.username = take_value(rest, &mut idx, "--username")?,
            "--password" | "-p" => data.password = take_value(rest, &mut idx, "--password")?,
            "--nickname" => data.nickname = Some(take_value(rest, &mut idx, "--nickname")?),
            "--phone" => data.phone = Some(take_value(rest, &mut idx, "--phone")?),
            unknown => return Err(CliError::Args(format!("register 不支持参数: {unknown}"))),
        }
    }
    if data.username.is_empty() || data.password.is_empty() {
        return Err(CliError::Args(
            "register 需要 --username 与 --password".to_string(),
        ));
    }
    Ok(data)
}

fn parse_page(rest: &[String], cmd: &str) -> Result<PageQuery, CliError> {
    let mut page = PageQuery::default();
    let mut idx = 0usize;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--page" => page.page = parse_u32(&take_value(rest, &mut idx, "--page")?, "--page")?,
            "--size" => page.size = parse_u32(&take_value(rest, &mut idx, "--size")?, "--size")?,
            unknown => return Err(CliError::Args(format!("{cmd} 不支持参数: {unknown}"))),
        }
    }
    Ok(PageQuery::new(page.page, page.size))
}

fn parse_trial_flags(rest: &[String], cmd: &str) -> Result<(TrialQuery, Option<String>), CliError> {
    let mut query = TrialQuery::default();
    let mut order_id = None;
    let mut idx = 0usize;
    while idx < rest.len() {
        match rest[idx].as_str() {
            "--source" => query.source = Some(take_value(rest, &mut idx, "--source")?),
            "--channel" => query.channel = Some(take_value(rest, &mut idx, "--channel")?),
            "--user-id" => query.user_id = Some(take_value(rest, &mut idx, "--user-id")?),
            "--order-id" => order_id = Some(take_value(rest, &mut idx, "--order-id")?),
            unknown => return Err(CliError::Args(format!("{cmd} 不支持参数: {unknown}"))),
        }
    }
    Ok((query, order_id))
}

fn parse_goods_cmd(rest: &[String]) -> Result<Command, CliError> {
    let sub = rest.first().map(String::as_str).unwrap_or("list");
    let tail = rest.get(1..).unwrap_or(&[]);
    match sub {
        "list" => {
            let mut query = SpuListQuery::default();
            let mut idx = 0usize;
            while idx < tail.len() {
                match tail[idx].as_str() {
                    "--keyword" => query.keyword = Some(take_value(tail, &mut idx, "--keyword")?),
                    "--page" => {
                        query.page = Some(parse_u32(&take_value(tail, &mut idx, "--page")?, "--page")?)
                    }
                    "--size" => {
                        query.size = Some(parse_u32(&take_value(tail, &mut idx, "--size")?, "--size")?)
                    }
                    unknown => {
                        return Err(CliError::Args(format!("goods list 不支持参数: {unknown}")));
                    }
                }
            }
            Ok(Command::GoodsList(query))
        }
        "detail" => positional(tail, "goods detail", "spuId").map(Command::GoodsDetail),
        "teams" => positional(tail, "goods teams", "spuId").map(Command::GoodsTeams),
        "trial" => {
            let sku_id = positional(tail, "goods trial", "skuId")?;
            let (query, _) = parse_trial_flags(&tail[1..], "goods trial")?;
            Ok(Command::GoodsTrial { sku_id, query })
        }
        other => Err(CliError::Args(format!("未知 goods 子命令: {other}"))),
    }
}

fn parse_trade_cmd(rest: &[String]) -> Result<Command, CliError> {
    let sub = rest
        .first()
        .ok_or_else(|| CliError::Args("trade 缺少子命令".to_string()))?;
    let tail = &rest[1..];
    match sub.as_str() {
        "lock" => {
            let sku_id = positional(tail, "trade lock", "skuId")?;
            let (query, order_id) = parse_trial_flags(&tail[1..], "trade lock")?;
            Ok(Command::TradeLock {
                sku_id,
                order_id,
                query,
            })
        }
        "get" => positional(tail, "trade get", "tradeOrderId").map(Command::TradeGet),
        "progress" => positional(tail, "trade progress", "orderId").map(Command::TradeProgress),
        "refund" => {
            let trade_order_id = positional(tail, "trade refund", "tradeOrderId")?;
            let mut reason = DEFAULT_REFUND_REASON.to_string();
            let rest = &tail[1..];
            let mut idx = 0usize;
            while idx < rest.len() {
                match rest[idx].as_str() {
                    "--reason" => reason = take_value(rest, &mut idx, "--reason")?,
                    unknown => {
                        return Err(CliError::Args(format!("trade refund 不支持参数: {unknown}")));
                    }
                }
            }
            Ok(Command::TradeRefund {
                trade_order_id,
                reason,
            })
        }
        other => Err(CliError::Args(format!("未知 trade 子命令: {other}"))),
    }
}

fn parse_pay_cmd(rest: &[String]) -> Result<Command, CliError> {
    let sub = rest
        .first()
        .ok_or_else(|| CliError::Args("pay 缺少子命令".to_string()))?;
    let tail = &rest[1..];
    match sub.as_str() {
        "create" => {
            let mut out_trade_no = None;
            let mut amount = None;
            let mut subject = None;
            let mut idx = 0usize;
            while idx < tail.len() {
                match tail[idx].as_str() {
                    "--out-trade-no" => {
                        out_trade_no = Some(take_value(tail, &mut idx, "--out-trade-no")?)
                    }
                    "--amount" => {
                        amount = Some(parse_f64(&take_value(tail, &mut idx, "--amount")?, "--amount")?)
                    }
                    "--subject" => subject = Some(take_value(tail, &mut idx, "--subject")?),
                    unknown => {
                        return Err(CliError::Args(format!("pay create 不支持参数: {unknown}")));
                    }
                }
            }
            let missing = |flag: &str| CliError::Args(format!("pay create 缺少 {flag}"));
            let amount = amount.ok_or_else(|| missing("--amount"))?;
            if amount <= 0.0 {
                return Err(CliError::Args("--amount 必须大于 0".to_string()));
            }
            Ok(Command::PayCreate(CreatePaymentRequest {
                out_trade_no: out_trade_no.ok_or_else(|| missing("--out-trade-no"))?,
                amount,
                subject: subject.ok_or_else(|| missing("--subject"))?,
            }))
        }
        "query" => positional(tail, "pay query", "outTradeNo").map(Command::PayQuery),
        other => Err(CliError::Args(format!("未知 pay 子命令: {other}"))),
    }
}

fn parse_admin_cmd(rest: &[String]) -> Result<Command, CliError> {
    let sub = rest
        .first()
        .ok_or_else(|| CliError::Args("admin 缺少子命令".to_string()))?;
    let tail = &rest[1..];
    match sub.as_str() {
        "stats" => Ok(Command::AdminStats),
        "users" => parse_page(tail, "admin users").map(Command::AdminUsers),
        "orders" => parse_page(tail, "admin orders").map(Command::AdminOrders),
        other => Err(CliError::Args(format!("未知 admin 子命令: {other}"))),
    }
}

fn parse_u32(raw: &str, flag: &str) -> Result<u32, CliError> {
    raw.parse::<u32>()
        .map_err(|_| CliError::Args(format!("{flag} 需要非负整数，收到: {raw}")))
}

fn parse_f64(raw: &str, flag: &str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .map_err(|_| CliError::Args(format!("{flag} 需要数字，收到: {raw}")))
}

fn fmt_price(v: Option<f64>) -> String {
    v.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".to_string())
}

fn navigation_json(result: &NavigationResult) -> Value {
    serde_json::json!({
        "path": result.location.path,
        "fullPath": result.location.full_path(),
        "name": result.route_name,
        "title": result.title,
        "params": result.params,
        "redirectedFrom": result.redirected_from,
    })
}

fn print_navigation(result: &NavigationResult) {
    println!("path: {}", result.location.full_path());
    println!("route: {}", result.route_name.unwrap_or("-"));
    println!("title: {}", result.title);
    if let Some(from) = &result.redirected_from {
        println!("redirectedFrom: {from}");
    }
}

fn print_json<T: Serialize>(data: &T) -> Result<(), CliError> {
    let s = serde_json::to_string_pretty(data).map_err(ClientError::from)?;
    println!("{s}");
    Ok(())
}

fn print_help() {
    println!(
        r#"group-buy（拼团营销系统命令行客户端）

全局参数：
  --base-url URL            API 基地址（默认读取 config.toml，否则 http://127.0.0.1:8080/api）
  --config PATH             配置文件路径（默认 GROUP_BUY_CONFIG 或 ./config.toml）
  --json                    JSON 输出（便于脚本集成）
  -h, --help                显示帮助

会话：
  login --username U [--password P] [--redirect PATH]
                            密码也可通过环境变量 GROUP_BUY_PASSWORD 提供
  register --username U --password P [--nickname N] [--phone P]
  logout
  whoami
  refresh                   使用 Refresh Token 换取新 Token

导航：
  navigate PATH             例如 /customer/home、/admin、/customer/progress/ORD1

C 端：
  goods list [--keyword K] [--page N] [--size N]
  goods detail SPU_ID
  goods trial SKU_ID [--source S] [--channel C] [--user-id U]
  goods teams SPU_ID
  trade lock SKU_ID [--order-id ORDER_ID] [--source S] [--channel C]
                            先试算再锁单，自动生成 outTradeNo
  trade get TRADE_ORDER_ID
  trade refund TRADE_ORDER_ID [--reason TEXT]
  trade progress ORDER_ID
  pay create --out-trade-no NO --amount F --subject TEXT
  pay query OUT_TRADE_NO
  profile
  orders [--page N] [--size N]

管理后台：
  admin stats
  admin users [--page N] [--size N]
  admin orders [--page N] [--size N]

示例：
  cargo run -- login --username alice --password secret
  cargo run -- navigate /admin
  cargo run -- --json goods trial SKU1001 --source s01 --channel c01
"#
    );
}
