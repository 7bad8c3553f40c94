//! 路由表：静态重定向、`:param` 动态段与兜底 404。
//!
//! 父路由的元信息会合并进子路由（子路由可追加 `public` 等标记），
//! 最终折算为单一的 [`RouteAccess`]。

use crate::session::Role;

/// 路由访问控制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// 无任何限制（如 404 页）
    Open,
    /// 公开页面，优先级最高
    Public,
    /// 仅游客（登录/注册）
    GuestOnly,
    /// 需登录，可选限定角色
    RequiresAuth { role: Option<Role> },
}

/// 路由声明时的原始标记，父子合并后再折算
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetaFlags {
    pub public: bool,
    pub guest: bool,
    pub requires_auth: bool,
    pub role: Option<Role>,
}

impl MetaFlags {
    pub fn public() -> Self {
        Self {
            public: true,
            ..Self::default()
        }
    }

    pub fn guest() -> Self {
        Self {
            guest: true,
            ..Self::default()
        }
    }

    pub fn requires_role(role: Role) -> Self {
        Self {
            requires_auth: true,
            role: Some(role),
            ..Self::default()
        }
    }

    /// 子路由标记覆盖在父路由之上
    pub fn merge(self, child: MetaFlags) -> Self {
        Self {
            public: self.public || child.public,
            guest: self.guest || child.guest,
            requires_auth: self.requires_auth || child.requires_auth,
            role: child.role.or(self.role),
        }
    }

    /// public > guest > requiresAuth
    pub fn access(self) -> RouteAccess {
        if self.public {
            RouteAccess::Public
        } else if self.guest {
            RouteAccess::GuestOnly
        } else if self.requires_auth {
            RouteAccess::RequiresAuth { role: self.role }
        } else {
            RouteAccess::Open
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
    pub access: RouteAccess,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    /// 形如 `/customer/product/:spuId`
    pub pattern: String,
    pub name: Option<&'static str>,
    pub meta: RouteMeta,
    pub redirect: Option<&'static str>,
}

impl RouteRecord {
    fn page(
        pattern: impl Into<String>,
        name: &'static str,
        title: &'static str,
        flags: MetaFlags,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            name: Some(name),
            meta: RouteMeta {
                title: Some(title),
                access: flags.access(),
            },
            redirect: None,
        }
    }

    fn redirect(pattern: impl Into<String>, to: &'static str) -> Self {
        Self {
            pattern: pattern.into(),
            name: None,
            meta: RouteMeta {
                title: None,
                access: RouteAccess::Open,
            },
            redirect: Some(to),
        }
    }

    /// 匹配成功时返回捕获的动态参数
    fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let pattern: Vec<&str> = segments(&self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = Vec::new();
        for (p, a) in pattern.iter().zip(actual.iter()) {
            match p.strip_prefix(':') {
                Some(name) => params.push((name.to_string(), decode_param(a))),
                None if p == a => {}
                None => return None,
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// 动态参数按解码后的值交给页面；非法 UTF-8 序列保留原文
fn decode_param(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// 一次匹配的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    pub record: &'a RouteRecord,
    pub params: Vec<(String, String)>,
}

/// 带子路由的分组，用于声明父级布局
struct RouteGroup {
    prefix: &'static str,
    flags: MetaFlags,
    default_child: &'static str,
    children: Vec<(&'static str, &'static str, &'static str, MetaFlags)>,
}

impl RouteGroup {
    fn expand(self, out: &mut Vec<RouteRecord>) {
        out.push(RouteRecord::redirect(self.prefix, self.default_child));
        for (segment, name, title, flags) in self.children {
            out.push(RouteRecord::page(
                format!("{}/{}", self.prefix, segment),
                name,
                title,
                self.flags.merge(flags),
            ));
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    records: Vec<RouteRecord>,
    fallback: RouteRecord,
}

impl RouteTable {
    /// 拼团营销系统的完整路由表
    pub fn standard() -> Self {
        let none = MetaFlags::default();
        let mut records = vec![
            RouteRecord::redirect("/", "/login"),
            RouteRecord::page("/login", "Login", "登录", MetaFlags::guest()),
            RouteRecord::page("/register", "Register", "注册", MetaFlags::guest()),
        ];

        RouteGroup {
            prefix: "/customer",
            flags: MetaFlags::requires_role(Role::User),
            default_child: "/customer/home",
            children: vec![
                ("home", "CustomerHome", "首页", none),
                ("product/:spuId", "ProductDetail", "商品详情", none),
                ("lock-order", "LockOrder", "确认订单", none),
                ("payment/:tradeOrderId", "Payment", "支付", none),
                ("progress/:orderId", "GroupProgress", "拼团进度", MetaFlags::public()),
                ("profile", "CustomerProfile", "个人中心", none),
                ("orders", "CustomerOrders", "我的订单", none),
            ],
        }
        .expand(&mut records);

        RouteGroup {
            prefix: "/admin",
            flags: MetaFlags::requires_role(Role::Admin),
            default_child: "/admin/dashboard",
            children: vec![
                ("dashboard", "AdminDashboard", "仪表盘", none),
                ("activities", "AdminActivities", "活动管理", none),
                ("goods", "AdminGoods", "商品管理", none),
                ("orders", "AdminOrders", "订单管理", none),
                ("users", "AdminUsers", "用户管理", none),
                ("tags", "AdminTags", "人群标签", none),
                ("settings", "AdminSettings", "流控设置", none),
            ],
        }
        .expand(&mut records);

        Self {
            records,
            fallback: RouteRecord::page("/:pathMatch", "NotFound", "页面不存在", none),
        }
    }

    pub fn records(&self) -> &[RouteRecord] {
        &self.records
    }

    /// 按声明顺序匹配，均不命中时落到 NotFound
    pub fn resolve(&self, path: &str) -> ResolvedRoute<'_> {
        for record in &self.records {
            if let Some(params) = record.matches(path) {
                return ResolvedRoute { record, params };
            }
        }
        ResolvedRoute {
            record: &self.fallback,
            params: vec![("pathMatch".to_string(), decode_param(path.trim_start_matches('/')))],
        }
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RouteRecord> {
        self.records.iter().find(|r| r.name == Some(name))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}
