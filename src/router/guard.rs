use crate::session::{Role, Session};

use super::LOGIN_PATH;
use super::location::Location;
use super::routes::RouteAccess;

/// 守卫对一次导航的裁决
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(Location),
    /// 会话状态异常（角色首页自身不可达），清空会话后回到登录页
    ForceLogout,
}

/// 当前会话角色对应的首页
fn role_home(session: &Session) -> &'static str {
    match session.role() {
        Some(Role::Admin) => Role::Admin.home_path(),
        _ => Role::User.home_path(),
    }
}

/// 按 公开 > 游客 > 需登录 的顺序裁决
pub fn evaluate(to: &Location, access: RouteAccess, session: &Session) -> GuardDecision {
    match access {
        RouteAccess::Open | RouteAccess::Public => GuardDecision::Allow,
        RouteAccess::GuestOnly => {
            if session.is_logged_in() {
                GuardDecision::Redirect(Location::new(role_home(session)))
            } else {
                GuardDecision::Allow
            }
        }
        RouteAccess::RequiresAuth { role } => {
            if !session.is_logged_in() {
                return GuardDecision::Redirect(
                    Location::new(LOGIN_PATH).with_query("redirect", to.full_path()),
                );
            }
            match role {
                Some(required) if session.role() != Some(required) => {
                    let home = role_home(session);
                    if to.path == home {
                        GuardDecision::ForceLogout
                    } else {
                        GuardDecision::Redirect(Location::new(home))
                    }
                }
                _ => GuardDecision::Allow,
            }
        }
    }
}
