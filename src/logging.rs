use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// 初始化全局日志。`RUST_LOG` 优先于配置文件；重复初始化静默忽略。
///
/// 日志写到 stderr，stdout 留给命令输出。
pub fn init_tracing(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "group_buy_client={level},group_buy={level}",
            level = cfg.level
        ))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match cfg.format.as_str() {
        "compact" => builder.compact().try_init(),
        _ => builder.try_init(),
    };
}
