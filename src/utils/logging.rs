/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Refresh};
use crate::models::FoundResult;

/// 初始化日志
///
/// 优先使用 `RUST_LOG`，否则默认 info（详细模式为 debug）
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config, course_count: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 选课空位监控");
    info!("🌐 门户: {}", config.portal.home_url);
    info!("📚 关注课程: {} 门", course_count);
    match config.refresh() {
        Refresh::Once => info!("⏱️ 只检查一次"),
        Refresh::Every(interval) => info!("⏱️ 每 {} 分钟检查一次", interval.as_secs() / 60),
    }
    info!("{}", "=".repeat(60));
}

/// 记录一轮检查结果
pub fn log_cycle_result(found: &FoundResult) {
    info!("\n{}", "─".repeat(60));
    info!(
        "📊 检查完成 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    if found.is_empty() {
        info!("没有发现空位");
    } else {
        for line in describe_open_sections(found) {
            info!("✅ {}", line);
        }
    }
    info!("{}", "─".repeat(60));
}

/// 每门课程一行的可读描述
pub fn describe_open_sections(found: &FoundResult) -> Vec<String> {
    found
        .iter()
        .map(|(course_id, sections)| {
            let list = sections
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{} section(s) from {} are open: {}",
                sections.len(),
                course_id,
                list
            )
        })
        .collect()
}
