use std::sync::Arc;

use anyhow::Result;
use seat_watch::utils::logging;
use seat_watch::{App, Config, FoundResult, Target};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 发现空位时的回调
    let target: Target = Arc::new(|found: &FoundResult| {
        for line in logging::describe_open_sections(found) {
            info!("🎉 {}", line);
        }
    });

    // 初始化并运行应用
    App::initialize(config, target, None).await?.run().await?;

    Ok(())
}
