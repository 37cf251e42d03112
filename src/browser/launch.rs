use std::path::Path;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::browser::BrowserEngine;
use crate::error::{AppResult, BrowserError};

/// 启动浏览器并导航到指定 URL
pub async fn launch_browser(
    engine: BrowserEngine,
    headless: bool,
    executable: Option<&str>,
    url: &str,
) -> AppResult<(Browser, Page)> {
    info!("🚀 启动浏览器 ({:?}, 无头: {})...", engine, headless);
    debug!("目标 URL: {}", url);

    let mut builder = BrowserConfig::builder();
    builder = if headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(path) = executable.or(engine.default_executable()) {
        debug!("浏览器可执行文件: {}", path);
        builder = builder.chrome_executable(Path::new(path));
    }

    let config = builder
        .args(vec![
            "--disable-gpu",           // Windows 无头模式必须禁用 GPU
            "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
            "--disable-dev-shm-usage", // 防止共享内存不足
        ])
        .build()
        .map_err(|e| {
            error!("配置浏览器失败: {}", e);
            BrowserError::LaunchFailed(format!("配置浏览器失败: {}", e))
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed(e.to_string())
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page(url).await.map_err(|e| {
        error!("创建页面失败: {}", e);
        BrowserError::NavigationFailed {
            url: url.to_string(),
            source: Box::new(e),
        }
    })?;

    info!("✅ 浏览器已导航到: {}", url);
    Ok((browser, page))
}
