use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{AppError, AppResult, BrowserError};

/// 连接到已打开的浏览器（调试端口）并获取门户页面
///
/// 已有标签页的地址以 `home_url` 开头时直接复用，否则新建页面
pub async fn connect_to_browser_and_page(port: u16, home_url: &str) -> AppResult<(Browser, Page)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        AppError::browser_connection_failed(port, e)
    })?;
    debug!("浏览器连接成功");

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

    let pages = browser.pages().await?;
    debug!("获取到 {} 个页面", pages.len());

    let origin = portal_origin(home_url);
    for p in pages.iter() {
        if let Ok(Some(url)) = p.url().await {
            debug!("检查页面: {}", url);
            if url.starts_with(origin) {
                info!("✓ 复用已打开的门户页面: {}", url);
                return Ok((browser, p.clone()));
            }
        }
    }

    debug!("创建新页面并导航到: {}", home_url);
    let page = browser.new_page(home_url).await.map_err(|e| {
        error!("导航到 {} 失败: {}", home_url, e);
        BrowserError::NavigationFailed {
            url: home_url.to_string(),
            source: Box::new(e),
        }
    })?;
    info!("已导航到: {}", home_url);

    Ok((browser, page))
}

/// 取网址中协议 + 主机 + 端口部分
fn portal_origin(url: &str) -> &str {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(i) => &url[..after_scheme + i],
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_origin() {
        assert_eq!(
            portal_origin("https://regweb1.ju.edu.jo:4443/selfregapp/home.xhtml"),
            "https://regweb1.ju.edu.jo:4443"
        );
        assert_eq!(portal_origin("http://localhost:8080"), "http://localhost:8080");
    }
}
