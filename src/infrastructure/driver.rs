//! 浏览器驱动能力 - 基础设施层
//!
//! 业务层只通过 `PortalDriver` 操作页面，不直接接触 chromiumoxide，
//! 测试中可以换成内存里的假门户

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::error::BrowserError;

/// 元素定位方式
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Locator::XPath(selector.into())
    }

    /// 文字中包含 `text` 的任意元素
    pub fn containing_text(text: &str) -> Self {
        Locator::XPath(format!("//*[contains(text(), {})]", xpath_literal(text)))
    }

    /// 上一级元素（仅 XPath 支持，CSS 原样返回）
    pub fn parent(self) -> Self {
        match self {
            Locator::XPath(path) => Locator::XPath(format!("{}/..", path)),
            css => css,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={}", s),
            Locator::XPath(s) => write!(f, "xpath={}", s),
        }
    }
}

/// XPath 字符串字面量（同时含单双引号时用 concat 拼接）
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// 页面操作能力
///
/// 所有方法都针对当前页面；`nth` 是同一定位结果中的第几个元素（从 0 开始）
#[async_trait]
pub trait PortalDriver: Send + Sync {
    /// 打开网址并等待加载
    async fn goto(&self, url: &str) -> Result<(), BrowserError>;

    /// 当前匹配的元素个数
    async fn count(&self, locator: &Locator) -> Result<usize, BrowserError>;

    async fn click(&self, locator: &Locator, nth: usize) -> Result<(), BrowserError>;

    async fn type_text(&self, locator: &Locator, nth: usize, text: &str) -> Result<(), BrowserError>;

    /// 在下拉框中选择第 `option` 项
    async fn select_option(
        &self,
        locator: &Locator,
        nth: usize,
        option: usize,
    ) -> Result<(), BrowserError>;

    /// 元素所有子孙节点的可见文字（按文档顺序）
    async fn read_texts(&self, locator: &Locator, nth: usize) -> Result<Vec<String>, BrowserError>;

    /// 元素截图（PNG）
    async fn screenshot(&self, locator: &Locator, nth: usize) -> Result<Vec<u8>, BrowserError>;

    /// 等待元素出现，超时返回 false
    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<bool, BrowserError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.count(locator).await? > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(Duration::from_millis(100)).await;
        }
    }
}
