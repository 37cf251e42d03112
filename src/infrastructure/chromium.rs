//! 基于 chromiumoxide 的页面驱动
//!
//! 点击、输入、截图走 CDP 元素接口（产生真实的鼠标/键盘事件）；
//! 计数、读文字、选下拉框走页面内 JS，一次往返完成

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::BrowserError;
use crate::infrastructure::driver::{Locator, PortalDriver};

/// 持有唯一的 Page 资源，不认识课程 / 班级
pub struct ChromiumDriver {
    page: Page,
}

impl ChromiumDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 执行 JS 表达式并反序列化结果
    async fn eval_as<T: DeserializeOwned>(&self, js_code: String) -> Result<T, BrowserError> {
        let result = self
            .page
            .evaluate(js_code)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed {
                source: Box::new(e),
            })?;
        Ok(result.into_value()?)
    }

    async fn element(&self, locator: &Locator, nth: usize) -> Result<Element, BrowserError> {
        let elements = match locator {
            Locator::Css(selector) => self.page.find_elements(selector.as_str()).await?,
            Locator::XPath(path) => self.page.find_xpaths(path.as_str()).await?,
        };
        elements
            .into_iter()
            .nth(nth)
            .ok_or_else(|| BrowserError::ElementNotFound {
                locator: locator.to_string(),
                nth,
            })
    }
}

/// 生成返回匹配节点数组的 JS 表达式
fn nodes_js(locator: &Locator) -> Result<String, BrowserError> {
    let (kind, selector) = match locator {
        Locator::Css(s) => ("css", s),
        Locator::XPath(s) => ("xpath", s),
    };
    let selector = serde_json::to_string(selector)?;
    Ok(format!(
        r#"((kind, selector) => {{
            if (kind === 'xpath') {{
                const snapshot = document.evaluate(selector, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                const nodes = [];
                for (let i = 0; i < snapshot.snapshotLength; i++) nodes.push(snapshot.snapshotItem(i));
                return nodes;
            }}
            return Array.from(document.querySelectorAll(selector));
        }})('{}', {})"#,
        kind, selector
    ))
}

#[async_trait]
impl PortalDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed {
                url: url.to_string(),
                source: Box::new(e),
            })?;
        Ok(())
    }

    async fn count(&self, locator: &Locator) -> Result<usize, BrowserError> {
        let js_code = format!("{}.length", nodes_js(locator)?);
        self.eval_as(js_code).await
    }

    async fn click(&self, locator: &Locator, nth: usize) -> Result<(), BrowserError> {
        self.element(locator, nth).await?.click().await?;
        Ok(())
    }

    async fn type_text(&self, locator: &Locator, nth: usize, text: &str) -> Result<(), BrowserError> {
        let element = self.element(locator, nth).await?;
        element.click().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn select_option(
        &self,
        locator: &Locator,
        nth: usize,
        option: usize,
    ) -> Result<(), BrowserError> {
        // PrimeFaces 的下拉框外层是 div，真正的 select 藏在里面
        let js_code = format!(
            r#"(() => {{
                const node = {}[{}];
                if (!node) return false;
                const select = node.tagName === 'SELECT' ? node : node.querySelector('select');
                if (!select || select.options.length <= {}) return false;
                select.selectedIndex = {};
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            nodes_js(locator)?,
            nth,
            option,
            option
        );
        if self.eval_as::<bool>(js_code).await? {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound {
                locator: format!("{} option {}", locator, option),
                nth,
            })
        }
    }

    async fn read_texts(&self, locator: &Locator, nth: usize) -> Result<Vec<String>, BrowserError> {
        let js_code = format!(
            r#"(() => {{
                const node = {}[{}];
                if (!node) return null;
                return Array.from(node.querySelectorAll('*')).map(e => (e.innerText || '').trim());
            }})()"#,
            nodes_js(locator)?,
            nth
        );
        self.eval_as::<Option<Vec<String>>>(js_code)
            .await?
            .ok_or_else(|| BrowserError::ElementNotFound {
                locator: locator.to_string(),
                nth,
            })
    }

    async fn screenshot(&self, locator: &Locator, nth: usize) -> Result<Vec<u8>, BrowserError> {
        let element = self.element(locator, nth).await?;
        Ok(element.screenshot(CaptureScreenshotFormat::Png).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_js_escapes_selector() {
        let js = nodes_js(&Locator::containing_text("it's")).unwrap();
        assert!(js.contains(r#"('xpath', "//*[contains(text(), \"it's\")]")"#));

        let js = nodes_js(&Locator::css("[id='loginform:imgCaptchaId']")).unwrap();
        assert!(js.contains(r#"('css', "[id='loginform:imgCaptchaId']")"#));
    }
}
