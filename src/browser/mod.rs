pub mod connection;
pub mod launch;

use std::str::FromStr;
use std::time::Duration;

pub use connection::connect_to_browser_and_page;
pub use launch::launch_browser;

use crate::error::ConfigError;

/// 支持的浏览器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserEngine {
    /// Chrome / Chromium（自动查找可执行文件）
    Chromium,
    /// Microsoft Edge（同为 Chromium 内核）
    Edge,
}

impl BrowserEngine {
    /// 默认可执行文件路径，None 表示交给 chromiumoxide 自动查找
    pub fn default_executable(self) -> Option<&'static str> {
        match self {
            BrowserEngine::Chromium => None,
            BrowserEngine::Edge => {
                Some(r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe")
            }
        }
    }

    /// 页面读取前的最小等待时间
    pub fn minimum_delay(self) -> Duration {
        Duration::from_millis(500)
    }
}

impl FromStr for BrowserEngine {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ch" | "chrome" | "chromium" => Ok(BrowserEngine::Chromium),
            "edge" | "msedge" => Ok(BrowserEngine::Edge),
            _ => Err(ConfigError::InvalidDriverArgument(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine() {
        assert_eq!("ch".parse::<BrowserEngine>().unwrap(), BrowserEngine::Chromium);
        assert_eq!("Chrome".parse::<BrowserEngine>().unwrap(), BrowserEngine::Chromium);
        assert_eq!("edge".parse::<BrowserEngine>().unwrap(), BrowserEngine::Edge);
    }

    #[test]
    fn test_unsupported_engine() {
        assert!(matches!(
            "ff".parse::<BrowserEngine>(),
            Err(ConfigError::InvalidDriverArgument(ref name)) if name == "ff"
        ));
        assert!("safari".parse::<BrowserEngine>().is_err());
    }
}
