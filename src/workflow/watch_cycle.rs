//! 单轮检查流程 - 流程层
//!
//! 流程顺序：
//! 1. 确保登录
//! 2. 打开开课查询页
//! 3. 逐个系扫描关注的课程
//! 4. 回到首页

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{Config, PortalConfig};
use crate::error::AppResult;
use crate::infrastructure::{Navigator, PortalDriver};
use crate::models::{Catalog, Credentials, FoundResult, WatchList};
use crate::services::{CaptchaSolver, Scanner, SessionManager};

/// 单轮检查的参数
#[derive(Debug, Clone)]
pub struct CycleOptions {
    /// 读取页面前的最小等待时间
    pub minimum_delay: Duration,
    /// 等待分页控件的时间
    pub pagination_wait: Duration,
    /// 登录尝试上限
    pub max_login_attempts: Option<usize>,
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            minimum_delay: Duration::ZERO,
            pagination_wait: Duration::from_millis(1000),
            max_login_attempts: None,
        }
    }
}

impl CycleOptions {
    pub fn from_config(config: &Config, minimum_delay: Duration) -> Self {
        Self {
            minimum_delay,
            pagination_wait: Duration::from_millis(config.pagination_wait_ms),
            max_login_attempts: config.max_login_attempts,
        }
    }
}

/// 单轮检查
///
/// - 持有唯一的 Navigator（以及其中的页面驱动）
/// - 不处理重试，出错直接返回给上层
pub struct WatchCycle<D> {
    navigator: Arc<Navigator<D>>,
    session: SessionManager<D>,
    scanner: Scanner<D>,
    portal: Arc<PortalConfig>,
}

impl<D: PortalDriver> WatchCycle<D> {
    pub fn new(
        driver: Arc<D>,
        portal: PortalConfig,
        catalog: Catalog,
        solver: Arc<dyn CaptchaSolver>,
        credentials: Option<Credentials>,
        options: CycleOptions,
    ) -> Self {
        let navigator = Arc::new(Navigator::new(driver, options.minimum_delay));
        let portal = Arc::new(portal);

        let session = SessionManager::new(navigator.clone(), solver, portal.clone(), credentials)
            .with_max_login_attempts(options.max_login_attempts);
        let scanner = Scanner::new(
            navigator.clone(),
            portal.clone(),
            Arc::new(catalog),
            options.pagination_wait,
        );

        Self {
            navigator,
            session,
            scanner,
            portal,
        }
    }

    pub fn navigator(&self) -> &Navigator<D> {
        &self.navigator
    }

    pub fn session(&self) -> &SessionManager<D> {
        &self.session
    }

    /// 执行一轮完整检查，结果每轮重新生成
    pub async fn run(&self, watch_list: &WatchList) -> AppResult<FoundResult> {
        self.session.ensure_logged_in().await?;

        let mut found = FoundResult::new();
        self.scanner.open_schedule().await?;

        for (faculty_id, department_id, courses) in watch_list.departments() {
            info!(
                "🔍 扫描 学院 {} / 系 {} ({} 门课程)",
                faculty_id,
                department_id,
                courses.len()
            );
            let partial = self.scanner.scan(faculty_id, department_id, courses).await?;
            found.merge(partial);
        }

        self.navigator.goto(&self.portal.home_url).await?;
        Ok(found)
    }
}
