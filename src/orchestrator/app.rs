//! 应用入口 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：检查浏览器类型、读取账号和关注文件、启动/连接浏览器
//! 2. **组装**：ChromiumDriver → WatchCycle → Poller
//! 3. **资源管理**：持有 Browser，确保整个运行期间浏览器不被关闭
//! 4. **运行**：在后台任务中跑检查循环并等待其结束

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chromiumoxide::Browser;
use tracing::{info, warn};

use crate::browser::{self, BrowserEngine};
use crate::config::Config;
use crate::infrastructure::ChromiumDriver;
use crate::models::{load_watch_file, Catalog, Credentials, WatchFile};
use crate::orchestrator::poller::{Poller, Target};
use crate::services::{CaptchaSolver, TesseractSolver};
use crate::utils::logging;
use crate::workflow::{CycleOptions, WatchCycle};

/// 应用主结构
pub struct App {
    _browser: Browser,
    poller: Arc<Poller<ChromiumDriver>>,
}

impl App {
    /// 初始化应用
    ///
    /// `solver` 为 None 时使用内置的 tesseract 识别器
    pub async fn initialize(
        config: Config,
        target: Target,
        solver: Option<Arc<dyn CaptchaSolver>>,
    ) -> Result<Self> {
        // 先检查浏览器类型，不支持的直接报错
        let engine: BrowserEngine = config.browser_engine.parse()?;

        let watch_file = load_watch_file_or_default(&config.watch_file).await?;
        let watch_list = watch_file
            .watch_list()
            .context("关注文件中的课程无效")?;

        logging::log_startup(&config, watch_list.course_count());

        let credentials = Credentials::resolve(
            config.username.clone(),
            config.password.clone(),
            config.credentials_file.as_deref().map(Path::new),
        )
        .await?;
        if credentials.is_none() {
            warn!("⚠️ 未提供账号密码，需要登录时会失败");
        }

        if watch_file.portal.is_some() {
            info!("使用关注文件中的 [portal] 配置（环境变量中的网址仍然优先）");
        }
        let portal = config.effective_portal(watch_file.portal.as_ref());
        let home_url = portal.home_url.clone();

        let (browser, page) = match config.browser_debug_port {
            Some(port) => browser::connect_to_browser_and_page(port, &home_url).await?,
            None => {
                browser::launch_browser(
                    engine,
                    config.headless,
                    config.browser_executable.as_deref(),
                    &home_url,
                )
                .await?
            }
        };

        let solver = solver.unwrap_or_else(|| Arc::new(TesseractSolver::new(&config.tesseract_cmd)));
        let catalog = Catalog::default().with_overrides(watch_file.catalog);

        let cycle = WatchCycle::new(
            Arc::new(ChromiumDriver::new(page)),
            portal,
            catalog,
            solver,
            credentials,
            CycleOptions::from_config(&config, engine.minimum_delay()),
        );
        let poller = Poller::new(cycle, target, config.refresh(), config.retry_attempts)
            .with_watch_list(watch_list);

        Ok(Self {
            _browser: browser,
            poller: Arc::new(poller),
        })
    }

    /// 获取轮询器（可用于添加关注、手动检查）
    pub fn poller(&self) -> Arc<Poller<ChromiumDriver>> {
        self.poller.clone()
    }

    /// 运行检查循环直到结束
    pub async fn run(self) -> Result<()> {
        let handle = self.poller.clone().spawn();
        info!("🚀 检查循环已在后台启动");

        handle.await.context("检查任务异常退出")??;
        Ok(())
    }
}

/// 关注文件不存在时使用空列表（之后可通过 `add_sections` 添加）
async fn load_watch_file_or_default(path: &str) -> Result<WatchFile> {
    let path = Path::new(path);
    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("无法访问关注文件 {}", path.display()))?;
    if !exists {
        warn!("⚠️ 关注文件 {} 不存在，从空列表开始", path.display());
        return Ok(WatchFile::default());
    }
    Ok(load_watch_file(path).await?)
}
