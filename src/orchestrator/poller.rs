//! 轮询器 - 编排层
//!
//! ## 职责
//!
//! 1. **重试**：页面暂时性错误（元素失效 / 找不到元素）整轮重试，次数有限
//! 2. **节奏**：每次失败后放慢导航节奏
//! 3. **循环**：按间隔反复检查，或只检查一次
//! 4. **互斥**：同一时间最多只有一轮检查在进行
//! 5. **通知**：每轮成功后调用回调

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Refresh;
use crate::error::{AppError, AppResult};
use crate::infrastructure::PortalDriver;
use crate::models::{CourseKey, FoundResult, SectionSpec, WatchList};
use crate::utils::logging;
use crate::workflow::WatchCycle;

/// 每轮检查结束后的回调
pub type Target = Arc<dyn Fn(&FoundResult) + Send + Sync>;

pub struct Poller<D> {
    cycle: WatchCycle<D>,
    watch_list: RwLock<WatchList>,
    target: Target,
    refresh: RwLock<Refresh>,
    retry_attempts: usize,
    /// 保证同一时间只有一轮检查
    cycle_lock: Mutex<()>,
}

impl<D: PortalDriver + 'static> Poller<D> {
    pub fn new(cycle: WatchCycle<D>, target: Target, refresh: Refresh, retry_attempts: usize) -> Self {
        Self {
            cycle,
            watch_list: RwLock::new(WatchList::new()),
            target,
            refresh: RwLock::new(refresh),
            retry_attempts: retry_attempts.max(1),
            cycle_lock: Mutex::new(()),
        }
    }

    pub fn with_watch_list(self, watch_list: WatchList) -> Self {
        Self {
            watch_list: RwLock::new(watch_list),
            ..self
        }
    }

    pub fn cycle(&self) -> &WatchCycle<D> {
        &self.cycle
    }

    /// 添加关注的班级（运行中也可以调用，下一轮生效）
    pub async fn add_sections(
        &self,
        course_id: &str,
        sections: impl Into<SectionSpec>,
    ) -> AppResult<CourseKey> {
        Ok(self.watch_list.write().await.add_sections(course_id, sections)?)
    }

    pub async fn watch_list(&self) -> WatchList {
        self.watch_list.read().await.clone()
    }

    pub async fn set_refresh(&self, refresh: Refresh) {
        *self.refresh.write().await = refresh;
    }

    /// 立即检查一次，返回结果但不调用回调
    ///
    /// 如果循环中正有一轮检查在进行，会等它结束后再开始
    pub async fn check_now(&self) -> AppResult<FoundResult> {
        let _guard = self.cycle_lock.lock().await;
        let watch_list = self.watch_list().await;
        self.cycle.run(&watch_list).await
    }

    /// 带重试的一轮检查
    pub async fn check_with_retry(&self) -> AppResult<FoundResult> {
        let mut attempt = 1;
        loop {
            match self.check_now().await {
                Ok(found) => return Ok(found),
                Err(e) if e.is_transient() => {
                    warn!(
                        "⚠️ 第 {}/{} 次检查失败: {}",
                        attempt, self.retry_attempts, e
                    );
                    if attempt >= self.retry_attempts {
                        return Err(AppError::CouldNotFinishOperation {
                            attempts: self.retry_attempts,
                            last: Box::new(e),
                        });
                    }
                    self.cycle.navigator().slow_down().await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// 持续检查，直到只检查一次的配置完成或出现致命错误
    pub async fn watch_loop(&self) -> AppResult<()> {
        loop {
            let found = self.check_with_retry().await.map_err(|e| {
                error!("❌ 停止检查: {}", e);
                e
            })?;

            logging::log_cycle_result(&found);
            (self.target)(&found);

            let refresh = *self.refresh.read().await;
            match refresh {
                Refresh::Once => {
                    info!("只检查一次，结束");
                    return Ok(());
                }
                Refresh::Every(interval) => {
                    info!("💤 {:?} 后再次检查", interval);
                    sleep(interval).await;
                }
            }
        }
    }

    /// 在后台任务中运行检查循环，不阻塞调用方
    pub fn spawn(self: Arc<Self>) -> JoinHandle<AppResult<()>> {
        tokio::spawn(async move { self.watch_loop().await })
    }
}
