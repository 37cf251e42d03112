//! 导航节奏控制
//!
//! 每次打开网址都记录耗时，之后读页面前的等待时间按耗时放大；
//! 每次整轮重试后放大系数再增加，网站越慢等得越久

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::BrowserError;
use crate::infrastructure::driver::PortalDriver;

const INITIAL_DELAY: Duration = Duration::from_millis(50);
const INITIAL_FACTOR: f64 = 1.5;
const FACTOR_STEP: f64 = 0.5;
const MAX_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
struct Pacing {
    delay: Duration,
    factor: f64,
    minimum: Duration,
}

/// 等待时间 = min(耗时 × 系数 + 最小值, 10 秒)
pub fn next_delay(elapsed: Duration, factor: f64, minimum: Duration) -> Duration {
    (elapsed.mul_f64(factor) + minimum).min(MAX_DELAY)
}

pub struct Navigator<D> {
    driver: Arc<D>,
    pacing: Mutex<Pacing>,
}

impl<D: PortalDriver> Navigator<D> {
    pub fn new(driver: Arc<D>, minimum: Duration) -> Self {
        Self {
            driver,
            pacing: Mutex::new(Pacing {
                delay: INITIAL_DELAY,
                factor: INITIAL_FACTOR,
                minimum,
            }),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// 打开网址并根据耗时更新等待时间
    pub async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let started = Instant::now();
        self.driver.goto(url).await?;
        let elapsed = started.elapsed();

        let mut pacing = self.pacing.lock().await;
        pacing.delay = next_delay(elapsed, pacing.factor, pacing.minimum);
        debug!("页面加载耗时 {:?}, 之后等待 {:?}", elapsed, pacing.delay);
        Ok(())
    }

    /// 等页面稳定
    pub async fn settle(&self) {
        let delay = self.delay().await;
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }

    /// 整轮失败后放慢节奏
    pub async fn slow_down(&self) {
        let mut pacing = self.pacing.lock().await;
        pacing.factor += FACTOR_STEP;
        debug!("等待系数提高到 {}", pacing.factor);
    }

    pub async fn delay(&self) -> Duration {
        self.pacing.lock().await.delay
    }

    pub async fn factor(&self) -> f64 {
        self.pacing.lock().await.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_scales_elapsed() {
        let delay = next_delay(Duration::from_millis(200), 1.5, Duration::ZERO);
        assert_eq!(delay, Duration::from_millis(300));

        let delay = next_delay(Duration::from_millis(200), 2.0, Duration::from_millis(500));
        assert_eq!(delay, Duration::from_millis(900));
    }

    #[test]
    fn test_next_delay_is_capped() {
        let delay = next_delay(Duration::from_secs(30), 1.5, Duration::from_millis(500));
        assert_eq!(delay, MAX_DELAY);
    }
}
