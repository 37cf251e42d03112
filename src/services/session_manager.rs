//! 登录服务 - 业务能力层
//!
//! 是否已登录完全由页面上有没有验证码图片判断，从不缓存

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::PortalConfig;
use crate::error::{AppResult, CaptchaError, ConfigError, SessionError};
use crate::infrastructure::{Navigator, PortalDriver};
use crate::models::Credentials;
use crate::services::captcha::CaptchaSolver;

/// 最近一次观察到的登录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// 分别设置的账号和密码，两者都有才能登录
#[derive(Default)]
struct PendingCredentials {
    username: Option<String>,
    password: Option<String>,
}

impl PendingCredentials {
    fn complete(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            _ => None,
        }
    }
}

impl From<Option<Credentials>> for PendingCredentials {
    fn from(credentials: Option<Credentials>) -> Self {
        match credentials {
            Some(c) => Self {
                username: Some(c.username),
                password: Some(c.password),
            },
            None => Self::default(),
        }
    }
}

pub struct SessionManager<D> {
    navigator: Arc<Navigator<D>>,
    solver: Arc<dyn CaptchaSolver>,
    portal: Arc<PortalConfig>,
    credentials: RwLock<PendingCredentials>,
    state: RwLock<SessionState>,
    max_login_attempts: Option<usize>,
}

impl<D: PortalDriver> SessionManager<D> {
    pub fn new(
        navigator: Arc<Navigator<D>>,
        solver: Arc<dyn CaptchaSolver>,
        portal: Arc<PortalConfig>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            navigator,
            solver,
            portal,
            credentials: RwLock::new(credentials.into()),
            state: RwLock::new(SessionState::LoggedOut),
            max_login_attempts: None,
        }
    }

    /// 限制登录尝试次数（默认不限）
    pub fn with_max_login_attempts(mut self, max: Option<usize>) -> Self {
        self.max_login_attempts = max;
        self
    }

    pub async fn set_credentials(&self, credentials: Credentials) {
        *self.credentials.write().await = Some(credentials).into();
    }

    pub async fn set_username(&self, username: impl Into<String>) {
        self.credentials.write().await.username = Some(username.into());
    }

    pub async fn set_password(&self, password: impl Into<String>) {
        self.credentials.write().await.password = Some(password.into());
    }

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// 确保已登录
    ///
    /// 验证码识别错了表单会重新出现，这里一直重试直到通过
    pub async fn ensure_logged_in(&self) -> AppResult<()> {
        let driver = self.navigator.driver();
        let captcha = self.portal.captcha_image();
        let inputs = self.portal.login_inputs();
        let mut attempts = 0usize;

        loop {
            self.normalize_language().await?;
            self.navigator.goto(&self.portal.home_url).await?;

            if driver.count(&captcha).await? == 0 {
                *self.state.write().await = SessionState::LoggedIn;
                if attempts > 0 {
                    info!("✓ 登录成功 (共尝试 {} 次)", attempts);
                } else {
                    debug!("已处于登录状态");
                }
                return Ok(());
            }
            *self.state.write().await = SessionState::LoggedOut;

            if let Some(max) = self.max_login_attempts {
                if attempts >= max {
                    warn!("⚠️ 登录尝试已达上限 {} 次", max);
                    return Err(SessionError::LoginAttemptsExhausted(attempts).into());
                }
            }
            attempts += 1;

            let png = driver.screenshot(&captcha, 0).await?;
            let image = image::load_from_memory(&png).map_err(CaptchaError::from)?;
            let answer = self.solver.solve(&image).await?;
            debug!("第 {} 次登录, 验证码识别为 '{}'", attempts, answer);

            let credentials = self
                .credentials
                .read()
                .await
                .complete()
                .ok_or(ConfigError::CredentialsNotProvided)?;

            driver
                .type_text(&inputs, self.portal.username_field, &credentials.username)
                .await?;
            driver
                .type_text(&inputs, self.portal.password_field, &credentials.password)
                .await?;
            driver
                .type_text(&inputs, self.portal.captcha_field, &answer)
                .await?;
            driver.click(&self.portal.submit_button(), 0).await?;
        }
    }

    /// 切换到英文界面；找不到切换按钮说明已经是英文
    async fn normalize_language(&self) -> AppResult<()> {
        let driver = self.navigator.driver();
        let switch = self.portal.language_switch();
        if driver.count(&switch).await? > 0 {
            debug!("切换到英文界面");
            driver.click(&switch, 0).await?;
        }
        Ok(())
    }
}
