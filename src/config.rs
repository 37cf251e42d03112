use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::Locator;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 门户网址、选择器等
    pub portal: PortalConfig,
    /// 环境变量中指定的首页 / 开课查询页网址，优先于关注文件
    pub target_url: Option<String>,
    pub schedule_url: Option<String>,
    /// 账号文件（第一行账号，第二行密码）
    pub credentials_file: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// 是否无头运行
    pub headless: bool,
    /// 检查间隔（分钟），-1 表示只检查一次
    pub refresh_minutes: i64,
    /// 浏览器类型（ch / chrome / chromium / edge）
    pub browser_engine: String,
    /// 自定义浏览器可执行文件
    pub browser_executable: Option<String>,
    /// 连接已打开的浏览器（调试端口），不设置则自行启动
    pub browser_debug_port: Option<u16>,
    /// 关注列表文件
    pub watch_file: String,
    /// tesseract 可执行文件
    pub tesseract_cmd: String,
    /// 单轮检查的最大尝试次数
    pub retry_attempts: usize,
    /// 等待分页控件出现的时间（毫秒）
    pub pagination_wait_ms: u64,
    /// 登录尝试上限，不设置则一直尝试
    pub max_login_attempts: Option<usize>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            target_url: None,
            schedule_url: None,
            credentials_file: None,
            username: None,
            password: None,
            headless: false,
            refresh_minutes: 5,
            browser_engine: "ch".to_string(),
            browser_executable: None,
            browser_debug_port: None,
            watch_file: "watch.toml".to_string(),
            tesseract_cmd: "tesseract".to_string(),
            retry_attempts: 5,
            pagination_wait_ms: 1000,
            max_login_attempts: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 按名称查询配置项，未设置或无法解析时使用默认值
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        let parsed = ParsedVars(&lookup);

        let mut config = Self {
            portal: default.portal,
            target_url: lookup("TARGET_URL"),
            schedule_url: lookup("SCHEDULE_URL"),
            credentials_file: lookup("CREDENTIALS_FILE").or(default.credentials_file),
            username: lookup("PORTAL_USERNAME").or(default.username),
            password: lookup("PORTAL_PASSWORD").or(default.password),
            headless: parsed.get("HEADLESS").unwrap_or(default.headless),
            refresh_minutes: parsed.get("REFRESH_MINUTES").unwrap_or(default.refresh_minutes),
            browser_engine: lookup("BROWSER_ENGINE").unwrap_or(default.browser_engine),
            browser_executable: lookup("BROWSER_EXECUTABLE").or(default.browser_executable),
            browser_debug_port: parsed.get("BROWSER_DEBUG_PORT").or(default.browser_debug_port),
            watch_file: lookup("WATCH_FILE").unwrap_or(default.watch_file),
            tesseract_cmd: lookup("TESSERACT_CMD").unwrap_or(default.tesseract_cmd),
            retry_attempts: parsed.get("RETRY_ATTEMPTS").unwrap_or(default.retry_attempts),
            pagination_wait_ms: parsed.get("PAGINATION_WAIT_MS").unwrap_or(default.pagination_wait_ms),
            max_login_attempts: parsed.get("MAX_LOGIN_ATTEMPTS").or(default.max_login_attempts),
            verbose_logging: parsed.get("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
        };
        config.portal = config.effective_portal(None);
        config
    }

    pub fn refresh(&self) -> Refresh {
        Refresh::from_minutes(self.refresh_minutes)
    }

    /// 实际使用的门户参数
    ///
    /// 关注文件中的 `[portal]` 替换默认值，环境变量中的网址再覆盖在上面
    pub fn effective_portal(&self, from_file: Option<&PortalConfig>) -> PortalConfig {
        let mut portal = from_file.cloned().unwrap_or_else(|| self.portal.clone());
        if let Some(url) = &self.target_url {
            portal.home_url = url.clone();
        }
        if let Some(url) = &self.schedule_url {
            portal.schedule_url = url.clone();
        }
        portal
    }
}

/// 把字符串配置项解析成目标类型
struct ParsedVars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> ParsedVars<'_, F> {
    fn get<T: FromStr>(&self, key: &str) -> Option<T> {
        (self.0)(key).and_then(|v| v.trim().parse().ok())
    }
}

/// 检查频率
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// 检查一次就结束
    Once,
    /// 每隔一段时间检查一次
    Every(Duration),
}

impl Refresh {
    /// 负数（约定为 -1）表示只检查一次
    pub fn from_minutes(minutes: i64) -> Self {
        match u64::try_from(minutes) {
            Ok(minutes) => Refresh::Every(Duration::from_secs(minutes.saturating_mul(60))),
            Err(_) => Refresh::Once,
        }
    }
}

/// 门户网站的固定参数
///
/// 网址、CSS 类名、元素 ID 以及表格列位置都只适用于目标学校的选课系统，
/// 换一个门户需要在关注文件的 `[portal]` 中覆盖
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// 登录页 / 首页
    pub home_url: String,
    /// 开课查询页
    pub schedule_url: String,
    /// 切换英文界面的按钮文字
    pub language_switch_text: String,
    pub captcha_image_id: String,
    pub input_class: String,
    pub username_field: usize,
    pub password_field: usize,
    pub captcha_field: usize,
    pub submit_class: String,
    pub dropdown_class: String,
    /// 学位下拉框选第几项
    pub degree_option: usize,
    pub paginator_class: String,
    pub page_class: String,
    /// 表示有空位的状态文字
    pub open_status: String,
    pub status_cell: usize,
    pub section_cell: usize,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            home_url: "https://regweb1.ju.edu.jo:4443/selfregapp/home.xhtml".to_string(),
            schedule_url: "https://regweb1.ju.edu.jo:4443/selfregapp/secured/ofrd-course.xhtml"
                .to_string(),
            language_switch_text: "English".to_string(),
            captcha_image_id: "loginform:imgCaptchaId".to_string(),
            input_class: "ui-inputfield".to_string(),
            username_field: 0,
            password_field: 1,
            captcha_field: 2,
            submit_class: "ui-button".to_string(),
            dropdown_class: "selectonemenu".to_string(),
            degree_option: 1,
            paginator_class: "ui-paginator-top".to_string(),
            page_class: "ui-paginator-page".to_string(),
            open_status: "Opened".to_string(),
            status_cell: 12,
            section_cell: 3,
        }
    }
}

impl PortalConfig {
    pub fn language_switch(&self) -> Locator {
        Locator::containing_text(&self.language_switch_text)
    }

    pub fn captcha_image(&self) -> Locator {
        // ID 中带冒号，用属性选择器避免转义
        Locator::css(format!("[id='{}']", self.captcha_image_id))
    }

    pub fn login_inputs(&self) -> Locator {
        Locator::css(format!(".{}", self.input_class))
    }

    pub fn submit_button(&self) -> Locator {
        Locator::css(format!(".{}", self.submit_class))
    }

    pub fn dropdowns(&self) -> Locator {
        Locator::css(format!(".{}", self.dropdown_class))
    }

    pub fn paginator(&self) -> Locator {
        Locator::css(format!(".{}", self.paginator_class))
    }

    pub fn paginator_pages(&self) -> Locator {
        Locator::css(format!(".{} .{}", self.paginator_class, self.page_class))
    }

    /// 包含该课程编号文字的元素所在的行
    pub fn course_rows(&self, course_id: &str) -> Locator {
        Locator::containing_text(course_id).parent()
    }
}
