use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 关注列表错误
    #[error("关注列表错误: {0}")]
    WatchList(#[from] WatchListError),
    /// 验证码识别错误
    #[error("验证码错误: {0}")]
    Captcha(#[from] CaptchaError),
    /// 登录流程错误
    #[error("登录错误: {0}")]
    Session(#[from] SessionError),
    /// 重试次数用尽
    #[error("重试 {attempts} 次后仍无法完成检查, 最后一次错误: {last}")]
    CouldNotFinishOperation {
        attempts: usize,
        last: Box<AppError>,
    },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 元素不存在
    #[error("找不到元素 {locator} (第 {nth} 个)")]
    ElementNotFound { locator: String, nth: usize },
    /// 元素已失效（页面已刷新）
    #[error("元素引用已失效: {0}")]
    StaleElement(String),
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 执行脚本失败
    #[error("执行脚本失败: {source}")]
    ScriptExecutionFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {0}")]
    LaunchFailed(String),
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 没有提供账号密码
    #[error("必须先提供账号和密码")]
    CredentialsNotProvided,
    /// 账号文件格式不对
    #[error("账号文件 {path} 格式错误: 需要两行 (账号/密码)")]
    MalformedCredentialsFile { path: String },
    /// 不支持的浏览器
    #[error("不支持的浏览器类型: '{0}' (可选: ch / chrome / chromium / edge)")]
    InvalidDriverArgument(String),
    /// 目录中没有该学院
    #[error("目录中没有学院 {0}")]
    UnknownFaculty(String),
    /// 学院下没有该系
    #[error("学院 {faculty} 下没有系 {department}")]
    UnknownDepartment { faculty: String, department: String },
    /// 关注文件解析失败
    #[error("关注文件 {path} 解析失败: {source}")]
    WatchFileParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },
}

/// 关注列表错误
#[derive(Debug, Error)]
pub enum WatchListError {
    /// 课程编号长度不足
    #[error("课程编号 '{0}' 无效: 至少需要 5 位 (学院 2 位 + 系 2 位 + 课程号)")]
    InvalidCourseId(String),
    /// 班级号格式不支持
    #[error("无法识别的班级号: {0}")]
    InvalidSectionSpec(String),
}

/// 验证码识别错误
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// 截图无法解码
    #[error("验证码图片解码失败: {0}")]
    DecodeFailed(#[from] image::ImageError),
    /// OCR 引擎调用失败
    #[error("OCR 引擎 {command} 调用失败: {message}")]
    OcrFailed { command: String, message: String },
}

/// 登录流程错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 超过最大登录次数
    #[error("登录尝试 {0} 次后仍未通过验证码")]
    LoginAttemptsExhausted(usize),
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for BrowserError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        let message = err.to_string();
        // 节点被页面刷新替换后 CDP 只会给出这类文本
        if message.contains("No node with given id")
            || message.contains("Could not find node")
            || message.contains("does not belong to the document")
        {
            BrowserError::StaleElement(message)
        } else {
            BrowserError::ScriptExecutionFailed {
                source: Box::new(err),
            }
        }
    }
}

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(err.into())
    }
}

impl From<serde_json::Error> for BrowserError {
    fn from(err: serde_json::Error) -> Self {
        BrowserError::ScriptExecutionFailed {
            source: Box::new(err),
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 页面暂时性错误（元素失效 / 找不到元素），整轮重试即可恢复
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AppError::Browser(BrowserError::ElementNotFound { .. })
                | AppError::Browser(BrowserError::StaleElement(_))
        )
    }

    /// 创建元素不存在错误
    pub fn element_not_found(locator: impl Into<String>, nth: usize) -> Self {
        AppError::Browser(BrowserError::ElementNotFound {
            locator: locator.into(),
            nth,
        })
    }

    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Config(ConfigError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
