//! # Seat Watch
//!
//! 监控学校选课系统中指定课程/班级的空位，发现空位时调用回调
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PortalDriver` - 页面操作能力（打开、查找、点击、输入、读文字、截图）
//! - `Navigator` - 导航节奏控制（按页面加载耗时调整等待）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `SessionManager` - 登录（切换语言 → 验证码 → 提交，直到通过）
//! - `Scanner` - 选学院/系、翻页、提取开放班级
//! - `CaptchaSolver` - 验证码识别
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一轮检查"的完整流程
//! - `WatchCycle` - 登录 → 扫描所有关注的系 → 回到首页
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/poller` - 重试、循环、互斥、回调
//! - `orchestrator/app` - 启动浏览器并组装以上各层
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, PortalConfig, Refresh};
pub use error::{AppError, AppResult};
pub use infrastructure::{Locator, PortalDriver};
pub use models::{Credentials, FoundResult, SectionSpec, WatchList};
pub use orchestrator::{App, Poller, Target};
pub use services::{CaptchaSolver, SolverFn, TesseractSolver};
pub use workflow::{CycleOptions, WatchCycle};
