//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 启动 / 连接浏览器，持有 Browser
//! - 读取账号、关注文件
//! - 组装 Poller 并在后台运行
//!
//! ### `poller` - 轮询器
//! - 有限次数的整轮重试，失败后放慢节奏
//! - 按间隔循环或只检查一次
//! - 互斥锁保证同一时间只有一轮检查
//!
//! ## 层次关系
//!
//! ```text
//! app (持有 Browser)
//!     ↓
//! poller (重试 / 循环 / 回调)
//!     ↓
//! workflow::WatchCycle (一轮检查)
//!     ↓
//! services (能力层：session / scanner / captcha)
//!     ↓
//! infrastructure (基础设施：PortalDriver / Navigator)
//! ```

pub mod app;
pub mod poller;

// 重新导出主要类型
pub use app::App;
pub use poller::{Poller, Target};
