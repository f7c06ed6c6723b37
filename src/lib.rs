// ==========================================
// 员工主数据生命周期系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: HR 后台主数据生命周期管理（导入/对账/周年/任务）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CalendarEventKind, EmployeeStatus, LifecycleType, TaskStatus};

// 领域实体
pub use domain::{
    CalendarEvent, DailyDigest, Employee, ImportRunLog, JubileeHit, ReconcileSummary,
    RosterRow, TaskAssignment, TaskTemplate,
};

// 引擎
pub use engine::{ExitDetector, RosterReconciler, TaskGenerator};

// API
pub use api::{AnniversaryApi, ConfigApi, ImportApi, LifecycleApi, ScheduleApi};

/// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 系统名称
pub const APP_NAME: &str = "员工主数据生命周期系统";
