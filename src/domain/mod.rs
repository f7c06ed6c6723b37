// ==========================================
// 员工主数据生命周期系统 - 领域层
// ==========================================
// 职责: 实体与类型定义，不含业务规则与数据访问
// ==========================================

pub mod employee;
pub mod event;
pub mod task;
pub mod types;

// 重导出核心实体
pub use employee::{Employee, EmployeeDelta, ImportRunLog, LockFlags, ReconcileSummary, RosterRow};
pub use event::{CalendarEvent, DailyDigest, JubileeHit, RenderedMail};
pub use task::{NewTaskTemplate, TaskAssignment, TaskTemplate, TaskTemplatePatch};
pub use types::{CalendarEventKind, EmployeeStatus, LifecycleType, TaskStatus};
