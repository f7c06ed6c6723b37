// ==========================================
// 员工主数据生命周期系统 - 业务引擎层
// ==========================================
// 职责: 对账/离职检测/周年计算/任务生成/摘要渲染
// 红线: 引擎只依赖 Repository 与 Config 抽象，不触碰 SQL
// ==========================================

pub mod anniversary;
pub mod digest;
pub mod exit_detector;
pub mod reconciler;
pub mod task_generator;

pub use anniversary::{
    anniversary_in_year, birthdays_on_day, calendar_events, is_birthday, jubilees_on_day,
    upcoming_jubilees, years_between, years_of_service,
};
pub use digest::{
    build_birthday_mails, build_due_task_digest, build_jubilee_digest, render_template,
    DueTaskLine,
};
pub use exit_detector::ExitDetector;
pub use reconciler::{build_email, normalize_name_part, ReconcileOutcome, RosterReconciler};
pub use task_generator::{
    GenerateAction, GenerateReport, GeneratedTaskItem, TaskGenerationError, TaskGenerator,
};
