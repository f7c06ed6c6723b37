// ==========================================
// 员工主数据生命周期系统 - 生命周期任务实体
// ==========================================
// 职责: 任务模板 + 任务分配
// 唯一约束: task_assignment (employee_id, task_template_id)
// ==========================================

use crate::domain::types::{LifecycleType, TaskStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// TaskTemplate - 任务模板
// ==========================================
/// 任务模板
///
/// relative_due_days 为相对锚点日期的有符号偏移（可早于锚点）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub lifecycle: LifecycleType,
    pub owner_role: String,
    pub relative_due_days: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// TaskAssignment - 任务分配（物化任务）
// ==========================================
/// 一个 (employee, template) 对至多存在一条分配记录
///
/// 生成器只插入或（显式覆盖时）重置，从不删除
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    pub id: String,
    pub employee_id: String,
    pub task_template_id: String,
    pub lifecycle: LifecycleType,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub owner_role: Option<String>,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// NewTaskTemplate - 模板创建输入
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskTemplate {
    pub title: String,
    pub description: Option<String>,
    pub lifecycle: LifecycleType,
    pub owner_role: String,
    pub relative_due_days: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

// ==========================================
// TaskTemplatePatch - 模板更新输入（部分字段）
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskTemplatePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub lifecycle: Option<LifecycleType>,
    pub owner_role: Option<String>,
    pub relative_due_days: Option<i32>,
    pub active: Option<bool>,
}
