// ==========================================
// 员工主数据生命周期系统 - 员工领域实体
// ==========================================
// 职责: 员工主数据 + 名册导入行 + 对账统计
// 自然键: (first_name, last_name, birth_date) 唯一
// ==========================================

use crate::domain::types::EmployeeStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// 字段锁标志 (Lock Flags)
// ==========================================
// 固定布尔结构，不做动态 key-value，保持静态类型
// lock_all 为真时对账不得改动任何字段
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFlags {
    pub lock_all: bool,
    pub lock_first_name: bool,
    pub lock_last_name: bool,
    pub lock_start_date: bool,
    pub lock_birth_date: bool,
    pub lock_email: bool,
}

// ==========================================
// Employee - 员工主数据
// ==========================================
/// 员工主数据
///
/// # 不变量
/// - exit_date 非空 当且仅当 status == EXITED
/// - 自然键 (first_name, last_name, birth_date) 全局唯一
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub start_date: NaiveDate,
    pub birth_date: NaiveDate,
    pub status: EmployeeStatus,
    pub exit_date: Option<NaiveDate>,
    pub locks: LockFlags,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ==========================================
// RosterRow - 解析后的名册行（瞬态）
// ==========================================
/// 名册行（日期已归一化，布尔列已解析）
///
/// 缺少 first_name / last_name / birth_date 任意一项的行
/// 在对账时被整行丢弃并计入 skipped_no_data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterRow {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub birth_date: Option<NaiveDate>,
    pub locks: LockFlags,
    /// 原始行号（含表头偏移，用于日志定位）
    pub row_number: usize,
}

// ==========================================
// 员工字段增量 (Employee Field Delta)
// ==========================================
/// 对账计算出的字段增量，只包含允许且发生变化的字段
#[derive(Debug, Clone, Default)]
pub struct EmployeeDelta {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    /// EXITED → ACTIVE 复活（清空 exit_date）
    pub reactivate: bool,
}

impl EmployeeDelta {
    /// 是否存在任何待写入变更
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.start_date.is_none()
            && self.birth_date.is_none()
            && self.email.is_none()
            && !self.reactivate
    }
}

// ==========================================
// ReconcileSummary - 对账统计计数器
// ==========================================
/// 一次对账运行的计数器集合
///
/// 口径说明: 无增量的未锁定行与 lock_all 行同计入 skipped_locked
/// （与源系统口径兼容）
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub created: i64,
    pub updated: i64,
    pub skipped_locked: i64,
    pub exited: i64,
    pub skipped_exit_locked: i64,
    pub reactivated: i64,
    pub skipped_no_data: i64,
    pub total_rows: i64,
}

// ==========================================
// ImportRunLog - 导入运行审计记录（只追加）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRunLog {
    pub id: String,
    pub created: i64,
    pub updated: i64,
    pub skipped_locked: i64,
    pub exited: i64,
    pub skipped_exit_locked: i64,
    pub reactivated: i64,
    pub skipped_no_data: i64,
    pub total_rows: i64,
    pub imported_at: DateTime<Utc>,
}

impl ImportRunLog {
    /// 从对账统计构造审计记录
    pub fn from_summary(id: String, summary: &ReconcileSummary, at: DateTime<Utc>) -> Self {
        Self {
            id,
            created: summary.created,
            updated: summary.updated,
            skipped_locked: summary.skipped_locked,
            exited: summary.exited,
            skipped_exit_locked: summary.skipped_exit_locked,
            reactivated: summary.reactivated,
            skipped_no_data: summary.skipped_no_data,
            total_rows: summary.total_rows,
            imported_at: at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_is_empty() {
        let delta = EmployeeDelta::default();
        assert!(delta.is_empty());

        let delta = EmployeeDelta {
            reactivate: true,
            ..Default::default()
        };
        assert!(!delta.is_empty());
    }
}
