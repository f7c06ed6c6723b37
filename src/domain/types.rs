// ==========================================
// 员工主数据生命周期系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 员工状态 (Employee Status)
// ==========================================
// 全量名册导入后，名册中缺席的在职员工被判定为离职
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    Active, // 在职
    Exited, // 离职
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmployeeStatus::Active => write!(f, "ACTIVE"),
            EmployeeStatus::Exited => write!(f, "EXITED"),
        }
    }
}

impl EmployeeStatus {
    /// 从字符串解析状态
    pub fn from_str(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "EXITED" => EmployeeStatus::Exited,
            _ => EmployeeStatus::Active, // 默认值
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "ACTIVE",
            EmployeeStatus::Exited => "EXITED",
        }
    }
}

// ==========================================
// 生命周期类型 (Lifecycle Type)
// ==========================================
// 任务锚点: ONBOARDING 锚定入职日期, OFFBOARDING 锚定离职日期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleType {
    Onboarding,  // 入职流程
    Offboarding, // 离职流程
}

impl fmt::Display for LifecycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleType::Onboarding => write!(f, "ONBOARDING"),
            LifecycleType::Offboarding => write!(f, "OFFBOARDING"),
        }
    }
}

impl LifecycleType {
    /// 从字符串解析生命周期类型（非法值返回 None）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ONBOARDING" => Some(LifecycleType::Onboarding),
            "OFFBOARDING" => Some(LifecycleType::Offboarding),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            LifecycleType::Onboarding => "ONBOARDING",
            LifecycleType::Offboarding => "OFFBOARDING",
        }
    }
}

// ==========================================
// 任务状态 (Task Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Open,    // 未开始
    Done,    // 已完成
    Blocked, // 受阻
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "OPEN"),
            TaskStatus::Done => write!(f, "DONE"),
            TaskStatus::Blocked => write!(f, "BLOCKED"),
        }
    }
}

impl TaskStatus {
    /// 从字符串解析任务状态（非法值返回 None）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OPEN" => Some(TaskStatus::Open),
            "DONE" => Some(TaskStatus::Done),
            "BLOCKED" => Some(TaskStatus::Blocked),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "OPEN",
            TaskStatus::Done => "DONE",
            TaskStatus::Blocked => "BLOCKED",
        }
    }
}

// ==========================================
// 日历事件类型 (Calendar Event Kind)
// ==========================================
// 用于仪表盘导出: 生日 / 周年 / 入职
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventKind {
    Birthday, // 生日
    Jubilee,  // 服务周年
    Hire,     // 入职
}

impl fmt::Display for CalendarEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarEventKind::Birthday => write!(f, "birthday"),
            CalendarEventKind::Jubilee => write!(f, "jubilee"),
            CalendarEventKind::Hire => write!(f, "hire"),
        }
    }
}

impl CalendarEventKind {
    /// 从查询参数解析事件类型（复数形式兼容）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "birthday" | "birthdays" => Some(CalendarEventKind::Birthday),
            "jubilee" | "jubilees" => Some(CalendarEventKind::Jubilee),
            "hire" | "hires" => Some(CalendarEventKind::Hire),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(EmployeeStatus::from_str("EXITED"), EmployeeStatus::Exited);
        assert_eq!(EmployeeStatus::from_str("active"), EmployeeStatus::Active);
        assert_eq!(EmployeeStatus::from_str("garbage"), EmployeeStatus::Active);
        assert_eq!(EmployeeStatus::Exited.to_db_str(), "EXITED");
    }

    #[test]
    fn test_lifecycle_type_strict_parse() {
        assert_eq!(
            LifecycleType::from_str("onboarding"),
            Some(LifecycleType::Onboarding)
        );
        assert_eq!(LifecycleType::from_str("RETIRED"), None);
    }

    #[test]
    fn test_calendar_kind_plural_aliases() {
        assert_eq!(
            CalendarEventKind::from_str("jubilees"),
            Some(CalendarEventKind::Jubilee)
        );
        assert_eq!(CalendarEventKind::from_str("x"), None);
    }
}
