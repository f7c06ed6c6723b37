// ==========================================
// 员工主数据生命周期系统 - 日历事件实体
// ==========================================
// 职责: 周年命中 / 日历导出行 / 渲染后的通知内容
// 说明: 邮件投递本身在系统边界之外，这里只产出"应发送什么"
// ==========================================

use crate::domain::employee::Employee;
use crate::domain::types::CalendarEventKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// JubileeHit - 服务周年命中
// ==========================================
/// 一名员工在某个里程碑年数上的周年命中
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JubileeHit {
    pub employee: Employee,
    /// 命中的里程碑年数（来自配置，例如 5/10/25）
    pub years: i32,
    /// 周年纪念日（start_date + years）
    pub anniversary_date: NaiveDate,
}

// ==========================================
// CalendarEvent - 日历导出行
// ==========================================
/// 仪表盘导出使用的扁平事件行（生日/周年/入职）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date: NaiveDate,
    pub kind: CalendarEventKind,
}

// ==========================================
// RenderedMail - 渲染后的通知内容
// ==========================================
/// 已渲染、待外部投递的邮件内容
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedMail {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

// ==========================================
// DailyDigest - 每日调度汇总
// ==========================================
/// run_daily 的产物: 计数 + 待投递内容
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyDigest {
    /// 今日生日员工的个人祝福邮件
    pub birthday_mails: Vec<RenderedMail>,
    /// 管理者周年摘要（无命中或无收件人时为 None）
    pub jubilee_digest: Option<RenderedMail>,
    /// 管理者到期任务摘要（无到期任务时为 None）
    pub due_task_digest: Option<RenderedMail>,
    pub jubilee_hits: usize,
    pub birthdays: usize,
    pub due_tasks: usize,
}
