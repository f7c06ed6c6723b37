// ==========================================
// 员工主数据生命周期系统 - 每日调度API
// ==========================================
// 职责: run_daily 编排（生日祝福 + 周年摘要 + 到期任务摘要）
// 红线: 只产出待投递内容与计数，投递在系统边界之外
// ==========================================

use crate::api::error::{internal, ApiResult};
use crate::config::{ConfigManager, HrConfigReader};
use crate::domain::event::DailyDigest;
use crate::engine::{
    birthdays_on_day, build_birthday_mails, build_due_task_digest, build_jubilee_digest,
    jubilees_on_day, DueTaskLine,
};
use crate::repository::{
    EmployeeRepository, EmployeeRepositoryImpl, TaskAssignmentRepository, TaskRepositoryImpl,
    TaskTemplateRepository,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::info;

/// 每日调度API
pub struct ScheduleApi {
    db_path: String,
}

impl ScheduleApi {
    /// 创建新的ScheduleApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 每日调度主入口
    ///
    /// # 流程
    /// 1. 今日生日员工 → 个人祝福邮件
    /// 2. 今日里程碑周年 → 管理者摘要
    /// 3. 到期未完成任务 → 管理者摘要
    pub async fn run_daily(&self, today: NaiveDate) -> ApiResult<DailyDigest> {
        let config = ConfigManager::new(&self.db_path).map_err(internal)?;
        let milestone_years = config.get_jubilee_years().await.map_err(internal)?;
        let manager_emails = config.get_manager_emails().await.map_err(internal)?;
        let birthday_template = config
            .get_birthday_email_template()
            .await
            .map_err(internal)?;
        let jubilee_template = config.get_jubilee_email_template().await.map_err(internal)?;

        let employee_repo = EmployeeRepositoryImpl::new(&self.db_path)?;
        let task_repo = TaskRepositoryImpl::new(&self.db_path)?;
        let employees = employee_repo.list_all().await?;

        // === 步骤 1: 生日祝福 ===
        let birthday_employees = birthdays_on_day(&employees, today);
        let birthday_mails = build_birthday_mails(&birthday_employees, &birthday_template);

        // === 步骤 2: 周年摘要 ===
        let jubilee_hits = jubilees_on_day(&employees, today, &milestone_years);
        let jubilee_digest = build_jubilee_digest(&jubilee_hits, &manager_emails, &jubilee_template);

        // === 步骤 3: 到期任务摘要 ===
        let due_tasks = task_repo.list_due_open(today).await?;
        let employee_names: HashMap<&str, String> = employees
            .iter()
            .map(|e| {
                (
                    e.id.as_str(),
                    format!("{} {}", e.first_name, e.last_name),
                )
            })
            .collect();
        let template_titles: HashMap<String, String> = task_repo
            .list_all()
            .await?
            .into_iter()
            .map(|t| (t.id, t.title))
            .collect();

        let due_lines: Vec<DueTaskLine> = due_tasks
            .iter()
            .map(|task| DueTaskLine {
                employee_name: employee_names
                    .get(task.employee_id.as_str())
                    .cloned()
                    .unwrap_or_else(|| task.employee_id.clone()),
                title: template_titles
                    .get(&task.task_template_id)
                    .cloned()
                    .unwrap_or_else(|| task.task_template_id.clone()),
                due_date: task.due_date,
            })
            .collect();
        let due_task_digest = build_due_task_digest(&due_lines, &manager_emails);

        info!(
            birthdays = birthday_employees.len(),
            jubilees = jubilee_hits.len(),
            due_tasks = due_tasks.len(),
            "每日调度完成"
        );

        Ok(DailyDigest {
            birthday_mails,
            jubilee_digest,
            due_task_digest,
            jubilee_hits: jubilee_hits.len(),
            birthdays: birthday_employees.len(),
            due_tasks: due_tasks.len(),
        })
    }
}
