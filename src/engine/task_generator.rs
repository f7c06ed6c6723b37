// ==========================================
// 员工主数据生命周期系统 - 生命周期任务生成引擎
// ==========================================
// 职责: 按任务模板为员工物化入职/离职任务
// 锚点: ONBOARDING → start_date, OFFBOARDING → exit_date
// 幂等: (employee, template) 唯一约束 + 插入即跳过 / 显式覆盖重置
// ==========================================

use crate::domain::task::TaskAssignment;
use crate::domain::types::{LifecycleType, TaskStatus};
use crate::repository::{
    EmployeeRepository, RepositoryError, TaskAssignmentRepository, TaskTemplateRepository,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ==========================================
// 任务生成错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum TaskGenerationError {
    #[error("员工不存在: {0}")]
    EmployeeNotFound(String),

    #[error("模板不存在: {0}")]
    TemplateNotFound(String),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("仓储错误: {0}")]
    Repository(#[from] RepositoryError),
}

impl TaskGenerationError {
    /// 是否属于"资源不存在"类错误（对外映射 404）
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TaskGenerationError::EmployeeNotFound(_) | TaskGenerationError::TemplateNotFound(_)
        )
    }
}

// ==========================================
// 生成结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerateAction {
    Created,         // 新插入
    Reset,           // 已存在，显式覆盖重置
    SkippedExisting, // 已存在，幂等跳过
}

/// 单个模板的生成明细
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedTaskItem {
    pub template_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub action: GenerateAction,
}

/// 一次任务生成的汇总报告
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateReport {
    pub created: usize,
    pub reset: usize,
    pub skipped_existing: usize,
    pub items: Vec<GeneratedTaskItem>,
}

// ==========================================
// TaskGenerator - 任务生成引擎
// ==========================================
/// 生命周期任务生成引擎
///
/// # 职责
/// 1. 解析锚点日期（入职/离职）
/// 2. 按激活模板计算到期日 anchor + relative_due_days
/// 3. 幂等物化: 默认不覆盖已有任务，显式 overwrite 时重置
///
/// # 红线
/// - 从不删除任务
/// - 覆盖重置只回写 due_date/owner_role/status，保留 notes
pub struct TaskGenerator<E: ?Sized, T: ?Sized>
where
    E: EmployeeRepository,
    T: TaskTemplateRepository + TaskAssignmentRepository,
{
    employee_repo: Arc<E>,
    task_repo: Arc<T>,
}

impl<E: ?Sized, T: ?Sized> TaskGenerator<E, T>
where
    E: EmployeeRepository,
    T: TaskTemplateRepository + TaskAssignmentRepository,
{
    /// 创建新的 TaskGenerator 实例
    pub fn new(employee_repo: Arc<E>, task_repo: Arc<T>) -> Self {
        Self {
            employee_repo,
            task_repo,
        }
    }

    /// 任务生成主入口
    ///
    /// # 参数
    /// - employee_id: 目标员工
    /// - lifecycle: 生命周期类型（决定锚点）
    /// - template_id: 可选限定单个模板
    /// - overwrite: true 时重置已有任务（due_date/owner_role/status=OPEN）
    ///
    /// # 返回
    /// - GenerateReport: 每模板明细 + 计数
    pub async fn generate(
        &self,
        employee_id: &str,
        lifecycle: LifecycleType,
        template_id: Option<&str>,
        overwrite: bool,
    ) -> Result<GenerateReport, TaskGenerationError> {
        let employee = self
            .employee_repo
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| TaskGenerationError::EmployeeNotFound(employee_id.to_string()))?;

        // === 锚点解析 ===
        let anchor: NaiveDate = match lifecycle {
            LifecycleType::Onboarding => employee.start_date,
            LifecycleType::Offboarding => employee.exit_date.ok_or_else(|| {
                TaskGenerationError::Validation(format!(
                    "员工 {} 无离职日期，无法生成离职任务",
                    employee_id
                ))
            })?,
        };

        let templates = self.task_repo.list_active(lifecycle, template_id).await?;
        if let Some(tid) = template_id {
            // 限定模板时空结果需区分: 不存在 → NotFound, 未激活/类型不符 → Validation
            if templates.is_empty() {
                return Err(match self.task_repo.find_by_id(tid).await? {
                    None => TaskGenerationError::TemplateNotFound(tid.to_string()),
                    Some(t) if !t.active => {
                        TaskGenerationError::Validation(format!("模板 {} 未激活", tid))
                    }
                    Some(_) => TaskGenerationError::Validation(format!(
                        "模板 {} 不属于 {} 流程",
                        tid, lifecycle
                    )),
                });
            }
        }
        if templates.is_empty() {
            return Err(TaskGenerationError::Validation(format!(
                "无激活的 {} 模板",
                lifecycle
            )));
        }

        let now = Utc::now();
        let mut report = GenerateReport::default();
        for template in &templates {
            let due_date = anchor + Duration::days(template.relative_due_days as i64);
            let assignment = self.build_assignment(employee_id, template.id.as_str(), lifecycle, due_date, template.owner_role.clone(), now);

            // 单个模板物化失败只跳过该模板，不中断其余模板
            let action = match self.materialize_one(&assignment, overwrite).await {
                Ok(action) => action,
                Err(e) => {
                    warn!(template_id = %template.id, error = %e, "任务物化失败，跳过该模板");
                    continue;
                }
            };
            match action {
                GenerateAction::Created => report.created += 1,
                GenerateAction::Reset => report.reset += 1,
                GenerateAction::SkippedExisting => {
                    debug!(template_id = %template.id, "任务已存在，幂等跳过");
                    report.skipped_existing += 1;
                }
            }

            report.items.push(GeneratedTaskItem {
                template_id: template.id.clone(),
                title: template.title.clone(),
                due_date,
                action,
            });
        }

        info!(
            employee_id,
            lifecycle = %lifecycle,
            created = report.created,
            reset = report.reset,
            skipped = report.skipped_existing,
            "任务生成完成"
        );
        Ok(report)
    }

    /// 物化单个任务: 默认不存在才插入，overwrite 时 upsert 并重置状态
    async fn materialize_one(
        &self,
        assignment: &TaskAssignment,
        overwrite: bool,
    ) -> Result<GenerateAction, RepositoryError> {
        if overwrite {
            let existed = self
                .task_repo
                .find_by_pair(&assignment.employee_id, &assignment.task_template_id)
                .await?
                .is_some();
            self.task_repo.upsert_reset(assignment).await?;
            Ok(if existed {
                GenerateAction::Reset
            } else {
                GenerateAction::Created
            })
        } else if self.task_repo.insert_if_absent(assignment).await? {
            Ok(GenerateAction::Created)
        } else {
            Ok(GenerateAction::SkippedExisting)
        }
    }

    fn build_assignment(
        &self,
        employee_id: &str,
        template_id: &str,
        lifecycle: LifecycleType,
        due_date: NaiveDate,
        owner_role: String,
        now: DateTime<Utc>,
    ) -> TaskAssignment {
        TaskAssignment {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.to_string(),
            task_template_id: template_id.to_string(),
            lifecycle,
            due_date,
            status: TaskStatus::Open,
            owner_role: Some(owner_role),
            notes: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
