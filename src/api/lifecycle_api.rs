// ==========================================
// 员工主数据生命周期系统 - 生命周期任务API
// ==========================================
// 职责: 任务生成 / 任务查询与状态流转 / 模板管理
// 口径: relative_due_days 允许 -365..=365
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::task::{NewTaskTemplate, TaskAssignment, TaskTemplate, TaskTemplatePatch};
use crate::domain::types::{LifecycleType, TaskStatus};
use crate::engine::{GenerateReport, TaskGenerator};
use crate::repository::{
    EmployeeRepositoryImpl, TaskAssignmentRepository, TaskFilter, TaskRepositoryImpl,
    TaskTemplateRepository,
};
use std::sync::Arc;

/// 相对到期偏移允许区间（天）
const MAX_RELATIVE_DUE_DAYS: i32 = 365;

/// 生命周期任务API
pub struct LifecycleApi {
    db_path: String,
}

impl LifecycleApi {
    /// 创建新的LifecycleApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 为员工生成生命周期任务
    ///
    /// # 参数
    /// - employee_id: 目标员工
    /// - lifecycle: 生命周期类型字符串（ONBOARDING/OFFBOARDING）
    /// - template_id: 可选限定单个模板
    /// - overwrite: true 时重置已有任务
    pub async fn generate_tasks(
        &self,
        employee_id: &str,
        lifecycle: &str,
        template_id: Option<&str>,
        overwrite: bool,
    ) -> ApiResult<GenerateReport> {
        let lifecycle = LifecycleType::from_str(lifecycle)
            .ok_or_else(|| ApiError::InvalidInput(format!("非法生命周期类型: {}", lifecycle)))?;

        let employee_repo = Arc::new(EmployeeRepositoryImpl::new(&self.db_path)?);
        let task_repo = Arc::new(TaskRepositoryImpl::new(&self.db_path)?);
        let generator = TaskGenerator::new(employee_repo, task_repo);

        Ok(generator
            .generate(employee_id, lifecycle, template_id, overwrite)
            .await?)
    }

    /// 条件查询任务分配，按到期日升序
    pub async fn list_tasks(&self, filter: &TaskFilter) -> ApiResult<Vec<TaskAssignment>> {
        let task_repo = TaskRepositoryImpl::new(&self.db_path)?;
        Ok(task_repo.list(filter).await?)
    }

    /// 更新任务状态
    ///
    /// # 参数
    /// - status: 目标状态字符串（OPEN/DONE/BLOCKED）
    /// - notes: None 不改动备注，Some(None) 清空，Some(Some(_)) 覆写
    pub async fn update_task_status(
        &self,
        task_id: &str,
        status: &str,
        notes: Option<Option<String>>,
    ) -> ApiResult<TaskAssignment> {
        let status = TaskStatus::from_str(status)
            .ok_or_else(|| ApiError::InvalidInput(format!("非法任务状态: {}", status)))?;

        let task_repo = TaskRepositoryImpl::new(&self.db_path)?;
        Ok(task_repo.update_status(task_id, status, notes).await?)
    }

    /// 全量模板列表（管理界面）
    pub async fn list_templates(&self) -> ApiResult<Vec<TaskTemplate>> {
        let task_repo = TaskRepositoryImpl::new(&self.db_path)?;
        Ok(task_repo.list_all().await?)
    }

    /// 创建任务模板
    pub async fn create_template(&self, template: &NewTaskTemplate) -> ApiResult<TaskTemplate> {
        if template.title.trim().is_empty() {
            return Err(ApiError::ValidationError("模板标题不能为空".to_string()));
        }
        Self::validate_due_days(template.relative_due_days)?;

        let task_repo = TaskRepositoryImpl::new(&self.db_path)?;
        Ok(task_repo.insert(template).await?)
    }

    /// 部分更新任务模板
    pub async fn update_template(
        &self,
        template_id: &str,
        patch: &TaskTemplatePatch,
    ) -> ApiResult<TaskTemplate> {
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(ApiError::ValidationError("模板标题不能为空".to_string()));
            }
        }
        if let Some(days) = patch.relative_due_days {
            Self::validate_due_days(days)?;
        }

        let task_repo = TaskRepositoryImpl::new(&self.db_path)?;
        Ok(task_repo.update(template_id, patch).await?)
    }

    fn validate_due_days(days: i32) -> ApiResult<()> {
        if !(-MAX_RELATIVE_DUE_DAYS..=MAX_RELATIVE_DUE_DAYS).contains(&days) {
            return Err(ApiError::ValidationError(format!(
                "relative_due_days 必须在 -{}..={} 范围内",
                MAX_RELATIVE_DUE_DAYS, MAX_RELATIVE_DUE_DAYS
            )));
        }
        Ok(())
    }
}
