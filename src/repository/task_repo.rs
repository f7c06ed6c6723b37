// ==========================================
// 员工主数据生命周期系统 - 任务仓储接口
// ==========================================
// 职责: 任务模板与任务分配的数据访问抽象
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::task::{NewTaskTemplate, TaskAssignment, TaskTemplate, TaskTemplatePatch};
use crate::domain::types::{LifecycleType, TaskStatus};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 任务分配查询过滤条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFilter {
    pub lifecycle: Option<LifecycleType>,
    pub status: Option<TaskStatus>,
    pub employee_id: Option<String>,
}

/// 任务模板仓储
#[async_trait]
pub trait TaskTemplateRepository: Send + Sync {
    /// 按 ID 查询模板
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<TaskTemplate>>;

    /// 查询指定生命周期类型的激活模板（可选限定单个模板），按标题升序
    async fn list_active(
        &self,
        lifecycle: LifecycleType,
        template_id: Option<&str>,
    ) -> RepositoryResult<Vec<TaskTemplate>>;

    /// 全量模板列表（管理界面），按类型+标题排序
    async fn list_all(&self) -> RepositoryResult<Vec<TaskTemplate>>;

    /// 创建模板
    async fn insert(&self, template: &NewTaskTemplate) -> RepositoryResult<TaskTemplate>;

    /// 部分更新模板
    async fn update(&self, id: &str, patch: &TaskTemplatePatch) -> RepositoryResult<TaskTemplate>;
}

/// 任务分配仓储
///
/// (employee_id, task_template_id) 唯一约束由存储层强制；
/// 并发生成方通过该约束而非进程内锁收敛
#[async_trait]
pub trait TaskAssignmentRepository: Send + Sync {
    /// 不存在则插入（ON CONFLICT DO NOTHING）
    ///
    /// # 返回
    /// - true: 实际插入
    /// - false: 该 (employee, template) 对已存在，幂等跳过
    async fn insert_if_absent(&self, assignment: &TaskAssignment) -> RepositoryResult<bool>;

    /// 真 upsert: 存在则重置 type/due_date/owner_role/status=OPEN 并清空 completed_at
    async fn upsert_reset(&self, assignment: &TaskAssignment) -> RepositoryResult<()>;

    /// 按 (employee, template) 对查询
    async fn find_by_pair(
        &self,
        employee_id: &str,
        task_template_id: &str,
    ) -> RepositoryResult<Option<TaskAssignment>>;

    /// 条件查询，按到期日升序
    async fn list(&self, filter: &TaskFilter) -> RepositoryResult<Vec<TaskAssignment>>;

    /// 查询到期未完成任务: status=OPEN 且 due_date <= cutoff，按到期日升序
    async fn list_due_open(&self, cutoff: chrono::NaiveDate) -> RepositoryResult<Vec<TaskAssignment>>;

    /// 显式状态更新（DONE 落 completed_at，其余状态清空）
    async fn update_status(
        &self,
        id: &str,
        status: TaskStatus,
        notes: Option<Option<String>>,
    ) -> RepositoryResult<TaskAssignment>;
}
