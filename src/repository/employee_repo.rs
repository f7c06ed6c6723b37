// ==========================================
// 员工主数据生命周期系统 - 员工仓储接口
// ==========================================
// 职责: 定义员工主数据的访问抽象，供对账/离职检测/查询引擎使用
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::employee::{Employee, EmployeeDelta};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 员工主数据仓储
///
/// 自然键 (first_name, last_name, birth_date) 的唯一性由存储层
/// UNIQUE 约束保证；并发写入方通过该约束（而非进程内锁）收敛
#[async_trait]
pub trait EmployeeRepository: Send + Sync {
    /// 按自然键查询
    async fn find_by_natural_key(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
    ) -> RepositoryResult<Option<Employee>>;

    /// 按 ID 查询
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Employee>>;

    /// 插入新员工（自然键冲突返回 UniqueConstraintViolation）
    async fn insert(&self, employee: &Employee) -> RepositoryResult<()>;

    /// 应用字段增量（只写 delta 中存在的字段；reactivate 时清空 exit_date 并置 ACTIVE）
    async fn apply_delta(&self, id: &str, delta: &EmployeeDelta) -> RepositoryResult<()>;

    /// 标记离职: status=EXITED, exit_date=now
    async fn mark_exited(&self, id: &str, exit_date: NaiveDate) -> RepositoryResult<()>;

    /// 全量查询（周年引擎/日历导出输入）
    async fn list_all(&self) -> RepositoryResult<Vec<Employee>>;

    /// 查询所有在职员工（离职检测输入）
    async fn list_active(&self) -> RepositoryResult<Vec<Employee>>;
}
