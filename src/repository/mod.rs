// ==========================================
// 员工主数据生命周期系统 - 数据仓储层
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod employee_repo;
pub mod employee_repo_impl;
pub mod error;
pub mod run_log_repo;
pub mod task_repo;
pub mod task_repo_impl;

// 重导出核心仓储
pub use employee_repo::EmployeeRepository;
pub use employee_repo_impl::EmployeeRepositoryImpl;
pub use error::{RepositoryError, RepositoryResult};
pub use run_log_repo::ImportRunLogRepository;
pub use task_repo::{TaskAssignmentRepository, TaskFilter, TaskTemplateRepository};
pub use task_repo_impl::TaskRepositoryImpl;
