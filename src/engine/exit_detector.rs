// ==========================================
// 员工主数据生命周期系统 - 离职检测引擎
// ==========================================
// 职责: 全量名册导入后，将名册中缺席的在职员工标记为离职
// 前提: 名册必须是全量名册，增量名册会误判离职
// 红线: lock_all 员工不得被标记离职，计入 skipped_exit_locked
// ==========================================

use crate::domain::employee::ReconcileSummary;
use crate::repository::EmployeeRepository;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info};

// ==========================================
// ExitDetector - 离职检测引擎
// ==========================================
/// 离职检测引擎
///
/// 对账完成后运行: 未被名册触达的 ACTIVE 员工被判定为已离职，
/// status → EXITED 且 exit_date = 运行日
pub struct ExitDetector<R: ?Sized>
where
    R: EmployeeRepository,
{
    repo: Arc<R>,
}

impl<R: ?Sized> ExitDetector<R>
where
    R: EmployeeRepository,
{
    /// 创建新的 ExitDetector 实例
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// 离职检测主入口
    ///
    /// # 参数
    /// - touched: 对账阶段触达的员工 ID 集合
    /// - exit_date: 离职日期（运行日）
    /// - summary: 对账计数器（就地累加 exited / skipped_exit_locked）
    pub async fn detect(
        &self,
        touched: &HashSet<String>,
        exit_date: NaiveDate,
        summary: &mut ReconcileSummary,
    ) -> Result<(), Box<dyn Error>> {
        let active = self.repo.list_active().await?;

        for employee in &active {
            if touched.contains(&employee.id) {
                continue;
            }
            if employee.locks.lock_all {
                debug!(employee_id = %employee.id, "员工已锁定，不标记离职");
                summary.skipped_exit_locked += 1;
                continue;
            }
            self.repo.mark_exited(&employee.id, exit_date).await?;
            summary.exited += 1;
        }

        info!(
            exited = summary.exited,
            skipped_exit_locked = summary.skipped_exit_locked,
            "离职检测完成"
        );
        Ok(())
    }
}
