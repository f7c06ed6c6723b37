// ==========================================
// 员工主数据生命周期系统 - 名册对账引擎
// ==========================================
// 职责: 名册行 ↔ 员工主数据对账（创建/更新/复活/跳过）
// 自然键: (first_name, last_name, birth_date)
// 红线: 锁定字段绝不写入; lock_all 员工整行跳过
// ==========================================

use crate::config::HrConfigReader;
use crate::domain::employee::{Employee, EmployeeDelta, ReconcileSummary, RosterRow};
use crate::domain::types::EmployeeStatus;
use crate::importer::strip_diacritics;
use crate::repository::EmployeeRepository;
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 姓名片段归一化（邮箱生成用）
///
/// 小写 + 去变音 + 只留字母/空格/连字符，空格与连字符折叠为单个点
pub fn normalize_name_part(raw: &str) -> String {
    let lowered = strip_diacritics(raw).to_lowercase();
    let filtered: String = lowered
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == ' ' || *c == '-')
        .collect();

    let mut out = String::with_capacity(filtered.len());
    let mut pending_dot = false;
    for c in filtered.trim().chars() {
        if c == ' ' || c == '-' {
            pending_dot = true;
        } else {
            if pending_dot && !out.is_empty() {
                out.push('.');
            }
            pending_dot = false;
            out.push(c);
        }
    }
    out
}

/// 由姓名生成公司邮箱: vorname.nachname@domain
///
/// 任一姓名片段归一化后为空则不生成
pub fn build_email(first_name: &str, last_name: &str, domain: &str) -> Option<String> {
    let first = normalize_name_part(first_name);
    let last = normalize_name_part(last_name);
    if first.is_empty() || last.is_empty() {
        return None;
    }
    Some(format!("{}.{}@{}", first, last, domain))
}

// ==========================================
// ReconcileOutcome - 对账结果
// ==========================================
/// 对账产物: 计数器 + 本次名册触达的员工 ID 集合
///
/// touched 集合是离职检测的输入，包含被锁定跳过的匹配行
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub summary: ReconcileSummary,
    pub touched: HashSet<String>,
}

// ==========================================
// RosterReconciler - 名册对账引擎
// ==========================================
/// 名册对账引擎
///
/// # 职责
/// 1. 按自然键匹配名册行与员工主数据
/// 2. 计算并应用字段增量（尊重字段锁）
/// 3. 创建新员工（缺失入职日期回退为运行日）
/// 4. EXITED 员工重新出现 → 复活
/// 5. 维护对账计数器与触达集合
///
/// # 红线
/// - 不做离职判定（由 ExitDetector 负责）
/// - 所有数据库操作通过 Repository
pub struct RosterReconciler<R: ?Sized, C>
where
    R: EmployeeRepository,
    C: HrConfigReader,
{
    repo: Arc<R>,
    config: Arc<C>,
}

impl<R: ?Sized, C> RosterReconciler<R, C>
where
    R: EmployeeRepository,
    C: HrConfigReader,
{
    /// 创建新的 RosterReconciler 实例
    pub fn new(repo: Arc<R>, config: Arc<C>) -> Self {
        Self { repo, config }
    }

    /// 对账主入口
    ///
    /// # 参数
    /// - rows: 已解析的名册行
    /// - run_date: 运行日（新员工缺失入职日期时的回退值）
    ///
    /// # 返回
    /// - ReconcileOutcome: 计数器 + 触达员工 ID 集合
    ///
    /// # 流程
    /// 按配置的批次大小分批处理，批次只限制峰值内存，无事务含义
    pub async fn reconcile(
        &self,
        rows: &[RosterRow],
        run_date: NaiveDate,
    ) -> Result<ReconcileOutcome, Box<dyn Error>> {
        let batch_size = self.config.get_import_batch_size().await?.max(1);
        let email_domain = self.config.get_email_domain().await?;

        let mut outcome = ReconcileOutcome::default();
        outcome.summary.total_rows = rows.len() as i64;

        for (batch_idx, batch) in rows.chunks(batch_size).enumerate() {
            debug!(batch = batch_idx, rows = batch.len(), "处理对账批次");
            for row in batch {
                // 单行持久化失败只影响该行，不中断整次导入
                if let Err(e) = self
                    .reconcile_row(row, run_date, &email_domain, &mut outcome)
                    .await
                {
                    warn!(row = row.row_number, error = %e, "名册行处理失败，跳过本行");
                }
            }
        }

        info!(
            created = outcome.summary.created,
            updated = outcome.summary.updated,
            reactivated = outcome.summary.reactivated,
            skipped_locked = outcome.summary.skipped_locked,
            skipped_no_data = outcome.summary.skipped_no_data,
            total = outcome.summary.total_rows,
            "名册对账完成"
        );
        Ok(outcome)
    }

    /// 对账单行
    async fn reconcile_row(
        &self,
        row: &RosterRow,
        run_date: NaiveDate,
        email_domain: &str,
        outcome: &mut ReconcileOutcome,
    ) -> Result<(), Box<dyn Error>> {
        // === 步骤 1: 自然键完整性检查 ===
        let (first_name, last_name, birth_date) =
            match (&row.first_name, &row.last_name, row.birth_date) {
                (Some(f), Some(l), Some(b)) => (f.as_str(), l.as_str(), b),
                _ => {
                    debug!(row = row.row_number, "自然键不完整，丢弃整行");
                    outcome.summary.skipped_no_data += 1;
                    return Ok(());
                }
            };

        // === 步骤 2: 自然键匹配 ===
        let existing = self
            .repo
            .find_by_natural_key(first_name, last_name, birth_date)
            .await?;

        match existing {
            Some(employee) => {
                outcome.touched.insert(employee.id.clone());
                self.update_existing(row, &employee, email_domain, outcome)
                    .await?;
            }
            None => {
                self.create_new(row, first_name, last_name, birth_date, run_date, email_domain, outcome)
                    .await?;
            }
        }
        Ok(())
    }

    /// 更新已有员工（计算增量，尊重字段锁）
    async fn update_existing(
        &self,
        row: &RosterRow,
        employee: &Employee,
        email_domain: &str,
        outcome: &mut ReconcileOutcome,
    ) -> Result<(), Box<dyn Error>> {
        // lock_all: 整行跳过，任何字段不得改动
        if employee.locks.lock_all {
            outcome.summary.skipped_locked += 1;
            return Ok(());
        }

        let mut delta = EmployeeDelta::default();

        if let Some(start_date) = row.start_date {
            if start_date != employee.start_date && !employee.locks.lock_start_date {
                delta.start_date = Some(start_date);
            }
        }
        if let Some(email) = &row.email {
            if Some(email.as_str()) != employee.email.as_deref() && !employee.locks.lock_email {
                delta.email = Some(email.clone());
            }
        } else if employee.email.is_none() && !employee.locks.lock_email {
            // 主数据与名册均无邮箱时按姓名补全
            delta.email = build_email(&employee.first_name, &employee.last_name, email_domain);
        }
        // EXITED 员工重新出现在名册中 → 复活
        if employee.status == EmployeeStatus::Exited {
            delta.reactivate = true;
        }

        if delta.is_empty() {
            // 口径: 无变化的行与锁定行同计入 skipped_locked
            outcome.summary.skipped_locked += 1;
            return Ok(());
        }

        let reactivated = delta.reactivate;
        self.repo.apply_delta(&employee.id, &delta).await?;
        if reactivated {
            debug!(employee_id = %employee.id, "EXITED 员工复活");
            outcome.summary.reactivated += 1;
        } else {
            outcome.summary.updated += 1;
        }
        Ok(())
    }

    /// 创建新员工
    #[allow(clippy::too_many_arguments)]
    async fn create_new(
        &self,
        row: &RosterRow,
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
        run_date: NaiveDate,
        email_domain: &str,
        outcome: &mut ReconcileOutcome,
    ) -> Result<(), Box<dyn Error>> {
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: row
                .email
                .clone()
                .or_else(|| build_email(first_name, last_name, email_domain)),
            // 缺失入职日期回退为运行日
            start_date: row.start_date.unwrap_or(run_date),
            birth_date,
            status: EmployeeStatus::Active,
            exit_date: None,
            locks: row.locks,
            created_at: now,
            updated_at: now,
        };

        match self.repo.insert(&employee).await {
            Ok(()) => {
                outcome.touched.insert(employee.id);
                outcome.summary.created += 1;
            }
            Err(e) if e.is_unique_violation() => {
                // 并发导入竞争: 另一方已创建，视为已触达并跳过
                warn!(row = row.row_number, "自然键并发冲突，跳过本行");
                if let Some(winner) = self
                    .repo
                    .find_by_natural_key(first_name, last_name, birth_date)
                    .await?
                {
                    outcome.touched.insert(winner.id);
                }
                outcome.summary.skipped_locked += 1;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_part() {
        assert_eq!(normalize_name_part("Müller"), "muller");
        assert_eq!(normalize_name_part("Anna-Lena"), "anna.lena");
        assert_eq!(normalize_name_part("Jan Philipp"), "jan.philipp");
        assert_eq!(normalize_name_part("  Groß  "), "gross");
        assert_eq!(normalize_name_part("O'Brien"), "obrien");
        assert_eq!(normalize_name_part("123"), "");
    }

    #[test]
    fn test_build_email() {
        assert_eq!(
            build_email("Anna-Lena", "Müller", "realcore.de"),
            Some("anna.lena.muller@realcore.de".to_string())
        );
        assert_eq!(build_email("", "Müller", "realcore.de"), None);
        assert_eq!(build_email("Anna", "123", "realcore.de"), None);
    }
}
