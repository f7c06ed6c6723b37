// ==========================================
// 员工主数据生命周期系统 - 名册对账引擎集成测试
// ==========================================


use chrono::NaiveDate;
use hr_lifecycle::config::HrConfigReader;
use hr_lifecycle::domain::employee::{Employee, EmployeeDelta, LockFlags, ReconcileSummary, RosterRow};
use hr_lifecycle::domain::types::EmployeeStatus;
use hr_lifecycle::engine::{ExitDetector, RosterReconciler};
use hr_lifecycle::repository::{
    EmployeeRepository, EmployeeRepositoryImpl, RepositoryError, RepositoryResult,
};
use std::error::Error;
use std::sync::Arc;
use test_helpers::{create_test_db, d, make_employee};

// ==========================================
// MockConfigReader - 测试用配置读取器
// ==========================================
struct MockConfigReader;

#[async_trait::async_trait]
impl HrConfigReader for MockConfigReader {
    async fn get_jubilee_years(&self) -> Result<Vec<i32>, Box<dyn Error>> {
        Ok(vec![5, 10, 25])
    }

    async fn get_email_domain(&self) -> Result<String, Box<dyn Error>> {
        Ok("realcore.de".to_string())
    }

    async fn get_manager_emails(&self) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(vec!["hr@realcore.de".to_string()])
    }

    async fn get_birthday_email_template(&self) -> Result<String, Box<dyn Error>> {
        Ok("Happy Birthday, {{firstName}}!".to_string())
    }

    async fn get_jubilee_email_template(&self) -> Result<String, Box<dyn Error>> {
        Ok("{{firstName}}: {{years}} Jahre".to_string())
    }

    async fn get_import_batch_size(&self) -> Result<usize, Box<dyn Error>> {
        // 小批次，保证测试覆盖分批路径
        Ok(2)
    }

    async fn get_max_upload_rows(&self) -> Result<usize, Box<dyn Error>> {
        Ok(5000)
    }

    async fn get_max_upload_bytes(&self) -> Result<u64, Box<dyn Error>> {
        Ok(8 * 1024 * 1024)
    }
}

// ==========================================
// FailingInsertRepo - 指定姓名插入失败的仓储包装
// ==========================================
struct FailingInsertRepo {
    inner: Arc<EmployeeRepositoryImpl>,
    fail_first_name: String,
}

#[async_trait::async_trait]
impl EmployeeRepository for FailingInsertRepo {
    async fn find_by_natural_key(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
    ) -> RepositoryResult<Option<Employee>> {
        self.inner
            .find_by_natural_key(first_name, last_name, birth_date)
            .await
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Employee>> {
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, employee: &Employee) -> RepositoryResult<()> {
        if employee.first_name == self.fail_first_name {
            return Err(RepositoryError::DatabaseQueryError(
                "disk I/O error".to_string(),
            ));
        }
        self.inner.insert(employee).await
    }

    async fn apply_delta(&self, id: &str, delta: &EmployeeDelta) -> RepositoryResult<()> {
        self.inner.apply_delta(id, delta).await
    }

    async fn mark_exited(&self, id: &str, exit_date: NaiveDate) -> RepositoryResult<()> {
        self.inner.mark_exited(id, exit_date).await
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Employee>> {
        self.inner.list_all().await
    }

    async fn list_active(&self) -> RepositoryResult<Vec<Employee>> {
        self.inner.list_active().await
    }
}

fn setup() -> (tempfile::NamedTempFile, Arc<EmployeeRepositoryImpl>) {
    let (temp_file, db_path) = create_test_db().expect("创建测试数据库失败");
    let repo = EmployeeRepositoryImpl::new(&db_path).expect("创建Repository失败");
    (temp_file, Arc::new(repo))
}

fn reconciler(
    repo: Arc<EmployeeRepositoryImpl>,
) -> RosterReconciler<EmployeeRepositoryImpl, MockConfigReader> {
    RosterReconciler::new(repo, Arc::new(MockConfigReader))
}

fn row(first: &str, last: &str, birth: (i32, u32, u32)) -> RosterRow {
    RosterRow {
        first_name: Some(first.to_string()),
        last_name: Some(last.to_string()),
        birth_date: Some(d(birth.0, birth.1, birth.2)),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_update_and_no_data() {
    let (_tmp, repo) = setup();

    // 预置员工 Anna
    let anna = make_employee("Anna", "Schmidt", d(1995, 12, 24), d(2020, 3, 1));
    repo.insert(&anna).await.unwrap();

    // 行1: Anna 入职日期变更 → updated
    let mut r1 = row("Anna", "Schmidt", (1995, 12, 24));
    r1.start_date = Some(d(2020, 4, 1));
    // 行2: 新员工 → created，邮箱自动生成
    let mut r2 = row("Max", "Müller", (1990, 5, 1));
    r2.start_date = Some(d(2024, 1, 15));
    // 行3: 缺出生日期 → skipped_no_data
    let mut r3 = row("Eva", "Braun", (1991, 1, 1));
    r3.birth_date = None;

    let outcome = reconciler(repo.clone())
        .reconcile(&[r1, r2, r3], d(2025, 6, 1))
        .await
        .unwrap();

    assert_eq!(outcome.summary.created, 1);
    assert_eq!(outcome.summary.updated, 1);
    assert_eq!(outcome.summary.skipped_no_data, 1);
    assert_eq!(outcome.summary.total_rows, 3);
    assert_eq!(outcome.touched.len(), 2);

    let anna_after = repo.find_by_id(&anna.id).await.unwrap().unwrap();
    assert_eq!(anna_after.start_date, d(2020, 4, 1));

    let max = repo
        .find_by_natural_key("Max", "Müller", d(1990, 5, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(max.email.as_deref(), Some("max.muller@realcore.de"));
    assert_eq!(max.start_date, d(2024, 1, 15));
}

#[tokio::test]
async fn test_missing_start_date_falls_back_to_run_date() {
    let (_tmp, repo) = setup();
    let run_date = d(2025, 6, 1);

    let outcome = reconciler(repo.clone())
        .reconcile(&[row("Lena", "Köhler", (1992, 2, 2))], run_date)
        .await
        .unwrap();

    assert_eq!(outcome.summary.created, 1);
    let lena = repo
        .find_by_natural_key("Lena", "Köhler", d(1992, 2, 2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(lena.start_date, run_date);
}

#[tokio::test]
async fn test_lock_all_blocks_every_field() {
    let (_tmp, repo) = setup();

    let mut emp = make_employee("Jan", "Weber", d(1993, 3, 3), d(2020, 1, 1));
    emp.locks.lock_all = true;
    repo.insert(&emp).await.unwrap();

    let mut r = row("Jan", "Weber", (1993, 3, 3));
    r.start_date = Some(d(2021, 1, 1));
    r.email = Some("neu@realcore.de".to_string());

    let outcome = reconciler(repo.clone())
        .reconcile(&[r], d(2025, 6, 1))
        .await
        .unwrap();

    assert_eq!(outcome.summary.skipped_locked, 1);
    assert_eq!(outcome.summary.updated, 0);
    // 锁定员工仍算触达（不得被离职检测误判）
    assert!(outcome.touched.contains(&emp.id));

    let after = repo.find_by_id(&emp.id).await.unwrap().unwrap();
    assert_eq!(after.start_date, d(2020, 1, 1));
    assert_eq!(after.email, emp.email);
}

#[tokio::test]
async fn test_field_lock_blocks_single_field() {
    let (_tmp, repo) = setup();

    let mut emp = make_employee("Tim", "Vogel", d(1988, 8, 8), d(2019, 5, 1));
    emp.locks.lock_start_date = true;
    repo.insert(&emp).await.unwrap();

    let mut r = row("Tim", "Vogel", (1988, 8, 8));
    r.start_date = Some(d(2020, 5, 1));
    r.email = Some("tim.v@realcore.de".to_string());

    let outcome = reconciler(repo.clone())
        .reconcile(&[r], d(2025, 6, 1))
        .await
        .unwrap();

    assert_eq!(outcome.summary.updated, 1);
    let after = repo.find_by_id(&emp.id).await.unwrap().unwrap();
    // 锁定字段保持不变，未锁定字段照常更新
    assert_eq!(after.start_date, d(2019, 5, 1));
    assert_eq!(after.email.as_deref(), Some("tim.v@realcore.de"));
}

#[tokio::test]
async fn test_exited_employee_reactivates() {
    let (_tmp, repo) = setup();

    let mut emp = make_employee("Ute", "Lang", d(1985, 4, 4), d(2010, 9, 1));
    emp.status = EmployeeStatus::Exited;
    emp.exit_date = Some(d(2024, 12, 31));
    repo.insert(&emp).await.unwrap();

    let outcome = reconciler(repo.clone())
        .reconcile(&[row("Ute", "Lang", (1985, 4, 4))], d(2025, 6, 1))
        .await
        .unwrap();

    assert_eq!(outcome.summary.reactivated, 1);
    assert_eq!(outcome.summary.updated, 0);

    let after = repo.find_by_id(&emp.id).await.unwrap().unwrap();
    assert_eq!(after.status, EmployeeStatus::Active);
    assert_eq!(after.exit_date, None);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let (_tmp, repo) = setup();

    let mut rows = Vec::new();
    for i in 0..5 {
        let mut r = row(&format!("P{}", i), "Tester", (1990, 1, 1 + i));
        r.start_date = Some(d(2024, 2, 1));
        rows.push(r);
    }

    let first = reconciler(repo.clone())
        .reconcile(&rows, d(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(first.summary.created, 5);

    // 第二次导入同一名册: 全部无变化 → skipped_locked
    let second = reconciler(repo.clone())
        .reconcile(&rows, d(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(second.summary.created, 0);
    assert_eq!(second.summary.updated, 0);
    assert_eq!(second.summary.skipped_locked, 5);
}

#[tokio::test]
async fn test_exit_detection_marks_untouched_active() {
    let (_tmp, repo) = setup();
    let run_date = d(2025, 6, 1);

    let stays = make_employee("Anna", "Schmidt", d(1995, 12, 24), d(2020, 3, 1));
    let leaves = make_employee("Max", "Müller", d(1990, 5, 1), d(2018, 1, 1));
    let mut locked = make_employee("Jan", "Weber", d(1993, 3, 3), d(2019, 1, 1));
    locked.locks.lock_all = true;
    repo.insert(&stays).await.unwrap();
    repo.insert(&leaves).await.unwrap();
    repo.insert(&locked).await.unwrap();

    // 名册只含 Anna 与锁定的 Jan
    let outcome = reconciler(repo.clone())
        .reconcile(
            &[
                row("Anna", "Schmidt", (1995, 12, 24)),
                row("Jan", "Weber", (1993, 3, 3)),
            ],
            run_date,
        )
        .await
        .unwrap();

    let mut summary: ReconcileSummary = outcome.summary;
    ExitDetector::new(repo.clone())
        .detect(&outcome.touched, run_date, &mut summary)
        .await
        .unwrap();

    assert_eq!(summary.exited, 1);
    assert_eq!(summary.skipped_exit_locked, 0);

    let left = repo.find_by_id(&leaves.id).await.unwrap().unwrap();
    assert_eq!(left.status, EmployeeStatus::Exited);
    assert_eq!(left.exit_date, Some(run_date));

    let kept = repo.find_by_id(&stays.id).await.unwrap().unwrap();
    assert_eq!(kept.status, EmployeeStatus::Active);
}

#[tokio::test]
async fn test_exit_detection_respects_lock_all() {
    let (_tmp, repo) = setup();
    let run_date = d(2025, 6, 1);

    let mut locked = make_employee("Jan", "Weber", d(1993, 3, 3), d(2019, 1, 1));
    locked.locks.lock_all = true;
    repo.insert(&locked).await.unwrap();

    // 空名册: 锁定员工不得被判定离职
    let outcome = reconciler(repo.clone())
        .reconcile(&[], run_date)
        .await
        .unwrap();

    let mut summary = outcome.summary;
    ExitDetector::new(repo.clone())
        .detect(&outcome.touched, run_date, &mut summary)
        .await
        .unwrap();

    assert_eq!(summary.exited, 0);
    assert_eq!(summary.skipped_exit_locked, 1);

    let after = repo.find_by_id(&locked.id).await.unwrap().unwrap();
    assert_eq!(after.status, EmployeeStatus::Active);
    assert_eq!(after.exit_date, None);
}

#[tokio::test]
async fn test_locked_row_without_natural_key_counts_no_data() {
    let (_tmp, repo) = setup();

    // 锁标志解析出来也不能补救自然键缺失
    let r = RosterRow {
        first_name: Some("Nur".to_string()),
        locks: LockFlags {
            lock_all: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let outcome = reconciler(repo).reconcile(&[r], d(2025, 6, 1)).await.unwrap();
    assert_eq!(outcome.summary.skipped_no_data, 1);
    assert_eq!(outcome.summary.skipped_locked, 0);
}

#[tokio::test]
async fn test_row_failure_does_not_abort_batch() {
    let (_tmp, repo) = setup();

    let flaky = Arc::new(FailingInsertRepo {
        inner: repo.clone(),
        fail_first_name: "Bad".to_string(),
    });

    let rows = vec![
        row("Anna", "Schmidt", (1995, 12, 24)),
        row("Bad", "Row", (1990, 1, 1)),
        row("Max", "Müller", (1990, 5, 1)),
    ];

    // 中间行持久化失败: 其余行照常处理，整次导入不中断
    let outcome = RosterReconciler::new(flaky, Arc::new(MockConfigReader))
        .reconcile(&rows, d(2025, 6, 1))
        .await
        .unwrap();

    assert_eq!(outcome.summary.created, 2);
    assert_eq!(outcome.summary.total_rows, 3);
    assert!(repo
        .find_by_natural_key("Max", "Müller", d(1990, 5, 1))
        .await
        .unwrap()
        .is_some());
    assert!(repo
        .find_by_natural_key("Bad", "Row", d(1990, 1, 1))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_matched_employee_without_email_gets_generated() {
    let (_tmp, repo) = setup();

    let mut emp = make_employee("Anna", "Schmidt", d(1995, 12, 24), d(2020, 3, 1));
    emp.email = None;
    repo.insert(&emp).await.unwrap();

    // 名册行也不带邮箱: 按姓名与配置域名补全
    let outcome = reconciler(repo.clone())
        .reconcile(&[row("Anna", "Schmidt", (1995, 12, 24))], d(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(outcome.summary.updated, 1);

    let after = repo.find_by_id(&emp.id).await.unwrap().unwrap();
    assert_eq!(after.email.as_deref(), Some("anna.schmidt@realcore.de"));
}

#[tokio::test]
async fn test_email_autofill_respects_lock() {
    let (_tmp, repo) = setup();

    let mut emp = make_employee("Max", "Müller", d(1990, 5, 1), d(2018, 1, 1));
    emp.email = None;
    emp.locks.lock_email = true;
    repo.insert(&emp).await.unwrap();

    let outcome = reconciler(repo.clone())
        .reconcile(&[row("Max", "Müller", (1990, 5, 1))], d(2025, 6, 1))
        .await
        .unwrap();
    // 锁定字段不补全，无其他增量 → skipped_locked
    assert_eq!(outcome.summary.skipped_locked, 1);

    let after = repo.find_by_id(&emp.id).await.unwrap().unwrap();
    assert_eq!(after.email, None);
}
