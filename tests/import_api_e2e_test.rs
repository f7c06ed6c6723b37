// ==========================================
// 员工主数据生命周期系统 - 名册导入API端到端测试
// ==========================================


use hr_lifecycle::api::{ApiError, ImportApi};
use hr_lifecycle::domain::types::EmployeeStatus;
use hr_lifecycle::repository::{EmployeeRepository, EmployeeRepositoryImpl};
use std::io::Write;
use test_helpers::{create_test_db, d, make_employee};

fn write_roster_csv(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn test_full_import_flow() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let repo = EmployeeRepositoryImpl::new(&db_path).unwrap();

    // 预置: 一名将被判定离职的员工，一名将被更新的员工
    let leaves = make_employee("Old", "Timer", d(1980, 1, 1), d(2000, 1, 1));
    let stays = make_employee("Anna", "Schmidt", d(1995, 12, 24), d(2020, 3, 1));
    repo.insert(&leaves).await.unwrap();
    repo.insert(&stays).await.unwrap();

    let roster = write_roster_csv(
        "firstName,lastName,birthDate,startDate,email\n\
         Anna,Schmidt,24.12.1995,01.04.2020,anna.schmidt@realcore.de\n\
         Max,Müller,01.05.1990,45292,\n\
         ,NurNachname,,,\n",
    );

    let api = ImportApi::new(db_path.clone());
    let response = api
        .import_roster(roster.path().to_str().unwrap())
        .await
        .unwrap();

    assert_eq!(response.created, 1);
    assert_eq!(response.updated, 1);
    assert_eq!(response.skipped_no_data, 1);
    assert_eq!(response.exited, 1);
    assert_eq!(response.total_rows, 3);

    // Excel 序列号 45292 = 2024-01-01
    let max = repo
        .find_by_natural_key("Max", "Müller", d(1990, 5, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(max.start_date, d(2024, 1, 1));
    assert_eq!(max.email.as_deref(), Some("max.muller@realcore.de"));

    let left = repo.find_by_id(&leaves.id).await.unwrap().unwrap();
    assert_eq!(left.status, EmployeeStatus::Exited);

    // 审计记录已追加
    let runs = api.recent_runs(5).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, response.run_id);
    assert_eq!(runs[0].created, 1);
    assert_eq!(runs[0].exited, 1);
}

#[tokio::test]
async fn test_reimport_reactivates_exited() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(db_path.clone());

    let roster_v1 = write_roster_csv(
        "firstName,lastName,birthDate,startDate\n\
         Anna,Schmidt,24.12.1995,01.03.2020\n\
         Max,Müller,01.05.1990,01.01.2024\n",
    );
    api.import_roster(roster_v1.path().to_str().unwrap())
        .await
        .unwrap();

    // Max 从名册消失 → 离职
    let roster_v2 = write_roster_csv(
        "firstName,lastName,birthDate,startDate\n\
         Anna,Schmidt,24.12.1995,01.03.2020\n",
    );
    let r2 = api
        .import_roster(roster_v2.path().to_str().unwrap())
        .await
        .unwrap();
    assert_eq!(r2.exited, 1);

    // Max 重新出现 → 复活
    let r3 = api
        .import_roster(roster_v1.path().to_str().unwrap())
        .await
        .unwrap();
    assert_eq!(r3.reactivated, 1);
    assert_eq!(r3.exited, 0);

    let repo = EmployeeRepositoryImpl::new(&db_path).unwrap();
    let max = repo
        .find_by_natural_key("Max", "Müller", d(1990, 5, 1))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(max.status, EmployeeStatus::Active);
    assert_eq!(max.exit_date, None);
}

#[tokio::test]
async fn test_unsupported_file_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(db_path);

    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    file.write_all(b"not a roster").unwrap();

    let err = api
        .import_roster(file.path().to_str().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError(_)));
}

#[tokio::test]
async fn test_recent_runs_limit_validated() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let api = ImportApi::new(db_path);

    assert!(matches!(
        api.recent_runs(0).await.unwrap_err(),
        ApiError::InvalidInput(_)
    ));
}
