// ==========================================
// 员工主数据生命周期系统 - 导入审计日志仓储
// ==========================================
// 职责: import_run_log 表的只追加访问
// 约束: 审计记录只插入、只按时间倒序读取，从不更新
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::employee::ImportRunLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ImportRunLogRepository - 导入审计仓储
// ==========================================
pub struct ImportRunLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportRunLogRepository {
    /// 创建新的 ImportRunLogRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> SqliteResult<ImportRunLog> {
        Ok(ImportRunLog {
            id: row.get(0)?,
            created: row.get(1)?,
            updated: row.get(2)?,
            skipped_locked: row.get(3)?,
            exited: row.get(4)?,
            skipped_exit_locked: row.get(5)?,
            reactivated: row.get(6)?,
            skipped_no_data: row.get(7)?,
            total_rows: row.get(8)?,
            imported_at: row.get(9)?,
        })
    }

    /// 追加一条审计记录
    pub fn append(&self, log: &ImportRunLog) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_run_log (
                id, created, updated, skipped_locked, exited,
                skipped_exit_locked, reactivated, skipped_no_data,
                total_rows, imported_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                log.id,
                log.created,
                log.updated,
                log.skipped_locked,
                log.exited,
                log.skipped_exit_locked,
                log.reactivated,
                log.skipped_no_data,
                log.total_rows,
                log.imported_at,
            ],
        )?;
        Ok(())
    }

    /// 最近 N 次导入记录，按时间倒序
    pub fn recent(&self, limit: usize) -> RepositoryResult<Vec<ImportRunLog>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                id, created, updated, skipped_locked, exited,
                skipped_exit_locked, reactivated, skipped_no_data,
                total_rows, imported_at
            FROM import_run_log
            ORDER BY imported_at DESC
            LIMIT ?1
            "#,
        )?;

        let logs = stmt
            .query_map(params![limit as i64], Self::map_row)?
            .collect::<SqliteResult<Vec<ImportRunLog>>>()?;

        Ok(logs)
    }
}
