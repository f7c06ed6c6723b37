// ==========================================
// 员工主数据生命周期系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免"部分模块外键开启/部分不开启"
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 提供幂等建表入口（CREATE TABLE IF NOT EXISTS）
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 幂等初始化数据库 schema
///
/// 约束要点：
/// - employee 自然键唯一: (first_name, last_name, birth_date)
/// - task_assignment 唯一: (employee_id, task_template_id)
/// - import_run_log 只追加，不更新
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS employee (
            id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT,
            start_date TEXT NOT NULL,
            birth_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'ACTIVE',
            exit_date TEXT,
            lock_all INTEGER NOT NULL DEFAULT 0,
            lock_first_name INTEGER NOT NULL DEFAULT 0,
            lock_last_name INTEGER NOT NULL DEFAULT 0,
            lock_start_date INTEGER NOT NULL DEFAULT 0,
            lock_birth_date INTEGER NOT NULL DEFAULT 0,
            lock_email INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (first_name, last_name, birth_date)
        );

        CREATE TABLE IF NOT EXISTS task_template (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            type TEXT NOT NULL,
            owner_role TEXT NOT NULL,
            relative_due_days INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS task_assignment (
            id TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL REFERENCES employee(id) ON DELETE CASCADE,
            task_template_id TEXT NOT NULL REFERENCES task_template(id) ON DELETE CASCADE,
            type TEXT NOT NULL,
            due_date TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'OPEN',
            owner_role TEXT,
            notes TEXT,
            completed_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (employee_id, task_template_id)
        );

        CREATE INDEX IF NOT EXISTS idx_task_assignment_due
            ON task_assignment (status, due_date);

        CREATE TABLE IF NOT EXISTS import_run_log (
            id TEXT PRIMARY KEY,
            created INTEGER NOT NULL DEFAULT 0,
            updated INTEGER NOT NULL DEFAULT 0,
            skipped_locked INTEGER NOT NULL DEFAULT 0,
            exited INTEGER NOT NULL DEFAULT 0,
            skipped_exit_locked INTEGER NOT NULL DEFAULT 0,
            reactivated INTEGER NOT NULL DEFAULT 0,
            skipped_no_data INTEGER NOT NULL DEFAULT 0,
            total_rows INTEGER NOT NULL DEFAULT 0,
            imported_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL DEFAULT 'global',
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );
        "#,
    )?;
    Ok(())
}

/// 打开连接并确保 schema 就绪（CLI/测试共用入口）
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}
