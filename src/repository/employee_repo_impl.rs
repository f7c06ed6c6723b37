// ==========================================
// 员工主数据生命周期系统 - 员工仓储实现 (SQLite)
// ==========================================
// 职责: 管理 employee 表的数据访问
// 红线: 不含业务逻辑，只负责数据访问
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::employee::{Employee, EmployeeDelta, LockFlags};
use crate::domain::types::EmployeeStatus;
use crate::repository::employee_repo::EmployeeRepository;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// employee 表的查询列清单（与 map_employee_row 严格对应）
const EMPLOYEE_COLUMNS: &str = r#"
    id, first_name, last_name, email, start_date, birth_date,
    status, exit_date,
    lock_all, lock_first_name, lock_last_name,
    lock_start_date, lock_birth_date, lock_email,
    created_at, updated_at
"#;

// ==========================================
// EmployeeRepositoryImpl - 员工主数据仓储
// ==========================================
pub struct EmployeeRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl EmployeeRepositoryImpl {
    /// 创建新的 EmployeeRepositoryImpl 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
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

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 行映射: employee 表 → Employee
    fn map_employee_row(row: &Row<'_>) -> SqliteResult<Employee> {
        Ok(Employee {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            start_date: row.get(4)?,
            birth_date: row.get(5)?,
            status: EmployeeStatus::from_str(&row.get::<_, String>(6)?),
            exit_date: row.get(7)?,
            locks: LockFlags {
                lock_all: row.get(8)?,
                lock_first_name: row.get(9)?,
                lock_last_name: row.get(10)?,
                lock_start_date: row.get(11)?,
                lock_birth_date: row.get(12)?,
                lock_email: row.get(13)?,
            },
            created_at: row.get(14)?,
            updated_at: row.get(15)?,
        })
    }
}

#[async_trait]
impl EmployeeRepository for EmployeeRepositoryImpl {
    async fn find_by_natural_key(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
    ) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM employee WHERE first_name = ?1 AND last_name = ?2 AND birth_date = ?3",
            EMPLOYEE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row(params![first_name, last_name, birth_date], Self::map_employee_row);

        match result {
            Ok(employee) => Ok(Some(employee)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Employee>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM employee WHERE id = ?1", EMPLOYEE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row(params![id], Self::map_employee_row);

        match result {
            Ok(employee) => Ok(Some(employee)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn insert(&self, employee: &Employee) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO employee (
                id, first_name, last_name, email, start_date, birth_date,
                status, exit_date,
                lock_all, lock_first_name, lock_last_name,
                lock_start_date, lock_birth_date, lock_email,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                employee.id,
                employee.first_name,
                employee.last_name,
                employee.email,
                employee.start_date,
                employee.birth_date,
                employee.status.to_db_str(),
                employee.exit_date,
                employee.locks.lock_all,
                employee.locks.lock_first_name,
                employee.locks.lock_last_name,
                employee.locks.lock_start_date,
                employee.locks.lock_birth_date,
                employee.locks.lock_email,
                employee.created_at,
                employee.updated_at,
            ],
        )?;
        Ok(())
    }

    async fn apply_delta(&self, id: &str, delta: &EmployeeDelta) -> RepositoryResult<()> {
        if delta.is_empty() {
            return Ok(());
        }

        // 动态拼接 SET 子句，只写入 delta 中存在的字段
        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(first_name) = &delta.first_name {
            sets.push(format!("first_name = ?{}", values.len() + 1));
            values.push(Box::new(first_name.clone()));
        }
        if let Some(last_name) = &delta.last_name {
            sets.push(format!("last_name = ?{}", values.len() + 1));
            values.push(Box::new(last_name.clone()));
        }
        if let Some(start_date) = delta.start_date {
            sets.push(format!("start_date = ?{}", values.len() + 1));
            values.push(Box::new(start_date));
        }
        if let Some(birth_date) = delta.birth_date {
            sets.push(format!("birth_date = ?{}", values.len() + 1));
            values.push(Box::new(birth_date));
        }
        if let Some(email) = &delta.email {
            sets.push(format!("email = ?{}", values.len() + 1));
            values.push(Box::new(email.clone()));
        }
        if delta.reactivate {
            sets.push("status = 'ACTIVE'".to_string());
            sets.push("exit_date = NULL".to_string());
        }

        sets.push(format!("updated_at = ?{}", values.len() + 1));
        values.push(Box::new(Utc::now()));

        let sql = format!(
            "UPDATE employee SET {} WHERE id = ?{}",
            sets.join(", "),
            values.len() + 1
        );
        values.push(Box::new(id.to_string()));

        let conn = self.get_conn()?;
        let params_vec: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        let affected = conn.execute(&sql, params_vec.as_slice())?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Employee".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn mark_exited(&self, id: &str, exit_date: NaiveDate) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE employee SET status = 'EXITED', exit_date = ?1, updated_at = ?2 WHERE id = ?3",
            params![exit_date, Utc::now(), id],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Employee".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn list_all(&self) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM employee ORDER BY last_name, first_name",
            EMPLOYEE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let employees = stmt
            .query_map([], Self::map_employee_row)?
            .collect::<SqliteResult<Vec<Employee>>>()?;

        Ok(employees)
    }

    async fn list_active(&self) -> RepositoryResult<Vec<Employee>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM employee WHERE status = 'ACTIVE' ORDER BY last_name, first_name",
            EMPLOYEE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let employees = stmt
            .query_map([], Self::map_employee_row)?
            .collect::<SqliteResult<Vec<Employee>>>()?;

        Ok(employees)
    }
}
