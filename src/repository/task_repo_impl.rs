// ==========================================
// 员工主数据生命周期系统 - 任务仓储实现 (SQLite)
// ==========================================
// 职责: 管理 task_template / task_assignment 表的数据访问
// 约束: (employee_id, task_template_id) 唯一，由 schema 强制
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::task::{NewTaskTemplate, TaskAssignment, TaskTemplate, TaskTemplatePatch};
use crate::domain::types::{LifecycleType, TaskStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::task_repo::{TaskAssignmentRepository, TaskFilter, TaskTemplateRepository};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const TEMPLATE_COLUMNS: &str = r#"
    id, title, description, type, owner_role, relative_due_days, active,
    created_at, updated_at
"#;

const ASSIGNMENT_COLUMNS: &str = r#"
    id, employee_id, task_template_id, type, due_date, status,
    owner_role, notes, completed_at, created_at, updated_at
"#;

// ==========================================
// TaskRepositoryImpl - 任务仓储（模板 + 分配）
// ==========================================
pub struct TaskRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl TaskRepositoryImpl {
    /// 创建新的 TaskRepositoryImpl 实例
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

    /// 行映射: task_template 表 → TaskTemplate
    fn map_template_row(row: &Row<'_>) -> SqliteResult<TaskTemplate> {
        let lifecycle_raw: String = row.get(3)?;
        Ok(TaskTemplate {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            lifecycle: LifecycleType::from_str(&lifecycle_raw)
                .unwrap_or(LifecycleType::Onboarding),
            owner_role: row.get(4)?,
            relative_due_days: row.get(5)?,
            active: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    /// 行映射: task_assignment 表 → TaskAssignment
    fn map_assignment_row(row: &Row<'_>) -> SqliteResult<TaskAssignment> {
        let lifecycle_raw: String = row.get(3)?;
        let status_raw: String = row.get(5)?;
        Ok(TaskAssignment {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            task_template_id: row.get(2)?,
            lifecycle: LifecycleType::from_str(&lifecycle_raw)
                .unwrap_or(LifecycleType::Onboarding),
            due_date: row.get(4)?,
            status: TaskStatus::from_str(&status_raw).unwrap_or(TaskStatus::Open),
            owner_role: row.get(6)?,
            notes: row.get(7)?,
            completed_at: row.get(8)?,
            created_at: row.get(9)?,
            updated_at: row.get(10)?,
        })
    }
}

#[async_trait]
impl TaskTemplateRepository for TaskRepositoryImpl {
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<TaskTemplate>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM task_template WHERE id = ?1", TEMPLATE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row(params![id], Self::map_template_row);

        match result {
            Ok(template) => Ok(Some(template)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_active(
        &self,
        lifecycle: LifecycleType,
        template_id: Option<&str>,
    ) -> RepositoryResult<Vec<TaskTemplate>> {
        let conn = self.get_conn()?;

        if let Some(template_id) = template_id {
            let sql = format!(
                "SELECT {} FROM task_template WHERE type = ?1 AND active = 1 AND id = ?2 ORDER BY title",
                TEMPLATE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let templates = stmt
                .query_map(params![lifecycle.to_db_str(), template_id], Self::map_template_row)?
                .collect::<SqliteResult<Vec<TaskTemplate>>>()?;
            Ok(templates)
        } else {
            let sql = format!(
                "SELECT {} FROM task_template WHERE type = ?1 AND active = 1 ORDER BY title",
                TEMPLATE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let templates = stmt
                .query_map(params![lifecycle.to_db_str()], Self::map_template_row)?
                .collect::<SqliteResult<Vec<TaskTemplate>>>()?;
            Ok(templates)
        }
    }

    async fn list_all(&self) -> RepositoryResult<Vec<TaskTemplate>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM task_template ORDER BY type, title",
            TEMPLATE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let templates = stmt
            .query_map([], Self::map_template_row)?
            .collect::<SqliteResult<Vec<TaskTemplate>>>()?;

        Ok(templates)
    }

    async fn insert(&self, template: &NewTaskTemplate) -> RepositoryResult<TaskTemplate> {
        let now = Utc::now();
        let created = TaskTemplate {
            id: Uuid::new_v4().to_string(),
            title: template.title.clone(),
            description: template.description.clone(),
            lifecycle: template.lifecycle,
            owner_role: template.owner_role.clone(),
            relative_due_days: template.relative_due_days,
            active: template.active,
            created_at: now,
            updated_at: now,
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO task_template (
                id, title, description, type, owner_role,
                relative_due_days, active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                created.id,
                created.title,
                created.description,
                created.lifecycle.to_db_str(),
                created.owner_role,
                created.relative_due_days,
                created.active,
                created.created_at,
                created.updated_at,
            ],
        )?;

        Ok(created)
    }

    async fn update(&self, id: &str, patch: &TaskTemplatePatch) -> RepositoryResult<TaskTemplate> {
        {
            let mut sets: Vec<String> = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(title) = &patch.title {
                sets.push(format!("title = ?{}", values.len() + 1));
                values.push(Box::new(title.clone()));
            }
            if let Some(description) = &patch.description {
                sets.push(format!("description = ?{}", values.len() + 1));
                values.push(Box::new(description.clone()));
            }
            if let Some(lifecycle) = patch.lifecycle {
                sets.push(format!("type = ?{}", values.len() + 1));
                values.push(Box::new(lifecycle.to_db_str().to_string()));
            }
            if let Some(owner_role) = &patch.owner_role {
                sets.push(format!("owner_role = ?{}", values.len() + 1));
                values.push(Box::new(owner_role.clone()));
            }
            if let Some(days) = patch.relative_due_days {
                sets.push(format!("relative_due_days = ?{}", values.len() + 1));
                values.push(Box::new(days));
            }
            if let Some(active) = patch.active {
                sets.push(format!("active = ?{}", values.len() + 1));
                values.push(Box::new(active));
            }

            if !sets.is_empty() {
                sets.push(format!("updated_at = ?{}", values.len() + 1));
                values.push(Box::new(Utc::now()));

                let sql = format!(
                    "UPDATE task_template SET {} WHERE id = ?{}",
                    sets.join(", "),
                    values.len() + 1
                );
                values.push(Box::new(id.to_string()));

                let conn = self.get_conn()?;
                let params_vec: Vec<&dyn rusqlite::ToSql> =
                    values.iter().map(|v| v.as_ref()).collect();
                let affected = conn.execute(&sql, params_vec.as_slice())?;

                if affected == 0 {
                    return Err(RepositoryError::NotFound {
                        entity: "TaskTemplate".to_string(),
                        id: id.to_string(),
                    });
                }
            }
        }

        self.find_by_id(id).await?.ok_or_else(|| RepositoryError::NotFound {
            entity: "TaskTemplate".to_string(),
            id: id.to_string(),
        })
    }
}

#[async_trait]
impl TaskAssignmentRepository for TaskRepositoryImpl {
    async fn insert_if_absent(&self, assignment: &TaskAssignment) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        // 唯一冲突是预期的幂等信号，用 DO NOTHING 而非吞驱动错误码
        let affected = conn.execute(
            r#"
            INSERT INTO task_assignment (
                id, employee_id, task_template_id, type, due_date, status,
                owner_role, notes, completed_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (employee_id, task_template_id) DO NOTHING
            "#,
            params![
                assignment.id,
                assignment.employee_id,
                assignment.task_template_id,
                assignment.lifecycle.to_db_str(),
                assignment.due_date,
                assignment.status.to_db_str(),
                assignment.owner_role,
                assignment.notes,
                assignment.completed_at,
                assignment.created_at,
                assignment.updated_at,
            ],
        )?;

        Ok(affected > 0)
    }

    async fn upsert_reset(&self, assignment: &TaskAssignment) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO task_assignment (
                id, employee_id, task_template_id, type, due_date, status,
                owner_role, notes, completed_at, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (employee_id, task_template_id) DO UPDATE SET
                type = excluded.type,
                due_date = excluded.due_date,
                owner_role = excluded.owner_role,
                status = 'OPEN',
                completed_at = NULL,
                updated_at = excluded.updated_at
            "#,
            params![
                assignment.id,
                assignment.employee_id,
                assignment.task_template_id,
                assignment.lifecycle.to_db_str(),
                assignment.due_date,
                assignment.status.to_db_str(),
                assignment.owner_role,
                assignment.notes,
                assignment.completed_at,
                assignment.created_at,
                assignment.updated_at,
            ],
        )?;

        Ok(())
    }

    async fn find_by_pair(
        &self,
        employee_id: &str,
        task_template_id: &str,
    ) -> RepositoryResult<Option<TaskAssignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM task_assignment WHERE employee_id = ?1 AND task_template_id = ?2",
            ASSIGNMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let result = stmt.query_row(params![employee_id, task_template_id], Self::map_assignment_row);

        match result {
            Ok(assignment) => Ok(Some(assignment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, filter: &TaskFilter) -> RepositoryResult<Vec<TaskAssignment>> {
        let mut wheres: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(lifecycle) = filter.lifecycle {
            wheres.push(format!("type = ?{}", values.len() + 1));
            values.push(Box::new(lifecycle.to_db_str().to_string()));
        }
        if let Some(status) = filter.status {
            wheres.push(format!("status = ?{}", values.len() + 1));
            values.push(Box::new(status.to_db_str().to_string()));
        }
        if let Some(employee_id) = &filter.employee_id {
            wheres.push(format!("employee_id = ?{}", values.len() + 1));
            values.push(Box::new(employee_id.clone()));
        }

        let where_clause = if wheres.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", wheres.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM task_assignment {} ORDER BY due_date",
            ASSIGNMENT_COLUMNS, where_clause
        );

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let params_vec: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();

        let assignments = stmt
            .query_map(params_vec.as_slice(), Self::map_assignment_row)?
            .collect::<SqliteResult<Vec<TaskAssignment>>>()?;

        Ok(assignments)
    }

    async fn list_due_open(
        &self,
        cutoff: chrono::NaiveDate,
    ) -> RepositoryResult<Vec<TaskAssignment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM task_assignment WHERE status = 'OPEN' AND due_date <= ?1 ORDER BY due_date",
            ASSIGNMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let assignments = stmt
            .query_map(params![cutoff], Self::map_assignment_row)?
            .collect::<SqliteResult<Vec<TaskAssignment>>>()?;

        Ok(assignments)
    }

    async fn update_status(
        &self,
        id: &str,
        status: TaskStatus,
        notes: Option<Option<String>>,
    ) -> RepositoryResult<TaskAssignment> {
        {
            let now = Utc::now();
            // DONE 落 completed_at，其余状态清空
            let completed_at = match status {
                TaskStatus::Done => Some(now),
                _ => None,
            };

            let conn = self.get_conn()?;
            let affected = if let Some(notes) = &notes {
                conn.execute(
                    "UPDATE task_assignment SET status = ?1, completed_at = ?2, notes = ?3, updated_at = ?4 WHERE id = ?5",
                    params![status.to_db_str(), completed_at, notes, now, id],
                )?
            } else {
                conn.execute(
                    "UPDATE task_assignment SET status = ?1, completed_at = ?2, updated_at = ?3 WHERE id = ?4",
                    params![status.to_db_str(), completed_at, now, id],
                )?
            };

            if affected == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "TaskAssignment".to_string(),
                    id: id.to_string(),
                });
            }
        }

        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM task_assignment WHERE id = ?1", ASSIGNMENT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let assignment = stmt.query_row(params![id], Self::map_assignment_row)?;

        Ok(assignment)
    }
}
