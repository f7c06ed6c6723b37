// ==========================================
// 员工主数据生命周期系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::hr_config_trait::HrConfigReader;
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键与默认值
// ==========================================

pub const KEY_JUBILEE_YEARS_CSV: &str = "jubilee_years_csv";
pub const KEY_EMAIL_DOMAIN: &str = "email_domain";
pub const KEY_MANAGER_EMAILS: &str = "manager_emails";
pub const KEY_BIRTHDAY_TEMPLATE: &str = "birthday_email_template";
pub const KEY_JUBILEE_TEMPLATE: &str = "jubilee_email_template";
pub const KEY_IMPORT_BATCH_SIZE: &str = "import_batch_size";
pub const KEY_MAX_UPLOAD_ROWS: &str = "max_upload_rows";
pub const KEY_MAX_UPLOAD_BYTES: &str = "max_upload_bytes";

pub const DEFAULT_JUBILEE_YEARS_CSV: &str = "5,10,15,20,25,30,35,40";
pub const DEFAULT_EMAIL_DOMAIN: &str = "realcore.de";
pub const DEFAULT_BIRTHDAY_TEMPLATE: &str = "Happy Birthday, {{firstName}}!";
pub const DEFAULT_JUBILEE_TEMPLATE: &str = "Congrats on {{years}} years, {{firstName}}!";
pub const DEFAULT_IMPORT_BATCH_SIZE: usize = 300;
pub const DEFAULT_MAX_UPLOAD_ROWS: usize = 5_000;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 8 * 1024 * 1024;

/// 解析里程碑年数 CSV: 去空白、丢弃非正/非数字项、升序
pub fn parse_jubilee_years(csv: &str) -> Vec<i32> {
    let mut years: Vec<i32> = csv
        .split(',')
        .filter_map(|s| s.trim().parse::<i32>().ok())
        .filter(|n| *n > 0)
        .collect();
    years.sort_unstable();
    years.dedup();
    years
}

/// 解析逗号分隔的收件人列表
pub fn parse_email_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入（覆写）global scope 配置值
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, ?3)
            ON CONFLICT (scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }

    /// 读取字符串配置（缺失时落默认值）
    fn get_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }
}

#[async_trait]
impl HrConfigReader for ConfigManager {
    async fn get_jubilee_years(&self) -> Result<Vec<i32>, Box<dyn Error>> {
        let csv = self.get_or_default(KEY_JUBILEE_YEARS_CSV, DEFAULT_JUBILEE_YEARS_CSV)?;
        let years = parse_jubilee_years(&csv);
        // 全部非法时退回默认里程碑，避免周年检测静默失效
        if years.is_empty() {
            return Ok(parse_jubilee_years(DEFAULT_JUBILEE_YEARS_CSV));
        }
        Ok(years)
    }

    async fn get_email_domain(&self) -> Result<String, Box<dyn Error>> {
        self.get_or_default(KEY_EMAIL_DOMAIN, DEFAULT_EMAIL_DOMAIN)
    }

    async fn get_manager_emails(&self) -> Result<Vec<String>, Box<dyn Error>> {
        let csv = self.get_or_default(KEY_MANAGER_EMAILS, "")?;
        Ok(parse_email_list(&csv))
    }

    async fn get_birthday_email_template(&self) -> Result<String, Box<dyn Error>> {
        self.get_or_default(KEY_BIRTHDAY_TEMPLATE, DEFAULT_BIRTHDAY_TEMPLATE)
    }

    async fn get_jubilee_email_template(&self) -> Result<String, Box<dyn Error>> {
        self.get_or_default(KEY_JUBILEE_TEMPLATE, DEFAULT_JUBILEE_TEMPLATE)
    }

    async fn get_import_batch_size(&self) -> Result<usize, Box<dyn Error>> {
        let raw = self.get_config_value(KEY_IMPORT_BATCH_SIZE)?;
        Ok(raw
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_IMPORT_BATCH_SIZE))
    }

    async fn get_max_upload_rows(&self) -> Result<usize, Box<dyn Error>> {
        let raw = self.get_config_value(KEY_MAX_UPLOAD_ROWS)?;
        Ok(raw
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_UPLOAD_ROWS))
    }

    async fn get_max_upload_bytes(&self) -> Result<u64, Box<dyn Error>> {
        let raw = self.get_config_value(KEY_MAX_UPLOAD_BYTES)?;
        Ok(raw
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES))
    }
}
