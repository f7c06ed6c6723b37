// ==========================================
// 员工主数据生命周期系统 - 名册导入API
// ==========================================
// 职责: 封装"解析 → 对账 → 离职检测 → 审计落库"全流程
// 前提: 上传的名册是全量名册
// ==========================================

use crate::api::error::{internal, ApiError, ApiResult};
use crate::config::{ConfigManager, HrConfigReader};
use crate::domain::employee::ImportRunLog;
use crate::engine::{ExitDetector, RosterReconciler};
use crate::importer::RosterParser;
use crate::repository::{EmployeeRepositoryImpl, ImportRunLogRepository};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 名册导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterImportResponse {
    /// 本次导入运行ID（审计记录主键）
    pub run_id: String,
    /// 新建员工数
    pub created: i64,
    /// 更新员工数
    pub updated: i64,
    /// 锁定/无变化跳过数
    pub skipped_locked: i64,
    /// 判定离职数
    pub exited: i64,
    /// 锁定而免于离职判定数
    pub skipped_exit_locked: i64,
    /// 复活数（EXITED 重新出现）
    pub reactivated: i64,
    /// 自然键不完整丢弃数
    pub skipped_no_data: i64,
    /// 名册数据行总数
    pub total_rows: i64,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

/// 名册导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 导入全量名册（主入口）
    ///
    /// # 参数
    /// - file_path: 名册文件路径（.xlsx/.xls/.csv）
    ///
    /// # 流程
    /// 1. 读取上传限制并解析文件
    /// 2. 对账（创建/更新/复活/跳过）
    /// 3. 离职检测（未触达的 ACTIVE → EXITED）
    /// 4. 追加导入审计记录
    pub async fn import_roster(&self, file_path: &str) -> ApiResult<RosterImportResponse> {
        let start_time = std::time::Instant::now();

        let config = Arc::new(ConfigManager::new(&self.db_path).map_err(internal)?);
        let max_bytes = config.get_max_upload_bytes().await.map_err(internal)?;
        let max_rows = config.get_max_upload_rows().await.map_err(internal)?;

        // === 步骤 1: 解析名册文件 ===
        let parser = RosterParser::new(max_bytes, max_rows);
        let rows = parser.parse_file(file_path)?;

        let repo = Arc::new(EmployeeRepositoryImpl::new(&self.db_path)?);
        let run_date = Utc::now().date_naive();

        // === 步骤 2: 对账 ===
        let reconciler = RosterReconciler::new(repo.clone(), config.clone());
        let mut outcome = reconciler
            .reconcile(&rows, run_date)
            .await
            .map_err(internal)?;

        // === 步骤 3: 离职检测 ===
        let detector = ExitDetector::new(repo.clone());
        detector
            .detect(&outcome.touched, run_date, &mut outcome.summary)
            .await
            .map_err(internal)?;

        // === 步骤 4: 追加审计记录 ===
        let run_id = Uuid::new_v4().to_string();
        let log = ImportRunLog::from_summary(run_id.clone(), &outcome.summary, Utc::now());
        let run_log_repo = ImportRunLogRepository::new(&self.db_path)?;
        run_log_repo.append(&log)?;

        let elapsed_ms = start_time.elapsed().as_millis() as i64;
        info!(run_id = %run_id, elapsed_ms, "名册导入完成");

        let s = outcome.summary;
        Ok(RosterImportResponse {
            run_id,
            created: s.created,
            updated: s.updated,
            skipped_locked: s.skipped_locked,
            exited: s.exited,
            skipped_exit_locked: s.skipped_exit_locked,
            reactivated: s.reactivated,
            skipped_no_data: s.skipped_no_data,
            total_rows: s.total_rows,
            elapsed_ms,
        })
    }

    /// 最近 N 次导入审计记录（倒序）
    pub async fn recent_runs(&self, limit: usize) -> ApiResult<Vec<ImportRunLog>> {
        if limit == 0 || limit > 1000 {
            return Err(ApiError::InvalidInput(
                "limit 必须在 1..=1000 范围内".to_string(),
            ));
        }
        let run_log_repo = ImportRunLogRepository::new(&self.db_path)?;
        Ok(run_log_repo.recent(limit)?)
    }
}
