// ==========================================
// 员工主数据生命周期系统 - 周年查询API
// ==========================================
// 职责: 封装服务周年/生日查询与日历事件导出
// ==========================================

use crate::api::error::{internal, ApiError, ApiResult};
use crate::config::{ConfigManager, HrConfigReader};
use crate::domain::event::{CalendarEvent, JubileeHit};
use crate::domain::types::CalendarEventKind;
use crate::engine::{calendar_events, jubilees_on_day, upcoming_jubilees, years_of_service};
use crate::repository::{EmployeeRepository, EmployeeRepositoryImpl};
use chrono::NaiveDate;

/// 未来周年查询窗口上限（天）
const MAX_UPCOMING_WINDOW_DAYS: i64 = 365;

/// 周年查询API
pub struct AnniversaryApi {
    db_path: String,
}

impl AnniversaryApi {
    /// 创建新的AnniversaryApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 当日恰好命中里程碑的服务周年
    pub async fn jubilees_on(&self, day: NaiveDate) -> ApiResult<Vec<JubileeHit>> {
        let config = ConfigManager::new(&self.db_path).map_err(internal)?;
        let milestone_years = config.get_jubilee_years().await.map_err(internal)?;

        let repo = EmployeeRepositoryImpl::new(&self.db_path)?;
        let employees = repo.list_all().await?;
        Ok(jubilees_on_day(&employees, day, &milestone_years))
    }

    /// 未来 within_days 天内的里程碑周年（含今日，按日期升序）
    pub async fn upcoming(
        &self,
        today: NaiveDate,
        within_days: i64,
    ) -> ApiResult<Vec<JubileeHit>> {
        if !(1..=MAX_UPCOMING_WINDOW_DAYS).contains(&within_days) {
            return Err(ApiError::InvalidInput(format!(
                "查询窗口必须在 1..={} 天范围内",
                MAX_UPCOMING_WINDOW_DAYS
            )));
        }

        let config = ConfigManager::new(&self.db_path).map_err(internal)?;
        let milestone_years = config.get_jubilee_years().await.map_err(internal)?;

        let repo = EmployeeRepositoryImpl::new(&self.db_path)?;
        let employees = repo.list_all().await?;
        Ok(upcoming_jubilees(
            &employees,
            today,
            within_days,
            &milestone_years,
        ))
    }

    /// 员工服务年数
    pub async fn service_years(&self, employee_id: &str, today: NaiveDate) -> ApiResult<i32> {
        let repo = EmployeeRepositoryImpl::new(&self.db_path)?;
        let employee = repo
            .find_by_id(employee_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("员工(id={})不存在", employee_id)))?;
        Ok(years_of_service(&employee, today))
    }

    /// 日历事件导出（仪表盘）
    ///
    /// # 参数
    /// - kind: 事件类型字符串（birthday/jubilee/hire，复数兼容）
    /// - year: 目标年份
    /// - month: 可选月份过滤（0 起）
    /// - quarter: 可选季度过滤（0 起）
    pub async fn calendar(
        &self,
        kind: &str,
        year: i32,
        month: Option<u32>,
        quarter: Option<u32>,
    ) -> ApiResult<Vec<CalendarEvent>> {
        let kind = CalendarEventKind::from_str(kind)
            .ok_or_else(|| ApiError::InvalidInput(format!("非法事件类型: {}", kind)))?;
        if let Some(m) = month {
            if m > 11 {
                return Err(ApiError::InvalidInput("月份必须在 0..=11 范围内".to_string()));
            }
        }
        if let Some(q) = quarter {
            if q > 3 {
                return Err(ApiError::InvalidInput("季度必须在 0..=3 范围内".to_string()));
            }
        }

        let config = ConfigManager::new(&self.db_path).map_err(internal)?;
        let milestone_years = config.get_jubilee_years().await.map_err(internal)?;

        let repo = EmployeeRepositoryImpl::new(&self.db_path)?;
        let employees = repo.list_all().await?;
        Ok(calendar_events(
            &employees,
            kind,
            year,
            month,
            quarter,
            &milestone_years,
        ))
    }
}
