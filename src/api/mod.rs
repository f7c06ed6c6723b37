// ==========================================
// 员工主数据生命周期系统 - API层
// ==========================================
// 职责: 面向调用方的门面，组装仓储/引擎并做参数校验
// 红线: API层不含业务规则，只做编排与错误转换
// ==========================================

pub mod anniversary_api;
pub mod config_api;
pub mod error;
pub mod import_api;
pub mod lifecycle_api;
pub mod schedule_api;

pub use anniversary_api::AnniversaryApi;
pub use config_api::{ConfigApi, SettingsPatch, SettingsResponse};
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, RosterImportResponse};
pub use lifecycle_api::LifecycleApi;
pub use schedule_api::ScheduleApi;
