// ==========================================
// 员工主数据生命周期系统 - 配置层
// ==========================================
// 职责: 系统配置的加载与查询
// ==========================================

pub mod config_manager;
pub mod hr_config_trait;

pub use config_manager::{
    parse_email_list, parse_jubilee_years, ConfigManager, DEFAULT_BIRTHDAY_TEMPLATE,
    DEFAULT_EMAIL_DOMAIN, DEFAULT_IMPORT_BATCH_SIZE, DEFAULT_JUBILEE_TEMPLATE,
    DEFAULT_JUBILEE_YEARS_CSV, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_ROWS,
    KEY_BIRTHDAY_TEMPLATE, KEY_EMAIL_DOMAIN, KEY_IMPORT_BATCH_SIZE, KEY_JUBILEE_TEMPLATE,
    KEY_JUBILEE_YEARS_CSV, KEY_MANAGER_EMAILS, KEY_MAX_UPLOAD_BYTES, KEY_MAX_UPLOAD_ROWS,
};
pub use hr_config_trait::HrConfigReader;
