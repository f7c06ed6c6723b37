// ==========================================
// 员工主数据生命周期系统 - 设置API
// ==========================================
// 职责: 全局设置读取与覆写（config_kv 表, scope='global'）
// ==========================================

use crate::api::error::{internal, ApiError, ApiResult};
use crate::config::{
    parse_jubilee_years, ConfigManager, DEFAULT_BIRTHDAY_TEMPLATE, DEFAULT_EMAIL_DOMAIN,
    DEFAULT_JUBILEE_TEMPLATE, DEFAULT_JUBILEE_YEARS_CSV, KEY_BIRTHDAY_TEMPLATE, KEY_EMAIL_DOMAIN,
    KEY_JUBILEE_TEMPLATE, KEY_JUBILEE_YEARS_CSV, KEY_MANAGER_EMAILS,
};
use serde::{Deserialize, Serialize};

/// 设置响应（原始存储值，未解析）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub jubilee_years_csv: String,
    pub email_domain: String,
    pub manager_emails: String,
    pub birthday_email_template: String,
    pub jubilee_email_template: String,
}

/// 设置更新输入（缺省字段不改动）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsPatch {
    pub jubilee_years_csv: Option<String>,
    pub email_domain: Option<String>,
    pub manager_emails: Option<String>,
    pub birthday_email_template: Option<String>,
    pub jubilee_email_template: Option<String>,
}

/// 设置API
pub struct ConfigApi {
    db_path: String,
}

impl ConfigApi {
    /// 创建新的ConfigApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// 读取全局设置（缺失键返回默认值）
    pub async fn get_settings(&self) -> ApiResult<SettingsResponse> {
        let config = ConfigManager::new(&self.db_path).map_err(internal)?;

        let get = |key: &str, default: &str| -> ApiResult<String> {
            Ok(config
                .get_global_config_value(key)
                .map_err(internal)?
                .unwrap_or_else(|| default.to_string()))
        };

        Ok(SettingsResponse {
            jubilee_years_csv: get(KEY_JUBILEE_YEARS_CSV, DEFAULT_JUBILEE_YEARS_CSV)?,
            email_domain: get(KEY_EMAIL_DOMAIN, DEFAULT_EMAIL_DOMAIN)?,
            manager_emails: get(KEY_MANAGER_EMAILS, "")?,
            birthday_email_template: get(KEY_BIRTHDAY_TEMPLATE, DEFAULT_BIRTHDAY_TEMPLATE)?,
            jubilee_email_template: get(KEY_JUBILEE_TEMPLATE, DEFAULT_JUBILEE_TEMPLATE)?,
        })
    }

    /// 覆写全局设置（只写入提供的字段）
    pub async fn update_settings(&self, patch: &SettingsPatch) -> ApiResult<SettingsResponse> {
        if let Some(csv) = &patch.jubilee_years_csv {
            if parse_jubilee_years(csv).is_empty() {
                return Err(ApiError::ValidationError(
                    "里程碑年数列表不含任何合法正整数".to_string(),
                ));
            }
        }
        if let Some(domain) = &patch.email_domain {
            if domain.trim().is_empty() || domain.contains('@') {
                return Err(ApiError::ValidationError(format!(
                    "非法邮箱域名: {}",
                    domain
                )));
            }
        }

        let config = ConfigManager::new(&self.db_path).map_err(internal)?;
        let write = |key: &str, value: &Option<String>| -> ApiResult<()> {
            if let Some(v) = value {
                config.set_global_config_value(key, v).map_err(internal)?;
            }
            Ok(())
        };

        write(KEY_JUBILEE_YEARS_CSV, &patch.jubilee_years_csv)?;
        write(KEY_EMAIL_DOMAIN, &patch.email_domain)?;
        write(KEY_MANAGER_EMAILS, &patch.manager_emails)?;
        write(KEY_BIRTHDAY_TEMPLATE, &patch.birthday_email_template)?;
        write(KEY_JUBILEE_TEMPLATE, &patch.jubilee_email_template)?;

        self.get_settings().await
    }
}
