// ==========================================
// 员工主数据生命周期系统 - 配置读取接口
// ==========================================
// 职责: 为对账/周年/调度引擎提供配置读取抽象
// 说明: 全局单例设置在本系统中显式传入，不做环境全局状态
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// HR 配置读取器
///
/// 引擎只依赖该 trait，便于测试注入固定配置
#[async_trait]
pub trait HrConfigReader: Send + Sync {
    /// 服务周年里程碑年数（已解析、升序、去除非正项）
    async fn get_jubilee_years(&self) -> Result<Vec<i32>, Box<dyn Error>>;

    /// 自动生成邮箱使用的固定域名
    async fn get_email_domain(&self) -> Result<String, Box<dyn Error>>;

    /// 管理者通知收件人列表
    async fn get_manager_emails(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 生日祝福邮件模板（{{firstName}} / {{lastName}} 占位符）
    async fn get_birthday_email_template(&self) -> Result<String, Box<dyn Error>>;

    /// 周年祝贺邮件模板（{{years}} / {{firstName}} 占位符）
    async fn get_jubilee_email_template(&self) -> Result<String, Box<dyn Error>>;

    /// 对账批次大小（仅限制峰值内存，无事务含义）
    async fn get_import_batch_size(&self) -> Result<usize, Box<dyn Error>>;

    /// 单次上传最大数据行数
    async fn get_max_upload_rows(&self) -> Result<usize, Box<dyn Error>>;

    /// 单次上传最大字节数
    async fn get_max_upload_bytes(&self) -> Result<u64, Box<dyn Error>>;
}
