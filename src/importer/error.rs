// ==========================================
// 员工主数据生命周期系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 上传限制错误（校验失败，不重试） =====
    #[error("文件过大: {actual_bytes} 字节（上限 {max_bytes} 字节），请拆分文件")]
    FileTooLarge { actual_bytes: u64, max_bytes: u64 },

    #[error("数据行过多: {actual_rows} 行（上限 {max_rows} 行），请拆分文件")]
    TooManyRows { actual_rows: usize, max_rows: usize },

    #[error("表格无数据行")]
    EmptySheet,

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

impl ImportError {
    /// 是否属于上传校验类错误（参数问题，调用方不应重试）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ImportError::FileTooLarge { .. }
                | ImportError::TooManyRows { .. }
                | ImportError::EmptySheet
                | ImportError::UnsupportedFormat(_)
        )
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
