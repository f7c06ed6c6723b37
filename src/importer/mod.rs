// ==========================================
// 员工主数据生命周期系统 - 文件导入层
// ==========================================
// 职责: 名册文件解析与日期/布尔归一化
// 红线: 导入层不触碰数据库，只产出 RosterRow
// ==========================================

pub mod date_normalizer;
pub mod error;
pub mod roster_parser;

pub use date_normalizer::{parse_bool_flexible, parse_date_flexible, serial_to_date};
pub use error::{ImportError, ImportResult};
pub use roster_parser::{strip_diacritics, RosterParser};
