// ==========================================
// 员工主数据生命周期系统 - 日期归一化
// ==========================================
// 职责: 解析异构日期表示（表格序列号/点分/斜杠/ISO）
// 红线: 只返回 Option，绝不 panic；None 由调用方计入行丢弃
// ==========================================

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

/// 表格序列号纪元: 1899-12-30
///
/// 该纪元补偿了表格格式中不存在的 1900-02-29（1900 年闰年 bug），
/// 使 1900-03-01 之后的序列号换算正确
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// 序列号接受区间（开区间），区间外视为普通数字而非日期
const SERIAL_MIN: f64 = 1.0;
const SERIAL_MAX: f64 = 100_000.0;

/// 表格数字序列号 → 日期
///
/// 小数部分（时刻）被截断，只保留日期
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(serial > SERIAL_MIN && serial < SERIAL_MAX) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(SERIAL_EPOCH.0, SERIAL_EPOCH.1, SERIAL_EPOCH.2)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// 两位年份折叠: 00–49 → 2000 年代, 50–99 → 1900 年代
fn expand_two_digit_year(yy: i32) -> i32 {
    if yy < 50 {
        2000 + yy
    } else {
        1900 + yy
    }
}

/// 字符串是否形如纯数字（允许一个小数部分）
fn looks_like_serial(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let int_part = parts.next().unwrap_or("");
    let frac_part = parts.next();

    if int_part.is_empty() || !int_part.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    match frac_part {
        None => true,
        Some(frac) => !frac.is_empty() && frac.chars().all(|c| c.is_ascii_digit()),
    }
}

/// 点分 d.m.yy / d.m.yyyy（德式）
fn parse_dotted(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('.').collect();
    if parts.len() != 3 {
        return None;
    }
    let (dd_raw, mm_raw, yy_raw) = (parts[0], parts[1], parts[2]);
    if dd_raw.is_empty() || dd_raw.len() > 2 || mm_raw.is_empty() || mm_raw.len() > 2 {
        return None;
    }
    if yy_raw.len() != 2 && yy_raw.len() != 4 {
        return None;
    }
    let dd: u32 = dd_raw.parse().ok()?;
    let mm: u32 = mm_raw.parse().ok()?;
    let mut year: i32 = yy_raw.parse().ok()?;
    if yy_raw.len() == 2 {
        year = expand_two_digit_year(year);
    }
    NaiveDate::from_ymd_opt(year, mm, dd)
}

/// 斜杠 d/m/y，歧义时按日在前（欧式）解释
fn parse_slashed(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let (p1, p2, p3) = (parts[0], parts[1], parts[2]);
    if p1.is_empty() || p1.len() > 2 || p2.is_empty() || p2.len() > 2 {
        return None;
    }
    if p3.len() < 2 || p3.len() > 4 {
        return None;
    }
    let dd: u32 = p1.parse().ok()?;
    let mm: u32 = p2.parse().ok()?;
    let mut year: i32 = p3.parse().ok()?;
    if p3.len() == 2 {
        year = expand_two_digit_year(year);
    }
    NaiveDate::from_ymd_opt(year, mm, dd)
}

/// ISO-8601 兜底（日期或日期时间前缀）
fn parse_iso(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    None
}

/// 灵活日期解析（主入口）
///
/// # 识别顺序
/// 1. 纯数字 → 表格序列号（纪元 1899-12-30）
/// 2. 点分 d.m.yy / d.m.yyyy，两位年份按 00–49/50–99 折叠
/// 3. 斜杠 d/m/y，日在前
/// 4. ISO-8601
///
/// # 返回
/// - None: 无法解析（调用方视为"行数据不足"），从不抛错
pub fn parse_date_flexible(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if looks_like_serial(s) {
        if let Ok(serial) = s.parse::<f64>() {
            if let Some(date) = serial_to_date(serial) {
                return Some(date);
            }
        }
    }

    parse_dotted(s)
        .or_else(|| parse_slashed(s))
        .or_else(|| parse_iso(s))
}

/// 灵活布尔解析（锁标志列）
///
/// 真值: true / wahr / 1 / ja / yes（大小写不敏感）
pub fn parse_bool_flexible(raw: &str) -> bool {
    matches!(
        raw.trim().to_lowercase().as_str(),
        "true" | "wahr" | "1" | "ja" | "yes"
    )
}
