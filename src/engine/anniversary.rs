// ==========================================
// 员工主数据生命周期系统 - 周年计算引擎
// ==========================================
// 职责: 服务周年/生日命中计算 + 日历事件导出
// 红线: 纯函数，不触碰数据库，输入输出全部显式
// 闰日口径: 2 月 29 日在平年折算为 3 月 1 日
// ==========================================

use crate::domain::employee::Employee;
use crate::domain::event::{CalendarEvent, JubileeHit};
use crate::domain::types::{CalendarEventKind, EmployeeStatus};
use chrono::{Datelike, NaiveDate};

/// 两个日期之间的完整年数
///
/// 尚未到达当年纪念日时减一，结果可为负（to 早于 from）
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i32 {
    let mut years = to.year() - from.year();
    if (to.month(), to.day()) < (from.month(), from.day()) {
        years -= 1;
    }
    years
}

/// 将周年日落到指定年份（闰日 2-29 在平年折算为 3-1）
pub fn anniversary_in_year(base: NaiveDate, year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, base.month(), base.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(base)
}

/// 员工当日是否为生日（闰日口径同上）
pub fn is_birthday(employee: &Employee, day: NaiveDate) -> bool {
    anniversary_in_year(employee.birth_date, day.year()) == day
}

/// 当日生日的在职员工
pub fn birthdays_on_day(employees: &[Employee], day: NaiveDate) -> Vec<Employee> {
    employees
        .iter()
        .filter(|e| e.status == EmployeeStatus::Active && is_birthday(e, day))
        .cloned()
        .collect()
}

/// 当日恰好命中里程碑年数的服务周年
///
/// 命中条件: 当日正是 start_date 的周年日，且服务年数恰好等于
/// 某个配置的里程碑（错过的里程碑不追补）
pub fn jubilees_on_day(
    employees: &[Employee],
    day: NaiveDate,
    milestone_years: &[i32],
) -> Vec<JubileeHit> {
    let mut hits = Vec::new();
    for employee in employees {
        if employee.status != EmployeeStatus::Active {
            continue;
        }
        if anniversary_in_year(employee.start_date, day.year()) != day {
            continue;
        }
        let years = years_between(employee.start_date, day);
        if years > 0 && milestone_years.contains(&years) {
            hits.push(JubileeHit {
                employee: employee.clone(),
                years,
                anniversary_date: day,
            });
        }
    }
    hits
}

/// 未来 within_days 天内（含今日）的里程碑周年，按日期升序
pub fn upcoming_jubilees(
    employees: &[Employee],
    today: NaiveDate,
    within_days: i64,
    milestone_years: &[i32],
) -> Vec<JubileeHit> {
    let cutoff = today + chrono::Duration::days(within_days);
    let mut hits = Vec::new();

    for employee in employees {
        if employee.status != EmployeeStatus::Active {
            continue;
        }
        // 窗口至多跨一个年界，检查今年与明年的周年日即可
        for year in [today.year(), today.year() + 1] {
            let anniversary = anniversary_in_year(employee.start_date, year);
            if anniversary < today || anniversary > cutoff {
                continue;
            }
            let years = year - employee.start_date.year();
            if years > 0 && milestone_years.contains(&years) {
                hits.push(JubileeHit {
                    employee: employee.clone(),
                    years,
                    anniversary_date: anniversary,
                });
            }
        }
    }

    hits.sort_by_key(|h| h.anniversary_date);
    hits
}

/// 服务年数（尚未满一年返回 0，入职在未来返回负数交由调用方处理）
pub fn years_of_service(employee: &Employee, today: NaiveDate) -> i32 {
    years_between(employee.start_date, today)
}

/// 日历事件导出（仪表盘）
///
/// # 参数
/// - kind: 事件类型（生日/周年/入职）
/// - year: 目标年份
/// - month: 可选月份过滤（0 起，0 = 一月）
/// - quarter: 可选季度过滤（0 起，0 = Q1）
///
/// # 说明
/// 生日/周年按目标年份折算事件日期；入职事件只含当年实际入职。
/// 周年事件限配置的里程碑年数。
pub fn calendar_events(
    employees: &[Employee],
    kind: CalendarEventKind,
    year: i32,
    month: Option<u32>,
    quarter: Option<u32>,
    milestone_years: &[i32],
) -> Vec<CalendarEvent> {
    let mut events = Vec::new();

    for employee in employees {
        if employee.status != EmployeeStatus::Active {
            continue;
        }
        match kind {
            CalendarEventKind::Birthday => {
                events.push(make_event(
                    employee,
                    anniversary_in_year(employee.birth_date, year),
                    kind,
                ));
            }
            CalendarEventKind::Jubilee => {
                let years = year - employee.start_date.year();
                if years > 0 && milestone_years.contains(&years) {
                    events.push(make_event(
                        employee,
                        anniversary_in_year(employee.start_date, year),
                        kind,
                    ));
                }
            }
            CalendarEventKind::Hire => {
                if employee.start_date.year() == year {
                    events.push(make_event(employee, employee.start_date, kind));
                }
            }
        }
    }

    events.retain(|e| {
        let m = e.date.month0();
        match (month, quarter) {
            (Some(want), _) => m == want,
            (None, Some(q)) => m / 3 == q,
            (None, None) => true,
        }
    });
    events.sort_by_key(|e| e.date);
    events
}

fn make_event(employee: &Employee, date: NaiveDate, kind: CalendarEventKind) -> CalendarEvent {
    CalendarEvent {
        first_name: employee.first_name.clone(),
        last_name: employee.last_name.clone(),
        email: employee.email.clone().unwrap_or_default(),
        date,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::employee::LockFlags;
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn employee(start: NaiveDate, birth: NaiveDate) -> Employee {
        let now = Utc::now();
        Employee {
            id: "emp-1".to_string(),
            first_name: "Anna".to_string(),
            last_name: "Schmidt".to_string(),
            email: Some("anna.schmidt@realcore.de".to_string()),
            start_date: start,
            birth_date: birth,
            status: EmployeeStatus::Active,
            exit_date: None,
            locks: LockFlags::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_years_between() {
        assert_eq!(years_between(d(2015, 3, 10), d(2025, 3, 10)), 10);
        assert_eq!(years_between(d(2015, 3, 10), d(2025, 3, 9)), 9);
        assert_eq!(years_between(d(2015, 3, 10), d(2025, 3, 11)), 10);
        assert_eq!(years_between(d(2015, 3, 10), d(2014, 1, 1)), -2);
    }

    #[test]
    fn test_jubilee_exact_year_match() {
        let emp = employee(d(2015, 3, 10), d(1990, 1, 1));
        let milestones = [5, 10];

        // 恰好十周年当日命中
        let hits = jubilees_on_day(&[emp.clone()], d(2025, 3, 10), &milestones);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].years, 10);

        // 九周年不是里程碑
        assert!(jubilees_on_day(&[emp.clone()], d(2024, 3, 10), &milestones).is_empty());
        // 非周年日不命中
        assert!(jubilees_on_day(&[emp.clone()], d(2025, 3, 11), &milestones).is_empty());

        // 离职员工不命中
        let mut exited = emp;
        exited.status = EmployeeStatus::Exited;
        assert!(jubilees_on_day(&[exited], d(2025, 3, 10), &milestones).is_empty());
    }

    #[test]
    fn test_leap_day_anniversary() {
        // 闰日入职，平年周年落到 3 月 1 日
        let emp = employee(d(2020, 2, 29), d(1990, 1, 1));
        let hits = jubilees_on_day(&[emp.clone()], d(2025, 3, 1), &[5]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].years, 5);

        // 闰年保留 2 月 29 日
        assert!(jubilees_on_day(&[emp.clone()], d(2028, 2, 29), &[8]).len() == 1);
        assert!(jubilees_on_day(&[emp], d(2028, 3, 1), &[8]).is_empty());
    }

    #[test]
    fn test_upcoming_jubilees_window_and_order() {
        let e1 = employee(d(2015, 6, 20), d(1990, 1, 1));
        let mut e2 = employee(d(2020, 6, 10), d(1991, 1, 1));
        e2.id = "emp-2".to_string();
        let milestones = [5, 10];

        let hits = upcoming_jubilees(&[e1, e2], d(2025, 6, 1), 30, &milestones);
        assert_eq!(hits.len(), 2);
        // 按周年日期升序
        assert_eq!(hits[0].anniversary_date, d(2025, 6, 10));
        assert_eq!(hits[0].years, 5);
        assert_eq!(hits[1].anniversary_date, d(2025, 6, 20));
        assert_eq!(hits[1].years, 10);

        // 窗口外不命中
        assert!(upcoming_jubilees(
            &[employee(d(2015, 8, 1), d(1990, 1, 1))],
            d(2025, 6, 1),
            30,
            &milestones
        )
        .is_empty());
    }

    #[test]
    fn test_upcoming_jubilees_crosses_year_boundary() {
        let emp = employee(d(2021, 1, 5), d(1990, 1, 1));
        let hits = upcoming_jubilees(&[emp], d(2025, 12, 20), 30, &[5]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].anniversary_date, d(2026, 1, 5));
    }

    #[test]
    fn test_birthdays_on_day() {
        let emp = employee(d(2020, 1, 1), d(1995, 12, 24));
        assert!(is_birthday(&emp, d(2025, 12, 24)));
        assert!(!is_birthday(&emp, d(2025, 12, 23)));
        assert_eq!(birthdays_on_day(&[emp], d(2025, 12, 24)).len(), 1);
    }

    #[test]
    fn test_calendar_events_month_filter() {
        let e1 = employee(d(2024, 5, 2), d(1990, 3, 15));
        let mut e2 = employee(d(2024, 9, 1), d(1991, 3, 20));
        e2.id = "emp-2".to_string();

        // month 0 起: 2 = 三月
        let events = calendar_events(
            &[e1.clone(), e2.clone()],
            CalendarEventKind::Birthday,
            2025,
            Some(2),
            None,
            &[],
        );
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].date, d(2025, 3, 15));

        // 入职事件只含当年入职
        let hires = calendar_events(&[e1, e2], CalendarEventKind::Hire, 2024, None, Some(1), &[]);
        assert_eq!(hires.len(), 1);
        assert_eq!(hires[0].date, d(2024, 5, 2));
    }

    #[test]
    fn test_calendar_events_jubilee_milestones_only() {
        let emp = employee(d(2020, 4, 1), d(1990, 1, 1));
        let events = calendar_events(&[emp.clone()], CalendarEventKind::Jubilee, 2025, None, None, &[5]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, d(2025, 4, 1));

        // 4 年不是里程碑
        let none = calendar_events(&[emp], CalendarEventKind::Jubilee, 2024, None, None, &[5]);
        assert!(none.is_empty());
    }
}
