// ==========================================
// 员工主数据生命周期系统 - 每日摘要渲染
// ==========================================
// 职责: 渲染生日祝福/周年摘要/到期任务摘要的邮件内容
// 红线: 纯函数，只产出"应发送什么"，投递在系统边界之外
// ==========================================

use crate::domain::employee::Employee;
use crate::domain::event::{JubileeHit, RenderedMail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 简易模板渲染: 将 {{ key }} 占位符替换为变量值
///
/// 占位符内部允许空白；未知占位符原样保留
pub fn render_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let key = after[..close].trim();
                match vars.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(&after[..close]);
                        out.push_str("}}");
                    }
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// 到期任务摘要行（由调用方关联员工姓名与任务标题）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueTaskLine {
    pub employee_name: String,
    pub title: String,
    pub due_date: NaiveDate,
}

/// 渲染今日生日员工的个人祝福邮件（无邮箱的员工跳过）
pub fn build_birthday_mails(birthday_employees: &[Employee], template: &str) -> Vec<RenderedMail> {
    birthday_employees
        .iter()
        .filter_map(|employee| {
            let to = employee.email.clone()?;
            let html = render_template(
                template,
                &[
                    ("firstName", employee.first_name.clone()),
                    ("lastName", employee.last_name.clone()),
                ],
            );
            Some(RenderedMail {
                to: vec![to],
                subject: format!("Alles Gute zum Geburtstag, {}!", employee.first_name),
                html,
            })
        })
        .collect()
}

/// 渲染管理者周年摘要（无命中或无收件人返回 None）
pub fn build_jubilee_digest(
    hits: &[JubileeHit],
    manager_emails: &[String],
    template: &str,
) -> Option<RenderedMail> {
    if hits.is_empty() || manager_emails.is_empty() {
        return None;
    }

    let lines: Vec<String> = hits
        .iter()
        .map(|hit| {
            render_template(
                template,
                &[
                    ("firstName", hit.employee.first_name.clone()),
                    ("lastName", hit.employee.last_name.clone()),
                    ("years", hit.years.to_string()),
                    ("date", hit.anniversary_date.format("%d.%m.%Y").to_string()),
                ],
            )
        })
        .collect();

    Some(RenderedMail {
        to: manager_emails.to_vec(),
        subject: format!("Jubiläums-Übersicht: {} Jubiläen heute", hits.len()),
        html: lines.join("<br/>\n"),
    })
}

/// 渲染管理者到期任务摘要（无到期任务或无收件人返回 None）
pub fn build_due_task_digest(
    due_tasks: &[DueTaskLine],
    manager_emails: &[String],
) -> Option<RenderedMail> {
    if due_tasks.is_empty() || manager_emails.is_empty() {
        return None;
    }

    let mut rows = String::from("<ul>\n");
    for line in due_tasks {
        rows.push_str(&format!(
            "<li>{} – {} (fällig {})</li>\n",
            line.employee_name,
            line.title,
            line.due_date.format("%d.%m.%Y")
        ));
    }
    rows.push_str("</ul>");

    Some(RenderedMail {
        to: manager_emails.to_vec(),
        subject: format!("Fällige Aufgaben: {}", due_tasks.len()),
        html: rows,
    })
}
