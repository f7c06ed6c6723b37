// ==========================================
// 员工主数据生命周期系统 - CLI 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: HR 后台主数据生命周期管理
// ==========================================

use chrono::Utc;
use hr_lifecycle::api::{AnniversaryApi, ImportApi, LifecycleApi, ScheduleApi};
use hr_lifecycle::{APP_NAME, VERSION};
use std::process::ExitCode;

/// 默认数据库路径: <data_dir>/hr-lifecycle/hr.db
fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("HR_LIFECYCLE_DB") {
        return path;
    }
    let base = dirs::data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    let dir = base.join("hr-lifecycle");
    let _ = std::fs::create_dir_all(&dir);
    dir.join("hr.db").to_string_lossy().to_string()
}

fn print_usage() {
    eprintln!("用法: hr-lifecycle <命令> [参数]");
    eprintln!();
    eprintln!("命令:");
    eprintln!("  import <file>                         导入全量名册 (.xlsx/.xls/.csv)");
    eprintln!("  recent-runs [limit]                   最近导入审计记录");
    eprintln!("  run-daily                             每日调度（生日/周年/到期任务摘要）");
    eprintln!("  upcoming <days>                       未来 N 天内的里程碑周年");
    eprintln!("  generate <employee_id> <lifecycle> [template_id] [--overwrite]");
    eprintln!("                                        生成生命周期任务");
}

#[tokio::main]
async fn main() -> ExitCode {
    hr_lifecycle::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", APP_NAME);
    tracing::info!("系统版本: {}", VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    if let Err(e) = hr_lifecycle::db::open_and_init(&db_path) {
        tracing::error!("数据库初始化失败: {}", e);
        return ExitCode::FAILURE;
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = run_command(&db_path, &args).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("命令执行失败: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_command(db_path: &str, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    match args.first().map(|s| s.as_str()) {
        Some("import") => {
            let file = args.get(1).ok_or("缺少名册文件路径")?;
            let api = ImportApi::new(db_path.to_string());
            let response = api.import_roster(file).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Some("recent-runs") => {
            let limit = args
                .get(1)
                .map(|s| s.parse::<usize>())
                .transpose()?
                .unwrap_or(10);
            let api = ImportApi::new(db_path.to_string());
            let runs = api.recent_runs(limit).await?;
            println!("{}", serde_json::to_string_pretty(&runs)?);
        }
        Some("run-daily") => {
            let api = ScheduleApi::new(db_path.to_string());
            let digest = api.run_daily(Utc::now().date_naive()).await?;
            println!("{}", serde_json::to_string_pretty(&digest)?);
        }
        Some("upcoming") => {
            let days = args.get(1).ok_or("缺少天数参数")?.parse::<i64>()?;
            let api = AnniversaryApi::new(db_path.to_string());
            let hits = api.upcoming(Utc::now().date_naive(), days).await?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Some("generate") => {
            let employee_id = args.get(1).ok_or("缺少员工ID")?;
            let lifecycle = args.get(2).ok_or("缺少生命周期类型")?;
            let overwrite = args.iter().any(|a| a == "--overwrite");
            let template_id = args
                .get(3)
                .filter(|a| a.as_str() != "--overwrite")
                .map(|s| s.as_str());
            let api = LifecycleApi::new(db_path.to_string());
            let report = api
                .generate_tasks(employee_id, lifecycle, template_id, overwrite)
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print_usage();
            return Err("未知命令".into());
        }
    }
    Ok(())
}
