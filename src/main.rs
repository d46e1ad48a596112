// ==========================================
// 供应链经营管理系统 - GTIN 池命令行入口
// ==========================================
// 用法:
//   gtin-pool summary
//   gtin-pool list [AVAILABLE|ASSIGNED|ARCHIVED]
//   gtin-pool import <csv文件> [--commit] [--actor 操作人]
// ==========================================

use gtin_pool::app::{get_default_db_path, AppState};
use gtin_pool::domain::PoolStatus;
use gtin_pool::{logging, APP_NAME, VERSION};
use tracing::{error, info};

fn print_usage() {
    eprintln!("用法:");
    eprintln!("  gtin-pool summary");
    eprintln!("  gtin-pool list [AVAILABLE|ASSIGNED|ARCHIVED]");
    eprintln!("  gtin-pool import <csv文件> [--commit] [--actor 操作人] [--json]");
}

#[tokio::main]
async fn main() {
    logging::init();
    info!("{} v{} 启动", APP_NAME, VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        std::process::exit(2);
    };

    let db_path = std::env::var("GTIN_POOL_DB").unwrap_or_else(|_| get_default_db_path());
    let state = match AppState::new(&db_path) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, db_path = %db_path, "初始化失败");
            std::process::exit(1);
        }
    };

    let result = match command.as_str() {
        "summary" => run_summary(&state).await,
        "list" => run_list(&state, args.get(1).map(String::as_str)).await,
        "import" => run_import(&state, &args[1..]).await,
        other => {
            eprintln!("未知命令: {other}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        error!(error = %e, "命令执行失败");
        std::process::exit(1);
    }
}

async fn run_summary(state: &AppState) -> anyhow::Result<()> {
    let summary = state.pool_api.pool_summary().await?;
    println!(
        "可用: {}  已占用: {}  已归档: {}  合计: {}",
        summary.available, summary.assigned, summary.archived, summary.total
    );
    Ok(())
}

async fn run_list(state: &AppState, status_arg: Option<&str>) -> anyhow::Result<()> {
    let status = match status_arg {
        Some(s) => Some(
            PoolStatus::from_db_str(s)
                .ok_or_else(|| anyhow::anyhow!("无效的状态过滤: {s}"))?,
        ),
        None => None,
    };
    let entries = state.pool_api.list_entries(status).await?;
    for entry in &entries {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            entry.id,
            entry.code.as_deref().unwrap_or("-"),
            entry.gtin_type,
            entry.status,
            entry.owner_ref.as_deref().unwrap_or("-"),
        );
    }
    println!("共 {} 条", entries.len());
    Ok(())
}

async fn run_import(state: &AppState, args: &[String]) -> anyhow::Result<()> {
    let Some(file) = args.first() else {
        print_usage();
        anyhow::bail!("缺少文件参数");
    };
    let commit = args.iter().any(|a| a == "--commit");
    let json = args.iter().any(|a| a == "--json");
    let actor = args
        .iter()
        .position(|a| a == "--actor")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
        .unwrap_or("cli");

    let payload = std::fs::read_to_string(file)?;

    if commit {
        let outcome = state.pool_api.commit_import(&payload, actor).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }
        println!(
            "入库: {}  已存在: {}  类型错误: {}  无效: {}",
            outcome.inserted.len(),
            outcome.already_existed.len(),
            outcome.type_errors.len(),
            outcome.invalid
        );
        for te in &outcome.type_errors {
            println!("  类型错误: {} ({})", te.code, te.attempted_type);
        }
    } else {
        let preview = state.pool_api.preview_import(&payload).await?;
        if json {
            println!("{}", serde_json::to_string_pretty(&preview)?);
            return Ok(());
        }
        println!(
            "预览: 有效 {}  无效 {}  批内重复 {}  与池冲突 {}",
            preview.valid,
            preview.invalid,
            preview.duplicates.len(),
            preview.conflicts.len()
        );
        for row in preview.rows.iter().filter(|r| !r.valid) {
            println!("  第 {} 行无效: {}", row.row_number, row.code);
        }
        for code in &preview.conflicts {
            println!("  冲突: {code}");
        }
    }
    Ok(())
}
