// ==========================================
// 库存拉式补货 - 命令行入口
// ==========================================
// 用法:
//   stock-allocation [batch.json|-] [db_path]
//
// batch.json 为需求行 JSON 数组，省略或为 "-" 时读取 stdin
// 整批在一个数据库事务中执行，结果以 JSON 输出到 stdout
// ==========================================

use anyhow::{Context, Result};
use std::io::Read;
use std::sync::{Arc, Mutex};
use stock_allocation::config::{load_allocation_settings, ConfigManager};
use stock_allocation::db::{default_db_path, init_schema, open_sqlite_connection, run_in_transaction};
use stock_allocation::domain::{DemandLine, DemandRecord};
use stock_allocation::engine::{AllocationContext, AllocationError, ProcurementEngine};
use stock_allocation::{logging, repository};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let batch_path = args.next().filter(|s| s != "-");
    let db_path = args
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_db_path);

    tracing::info!("{} v{}", stock_allocation::APP_NAME, stock_allocation::VERSION);
    tracing::info!("使用数据库: {}", db_path);

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("无法打开数据库: {}", db_path))?;
    init_schema(&conn).context("建表失败")?;
    let conn = Arc::new(Mutex::new(conn));

    let config = ConfigManager::from_connection(conn.clone())
        .map_err(|e| anyhow::anyhow!("配置初始化失败: {}", e))?;
    let settings = load_allocation_settings(&config)
        .await
        .map_err(|e| anyhow::anyhow!("读取分配参数失败: {}", e))?;

    let demands = read_batch(batch_path.as_deref())?;
    tracing::info!(lines = demands.len(), "需求批次已加载");

    let engine = ProcurementEngine::new(repository::sqlite_repositories(&conn));
    let mut ctx = AllocationContext::new(settings.clone());

    let outcome = run_in_transaction(&conn, || -> Result<_, AllocationError> {
        engine.run(&mut ctx, demands, settings.raise_user_error)
    })?;

    tracing::info!(
        tx = %ctx.transaction_id,
        moves = outcome.moves.len(),
        shortfalls = outcome.shortfalls.len(),
        unfulfilled = outcome.unfulfilled.len(),
        "分配完成"
    );

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn read_batch(path: Option<&str>) -> Result<Vec<DemandLine>> {
    let raw = match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("无法读取需求文件: {}", path))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("无法读取 stdin")?;
            buf
        }
    };

    let records: Vec<DemandRecord> = serde_json::from_str(&raw).context("需求批次 JSON 格式错误")?;
    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            record
                .into_line()
                .with_context(|| format!("第 {} 条需求行无效", idx + 1))
        })
        .collect()
}
