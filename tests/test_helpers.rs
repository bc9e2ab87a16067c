// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库初始化、仓库库位树与规则种子数据
// ==========================================
#![allow(dead_code)]

use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use stock_allocation::db::{init_schema, open_sqlite_connection};
use stock_allocation::domain::{DemandLine, DemandValues, ProcureMethod, StockLocation, StockRule};
use stock_allocation::repository::{StockLocationRepository, StockQuantRepository, StockRuleRepository};
use tempfile::NamedTempFile;

// 库位树:
//   WH(1) ─┬─ WH/Stock(8) ── WH/Stock/Shelf 1(9)
//          └─ WH/Backup(12)
//   Customers(5)
//   Partners(30) ── Partners/Retail(31)
pub const WH_LOC: i64 = 1;
pub const CUSTOMER_LOC: i64 = 5;
pub const STOCK_LOC: i64 = 8;
pub const SHELF_LOC: i64 = 9;
pub const BACKUP_LOC: i64 = 12;
pub const PARTNER_LOC: i64 = 30;
pub const RETAIL_LOC: i64 = 31;

pub const COMPANY: i64 = 1;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().ok_or("临时路径非 UTF-8")?.to_string();

    let conn = open_sqlite_connection(&db_path)?;
    init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(open_sqlite_connection(db_path)?)
}

/// 打开共享连接（仓储与事务共用）
pub fn shared_connection(db_path: &str) -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(
        open_sqlite_connection(db_path).expect("Failed to open db"),
    ))
}

/// 写入库位树
pub fn seed_locations(conn: &Arc<Mutex<Connection>>) {
    let repo = StockLocationRepository::from_connection(conn.clone());
    let locations = [
        (WH_LOC, "WH", None),
        (STOCK_LOC, "WH/Stock", Some(WH_LOC)),
        (SHELF_LOC, "WH/Stock/Shelf 1", Some(STOCK_LOC)),
        (BACKUP_LOC, "WH/Backup", Some(WH_LOC)),
        (CUSTOMER_LOC, "Customers", None),
        (PARTNER_LOC, "Partners", None),
        (RETAIL_LOC, "Partners/Retail", Some(PARTNER_LOC)),
    ];
    for (location_id, name, parent_id) in locations {
        repo.upsert(&StockLocation {
            location_id,
            name: name.to_string(),
            parent_id,
        })
        .expect("Failed to seed location");
    }
}

/// 写入一条在手库存
pub fn seed_quant(conn: &Arc<Mutex<Connection>>, product_id: i64, location_id: i64, qty: f64, reserved: f64) {
    StockQuantRepository::from_connection(conn.clone())
        .insert_quant(product_id, location_id, qty, reserved)
        .expect("Failed to seed quant");
}

/// 构造规则（默认目的地 Customers，公司 1）
pub fn rule(rule_id: i64, location_src_id: i64, procure_method: ProcureMethod, sequence: i32) -> StockRule {
    StockRule {
        rule_id,
        name: format!("rule-{}", rule_id),
        location_src_id,
        location_dest_id: CUSTOMER_LOC,
        procure_method,
        sequence,
        route_sequence: 0,
        company_id: Some(COMPANY),
        active: true,
    }
}

/// 写入规则
pub fn seed_rules(conn: &Arc<Mutex<Connection>>, rules: &[StockRule]) {
    let repo = StockRuleRepository::from_connection(conn.clone());
    for rule in rules {
        repo.upsert(rule).expect("Failed to seed rule");
    }
}

/// 标准仓库: Stock 优先，其次 Backup，最后 MTO
///
/// - rule 1: WH/Stock -> Customers (MTS_ELSE_TRANSFER_NEED, seq 10)
/// - rule 3: WH/Backup -> Customers (MTS_ELSE_TRANSFER_NEED, seq 20)
/// - rule 4: WH -> Customers (MAKE_TO_ORDER, seq 30)
pub fn seed_standard_warehouse(conn: &Arc<Mutex<Connection>>) {
    seed_locations(conn);
    seed_rules(
        conn,
        &[
            rule(1, STOCK_LOC, ProcureMethod::MtsElseTransferNeed, 10),
            rule(3, BACKUP_LOC, ProcureMethod::MtsElseTransferNeed, 20),
            rule(4, WH_LOC, ProcureMethod::MakeToOrder, 30),
        ],
    );
}

/// 构造发往 Customers 的需求行
pub fn demand(product_id: i64, qty: f64, sale_line_id: Option<i64>) -> DemandLine {
    DemandLine::new(
        product_id,
        qty,
        "Units",
        CUSTOMER_LOC,
        "SO001",
        Some("SO001".to_string()),
        COMPANY,
        DemandValues {
            sale_line_id,
            ..Default::default()
        },
    )
    .expect("Failed to build demand")
}

/// 写入全局配置
pub fn insert_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        rusqlite::params![key, value],
    )?;
    Ok(())
}
