// ==========================================
// 库存拉式补货 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 以 SQLite 实现引擎端口，屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod stock_location_repo;
pub mod stock_move_repo;
pub mod stock_quant_repo;
pub mod stock_rule_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use stock_location_repo::StockLocationRepository;
pub use stock_move_repo::StockMoveRepository;
pub use stock_quant_repo::StockQuantRepository;
pub use stock_rule_repo::StockRuleRepository;

use crate::engine::repositories::StockRepositories;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// 基于同一连接装配引擎所需的全部仓储
///
/// 共享连接保证外层事务覆盖所有读写
pub fn sqlite_repositories(conn: &Arc<Mutex<Connection>>) -> StockRepositories {
    StockRepositories::new(
        Arc::new(StockRuleRepository::from_connection(conn.clone())),
        Arc::new(StockQuantRepository::from_connection(conn.clone())),
        Arc::new(StockMoveRepository::from_connection(conn.clone())),
    )
}
