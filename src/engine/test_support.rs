// ==========================================
// 引擎单元测试辅助: 内存版外部协作方
// ==========================================

use crate::domain::demand::{DemandLine, DemandValues};
use crate::domain::rule::StockRule;
use crate::domain::stock_move::{StockMove, StockMoveValues};
use crate::domain::types::{MoveState, ProcureMethod};
use crate::engine::ports::{InventorySource, MoveStore, RuleFilter, RuleSource};
use crate::engine::repositories::StockRepositories;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// ==========================================
// FakeInventory - 记录读取次数
// ==========================================
pub struct FakeInventory {
    available: HashMap<(i64, i64), f64>,
    reads: Mutex<HashMap<(i64, i64), usize>>,
    fail: bool,
}

impl FakeInventory {
    pub fn new(entries: &[((i64, i64), f64)]) -> Self {
        Self {
            available: entries.iter().copied().collect(),
            reads: Mutex::new(HashMap::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            available: HashMap::new(),
            reads: Mutex::new(HashMap::new()),
            fail: true,
        }
    }

    pub fn reads(&self, product_id: i64, location_id: i64) -> usize {
        self.reads
            .lock()
            .unwrap()
            .get(&(product_id, location_id))
            .copied()
            .unwrap_or(0)
    }
}

impl InventorySource for FakeInventory {
    fn available_quantity(&self, product_id: i64, location_id: i64) -> RepositoryResult<f64> {
        *self
            .reads
            .lock()
            .unwrap()
            .entry((product_id, location_id))
            .or_insert(0) += 1;

        if self.fail {
            return Err(RepositoryError::DatabaseQueryError("quant 读取失败".to_string()));
        }
        Ok(self
            .available
            .get(&(product_id, location_id))
            .copied()
            .unwrap_or(0.0))
    }
}

// ==========================================
// FakeMoveStore
// ==========================================
#[derive(Default)]
pub struct FakeMoveStore {
    moves: Mutex<Vec<StockMove>>,
    confirm_calls: Mutex<Vec<Vec<i64>>>,
}

impl FakeMoveStore {
    pub fn moves(&self) -> Vec<StockMove> {
        self.moves.lock().unwrap().clone()
    }

    pub fn confirm_calls(&self) -> Vec<Vec<i64>> {
        self.confirm_calls.lock().unwrap().clone()
    }
}

impl MoveStore for FakeMoveStore {
    fn create(&self, values: StockMoveValues) -> RepositoryResult<StockMove> {
        let mut moves = self.moves.lock().unwrap();
        let stock_move = StockMove {
            move_id: moves.len() as i64 + 1,
            values,
            state: MoveState::Draft,
            create_date: Utc::now(),
            confirmed_at: None,
        };
        moves.push(stock_move.clone());
        Ok(stock_move)
    }

    fn confirm_batch(&self, move_ids: &[i64]) -> RepositoryResult<usize> {
        self.confirm_calls.lock().unwrap().push(move_ids.to_vec());
        let mut moves = self.moves.lock().unwrap();
        let mut confirmed = 0;
        for stock_move in moves.iter_mut() {
            if move_ids.contains(&stock_move.move_id) && stock_move.state == MoveState::Draft {
                stock_move.state = MoveState::Confirmed;
                stock_move.confirmed_at = Some(Utc::now());
                confirmed += 1;
            }
        }
        Ok(confirmed)
    }
}

// ==========================================
// FakeRuleSource - 按 (route_sequence, sequence, rule_id) 取第一条
// ==========================================
pub struct FakeRuleSource {
    rules: Vec<StockRule>,
    lookups: Mutex<Vec<RuleFilter>>,
}

impl FakeRuleSource {
    pub fn new(rules: Vec<StockRule>) -> Self {
        Self {
            rules,
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<RuleFilter> {
        self.lookups.lock().unwrap().clone()
    }
}

impl RuleSource for FakeRuleSource {
    fn find_rule(
        &self,
        _product_id: i64,
        location_id: i64,
        filter: &RuleFilter,
    ) -> RepositoryResult<Option<StockRule>> {
        self.lookups.lock().unwrap().push(filter.clone());
        Ok(self
            .rules
            .iter()
            .filter(|r| r.active && r.location_dest_id == location_id && filter.accepts(r))
            .min_by_key(|r| (r.route_sequence, r.sequence, r.rule_id))
            .cloned())
    }
}

// ==========================================
// 构造辅助
// ==========================================

pub const CUSTOMER_LOC: i64 = 5;
pub const STOCK_LOC: i64 = 8;
pub const BACKUP_LOC: i64 = 12;

pub fn rule(rule_id: i64, location_src_id: i64, procure_method: ProcureMethod, sequence: i32) -> StockRule {
    StockRule {
        rule_id,
        name: format!("rule-{}", rule_id),
        location_src_id,
        location_dest_id: CUSTOMER_LOC,
        procure_method,
        sequence,
        route_sequence: 0,
        company_id: Some(1),
        active: true,
    }
}

pub fn demand(product_id: i64, qty: f64, sale_line_id: Option<i64>, stock_move_id: Option<i64>) -> DemandLine {
    DemandLine::new(
        product_id,
        qty,
        "Units",
        CUSTOMER_LOC,
        "SO001",
        Some("SO001".to_string()),
        1,
        DemandValues {
            sale_line_id,
            stock_move_id,
            ..Default::default()
        },
    )
    .unwrap()
}

pub fn repositories(
    rules: &Arc<FakeRuleSource>,
    inventory: &Arc<FakeInventory>,
    moves: &Arc<FakeMoveStore>,
) -> StockRepositories {
    StockRepositories::new(rules.clone(), inventory.clone(), moves.clone())
}
