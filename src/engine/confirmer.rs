// ==========================================
// 库存拉式补货 - 批量确认
// ==========================================
// 一次派发创建的移动在结束时一次性确认
// ==========================================

use crate::domain::stock_move::StockMove;
use crate::domain::types::MoveState;
use crate::engine::error::{AllocationError, AllocationResult};
use crate::engine::ports::MoveStore;
use chrono::Utc;

pub struct BatchConfirmer {
    // 无状态
}

impl BatchConfirmer {
    pub fn new() -> Self {
        Self {}
    }

    /// 确认一批移动，并同步内存中的状态
    ///
    /// # 返回
    /// 存储层实际确认的条数（空批次不访问存储，返回 0）
    ///
    /// # 错误
    /// - 存储层确认条数与批次大小不符: ConfirmMismatch，内存状态保持不变
    pub fn confirm(&self, store: &dyn MoveStore, moves: &mut [StockMove]) -> AllocationResult<usize> {
        if moves.is_empty() {
            return Ok(0);
        }

        let ids: Vec<i64> = moves.iter().map(|m| m.move_id).collect();
        let confirmed = store.confirm_batch(&ids)?;
        if confirmed != ids.len() {
            return Err(AllocationError::ConfirmMismatch {
                expected: ids.len(),
                confirmed,
            });
        }

        let now = Utc::now();
        for stock_move in moves.iter_mut() {
            stock_move.state = MoveState::Confirmed;
            stock_move.confirmed_at = Some(now);
        }

        tracing::debug!(batch_size = ids.len(), confirmed, "移动批量确认");
        Ok(confirmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ProcureMethod;
    use crate::engine::test_support::{demand, rule, FakeMoveStore, STOCK_LOC};

    #[test]
    fn test_empty_batch_skips_store() {
        let store = FakeMoveStore::default();
        let confirmed = BatchConfirmer::new().confirm(&store, &mut []).unwrap();
        assert_eq!(confirmed, 0);
        assert!(store.confirm_calls().is_empty());
    }

    #[test]
    fn test_confirm_in_one_call() {
        let store = FakeMoveStore::default();
        let r = rule(1, STOCK_LOC, ProcureMethod::MakeToStock, 10);
        let mut moves = vec![
            store.create(r.stock_move_values(&demand(1, 2.0, None, None), 2.0)).unwrap(),
            store.create(r.stock_move_values(&demand(2, 1.0, None, None), 1.0)).unwrap(),
        ];

        let confirmed = BatchConfirmer::new().confirm(&store, &mut moves).unwrap();

        assert_eq!(confirmed, 2);
        assert_eq!(store.confirm_calls(), vec![vec![1, 2]]);
        assert!(moves.iter().all(|m| m.is_confirmed()));
        assert!(store.moves().iter().all(|m| m.is_confirmed()));
    }

    #[test]
    fn test_partial_confirm_is_rejected() {
        let store = FakeMoveStore::default();
        let r = rule(1, STOCK_LOC, ProcureMethod::MakeToStock, 10);
        let first = store.create(r.stock_move_values(&demand(1, 2.0, None, None), 2.0)).unwrap();
        let second = store.create(r.stock_move_values(&demand(2, 1.0, None, None), 1.0)).unwrap();
        // 第一条已被确认，存储层只会确认第二条
        store.confirm_batch(&[first.move_id]).unwrap();

        let mut moves = vec![first, second];
        let err = BatchConfirmer::new().confirm(&store, &mut moves).unwrap_err();

        assert!(matches!(
            err,
            AllocationError::ConfirmMismatch { expected: 2, confirmed: 1 }
        ));
        assert!(moves.iter().all(|m| !m.is_confirmed()));
    }
}
