// ==========================================
// 库存拉式补货 - 可用量跟踪器
// ==========================================
// 职责: 事务内按库存池缓存剩余可用量
// 红线: 某个库存池一旦初始化，事务内不再查询权威库存
// 红线: 剩余量单调递减
// ==========================================

use crate::domain::pool::PoolKey;
use crate::engine::error::{AllocationError, AllocationResult};
use crate::engine::ports::InventorySource;
use crate::engine::precision::{float_compare, float_is_zero, float_round};
use std::collections::HashMap;

// ==========================================
// AvailabilityTracker - 可用量跟踪器
// ==========================================
#[derive(Debug, Clone)]
pub struct AvailabilityTracker {
    remaining: HashMap<PoolKey, f64>,
    precision_digits: u32,
}

impl AvailabilityTracker {
    pub fn new(precision_digits: u32) -> Self {
        Self {
            remaining: HashMap::new(),
            precision_digits,
        }
    }

    /// 获取剩余可用量，首次访问时从权威库存初始化
    ///
    /// # 说明
    /// - 权威库存可能返回负数（预留超过在手），按 0 处理
    pub fn get_or_init(
        &mut self,
        key: PoolKey,
        source: &dyn InventorySource,
    ) -> AllocationResult<f64> {
        if let Some(&qty) = self.remaining.get(&key) {
            return Ok(qty);
        }

        let raw = source.available_quantity(key.product_id, key.location_src_id)?;
        let seeded = if raw < 0.0 {
            tracing::warn!(pool = %key, available = raw, "权威可用量为负，按 0 初始化");
            0.0
        } else {
            float_round(raw, self.precision_digits)
        };

        tracing::debug!(pool = %key, available = seeded, "库存池初始化");
        self.remaining.insert(key, seeded);
        Ok(seeded)
    }

    /// 扣减可用量，返回扣减后的剩余量
    ///
    /// # 错误
    /// - 扣减量超过已知剩余量: TrackerOverdraw（调用方违约）
    pub fn consume(&mut self, key: PoolKey, amount: f64) -> AllocationResult<f64> {
        let current = self.remaining.get(&key).copied().unwrap_or(0.0);

        if amount < 0.0 || float_compare(amount, current, self.precision_digits) > 0 {
            return Err(AllocationError::TrackerOverdraw {
                product_id: key.product_id,
                location_id: key.location_src_id,
                requested: amount,
                remaining: current,
            });
        }

        // 精确扣减，不按精度截断: 移动数量与跟踪器必须一致
        let mut next = current - amount;
        if float_is_zero(next, self.precision_digits) {
            next = 0.0;
        }
        self.remaining.insert(key, next);
        Ok(next)
    }

    /// 已跟踪的剩余量（未初始化返回 None）
    pub fn remaining(&self, key: PoolKey) -> Option<f64> {
        self.remaining.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::FakeInventory;

    #[test]
    fn test_get_or_init_queries_source_once_per_pool() {
        let inventory = FakeInventory::new(&[((1, 8), 10.0), ((2, 8), 4.0)]);
        let mut tracker = AvailabilityTracker::new(3);
        let pool = PoolKey::new(1, 8);

        assert_eq!(tracker.get_or_init(pool, &inventory).unwrap(), 10.0);
        tracker.consume(pool, 6.0).unwrap();
        // 第二次读取命中缓存，看到扣减后的值
        assert_eq!(tracker.get_or_init(pool, &inventory).unwrap(), 4.0);
        assert_eq!(inventory.reads(1, 8), 1);

        assert_eq!(tracker.get_or_init(PoolKey::new(2, 8), &inventory).unwrap(), 4.0);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_negative_availability_seeds_zero() {
        let inventory = FakeInventory::new(&[((1, 8), -3.0)]);
        let mut tracker = AvailabilityTracker::new(3);
        assert_eq!(tracker.get_or_init(PoolKey::new(1, 8), &inventory).unwrap(), 0.0);
    }

    #[test]
    fn test_consume_rejects_overdraw() {
        let inventory = FakeInventory::new(&[((1, 8), 2.0)]);
        let mut tracker = AvailabilityTracker::new(3);
        let pool = PoolKey::new(1, 8);
        tracker.get_or_init(pool, &inventory).unwrap();

        let err = tracker.consume(pool, 2.5).unwrap_err();
        assert!(matches!(err, AllocationError::TrackerOverdraw { .. }));
        assert_eq!(tracker.remaining(pool), Some(2.0));

        // 未初始化的库存池视为 0
        assert!(tracker.consume(PoolKey::new(9, 9), 1.0).is_err());
    }

    #[test]
    fn test_consume_keeps_sub_precision_remainder() {
        let inventory = FakeInventory::new(&[((1, 8), 2.0)]);
        let mut tracker = AvailabilityTracker::new(3);
        let pool = PoolKey::new(1, 8);
        tracker.get_or_init(pool, &inventory).unwrap();

        let mut left = 0.0;
        for _ in 0..4 {
            left = tracker.consume(pool, 0.4004).unwrap();
        }
        assert!((left - 0.3984).abs() < 1e-9);
        assert_eq!(tracker.remaining(pool), Some(left));
    }

    #[test]
    fn test_consume_snaps_float_residue_to_zero() {
        let inventory = FakeInventory::new(&[((1, 8), 0.3)]);
        let mut tracker = AvailabilityTracker::new(3);
        let pool = PoolKey::new(1, 8);
        tracker.get_or_init(pool, &inventory).unwrap();

        tracker.consume(pool, 0.1).unwrap();
        let left = tracker.consume(pool, 0.2).unwrap();
        assert_eq!(left, 0.0);
    }
}
