// ==========================================
// 库存拉式补货 - 库存规则数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 查找顺序: 需求库位 -> 父库位 -> ... 直到根库位
// 同一库位内按 (route_sequence, sequence, rule_id) 取第一条
// ==========================================

use crate::domain::rule::StockRule;
use crate::domain::types::ProcureMethod;
use crate::engine::ports::{RuleFilter, RuleSource};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const RULE_COLUMNS: &str = r#"
    rule_id, name, location_src_id, location_dest_id, procure_method,
    sequence, route_sequence, company_id, active
"#;

// ==========================================
// StockRuleRepository - 库存规则仓储
// ==========================================
pub struct StockRuleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockRuleRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入或更新规则（动作固定为 pull）
    pub fn upsert(&self, rule: &StockRule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO stock_rule (
                rule_id, name, action, location_src_id, location_dest_id,
                procure_method, sequence, route_sequence, company_id, active
            ) VALUES (?1, ?2, 'pull', ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                rule.rule_id,
                rule.name,
                rule.location_src_id,
                rule.location_dest_id,
                rule.procure_method.as_str(),
                rule.sequence,
                rule.route_sequence,
                rule.company_id,
                rule.active,
            ],
        )?;
        Ok(())
    }

    /// 按 ID 查询规则（含停用规则）
    pub fn find_by_id(&self, rule_id: i64) -> RepositoryResult<Option<StockRule>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM stock_rule WHERE rule_id = ?1", RULE_COLUMNS);
        let rule = conn
            .query_row(&sql, params![rule_id], map_rule_row)
            .optional()?;
        Ok(rule)
    }

    /// 查询适用于指定库位的第一条规则，沿父库位链回溯
    ///
    /// # 说明
    /// - 排除集中的规则与其他公司的规则在 SQL 中过滤
    /// - 库位链出现环时停止回溯
    pub fn find_applicable(
        &self,
        location_id: i64,
        filter: &RuleFilter,
    ) -> RepositoryResult<Option<StockRule>> {
        let conn = self.get_conn()?;

        let mut sql = format!(
            "SELECT {} FROM stock_rule WHERE location_dest_id = ?1 AND active = 1 AND action = 'pull'",
            RULE_COLUMNS
        );
        let mut bind: Vec<i64> = vec![location_id];

        if !filter.exclude_rule_ids.is_empty() {
            let placeholders: Vec<String> = (0..filter.exclude_rule_ids.len())
                .map(|i| format!("?{}", i + 2))
                .collect();
            sql.push_str(&format!(" AND rule_id NOT IN ({})", placeholders.join(", ")));
            bind.extend(filter.exclude_rule_ids.iter().copied());
        }
        if let Some(company_id) = filter.company_id {
            sql.push_str(&format!(
                " AND (company_id IS NULL OR company_id = ?{})",
                bind.len() + 1
            ));
            bind.push(company_id);
        }
        sql.push_str(" ORDER BY route_sequence ASC, sequence ASC, rule_id ASC LIMIT 1");

        let mut stmt = conn.prepare(&sql)?;
        let mut visited = HashSet::new();
        let mut current = Some(location_id);

        while let Some(loc) = current {
            if !visited.insert(loc) {
                tracing::warn!(location_id = loc, "库位父链存在环，停止回溯");
                break;
            }

            bind[0] = loc;
            let found = stmt
                .query_row(params_from_iter(bind.iter()), map_rule_row)
                .optional()?;
            if found.is_some() {
                return Ok(found);
            }

            current = conn
                .query_row(
                    "SELECT parent_id FROM stock_location WHERE location_id = ?1",
                    params![loc],
                    |row| row.get::<_, Option<i64>>(0),
                )
                .optional()?
                .flatten();
        }

        Ok(None)
    }
}

impl RuleSource for StockRuleRepository {
    fn find_rule(
        &self,
        _product_id: i64,
        location_id: i64,
        filter: &RuleFilter,
    ) -> RepositoryResult<Option<StockRule>> {
        self.find_applicable(location_id, filter)
    }
}

fn map_rule_row(row: &Row<'_>) -> rusqlite::Result<StockRule> {
    let method: String = row.get(4)?;
    let procure_method = method
        .parse::<ProcureMethod>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into()))?;

    Ok(StockRule {
        rule_id: row.get(0)?,
        name: row.get(1)?,
        location_src_id: row.get(2)?,
        location_dest_id: row.get(3)?,
        procure_method,
        sequence: row.get(5)?,
        route_sequence: row.get(6)?,
        company_id: row.get(7)?,
        active: row.get(8)?,
    })
}
