// ==========================================
// 库存拉式补货 - 需求行领域模型
// ==========================================
// 职责: 需求行 (DemandLine) 与其类型化属性 (DemandValues)
// 红线: 需求行创建后不可变，分配只派生新的需求行
// ==========================================

use crate::domain::types::ProcureMethod;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// 需求行校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DemandError {
    #[error("需求数量无效: {0}")]
    InvalidQuantity(f64),

    #[error("计量单位为空")]
    EmptyUom,

    #[error("属性 {key} 无效: {message}")]
    InvalidValue { key: String, message: String },
}

// ==========================================
// DemandValues - 需求行属性
// ==========================================
// 已识别的键提升为字段，其余原样保存在 extra 中，随再派发透传
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandValues {
    pub sale_line_id: Option<i64>,           // 来源单据行 (排序主键)
    pub stock_move_id: Option<i64>,          // 来源移动 (排序次键)
    #[serde(default)]
    pub rules_to_exclude: Vec<i64>,          // 排除规则集 (有序)
    pub procure_method: Option<ProcureMethod>, // 强制补货方式
    pub date_planned: Option<NaiveDateTime>, // 计划日期
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,      // 未识别的属性
}

pub const KEY_SALE_LINE_ID: &str = "sale_line_id";
pub const KEY_STOCK_MOVE_ID: &str = "stock_move_id";
pub const KEY_RULES_TO_EXCLUDE: &str = "rules_to_exclude";
pub const KEY_PROCURE_METHOD: &str = "procure_method";
pub const KEY_DATE_PLANNED: &str = "date_planned";

impl DemandValues {
    /// 从自由格式的 JSON 对象解析
    ///
    /// # 校验
    /// - 单据/移动 id 必须为正整数
    /// - rules_to_exclude 必须为正整数数组
    /// - procure_method 必须为已知标识
    /// - date_planned 格式 `%Y-%m-%d %H:%M:%S`
    pub fn from_json(value: Value) -> Result<Self, DemandError> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(DemandError::InvalidValue {
                    key: "values".to_string(),
                    message: format!("应为对象, 实际为 {}", other),
                })
            }
        };

        let mut values = DemandValues::default();
        for (key, raw) in map {
            match key.as_str() {
                KEY_SALE_LINE_ID => values.sale_line_id = parse_optional_id(&key, &raw)?,
                KEY_STOCK_MOVE_ID => values.stock_move_id = parse_optional_id(&key, &raw)?,
                KEY_RULES_TO_EXCLUDE => values.rules_to_exclude = parse_id_list(&key, &raw)?,
                KEY_PROCURE_METHOD => {
                    values.procure_method = match &raw {
                        Value::Null => None,
                        Value::String(s) => Some(s.parse::<ProcureMethod>().map_err(|message| {
                            DemandError::InvalidValue {
                                key: key.clone(),
                                message,
                            }
                        })?),
                        other => return Err(invalid(&key, other)),
                    }
                }
                KEY_DATE_PLANNED => {
                    values.date_planned = match &raw {
                        Value::Null => None,
                        Value::String(s) => Some(
                            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map_err(
                                |e| DemandError::InvalidValue {
                                    key: key.clone(),
                                    message: e.to_string(),
                                },
                            )?,
                        ),
                        other => return Err(invalid(&key, other)),
                    }
                }
                _ => {
                    values.extra.insert(key, raw);
                }
            }
        }

        Ok(values)
    }

    /// 优先级键: (来源单据行, 来源移动)，缺失按 0 处理
    pub fn priority_key(&self) -> (i64, i64) {
        (
            self.sale_line_id.unwrap_or(0),
            self.stock_move_id.unwrap_or(0),
        )
    }

    /// 派生再派发用属性: 排除集追加一个规则，清除强制补货方式
    pub fn with_excluded_rule(&self, rule_id: i64) -> Self {
        let mut next = self.clone();
        next.rules_to_exclude.push(rule_id);
        next.procure_method = None;
        next
    }

    /// 是否已排除该规则
    pub fn excludes(&self, rule_id: i64) -> bool {
        self.rules_to_exclude.contains(&rule_id)
    }
}

fn invalid(key: &str, raw: &Value) -> DemandError {
    DemandError::InvalidValue {
        key: key.to_string(),
        message: format!("类型不符: {}", raw),
    }
}

fn parse_id(key: &str, raw: &Value) -> Result<i64, DemandError> {
    match raw.as_i64() {
        Some(id) if id > 0 => Ok(id),
        _ => Err(invalid(key, raw)),
    }
}

fn parse_optional_id(key: &str, raw: &Value) -> Result<Option<i64>, DemandError> {
    match raw {
        // false/null/0 均表示未关联
        Value::Null | Value::Bool(false) => Ok(None),
        _ if raw.as_i64() == Some(0) => Ok(None),
        _ => parse_id(key, raw).map(Some),
    }
}

fn parse_id_list(key: &str, raw: &Value) -> Result<Vec<i64>, DemandError> {
    match raw {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(|item| parse_id(key, item)).collect(),
        other => Err(invalid(key, other)),
    }
}

// ==========================================
// DemandLine - 需求行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandLine {
    pub product_id: i64,
    pub product_qty: f64,
    pub product_uom: String,
    pub location_id: i64, // 需求库位 (移动目的地)
    pub name: String,
    pub origin: Option<String>,
    pub company_id: i64,
    #[serde(default)]
    pub values: DemandValues,
}

impl DemandLine {
    /// 构造并校验需求行
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        product_id: i64,
        product_qty: f64,
        product_uom: impl Into<String>,
        location_id: i64,
        name: impl Into<String>,
        origin: Option<String>,
        company_id: i64,
        values: DemandValues,
    ) -> Result<Self, DemandError> {
        let line = Self {
            product_id,
            product_qty,
            product_uom: product_uom.into(),
            location_id,
            name: name.into(),
            origin,
            company_id,
            values,
        };
        line.validate()?;
        Ok(line)
    }

    /// 校验 (反序列化得到的需求行也需要调用)
    pub fn validate(&self) -> Result<(), DemandError> {
        if !self.product_qty.is_finite() || self.product_qty < 0.0 {
            return Err(DemandError::InvalidQuantity(self.product_qty));
        }
        if self.product_uom.trim().is_empty() {
            return Err(DemandError::EmptyUom);
        }
        Ok(())
    }

    /// 派生缺口需求行: 同产品/库位/来源/公司/名称，数量为缺口，排除当前规则
    pub fn shortfall(&self, qty: f64, excluded_rule_id: i64) -> Result<Self, DemandError> {
        Self::new(
            self.product_id,
            qty,
            self.product_uom.clone(),
            self.location_id,
            self.name.clone(),
            self.origin.clone(),
            self.company_id,
            self.values.with_excluded_rule(excluded_rule_id),
        )
    }
}

// ==========================================
// DemandRecord - 外部输入的需求行 (属性为任意 JSON)
// ==========================================
#[derive(Debug, Clone, Deserialize)]
pub struct DemandRecord {
    pub product_id: i64,
    pub product_qty: f64,
    pub product_uom: String,
    pub location_id: i64,
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    pub company_id: i64,
    #[serde(default)]
    pub values: Value,
}

impl DemandRecord {
    /// 校验属性并转换为需求行
    pub fn into_line(self) -> Result<DemandLine, DemandError> {
        let values = DemandValues::from_json(self.values)?;
        DemandLine::new(
            self.product_id,
            self.product_qty,
            self.product_uom,
            self.location_id,
            self.name,
            self.origin,
            self.company_id,
            values,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_from_json_splits_known_and_extra_keys() {
        let values = DemandValues::from_json(json!({
            "sale_line_id": 12,
            "stock_move_id": false,
            "rules_to_exclude": [3, 4],
            "procure_method": "MAKE_TO_STOCK",
            "date_planned": "2026-01-20 08:00:00",
            "warehouse_id": 1
        }))
        .unwrap();

        assert_eq!(values.sale_line_id, Some(12));
        assert_eq!(values.stock_move_id, None);
        assert_eq!(values.rules_to_exclude, vec![3, 4]);
        assert_eq!(values.procure_method, Some(ProcureMethod::MakeToStock));
        assert!(values.date_planned.is_some());
        assert_eq!(values.extra.get("warehouse_id"), Some(&json!(1)));
    }

    #[test]
    fn test_values_from_json_rejects_bad_exclusion_set() {
        let err = DemandValues::from_json(json!({ "rules_to_exclude": [1, "x"] })).unwrap_err();
        assert!(matches!(err, DemandError::InvalidValue { ref key, .. } if key == "rules_to_exclude"));

        assert!(DemandValues::from_json(json!({ "sale_line_id": -1 })).is_err());
        assert!(DemandValues::from_json(json!({ "procure_method": "BUY" })).is_err());
        assert!(DemandValues::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_values_from_json_treats_zero_ref_as_missing() {
        let values = DemandValues::from_json(json!({
            "sale_line_id": 0,
            "stock_move_id": 9
        }))
        .unwrap();
        assert_eq!(values.sale_line_id, None);
        assert_eq!(values.priority_key(), (0, 9));

        // 排除集中的 0 不是合法规则 id
        assert!(DemandValues::from_json(json!({ "rules_to_exclude": [0] })).is_err());
    }

    #[test]
    fn test_priority_key_defaults_missing_refs_to_zero() {
        let values = DemandValues {
            stock_move_id: Some(7),
            ..Default::default()
        };
        assert_eq!(values.priority_key(), (0, 7));
    }

    #[test]
    fn test_with_excluded_rule_grows_by_one_and_clears_forced_method() {
        let values = DemandValues {
            rules_to_exclude: vec![5],
            procure_method: Some(ProcureMethod::MakeToStock),
            ..Default::default()
        };
        let next = values.with_excluded_rule(9);

        assert_eq!(next.rules_to_exclude, vec![5, 9]);
        assert_eq!(next.procure_method, None);
        assert!(next.excludes(9));
        // 原属性不变
        assert_eq!(values.rules_to_exclude, vec![5]);
    }

    #[test]
    fn test_demand_line_validation() {
        assert!(DemandLine::new(1, -1.0, "Units", 8, "SO001", None, 1, DemandValues::default()).is_err());
        assert!(DemandLine::new(1, f64::NAN, "Units", 8, "SO001", None, 1, DemandValues::default()).is_err());
        assert_eq!(
            DemandLine::new(1, 1.0, " ", 8, "SO001", None, 1, DemandValues::default()).unwrap_err(),
            DemandError::EmptyUom
        );
        assert!(DemandLine::new(1, 0.0, "Units", 8, "SO001", None, 1, DemandValues::default()).is_ok());
    }

    #[test]
    fn test_shortfall_keeps_identity_fields() {
        let line = DemandLine::new(
            1,
            5.0,
            "Units",
            8,
            "SO001",
            Some("SO001".to_string()),
            1,
            DemandValues {
                sale_line_id: Some(2),
                ..Default::default()
            },
        )
        .unwrap();

        let short = line.shortfall(2.0, 11).unwrap();
        assert_eq!(short.product_qty, 2.0);
        assert_eq!(short.location_id, 8);
        assert_eq!(short.origin.as_deref(), Some("SO001"));
        assert_eq!(short.values.sale_line_id, Some(2));
        assert_eq!(short.values.rules_to_exclude, vec![11]);
    }

    #[test]
    fn test_record_into_line_validates_values() {
        let record: DemandRecord = serde_json::from_value(json!({
            "product_id": 1,
            "product_qty": 3.0,
            "product_uom": "Units",
            "location_id": 5,
            "name": "SO002",
            "company_id": 1,
            "values": { "sale_line_id": 4, "note": "urgent" }
        }))
        .unwrap();

        let line = record.into_line().unwrap();
        assert_eq!(line.origin, None);
        assert_eq!(line.values.sale_line_id, Some(4));
        assert_eq!(line.values.extra.get("note"), Some(&json!("urgent")));

        let bad: DemandRecord = serde_json::from_value(json!({
            "product_id": 1, "product_qty": 3.0, "product_uom": "Units",
            "location_id": 5, "name": "SO002", "company_id": 1,
            "values": { "stock_move_id": "x" }
        }))
        .unwrap();
        assert!(bad.into_line().is_err());
    }
}
