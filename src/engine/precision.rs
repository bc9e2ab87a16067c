// ==========================================
// 库存拉式补货 - 数量精度工具
// ==========================================
// 按计量单位的小数位数比较数量，避免浮点近零误差
// 舍入规则: 四舍五入 (远离零)
// ==========================================

/// 精度对应的最小单位 (10^-digits)
pub fn rounding_step(precision_digits: u32) -> f64 {
    10f64.powi(-(precision_digits as i32))
}

/// 按小数位数四舍五入
pub fn float_round(value: f64, precision_digits: u32) -> f64 {
    let factor = 10f64.powi(precision_digits as i32);
    let normalized = value * factor;
    // 补偿二进制表示误差，如 2.675 实际存储为 2.67499999...
    let epsilon = f64::EPSILON * normalized.abs().max(1.0);
    let rounded = if normalized >= 0.0 {
        (normalized + epsilon).round()
    } else {
        (normalized - epsilon).round()
    };
    rounded / factor
}

/// 在给定精度下是否为零
pub fn float_is_zero(value: f64, precision_digits: u32) -> bool {
    float_round(value, precision_digits).abs() < rounding_step(precision_digits)
}

/// 在给定精度下比较两个数量
///
/// # 返回
/// - -1: a < b
/// - 0: 相等
/// - 1: a > b
pub fn float_compare(a: f64, b: f64, precision_digits: u32) -> i8 {
    let delta = float_round(a, precision_digits) - float_round(b, precision_digits);
    if float_is_zero(delta, precision_digits) {
        0
    } else if delta < 0.0 {
        -1
    } else {
        1
    }
}
