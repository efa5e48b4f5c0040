// Duration expressions for thresholds: 2d, 36h, 1d12h, 90m, 1w

use anyhow::Result;

/// Parse a duration expression and return seconds.
///
/// Accepts one or more `<number><unit>` groups with units w, d, h, m, s.
pub fn parse_duration(expr: &str) -> Result<i64> {
    let expr = expr.trim();
    if expr.is_empty() {
        anyhow::bail!("Duration cannot be empty");
    }

    let mut total_secs = 0i64;
    let mut digits = String::new();
    for c in expr.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit_secs = match c {
            'w' => 7 * 86400,
            'd' => 86400,
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => anyhow::bail!("Invalid duration format: {}", expr),
        };
        if digits.is_empty() {
            anyhow::bail!("Invalid duration format: {}", expr);
        }
        let amount: i64 = digits.parse()?;
        total_secs = amount
            .checked_mul(unit_secs)
            .and_then(|secs| total_secs.checked_add(secs))
            .ok_or_else(|| anyhow::anyhow!("Duration too large: {}", expr))?;
        digits.clear();
    }

    if !digits.is_empty() {
        anyhow::bail!("Invalid duration format: {} (missing unit)", expr);
    }
    if total_secs == 0 {
        anyhow::bail!("Duration must be greater than 0");
    }

    Ok(total_secs)
}
