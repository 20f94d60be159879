/// Mathematical modulo: the result always lies in `[0, m)` for `m > 0`, whatever the sign of `a`.
pub fn floor_mod(a: i128, m: i128) -> i128 {
    a.rem_euclid(m)
}

/// Rounds halves towards positive infinity (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::with_capacity(13);
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
