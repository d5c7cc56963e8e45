//! Utilities.

/// Returns the greatest common divisor.
pub const fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Returns the least common multiple. `lcm(0, _)` is 0.
pub const fn lcm(a: usize, b: usize) -> usize {
    if a == 0 || b == 0 {
        0
    } else {
        a / gcd(a, b) * b
    }
}

/// Returns aligned value of `value` by `by`
///
/// ### Example
/// ```
/// let value = 15;
/// let byte_aligned = widthflow::align_usize(value, 8);
/// assert_eq!(byte_aligned, 16);
/// ```
pub const fn align_usize(value: usize, by: usize) -> usize { (value + by - 1) / by * by }

/// Some or executing the given expression.
#[macro_export]
macro_rules! some_or {
    ($e:expr, $err:expr) => {{
        match $e {
            Some(r) => r,
            None => $err,
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_lcm() {
        assert_eq!(gcd(4, 2), 2);
        assert_eq!(gcd(3, 5), 1);
        assert_eq!(lcm(2, 4), 4);
        assert_eq!(lcm(8, 2), 8);
        assert_eq!(lcm(3, 5), 15);
        assert_eq!(lcm(0, 5), 0);
    }

    #[test]
    fn align() {
        assert_eq!(align_usize(5, 4), 8);
        assert_eq!(align_usize(8, 4), 8);
    }
}
