//! Prime sizing for the hash tables.
//!
//! Chained tables only need a prime bucket count. The probing table needs a
//! prime congruent to 3 mod 4 so that its alternating quadratic probe
//! sequence is a permutation of all slots.

/// Trial division; capacities stay far below the range where this matters.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5usize;
    while let Some(sq) = i.checked_mul(i) {
        if sq > n {
            break;
        }
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// `p % 4 == 3`.
pub fn is_special_prime(n: usize) -> bool {
    n % 4 == 3 && is_prime(n)
}

/// Smallest prime `>= n`, or `None` if it does not fit in `usize`.
pub fn next_prime(n: usize) -> Option<usize> {
    if n <= 2 {
        return Some(2);
    }
    let mut c = n | 1;
    loop {
        if is_prime(c) {
            return Some(c);
        }
        c = c.checked_add(2)?;
    }
}

/// Smallest prime `>= n` with `p % 4 == 3`, or `None` on overflow.
pub fn next_special_prime(n: usize) -> Option<usize> {
    if n <= 3 {
        return Some(3);
    }
    // Round up to the next candidate of the form 4k + 3.
    let mut c = n.checked_add((7 - n % 4) % 4)?;
    loop {
        if is_prime(c) {
            return Some(c);
        }
        c = c.checked_add(4)?;
    }
}

/// Next prime at least twice `n`.
pub(crate) fn grown_prime(n: usize) -> Option<usize> {
    next_prime(n.checked_mul(2)?)
}

/// Next special prime at least twice `n`.
pub(crate) fn grown_special_prime(n: usize) -> Option<usize> {
    next_special_prime(n.checked_mul(2)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_primes() {
        let primes: Vec<usize> = (0..40).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37]);
    }

    #[test]
    fn next_prime_rounds_up() {
        assert_eq!(next_prime(0), Some(2));
        assert_eq!(next_prime(2), Some(2));
        assert_eq!(next_prime(8), Some(11));
        assert_eq!(next_prime(14), Some(17));
        assert_eq!(next_prime(97), Some(97));
        assert_eq!(next_prime(usize::MAX), None);
    }

    /// Invariant: special primes are primes of the form 4k + 3.
    #[test]
    fn next_special_prime_skips_1_mod_4() {
        assert_eq!(next_special_prime(0), Some(3));
        assert_eq!(next_special_prime(4), Some(7));
        // 13 and 17 are 1 mod 4.
        assert_eq!(next_special_prime(12), Some(19));
        assert_eq!(next_special_prime(14), Some(19));
        assert_eq!(next_special_prime(20), Some(23));
        for n in 0..500 {
            let p = next_special_prime(n).unwrap();
            assert!(p >= n);
            assert!(is_special_prime(p));
            assert!((n..p).all(|c| !is_special_prime(c)));
        }
    }

    #[test]
    fn growth_at_least_doubles() {
        assert_eq!(grown_prime(7), Some(17));
        assert_eq!(grown_special_prime(7), Some(19));
        assert_eq!(grown_special_prime(19), Some(43));
        assert_eq!(grown_prime(usize::MAX / 2 + 1), None);
    }
}
