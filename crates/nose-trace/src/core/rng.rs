//! Seedable pseudo-random number generator (xorshift64) for word selection.

/// Xorshift64 generator. Same seed, same sequence of words.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform index into a slice of length `len`. `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }

    /// Pick one item, or `None` from an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let i = self.index(items.len());
            items.get(i)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_picks() {
        let words = ["GLOWING", "TERAWAT", "KINCLONG", "WANGI", "LEMBAB"];
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..20 {
            assert_eq!(a.pick(&words), b.pick(&words));
        }
    }

    #[test]
    fn zero_seed_handled() {
        let mut rng = Rng::new(0);
        assert!(rng.index(3) < 3);
    }

    #[test]
    fn pick_from_empty_is_none() {
        let mut rng = Rng::new(1);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
    }

    #[test]
    fn index_covers_range() {
        let mut rng = Rng::new(99);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[rng.index(4)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
