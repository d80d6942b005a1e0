/// Walks the reflected binary Gray code over `num_bits` bits.
///
/// Every call to [`GrayCode::step`] moves to the next code word, which differs from
/// the previous one in exactly one bit, and reports that bit's position (0 = least
/// significant). The walk starts at the all-zero word.
#[derive(Debug, Clone)]
pub struct GrayCode {
    counter: u64,
    last: u64,
    current: u64,
    previous: u64,
}

impl GrayCode {
    pub fn new(num_bits: usize) -> Self {
        let last = if num_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << num_bits) - 1
        };
        Self {
            counter: 0,
            last,
            current: 0,
            previous: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> u64 {
        self.current
    }

    #[inline]
    pub fn previous(&self) -> u64 {
        self.previous
    }

    /// Advances to the next code word and returns the flipped bit, or `None` once exhausted.
    #[inline]
    pub fn step(&mut self) -> Option<u32> {
        if self.counter >= self.last {
            return None;
        }
        self.counter += 1;
        let next = self.counter ^ (self.counter >> 1);
        let flipped = (next ^ self.current).trailing_zeros();
        self.previous = self.current;
        self.current = next;
        Some(flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn visits_every_word_once_flipping_single_bits() {
        let mut gray = GrayCode::new(4);
        let mut seen = HashSet::from([gray.current()]);
        while let Some(bit) = gray.step() {
            assert_eq!(gray.current() ^ gray.previous(), 1 << bit);
            assert!(seen.insert(gray.current()));
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn zero_bits_yields_no_steps() {
        let mut gray = GrayCode::new(0);
        assert_eq!(gray.step(), None);
        assert_eq!(gray.current(), 0);
    }

    #[test]
    fn first_steps_follow_reflected_code() {
        let mut gray = GrayCode::new(3);
        let flips: Vec<u32> = std::iter::from_fn(|| gray.step()).collect();
        assert_eq!(flips, vec![0, 1, 0, 2, 0, 1, 0]);
    }
}
