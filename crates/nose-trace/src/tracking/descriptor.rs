/// Fixed-length face embedding used to re-identify the tracked person.
///
/// Descriptors from one oracle always share a length; comparing two of
/// different lengths yields no distance rather than a misleading one.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor(Vec<f32>);

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Euclidean distance, or `None` when the lengths differ.
    pub fn distance(&self, other: &Descriptor) -> Option<f32> {
        if self.len() != other.len() || self.is_empty() {
            return None;
        }
        let sum: f32 = self
            .0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        Some(sum.sqrt())
    }

    /// Move towards `other` by `weight` (0 keeps self, 1 replaces it).
    /// Returns false and leaves self untouched on a length mismatch.
    pub fn blend(&mut self, other: &Descriptor, weight: f32) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let w = weight.clamp(0.0, 1.0);
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            *a = *a * (1.0 - w) + *b * w;
        }
        true
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Descriptor::new(vec![0.0, 0.0, 0.0]);
        let b = Descriptor::new(vec![3.0, 4.0, 0.0]);
        assert_eq!(a.distance(&b), Some(5.0));
    }

    #[test]
    fn mismatched_lengths_have_no_distance() {
        let a = Descriptor::new(vec![0.0; 128]);
        let b = Descriptor::new(vec![0.0; 64]);
        assert_eq!(a.distance(&b), None);
    }

    #[test]
    fn blend_moves_partway() {
        let mut a = Descriptor::new(vec![0.0, 1.0]);
        let b = Descriptor::new(vec![1.0, 0.0]);
        assert!(a.blend(&b, 0.25));
        assert_eq!(a.as_slice(), &[0.25, 0.75]);
    }

    #[test]
    fn blend_rejects_mismatch() {
        let mut a = Descriptor::new(vec![0.5, 0.5]);
        let b = Descriptor::new(vec![1.0]);
        assert!(!a.blend(&b, 0.5));
        assert_eq!(a.as_slice(), &[0.5, 0.5]);
    }
}
