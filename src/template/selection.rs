//! Conversion of caller-facing slide numbers to slide indices.

use std::collections::BTreeSet;

/// Map 1-based slide numbers to sorted, de-duplicated zero-based indices.
///
/// Zero and negative numbers are dropped.
pub fn slide_indices_from_numbers(numbers: &[i64]) -> Vec<usize> {
    numbers
        .iter()
        .filter(|&&n| n > 0)
        .filter_map(|&n| usize::try_from(n - 1).ok())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_to_indices() {
        assert_eq!(slide_indices_from_numbers(&[3, 1]), [0, 2]);
        assert_eq!(slide_indices_from_numbers(&[0, -4, 2, 2]), [1]);
        assert!(slide_indices_from_numbers(&[]).is_empty());
    }
}
