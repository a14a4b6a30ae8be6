//! Set joins over ordered collections keyed by a composite key.

use std::collections::BTreeSet;

/// Full outer join of `left` and `right` that drops the matched rows.
///
/// Keeps every row whose key appears on exactly one side: the unmatched
/// left rows in left order, then the unmatched right rows in right order.
/// Joining a selection with itself therefore yields nothing, which is what
/// makes a repeated toggle cancel out.
pub fn outer_join_by<T, K, F>(left: &[T], right: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let left_keys: BTreeSet<K> = left.iter().map(&key).collect();
    let right_keys: BTreeSet<K> = right.iter().map(&key).collect();

    left.iter()
        .filter(|item| !right_keys.contains(&key(item)))
        .chain(right.iter().filter(|item| !left_keys.contains(&key(item))))
        .cloned()
        .collect()
}

/// Left join of `left` and `right` keeping only the unmatched left rows.
///
/// Left order is preserved.
pub fn left_join_by<T, K, F>(left: &[T], right: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let right_keys: BTreeSet<K> = right.iter().map(&key).collect();

    left.iter()
        .filter(|item| !right_keys.contains(&key(item)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::LineId;
    use similar_asserts::assert_eq;

    #[test]
    fn outer_join_keeps_one_sided_rows() {
        let left = [LineId::removed(1), LineId::removed(2), LineId::added(1)];
        let right = [LineId::added(1), LineId::added(2)];
        assert_eq!(
            outer_join_by(&left, &right, LineId::key),
            vec![LineId::removed(1), LineId::removed(2), LineId::added(2)]
        );
    }

    #[test]
    fn outer_join_with_itself_is_empty() {
        let lines = [LineId::removed(4), LineId::added(6)];
        assert!(outer_join_by(&lines, &lines, LineId::key).is_empty());
    }

    #[test]
    fn outer_join_with_empty_side() {
        let lines = [LineId::removed(4), LineId::added(6)];
        assert_eq!(outer_join_by(&lines, &[], LineId::key), lines.to_vec());
        assert_eq!(outer_join_by(&[], &lines, LineId::key), lines.to_vec());
    }

    #[test]
    fn left_join_drops_matches() {
        let left = [LineId::removed(1), LineId::added(1), LineId::added(2)];
        let right = [LineId::added(1), LineId::removed(9)];
        assert_eq!(
            left_join_by(&left, &right, LineId::key),
            vec![LineId::removed(1), LineId::added(2)]
        );
    }

    #[test]
    fn key_distinguishes_sides() {
        // old line 3 and new line 3 are different rows
        let left = [LineId::removed(3)];
        let right = [LineId::added(3)];
        assert_eq!(left_join_by(&left, &right, LineId::key), left.to_vec());
    }
}
