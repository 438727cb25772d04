//! Small set-algebra helpers shared by the matcher's hot candidate-domain
//! construction.

use std::hash::Hash;

use ahash::AHashSet;

/// Computes the intersection of multiple sets. Returns an empty set if
/// `items` is empty.
#[must_use]
pub(crate) fn intersect_sets<T, I>(mut items: Vec<I>) -> AHashSet<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let Some(first_iter) = items.pop() else {
        return AHashSet::new();
    };

    let mut result: AHashSet<T> = first_iter.into_iter().collect();
    for item in items {
        let other: AHashSet<T> = item.into_iter().collect();
        result.retain(|x| other.contains(x));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersects_across_several_sets() {
        let a = vec![1, 2, 3];
        let b = vec![2, 3, 4];
        let c = vec![2, 3, 5];
        let result = intersect_sets(vec![a, b, c]);
        assert_eq!(result, AHashSet::from_iter([2, 3]));
    }

    #[test]
    fn empty_input_gives_empty_set() {
        let result: AHashSet<i32> = intersect_sets(Vec::<Vec<i32>>::new());
        assert!(result.is_empty());
    }
}
