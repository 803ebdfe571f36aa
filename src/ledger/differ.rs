use crate::models::IdSet;

/// IDs observed in this discovery pass that the ledger has not seen yet.
/// An empty `completed` set is a first run and yields `observed` unchanged.
pub fn pending_batch(observed: &IdSet, completed: &IdSet) -> IdSet {
    observed
        .iter()
        .filter(|id| !completed.contains(id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::strategies::id_set;
    use crate::models::ListingId;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn batch_is_observed_minus_completed(observed in id_set(), completed in id_set()) {
            let pending = pending_batch(&observed, &completed);
            prop_assert_eq!(&pending, &observed.difference(&completed));
            for id in &pending {
                prop_assert!(observed.contains(id));
                prop_assert!(!completed.contains(id));
            }
        }
    }

    fn ids(items: &[&str]) -> IdSet {
        items.iter().map(|s| ListingId::from(*s)).collect()
    }

    #[test]
    fn drops_completed_ids() {
        let completed = ids(&["A", "B"]);
        let observed = ids(&["B", "C", "D"]);
        assert_eq!(pending_batch(&observed, &completed), ids(&["C", "D"]));
    }

    #[test]
    fn first_run_keeps_everything() {
        let observed = ids(&["X", "Y"]);
        assert_eq!(pending_batch(&observed, &IdSet::new()), observed);
    }

    #[test]
    fn never_returns_a_completed_id() {
        let completed = ids(&["1", "2", "3", "4"]);
        let observed = ids(&["2", "4", "6", "8"]);

        let pending = pending_batch(&observed, &completed);

        for id in &completed {
            assert!(!pending.contains(id), "{id} should not be pending");
        }
        for id in &pending {
            assert!(observed.contains(id));
        }
    }

    #[test]
    fn ids_compare_exactly() {
        let completed = ids(&["0012"]);
        let observed = ids(&["12", "0012 "]);
        assert_eq!(pending_batch(&observed, &completed), observed);
    }
}
