use data_grove::prelude::*;
use proptest::prelude::*;

/// Random structural edit scripts: create under a random live parent (or the
/// root table), or remove a random live object.
#[derive(Clone, Debug)]
enum Edit {
    Create { name_seed: u8, parent_seed: u8 },
    Remove { seed: u8 },
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (any::<u8>(), any::<u8>()).prop_map(|(name_seed, parent_seed)| Edit::Create {
            name_seed,
            parent_seed
        }),
        1 => any::<u8>().prop_map(|seed| Edit::Remove { seed }),
    ]
}

proptest! {
    /// No two simultaneously-live objects ever share an id, for any edit
    /// script, and removal never resurrects or recycles one.
    #[test]
    fn ids_unique_under_random_edit_scripts(edits in proptest::collection::vec(edit_strategy(), 1..80)) {
        let mut ds = DataStructure::new();
        let mut issued = std::collections::HashSet::new();
        let mut counter = 0usize;
        for edit in edits {
            match edit {
                Edit::Create { name_seed, parent_seed } => {
                    counter += 1;
                    let live = ds.ids();
                    let parent = if live.is_empty() || parent_seed % 3 == 0 {
                        None
                    } else {
                        let candidate = live[parent_seed as usize % live.len()];
                        // only containers may take children
                        ds.get(candidate).filter(|o| o.is_container()).map(|o| o.id())
                    };
                    let name = format!("n{}-{}", counter, name_seed);
                    if let Ok(id) = ds.create_group(&name, parent) {
                        prop_assert!(issued.insert(id), "id {} reissued", id);
                    }
                }
                Edit::Remove { seed } => {
                    let live = ds.ids();
                    if !live.is_empty() {
                        let victim = live[seed as usize % live.len()];
                        ds.remove_data(victim).unwrap();
                    }
                }
            }
            ds.validate_invariants().unwrap();
        }
    }

    /// Resizing preserves the overlapping prefix and zero-fills growth for
    /// arbitrary sizes.
    #[test]
    fn resize_preserves_overlap(
        initial in 1usize..40,
        resized in 0usize..40,
        comps in 1usize..5,
    ) {
        let mut store = DataStore::<i64>::new(vec![initial], vec![comps]);
        for (i, v) in store.iter_mut().enumerate() {
            *v = i as i64 + 1;
        }
        let before: Vec<i64> = store.as_slice().to_vec();
        store.resize_tuples(resized);

        prop_assert_eq!(store.tuple_count(), resized);
        let overlap = initial.min(resized) * comps;
        prop_assert_eq!(&store.as_slice()[..overlap], &before[..overlap]);
        prop_assert!(store.as_slice()[overlap..].iter().all(|&v| v == 0));
    }

    /// A deep copy is structurally identical under path resolution and
    /// wholly disjoint in id space.
    #[test]
    fn deep_copy_paths_agree_ids_disjoint(names in proptest::collection::vec("[a-z]{1,6}", 1..12)) {
        let mut ds = DataStructure::new();
        let mut chain: Option<ObjectId> = None;
        for name in &names {
            match ds.create_group(name, chain) {
                Ok(id) => chain = Some(id),
                Err(DataGroveError::NameCollision { .. }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        let copy = ds.deep_copy();
        prop_assert_eq!(ds.len(), copy.len());
        for id in ds.ids() {
            prop_assert!(!copy.contains(id));
        }
        copy.validate_invariants().unwrap();
    }
}
