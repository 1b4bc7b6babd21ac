// Model-based property tests for HashMap and HashSet.
//
// Property 1: a map under random insert/remove/get agrees with
// std::collections::HashMap after every step.
//  - Strategies: the natural strategy, plus a low-entropy strategy whose
//    hashes collide heavily so that removals shift long clusters across the
//    end of the slot array.
//  - Invariant: len() matches, get(k) matches for the touched key, and at the
//    end every key in the domain agrees.
//
// Property 2: retain keeps exactly the entries the predicate accepts and calls
// it once per entry.
//
// Property 3: an identity set counts distinct objects, not distinct values.
use std::collections::HashMap as StdMap;

use proptest::prelude::*;
use shift_hash::DefaultHashMap;
use shift_hash::HashMap;
use shift_hash::HashStrategy;
use shift_hash::IdentitySet;
use shift_hash::LoadFactor;

#[derive(Debug, Clone, Copy)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Get(u16),
}

fn op(domain: u16) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..domain, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0..domain).prop_map(Op::Remove),
        1 => (0..domain).prop_map(Op::Get),
    ]
}

// Only the low three bits of the key reach the table, so clusters are long.
#[derive(Default, Clone)]
struct Clustered;

impl HashStrategy<u16> for Clustered {
    fn hash(&self, key: &u16) -> u64 {
        // Park the clusters near the top of small tables so they wrap.
        (*key as u64 & 0x7).wrapping_sub(4)
    }

    fn equals(&self, stored: &u16, key: &u16) -> bool {
        stored == key
    }
}

fn run_model<H: HashStrategy<u16>>(
    map: &mut HashMap<u16, u32, H>,
    ops: &[Op],
    domain: u16,
) -> Result<(), TestCaseError> {
    let mut model: StdMap<u16, u32> = StdMap::new();

    for op in ops {
        match *op {
            Op::Insert(k, v) => {
                prop_assert_eq!(map.insert(k, v), model.insert(k, v));
            }
            Op::Remove(k) => {
                prop_assert_eq!(map.remove(&k), model.remove(&k));
            }
            Op::Get(k) => {
                prop_assert_eq!(map.get(&k), model.get(&k));
            }
        }
        prop_assert_eq!(map.len(), model.len());
        prop_assert!(map.capacity() == 0 || map.capacity().is_power_of_two());
    }

    for k in 0..domain {
        prop_assert_eq!(map.get(&k), model.get(&k), "key {}", k);
    }
    prop_assert_eq!(map.iter().count(), model.len());
    Ok(())
}

proptest! {
    #[test]
    fn prop_natural_map_matches_model(ops in proptest::collection::vec(op(256), 1..400)) {
        let mut map: DefaultHashMap<u16, u32> = DefaultHashMap::new();
        run_model(&mut map, &ops, 256)?;
    }

    #[test]
    fn prop_clustered_map_matches_model(
        percent in 50u8..=95,
        ops in proptest::collection::vec(op(48), 1..400),
    ) {
        let load_factor = LoadFactor::from_percent(percent).unwrap();
        let mut map = HashMap::with_config(0, load_factor, Clustered);
        run_model(&mut map, &ops, 48)?;
    }

    #[test]
    fn prop_remove_absent_keeps_order(
        keys in proptest::collection::hash_set(0u16..1000, 0..100),
        absent in 1000u16..2000,
    ) {
        let mut map = HashMap::with_strategy(Clustered);
        for &k in &keys {
            map.insert(k, k as u32);
        }
        let before: Vec<(u16, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(map.remove(&absent), None);
        let after: Vec<(u16, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn prop_retain_visits_each_once(
        keys in proptest::collection::hash_set(0u16..512, 0..200),
        modulus in 1u16..5,
    ) {
        let mut map = HashMap::with_strategy(Clustered);
        for &k in &keys {
            map.insert(k, 0u32);
        }

        map.retain(|k, visits| {
            *visits += 1;
            k % modulus == 0
        });

        let expected = keys.iter().filter(|&&k| k % modulus == 0).count();
        prop_assert_eq!(map.len(), expected);
        for (k, visits) in map.iter() {
            prop_assert_eq!(*k % modulus, 0);
            prop_assert_eq!(*visits, 1);
        }
    }

    #[test]
    fn prop_identity_counts_objects(values in proptest::collection::vec(0u8..4, 0..64)) {
        let objects: Vec<Box<u8>> = values.iter().copied().map(Box::new).collect();
        let mut set = IdentitySet::new();
        for object in &objects {
            prop_assert!(set.insert(object));
        }
        for object in &objects {
            prop_assert!(!set.insert(object));
        }
        prop_assert_eq!(set.len(), objects.len());
    }
}
