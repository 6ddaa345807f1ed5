//! Property coverage for batch-context atomicity.

use proptest::prelude::*;

use tether_core::{ModelValue, MultipleValueContext};

proptest! {
    /// However a transaction interleaves writes across nodes, dropping it
    /// uncommitted restores every node to its pre-transaction value.
    #[test]
    fn rollback_restores_pre_transaction_values(
        initials in proptest::collection::vec(-1000i64..1000, 1..4),
        writes in proptest::collection::vec((0usize..4, -1000i64..1000), 0..12),
    ) {
        let nodes: Vec<_> = initials
            .iter()
            .enumerate()
            .map(|(index, initial)| {
                ModelValue::create(format!("prop.rollback.{index}"), *initial).unwrap()
            })
            .collect();

        {
            let mut ctx = MultipleValueContext::new();
            for (target, value) in &writes {
                let node = &nodes[target % nodes.len()];
                ctx.set(node, *value);
            }
        }

        for (node, initial) in nodes.iter().zip(&initials) {
            prop_assert_eq!(node.get(), *initial);
        }
    }

    /// Committing applies the last write per node and notifies each distinct
    /// touched node exactly once.
    #[test]
    fn commit_applies_last_writes_and_notifies_once(
        writes in proptest::collection::vec((0usize..3, -1000i64..1000), 1..12),
    ) {
        use std::cell::Cell;
        use std::rc::Rc;

        let nodes: Vec<_> = (0..3)
            .map(|index| ModelValue::create(format!("prop.commit.{index}"), 0i64).unwrap())
            .collect();
        let interfaces: Vec<_> = nodes.iter().map(|n| n.interface_node()).collect();
        let counts: Vec<Rc<Cell<usize>>> =
            (0..3).map(|_| Rc::new(Cell::new(0))).collect();
        let _connections: Vec<_> = interfaces
            .iter()
            .zip(&counts)
            .map(|(interface, count)| {
                let count = Rc::clone(count);
                interface.connect(move |_| count.set(count.get() + 1))
            })
            .collect();

        let mut expected: Vec<Option<i64>> = vec![None; 3];
        {
            let mut ctx = MultipleValueContext::new();
            for (target, value) in &writes {
                let index = target % 3;
                ctx.set(&nodes[index], *value);
                expected[index] = Some(*value);
            }
            ctx.commit();
        }

        for index in 0..3 {
            if let Some(value) = expected[index] {
                prop_assert_eq!(nodes[index].get(), value);
                prop_assert_eq!(counts[index].get(), 1);
            } else {
                prop_assert_eq!(nodes[index].get(), 0);
                prop_assert_eq!(counts[index].get(), 0);
            }
        }
    }
}
