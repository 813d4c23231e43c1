//! Order in which element instances are offered to the placement search.
use std::collections::HashMap;

use rand::RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Element;
use crate::random::shuffle;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacementOrder {
    /// Elements in the order given, all instances of one element together.
    #[default]
    Declaration,
    /// Largest footprint first; ties keep declaration order.
    LargestFirst,
    /// Random permutation of all instances.
    Shuffled,
}

/// One instance waiting to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingInstance {
    /// Index into the element list.
    pub element: usize,
    /// One-based instance number.
    pub instance: u32,
}

/// Expands quantities into a list of instances in the requested order.
///
/// Centered elements always come first, in declaration order.
pub fn instance_order(
    elements: &[Element],
    quantities: &HashMap<String, u32>,
    order: PlacementOrder,
    rng: &mut dyn RngCore,
) -> Vec<PendingInstance> {
    let expand = |centered: bool| -> Vec<PendingInstance> {
        elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.centered == centered)
            .flat_map(|(i, e)| {
                let quantity = quantities.get(&e.name).copied().unwrap_or(0);
                (1..=quantity).map(move |instance| PendingInstance {
                    element: i,
                    instance,
                })
            })
            .collect()
    };

    let mut out = expand(true);
    let mut rest = expand(false);
    match order {
        PlacementOrder::Declaration => {}
        PlacementOrder::LargestFirst => {
            rest.sort_by_key(|p| std::cmp::Reverse(elements[p.element].area()));
        }
        PlacementOrder::Shuffled => shuffle(rng, &mut rest),
    }
    out.append(&mut rest);
    out
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::grid::TileLayer;

    fn element(name: &str, w: u32, h: u32) -> Element {
        Element::new(name, vec![TileLayer::filled(format!("{name}-base"), w, h, 1)]).unwrap()
    }

    fn quantities(entries: &[(&str, u32)]) -> HashMap<String, u32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn declaration_order_groups_instances() {
        let elements = vec![element("a", 1, 1), element("b", 3, 3)];
        let mut rng = StdRng::seed_from_u64(1);
        let order = instance_order(
            &elements,
            &quantities(&[("a", 2), ("b", 1)]),
            PlacementOrder::Declaration,
            &mut rng,
        );
        let flat: Vec<(usize, u32)> = order.iter().map(|p| (p.element, p.instance)).collect();
        assert_eq!(flat, vec![(0, 1), (0, 2), (1, 1)]);
    }

    #[test]
    fn largest_first_is_stable() {
        let elements = vec![element("a", 1, 1), element("b", 3, 3), element("c", 3, 3)];
        let mut rng = StdRng::seed_from_u64(1);
        let order = instance_order(
            &elements,
            &quantities(&[("a", 1), ("b", 1), ("c", 1)]),
            PlacementOrder::LargestFirst,
            &mut rng,
        );
        let flat: Vec<usize> = order.iter().map(|p| p.element).collect();
        assert_eq!(flat, vec![1, 2, 0]);
    }

    #[test]
    fn shuffled_preserves_quantities_and_centered_first() {
        let mut elements = vec![element("a", 1, 1), element("b", 2, 2), element("plaza", 3, 3)];
        elements[2].centered = true;
        let mut rng = StdRng::seed_from_u64(9);
        let order = instance_order(
            &elements,
            &quantities(&[("a", 4), ("b", 3), ("plaza", 1)]),
            PlacementOrder::Shuffled,
            &mut rng,
        );
        assert_eq!(order[0].element, 2);
        assert_eq!(order.iter().filter(|p| p.element == 0).count(), 4);
        assert_eq!(order.iter().filter(|p| p.element == 1).count(), 3);
    }

    #[test]
    fn elements_without_quantity_are_skipped() {
        let elements = vec![element("a", 1, 1)];
        let mut rng = StdRng::seed_from_u64(1);
        let order = instance_order(&elements, &HashMap::new(), PlacementOrder::Declaration, &mut rng);
        assert!(order.is_empty());
    }
}
