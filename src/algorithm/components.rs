use crate::network::{BundleBaseId, BundleNetwork, HubId};
use fixedbitset::FixedBitSet;
use petgraph::unionfind::UnionFind;

/// Hubs whose orders can interact, together with the bases they own.
///
/// Two hubs interact when a leg connects them (a segment at one hub has its `other` at the
/// other). Orders of different components never influence each other, so components can be
/// processed independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub hubs: Vec<HubId>,
    pub bases: Vec<BundleBaseId>,
}

impl Component {
    pub fn segment_count(&self, network: &BundleNetwork) -> usize {
        self.bases
            .iter()
            .filter_map(|b| network.base(*b))
            .map(|b| b.len())
            .sum()
    }
}

/// Splits the hub adjacency graph into connected components.
///
/// Hubs without any segment are left out. Components are ordered by their smallest hub id and
/// list hubs and bases in ascending id order, so the partition is deterministic.
pub fn partition(network: &BundleNetwork) -> Vec<Component> {
    let n = network.hubs().len();
    let mut sets: UnionFind<usize> = UnionFind::new(n);
    let mut occupied = FixedBitSet::with_capacity(n);

    for segment in network.segments() {
        let Some(hub) = network.hub_of(segment.id) else { continue };
        occupied.insert(hub.index());

        let Some(other) = segment.other() else { continue };
        let Some(far) = network.hub_of(other) else { continue };
        sets.union(hub.index(), far.index());
    }

    let labels = sets.into_labeling();
    let mut by_root: Vec<Option<usize>> = vec![None; n];
    let mut components: Vec<Component> = vec![];

    for hub in occupied.ones() {
        let root = labels[hub];
        let slot = match by_root[root] {
            Some(slot) => slot,
            None => {
                components.push(Component {
                    hubs: vec![],
                    bases: vec![],
                });
                by_root[root] = Some(components.len() - 1);
                components.len() - 1
            }
        };

        let hub_id = HubId::from_index(hub);
        let component = &mut components[slot];
        component.hubs.push(hub_id);
        if let Some(h) = network.hub(hub_id) {
            component.bases.extend(h.bases());
        }
    }

    for component in components.iter_mut() {
        component.bases.sort();
    }
    components
}
