//! Ordering engine
//!
//! Assigns the left-to-right order of the members of every bundle base.
//!
//! Algorithm
//! ---------
//!
//! 1. **Seed.** Every leg is seeded from one of its ends, the base with the smaller id; the base
//!    at the other end takes the mirror image, so no leg starts out twisted. Members are sorted by
//!    the clockwise angle of their tangent at the hub, measured from the left normal of the base
//!    direction. Standing at the hub and looking along the base, this is the left-to-right order
//!    of the fan. Members whose angles are equal are sorted by where their edges part: following
//!    the bundle outward, the first hub where they leave through different bases decides, by the
//!    clockwise order of those bases.
//!
//!    ```svgbob
//!                                  .---- a     a is the first base clockwise after the one
//!     a ====.                     /            the bundle arrives through, so a is left of b
//!            >=========== trunk =*             looking along the trunk toward the hub
//!     b ===='                     \
//!                                  `---- b
//!    ```
//!
//!    Edges that do not part ahead are compared the same way looking back through the hub.
//!    Remaining ties keep insertion order, as does a base whose geometry is degenerate.
//!
//! 2. **Count crossings.** A crossing is one of
//!    - a *leg conflict*: two segments share the bases at both ends of a leg, but their order at
//!      the far end is not the mirror image of their order at the near end;
//!    - a *hub crossing*: two edges pass through a hub and their entry/exit pairs interleave in
//!      the clockwise order of all segment ends around the hub;
//!    - a *fan inversion*: two members of one base are ordered against their tangent angles.
//!
//!    ```svgbob
//!     leg conflict                     hub crossing
//!
//!     a ----------.  .---------- a      a ---.     .--- b
//!                  \/                         \   /
//!     b ----------'  `---------- b             \ /
//!                                               *  hub
//!                                              / \
//!                                         b --'   `-- a
//!    ```
//!
//! 3. **Improve.** Adjacent members of a base are swapped, either alone or together with the
//!    matching swaps along the run of bases the pair travels through together. A move is kept only
//!    if it strictly reduces the crossing count, or keeps it and strictly reduces the curvature
//!    (the sum of the turning angles of every edge at every hub it passes through, with the
//!    lateral offsets taken into account). Swapping two neighbours only changes the terms that
//!    involve both of them, so a move is scored from those alone. Rounds repeat until nothing
//!    improves or the iteration budget runs out.
//!
//! 4. **Commit.** Every base is re-indexed `0..n` in the final order.
//!
//! Hubs are partitioned into independent components first; components are ordered in parallel
//! and each one sequentially.
use crate::algorithm::{partition, Component};
use crate::curve::ParametricCurve;
use crate::geometry::{angle_between, clockwise_angle, Point};
use crate::network::{BundleBaseId, BundleNetwork, HubId, SegmentId};
use crate::settings::BundlingSettings;
use rayon::prelude::*;
use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;

const CURVATURE_EPSILON: f64 = 1e-9;

/// Quality of an order. Crossings dominate; curvature breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrderingCost {
    pub crossings: usize,
    /// Sum of turning angles (radians) at intermediate hubs.
    pub curvature: f64,
}

impl OrderingCost {
    pub fn improves_on(&self, other: &OrderingCost) -> bool {
        self.crossings < other.crossings
            || (self.crossings == other.crossings
                && self.curvature < other.curvature - CURVATURE_EPSILON)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderingReport {
    /// Number of independent components that were ordered.
    pub components: usize,
    /// Candidate positions examined over all components.
    pub iterations: usize,
    pub initial_crossings: usize,
    pub crossings: usize,
    pub curvature: f64,
    /// `true` if some component ran out of its iteration budget.
    pub exhausted: bool,
}

/// Orders every bundle base of `network` in place.
#[tracing::instrument(skip_all)]
pub fn order_network(network: &mut BundleNetwork, settings: &BundlingSettings) -> OrderingReport {
    let components = partition(network);

    let results: Vec<ComponentOrder> = {
        let network = &*network;
        let seeder = Seeder::new(network, settings);
        if settings.parallel {
            components
                .par_iter()
                .map(|c| order_component(&seeder, c))
                .collect()
        } else {
            components
                .iter()
                .map(|c| order_component(&seeder, c))
                .collect()
        }
    };

    let mut report = OrderingReport {
        components: components.len(),
        ..OrderingReport::default()
    };
    for result in results {
        for (base, order) in &result.orders {
            network.set_order(*base, order);
        }
        report.iterations += result.iterations;
        report.initial_crossings += result.initial.crossings;
        report.crossings += result.cost.crossings;
        report.curvature += result.cost.curvature;
        report.exhausted |= result.exhausted;
    }

    tracing::debug!(
        components = report.components,
        iterations = report.iterations,
        initial_crossings = report.initial_crossings,
        crossings = report.crossings,
        "ordered bundle bases"
    );
    report
}

/// Cost of the order currently stored in `network`.
pub fn count_crossings(network: &BundleNetwork, settings: &BundlingSettings) -> OrderingCost {
    let component = Component {
        hubs: network.hubs().map(|h| h.id).collect(),
        bases: network.bases().map(|b| b.id).collect(),
    };
    OrderState::new(network, settings, &component, None).cost()
}

/// Initial order of `base`, before any swaps.
pub fn seed_order(
    network: &BundleNetwork,
    base: BundleBaseId,
    settings: &BundlingSettings,
) -> Vec<SegmentId> {
    Seeder::new(network, settings).order(base)
}

/// Seeds bundle bases from the network geometry.
struct Seeder<'n> {
    network: &'n BundleNetwork,
    settings: &'n BundlingSettings,
    // position of every base in the clockwise periphery of its hub, and the periphery length
    slot: HashMap<BundleBaseId, (usize, usize)>,
}

#[derive(Debug)]
struct SeedKey {
    id: SegmentId,
    run: usize,
    far_run: usize,
    ahead: Vec<usize>,
    behind: Vec<usize>,
}

impl<'n> Seeder<'n> {
    fn new(network: &'n BundleNetwork, settings: &'n BundlingSettings) -> Self {
        let mut slot = HashMap::with_capacity(network.bases().len());
        for hub in network.hubs() {
            let periphery = network.periphery(hub.id);
            let len = periphery.len();
            for (i, base) in periphery.into_iter().enumerate() {
                slot.insert(base, (i, len));
            }
        }
        Self {
            network,
            settings,
            slot,
        }
    }

    fn order(&self, base: BundleBaseId) -> Vec<SegmentId> {
        let Some(primary) = self.far_base(base).filter(|far| *far < base) else {
            return self.own_order(base);
        };
        let mut mirrored: Vec<SegmentId> = self
            .own_order(primary)
            .into_iter()
            .filter_map(|id| self.network.segment(id)?.other())
            .collect();
        mirrored.reverse();
        mirrored
    }

    /// The base holding the far end of every leg of `base`, if they all end in one base at
    /// another hub.
    fn far_base(&self, base: BundleBaseId) -> Option<BundleBaseId> {
        let bundle_base = self.network.base(base)?;
        let mut far = None;
        for id in bundle_base.segments() {
            let other = self.network.segment(*id)?.other()?;
            let end = self.network.segment(other)?.bundle_base();
            if far.map_or(false, |f| f != end) {
                return None;
            }
            far = Some(end);
        }
        let far = far?;
        let far_base = self.network.base(far)?;
        (far_base.hub != bundle_base.hub && far_base.len() == bundle_base.len()).then_some(far)
    }

    fn own_order(&self, base: BundleBaseId) -> Vec<SegmentId> {
        let Some(bundle_base) = self.network.base(base) else { return vec![] };

        // insertion order
        let mut members = bundle_base.segments().to_vec();
        members.sort();

        if members.len() < 2 {
            return members;
        }
        if bundle_base.is_degenerate() {
            tracing::warn!(base = %base, "degenerate bundle base keeps insertion order");
            return members;
        }
        let Some(runs) = self.angle_runs(base) else {
            tracing::warn!(base = %base, "degenerate segment in bundle base, keeping insertion order");
            return members;
        };
        // the far end of the legs only tells members apart where its own tangents differ
        let far_runs = self.far_base(base).and_then(|far| self.angle_runs(far));

        let mut keys: Vec<SeedKey> = members
            .iter()
            .map(|id| {
                let far_run = far_runs
                    .as_ref()
                    .and_then(|r| r.get(&self.network.segment(*id)?.other()?).copied());
                SeedKey {
                    id: *id,
                    run: runs.get(id).copied().unwrap_or(0),
                    far_run: far_run.unwrap_or(0),
                    ahead: self.ahead(*id),
                    behind: self.behind(*id),
                }
            })
            .collect();

        // far runs and the view back through the hub are seen from the other side: reversed
        keys.sort_by(|a, b| {
            a.run
                .cmp(&b.run)
                .then(b.far_run.cmp(&a.far_run))
                .then_with(|| a.ahead.cmp(&b.ahead))
                .then_with(|| b.behind.cmp(&a.behind))
                .then(a.id.cmp(&b.id))
        });
        keys.into_iter().map(|k| k.id).collect()
    }

    /// Index of every member's run of (nearly) equal tangent angles. `None` if the base has no
    /// direction or a member has no tangent.
    fn angle_runs(&self, base: BundleBaseId) -> Option<HashMap<SegmentId, usize>> {
        let bundle_base = self.network.base(base)?;
        if bundle_base.is_degenerate() {
            return None;
        }

        let reference = bundle_base.direction().left_normal();
        let mut angles = bundle_base
            .segments()
            .iter()
            .map(|id| {
                let tangent = self.network.segment(*id)?.hub_tangent()?;
                Some((*id, clockwise_angle(reference, tangent)))
            })
            .collect::<Option<Vec<_>>>()?;
        angles.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let mut runs = HashMap::with_capacity(angles.len());
        let mut run = 0;
        for i in 0..angles.len() {
            if i > 0 && angles[i].1 - angles[i - 1].1 > self.settings.angle_epsilon {
                run += 1;
            }
            runs.insert(angles[i].0, run);
        }
        Some(runs)
    }

    /// Where the edge of `id` goes after leaving its hub along `id`: at every hub it passes, the
    /// clockwise rank of the base it leaves through, counted from the base it arrives through.
    fn ahead(&self, id: SegmentId) -> Vec<usize> {
        let mut ranks = vec![];
        let mut current = id;

        for _ in 0..self.network.segments().len() {
            let Some(other) = self.network.segment(current).and_then(|s| s.other()) else {
                break;
            };
            // self-loops carry no order to another hub
            if self.network.hub_of(other) == self.network.hub_of(current) {
                break;
            }
            let Some(next) = self.network.segment(other).and_then(|s| s.through()) else {
                break;
            };
            ranks.push(self.rank(other, next));
            current = next;
        }
        ranks
    }

    /// Where the edge of `id` comes from, seen from the hub of `id`.
    fn behind(&self, id: SegmentId) -> Vec<usize> {
        let Some(through) = self.network.segment(id).and_then(|s| s.through()) else {
            return vec![];
        };
        let mut ranks = vec![self.rank(id, through)];
        ranks.extend(self.ahead(through));
        ranks
    }

    /// Clockwise distance around their hub from the base of `from` to the base of `to`.
    fn rank(&self, from: SegmentId, to: SegmentId) -> usize {
        let slot = |id: SegmentId| {
            let base = self.network.segment(id)?.bundle_base();
            self.slot.get(&base).copied()
        };
        match (slot(from), slot(to)) {
            (Some((p, len)), Some((q, _))) => (q + len - p) % len,
            _ => 0,
        }
    }
}

#[derive(Debug)]
struct ComponentOrder {
    orders: Vec<(BundleBaseId, Vec<SegmentId>)>,
    initial: OrderingCost,
    cost: OrderingCost,
    iterations: usize,
    exhausted: bool,
}

fn order_component(seeder: &Seeder<'_>, component: &Component) -> ComponentOrder {
    let (network, settings) = (seeder.network, seeder.settings);
    let mut state = OrderState::new(network, settings, component, Some(seeder));
    let initial = state.cost();
    let budget = settings.iteration_budget(component.segment_count(network));
    let (iterations, exhausted, cost) = state.improve(initial, budget);

    if exhausted {
        tracing::warn!(
            hubs = component.hubs.len(),
            iterations,
            crossings = cost.crossings,
            "ordering stopped at the iteration budget"
        );
    }

    ComponentOrder {
        orders: state.into_orders(),
        initial,
        cost,
        iterations,
        exhausted,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Other,
    Through,
}

impl Step {
    fn flip(self) -> Self {
        match self {
            Step::Other => Step::Through,
            Step::Through => Step::Other,
        }
    }
}

type Swaps = SmallVec<[(BundleBaseId, usize); 8]>;

/// Working copy of the orders of one component.
struct OrderState<'n> {
    network: &'n BundleNetwork,
    settings: &'n BundlingSettings,
    bases: Vec<BundleBaseId>,
    hubs: Vec<HubId>,
    periphery: HashMap<HubId, Vec<BundleBaseId>>,
    // number of segment ends around the hub that come before the base, clockwise
    cyclic: HashMap<BundleBaseId, usize>,
    order: HashMap<BundleBaseId, Vec<SegmentId>>,
    position: HashMap<SegmentId, usize>,
    // clockwise angle of the hub tangent; absent for degenerate geometry
    angle: HashMap<SegmentId, f64>,
}

impl<'n> OrderState<'n> {
    /// Starts from the seeded orders, or from the orders stored in `network` without a seeder.
    fn new(
        network: &'n BundleNetwork,
        settings: &'n BundlingSettings,
        component: &Component,
        seeder: Option<&Seeder<'_>>,
    ) -> Self {
        let mut order = HashMap::with_capacity(component.bases.len());
        let mut position = HashMap::new();
        let mut angle = HashMap::new();

        for base_id in &component.bases {
            let Some(base) = network.base(*base_id) else { continue };
            let members = match seeder {
                Some(seeder) => seeder.order(*base_id),
                None => base.segments().to_vec(),
            };

            for (i, id) in members.iter().enumerate() {
                position.insert(*id, i);
            }
            if !base.is_degenerate() {
                let reference = base.direction().left_normal();
                for id in &members {
                    let tangent = network.segment(*id).and_then(|s| s.hub_tangent());
                    if let Some(t) = tangent {
                        angle.insert(*id, clockwise_angle(reference, t));
                    }
                }
            }
            order.insert(*base_id, members);
        }

        let mut periphery = HashMap::with_capacity(component.hubs.len());
        let mut cyclic = HashMap::with_capacity(component.bases.len());
        for hub in &component.hubs {
            let bases = network.periphery(*hub);
            let mut total = 0;
            for base in &bases {
                cyclic.insert(*base, total);
                total += network.base(*base).map_or(0, |b| b.len());
            }
            periphery.insert(*hub, bases);
        }

        Self {
            network,
            settings,
            bases: component.bases.clone(),
            hubs: component.hubs.clone(),
            periphery,
            cyclic,
            order,
            position,
            angle,
        }
    }

    fn into_orders(self) -> Vec<(BundleBaseId, Vec<SegmentId>)> {
        let mut orders: Vec<_> = self.order.into_iter().collect();
        orders.sort_by_key(|(base, _)| *base);
        orders
    }

    fn position(&self, id: SegmentId) -> usize {
        self.position.get(&id).copied().unwrap_or(0)
    }

    fn base_of(&self, id: SegmentId) -> Option<BundleBaseId> {
        self.network.segment(id).map(|s| s.bundle_base())
    }

    fn hub_of_base(&self, id: BundleBaseId) -> Option<HubId> {
        self.network.base(id).map(|b| b.hub)
    }

    fn other(&self, id: SegmentId) -> Option<SegmentId> {
        self.network.segment(id)?.other()
    }

    fn swap(&mut self, base: BundleBaseId, k: usize) {
        let Some(members) = self.order.get_mut(&base) else { return };
        if k + 1 >= members.len() {
            return;
        }
        members.swap(k, k + 1);
        let (a, b) = (members[k], members[k + 1]);
        self.position.insert(a, k);
        self.position.insert(b, k + 1);
    }

    /// Swaps are within distinct bases, so applying the same set again reverts it.
    fn apply(&mut self, swaps: &Swaps) {
        for (base, k) in swaps {
            self.swap(*base, *k);
        }
    }

    /// Applies `swaps` and returns the change in crossings and curvature.
    fn apply_scored(&mut self, swaps: &Swaps) -> (isize, f64) {
        let mut crossings = 0;
        let mut curvature = 0.0;
        for (base, k) in swaps {
            let (c0, v0) = self.pair_cost(*base, *k);
            self.swap(*base, *k);
            let (c1, v1) = self.pair_cost(*base, *k);
            crossings += c1 as isize - c0 as isize;
            curvature += v1 - v0;
        }
        (crossings, curvature)
    }

    // -- Cost

    fn cost(&self) -> OrderingCost {
        let mut crossings = 0;
        let mut curvature = 0.0;

        for base in &self.bases {
            let Some(members) = self.order.get(base) else { continue };

            for i in 0..members.len() {
                // each leg pair is counted from its smaller base
                let counts_legs = self
                    .other(members[i])
                    .and_then(|o| self.base_of(o))
                    .map_or(false, |far| far > *base);

                for j in (i + 1)..members.len() {
                    let (a, b) = (members[i], members[j]);
                    crossings += usize::from(self.is_fan_inversion(a, b));
                    crossings += usize::from(counts_legs && self.legs_conflict(a, b));
                }
            }
        }

        for hub in &self.hubs {
            let chords = self.chords(*hub);
            for i in 0..chords.len() {
                for j in (i + 1)..chords.len() {
                    crossings += usize::from(chords_cross(&chords[i], &chords[j]));
                }
                curvature += self.turning_angle(chords[i].ends.0, chords[i].ends.1);
            }
        }

        OrderingCost {
            crossings,
            curvature,
        }
    }

    /// The part of the cost that depends on the relative order of members `k` and `k + 1` of
    /// `base`.
    fn pair_cost(&self, base: BundleBaseId, k: usize) -> (usize, f64) {
        let Some(members) = self.order.get(&base) else { return (0, 0.0) };
        let (Some(a), Some(b)) = (members.get(k).copied(), members.get(k + 1).copied()) else {
            return (0, 0.0);
        };

        let mut crossings =
            usize::from(self.is_fan_inversion(a, b)) + usize::from(self.legs_conflict(a, b));
        if let (Some(ca), Some(cb)) = (self.chord_of(a), self.chord_of(b)) {
            if ca.ends != cb.ends && chords_cross(&ca, &cb) {
                crossings += 1;
            }
        }

        // the offsets of `a` and `b` bend their own chords and those at the far end of their legs
        let mut touched: SmallVec<[(SegmentId, SegmentId); 4]> = SmallVec::new();
        for id in [Some(a), Some(b), self.other(a), self.other(b)]
            .into_iter()
            .flatten()
        {
            if let Some(chord) = self.chord_of(id) {
                if !touched.contains(&chord.ends) {
                    touched.push(chord.ends);
                }
            }
        }
        let curvature = touched
            .iter()
            .map(|(x, y)| self.turning_angle(*x, *y))
            .sum::<f64>();

        (crossings, curvature)
    }

    /// `a` is left of `b` although its tangent is further clockwise.
    fn is_fan_inversion(&self, a: SegmentId, b: SegmentId) -> bool {
        let (Some(ta), Some(tb)) = (self.angle.get(&a), self.angle.get(&b)) else {
            return false;
        };
        ta - tb > self.settings.angle_epsilon
    }

    /// `a` and `b` share a base at both ends of their legs, and their order at the far end is
    /// not the mirror image of their order here.
    fn legs_conflict(&self, a: SegmentId, b: SegmentId) -> bool {
        let (Some(oa), Some(ob)) = (self.other(a), self.other(b)) else {
            return false;
        };
        let (Some(far_a), Some(far_b)) = (self.base_of(oa), self.base_of(ob)) else {
            return false;
        };
        // self-loops have no far hub
        let near_hub = self.base_of(a).and_then(|base| self.hub_of_base(base));
        if far_a != far_b || self.hub_of_base(far_a) == near_hub {
            return false;
        }
        (self.position(a) < self.position(b)) == (self.position(oa) < self.position(ob))
    }

    /// Position of `id` in the clockwise order of all segment ends around its hub.
    fn cyclic(&self, id: SegmentId) -> Option<usize> {
        let base = self.base_of(id)?;
        Some(self.cyclic.get(&base)? + self.position(id))
    }

    /// The edge passing through the hub of `id`, if it does, as a chord between its two ends.
    fn chord_of(&self, id: SegmentId) -> Option<Chord> {
        let through = self.network.segment(id)?.through()?;
        let (p, q) = (self.cyclic(id)?, self.cyclic(through)?);
        Some(Chord {
            span: (p.min(q), p.max(q)),
            ends: (id.min(through), id.max(through)),
        })
    }

    fn chords(&self, hub: HubId) -> Vec<Chord> {
        let Some(periphery) = self.periphery.get(&hub) else { return vec![] };
        periphery
            .iter()
            .filter_map(|base| self.order.get(base))
            .flatten()
            .filter_map(|id| self.chord_of(*id).filter(|chord| chord.ends.0 == *id))
            .collect()
    }

    fn offset(&self, id: SegmentId) -> Point {
        let Some(base) = self.base_of(id).and_then(|b| self.network.base(b)) else {
            return Point::zero();
        };
        let lateral = base.lateral_offset(self.position(id), self.settings.spacing);
        base.direction().left_normal() * lateral
    }

    /// Velocity leaving the hub along `id`, including the drift between the lateral offsets at
    /// both ends of its leg.
    fn outward_velocity(&self, id: SegmentId) -> Option<Point> {
        let segment = self.network.segment(id)?;
        let par_end = segment.par_end();
        let mut velocity = segment.derivative(0.0);

        if par_end > 0.0 {
            let far = segment.other().map_or(Point::zero(), |o| self.offset(o));
            velocity = velocity + (far - self.offset(id)) * (1.0 / par_end);
        }
        velocity.normalize().or_else(|| segment.hub_tangent())
    }

    fn turning_angle(&self, a: SegmentId, b: SegmentId) -> f64 {
        match (self.outward_velocity(a), self.outward_velocity(b)) {
            (Some(va), Some(vb)) => angle_between(-va, vb),
            _ => 0.0,
        }
    }

    // -- Moves

    /// The swap of members `k`, `k + 1` of `base`, extended over the bases both segments reach
    /// together through their legs and through hubs.
    fn run_swaps(&self, base: BundleBaseId, k: usize) -> Swaps {
        let mut swaps: Swaps = smallvec![(base, k)];
        let Some(members) = self.order.get(&base) else { return swaps };
        let (a, b) = (members[k], members[k + 1]);
        let mut visited: SmallVec<[BundleBaseId; 8]> = smallvec![base];

        for first in [Step::Other, Step::Through] {
            let (mut x, mut y) = (a, b);
            let mut step = first;

            loop {
                let (Some(sx), Some(sy)) = (self.network.segment(x), self.network.segment(y)) else {
                    break;
                };
                let next = match step {
                    Step::Other => (sx.other(), sy.other()),
                    Step::Through => (sx.through(), sy.through()),
                };
                let (Some(nx), Some(ny)) = next else { break };
                let (Some(bx), Some(by)) = (self.base_of(nx), self.base_of(ny)) else { break };
                if bx != by || visited.contains(&bx) {
                    break;
                }
                if step == Step::Other && self.hub_of_base(bx) == self.hub_of_base(sx.bundle_base()) {
                    break;
                }
                let (px, py) = (self.position(nx), self.position(ny));
                if px.abs_diff(py) != 1 {
                    break;
                }

                swaps.push((bx, px.min(py)));
                visited.push(bx);
                x = nx;
                y = ny;
                step = step.flip();
            }
        }
        swaps
    }

    /// Local search. Returns iterations used, whether the budget ran out, and the final cost.
    fn improve(&mut self, initial: OrderingCost, budget: usize) -> (usize, bool, OrderingCost) {
        let mut best = initial;
        let mut iterations = 0;

        loop {
            let mut improved = false;

            for bi in 0..self.bases.len() {
                let base = self.bases[bi];
                let len = self.order.get(&base).map_or(0, |m| m.len());

                for k in 0..len.saturating_sub(1) {
                    if iterations >= budget {
                        return (iterations, true, self.cost());
                    }
                    iterations += 1;

                    let single: Swaps = smallvec![(base, k)];
                    let run = self.run_swaps(base, k);
                    let mut candidates: SmallVec<[Swaps; 2]> = smallvec![single];
                    if run.len() > 1 {
                        candidates.push(run);
                    }

                    for swaps in candidates {
                        let (crossings, curvature) = self.apply_scored(&swaps);
                        let cost = OrderingCost {
                            crossings: best.crossings.saturating_add_signed(crossings),
                            curvature: best.curvature + curvature,
                        };
                        if cost.improves_on(&best) {
                            tracing::trace!(
                                base = %base,
                                position = k,
                                swaps = swaps.len(),
                                crossings = cost.crossings,
                                curvature = cost.curvature,
                                "accepted swap"
                            );
                            best = cost;
                            improved = true;
                            break;
                        }
                        self.apply(&swaps);
                    }
                }
            }

            if !improved {
                // rescored from scratch so rounding in the running total does not leak out
                return (iterations, false, self.cost());
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Chord {
    span: (usize, usize),
    ends: (SegmentId, SegmentId),
}

fn chords_cross(a: &Chord, b: &Chord) -> bool {
    let (lo, hi) = a.span;
    let inside = |p: usize| lo < p && p < hi;
    inside(b.span.0) != inside(b.span.1)
}
