//! The `Hub` world: roles, the battery store, the monitor and the RNG.

use std::collections::{BTreeMap, BTreeSet};

use hs_core::{BatteryId, HubConfig, Interval, OrderId, ResourceId, SimRng, SimTime};
use hs_kernel::{Scheduler, Store};

use crate::{Battery, BatterySample, BatteryStatus, HubError, HubResult, Monitor, Order};

// ── Role ──────────────────────────────────────────────────────────────────────

/// A kind of staff or equipment modelled as a resource pool.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Delivery specialist who picks and packs orders.
    Operator,
    Pilot,
    Drone,
    Charger,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Operator, Role::Pilot, Role::Drone, Role::Charger];

    pub fn name(self) -> &'static str {
        match self {
            Role::Operator => "operator",
            Role::Pilot    => "pilot",
            Role::Drone    => "drone",
            Role::Charger  => "charger",
        }
    }

    /// Pool size for this role under `config`.
    pub fn capacity(self, config: &HubConfig) -> usize {
        let n = match self {
            Role::Operator => config.num_delivery_specialists,
            Role::Pilot    => config.num_pilots,
            Role::Drone    => config.num_drones,
            Role::Charger  => config.num_chargers,
        };
        n as usize
    }
}

// ── Hub ───────────────────────────────────────────────────────────────────────

/// World state shared by every hub process.
///
/// A battery is always in exactly one place: stored (waiting or charging in
/// place), parked in the store for a flight that has not collected it yet,
/// or out on a flight in `deployed`.
pub struct Hub {
    pub config:    HubConfig,
    pub rng:       SimRng,
    pub batteries: Store<Battery>,
    pub monitor:   Monitor,
    /// Batteries currently out on a flight.
    pub(crate) deployed: BTreeMap<BatteryId, Battery>,
    /// Batteries with a charging process already under way.
    pub(crate) charging: BTreeSet<BatteryId>,
    roles:         [ResourceId; 4],
}

impl Hub {
    pub(crate) fn new(config: HubConfig, rng: SimRng, roles: [ResourceId; 4]) -> Self {
        let batteries = Store::new("battery store", config.battery_store_capacity);
        Self {
            config,
            rng,
            batteries,
            monitor:  Monitor::new(),
            deployed: BTreeMap::new(),
            charging: BTreeSet::new(),
            roles,
        }
    }

    pub(crate) fn set_roles(&mut self, roles: [ResourceId; 4]) {
        self.roles = roles;
    }

    /// The resource pool backing `role`.
    #[inline]
    pub fn resource(&self, role: Role) -> ResourceId {
        self.roles[role as usize]
    }

    /// Sample a duration from the config interval `pick` selects.
    pub fn draw(&mut self, pick: fn(&HubConfig) -> Interval) -> u64 {
        let interval = pick(&self.config);
        self.rng.draw(interval)
    }

    // ── Orders ────────────────────────────────────────────────────────────

    /// Record a new order created at `now`.
    pub fn create_order(&mut self, now: SimTime) -> OrderId {
        let id = OrderId(self.monitor.orders.len() as u32);
        self.monitor.orders.push(Order::new(id, now));
        id
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.monitor.orders.get(id.index())
    }

    pub(crate) fn order_mut(&mut self, id: OrderId) -> HubResult<&mut Order> {
        self.monitor.orders.get_mut(id.index()).ok_or(HubError::UnknownOrder(id))
    }

    // ── Batteries ─────────────────────────────────────────────────────────

    /// Look a battery up wherever it currently is.
    pub fn battery(&self, id: BatteryId) -> Option<&Battery> {
        self.all_batteries().find(|b| b.id == id)
    }

    /// Every battery of the hub, wherever it is.
    pub fn all_batteries(&self) -> impl Iterator<Item = &Battery> {
        self.batteries
            .items()
            .iter()
            .chain(self.batteries.parked())
            .chain(self.deployed.values())
    }

    /// Battery counts per status right now.
    pub fn census(&self) -> [usize; 5] {
        let mut counts = [0; 5];
        for b in self.all_batteries() {
            counts[b.status().index()] += 1;
        }
        counts
    }

    /// Append a census to the monitor's battery timeseries.
    pub(crate) fn sample_batteries(&mut self, at: SimTime) {
        let counts = self.census();
        self.monitor.battery_samples.push(BatterySample { at, counts });
    }

    /// Apply `f` to the stored battery `id`, then re-evaluate pending gets.
    pub(crate) fn update_stored<F>(&mut self, sched: &mut Scheduler, id: BatteryId, f: F) -> hs_core::SimResult<()>
    where
        F: FnOnce(&mut Battery) -> HubResult<()>,
    {
        match self.batteries.modify(sched, |b| b.id == id, f)? {
            Some(result) => Ok(result?),
            None => Err(HubError::BatteryMissing { battery: id }.into()),
        }
    }

    pub(crate) fn deployed_mut(&mut self, id: BatteryId) -> HubResult<&mut Battery> {
        self.deployed.get_mut(&id).ok_or(HubError::BatteryMissing { battery: id })
    }

    /// Stored batteries waiting for a charger with no charging process yet.
    pub(crate) fn unclaimed_discharged(&self) -> Vec<BatteryId> {
        self.batteries
            .items()
            .iter()
            .filter(|b| b.needs_charge() && !self.charging.contains(&b.id))
            .map(|b| b.id)
            .collect()
    }

    /// Number of batteries in `status`.
    pub fn count(&self, status: BatteryStatus) -> usize {
        self.census()[status.index()]
    }
}
