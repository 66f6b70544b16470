//! Battery processes: charging, flight deployment and the periodic store scan.

use log::debug;

use hs_core::{BatteryId, SimResult};
use hs_kernel::{Process, ProcessContext, Step};

use crate::{Hub, HubError, Role};

// ── ChargeBattery ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChargeStage {
    Start,
    Granted,
    Charged,
    Settled,
}

/// Charge one stored battery on a charger.
///
/// The battery stays in the store throughout; its status changes in place, and
/// the last change (into `DeploymentQueue`) can satisfy a waiting flight.
pub struct ChargeBattery {
    battery: BatteryId,
    stage:   ChargeStage,
}

impl ChargeBattery {
    pub fn new(battery: BatteryId) -> Self {
        Self { battery, stage: ChargeStage::Start }
    }
}

impl Process<Hub> for ChargeBattery {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Hub>, input: SimResult<()>) -> SimResult<Step> {
        let step = self.advance(ctx, input);
        if step.is_err() {
            // Free the claim so a later scan can retry this battery.
            ctx.world.charging.remove(&self.battery);
        }
        step
    }
}

impl ChargeBattery {
    fn advance(&mut self, ctx: &mut ProcessContext<'_, Hub>, input: SimResult<()>) -> SimResult<Step> {
        input?;
        let id = self.battery;
        match self.stage {
            ChargeStage::Start => {
                self.stage = ChargeStage::Granted;
                let charger = ctx.world.resource(Role::Charger);
                Ok(Step::Wait(ctx.request(charger)?))
            }
            ChargeStage::Granted => {
                ctx.world.update_stored(ctx.sched, id, |b| b.begin_charge())?;
                let minutes = ctx.world.draw(|c| c.charge_interval);
                debug!("{}: {id} charging for {minutes} min", ctx.now());
                self.stage = ChargeStage::Charged;
                Ok(Step::Wait(ctx.timeout(minutes)))
            }
            ChargeStage::Charged => {
                ctx.world.update_stored(ctx.sched, id, |b| b.finish_charge())?;
                self.stage = ChargeStage::Settled;
                Ok(Step::Wait(ctx.timeout(0)))
            }
            ChargeStage::Settled => {
                ctx.world.update_stored(ctx.sched, id, |b| b.enqueue().map(drop))?;
                debug!("{}: {id} charged and queued for deployment", ctx.now());
                ctx.world.monitor.batteries_charged += 1;
                ctx.world.charging.remove(&id);
                let charger = ctx.world.resource(Role::Charger);
                ctx.release(charger)?;
                Ok(Step::Done)
            }
        }
    }
}

// ── Deployment ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeployStage {
    Start,
    Flown,
    Landed,
}

/// Fly a deployed battery for `minutes`, then return it drained to the store.
pub struct Deployment {
    battery: BatteryId,
    minutes: u64,
    stage:   DeployStage,
}

impl Deployment {
    pub fn new(battery: BatteryId, minutes: u64) -> Self {
        Self { battery, minutes, stage: DeployStage::Start }
    }
}

impl Process<Hub> for Deployment {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Hub>, input: SimResult<()>) -> SimResult<Step> {
        input?;
        let id = self.battery;
        match self.stage {
            DeployStage::Start => {
                ctx.world.deployed_mut(id)?;
                self.stage = DeployStage::Flown;
                Ok(Step::Wait(ctx.timeout(self.minutes)))
            }
            DeployStage::Flown => {
                ctx.world.deployed_mut(id)?.discharge()?;
                self.stage = DeployStage::Landed;
                Ok(Step::Wait(ctx.timeout(0)))
            }
            DeployStage::Landed => {
                let hub = &mut *ctx.world;
                let mut battery = hub.deployed.remove(&id).ok_or(HubError::BatteryMissing { battery: id })?;
                battery.enqueue()?;
                hub.batteries.put(ctx.sched, battery)?;

                let now = ctx.sched.now();
                hub.monitor.batteries_discharged += 1;
                hub.monitor.discharge_times.push(now);
                debug!("{now}: {id} back from flight, queued for charging");
                Ok(Step::Done)
            }
        }
    }
}

// ── BatteryMonitor ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanStage {
    Sleep,
    Scan,
    Batch,
}

/// Background loop over the battery store.
///
/// Every scan interval it queues batteries left idle after charging, records
/// a battery census, and starts a [`ChargeBattery`] for each discharged
/// battery not yet being charged.  It then waits for that batch to finish
/// before sleeping until the next scan.
pub struct BatteryMonitor {
    stage: ScanStage,
}

impl BatteryMonitor {
    pub fn new() -> Self {
        Self { stage: ScanStage::Sleep }
    }

    fn sleep(&mut self, ctx: &mut ProcessContext<'_, Hub>) -> SimResult<Step> {
        self.stage = ScanStage::Scan;
        let minutes = ctx.world.draw(|c| c.battery_queue_interval);
        Ok(Step::Wait(ctx.timeout(minutes)))
    }

    fn scan(&mut self, ctx: &mut ProcessContext<'_, Hub>) -> SimResult<Step> {
        let now = ctx.now();
        ctx.world.batteries.modify_all(ctx.sched, |b| {
            b.settle();
        })?;
        ctx.world.sample_batteries(now);

        let mut started = Vec::new();
        for id in ctx.world.unclaimed_discharged() {
            ctx.world.charging.insert(id);
            let handle = ctx.spawn(format!("charge {id}"), ChargeBattery::new(id))?;
            started.push(handle.event);
        }
        if !started.is_empty() {
            debug!("{now}: scan started {} charging process(es)", started.len());
        }

        self.stage = ScanStage::Batch;
        Ok(Step::Wait(ctx.all_of(started)?))
    }
}

impl Default for BatteryMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Process<Hub> for BatteryMonitor {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Hub>, input: SimResult<()>) -> SimResult<Step> {
        input?;
        match self.stage {
            ScanStage::Sleep | ScanStage::Batch => self.sleep(ctx),
            ScanStage::Scan => self.scan(ctx),
        }
    }
}
