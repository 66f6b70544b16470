//! Order processes: the generator and the per-order fulfillment pipeline.
//!
//! # Pipeline
//!
//! | Stage         | Waits on                                        | Holds              |
//! |---------------|-------------------------------------------------|--------------------|
//! | `PrepQueue`   | operator grant                                  | -                  |
//! | `Prep`        | pick-pack timeout                               | operator           |
//! | `FlightQueue` | `all_of(drone, pilot, deployable battery)`      | whatever is granted|
//! | `Flight`      | the battery's [`Deployment`] child              | drone, pilot       |
//!
//! The operator is released before the flight group is requested, so an
//! order never holds staff from both stages at once.

use log::info;

use hs_core::{EventId, OrderId, SimError, SimResult, SimTime};
use hs_kernel::{Environment, Process, ProcessContext, Step};

use crate::lifecycle::Deployment;
use crate::{Battery, Hub, OrderStatus, Role};

// ── OrderGenerator ────────────────────────────────────────────────────────────

/// Creates an order every order-creation interval and starts its pipeline.
#[derive(Default)]
pub struct OrderGenerator {
    waiting: bool,
}

impl OrderGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Process<Hub> for OrderGenerator {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Hub>, input: SimResult<()>) -> SimResult<Step> {
        input?;
        if self.waiting {
            let now = ctx.now();
            let id = ctx.world.create_order(now);
            ctx.spawn(format!("order {id}"), OrderPipeline::new(id))?;
        }
        self.waiting = true;
        let minutes = ctx.world.draw(|c| c.order_creation_interval);
        Ok(Step::Wait(ctx.timeout(minutes)))
    }
}

/// Create an order now and start its pipeline, outside any process.
pub fn place_order(env: &mut Environment<Hub>) -> SimResult<OrderId> {
    let now = env.now();
    let id = env.world_mut().create_order(now);
    env.spawn(format!("order {id}"), OrderPipeline::new(id))?;
    Ok(id)
}

// ── OrderPipeline ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Start,
    AwaitOperator,
    PickPack,
    AwaitFlightGroup { battery: EventId, since: SimTime },
    Flying,
}

/// Carries one order from creation to delivery.
pub struct OrderPipeline {
    order: OrderId,
    stage: Stage,
}

impl OrderPipeline {
    pub fn new(order: OrderId) -> Self {
        Self { order, stage: Stage::Start }
    }
}

impl Process<Hub> for OrderPipeline {
    fn resume(&mut self, ctx: &mut ProcessContext<'_, Hub>, input: SimResult<()>) -> SimResult<Step> {
        input?;
        let now = ctx.now();
        let id = self.order;

        match self.stage {
            Stage::Start => {
                let order = ctx.world.order_mut(id)?;
                order.advance(OrderStatus::Started)?;
                order.start_time = Some(now);
                order.advance(OrderStatus::PrepQueue)?;
                order.prep_start_time = Some(now);

                self.stage = Stage::AwaitOperator;
                let operator = ctx.world.resource(Role::Operator);
                Ok(Step::Wait(ctx.request(operator)?))
            }

            Stage::AwaitOperator => {
                let minutes = ctx.world.draw(|c| c.pick_pack_interval);
                let order = ctx.world.order_mut(id)?;
                order.advance(OrderStatus::Prep)?;
                order.pickpack_start_time = Some(now);
                order.pickpack_duration = Some(minutes);
                order.pickpack_queue_duration = Some(now.since(order.creation_time));
                order.prep_queue_duration = order.prep_start_time.map(|t| now.since(t));

                self.stage = Stage::PickPack;
                Ok(Step::Wait(ctx.timeout(minutes)))
            }

            Stage::PickPack => {
                let operator = ctx.world.resource(Role::Operator);
                ctx.release(operator)?;
                let order = ctx.world.order_mut(id)?;
                order.prep_duration = order.prep_start_time.map(|t| now.since(t));
                order.advance(OrderStatus::FlightQueue)?;

                let drone = ctx.world.resource(Role::Drone);
                let pilot = ctx.world.resource(Role::Pilot);
                let drone = ctx.request(drone)?;
                let pilot = ctx.request(pilot)?;
                let battery = ctx.world.batteries.get(ctx.sched, Battery::is_deployable)?;

                self.stage = Stage::AwaitFlightGroup { battery, since: now };
                Ok(Step::Wait(ctx.all_of(vec![drone, pilot, battery])?))
            }

            Stage::AwaitFlightGroup { battery, since } => {
                let mut battery = ctx.world.batteries.take(battery).ok_or(SimError::UnknownEvent(battery))?;
                battery.deploy()?;
                let battery_id = battery.id;
                ctx.world.deployed.insert(battery_id, battery);

                let minutes = ctx.world.draw(|c| c.flight_interval);
                let order = ctx.world.order_mut(id)?;
                order.advance(OrderStatus::Flight)?;
                order.flight_start_time = Some(now);
                order.flight_duration = Some(minutes);
                order.flight_queue_duration = Some(now.since(since));

                self.stage = Stage::Flying;
                let flight = ctx.spawn(format!("deploy {battery_id}"), Deployment::new(battery_id, minutes))?;
                Ok(Step::Wait(flight.event))
            }

            Stage::Flying => {
                let drone = ctx.world.resource(Role::Drone);
                let pilot = ctx.world.resource(Role::Pilot);
                ctx.release(drone)?;
                ctx.release(pilot)?;

                let order = ctx.world.order_mut(id)?;
                order.advance(OrderStatus::Completed)?;
                order.completion_time = Some(now);
                let total = now.since(order.creation_time);
                order.total_duration = Some(total);

                let monitor = &mut ctx.world.monitor;
                monitor.orders_delivered += 1;
                monitor.wait_times.push(total);
                monitor.delivery_times.push(now);
                info!("{now}: {id} delivered after {total} min");
                Ok(Step::Done)
            }
        }
    }
}
