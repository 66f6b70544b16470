//! Fluent builder for a ready-to-run hub [`Environment`].

use log::info;

use hs_core::{BatteryId, HubConfig, ResourceId, SimError, SimRng, SimResult, SimTime};
use hs_kernel::{Environment, FailurePolicy};

use crate::{Battery, BatteryMonitor, Hub, OrderGenerator, Role};

/// Fluent builder for `Environment<Hub>`.
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                                        |
/// |-----------------------|------------------------------------------------|
/// | `.initial_charge(v)`  | One fair coin flip per battery                 |
/// | `.background(false)`  | Order generator and battery scan are spawned   |
///
/// # Example
///
/// ```rust,ignore
/// let mut env = HubBuilder::new(HubConfig::default()).build()?;
/// env.run(Some(SimTime(env.world().config.operating_minutes)))?;
/// println!("{} orders delivered", env.world().monitor.orders_delivered);
/// ```
pub struct HubBuilder {
    config:         HubConfig,
    initial_charge: Option<Vec<bool>>,
    background:     bool,
}

impl HubBuilder {
    pub fn new(config: HubConfig) -> Self {
        Self { config, initial_charge: None, background: true }
    }

    /// Fix the initial charge of each battery (must be length `num_batteries`).
    pub fn initial_charge(mut self, charged: Vec<bool>) -> Self {
        self.initial_charge = Some(charged);
        self
    }

    /// Whether to spawn the order generator and the battery scan.  Without
    /// them the hub stays idle until processes are spawned by hand.
    pub fn background(mut self, enabled: bool) -> Self {
        self.background = enabled;
        self
    }

    /// Validate the config, create the role pools, stock the battery store
    /// and spawn the background processes.
    pub fn build(self) -> SimResult<Environment<Hub>> {
        let config = self.config;
        config.validate()?;

        let mut rng = if config.randomize { SimRng::from_entropy() } else { SimRng::new(config.seed) };
        info!("hub seed {}", rng.seed());

        let count = config.num_batteries as usize;
        let charged = match self.initial_charge {
            Some(v) if v.len() != count => {
                return Err(SimError::Config(format!(
                    "initial_charge has {} entries for {count} batteries",
                    v.len()
                )));
            }
            Some(v) => v,
            None => (0..count).map(|_| rng.gen_bool(0.5)).collect(),
        };

        let policy = if config.abort_on_failure { FailurePolicy::Abort } else { FailurePolicy::Isolate };
        let mut env = Environment::new(Hub::new(config, rng, [ResourceId::INVALID; 4])).with_failure_policy(policy);

        let roles = Role::ALL.map(|role| {
            let capacity = role.capacity(&env.world().config);
            env.add_resource(role.name(), capacity)
        });
        let (sched, hub) = env.parts_mut();
        hub.set_roles(roles);
        for (i, charged) in charged.into_iter().enumerate() {
            hub.batteries.put(sched, Battery::new(BatteryId(i as u32), charged))?;
        }

        if self.background {
            env.spawn("order generator", OrderGenerator::new())?;
            env.spawn("battery monitor", BatteryMonitor::new())?;
        }
        Ok(env)
    }
}

/// Build a hub from `config` and run one operating day.
///
/// The environment is returned even when the day is cut short by an aborting
/// failure, so the monitor gathered so far stays inspectable.
pub fn run_day(config: HubConfig) -> SimResult<(Environment<Hub>, SimResult<()>)> {
    let until = SimTime(config.operating_minutes);
    let mut env = HubBuilder::new(config).build()?;
    let outcome = env.run(Some(until));
    Ok((env, outcome))
}
