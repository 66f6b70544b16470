use thiserror::Error;

use hs_core::{BatteryId, OrderId, SimError};

use crate::{BatteryStatus, OrderStatus};

/// State-machine violations raised by batteries and orders.
///
/// Each converts into [`SimError::Invariant`] so it fails the process that
/// attempted the transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("cannot charge {battery}: already charged")]
    AlreadyCharged { battery: BatteryId },

    #[error("cannot discharge or deploy {battery}: not charged")]
    NotCharged { battery: BatteryId },

    #[error("cannot queue {battery}: already in {status:?}")]
    AlreadyQueued { battery: BatteryId, status: BatteryStatus },

    #[error("{battery} cannot move from {from:?} to {to:?}")]
    InvalidTransition { battery: BatteryId, from: BatteryStatus, to: BatteryStatus },

    #[error("{order} cannot move from {from:?} to {to:?}")]
    StatusRegression { order: OrderId, from: OrderStatus, to: OrderStatus },

    #[error("{battery} is not where it should be")]
    BatteryMissing { battery: BatteryId },

    #[error("order {0} does not exist")]
    UnknownOrder(OrderId),
}

impl HubError {
    /// The battery or order the violation is about.
    pub fn entity(&self) -> String {
        match self {
            HubError::AlreadyCharged { battery }
            | HubError::NotCharged { battery }
            | HubError::AlreadyQueued { battery, .. }
            | HubError::InvalidTransition { battery, .. }
            | HubError::BatteryMissing { battery } => battery.to_string(),
            HubError::StatusRegression { order, .. } | HubError::UnknownOrder(order) => order.to_string(),
        }
    }
}

impl From<HubError> for SimError {
    fn from(e: HubError) -> Self {
        SimError::invariant(e.entity(), e.to_string())
    }
}

pub type HubResult<T> = Result<T, HubError>;
