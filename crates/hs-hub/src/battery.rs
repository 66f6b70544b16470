//! Battery state machine.
//!
//! ```text
//!                 charger granted            charge time elapsed        same instant
//! ChargingQueue ─────────────────▶ ChargingActive ─────────────▶ ChargingInactive ─────────▶ DeploymentQueue
//!       ▲                                                                                         │
//!       │ same instant                 flight time elapsed                  drone + pilot granted  │
//!       └──────────── Deployed (discharged) ◀──────────── Deployed (charged) ◀─────────────────────┘
//! ```
//!
//! `status` is the only record of where a battery is.  Queue membership is
//! never tracked elsewhere, so a battery cannot sit in two queues at once.

use std::fmt;

use hs_core::BatteryId;

use crate::{HubError, HubResult};

/// Where a battery is in its charge/deploy cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BatteryStatus {
    ChargingQueue,
    ChargingActive,
    ChargingInactive,
    DeploymentQueue,
    Deployed,
}

impl BatteryStatus {
    pub const ALL: [BatteryStatus; 5] = [
        BatteryStatus::ChargingQueue,
        BatteryStatus::ChargingActive,
        BatteryStatus::ChargingInactive,
        BatteryStatus::DeploymentQueue,
        BatteryStatus::Deployed,
    ];

    /// Position in [`ALL`](Self::ALL); handy for per-status counters.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `true` for the two waiting states.
    pub fn is_queue(self) -> bool {
        matches!(self, BatteryStatus::ChargingQueue | BatteryStatus::DeploymentQueue)
    }

    /// Snake-case name used in exported data.
    pub fn as_str(self) -> &'static str {
        match self {
            BatteryStatus::ChargingQueue    => "charging_queue",
            BatteryStatus::ChargingActive   => "charging_active",
            BatteryStatus::ChargingInactive => "charging_inactive",
            BatteryStatus::DeploymentQueue  => "deployment_queue",
            BatteryStatus::Deployed         => "deployed",
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One swappable drone battery.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battery {
    pub id:  BatteryId,
    charged: bool,
    status:  BatteryStatus,
}

impl Battery {
    /// A battery placed in the queue matching its charge.
    pub fn new(id: BatteryId, charged: bool) -> Self {
        let status = if charged { BatteryStatus::DeploymentQueue } else { BatteryStatus::ChargingQueue };
        Self { id, charged, status }
    }

    #[inline]
    pub fn charged(&self) -> bool {
        self.charged
    }

    #[inline]
    pub fn status(&self) -> BatteryStatus {
        self.status
    }

    /// Ready to be handed to a flight.
    pub fn is_deployable(&self) -> bool {
        self.charged && self.status == BatteryStatus::DeploymentQueue
    }

    /// Waiting for a charger.
    pub fn needs_charge(&self) -> bool {
        !self.charged && self.status == BatteryStatus::ChargingQueue
    }

    /// `status` agrees with `charged`.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            BatteryStatus::ChargingQueue | BatteryStatus::ChargingActive => !self.charged,
            BatteryStatus::ChargingInactive | BatteryStatus::DeploymentQueue => self.charged,
            BatteryStatus::Deployed => true,
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// `ChargingQueue → ChargingActive`.  Only a discharged battery charges.
    pub fn begin_charge(&mut self) -> HubResult<()> {
        if self.charged {
            return Err(HubError::AlreadyCharged { battery: self.id });
        }
        self.require(BatteryStatus::ChargingQueue, BatteryStatus::ChargingActive)?;
        self.status = BatteryStatus::ChargingActive;
        Ok(())
    }

    /// `ChargingActive → ChargingInactive`, now charged.
    pub fn finish_charge(&mut self) -> HubResult<()> {
        self.require(BatteryStatus::ChargingActive, BatteryStatus::ChargingInactive)?;
        self.charged = true;
        self.status = BatteryStatus::ChargingInactive;
        Ok(())
    }

    /// `DeploymentQueue → Deployed`.  Only a charged battery flies.
    pub fn deploy(&mut self) -> HubResult<()> {
        if !self.charged {
            return Err(HubError::NotCharged { battery: self.id });
        }
        self.require(BatteryStatus::DeploymentQueue, BatteryStatus::Deployed)?;
        self.status = BatteryStatus::Deployed;
        Ok(())
    }

    /// End of a flight: the deployed battery is drained.
    pub fn discharge(&mut self) -> HubResult<()> {
        if !self.charged {
            return Err(HubError::NotCharged { battery: self.id });
        }
        self.require(BatteryStatus::Deployed, BatteryStatus::Deployed)?;
        self.charged = false;
        Ok(())
    }

    /// Move into the queue matching the current charge.
    ///
    /// Fails if the battery already waits in a queue.
    pub fn enqueue(&mut self) -> HubResult<BatteryStatus> {
        if self.status.is_queue() {
            return Err(HubError::AlreadyQueued { battery: self.id, status: self.status });
        }
        self.status = if self.charged { BatteryStatus::DeploymentQueue } else { BatteryStatus::ChargingQueue };
        Ok(self.status)
    }

    /// Queue a battery left idle after charging.  Returns `true` if it moved.
    pub fn settle(&mut self) -> bool {
        if self.status == BatteryStatus::ChargingInactive {
            self.status = BatteryStatus::DeploymentQueue;
            return true;
        }
        false
    }

    fn require(&self, from: BatteryStatus, to: BatteryStatus) -> HubResult<()> {
        if self.status != from {
            return Err(HubError::InvalidTransition { battery: self.id, from: self.status, to });
        }
        Ok(())
    }
}
