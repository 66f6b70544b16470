//! Order records and their forward-only status.

use hs_core::{OrderId, SimTime};

use crate::{HubError, HubResult};

/// Stage of an order in the fulfillment pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OrderStatus {
    Created,
    Started,
    PrepQueue,
    Prep,
    FlightQueue,
    Flight,
    Completed,
}

impl OrderStatus {
    /// The only status an order may move to from `self`.
    pub fn next(self) -> Option<OrderStatus> {
        use OrderStatus::*;
        match self {
            Created     => Some(Started),
            Started     => Some(PrepQueue),
            PrepQueue   => Some(Prep),
            Prep        => Some(FlightQueue),
            FlightQueue => Some(Flight),
            Flight      => Some(Completed),
            Completed   => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        use OrderStatus::*;
        match self {
            Created     => "created",
            Started     => "started",
            PrepQueue   => "prep_queue",
            Prep        => "prep",
            FlightQueue => "flight_queue",
            Flight      => "flight",
            Completed   => "completed",
        }
    }
}

/// One customer order and its per-stage timings, in minutes.
///
/// The prep stage spans the wait for an operator plus pick-pack; the
/// pick-pack fields cover the operator's work alone.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id:     OrderId,
    status:     OrderStatus,

    pub creation_time:   SimTime,
    pub start_time:      Option<SimTime>,
    pub completion_time: Option<SimTime>,
    pub total_duration:  Option<u64>,

    pub pickpack_start_time:     Option<SimTime>,
    pub pickpack_duration:       Option<u64>,
    /// Creation to pick-pack start.
    pub pickpack_queue_duration: Option<u64>,

    pub prep_start_time:     Option<SimTime>,
    pub prep_duration:       Option<u64>,
    /// Wait for an operator.
    pub prep_queue_duration: Option<u64>,

    pub flight_start_time:     Option<SimTime>,
    pub flight_duration:       Option<u64>,
    /// Wait for drone, pilot and a charged battery together.
    pub flight_queue_duration: Option<u64>,
}

impl Order {
    pub fn new(id: OrderId, creation_time: SimTime) -> Self {
        Self {
            id,
            status:                  OrderStatus::Created,
            creation_time,
            start_time:              None,
            completion_time:         None,
            total_duration:          None,
            pickpack_start_time:     None,
            pickpack_duration:       None,
            pickpack_queue_duration: None,
            prep_start_time:         None,
            prep_duration:           None,
            prep_queue_duration:     None,
            flight_start_time:       None,
            flight_duration:         None,
            flight_queue_duration:   None,
        }
    }

    #[inline]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    /// Move to `to`, which must be the next stage.
    pub fn advance(&mut self, to: OrderStatus) -> HubResult<()> {
        if self.status.next() != Some(to) {
            return Err(HubError::StatusRegression { order: self.id, from: self.status, to });
        }
        self.status = to;
        Ok(())
    }

    /// The stage timestamps that are set, in pipeline order.
    pub fn milestones(&self) -> Vec<SimTime> {
        [
            Some(self.creation_time),
            self.start_time,
            self.prep_start_time,
            self.pickpack_start_time,
            self.flight_start_time,
            self.completion_time,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
