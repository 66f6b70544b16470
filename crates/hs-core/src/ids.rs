//! Typed identifiers for kernel slots and hub entities.
//!
//! Kernel ids (`EventId`, `ProcessId`, `ResourceId`) are dense indices into
//! the scheduler's tables, handed out in creation order.  Hub ids
//! (`BatteryId`, `OrderId`) are stable names that also appear in logs and
//! exported rows, printed with a one-letter prefix (`B3`, `O17`).

use std::fmt;

macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $prefix:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Placeholder for an id not assigned yet.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Position in the owning table.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;

            /// Id for table position `n`; fails past the id's integer range.
            fn try_from(index: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(index).map($name)
            }
        }
    };
}

typed_id! {
    /// Slot of an event in the scheduler's event table.
    pub struct EventId(u64) => "E";
}

typed_id! {
    /// Slot of a process in the environment's process table.
    pub struct ProcessId(u32) => "P";
}

typed_id! {
    /// Index of a capacity-bounded resource pool registered with the scheduler.
    pub struct ResourceId(u32) => "R";
}

typed_id! {
    /// Identity of one battery; stable for the whole run.
    pub struct BatteryId(u32) => "B";
}

typed_id! {
    /// Identity of one order, assigned in creation order.
    pub struct OrderId(u32) => "O";
}
