use std::fmt;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::{HospitalDirectory, SchedulerError};

/// The nest every flight launches from and returns to
pub static BASE: Lazy<Hospital> = Lazy::new(|| Hospital {
    name: HospitalName("BASE".to_string()),
    north_m: 0,
    east_m: 0,
});

/// Urgency class of an order. Declaration order is launch order, so
/// `Emergency < Resupply` and the derived `Ord` is the priority comparator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Emergency,
    Resupply,
}

impl<'a> TryFrom<&'a str> for Priority {
    type Error = SchedulerError;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        match s {
            "Emergency" => Ok(Self::Emergency),
            "Resupply" => Ok(Self::Resupply),
            other => Err(SchedulerError::InvalidOrder {
                reason: format!("unknown priority `{}`", other),
            }),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emergency => write!(f, "Emergency"),
            Self::Resupply => write!(f, "Resupply"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct HospitalName(String);

impl HospitalName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HospitalName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for HospitalName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for HospitalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `Hospital` to which aircraft deliver orders
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Hospital {
    /// The name of the hospital
    pub name: HospitalName,
    /// Hospital's y-offset from the base in meters
    pub north_m: i64,
    /// Hospital's x-offset from the base in meters
    pub east_m: i64,
}

impl Hospital {
    pub fn new(name: impl Into<HospitalName>, north_m: i64, east_m: i64) -> Self {
        Self {
            name: name.into(),
            north_m,
            east_m,
        }
    }

    /// Returns the hospital's distance from another hospital in meters
    pub fn distance_from_other(&self, other: &Self) -> f64 {
        // TODO: switch to a fixed-point distance type if sub-meter precision starts to matter
        let north = (self.north_m - other.north_m) as f64;
        let east = (self.east_m - other.east_m) as f64;
        (north * north + east * east).sqrt()
    }

    /// Returns the hospital's distance from the base in meters
    pub fn distance_from_base(&self) -> f64 {
        self.distance_from_other(&BASE)
    }

    /// Out-and-back distance from the base, rounded up to whole meters
    pub fn round_trip_m(&self) -> u64 {
        (2.0 * self.distance_from_base()).ceil() as u64
    }
}

/// Identity of a queued order: the sequence number it was assigned at intake.
/// Later intake always receives a larger id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An order as handed over by the intake layer, before validation
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OrderRequest {
    /// Arrival time in __seconds__ _since midnight_
    pub time: i64,
    /// Name of the destination hospital
    pub hospital: String,
    /// Priority token, `Emergency` or `Resupply`
    pub priority: String,
}

impl OrderRequest {
    pub fn new(time: i64, hospital: &str, priority: &str) -> Self {
        Self {
            time,
            hospital: hospital.to_string(),
            priority: priority.to_string(),
        }
    }
}

/// An `Order` is a validated request for delivery of _something_ to a particular `Hospital`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    /// Intake sequence number, used as identity and as the final tie-break
    pub id: OrderId,
    /// Time in __seconds__ _since midnight_ that the order was received
    pub received_time: u64,
    /// Hospital the order is delivered to
    pub destination: HospitalName,
    /// Priority of the order, used by scheduling logic
    pub priority: Priority,
    /// Round-trip distance in meters a flight carrying this order consumes
    pub required_budget_m: u64,
}

impl Order {
    /// Validates an intake record, resolving its destination through `directory`.
    /// Nothing is constructed unless every field checks out.
    pub fn from_request<D>(
        id: OrderId,
        request: OrderRequest,
        directory: &D,
    ) -> Result<Self, SchedulerError>
    where
        D: HospitalDirectory + ?Sized,
    {
        let received_time = u64::try_from(request.time).map_err(|_| SchedulerError::InvalidOrder {
            reason: format!("negative received time {}", request.time),
        })?;
        let priority = Priority::try_from(request.priority.as_str())?;
        let destination = HospitalName::from(request.hospital);
        let required_budget_m = directory
            .round_trip_m(&destination)
            .ok_or_else(|| SchedulerError::UnknownHospital(destination.clone()))?;

        Ok(Self {
            id,
            received_time,
            destination,
            priority,
            required_budget_m,
        })
    }

    /// Sort key of the launch order: priority, then arrival, then intake sequence
    pub fn launch_key(&self) -> (Priority, u64, OrderId) {
        (self.priority, self.received_time, self.id)
    }
}

/// Index of an aircraft within the `FleetAvailability` snapshot it was drawn from
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AircraftSlot(pub usize);

impl fmt::Display for AircraftSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot {}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flight {
    /// The order carried by the flight
    pub order: Order,
    /// The aircraft consumed by the flight
    pub aircraft: AircraftSlot,
    /// Time in __seconds__ _since midnight_ that the flight was launched
    pub launch_time: u64,
}

impl Flight {
    /// Returns the time that the flight will arrive back at the base
    pub fn return_time(&self, speed_mps: u64) -> u64 {
        self.launch_time + self.order.required_budget_m.div_ceil(speed_mps.max(1))
    }
}

/// Aircraft free to launch at a single tick, as reported by the caller.
/// Values are signed so that malformed reports can be rejected rather than wrapped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FleetAvailability {
    /// Number of aircraft free to launch
    pub count: i64,
    /// Remaining budget in meters of each free aircraft, indexed by `AircraftSlot`
    pub budgets_m: Vec<i64>,
}

impl FleetAvailability {
    pub fn new(count: i64, budgets_m: Vec<i64>) -> Self {
        Self { count, budgets_m }
    }

    /// `count` identical aircraft, each with `budget_m` remaining
    pub fn uniform(count: usize, budget_m: u64) -> Self {
        Self {
            count: count as i64,
            budgets_m: vec![budget_m as i64; count],
        }
    }

    /// Checks the report and returns each slot's budget
    pub fn validate(&self) -> Result<Vec<u64>, SchedulerError> {
        if self.count < 0 {
            return Err(SchedulerError::InvalidArgument(format!(
                "negative aircraft count {}",
                self.count
            )));
        }
        if self.budgets_m.len() as i64 != self.count {
            return Err(SchedulerError::InvalidArgument(format!(
                "{} aircraft reported with {} budgets",
                self.count,
                self.budgets_m.len()
            )));
        }

        self.budgets_m
            .iter()
            .enumerate()
            .map(|(slot, &budget)| {
                u64::try_from(budget).map_err(|_| {
                    SchedulerError::InvalidArgument(format!(
                        "negative budget {} for slot {}",
                        budget, slot
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn directory() -> HashMap<HospitalName, Hospital> {
        [Hospital::new("Kigali", 3_000, 4_000)]
            .into_iter()
            .map(|h| (h.name.clone(), h))
            .collect()
    }

    #[test]
    fn priority_order() {
        assert!(Priority::Emergency < Priority::Resupply);
        assert_eq!(Priority::try_from("Emergency"), Ok(Priority::Emergency));
        assert_eq!(Priority::try_from("Resupply"), Ok(Priority::Resupply));
        assert!(matches!(
            Priority::try_from("emergency"),
            Err(SchedulerError::InvalidOrder { .. })
        ));
    }

    #[test]
    fn round_trip_distance() {
        let hospital = Hospital::new("Kigali", 3_000, -4_000);
        assert_eq!(hospital.distance_from_base(), 5_000.0);
        assert_eq!(hospital.round_trip_m(), 10_000);

        // Rounds partial meters up
        assert_eq!(Hospital::new("Tiny", 1, 1).round_trip_m(), 3);
    }

    #[test]
    fn order_from_request() {
        let order = Order::from_request(
            OrderId(7),
            OrderRequest::new(120, "Kigali", "Emergency"),
            &directory(),
        )
        .unwrap();

        assert_eq!(order.id, OrderId(7));
        assert_eq!(order.received_time, 120);
        assert_eq!(order.priority, Priority::Emergency);
        assert_eq!(order.required_budget_m, 10_000);
    }

    #[test]
    fn order_rejections() {
        let directory = directory();
        let reject = |request| Order::from_request(OrderId(0), request, &directory).unwrap_err();

        assert!(matches!(
            reject(OrderRequest::new(-1, "Kigali", "Resupply")),
            SchedulerError::InvalidOrder { .. }
        ));
        assert!(matches!(
            reject(OrderRequest::new(1, "Kigali", "Urgent")),
            SchedulerError::InvalidOrder { .. }
        ));
        assert_eq!(
            reject(OrderRequest::new(1, "Butaro", "Resupply")),
            SchedulerError::UnknownHospital(HospitalName::from("Butaro"))
        );
    }

    #[test]
    fn flight_return_time() {
        let flight = Flight {
            order: Order::from_request(
                OrderId(0),
                OrderRequest::new(0, "Kigali", "Resupply"),
                &directory(),
            )
            .unwrap(),
            aircraft: AircraftSlot(0),
            launch_time: 600,
        };

        // 10 km at 30 m/s is 333.3 s, rounded up
        assert_eq!(flight.return_time(30), 934);
    }

    #[test]
    fn fleet_validation() {
        assert_eq!(FleetAvailability::uniform(2, 20).validate(), Ok(vec![20, 20]));
        assert_eq!(FleetAvailability::default().validate(), Ok(vec![]));

        for fleet in [
            FleetAvailability::new(-1, vec![]),
            FleetAvailability::new(2, vec![20]),
            FleetAvailability::new(1, vec![-5]),
        ] {
            assert!(matches!(
                fleet.validate(),
                Err(SchedulerError::InvalidArgument(_))
            ));
        }
    }
}
