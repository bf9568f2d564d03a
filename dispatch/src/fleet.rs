use std::collections::HashSet;

use itertools::{Either, Itertools};
use schema::{FleetAvailability, Flight, SchedulerError};

/// A flight out on delivery, bound to the physical aircraft flying it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sortie {
    /// Index of the aircraft within the fleet
    pub aircraft: usize,
    pub flight: Flight,
    /// Time in __seconds__ _since midnight_ the aircraft is back at the base
    pub return_time: u64,
}

/// Free aircraft at one tick. Slot `n` of `availability` stands for the
/// `n`th idle aircraft of the fleet.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub availability: FleetAvailability,
    idle: Vec<usize>,
}

/// Tracks which aircraft of a homogeneous fleet are out on deliveries,
/// so that each tick can be given an availability report.
#[derive(Debug)]
pub struct Fleet {
    /// Number of aircraft based at the nest
    num_aircraft: usize,
    /// Ground speed in meters per second
    speed_mps: u64,
    /// Round-trip range in meters of a fully charged aircraft
    range_m: u64,
    in_flight: Vec<Sortie>,
}

impl Fleet {
    pub fn new(num_aircraft: usize, speed_mps: u64, range_m: u64) -> Self {
        Self {
            num_aircraft,
            speed_mps,
            range_m,
            in_flight: Vec::new(),
        }
    }

    pub fn in_flight(&self) -> impl Iterator<Item = &Sortie> {
        self.in_flight.iter()
    }

    /// Returns the number of aircraft available to make deliveries
    pub fn idle_count(&self) -> usize {
        self.num_aircraft - self.in_flight.len()
    }

    /// Mark as landed those aircraft which are back at the base by `current_time`,
    /// returning their sorties
    pub fn process_landings(&mut self, current_time: u64) -> Vec<Sortie> {
        let in_flight = std::mem::take(&mut self.in_flight);
        let (landed, still_flying): (Vec<Sortie>, Vec<Sortie>) =
            in_flight.into_iter().partition_map(|sortie| {
                if sortie.return_time <= current_time {
                    Either::Left(sortie)
                } else {
                    Either::Right(sortie)
                }
            });

        self.in_flight = still_flying;
        landed
    }

    /// Every idle aircraft, each reported with the full range
    pub fn snapshot(&self) -> Snapshot {
        let idle = (0..self.num_aircraft)
            .filter(|id| !self.in_flight.iter().any(|sortie| sortie.aircraft == *id))
            .collect::<Vec<_>>();

        Snapshot {
            availability: FleetAvailability::uniform(idle.len(), self.range_m),
            idle,
        }
    }

    /// Put the aircraft behind each flight's slot in the air. Nothing is
    /// dispatched unless every flight maps to a distinct aircraft that is
    /// still on the ground.
    pub fn dispatch(
        &mut self,
        snapshot: &Snapshot,
        flights: &[Flight],
    ) -> Result<(), SchedulerError> {
        let mut assigned = HashSet::with_capacity(flights.len());
        let sorties = flights
            .iter()
            .map(|flight| {
                let aircraft = *snapshot.idle.get(flight.aircraft.0).ok_or_else(|| {
                    SchedulerError::InvalidArgument(format!(
                        "flight for order {} assigned to unreported {}",
                        flight.order.id, flight.aircraft
                    ))
                })?;

                if !assigned.insert(aircraft) {
                    return Err(SchedulerError::InvalidArgument(format!(
                        "flight for order {} reuses {}",
                        flight.order.id, flight.aircraft
                    )));
                }
                // A stale snapshot can name an aircraft that has left since
                if self.in_flight.iter().any(|sortie| sortie.aircraft == aircraft) {
                    return Err(SchedulerError::InvalidArgument(format!(
                        "flight for order {} assigned to aircraft {} which is in flight",
                        flight.order.id, aircraft
                    )));
                }

                Ok(Sortie {
                    aircraft,
                    return_time: flight.return_time(self.speed_mps),
                    flight: flight.clone(),
                })
            })
            .collect::<Result<Vec<_>, SchedulerError>>()?;

        self.in_flight.extend(sorties);
        Ok(())
    }
}
