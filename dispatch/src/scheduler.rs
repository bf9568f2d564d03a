use std::collections::{HashMap, HashSet};

use schema::{
    AircraftSlot, FleetAvailability, Flight, Hospital, HospitalDirectory, HospitalName, Order,
    OrderId, OrderRequest, Scheduler, SchedulerError,
};

use crate::queue::{OrderQueue, OrderedIter};

/// A scheduler which launches queued orders strictly in priority order,
/// one order per aircraft, packing each into the tightest aircraft that can
/// fly its round trip.
///
/// An order too far for every free aircraft stays queued without holding
/// up the orders behind it.
pub struct PriorityScheduler<D = HashMap<HospitalName, Hospital>> {
    /// Resolves destinations to round-trip distances at intake
    directory: D,
    /// Orders that have not yet been launched
    queue: OrderQueue,
}

impl<D: HospitalDirectory> PriorityScheduler<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            queue: OrderQueue::new(),
        }
    }

    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }
}

/// Decide which of `orders` (already in launch order) fly at `current_time`.
///
/// Walks the orders once, giving each the free aircraft with the smallest
/// budget that still covers its round trip (lowest slot on ties). Orders
/// nothing can carry are skipped. Does not touch the queue.
pub fn plan_launches<'a>(
    orders: impl IntoIterator<Item = &'a Order>,
    fleet: &FleetAvailability,
    current_time: u64,
) -> Result<Vec<Flight>, SchedulerError> {
    #[derive(Debug)]
    struct Aircraft {
        slot: AircraftSlot,
        budget_m: u64,
    }

    let mut free = fleet
        .validate()?
        .into_iter()
        .enumerate()
        .map(|(slot, budget_m)| Aircraft {
            slot: AircraftSlot(slot),
            budget_m,
        })
        .collect::<Vec<_>>();
    let mut flights = vec![];

    for order in orders {
        if free.is_empty() {
            break;
        }

        let Some(best_fit) = free
            .iter()
            .enumerate()
            .filter(|(_, aircraft)| aircraft.budget_m >= order.required_budget_m)
            .min_by_key(|(_, aircraft)| aircraft.budget_m)
            .map(|(i, _)| i)
        else {
            continue;
        };

        let aircraft = free.remove(best_fit);
        flights.push(Flight {
            order: order.clone(),
            aircraft: aircraft.slot,
            launch_time: current_time,
        });
    }

    Ok(flights)
}

impl<D: HospitalDirectory> Scheduler for PriorityScheduler<D> {
    type UnfulfilledOrders<'a> = OrderedIter<'a> where Self: 'a;

    fn unfulfilled_orders(&self) -> Self::UnfulfilledOrders<'_> {
        self.queue.peek_ordered()
    }

    fn queue_order(&mut self, request: OrderRequest) -> Result<OrderId, SchedulerError> {
        let order = Order::from_request(self.queue.next_id(), request, &self.directory)?;

        Ok(self.queue.insert(order))
    }

    fn cancel_order(&mut self, id: OrderId) -> Result<Order, SchedulerError> {
        self.queue.remove(id)
    }

    fn launch_flights(
        &mut self,
        current_time: u64,
        fleet: &FleetAvailability,
    ) -> Result<Vec<Flight>, SchedulerError> {
        let flights = plan_launches(self.queue.peek_ordered(), fleet, current_time)?;
        if flights.is_empty() {
            return Ok(flights);
        }

        let launched = flights
            .iter()
            .map(|flight| flight.order.id)
            .collect::<HashSet<_>>();
        self.queue.remove_batch(&launched)?;

        Ok(flights)
    }
}
