use crate::{FleetAvailability, Flight, Order, OrderId, OrderRequest, SchedulerError};

/// A flight scheduler for processing incoming orders
pub trait Scheduler {
    /// Pending orders queued for processing by the scheduler, in launch order
    type UnfulfilledOrders<'a>: Iterator<Item = &'a Order> + Clone
    where
        Self: 'a;

    /// Returns the orders queued for processing by this scheduler
    /// which have not yet been launched.
    fn unfulfilled_orders(&self) -> Self::UnfulfilledOrders<'_>;

    /// Validate an intake record and queue it for delivery. A rejected
    /// record leaves the queue unchanged.
    fn queue_order(&mut self, request: OrderRequest) -> Result<OrderId, SchedulerError>;

    /// Withdraw a queued order before it is launched
    fn cancel_order(&mut self, id: OrderId) -> Result<Order, SchedulerError>;

    /// Return the flights that should be launched at `current_time` given the
    /// aircraft reported free in `fleet`. Launched orders leave the queue.
    fn launch_flights(
        &mut self,
        current_time: u64,
        fleet: &FleetAvailability,
    ) -> Result<Vec<Flight>, SchedulerError>;
}
