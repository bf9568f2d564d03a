use std::collections::{HashSet, VecDeque};
use std::iter::Chain;

use schema::{Order, OrderId, Priority, SchedulerError};

/// Orders in launch order: every emergency, then every resupply
pub type OrderedIter<'a> = Chain<
    std::collections::vec_deque::Iter<'a, Order>,
    std::collections::vec_deque::Iter<'a, Order>,
>;

/// Holding area for orders which have not been launched yet.
///
/// Each priority class gets its own FIFO kept sorted by `(received_time, id)`,
/// so walking the emergency FIFO and then the resupply FIFO yields the full
/// launch order without sorting.
#[derive(Debug, Default)]
pub struct OrderQueue {
    emergency: VecDeque<Order>,
    resupply: VecDeque<Order>,
    /// Sequence number handed to the next order accepted at intake
    next_sequence: u64,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The identity the next intake should stamp on its order
    pub fn next_id(&self) -> OrderId {
        OrderId(self.next_sequence)
    }

    /// Queues `order` under a fresh intake sequence number, which replaces
    /// whatever id it carried, and returns that id
    pub fn insert(&mut self, mut order: Order) -> OrderId {
        let id = self.next_id();
        self.next_sequence += 1;
        order.id = id;

        let fifo = self.fifo_mut(order.priority);
        let key = (order.received_time, order.id);
        match fifo.back() {
            // Arrivals are normally in order, so this is the common case
            Some(last) if (last.received_time, last.id) > key => {
                let at = fifo.partition_point(|queued| (queued.received_time, queued.id) < key);
                fifo.insert(at, order);
            }
            _ => fifo.push_back(order),
        }

        id
    }

    /// Every queued order in launch order, without removing anything.
    /// The iterator is cheap to clone, so a scan can be restarted.
    pub fn peek_ordered(&self) -> OrderedIter<'_> {
        self.emergency.iter().chain(self.resupply.iter())
    }

    /// Removes all of `ids` or, if any of them is not queued, none of them.
    /// Removed orders are returned in launch order.
    pub fn remove_batch(&mut self, ids: &HashSet<OrderId>) -> Result<Vec<Order>, SchedulerError> {
        if let Some(missing) = ids.iter().find(|id| !self.contains(**id)) {
            return Err(SchedulerError::NotFound(*missing));
        }

        let mut removed = Vec::with_capacity(ids.len());
        for fifo in [&mut self.emergency, &mut self.resupply] {
            let (taken, kept): (VecDeque<Order>, VecDeque<Order>) = std::mem::take(fifo)
                .into_iter()
                .partition(|order| ids.contains(&order.id));
            *fifo = kept;
            removed.extend(taken);
        }

        Ok(removed)
    }

    /// Removes a single order, e.g. on cancellation
    pub fn remove(&mut self, id: OrderId) -> Result<Order, SchedulerError> {
        [&mut self.emergency, &mut self.resupply]
            .into_iter()
            .find_map(|fifo| {
                let at = fifo.iter().position(|order| order.id == id)?;
                fifo.remove(at)
            })
            .ok_or(SchedulerError::NotFound(id))
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.peek_ordered().any(|order| order.id == id)
    }

    pub fn size(&self) -> usize {
        self.emergency.len() + self.resupply.len()
    }

    fn fifo_mut(&mut self, priority: Priority) -> &mut VecDeque<Order> {
        match priority {
            Priority::Emergency => &mut self.emergency,
            Priority::Resupply => &mut self.resupply,
        }
    }
}

#[cfg(test)]
mod test {
    use schema::HospitalName;

    use super::*;

    fn order(id: u64, received_time: u64, priority: Priority) -> Order {
        Order {
            id: OrderId(id),
            received_time,
            destination: HospitalName::from("Kigali"),
            priority,
            required_budget_m: 10,
        }
    }

    fn ids(queue: &OrderQueue) -> Vec<u64> {
        queue.peek_ordered().map(|order| order.id.0).collect()
    }

    #[test]
    fn orders_by_priority_then_arrival() {
        let mut queue = OrderQueue::new();
        queue.insert(order(0, 10, Priority::Resupply));
        queue.insert(order(1, 20, Priority::Emergency));
        queue.insert(order(2, 20, Priority::Resupply));
        queue.insert(order(3, 30, Priority::Emergency));

        assert_eq!(ids(&queue), vec![1, 3, 0, 2]);
        assert_eq!(queue.size(), 4);
        assert_eq!(queue.next_id(), OrderId(4));
    }

    #[test]
    fn late_arrivals_are_placed_by_received_time() {
        let mut queue = OrderQueue::new();
        queue.insert(order(0, 50, Priority::Resupply));
        queue.insert(order(1, 70, Priority::Resupply));
        queue.insert(order(2, 60, Priority::Resupply));
        // Same received time as #0: the intake sequence breaks the tie
        queue.insert(order(3, 50, Priority::Resupply));

        assert_eq!(ids(&queue), vec![0, 3, 2, 1]);
    }

    #[test]
    fn peek_is_restartable() {
        let mut queue = OrderQueue::new();
        queue.insert(order(0, 1, Priority::Resupply));
        queue.insert(order(1, 2, Priority::Emergency));

        let view = queue.peek_ordered();
        let first_pass = view.clone().map(|o| o.id).collect::<Vec<_>>();
        let second_pass = view.map(|o| o.id).collect::<Vec<_>>();

        assert_eq!(first_pass, second_pass);
        assert_eq!(queue.size(), 2);
    }

    #[test]
    fn remove_batch_is_all_or_nothing() {
        let mut queue = OrderQueue::new();
        queue.insert(order(0, 0, Priority::Resupply));
        queue.insert(order(1, 1, Priority::Emergency));
        queue.insert(order(2, 2, Priority::Resupply));

        let missing = [OrderId(0), OrderId(9)].into_iter().collect();
        assert_eq!(
            queue.remove_batch(&missing),
            Err(SchedulerError::NotFound(OrderId(9)))
        );
        assert_eq!(queue.size(), 3);

        let batch = [OrderId(2), OrderId(1)].into_iter().collect();
        let removed = queue.remove_batch(&batch).unwrap();
        assert_eq!(
            removed.iter().map(|o| o.id.0).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(ids(&queue), vec![0]);
    }

    #[test]
    fn remove_single() {
        let mut queue = OrderQueue::new();
        queue.insert(order(0, 1, Priority::Emergency));
        queue.insert(order(1, 2, Priority::Resupply));

        assert_eq!(queue.remove(OrderId(1)).map(|o| o.id), Ok(OrderId(1)));
        assert_eq!(
            queue.remove(OrderId(1)),
            Err(SchedulerError::NotFound(OrderId(1)))
        );
        assert!(queue.contains(OrderId(0)));
        assert_eq!(queue.size(), 1);
    }

    #[test]
    fn queue_stamps_distinct_ids() {
        let mut queue = OrderQueue::new();
        let first = queue.insert(order(7, 0, Priority::Resupply));
        let second = queue.insert(order(7, 0, Priority::Resupply));

        assert_eq!((first, second), (OrderId(0), OrderId(1)));
        assert_eq!(ids(&queue), vec![0, 1]);

        let batch = [first].into_iter().collect();
        assert_eq!(queue.remove_batch(&batch).unwrap().len(), 1);
        assert_eq!(ids(&queue), vec![1]);
        assert_eq!(queue.next_id(), OrderId(2));
    }
}
