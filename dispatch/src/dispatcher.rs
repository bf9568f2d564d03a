use futures::channel::{mpsc, oneshot};
use futures::StreamExt;
use schema::{FleetAvailability, Flight, Order, OrderId, OrderRequest, Scheduler, SchedulerError};
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("dispatcher has shut down")]
    Closed,
}

enum Command {
    QueueOrder(OrderRequest, oneshot::Sender<Result<OrderId, SchedulerError>>),
    CancelOrder(OrderId, oneshot::Sender<Result<Order, SchedulerError>>),
    LaunchFlights {
        current_time: u64,
        fleet: FleetAvailability,
        reply: oneshot::Sender<Result<Vec<Flight>, SchedulerError>>,
    },
    Pending(oneshot::Sender<Vec<Order>>),
}

/// Handle to a task which owns a `Scheduler` and applies requests to it one
/// at a time, so intake, cancellation and launch ticks from any number of
/// callers never interleave.
#[derive(Clone)]
pub struct Dispatcher {
    commands: mpsc::UnboundedSender<Command>,
}

impl Dispatcher {
    /// Move `scheduler` onto its own task. The task ends once every handle is
    /// dropped, yielding the scheduler back through the `JoinHandle`.
    pub fn spawn<S>(scheduler: S) -> (Self, JoinHandle<S>)
    where
        S: Scheduler + Send + 'static,
    {
        let (commands, receiver) = mpsc::unbounded();
        let task = tokio::spawn(Self::serve(scheduler, receiver));

        (Self { commands }, task)
    }

    async fn serve<S: Scheduler>(
        mut scheduler: S,
        mut commands: mpsc::UnboundedReceiver<Command>,
    ) -> S {
        while let Some(command) = commands.next().await {
            // A caller which stopped waiting for its reply is not an error
            match command {
                Command::QueueOrder(request, reply) => {
                    let _ = reply.send(scheduler.queue_order(request));
                }
                Command::CancelOrder(id, reply) => {
                    let _ = reply.send(scheduler.cancel_order(id));
                }
                Command::LaunchFlights {
                    current_time,
                    fleet,
                    reply,
                } => {
                    let _ = reply.send(scheduler.launch_flights(current_time, &fleet));
                }
                Command::Pending(reply) => {
                    let _ = reply.send(scheduler.unfulfilled_orders().cloned().collect());
                }
            }
        }

        scheduler
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, DispatchError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .unbounded_send(command(reply))
            .map_err(|_| DispatchError::Closed)?;

        response.await.map_err(|_| DispatchError::Closed)
    }

    pub async fn queue_order(&self, request: OrderRequest) -> Result<OrderId, DispatchError> {
        Ok(self
            .request(|reply| Command::QueueOrder(request, reply))
            .await??)
    }

    pub async fn cancel_order(&self, id: OrderId) -> Result<Order, DispatchError> {
        Ok(self.request(|reply| Command::CancelOrder(id, reply)).await??)
    }

    pub async fn launch_flights(
        &self,
        current_time: u64,
        fleet: FleetAvailability,
    ) -> Result<Vec<Flight>, DispatchError> {
        Ok(self
            .request(|reply| Command::LaunchFlights {
                current_time,
                fleet,
                reply,
            })
            .await??)
    }

    /// Orders still waiting for a flight, in launch order
    pub async fn pending(&self) -> Result<Vec<Order>, DispatchError> {
        self.request(Command::Pending).await
    }
}

#[cfg(test)]
mod test {
    use schema::{directory_from, Hospital};

    use super::*;
    use crate::PriorityScheduler;

    fn scheduler() -> PriorityScheduler {
        PriorityScheduler::new(directory_from([
            Hospital::new("Kigali", 3_000, 4_000),
            Hospital::new("Nyanza", -60_000, 50_000),
        ]))
    }

    #[tokio::test]
    async fn serializes_concurrent_callers() -> Result<(), Box<dyn std::error::Error>> {
        let (dispatcher, task) = Dispatcher::spawn(scheduler());

        let intake = (0..20).map(|t| {
            let dispatcher = dispatcher.clone();
            let priority = if t % 4 == 0 { "Emergency" } else { "Resupply" };
            async move {
                dispatcher
                    .queue_order(OrderRequest::new(t, "Kigali", priority))
                    .await
            }
        });
        let ids = futures::future::try_join_all(intake).await?;
        assert_eq!(ids.len(), 20);

        let first = dispatcher
            .launch_flights(60, FleetAvailability::uniform(8, 160_000))
            .await?;
        let second = dispatcher
            .launch_flights(120, FleetAvailability::uniform(8, 160_000))
            .await?;
        let pending = dispatcher.pending().await?;

        // Every order is accounted for exactly once
        let mut seen = first
            .iter()
            .chain(second.iter())
            .map(|flight| flight.order.id)
            .chain(pending.iter().map(|order| order.id))
            .collect::<Vec<_>>();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 20);
        assert_eq!(pending.len(), 4);

        // All five emergencies go out on the first tick
        assert!(first[..5]
            .iter()
            .all(|flight| flight.order.priority == schema::Priority::Emergency));

        drop(dispatcher);
        let scheduler = task.await?;
        assert_eq!(scheduler.queue().size(), 4);

        Ok(())
    }

    #[tokio::test]
    async fn surfaces_scheduler_errors() -> Result<(), Box<dyn std::error::Error>> {
        let (dispatcher, _task) = Dispatcher::spawn(scheduler());

        assert_eq!(
            dispatcher
                .queue_order(OrderRequest::new(0, "Gisenyi", "Resupply"))
                .await,
            Err(DispatchError::Scheduler(SchedulerError::UnknownHospital(
                "Gisenyi".into()
            )))
        );
        assert_eq!(
            dispatcher
                .launch_flights(0, FleetAvailability::new(-1, vec![]))
                .await,
            Err(DispatchError::Scheduler(SchedulerError::InvalidArgument(
                "negative aircraft count -1".to_string()
            )))
        );

        let id = dispatcher
            .queue_order(OrderRequest::new(0, "Nyanza", "Emergency"))
            .await?;
        assert_eq!(dispatcher.cancel_order(id).await?.id, id);
        assert!(dispatcher.pending().await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn closed_after_shutdown() {
        let (dispatcher, task) = Dispatcher::spawn(scheduler());
        task.abort();
        let _ = task.await;

        assert_eq!(dispatcher.pending().await, Err(DispatchError::Closed));
    }
}
