use std::{collections::HashMap, future::Future, pin::Pin, time::Duration};

use schema::{Hospital, HospitalName, Runner, Scheduler, SchedulerError, Speed};
use thiserror::Error;
use tokio_stream::{wrappers::IntervalStream, StreamExt};

use crate::{
    intake::{self, IntakeError, OrderRecord},
    Config, DispatchError, Dispatcher, Fleet, PriorityScheduler,
};

type Response = Pin<Box<dyn Future<Output = Result<RunSummary, RunError>> + Send>>;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("no orders to run")]
    NoOrders,

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("dispatcher task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Outcome of a simulated day
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub flights_launched: usize,
    /// Rows that could not be read plus orders the scheduler refused
    pub orders_rejected: usize,
    /// Orders still waiting for a flight at midnight
    pub orders_unfulfilled: usize,
}

#[derive(Clone, Copy, Debug)]
struct FleetSettings {
    num_aircraft: usize,
    speed_mps: u64,
    range_m: u64,
    launch_interval_s: u64,
}

/// Simulation runner which exercises a `Scheduler` using data provided by a CSV
pub struct CsvRunner {
    speed: Speed,
    fleet: FleetSettings,
    hospitals: HashMap<HospitalName, Hospital>,
    orders: Vec<OrderRecord>,
    /// Order rows that failed to read, already reported
    unreadable_orders: usize,
}

impl CsvRunner {
    const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

    pub fn new(hospitals: Vec<Hospital>, orders: Vec<OrderRecord>) -> Self {
        let defaults = Config::default();

        Self {
            speed: Default::default(),
            fleet: FleetSettings {
                num_aircraft: defaults.num_aircraft,
                speed_mps: defaults.aircraft_speed_mps,
                range_m: defaults.aircraft_range_m,
                launch_interval_s: defaults.launch_interval_s,
            },
            hospitals: schema::directory_from(hospitals),
            orders,
            unreadable_orders: 0,
        }
    }

    pub fn from_csv_paths(
        hospitals_csv_path: &str,
        orders_csv_path: &str,
    ) -> Result<Self, IntakeError> {
        let hospitals = intake::read_hospitals_from_path(hospitals_csv_path)?;

        let mut orders = vec![];
        let mut unreadable_orders = 0;
        for row in intake::read_orders_from_path(orders_csv_path)? {
            match row {
                Ok(record) => orders.push(record),
                Err(e) => {
                    log::warn!("skipping order from {}: {}", orders_csv_path, e);
                    unreadable_orders += 1;
                }
            }
        }

        Ok(Self {
            unreadable_orders,
            ..Self::new(hospitals, orders)
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, IntakeError> {
        let runner = Self::from_csv_paths(&config.hospitals_csv_path, &config.orders_csv_path)?
            .with_speed(config.speed)
            .with_fleet(
                config.num_aircraft,
                config.aircraft_speed_mps,
                config.aircraft_range_m,
            )
            .with_launch_interval(config.launch_interval_s);

        Ok(runner)
    }

    /// Run with the provided `Speed`
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_fleet(mut self, num_aircraft: usize, speed_mps: u64, range_m: u64) -> Self {
        self.fleet.num_aircraft = num_aircraft;
        self.fleet.speed_mps = speed_mps.max(1);
        self.fleet.range_m = range_m;
        self
    }

    /// Seconds between dispatch ticks
    pub fn with_launch_interval(mut self, seconds: u64) -> Self {
        self.fleet.launch_interval_s = seconds.max(1);
        self
    }

    /// Run with a `PriorityScheduler` over the loaded hospitals
    pub fn run_with_defaults(&self) -> Response {
        let scheduler = PriorityScheduler::new(self.hospitals.clone());
        self.run(scheduler)
    }

    async fn run_inner<S>(
        speed: Speed,
        settings: FleetSettings,
        mut orders: Vec<OrderRecord>,
        unreadable_orders: usize,
        scheduler: S,
    ) -> Result<RunSummary, RunError>
    where
        S: Scheduler + Send + 'static,
    {
        // Stable, so orders received in the same second keep their file order
        orders.sort_by_key(|record| record.request.time);
        let first_second = orders
            .first()
            .map(|record| record.request.time.max(0) as u64)
            .ok_or(RunError::NoOrders)?;

        let (dispatcher, task) = Dispatcher::spawn(scheduler);
        let mut fleet = Fleet::new(settings.num_aircraft, settings.speed_mps, settings.range_m);
        let mut orders_iter = orders.into_iter().peekable();
        let tick = speed.adjust_duration(Duration::from_secs(1));
        let mut clock = IntervalStream::new(tokio::time::interval(tick));
        let mut summary = RunSummary {
            orders_rejected: unreadable_orders,
            ..Default::default()
        };

        for current_time in first_second..Self::SECONDS_PER_DAY {
            clock.next().await;

            // Queue orders at the appropriate time
            while let Some(record) =
                orders_iter.next_if(|record| record.request.time <= current_time as i64)
            {
                let priority = record.request.priority.clone();
                let hospital = record.request.hospital.clone();
                match dispatcher.queue_order(record.request).await {
                    Ok(id) => {
                        log::info!(
                            "[{}] {} order {} received to {}",
                            current_time,
                            priority,
                            id,
                            hospital
                        );
                    }
                    Err(DispatchError::Scheduler(source)) => {
                        let rejected = IntakeError::Rejected {
                            line: record.line,
                            source,
                        };
                        log::warn!("[{}] order rejected: {}", current_time, rejected);
                        summary.orders_rejected += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }

            // Launch on every tick; a launch may occur on the same second as an incoming order
            if current_time % settings.launch_interval_s == 0 {
                for sortie in fleet.process_landings(current_time) {
                    log::debug!(
                        "[{}] aircraft {} landed from {}",
                        current_time,
                        sortie.aircraft,
                        sortie.flight.order.destination
                    );
                }

                let snapshot = fleet.snapshot();
                let flights = dispatcher
                    .launch_flights(current_time, snapshot.availability.clone())
                    .await?;
                fleet.dispatch(&snapshot, &flights)?;

                if !flights.is_empty() {
                    log::info!("[{}] Scheduling flights:", current_time);
                    for flight in &flights {
                        log::info!(
                            "\t{} {} order {} to {} ({} m round trip)",
                            flight.aircraft,
                            flight.order.priority,
                            flight.order.id,
                            flight.order.destination,
                            flight.order.required_budget_m
                        );
                    }
                }
                summary.flights_launched += flights.len();
            }
        }

        summary.orders_unfulfilled = dispatcher.pending().await?.len() + orders_iter.count();

        drop(dispatcher);
        task.await?;

        log::info!(
            "{} unfulfilled orders at the end of the day",
            summary.orders_unfulfilled
        );
        for sortie in fleet.in_flight() {
            log::info!(
                "aircraft {} still out to {}, back at {}",
                sortie.aircraft,
                sortie.flight.order.destination,
                sortie.return_time
            );
        }

        Ok(summary)
    }
}

impl<S> Runner<S> for CsvRunner
where
    S: Scheduler + Send + 'static,
{
    type Response = Response;
    type Success = RunSummary;
    type Error = RunError;

    fn run(&self, scheduler: S) -> Self::Response {
        let orders = self.orders.clone();
        let speed = self.speed;
        let settings = self.fleet;
        let unreadable_orders = self.unreadable_orders;
        Box::pin(async move {
            Self::run_inner(speed, settings, orders, unreadable_orders, scheduler).await
        })
    }
}
