mod directory;
mod entities;
mod error;
mod runner;
mod scheduler;

pub use directory::{directory_from, HospitalDirectory};
pub use entities::{
    AircraftSlot, FleetAvailability, Flight, Hospital, HospitalName, Order, OrderId, OrderRequest,
    Priority, BASE,
};
pub use error::SchedulerError;
pub use runner::{Runner, Speed};
pub use scheduler::Scheduler;

pub const SAMPLE_HOSPITALS_CSV_PATH: &str = "./test_data/hospitals.csv";
pub const SAMPLE_ORDERS_CSV_PATH: &str = "./test_data/orders.csv";
