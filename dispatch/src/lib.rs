mod config;
mod dispatcher;
mod fleet;
pub mod intake;
mod queue;
mod runner;
mod scheduler;

pub use config::{Config, ConfigError};
pub use dispatcher::{DispatchError, Dispatcher};
pub use fleet::{Fleet, Snapshot, Sortie};
pub use intake::{IntakeError, OrderRecord};
pub use queue::{OrderQueue, OrderedIter};
pub use runner::{CsvRunner, RunError, RunSummary};
pub use scheduler::{plan_launches, PriorityScheduler};
