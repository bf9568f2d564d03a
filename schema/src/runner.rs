use std::num::NonZeroU8;
use std::time::Duration;

use futures::Future;

use crate::Scheduler;

/// A `Runner` dispatches aircraft to fulfill orders using a provided `Scheduler`.
/// It returns a `Response` future, which may be polled to drive its operation
/// until the end of the simulated day.
pub trait Runner<S: Scheduler> {
    type Response: Future<Output = Result<Self::Success, Self::Error>>;
    type Success;
    type Error;

    /// Initialize the `Runner` to fulfill orders using the provided `Scheduler`.
    fn run(&self, scheduler: S) -> Self::Response;
}

/// Allows running in fast-forward or slow-motion instead of real-time
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speed {
    #[default]
    RealTime,
    /// Speed up the runner by the provided multiplier (e.g. `2` gives double speed)
    FastForward(NonZeroU8),
    /// Slow down the runner by the provided multiplier (e.g. `2` gives half speed)
    SlowMotion(NonZeroU8),
}

impl Speed {
    /// Fast-forward by `rate`, where a rate of zero means real time
    pub fn fast_forward(rate: u8) -> Self {
        NonZeroU8::new(rate).map_or(Self::RealTime, Self::FastForward)
    }

    pub fn adjust_duration(&self, duration: Duration) -> Duration {
        match self {
            Self::RealTime => duration,
            Self::FastForward(x) => duration / x.get() as u32,
            Self::SlowMotion(x) => duration * x.get() as u32,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adjusts_durations() {
        let second = Duration::from_secs(1);

        assert_eq!(Speed::fast_forward(0), Speed::RealTime);
        assert_eq!(Speed::RealTime.adjust_duration(second), second);
        assert_eq!(
            Speed::fast_forward(4).adjust_duration(second),
            Duration::from_millis(250)
        );
        assert_eq!(
            Speed::SlowMotion(NonZeroU8::new(2).unwrap()).adjust_duration(second),
            Duration::from_secs(2)
        );
    }
}
