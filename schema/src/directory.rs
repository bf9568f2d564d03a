use std::collections::HashMap;

use crate::{Hospital, HospitalName};

/// Resolves hospitals to the distance a flight must cover to serve them
pub trait HospitalDirectory {
    /// Round-trip distance in meters from the base to `name`, or `None` if unknown
    fn round_trip_m(&self, name: &HospitalName) -> Option<u64>;
}

impl HospitalDirectory for HashMap<HospitalName, Hospital> {
    fn round_trip_m(&self, name: &HospitalName) -> Option<u64> {
        self.get(name).map(Hospital::round_trip_m)
    }
}

/// Index `hospitals` by name
pub fn directory_from(
    hospitals: impl IntoIterator<Item = Hospital>,
) -> HashMap<HospitalName, Hospital> {
    hospitals
        .into_iter()
        .map(|hospital| (hospital.name.clone(), hospital))
        .collect()
}
