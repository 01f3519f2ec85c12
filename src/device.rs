use std::fmt::Debug;
use std::sync::Arc;

/// Handle to a compute execution context.
///
/// Devices are created and torn down outside this crate. Holders of a
/// [`DeviceRef`] only keep the device alive; they never mutate it.
pub trait Device: Debug + Send + Sync {
    fn name(&self) -> &str;
}

pub type DeviceRef = Arc<dyn Device>;
