use crate::call::enum_info::impl_enum_info;
use crate::device::DeviceRef;
use crate::shape::Shape;
use by_address::ByAddress;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use tracing::trace;

pub mod enum_info;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AccessType {
    None = 0,
    Read = 1,
    Write = 2,
    ReadWrite = 3,
}

impl_enum_info!(AccessType, "AccessType", {
    None => "none",
    Read => "read",
    Write => "write",
    ReadWrite => "readwrite",
});

/// Which pass of a differentiable computation a dispatch belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CallMode {
    /// Primal evaluation.
    Prim = 0,
    /// Backward-mode derivative propagation.
    Bwds = 1,
    /// Forward-mode derivative propagation.
    Fwds = 2,
}

impl_enum_info!(CallMode, "CallMode", {
    Prim => "prim",
    Bwds => "bwds",
    Fwds => "fwds",
});

impl CallMode {
    pub fn is_derivative(&self) -> bool {
        !matches!(self, CallMode::Prim)
    }
}

/// Device, call shape and call mode of one vectorized dispatch.
///
/// The context holds a shared claim on the device for as long as it lives.
/// Nothing is validated here: the call shape may be absent, and whether it
/// suits the device is up to the caller.
#[derive(Clone, Eq, PartialEq)]
pub struct CallContext {
    device: ByAddress<DeviceRef>,
    call_shape: Shape,
    call_mode: CallMode,
}

impl CallContext {
    pub fn new(device: DeviceRef, call_shape: Shape, call_mode: CallMode) -> Self {
        trace!(
            device = device.name(),
            call_shape = %call_shape,
            call_mode = %call_mode,
            "new call context"
        );
        CallContext {
            device: ByAddress(device),
            call_shape,
            call_mode,
        }
    }

    pub fn device(&self) -> &DeviceRef {
        &self.device
    }

    pub fn call_shape(&self) -> &Shape {
        &self.call_shape
    }

    pub fn call_mode(&self) -> CallMode {
        self.call_mode
    }
}

impl Debug for CallContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallContext")
            .field("device", &self.device.name())
            .field("call_shape", &self.call_shape)
            .field("call_mode", &self.call_mode)
            .finish()
    }
}

impl Display for CallContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CallContext(device={}, call_shape={}, call_mode={})",
            self.device.name(),
            self.call_shape,
            self.call_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::call::{AccessType, CallContext, CallMode};
    use crate::device::{Device, DeviceRef};
    use crate::shape::Shape;
    use std::sync::Arc;

    #[derive(Debug)]
    struct TestDevice(&'static str);

    impl Device for TestDevice {
        fn name(&self) -> &str {
            self.0
        }
    }

    fn device(name: &'static str) -> DeviceRef {
        Arc::new(TestDevice(name))
    }

    #[test]
    fn test_round_trip() {
        let dev = device("gpu0");
        let shape = crate::shape![4, 16, 16];
        let ctx = CallContext::new(dev.clone(), shape.clone(), CallMode::Bwds);

        assert!(Arc::ptr_eq(ctx.device(), &dev));
        assert_eq!(ctx.call_shape(), &shape);
        assert_eq!(ctx.call_mode(), CallMode::Bwds);
        assert_eq!(Arc::strong_count(&dev), 2);
    }

    #[test]
    fn test_device_claim_released() {
        let dev = device("gpu0");
        let ctx = Arc::new(CallContext::new(dev.clone(), Shape::new(), CallMode::Prim));
        let shared = ctx.clone();
        assert_eq!(Arc::strong_count(&dev), 2);

        drop(ctx);
        assert_eq!(Arc::strong_count(&dev), 2);
        assert_eq!(shared.device().name(), "gpu0");

        drop(shared);
        assert_eq!(Arc::strong_count(&dev), 1);
    }

    #[test]
    fn test_no_validation() {
        let ctx = CallContext::new(device("cpu"), Shape::new(), CallMode::Fwds);
        assert!(!ctx.call_shape().valid());
        assert!(ctx.call_shape().element_count().is_err());
    }

    #[test]
    fn test_eq_by_device_identity() {
        let dev = device("gpu0");
        let a = CallContext::new(dev.clone(), crate::shape![8], CallMode::Prim);
        let b = CallContext::new(dev.clone(), crate::shape![8], CallMode::Prim);
        let c = CallContext::new(device("gpu0"), crate::shape![8], CallMode::Prim);
        let d = CallContext::new(dev, crate::shape![8], CallMode::Fwds);
        assert_eq!(a, b);
        assert_eq!(a, a.clone());
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_display() {
        let ctx = CallContext::new(device("gpu0"), crate::shape![4, -1], CallMode::Fwds);
        assert_eq!(
            ctx.to_string(),
            "CallContext(device=gpu0, call_shape=[4, -1], call_mode=fwds)"
        );
        let ctx = CallContext::new(device("cpu"), Shape::new(), CallMode::Prim);
        assert_eq!(
            ctx.to_string(),
            "CallContext(device=cpu, call_shape=[invalid], call_mode=prim)"
        );
    }

    #[test]
    fn test_call_mode() {
        assert_eq!(CallMode::Prim as i32, 0);
        assert_eq!(CallMode::Bwds as i32, 1);
        assert_eq!(CallMode::Fwds as i32, 2);
        assert!(!CallMode::Prim.is_derivative());
        assert!(CallMode::Bwds.is_derivative());
        assert_eq!("fwds".parse::<CallMode>().unwrap(), CallMode::Fwds);
        assert!("forward".parse::<CallMode>().is_err());
    }

    #[test]
    fn test_access_type() {
        assert_eq!(AccessType::None.to_string(), "none");
        assert_eq!(AccessType::ReadWrite.to_string(), "readwrite");
        assert_eq!("write".parse::<AccessType>().unwrap(), AccessType::Write);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        assert_eq!(serde_json::to_string(&CallMode::Bwds).unwrap(), "\"bwds\"");
        assert_eq!(
            serde_json::from_str::<AccessType>("\"read\"").unwrap(),
            AccessType::Read
        );
        assert!(serde_json::from_str::<CallMode>("\"prime\"").is_err());
    }
}
