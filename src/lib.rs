//! Shape bookkeeping and dispatch descriptors for vectorized kernel calls.

pub mod call;
pub mod device;
pub mod error;
pub mod shape;

pub use crate::call::enum_info::{
    register_enum, registered_enum, registered_enums, EnumError, EnumInfo,
};
pub use crate::call::{AccessType, CallContext, CallMode};
pub use crate::device::{Device, DeviceRef};
pub use crate::error::Error;
pub use crate::shape::{Shape, ShapeError, DYNAMIC};
