//! Name tables for enums exposed to host binding layers.

use crate::call::{AccessType, CallMode};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Eq, PartialEq)]
pub enum EnumError {
    #[error("unknown {} value {:?}", .type_name, .name)]
    UnknownName {
        type_name: &'static str,
        name: String,
    },
}

/// Closed enumeration with a canonical lowercase name per value.
pub trait EnumInfo: Copy + Eq + Sized + 'static {
    const NAME: &'static str;

    fn items() -> &'static [(Self, &'static str)];

    fn to_raw(self) -> i32;

    fn name(self) -> &'static str {
        Self::items()
            .iter()
            .find(|(value, _)| *value == self)
            .map(|(_, name)| *name)
            .unwrap_or("unknown")
    }

    fn from_name(name: &str) -> Result<Self, EnumError> {
        Self::items()
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(value, _)| *value)
            .ok_or_else(|| EnumError::UnknownName {
                type_name: Self::NAME,
                name: name.to_string(),
            })
    }
}

pub type EnumTable = Vec<(i32, &'static str)>;

fn table<T: EnumInfo>() -> EnumTable {
    T::items()
        .iter()
        .map(|(value, name)| (value.to_raw(), *name))
        .collect()
}

lazy_static! {
    static ref REGISTRY: RwLock<HashMap<&'static str, EnumTable>> = {
        let mut map = HashMap::new();
        map.insert(AccessType::NAME, table::<AccessType>());
        map.insert(CallMode::NAME, table::<CallMode>());
        RwLock::new(map)
    };
}

/// Registers the name table of `T`. Returns false if a table with the same
/// type name was already registered, in which case the first one is kept.
pub fn register_enum<T: EnumInfo>() -> bool {
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    if registry.contains_key(T::NAME) {
        warn!(name = T::NAME, "enum already registered");
        return false;
    }
    let table = table::<T>();
    debug!(name = T::NAME, items = table.len(), "registered enum");
    registry.insert(T::NAME, table);
    true
}

pub fn registered_enum(name: &str) -> Option<EnumTable> {
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

pub fn registered_enums() -> Vec<&'static str> {
    let mut names: Vec<_> = REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .copied()
        .collect();
    names.sort_unstable();
    names
}

macro_rules! impl_enum_info {
    ($ty:ident, $name:literal, { $($variant:ident => $s:literal),* $(,)? }) => {
        impl $crate::call::enum_info::EnumInfo for $ty {
            const NAME: &'static str = $name;

            fn items() -> &'static [(Self, &'static str)] {
                &[$(($ty::$variant, $s)),*]
            }

            fn to_raw(self) -> i32 {
                self as i32
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(<$ty as $crate::call::enum_info::EnumInfo>::name(*self))
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::call::enum_info::EnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as $crate::call::enum_info::EnumInfo>::from_name(s)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(<$ty as $crate::call::enum_info::EnumInfo>::name(*self))
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let name = <String as serde::Deserialize>::deserialize(deserializer)?;
                <$ty as $crate::call::enum_info::EnumInfo>::from_name(&name)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use impl_enum_info;
