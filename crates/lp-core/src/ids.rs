//! Typed indices for GTUs, lanes and lane-structure records.
//!
//! Each id is a `u32` index into the `Vec` of the store that issued it.
//! `u32::MAX` is reserved as the "no such element" sentinel, which lets SoA
//! tables such as lateral adjacency store a plain id per slot instead of an
//! `Option`.

use std::fmt;

macro_rules! index_ids {
    ($($(#[$attr:meta])* $name:ident => $label:literal;)+) => {$(
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl $name {
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, concat!($label, " {}"), self.0)
                } else {
                    f.write_str(concat!($label, " <invalid>"))
                }
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;

            fn try_from(index: usize) -> Result<Self, Self::Error> {
                u32::try_from(index).map($name)
            }
        }
    )+};
}

index_ids! {
    /// A GTU in the GTU store.
    GtuId => "gtu";
    /// A lane in the lane network.
    LaneId => "lane";
    /// A record of one ego-relative lane structure.
    RecordId => "record";
}
