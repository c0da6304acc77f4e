//! Composition flag model: one general group plus independent left/right
//! side groups.
//!
//! All combination is plain bit arithmetic. Nothing here normalizes flags, so
//! a side may carry `RAISED | LOWERED` at the same time if the host put it
//! there.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use serde::{Deserialize, Serialize};

macro_rules! flag_group {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$fmeta:meta])* $flag:ident = $bit:expr,)+ }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            Hash,
            Serialize,
            Deserialize,
            bitcode::Encode,
            bitcode::Decode,
        )]
        pub struct $name(pub u32);

        impl $name {
            pub const NONE: Self = Self(0);
            $($(#[$fmeta])* pub const $flag: Self = Self(1 << $bit);)+

            const NAMED: &'static [(&'static str, Self)] = &[$((stringify!($flag), Self::$flag)),+];

            pub const fn bits(self) -> u32 {
                self.0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            /// True when every bit of `other` is set in `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            pub const fn difference(self, other: Self) -> Self {
                Self(self.0 & !other.0)
            }
        }

        impl BitOr for $name {
            type Output = Self;
            fn bitor(self, rhs: Self) -> Self {
                self.union(rhs)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl BitAnd for $name {
            type Output = Self;
            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl Not for $name {
            type Output = Self;
            fn not(self) -> Self {
                Self(!self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                let mut first = true;
                let mut known = 0u32;
                for (label, flag) in Self::NAMED {
                    known |= flag.0;
                    if self.contains(*flag) {
                        if !first {
                            f.write_str(" | ")?;
                        }
                        f.write_str(label)?;
                        first = false;
                    }
                }
                let unknown = self.0 & !known;
                if unknown != 0 {
                    if !first {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{:#x}", unknown)?;
                }
                f.write_str(")")
            }
        }
    };
}

flag_group! {
    /// Flags describing the structure of a whole segment or node.
    GeneralFlags {
        ELEVATED = 0,
        TUNNEL = 1,
        DEAD_END = 2,
        ROUNDABOUT = 3,
        INTERSECTION = 4,
        /// Left/right sense of the record is mirrored.
        INVERT = 5,
    }
}

flag_group! {
    /// Flags describing one side (left or right) of a segment or node.
    SideFlags {
        RAISED = 0,
        LOWERED = 1,
        LOW_TRANSITION = 2,
        HIGH_TRANSITION = 3,
        SIDEWALK = 4,
        WIDE_SIDEWALK = 5,
        PRIMARY_BEAUTIFICATION = 6,
    }
}

/// Which side group(s) a side-flag query looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideOption {
    Left,
    Right,
    /// Both sides must carry the flag.
    Both,
    /// At least one side carries the flag.
    Any,
}

/// Tri-part bitset attached to every composition record.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct CompositionFlags {
    pub general: GeneralFlags,
    pub left: SideFlags,
    pub right: SideFlags,
}

impl CompositionFlags {
    pub const EMPTY: Self = Self {
        general: GeneralFlags::NONE,
        left: SideFlags::NONE,
        right: SideFlags::NONE,
    };

    pub const fn general(general: GeneralFlags) -> Self {
        Self {
            general,
            left: SideFlags::NONE,
            right: SideFlags::NONE,
        }
    }

    /// The same side flags on both sides, no general flags.
    pub const fn both_sides(side: SideFlags) -> Self {
        Self {
            general: GeneralFlags::NONE,
            left: side,
            right: side,
        }
    }

    pub const fn with_left(mut self, side: SideFlags) -> Self {
        self.left = side;
        self
    }

    pub const fn with_right(mut self, side: SideFlags) -> Self {
        self.right = side;
        self
    }

    pub const fn with_general(mut self, general: GeneralFlags) -> Self {
        self.general = general;
        self
    }

    pub fn has_general(&self, flag: GeneralFlags) -> bool {
        self.general.contains(flag)
    }

    pub fn has_side(&self, flag: SideFlags, option: SideOption) -> bool {
        match option {
            SideOption::Left => self.left.contains(flag),
            SideOption::Right => self.right.contains(flag),
            SideOption::Both => self.left.contains(flag) && self.right.contains(flag),
            SideOption::Any => self.left.contains(flag) || self.right.contains(flag),
        }
    }

    /// The bit-update primitive: `(flags | added) & !removed`, applied to the
    /// general group and to each side independently.
    pub fn updated(self, added: CompositionFlags, removed: CompositionFlags) -> Self {
        Self {
            general: self.general.union(added.general).difference(removed.general),
            left: self.left.union(added.left).difference(removed.left),
            right: self.right.union(added.right).difference(removed.right),
        }
    }

    /// Mirror the record so its left/right sense matches the opposite
    /// direction of travel.
    pub fn inverted(self) -> Self {
        Self {
            general: self.general,
            left: self.right,
            right: self.left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_flags(rng: &mut ChaCha8Rng) -> CompositionFlags {
        CompositionFlags {
            general: GeneralFlags(rng.gen_range(0..64)),
            left: SideFlags(rng.gen_range(0..128)),
            right: SideFlags(rng.gen_range(0..128)),
        }
    }

    #[test]
    fn test_update_matches_bit_formula() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
        for _ in 0..2_000 {
            let flags = random_flags(&mut rng);
            let added = random_flags(&mut rng);
            let removed = random_flags(&mut rng);
            let out = flags.updated(added, removed);

            assert_eq!(
                out.general.bits(),
                (flags.general.bits() | added.general.bits()) & !removed.general.bits()
            );
            assert_eq!(
                out.left.bits(),
                (flags.left.bits() | added.left.bits()) & !removed.left.bits()
            );
            assert_eq!(
                out.right.bits(),
                (flags.right.bits() | added.right.bits()) & !removed.right.bits()
            );
        }
    }

    #[test]
    fn test_update_with_empty_sets_is_noop() {
        let flags = CompositionFlags::general(GeneralFlags::TUNNEL)
            .with_left(SideFlags::RAISED | SideFlags::SIDEWALK)
            .with_right(SideFlags::LOWERED);
        assert_eq!(
            flags.updated(CompositionFlags::EMPTY, CompositionFlags::EMPTY),
            flags
        );
    }

    #[test]
    fn test_removal_wins_over_addition() {
        let both = CompositionFlags::both_sides(SideFlags::LOW_TRANSITION);
        let out = CompositionFlags::EMPTY.updated(both, both);
        assert_eq!(out, CompositionFlags::EMPTY);
    }

    #[test]
    fn test_sides_are_independent() {
        let flags = CompositionFlags::EMPTY.with_left(SideFlags::RAISED);
        assert!(flags.has_side(SideFlags::RAISED, SideOption::Left));
        assert!(!flags.has_side(SideFlags::RAISED, SideOption::Right));
        assert!(flags.has_side(SideFlags::RAISED, SideOption::Any));
        assert!(!flags.has_side(SideFlags::RAISED, SideOption::Both));
    }

    #[test]
    fn test_inverted_swaps_sides_and_keeps_general() {
        let flags = CompositionFlags::general(GeneralFlags::ELEVATED)
            .with_left(SideFlags::RAISED)
            .with_right(SideFlags::LOWERED);
        let inv = flags.inverted();
        assert_eq!(inv.left, SideFlags::LOWERED);
        assert_eq!(inv.right, SideFlags::RAISED);
        assert_eq!(inv.general, GeneralFlags::ELEVATED);
        assert_eq!(inv.inverted(), flags);
    }

    #[test]
    fn test_debug_lists_flag_names() {
        let side = SideFlags::RAISED | SideFlags::SIDEWALK;
        assert_eq!(format!("{:?}", side), "SideFlags(RAISED | SIDEWALK)");
        assert_eq!(format!("{:?}", GeneralFlags::NONE), "GeneralFlags()");
        assert_eq!(
            format!("{:?}", GeneralFlags(1 << 20)),
            "GeneralFlags(0x100000)"
        );
    }
}
