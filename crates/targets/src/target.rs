//! Multi-version target data and clone directives.
//!
//! A [`TargetData`] describes one code-generation target: a CPU name, an
//! enabled and an explicitly-disabled feature set, clone-directive flags,
//! and a pass-through feature suffix for the backend. The same shape
//! describes a command-line target before resolution, a resolved JIT
//! target, and a deserialized image variant.

use alloc::string::String;

use platform::FeatureSet;

/// Clone-directive and target-state flag bits.
///
/// The values are part of the image ABI and must not move. Bit 7 is
/// reserved by the format.
pub mod flags {
  /// The target was compiled with vector-register calling conventions.
  pub const VEC_CALL: u32 = 1 << 0;
  /// Clone every function into this target.
  pub const CLONE_ALL: u32 = 1 << 1;
  /// Clone functions containing loops.
  pub const CLONE_LOOP: u32 = 1 << 2;
  /// Clone functions using SIMD operations.
  pub const CLONE_SIMD: u32 = 1 << 3;
  /// Clone functions calling math functions.
  pub const CLONE_MATH: u32 = 1 << 4;
  /// Clone functions that inspect CPU features.
  pub const CLONE_CPU: u32 = 1 << 5;
  /// Clone functions using half-precision arithmetic.
  pub const CLONE_FLOAT16: u32 = 1 << 6;
  /// The target name was not found in the CPU catalog.
  pub const UNKNOWN_NAME: u32 = 1 << 8;
}

/// A feature set plus target flags, for one polarity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureFlags {
  /// Feature bits of this polarity.
  pub features: FeatureSet,
  /// OR of [`flags`] bits (only meaningful on the enabled side).
  pub flags: u32,
}

/// One multi-version target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetData {
  /// CPU name (catalog name, `"native"` before resolution, or unknown).
  pub name: String,
  /// Index of the base target whose feature diff drives clone decisions.
  pub base: u32,
  /// Enabled features and clone flags.
  pub en: FeatureFlags,
  /// Explicitly disabled features.
  pub dis: FeatureFlags,
  /// Extra backend flags appended verbatim after emission.
  pub ext_features: String,
}

impl TargetData {
  /// A target with just a name, no modifiers.
  #[must_use]
  pub fn named(name: &str) -> Self {
    Self { name: String::from(name), ..Self::default() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flag_bits_match_the_image_abi() {
    assert_eq!(flags::VEC_CALL, 1);
    assert_eq!(flags::CLONE_ALL, 2);
    assert_eq!(flags::CLONE_LOOP, 4);
    assert_eq!(flags::CLONE_SIMD, 8);
    assert_eq!(flags::CLONE_MATH, 16);
    assert_eq!(flags::CLONE_CPU, 32);
    assert_eq!(flags::CLONE_FLOAT16, 64);
    assert_eq!(flags::UNKNOWN_NAME, 256);
  }

  #[test]
  fn named_target_is_bare() {
    let t = TargetData::named("cortex-a76");
    assert_eq!(t.name, "cortex-a76");
    assert_eq!(t.base, 0);
    assert!(t.en.features.is_empty());
    assert!(t.dis.features.is_empty());
    assert!(t.ext_features.is_empty());
  }
}
