//! Architecture family selection.
//!
//! The catalogs are split between the two ARM families; exactly one is
//! active in a process ([`Family::native`]), but both compile everywhere so
//! the whole pipeline can be exercised off-target. Every family-dependent
//! decision — name tables, dependency closures, generic fallbacks, vector
//! register sizing — dispatches through [`Family`].

use crate::{
  cpu::{self, Cpu, CpuSpec},
  cpuid::{CpuId, cpuid_to_cpu},
  features::{self, FeatureName, FeatureSet},
};

// ─────────────────────────────────────────────────────────────────────────────
// Arch tuple
// ─────────────────────────────────────────────────────────────────────────────

/// Architecture version/profile tuple.
///
/// Derived from build constants on AArch64 (always `{8, 'A'}`) and from the
/// kernel's machine string on AArch32. `profile` is one of `b'A'`, `b'R'`,
/// `b'M'`, or 0 when unknown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmArch {
  /// Architecture version (6, 7, 8).
  pub version: u8,
  /// Profile letter, 0 when undetermined.
  pub profile: u8,
}

impl ArmArch {
  /// The fixed AArch64 tuple.
  pub const AARCH64: Self = Self { version: 8, profile: b'A' };

  /// Check for the M profile.
  #[inline]
  #[must_use]
  pub const fn is_mclass(self) -> bool {
    self.profile == b'M'
  }

  /// Derive the tuple from a kernel machine string (`uname().machine`).
  ///
  /// Unrecognized strings answer version 0; the caller maxes the result
  /// with the build floor.
  #[must_use]
  pub fn from_machine(machine: &str) -> Self {
    match machine {
      "armv6l" => Self { version: 6, profile: 0 },
      "armv7l" => Self { version: 7, profile: 0 },
      "armv7ml" => Self { version: 7, profile: b'M' },
      "armv8l" | "aarch64" => Self { version: 8, profile: 0 },
      _ => Self { version: 0, profile: 0 },
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Family
// ─────────────────────────────────────────────────────────────────────────────

/// ARM architecture family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
  /// 32-bit ARM (armv6/armv7/armv8 AArch32 state).
  AArch32,
  /// 64-bit ARM.
  AArch64,
}

impl Family {
  /// The family active for this build.
  ///
  /// Non-ARM builds get the AArch64 tables so the pipeline stays usable in
  /// tests and tools; host discovery on such builds degrades to `generic`.
  #[inline]
  #[must_use]
  pub const fn native() -> Self {
    #[cfg(target_arch = "arm")]
    {
      Self::AArch32
    }
    #[cfg(not(target_arch = "arm"))]
    {
      Self::AArch64
    }
  }

  /// Feature name table of the family.
  #[inline]
  #[must_use]
  pub const fn feature_names(self) -> &'static [FeatureName] {
    match self {
      Self::AArch32 => features::aarch32::NAMES,
      Self::AArch64 => features::aarch64::NAMES,
    }
  }

  /// CPU catalog of the family.
  #[inline]
  #[must_use]
  pub const fn cpus(self) -> &'static [CpuSpec] {
    match self {
      Self::AArch32 => cpu::aarch32::SPECS,
      Self::AArch64 => cpu::aarch64::SPECS,
    }
  }

  /// Union of every named feature bit of the family.
  #[inline]
  #[must_use]
  pub const fn catalog_mask(self) -> FeatureSet {
    match self {
      Self::AArch32 => features::aarch32::CATALOG_MASK,
      Self::AArch64 => features::aarch64::CATALOG_MASK,
    }
  }

  /// Machine-feature bits of the family (nominal word excluded).
  #[inline]
  #[must_use]
  pub const fn real_mask(self) -> FeatureSet {
    self.catalog_mask().intersection(features::REAL_MASK)
  }

  /// Upward dependency closure (architectural ladders + edge fixpoint).
  pub fn enable_depends(self, features: &mut FeatureSet) {
    match self {
      Self::AArch32 => features::aarch32::enable_depends(features),
      Self::AArch64 => features::aarch64::enable_depends(features),
    }
  }

  /// Downward dependency closure.
  pub fn disable_depends(self, features: &mut FeatureSet) {
    match self {
      Self::AArch32 => features::aarch32::disable_depends(features),
      Self::AArch64 => features::aarch64::disable_depends(features),
    }
  }

  /// Look up a catalog entry by name.
  #[inline]
  #[must_use]
  pub fn find_cpu(self, name: &str) -> Option<&'static CpuSpec> {
    cpu::find_cpu_by_name(self.cpus(), name)
  }

  /// Look up a catalog entry by model.
  #[inline]
  #[must_use]
  pub fn find_cpu_by_id(self, id: Cpu) -> Option<&'static CpuSpec> {
    cpu::find_cpu_by_id(self.cpus(), id)
  }

  /// Canonical name of a model within the family.
  #[inline]
  #[must_use]
  pub fn cpu_name(self, id: Cpu) -> &'static str {
    cpu::find_cpu_name(self.cpus(), id)
  }

  /// Map an identification record to a model.
  ///
  /// The answer may be a model the family does not list; discovery filters
  /// those through [`Family::check_cpu_arch_ver`].
  #[must_use]
  pub fn cpu_for_cpuid(self, id: CpuId) -> Cpu {
    cpuid_to_cpu(id)
  }

  /// Maximum vector register size in bytes for a feature set.
  #[must_use]
  pub fn max_vector_size(self, f: &FeatureSet) -> u32 {
    match self {
      Self::AArch32 => {
        if f.test(features::aarch32::NEON) {
          16
        } else {
          8
        }
      }
      Self::AArch64 => {
        if f.test(features::aarch64::SVE2) {
          256
        } else if f.test(features::aarch64::SVE) {
          128
        } else {
          16
        }
      }
    }
  }

  /// Architecture tuple implied by a feature set.
  ///
  /// AArch64 features always imply `{8, 'A'}`.
  #[must_use]
  pub fn feature_arch_version(self, f: &FeatureSet) -> ArmArch {
    match self {
      Self::AArch64 => ArmArch::AARCH64,
      Self::AArch32 => {
        use features::aarch32::{ACLASS, MCLASS, RCLASS, V7, V8};
        let version = if f.test(V8) {
          8
        } else if f.test(V7) {
          7
        } else {
          return ArmArch { version: 6, profile: 0 };
        };
        let profile = if f.test(MCLASS) {
          b'M'
        } else if f.test(RCLASS) {
          b'R'
        } else if f.test(ACLASS) {
          b'A'
        } else {
          0
        };
        ArmArch { version, profile }
      }
    }
  }

  /// Architecture alias to fall back to when no specific core survives
  /// discovery.
  #[must_use]
  pub fn generic_for_arch(self, arch: ArmArch) -> Cpu {
    match self {
      Self::AArch64 => Cpu::Generic,
      Self::AArch32 => {
        if arch.version >= 8 {
          match arch.profile {
            b'M' => Cpu::Armv8MBase,
            b'R' => Cpu::Armv8R,
            _ => Cpu::Armv8A,
          }
        } else if arch.version == 7 {
          match arch.profile {
            b'M' => Cpu::Armv7M,
            b'R' => Cpu::Armv7R,
            _ => Cpu::Armv7A,
          }
        } else {
          Cpu::Generic
        }
      }
    }
  }

  /// Check that a model is usable under the detected architecture.
  ///
  /// Rejects models the family does not list (an AArch64 id seen in an
  /// AArch32 boot), profile mismatches, and models older than the running
  /// architecture version.
  #[must_use]
  pub fn check_cpu_arch_ver(self, id: Cpu, arch: ArmArch) -> bool {
    let Some(spec) = self.find_cpu_by_id(id) else {
      return false;
    };
    let feature_arch = self.feature_arch_version(&spec.features);
    if arch.is_mclass() != feature_arch.is_mclass() {
      return false;
    }
    arch.version <= feature_arch.version
  }

  /// The widest feature set the family admits under `arch`.
  ///
  /// Used to build the disassembler target, which must accept every
  /// instruction any multi-versioned clone may contain.
  #[must_use]
  pub fn max_features(self, arch: ArmArch) -> FeatureSet {
    match self {
      Self::AArch64 => self.catalog_mask(),
      Self::AArch32 => {
        use features::aarch32 as f;
        let mut set = self.real_mask();
        let profile = if arch.profile == 0 { b'A' } else { arch.profile };
        set.set(f::V7, true);
        set.set(f::V8, true);
        match profile {
          b'M' => {
            set.set(f::MCLASS, true);
            set.set(f::V8_M_MAIN, true);
          }
          b'R' => set.set(f::RCLASS, true),
          _ => {
            set.set(f::ACLASS, true);
            set.set(f::V8_1A, true);
            set.set(f::V8_2A, true);
            set.set(f::V8_3A, true);
            set.set(f::V8_4A, true);
            set.set(f::V8_5A, true);
            set.set(f::V8_6A, true);
          }
        }
        set
      }
    }
  }
}
