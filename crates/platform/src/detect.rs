//! Host CPU discovery.
//!
//! Discovery fuses three kernel/OS sources:
//!
//! 1. The auxiliary vector (`HWCAP`/`HWCAP2`) — coarse feature bits the
//!    kernel chose to expose.
//! 2. Per-core identification registers (MIDR_EL1 via sysfs, with a
//!    `/proc/cpuinfo` fallback) — used to look up the known feature set of
//!    each core's design, because kernels lag behind silicon.
//! 3. On Darwin, the vendor brand string.
//!
//! Everything OS-specific is confined to [`os`]; the fusion itself is the
//! pure [`host_from_input`], so tests inject synthetic auxval/MIDR/procfs
//! content instead of needing hardware.
//!
//! The fused result is published once per process through [`host`] and is
//! immutable afterwards; a pre-init [`set_override`] hook serves tests and
//! callers that know their CPU better than the kernel does.

#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

use crate::{cpu::Cpu, family::Family, features::FeatureSet};
#[cfg(feature = "std")]
use crate::{cpuid::CpuId, family::ArmArch};

#[cfg(feature = "std")]
pub mod os;

/// A detected host: model plus fused feature vector.
pub type Host = (Cpu, FeatureSet);

// ─────────────────────────────────────────────────────────────────────────────
// Injectable discovery input
// ─────────────────────────────────────────────────────────────────────────────

/// Raw OS observations, before fusion.
#[cfg(feature = "std")]
#[derive(Clone, Debug, Default)]
pub struct HostInput {
  /// Auxiliary vector entry 16 (0 when missing).
  pub hwcap: u64,
  /// Auxiliary vector entry 26 (0 when missing).
  pub hwcap2: u64,
  /// Per-core identification records, duplicates allowed.
  pub cpuids: Vec<CpuId>,
  /// `uname().machine`, when available (AArch32 arch derivation).
  pub machine: Option<String>,
}

/// Build-time architecture floor.
///
/// The kernel machine string can under-report inside 32-bit containers on
/// 64-bit kernels; the floor keeps the derived version at least at what
/// this binary was compiled for.
#[cfg(feature = "std")]
const fn compiled_arch(family: Family) -> ArmArch {
  match family {
    Family::AArch64 => ArmArch::AARCH64,
    Family::AArch32 => ArmArch { version: 6, profile: 0 },
  }
}

#[cfg(feature = "std")]
fn elf_arch(family: Family, machine: Option<&str>) -> ArmArch {
  let floor = compiled_arch(family);
  if family == Family::AArch64 {
    return ArmArch::AARCH64;
  }
  let mut arch = machine.map(ArmArch::from_machine).unwrap_or(floor);
  if floor.version > arch.version {
    arch.version = floor.version;
  }
  if arch.profile == 0 {
    arch.profile = floor.profile;
  }
  arch
}

// ─────────────────────────────────────────────────────────────────────────────
// big.LITTLE shrink
// ─────────────────────────────────────────────────────────────────────────────

/// v8-generation big→little orderings observed in shipping big.LITTLE
/// pairings. Position in the list is the rank; only listed models shrink.
#[cfg(feature = "std")]
const V8_ORDER: &[Cpu] = &[
  Cpu::CortexA35,
  Cpu::CortexA53,
  Cpu::CortexA55,
  Cpu::CortexA57,
  Cpu::CortexA72,
  Cpu::CortexA73,
  Cpu::CortexA75,
  Cpu::CortexA76,
  Cpu::NeoverseN1,
  Cpu::NeoverseN2,
  Cpu::NeoverseV1,
  Cpu::Denver2,
  Cpu::Carmel,
  Cpu::ExynosM1,
  Cpu::ExynosM2,
  Cpu::ExynosM3,
  Cpu::ExynosM4,
  Cpu::ExynosM5,
];

/// v7-generation ordering (Cortex-A5 … A17).
#[cfg(feature = "std")]
const V7_ORDER: &[Cpu] = &[
  Cpu::CortexA5,
  Cpu::CortexA7,
  Cpu::CortexA8,
  Cpu::CortexA9,
  Cpu::CortexA12,
  Cpu::CortexA15,
  Cpu::CortexA17,
];

/// Drop every ranked model below the best ranked model present.
///
/// Models absent from `order` are untouched. When several models survive
/// (unranked combinations), the caller keeps the first in observed order;
/// which one that is is unspecified.
#[cfg(feature = "std")]
pub fn shrink_big_little(list: &mut Vec<(Cpu, CpuId)>, order: &[Cpu]) {
  let rank = |cpu: Cpu| order.iter().position(|&o| o == cpu);
  let max = list.iter().filter_map(|&(cpu, _)| rank(cpu)).max();
  if let Some(max) = max {
    list.retain(|&(cpu, _)| match rank(cpu) {
      Some(r) => r >= max,
      None => true,
    });
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fusion
// ─────────────────────────────────────────────────────────────────────────────

/// Fuse raw OS observations into a host (model, feature vector).
///
/// The kernel capability words seed the vector; recognized cores then
/// contribute the *intersection* of their catalog base sets (cores in a
/// big.LITTLE pair may differ, only the common subset is safe), which is
/// unioned in. A single unrecognized core empties that contribution.
/// Kernel bits the catalog does not name are masked off at the end.
#[cfg(feature = "std")]
#[must_use]
pub fn host_from_input(family: Family, input: &HostInput) -> Host {
  let mut features = FeatureSet([input.hwcap as u32, input.hwcap2 as u32, 0]);
  if family == Family::AArch64 && features.test(crate::features::aarch64::HWCAP_PACG) {
    features.set(crate::features::aarch64::PAUTH, true);
  }

  let arch = elf_arch(family, input.machine.as_deref());
  if family == Family::AArch32 {
    use crate::features::aarch32 as f;
    if arch.version >= 7 {
      match arch.profile {
        b'M' => features.set(f::MCLASS, true),
        b'R' => features.set(f::RCLASS, true),
        b'A' => features.set(f::ACLASS, true),
        _ => {}
      }
      if arch.version >= 8 {
        features.set(f::V8, true);
      }
      features.set(f::V7, true);
    }
  }

  // Dedup the records; the sysfs/procfs readers report one per core.
  let mut cpuids = input.cpuids.clone();
  cpuids.sort_unstable();
  cpuids.dedup();

  let mut seen: Vec<Cpu> = Vec::new();
  let mut list: Vec<(Cpu, CpuId)> = Vec::new();
  let mut extra_initialized = false;
  let mut extra = FeatureSet::NONE;
  for id in cpuids {
    let cpu = family.cpu_for_cpuid(id);
    if cpu == Cpu::Generic {
      // Unrecognized core: the common subset of known cores is no longer
      // trustworthy.
      if extra_initialized {
        extra = FeatureSet::NONE;
      }
      extra_initialized = true;
      continue;
    }
    if !family.check_cpu_arch_ver(cpu, arch) {
      continue;
    }
    if !seen.contains(&cpu) {
      seen.push(cpu);
      // Family listing is guaranteed by check_cpu_arch_ver above.
      let base = family.find_cpu_by_id(cpu).map_or(FeatureSet::NONE, |s| s.features);
      if extra_initialized {
        extra = extra.intersection(base);
      } else {
        extra_initialized = true;
        extra = base;
      }
      list.push((cpu, id));
    }
  }
  features |= extra;

  shrink_big_little(&mut list, V8_ORDER);
  if family == Family::AArch32 {
    shrink_big_little(&mut list, V7_ORDER);
  }

  let cpu = match list.first() {
    None => family.generic_for_arch(arch),
    Some(&(cpu, _)) => cpu,
  };

  features &= family.catalog_mask();
  (cpu, features)
}

/// Map a Darwin brand string to an Apple silicon host.
///
/// Unrecognized Apple silicon answers the M1 baseline.
#[cfg(feature = "std")]
#[must_use]
pub fn host_from_brand(brand: &str) -> Host {
  let cpu = if brand.contains("M1") {
    Cpu::AppleM1
  } else if brand.contains("M2") {
    Cpu::AppleM2
  } else if brand.contains("M3") {
    Cpu::AppleM3
  } else if brand.contains("M4") {
    Cpu::AppleM4
  } else {
    Cpu::AppleM1
  };
  let features = Family::AArch64.find_cpu_by_id(cpu).map_or(FeatureSet::NONE, |s| s.features);
  (cpu, features)
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot cache and pre-init override
// ─────────────────────────────────────────────────────────────────────────────

/// Error from [`try_set_override`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OverrideError {
  /// The host cache is already published; overrides are pre-init only.
  AlreadyInitialized,
  /// This build has no override storage.
  Unsupported,
}

impl core::fmt::Display for OverrideError {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::AlreadyInitialized => f.write_str("host CPU already detected"),
      Self::Unsupported => f.write_str("host override not supported on this build"),
    }
  }
}

impl core::error::Error for OverrideError {}

#[cfg(feature = "std")]
static HOST: std::sync::OnceLock<Host> = std::sync::OnceLock::new();

#[cfg(feature = "std")]
static OVERRIDE: std::sync::RwLock<Option<Host>> = std::sync::RwLock::new(None);

/// Set a host override.
///
/// Contract: pre-init only. Once [`host`] has published a result, the
/// override is rejected.
#[cfg(feature = "std")]
#[cold]
pub fn try_set_override(value: Option<Host>) -> Result<(), OverrideError> {
  if HOST.get().is_some() {
    return Err(OverrideError::AlreadyInitialized);
  }
  match OVERRIDE.write() {
    Ok(mut guard) => {
      *guard = value;
      Ok(())
    }
    Err(_) => Err(OverrideError::Unsupported),
  }
}

/// Set a host override, panicking after first use.
#[cfg(feature = "std")]
#[cold]
pub fn set_override(value: Option<Host>) {
  if let Err(err) = try_set_override(value) {
    panic!("platform::detect::set_override failed: {err}");
  }
}

#[cfg(feature = "std")]
fn detect_with_override() -> Host {
  if let Ok(guard) = OVERRIDE.read() {
    if let Some(host) = *guard {
      return host;
    }
  }
  os::detect_uncached()
}

/// The host CPU, detected once per process.
///
/// Any number of concurrent first callers observe a single evaluation and
/// an identical frozen result; subsequent reads are lock-free.
#[must_use]
pub fn host() -> Host {
  #[cfg(feature = "std")]
  {
    *HOST.get_or_init(detect_with_override)
  }
  #[cfg(not(feature = "std"))]
  {
    // No OS sources without std; degrade to the generic baseline.
    (Cpu::Generic, FeatureSet::NONE)
  }
}

/// Canonical name of the host CPU within the active family.
#[must_use]
pub fn host_cpu_name() -> &'static str {
  Family::native().cpu_name(host().0)
}

/// Consult the host feature vector for one bit.
///
/// Out-of-range bits are absent, never an error.
#[must_use]
pub fn test_cpu_feature(bit: u32) -> bool {
  host().1.test(bit)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "std"))]
mod tests {
  use super::*;
  use crate::features::{aarch32, aarch64};
  use std::vec;

  fn id(implementer: u8, variant: u8, part: u16) -> CpuId {
    CpuId { implementer, variant, part }
  }

  #[test]
  fn hwcap_words_seed_the_vector() {
    let input = HostInput {
      hwcap: (1 << aarch64::AES) | (1 << aarch64::CRC),
      hwcap2: 0,
      ..HostInput::default()
    };
    let (cpu, features) = host_from_input(Family::AArch64, &input);
    assert_eq!(cpu, Cpu::Generic);
    assert!(features.test(aarch64::AES));
    assert!(features.test(aarch64::CRC));
    assert!(!features.test(aarch64::SHA2));
  }

  #[test]
  fn hwcap2_lands_in_word_one() {
    let input = HostInput {
      hwcap2: 1 << (aarch64::SVE2 - 32),
      hwcap: 1 << aarch64::SVE,
      ..HostInput::default()
    };
    let (_, features) = host_from_input(Family::AArch64, &input);
    assert!(features.test(aarch64::SVE2));
    assert!(features.test(aarch64::SVE));
  }

  #[test]
  fn unnamed_kernel_bits_are_masked_off() {
    // HWCAP bits 0-2 (fp, asimd, evtstrm) have no catalog name.
    let input = HostInput { hwcap: 0b111, ..HostInput::default() };
    let (_, features) = host_from_input(Family::AArch64, &input);
    assert!(features.is_empty());
  }

  #[test]
  fn pacg_lifts_pauth() {
    let input = HostInput { hwcap: 1 << aarch64::HWCAP_PACG, ..HostInput::default() };
    let (_, features) = host_from_input(Family::AArch64, &input);
    assert!(features.test(aarch64::PAUTH));
  }

  #[test]
  fn known_core_contributes_its_base_set() {
    let input = HostInput {
      cpuids: vec![id(0x41, 0, 0xd07)], // cortex-a57
      ..HostInput::default()
    };
    let (cpu, features) = host_from_input(Family::AArch64, &input);
    assert_eq!(cpu, Cpu::CortexA57);
    assert!(features.test(aarch64::CRC));
    assert!(features.test(aarch64::AES));
  }

  #[test]
  fn big_little_intersects_and_shrinks() {
    // exynos-m3 (big) + cortex-a55 (little), as shipped in the Exynos 9810.
    let input = HostInput {
      cpuids: vec![id(0x53, 1, 0x2), id(0x41, 0, 0xd05)],
      ..HostInput::default()
    };
    let (cpu, features) = host_from_input(Family::AArch64, &input);
    // m3 outranks a55 in the v8 ordering.
    assert_eq!(cpu, Cpu::ExynosM3);
    // Feature union only carries the common subset: the a55's v8.2 bits are
    // not in the m3 base set.
    assert!(features.test(aarch64::CRC));
    assert!(!features.test(aarch64::DOTPROD));
  }

  #[test]
  fn unknown_core_poisons_extra_features() {
    let input = HostInput {
      cpuids: vec![id(0x41, 0, 0xd07), id(0x99, 0, 0x123)],
      ..HostInput::default()
    };
    let (cpu, features) = host_from_input(Family::AArch64, &input);
    assert_eq!(cpu, Cpu::CortexA57);
    // The a57 base set must not leak once an unknown core was seen.
    assert!(!features.test(aarch64::AES));
  }

  #[test]
  fn duplicate_records_collapse() {
    let input = HostInput {
      cpuids: vec![id(0x41, 0, 0xd03); 8],
      ..HostInput::default()
    };
    let (cpu, _) = host_from_input(Family::AArch64, &input);
    assert_eq!(cpu, Cpu::CortexA53);
  }

  #[test]
  fn no_cores_fall_back_to_arch_generic() {
    let input = HostInput {
      machine: Some("armv7l".into()),
      ..HostInput::default()
    };
    let (cpu, features) = host_from_input(Family::AArch32, &input);
    assert_eq!(cpu, Cpu::Armv7A);
    assert!(features.test(aarch32::V7));
    // armv7l does not carry a profile letter; no class bit is set.
    assert!(!features.test(aarch32::ACLASS));
    assert!(!features.test(aarch32::V8));
  }

  #[test]
  fn armv7ml_machine_sets_the_m_profile() {
    let input = HostInput {
      machine: Some("armv7ml".into()),
      ..HostInput::default()
    };
    let (cpu, features) = host_from_input(Family::AArch32, &input);
    assert_eq!(cpu, Cpu::Armv7M);
    assert!(features.test(aarch32::MCLASS));
  }

  #[test]
  fn aarch32_v8_machine_sets_version_bits() {
    let input = HostInput {
      machine: Some("armv8l".into()),
      ..HostInput::default()
    };
    let (cpu, features) = host_from_input(Family::AArch32, &input);
    assert_eq!(cpu, Cpu::Armv8A);
    assert!(features.test(aarch32::V8));
    assert!(features.test(aarch32::V7));
  }

  #[test]
  fn aarch64_only_model_ignored_on_aarch32() {
    // An Apple M1 record is meaningless to the 32-bit catalog and must not
    // contribute a model or features.
    let input = HostInput {
      cpuids: vec![id(0x61, 0, 0x23)],
      machine: Some("armv7l".into()),
      ..HostInput::default()
    };
    let (cpu, features) = host_from_input(Family::AArch32, &input);
    assert_eq!(cpu, Cpu::Armv7A);
    assert!(!features.test(aarch32::CRYPTO));
  }

  #[test]
  fn v7_pair_shrinks_to_big() {
    let input = HostInput {
      cpuids: vec![id(0x41, 0, 0xc07), id(0x41, 0, 0xc0f)], // a7 + a15
      machine: Some("armv7l".into()),
      ..HostInput::default()
    };
    let (cpu, _) = host_from_input(Family::AArch32, &input);
    assert_eq!(cpu, Cpu::CortexA15);
  }

  #[test]
  fn shrink_keeps_unranked_models() {
    let mut list = vec![(Cpu::CortexA53, id(0x41, 0, 0xd03)), (Cpu::A64Fx, id(0x46, 0, 0x1))];
    shrink_big_little(&mut list, V8_ORDER);
    assert_eq!(list.len(), 2);
  }

  #[test]
  fn brand_strings_map_to_m_series() {
    assert_eq!(host_from_brand("Apple M2 Max").0, Cpu::AppleM2);
    assert_eq!(host_from_brand("Apple M4").0, Cpu::AppleM4);
    // Unrecognized Apple silicon answers the M1 baseline.
    assert_eq!(host_from_brand("Apple A99").0, Cpu::AppleM1);
    let (_, features) = host_from_brand("Apple M2");
    assert!(features.test(aarch64::I8MM));
  }

  #[test]
  fn host_is_stable_across_calls() {
    let a = host();
    let b = host();
    assert_eq!(a, b);
    assert!(!test_cpu_feature(u32::MAX));
  }
}
