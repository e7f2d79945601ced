//! Closed catalog of ARM CPU models.
//!
//! [`Cpu`] enumerates every microarchitecture the dispatcher knows about,
//! across both 32- and 64-bit families. The per-family [`CpuSpec`] tables
//! (in [`aarch64`] and [`aarch32`]) attach a canonical name, a base feature
//! set, and a backend fallback to each model: when the running compiler
//! backend predates `min_backend`, the emitter walks `fallback` until it
//! reaches a model the backend accepts. Every fallback chain terminates at
//! a model with `min_backend == 0`.
//!
//! A model may appear in both family tables (e.g. `cortex-a53`) with
//! different base features; only the table of the active family is
//! consulted by the process-level pipeline.

use crate::features::FeatureSet;

/// CPU model identifier.
///
/// The discriminants are stable: they are the values the image format
/// serializes. `Generic` doubles as the "unknown" answer of the CPUID
/// decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum Cpu {
  #[default]
  Generic = 0,

  // Architecture targets
  Armv7A,
  Armv7M,
  Armv7EM,
  Armv7R,
  Armv8A,
  Armv8MBase,
  Armv8MMain,
  Armv8R,
  Armv8_1A,
  Armv8_2A,
  Armv8_3A,
  Armv8_4A,
  Armv8_5A,
  Armv8_6A,

  // ARM Ltd.
  // armv6l
  ArmMpcore,
  Arm1136jfS,
  Arm1156t2fS,
  Arm1176jzfS,
  CortexM0,
  CortexM1,
  // armv7ml
  CortexM3,
  CortexM4,
  CortexM7,
  // armv7l
  CortexA5,
  CortexA7,
  CortexA8,
  CortexA9,
  CortexA12,
  CortexA15,
  CortexA17,
  CortexR4,
  CortexR5,
  CortexR7,
  CortexR8,
  // armv8ml
  CortexM23,
  CortexM33,
  // armv8l
  CortexA32,
  CortexR52,
  // aarch64
  CortexA34,
  CortexA35,
  CortexA53,
  CortexA55,
  CortexA57,
  CortexA65,
  CortexA65Ae,
  CortexA72,
  CortexA73,
  CortexA75,
  CortexA76,
  CortexA76Ae,
  CortexA77,
  CortexA78,
  CortexX1,
  NeoverseE1,
  NeoverseN1,
  NeoverseV1,
  NeoverseN2,

  // Cavium / Marvell OcteonTX
  ThunderX,
  ThunderXT88,
  ThunderXT88P1,
  ThunderXT81,
  ThunderXT83,
  ThunderX2T99,
  ThunderX2T99P1,
  OcteonTx2,
  OcteonTx2T98,
  OcteonTx2T96,
  OcteonTx2F95,
  OcteonTx2F95N,
  OcteonTx2F95Mm,

  // Fujitsu
  A64Fx,

  // HiSilicon
  Tsv110,

  // Huaxintong
  Phecda,

  // NVIDIA
  Denver1,
  Denver2,
  Carmel,

  // AppliedMicro
  XGene1,
  XGene2,
  XGene3,

  // Qualcomm
  Scorpion,
  Krait,
  Kyro,
  Falkor,
  Saphira,

  // Samsung
  ExynosM1,
  ExynosM2,
  ExynosM3,
  ExynosM4,
  ExynosM5,

  // Apple
  Swift,
  AppleA7,
  AppleA8,
  AppleA9,
  AppleA10,
  AppleA11,
  AppleA12,
  AppleA13,
  AppleA14,
  AppleA15,
  AppleA16,
  AppleA17,
  AppleM1,
  AppleM2,
  AppleM3,
  AppleM4,
  AppleS4,
  AppleS5,

  // Marvell
  Pj4,
  ThunderX3T110,

  // Intel
  Intel3735D,
}

impl Cpu {
  /// Check whether this is an architecture alias rather than a specific
  /// microarchitecture.
  #[must_use]
  pub const fn is_generic(self) -> bool {
    matches!(
      self,
      Self::Generic
        | Self::Armv7A
        | Self::Armv7M
        | Self::Armv7EM
        | Self::Armv7R
        | Self::Armv8A
        | Self::Armv8MBase
        | Self::Armv8MMain
        | Self::Armv8R
        | Self::Armv8_1A
        | Self::Armv8_2A
        | Self::Armv8_3A
        | Self::Armv8_4A
        | Self::Armv8_5A
        | Self::Armv8_6A
    )
  }
}

/// Static descriptor of one catalog entry.
#[derive(Clone, Copy, Debug)]
pub struct CpuSpec {
  /// Canonical name, as accepted in target strings.
  pub name: &'static str,
  /// Model this entry describes.
  pub cpu: Cpu,
  /// Model to substitute when the backend predates `min_backend`.
  pub fallback: Cpu,
  /// Minimum backend release that accepts `name` (0 = always).
  pub min_backend: u32,
  /// Base feature set of the model.
  pub features: FeatureSet,
}

/// Look up a catalog entry by canonical name.
#[must_use]
pub fn find_cpu_by_name<'a>(specs: &'a [CpuSpec], name: &str) -> Option<&'a CpuSpec> {
  specs.iter().find(|s| s.name == name)
}

/// Look up a catalog entry by model id.
///
/// Aliased models (several rows sharing a `cpu`) resolve to the first row,
/// which is the canonical one.
#[must_use]
pub fn find_cpu_by_id(specs: &[CpuSpec], cpu: Cpu) -> Option<&CpuSpec> {
  specs.iter().find(|s| s.cpu == cpu)
}

/// Canonical name of a model, or `"generic"` when the family does not list
/// it.
#[must_use]
pub fn find_cpu_name(specs: &[CpuSpec], cpu: Cpu) -> &'static str {
  find_cpu_by_id(specs, cpu).map_or("generic", |s| s.name)
}

pub mod aarch32;
pub mod aarch64;
