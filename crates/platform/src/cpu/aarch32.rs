//! AArch32 CPU catalog.
//!
//! The profile base sets (`_ARMV7A` and friends) are the real architectural
//! requirements; the v8 ladder then layers version markers, `crc`, and the
//! single `crypto` block on top. The 32-bit table also lists the v8 cores
//! that can boot an AArch32 kernel.

use crate::{
  cpu::{Cpu, CpuSpec},
  features::{FeatureSet, aarch32 as f},
};

/// Catalog entries whose name no backend release accepts yet.
const NO_BACKEND: u32 = u32::MAX;

const GENERIC: FeatureSet = FeatureSet::NONE;
const ARMV7M: FeatureSet = FeatureSet::of(&[f::V7, f::MCLASS, f::HWDIV]);
const ARMV7A: FeatureSet = FeatureSet::of(&[f::V7, f::ACLASS]);
const ARMV7R: FeatureSet = FeatureSet::of(&[f::V7, f::RCLASS]);
const ARMV8M: FeatureSet = FeatureSet::of(&[f::V7, f::V8, f::MCLASS, f::HWDIV]);
const ARMV8A: FeatureSet = FeatureSet::of(&[
  f::V7,
  f::V8,
  f::ACLASS,
  f::NEON,
  f::VFP3,
  f::VFP4,
  f::D32,
  f::HWDIV,
  f::HWDIV_ARM,
]);
const ARMV8R: FeatureSet = FeatureSet::of(&[
  f::V7,
  f::V8,
  f::RCLASS,
  f::NEON,
  f::VFP3,
  f::VFP4,
  f::D32,
  f::HWDIV,
  f::HWDIV_ARM,
]);

// armv7l cores
const CORTEX_A5: FeatureSet = ARMV7A;
const CORTEX_A7: FeatureSet = ARMV7A.union(FeatureSet::of(&[f::VFP3, f::VFP4, f::NEON]));
const CORTEX_A8: FeatureSet = ARMV7A.union(FeatureSet::of(&[f::D32, f::VFP3, f::NEON]));
const CORTEX_A9: FeatureSet = ARMV7A;
const CORTEX_A12: FeatureSet = ARMV7A.union(FeatureSet::of(&[f::D32, f::VFP3, f::VFP4, f::NEON]));
const CORTEX_R4: FeatureSet = ARMV7R.union(FeatureSet::of(&[f::VFP3, f::HWDIV]));
const CORTEX_R5: FeatureSet = ARMV7R.union(FeatureSet::of(&[f::VFP3, f::HWDIV, f::HWDIV_ARM]));
const SCORPION: FeatureSet = ARMV7A.union(FeatureSet::of(&[f::VFP3, f::NEON]));
const KRAIT: FeatureSet = ARMV7A.union(FeatureSet::of(&[f::VFP3, f::VFP4, f::NEON, f::HWDIV, f::HWDIV_ARM]));
const SWIFT: FeatureSet = ARMV7A.union(FeatureSet::of(&[f::D32, f::VFP3, f::VFP4, f::NEON, f::HWDIV, f::HWDIV_ARM]));
const PJ4: FeatureSet = ARMV7A.union(FeatureSet::of(&[f::VFP3]));
const INTEL_3735D: FeatureSet = ARMV7A.union(FeatureSet::of(&[f::VFP3, f::NEON]));

// armv8ml cores
const CORTEX_M23: FeatureSet = ARMV8M;
const CORTEX_M33: FeatureSet = ARMV8M.union(FeatureSet::of(&[f::V8_M_MAIN]));

// armv8l ladder
const ARMV8A_CRC: FeatureSet = ARMV8A.union(FeatureSet::of(&[f::CRC]));
const ARMV8_1A: FeatureSet = ARMV8A_CRC.union(FeatureSet::of(&[f::V8_1A]));
const ARMV8_2A: FeatureSet = ARMV8_1A.union(FeatureSet::of(&[f::V8_2A]));
const ARMV8A_CRC_CRYPTO: FeatureSet = ARMV8A_CRC.union(FeatureSet::of(&[f::CRYPTO]));
const ARMV8_2A_CRYPTO: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::CRYPTO]));
const ARMV8_3A: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::V8_3A]));
const ARMV8_3A_CRYPTO: FeatureSet = ARMV8_3A.union(FeatureSet::of(&[f::CRYPTO]));
const ARMV8_4A: FeatureSet = ARMV8_3A.union(FeatureSet::of(&[f::V8_4A]));
const ARMV8_5A: FeatureSet = ARMV8_4A.union(FeatureSet::of(&[f::V8_5A]));
const ARMV8_6A: FeatureSet = ARMV8_5A.union(FeatureSet::of(&[f::V8_6A]));

/// The AArch32 catalog.
pub const SPECS: &[CpuSpec] = &[
  CpuSpec { name: "generic", cpu: Cpu::Generic, fallback: Cpu::Generic, min_backend: 0, features: GENERIC },
  // armv6
  CpuSpec { name: "mpcore", cpu: Cpu::ArmMpcore, fallback: Cpu::Generic, min_backend: 0, features: GENERIC },
  CpuSpec { name: "arm1136jf-s", cpu: Cpu::Arm1136jfS, fallback: Cpu::Generic, min_backend: 0, features: GENERIC },
  CpuSpec { name: "arm1156t2f-s", cpu: Cpu::Arm1156t2fS, fallback: Cpu::Generic, min_backend: 0, features: GENERIC },
  CpuSpec { name: "arm1176jzf-s", cpu: Cpu::Arm1176jzfS, fallback: Cpu::Generic, min_backend: 0, features: GENERIC },
  CpuSpec { name: "cortex-m0", cpu: Cpu::CortexM0, fallback: Cpu::Generic, min_backend: 0, features: GENERIC },
  CpuSpec { name: "cortex-m1", cpu: Cpu::CortexM1, fallback: Cpu::Generic, min_backend: 0, features: GENERIC },
  // armv7ml
  CpuSpec { name: "armv7-m", cpu: Cpu::Armv7M, fallback: Cpu::Generic, min_backend: 0, features: ARMV7M },
  CpuSpec { name: "armv7e-m", cpu: Cpu::Armv7EM, fallback: Cpu::Generic, min_backend: 0, features: ARMV7M },
  CpuSpec { name: "cortex-m3", cpu: Cpu::CortexM3, fallback: Cpu::Generic, min_backend: 0, features: ARMV7M },
  CpuSpec { name: "cortex-m4", cpu: Cpu::CortexM4, fallback: Cpu::Generic, min_backend: 0, features: ARMV7M },
  CpuSpec { name: "cortex-m7", cpu: Cpu::CortexM7, fallback: Cpu::Generic, min_backend: 0, features: ARMV7M },
  // armv7l
  CpuSpec { name: "armv7-a", cpu: Cpu::Armv7A, fallback: Cpu::Generic, min_backend: 0, features: ARMV7A },
  CpuSpec { name: "armv7-r", cpu: Cpu::Armv7R, fallback: Cpu::Generic, min_backend: 0, features: ARMV7R },
  CpuSpec { name: "cortex-a5", cpu: Cpu::CortexA5, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A5 },
  CpuSpec { name: "cortex-a7", cpu: Cpu::CortexA7, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A7 },
  CpuSpec { name: "cortex-a8", cpu: Cpu::CortexA8, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A8 },
  CpuSpec { name: "cortex-a9", cpu: Cpu::CortexA9, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A9 },
  CpuSpec { name: "cortex-a12", cpu: Cpu::CortexA12, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A12 },
  CpuSpec { name: "cortex-a15", cpu: Cpu::CortexA15, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A12 },
  CpuSpec { name: "cortex-a17", cpu: Cpu::CortexA17, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A12 },
  CpuSpec { name: "cortex-r4", cpu: Cpu::CortexR4, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_R4 },
  CpuSpec { name: "cortex-r5", cpu: Cpu::CortexR5, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_R5 },
  CpuSpec { name: "cortex-r7", cpu: Cpu::CortexR7, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_R5 },
  CpuSpec { name: "cortex-r8", cpu: Cpu::CortexR8, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_R5 },
  CpuSpec { name: "scorpion", cpu: Cpu::Scorpion, fallback: Cpu::Armv7A, min_backend: NO_BACKEND, features: SCORPION },
  CpuSpec { name: "krait", cpu: Cpu::Krait, fallback: Cpu::Generic, min_backend: 0, features: KRAIT },
  CpuSpec { name: "swift", cpu: Cpu::Swift, fallback: Cpu::Generic, min_backend: 0, features: SWIFT },
  CpuSpec { name: "pj4", cpu: Cpu::Pj4, fallback: Cpu::Armv7A, min_backend: NO_BACKEND, features: PJ4 },
  CpuSpec { name: "3735d", cpu: Cpu::Intel3735D, fallback: Cpu::Armv7A, min_backend: NO_BACKEND, features: INTEL_3735D },
  // armv8ml
  CpuSpec { name: "armv8-m.base", cpu: Cpu::Armv8MBase, fallback: Cpu::Generic, min_backend: 0, features: ARMV8M },
  CpuSpec { name: "armv8-m.main", cpu: Cpu::Armv8MMain, fallback: Cpu::Generic, min_backend: 0, features: ARMV8M },
  CpuSpec { name: "cortex-m23", cpu: Cpu::CortexM23, fallback: Cpu::Armv8MBase, min_backend: 0, features: CORTEX_M23 },
  CpuSpec { name: "cortex-m33", cpu: Cpu::CortexM33, fallback: Cpu::Armv8MMain, min_backend: 0, features: CORTEX_M33 },
  // armv8l
  CpuSpec { name: "armv8-a", cpu: Cpu::Armv8A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8A },
  CpuSpec { name: "armv8-r", cpu: Cpu::Armv8R, fallback: Cpu::Generic, min_backend: 0, features: ARMV8R },
  CpuSpec { name: "armv8.1-a", cpu: Cpu::Armv8_1A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_1A },
  CpuSpec { name: "armv8.2-a", cpu: Cpu::Armv8_2A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_2A },
  CpuSpec { name: "armv8.3-a", cpu: Cpu::Armv8_3A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_3A },
  CpuSpec { name: "armv8.4-a", cpu: Cpu::Armv8_4A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_4A },
  CpuSpec { name: "armv8.5-a", cpu: Cpu::Armv8_5A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_5A },
  CpuSpec { name: "armv8.6-a", cpu: Cpu::Armv8_6A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_6A },
  CpuSpec { name: "cortex-a32", cpu: Cpu::CortexA32, fallback: Cpu::Generic, min_backend: 0, features: ARMV8A_CRC },
  CpuSpec { name: "cortex-r52", cpu: Cpu::CortexR52, fallback: Cpu::Generic, min_backend: 0, features: ARMV8A_CRC },
  CpuSpec { name: "cortex-a35", cpu: Cpu::CortexA35, fallback: Cpu::Generic, min_backend: 0, features: ARMV8A_CRC },
  CpuSpec { name: "cortex-a53", cpu: Cpu::CortexA53, fallback: Cpu::Generic, min_backend: 0, features: ARMV8A_CRC },
  CpuSpec { name: "cortex-a55", cpu: Cpu::CortexA55, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_2A },
  CpuSpec { name: "cortex-a57", cpu: Cpu::CortexA57, fallback: Cpu::Generic, min_backend: 0, features: ARMV8A_CRC },
  CpuSpec { name: "cortex-a72", cpu: Cpu::CortexA72, fallback: Cpu::Generic, min_backend: 0, features: ARMV8A_CRC },
  CpuSpec { name: "cortex-a73", cpu: Cpu::CortexA73, fallback: Cpu::Generic, min_backend: 0, features: ARMV8A_CRC },
  CpuSpec { name: "cortex-a75", cpu: Cpu::CortexA75, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_2A },
  CpuSpec { name: "cortex-a76", cpu: Cpu::CortexA76, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_2A },
  CpuSpec { name: "cortex-a76ae", cpu: Cpu::CortexA76Ae, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_2A },
  CpuSpec { name: "cortex-a77", cpu: Cpu::CortexA77, fallback: Cpu::CortexA76, min_backend: 110000, features: ARMV8_2A },
  CpuSpec { name: "cortex-a78", cpu: Cpu::CortexA78, fallback: Cpu::CortexA77, min_backend: 110000, features: ARMV8_2A },
  CpuSpec { name: "cortex-x1", cpu: Cpu::CortexX1, fallback: Cpu::CortexA78, min_backend: 110000, features: ARMV8_2A },
  CpuSpec {
    name: "neoverse-n1",
    cpu: Cpu::NeoverseN1,
    fallback: Cpu::CortexA76,
    min_backend: 100000,
    features: ARMV8_2A,
  },
  CpuSpec {
    name: "neoverse-v1",
    cpu: Cpu::NeoverseV1,
    fallback: Cpu::NeoverseN1,
    min_backend: NO_BACKEND,
    features: ARMV8_4A,
  },
  CpuSpec {
    name: "neoverse-n2",
    cpu: Cpu::NeoverseN2,
    fallback: Cpu::NeoverseN1,
    min_backend: NO_BACKEND,
    features: ARMV8_5A,
  },
  CpuSpec { name: "denver1", cpu: Cpu::Denver1, fallback: Cpu::CortexA53, min_backend: NO_BACKEND, features: ARMV8A },
  CpuSpec {
    name: "denver2",
    cpu: Cpu::Denver2,
    fallback: Cpu::CortexA57,
    min_backend: NO_BACKEND,
    features: ARMV8A_CRC_CRYPTO,
  },
  CpuSpec { name: "xgene1", cpu: Cpu::XGene1, fallback: Cpu::Armv8A, min_backend: NO_BACKEND, features: ARMV8A },
  CpuSpec { name: "xgene2", cpu: Cpu::XGene2, fallback: Cpu::Armv8A, min_backend: NO_BACKEND, features: ARMV8A },
  CpuSpec { name: "xgene3", cpu: Cpu::XGene3, fallback: Cpu::Armv8A, min_backend: NO_BACKEND, features: ARMV8A },
  CpuSpec {
    name: "kyro",
    cpu: Cpu::Kyro,
    fallback: Cpu::Armv8A,
    min_backend: NO_BACKEND,
    features: ARMV8A_CRC_CRYPTO,
  },
  CpuSpec {
    name: "falkor",
    cpu: Cpu::Falkor,
    fallback: Cpu::Armv8A,
    min_backend: NO_BACKEND,
    features: ARMV8A_CRC_CRYPTO,
  },
  CpuSpec {
    name: "saphira",
    cpu: Cpu::Saphira,
    fallback: Cpu::Armv8A,
    min_backend: NO_BACKEND,
    features: ARMV8_3A_CRYPTO,
  },
  CpuSpec {
    name: "exynos-m1",
    cpu: Cpu::ExynosM1,
    fallback: Cpu::Generic,
    min_backend: NO_BACKEND,
    features: ARMV8A_CRC_CRYPTO,
  },
  CpuSpec {
    name: "exynos-m2",
    cpu: Cpu::ExynosM2,
    fallback: Cpu::Generic,
    min_backend: NO_BACKEND,
    features: ARMV8A_CRC_CRYPTO,
  },
  CpuSpec {
    name: "exynos-m3",
    cpu: Cpu::ExynosM3,
    fallback: Cpu::Generic,
    min_backend: 0,
    features: ARMV8A_CRC_CRYPTO,
  },
  CpuSpec {
    name: "exynos-m4",
    cpu: Cpu::ExynosM4,
    fallback: Cpu::Generic,
    min_backend: 0,
    features: ARMV8_2A_CRYPTO,
  },
  CpuSpec {
    name: "exynos-m5",
    cpu: Cpu::ExynosM5,
    fallback: Cpu::ExynosM4,
    min_backend: 110000,
    features: ARMV8_2A_CRYPTO,
  },
  CpuSpec {
    name: "apple-a7",
    cpu: Cpu::AppleA7,
    fallback: Cpu::Generic,
    min_backend: 0,
    features: ARMV8A_CRC_CRYPTO,
  },
];

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{cpu::find_cpu_by_name, features::aarch32 as feat};

  #[test]
  fn cortex_a53_is_v8_with_simd_and_crc() {
    let a53 = find_cpu_by_name(SPECS, "cortex-a53").unwrap();
    for bit in [
      feat::V8,
      feat::V7,
      feat::ACLASS,
      feat::NEON,
      feat::VFP3,
      feat::VFP4,
      feat::D32,
      feat::HWDIV,
      feat::HWDIV_ARM,
      feat::CRC,
    ] {
      assert!(a53.features.test(bit), "missing bit {bit}");
    }
  }

  #[test]
  fn cortex_a7_is_v7_simd_without_v8() {
    let a7 = find_cpu_by_name(SPECS, "cortex-a7").unwrap();
    assert!(a7.features.test(feat::NEON));
    assert!(a7.features.test(feat::VFP4));
    assert!(a7.features.test(feat::ACLASS));
    assert!(!a7.features.test(feat::V8));
    assert!(!a7.features.test(feat::D32));
  }

  #[test]
  fn m_profile_rows_never_carry_neon() {
    for name in ["armv7-m", "cortex-m4", "armv8-m.base", "cortex-m33"] {
      let spec = find_cpu_by_name(SPECS, name).unwrap();
      assert!(spec.features.test(feat::MCLASS));
      assert!(!spec.features.test(feat::NEON), "{name} has neon");
    }
  }
}
