//! AArch64 CPU catalog.
//!
//! Base feature sets are built from the armv8.x ladder: each step adds its
//! nominal version marker plus the instruction-set bits that step makes
//! mandatory, and the `_CRYPTO` variants add `aes + sha2`. Per-model sets
//! then add what the implementation actually ships.

use crate::{
  cpu::{Cpu, CpuSpec},
  features::{FeatureSet, aarch64 as f},
};

/// Catalog entries whose name no backend release accepts yet.
const NO_BACKEND: u32 = u32::MAX;

const GENERIC: FeatureSet = FeatureSet::NONE;
const ARMV8A_CRC: FeatureSet = FeatureSet::of(&[f::CRC]);
const ARMV8A_CRC_CRYPTO: FeatureSet = ARMV8A_CRC.union(FeatureSet::of(&[f::AES, f::SHA2]));
const ARMV8_1A: FeatureSet = ARMV8A_CRC.union(FeatureSet::of(&[f::V8_1A, f::LSE, f::RDM]));
const ARMV8_1A_CRYPTO: FeatureSet = ARMV8_1A.union(FeatureSet::of(&[f::AES, f::SHA2]));
const ARMV8_2A: FeatureSet = ARMV8_1A.union(FeatureSet::of(&[f::V8_2A, f::CCPP]));
const ARMV8_2A_CRYPTO: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::AES, f::SHA2]));
const ARMV8_3A: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::V8_3A, f::JSCONV, f::COMPLXNUM, f::RCPC]));
const ARMV8_3A_CRYPTO: FeatureSet = ARMV8_3A.union(FeatureSet::of(&[f::AES, f::SHA2]));
const ARMV8_4A: FeatureSet = ARMV8_3A.union(FeatureSet::of(&[f::V8_4A, f::DIT, f::RCPC_IMMO, f::FLAGM]));
const ARMV8_4A_CRYPTO: FeatureSet = ARMV8_4A.union(FeatureSet::of(&[f::AES, f::SHA2]));
const ARMV8_5A: FeatureSet = ARMV8_4A.union(FeatureSet::of(&[f::V8_5A, f::SB, f::CCDP, f::ALTNZCV, f::FPTOINT]));
const ARMV8_5A_CRYPTO: FeatureSet = ARMV8_5A.union(FeatureSet::of(&[f::AES, f::SHA2]));
const ARMV8_6A: FeatureSet = ARMV8_5A.union(FeatureSet::of(&[f::V8_6A, f::I8MM, f::BF16]));

const CORTEX_A34: FeatureSet = ARMV8A_CRC;
const CORTEX_A35: FeatureSet = ARMV8A_CRC;
const CORTEX_A53: FeatureSet = ARMV8A_CRC;
const CORTEX_A55: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::DOTPROD, f::RCPC, f::FULLFP16]));
const CORTEX_A57: FeatureSet = ARMV8A_CRC_CRYPTO;
const CORTEX_A65: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::RCPC, f::FULLFP16, f::SSBS]));
const CORTEX_A72: FeatureSet = ARMV8A_CRC;
const CORTEX_A73: FeatureSet = ARMV8A_CRC;
const CORTEX_A75: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::DOTPROD, f::RCPC, f::FULLFP16]));
const CORTEX_A76: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::DOTPROD, f::RCPC, f::FULLFP16, f::SSBS]));
const CORTEX_A77: FeatureSet = CORTEX_A76;
const CORTEX_A78: FeatureSet = CORTEX_A76;
const CORTEX_X1: FeatureSet = CORTEX_A76;
const NEOVERSE_E1: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::RCPC, f::FULLFP16, f::SSBS]));
const NEOVERSE_N1: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::DOTPROD, f::RCPC, f::FULLFP16, f::SSBS]));
const NEOVERSE_V1: FeatureSet =
  ARMV8_4A.union(FeatureSet::of(&[f::SVE, f::I8MM, f::BF16, f::FULLFP16, f::SSBS, f::RAND]));
const NEOVERSE_N2: FeatureSet = ARMV8_5A.union(FeatureSet::of(&[
  f::SVE,
  f::I8MM,
  f::BF16,
  f::FULLFP16,
  f::SVE2,
  f::SVE2_BITPERM,
  f::RAND,
  f::MTE,
]));

const THUNDERX: FeatureSet = ARMV8A_CRC_CRYPTO;
const THUNDERX2T99: FeatureSet = ARMV8_1A_CRYPTO;
const OCTEONTX2: FeatureSet = ARMV8_2A_CRYPTO;
const THUNDERX3T110: FeatureSet = ARMV8_3A_CRYPTO;

const A64FX: FeatureSet = ARMV8_2A.union(FeatureSet::of(&[f::SHA2, f::FULLFP16, f::SVE, f::COMPLXNUM]));
const TSV110: FeatureSet = ARMV8_2A_CRYPTO.union(FeatureSet::of(&[f::DOTPROD, f::FULLFP16]));
const PHECDA: FeatureSet = ARMV8A_CRC_CRYPTO;

const DENVER1: FeatureSet = GENERIC;
const DENVER2: FeatureSet = ARMV8A_CRC_CRYPTO;
const CARMEL: FeatureSet = ARMV8_2A_CRYPTO.union(FeatureSet::of(&[f::FULLFP16]));

const XGENE: FeatureSet = GENERIC;

const KYRO: FeatureSet = ARMV8A_CRC_CRYPTO;
const FALKOR: FeatureSet = ARMV8A_CRC_CRYPTO.union(FeatureSet::of(&[f::RDM]));
const SAPHIRA: FeatureSet = ARMV8_4A_CRYPTO;

const EXYNOS_M1: FeatureSet = ARMV8A_CRC_CRYPTO;
const EXYNOS_M4: FeatureSet = ARMV8_2A_CRYPTO.union(FeatureSet::of(&[f::DOTPROD, f::FULLFP16]));

const APPLE_A7: FeatureSet = ARMV8A_CRC_CRYPTO;
const APPLE_A10: FeatureSet = ARMV8A_CRC_CRYPTO.union(FeatureSet::of(&[f::RDM]));
const APPLE_A11: FeatureSet = ARMV8_2A_CRYPTO.union(FeatureSet::of(&[f::FULLFP16]));
const APPLE_A12: FeatureSet = ARMV8_3A_CRYPTO.union(FeatureSet::of(&[f::FULLFP16]));
const APPLE_A13: FeatureSet = ARMV8_4A_CRYPTO.union(FeatureSet::of(&[f::FP16FML, f::FULLFP16, f::SHA3]));
const APPLE_A14: FeatureSet = ARMV8_5A_CRYPTO.union(FeatureSet::of(&[f::DOTPROD, f::FP16FML, f::FULLFP16, f::SHA3]));
const APPLE_A15: FeatureSet = ARMV8_5A_CRYPTO.union(FeatureSet::of(&[
  f::DOTPROD,
  f::FP16FML,
  f::FULLFP16,
  f::SHA3,
  f::I8MM,
  f::BF16,
]));
/// M1 matches A14; M2 and later match the A15 generation.
pub(crate) const APPLE_M1: FeatureSet = APPLE_A14;
pub(crate) const APPLE_M2: FeatureSet = APPLE_A15;

/// The AArch64 catalog.
pub const SPECS: &[CpuSpec] = &[
  CpuSpec { name: "generic", cpu: Cpu::Generic, fallback: Cpu::Generic, min_backend: 0, features: GENERIC },
  CpuSpec { name: "armv8.1-a", cpu: Cpu::Armv8_1A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_1A },
  CpuSpec { name: "armv8.2-a", cpu: Cpu::Armv8_2A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_2A },
  CpuSpec { name: "armv8.3-a", cpu: Cpu::Armv8_3A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_3A },
  CpuSpec { name: "armv8.4-a", cpu: Cpu::Armv8_4A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_4A },
  CpuSpec { name: "armv8.5-a", cpu: Cpu::Armv8_5A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_5A },
  CpuSpec { name: "armv8.6-a", cpu: Cpu::Armv8_6A, fallback: Cpu::Generic, min_backend: 0, features: ARMV8_6A },
  CpuSpec {
    name: "cortex-a34",
    cpu: Cpu::CortexA34,
    fallback: Cpu::CortexA35,
    min_backend: 110000,
    features: CORTEX_A34,
  },
  CpuSpec { name: "cortex-a35", cpu: Cpu::CortexA35, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A35 },
  CpuSpec { name: "cortex-a53", cpu: Cpu::CortexA53, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A53 },
  CpuSpec { name: "cortex-a55", cpu: Cpu::CortexA55, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A55 },
  CpuSpec { name: "cortex-a57", cpu: Cpu::CortexA57, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A57 },
  CpuSpec {
    name: "cortex-a65",
    cpu: Cpu::CortexA65,
    fallback: Cpu::CortexA75,
    min_backend: 100000,
    features: CORTEX_A65,
  },
  CpuSpec {
    name: "cortex-a65ae",
    cpu: Cpu::CortexA65Ae,
    fallback: Cpu::CortexA75,
    min_backend: 100000,
    features: CORTEX_A65,
  },
  CpuSpec { name: "cortex-a72", cpu: Cpu::CortexA72, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A72 },
  CpuSpec { name: "cortex-a73", cpu: Cpu::CortexA73, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A73 },
  CpuSpec { name: "cortex-a75", cpu: Cpu::CortexA75, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A75 },
  CpuSpec { name: "cortex-a76", cpu: Cpu::CortexA76, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A76 },
  CpuSpec { name: "cortex-a76ae", cpu: Cpu::CortexA76Ae, fallback: Cpu::Generic, min_backend: 0, features: CORTEX_A76 },
  CpuSpec {
    name: "cortex-a77",
    cpu: Cpu::CortexA77,
    fallback: Cpu::CortexA76,
    min_backend: 110000,
    features: CORTEX_A77,
  },
  CpuSpec {
    name: "cortex-a78",
    cpu: Cpu::CortexA78,
    fallback: Cpu::CortexA77,
    min_backend: 110000,
    features: CORTEX_A78,
  },
  CpuSpec { name: "cortex-x1", cpu: Cpu::CortexX1, fallback: Cpu::CortexA78, min_backend: 110000, features: CORTEX_X1 },
  CpuSpec {
    name: "neoverse-e1",
    cpu: Cpu::NeoverseE1,
    fallback: Cpu::CortexA76,
    min_backend: 100000,
    features: NEOVERSE_E1,
  },
  CpuSpec {
    name: "neoverse-n1",
    cpu: Cpu::NeoverseN1,
    fallback: Cpu::CortexA76,
    min_backend: 100000,
    features: NEOVERSE_N1,
  },
  CpuSpec {
    name: "neoverse-v1",
    cpu: Cpu::NeoverseV1,
    fallback: Cpu::NeoverseN1,
    min_backend: NO_BACKEND,
    features: NEOVERSE_V1,
  },
  CpuSpec {
    name: "neoverse-n2",
    cpu: Cpu::NeoverseN2,
    fallback: Cpu::NeoverseN1,
    min_backend: NO_BACKEND,
    features: NEOVERSE_N2,
  },
  CpuSpec { name: "thunderx", cpu: Cpu::ThunderX, fallback: Cpu::Generic, min_backend: 0, features: THUNDERX },
  CpuSpec { name: "thunderxt88", cpu: Cpu::ThunderXT88, fallback: Cpu::Generic, min_backend: 0, features: THUNDERX },
  CpuSpec {
    name: "thunderxt88p1",
    cpu: Cpu::ThunderXT88P1,
    fallback: Cpu::ThunderXT88,
    min_backend: NO_BACKEND,
    features: THUNDERX,
  },
  CpuSpec { name: "thunderxt81", cpu: Cpu::ThunderXT81, fallback: Cpu::Generic, min_backend: 0, features: THUNDERX },
  CpuSpec { name: "thunderxt83", cpu: Cpu::ThunderXT83, fallback: Cpu::Generic, min_backend: 0, features: THUNDERX },
  CpuSpec {
    name: "thunderx2t99",
    cpu: Cpu::ThunderX2T99,
    fallback: Cpu::Generic,
    min_backend: 0,
    features: THUNDERX2T99,
  },
  CpuSpec {
    name: "thunderx2t99p1",
    cpu: Cpu::ThunderX2T99P1,
    fallback: Cpu::ThunderX2T99,
    min_backend: NO_BACKEND,
    features: THUNDERX2T99,
  },
  CpuSpec {
    name: "octeontx2",
    cpu: Cpu::OcteonTx2,
    fallback: Cpu::CortexA57,
    min_backend: NO_BACKEND,
    features: OCTEONTX2,
  },
  CpuSpec {
    name: "octeontx2t98",
    cpu: Cpu::OcteonTx2T98,
    fallback: Cpu::CortexA57,
    min_backend: NO_BACKEND,
    features: OCTEONTX2,
  },
  CpuSpec {
    name: "octeontx2t96",
    cpu: Cpu::OcteonTx2T96,
    fallback: Cpu::CortexA57,
    min_backend: NO_BACKEND,
    features: OCTEONTX2,
  },
  CpuSpec {
    name: "octeontx2f95",
    cpu: Cpu::OcteonTx2F95,
    fallback: Cpu::CortexA57,
    min_backend: NO_BACKEND,
    features: OCTEONTX2,
  },
  CpuSpec {
    name: "octeontx2f95n",
    cpu: Cpu::OcteonTx2F95N,
    fallback: Cpu::CortexA57,
    min_backend: NO_BACKEND,
    features: OCTEONTX2,
  },
  CpuSpec {
    name: "octeontx2f95mm",
    cpu: Cpu::OcteonTx2F95Mm,
    fallback: Cpu::CortexA57,
    min_backend: NO_BACKEND,
    features: OCTEONTX2,
  },
  CpuSpec { name: "a64fx", cpu: Cpu::A64Fx, fallback: Cpu::Generic, min_backend: 110000, features: A64FX },
  CpuSpec { name: "tsv110", cpu: Cpu::Tsv110, fallback: Cpu::Generic, min_backend: 0, features: TSV110 },
  CpuSpec { name: "phecda", cpu: Cpu::Phecda, fallback: Cpu::Falkor, min_backend: NO_BACKEND, features: PHECDA },
  CpuSpec { name: "denver1", cpu: Cpu::Denver1, fallback: Cpu::Generic, min_backend: NO_BACKEND, features: DENVER1 },
  CpuSpec { name: "denver2", cpu: Cpu::Denver2, fallback: Cpu::Generic, min_backend: NO_BACKEND, features: DENVER2 },
  CpuSpec { name: "carmel", cpu: Cpu::Carmel, fallback: Cpu::Generic, min_backend: 110000, features: CARMEL },
  CpuSpec { name: "xgene1", cpu: Cpu::XGene1, fallback: Cpu::Generic, min_backend: NO_BACKEND, features: XGENE },
  CpuSpec { name: "xgene2", cpu: Cpu::XGene2, fallback: Cpu::Generic, min_backend: NO_BACKEND, features: XGENE },
  CpuSpec { name: "xgene3", cpu: Cpu::XGene3, fallback: Cpu::Generic, min_backend: NO_BACKEND, features: XGENE },
  CpuSpec { name: "kyro", cpu: Cpu::Kyro, fallback: Cpu::Generic, min_backend: 0, features: KYRO },
  CpuSpec { name: "falkor", cpu: Cpu::Falkor, fallback: Cpu::Generic, min_backend: 0, features: FALKOR },
  CpuSpec { name: "saphira", cpu: Cpu::Saphira, fallback: Cpu::Generic, min_backend: 0, features: SAPHIRA },
  CpuSpec {
    name: "exynos-m1",
    cpu: Cpu::ExynosM1,
    fallback: Cpu::Generic,
    min_backend: NO_BACKEND,
    features: EXYNOS_M1,
  },
  CpuSpec {
    name: "exynos-m2",
    cpu: Cpu::ExynosM2,
    fallback: Cpu::Generic,
    min_backend: NO_BACKEND,
    features: EXYNOS_M1,
  },
  CpuSpec { name: "exynos-m3", cpu: Cpu::ExynosM3, fallback: Cpu::Generic, min_backend: 0, features: EXYNOS_M1 },
  CpuSpec { name: "exynos-m4", cpu: Cpu::ExynosM4, fallback: Cpu::Generic, min_backend: 0, features: EXYNOS_M4 },
  CpuSpec {
    name: "exynos-m5",
    cpu: Cpu::ExynosM5,
    fallback: Cpu::ExynosM4,
    min_backend: 110000,
    features: EXYNOS_M4,
  },
  CpuSpec { name: "apple-a7", cpu: Cpu::AppleA7, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A7 },
  CpuSpec { name: "apple-a8", cpu: Cpu::AppleA8, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A7 },
  CpuSpec { name: "apple-a9", cpu: Cpu::AppleA9, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A7 },
  CpuSpec { name: "apple-a10", cpu: Cpu::AppleA10, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A10 },
  CpuSpec { name: "apple-a11", cpu: Cpu::AppleA11, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A11 },
  CpuSpec { name: "apple-a12", cpu: Cpu::AppleA12, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A12 },
  CpuSpec { name: "apple-a13", cpu: Cpu::AppleA13, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A13 },
  CpuSpec { name: "apple-a14", cpu: Cpu::AppleA14, fallback: Cpu::AppleA13, min_backend: 120000, features: APPLE_A14 },
  CpuSpec { name: "apple-a15", cpu: Cpu::AppleA15, fallback: Cpu::AppleA14, min_backend: 160000, features: APPLE_A15 },
  CpuSpec { name: "apple-a16", cpu: Cpu::AppleA16, fallback: Cpu::AppleA14, min_backend: 160000, features: APPLE_A15 },
  CpuSpec { name: "apple-a17", cpu: Cpu::AppleA17, fallback: Cpu::AppleA16, min_backend: 190000, features: APPLE_A15 },
  CpuSpec { name: "apple-m1", cpu: Cpu::AppleM1, fallback: Cpu::AppleA14, min_backend: 130000, features: APPLE_M1 },
  CpuSpec { name: "apple-m2", cpu: Cpu::AppleM2, fallback: Cpu::AppleM1, min_backend: 160000, features: APPLE_M2 },
  CpuSpec { name: "apple-m3", cpu: Cpu::AppleM3, fallback: Cpu::AppleM2, min_backend: 180000, features: APPLE_M2 },
  CpuSpec { name: "apple-m4", cpu: Cpu::AppleM4, fallback: Cpu::AppleM3, min_backend: 190000, features: APPLE_M2 },
  CpuSpec { name: "apple-s4", cpu: Cpu::AppleS4, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A12 },
  CpuSpec { name: "apple-s5", cpu: Cpu::AppleS5, fallback: Cpu::Generic, min_backend: 100000, features: APPLE_A12 },
  CpuSpec {
    name: "thunderx3t110",
    cpu: Cpu::ThunderX3T110,
    fallback: Cpu::ThunderX2T99,
    min_backend: 110000,
    features: THUNDERX3T110,
  },
];

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{cpu::find_cpu_by_name, features::aarch64 as feat};

  #[test]
  fn apple_m2_carries_v8_5a_and_matrix_extensions() {
    let m2 = find_cpu_by_name(SPECS, "apple-m2").unwrap();
    for bit in [
      feat::V8_5A,
      feat::AES,
      feat::SHA2,
      feat::DOTPROD,
      feat::FP16FML,
      feat::FULLFP16,
      feat::SHA3,
      feat::I8MM,
      feat::BF16,
    ] {
      assert!(m2.features.test(bit), "missing bit {bit}");
    }
    assert!(!m2.features.test(feat::V8_6A));
    assert!(!m2.features.test(feat::SVE));
  }

  #[test]
  fn a57_ships_crypto_a76_is_strict_superset_of_a55() {
    let a57 = find_cpu_by_name(SPECS, "cortex-a57").unwrap();
    assert!(a57.features.test(feat::AES));
    assert!(a57.features.test(feat::SHA2));

    let a55 = find_cpu_by_name(SPECS, "cortex-a55").unwrap();
    let a76 = find_cpu_by_name(SPECS, "cortex-a76").unwrap();
    assert!(a76.features.contains(a55.features));
    assert_ne!(a76.features, a55.features);
  }

  #[test]
  fn ladder_sets_are_monotone() {
    let ladder = [ARMV8_1A, ARMV8_2A, ARMV8_3A, ARMV8_4A, ARMV8_5A, ARMV8_6A];
    for pair in ladder.windows(2) {
      assert!(pair[1].contains(pair[0]));
    }
  }

  #[test]
  fn generic_base_is_empty() {
    assert!(find_cpu_by_name(SPECS, "generic").unwrap().features.is_empty());
  }
}
