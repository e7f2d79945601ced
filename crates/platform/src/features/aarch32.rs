//! AArch32 feature catalog.
//!
//! Word 0 mirrors the arm HWCAP bit assignments (with `vfp4sp` parked on an
//! unused position — the kernel has no bit for FPv4-SP, it is only ever set
//! from CPU model tables). Word 1 mirrors HWCAP2, where the crypto block is
//! modeled as the single `crypto` feature the 32-bit backend understands.
//! Word 2 carries the nominal version and profile markers.

use crate::{
  depends::FeatureDep,
  features::{FeatureName, FeatureSet, catalog_mask},
};

// ─── Word 0: HWCAP ───────────────────────────────────────────────────────────

pub const NEON: u32 = 12;
pub const VFP3: u32 = 13;
pub const VFP4: u32 = 16;
pub const HWDIV_ARM: u32 = 17;
pub const HWDIV: u32 = 18;
pub const D32: u32 = 19;
/// FPv4-SP (single-precision-only FMA). Not a kernel HWCAP bit.
pub const VFP4SP: u32 = 22;
/// Armv8.2 half-precision arithmetic. Not a 32-bit kernel HWCAP bit.
pub const FULLFP16: u32 = 23;
/// Half-precision multiply-accumulate to single. Not a kernel HWCAP bit.
pub const FP16FML: u32 = 24;

// ─── Word 1: HWCAP2 (bit + 32) ───────────────────────────────────────────────

pub const CRYPTO: u32 = 32;
pub const CRC: u32 = 36;

// ─── Word 2: nominal versions and profiles ──────────────────────────────────

pub const V7: u32 = 64;
pub const V8: u32 = 65;
pub const V8_M_MAIN: u32 = 66;
pub const ACLASS: u32 = 67;
pub const RCLASS: u32 = 68;
pub const MCLASS: u32 = 69;
pub const V8_1A: u32 = 70;
pub const V8_2A: u32 = 71;
pub const V8_3A: u32 = 72;
pub const V8_4A: u32 = 73;
pub const V8_5A: u32 = 74;
pub const V8_6A: u32 = 75;

// ─── Name table ─────────────────────────────────────────────────────────────

/// Named AArch32 features, in bit order.
pub const NAMES: &[FeatureName] = &[
  FeatureName { name: "neon", bit: NEON, min_backend: 0 },
  FeatureName { name: "vfp3", bit: VFP3, min_backend: 0 },
  FeatureName { name: "vfp4", bit: VFP4, min_backend: 0 },
  FeatureName { name: "hwdiv-arm", bit: HWDIV_ARM, min_backend: 0 },
  FeatureName { name: "hwdiv", bit: HWDIV, min_backend: 0 },
  FeatureName { name: "d32", bit: D32, min_backend: 0 },
  FeatureName { name: "vfp4sp", bit: VFP4SP, min_backend: 0 },
  FeatureName { name: "fullfp16", bit: FULLFP16, min_backend: 0 },
  FeatureName { name: "fp16fml", bit: FP16FML, min_backend: 0 },
  FeatureName { name: "crypto", bit: CRYPTO, min_backend: 0 },
  FeatureName { name: "crc", bit: CRC, min_backend: 0 },
  FeatureName { name: "v7", bit: V7, min_backend: 0 },
  FeatureName { name: "v8", bit: V8, min_backend: 0 },
  FeatureName { name: "v8m.main", bit: V8_M_MAIN, min_backend: 0 },
  FeatureName { name: "aclass", bit: ACLASS, min_backend: 0 },
  FeatureName { name: "rclass", bit: RCLASS, min_backend: 0 },
  FeatureName { name: "mclass", bit: MCLASS, min_backend: 0 },
  FeatureName { name: "v8.1a", bit: V8_1A, min_backend: 0 },
  FeatureName { name: "v8.2a", bit: V8_2A, min_backend: 0 },
  FeatureName { name: "v8.3a", bit: V8_3A, min_backend: 0 },
  FeatureName { name: "v8.4a", bit: V8_4A, min_backend: 0 },
  FeatureName { name: "v8.5a", bit: V8_5A, min_backend: 0 },
  FeatureName { name: "v8.6a", bit: V8_6A, min_backend: 0 },
];

/// Every named AArch32 bit.
pub const CATALOG_MASK: FeatureSet = catalog_mask(NAMES);

// ─── Dependency edges ───────────────────────────────────────────────────────

pub const DEPS: &[FeatureDep] = &[
  FeatureDep { dep: NEON, prereq: VFP3 },
  FeatureDep { dep: VFP4, prereq: VFP3 },
  FeatureDep { dep: CRYPTO, prereq: NEON },
];

// ─── Architectural closures ─────────────────────────────────────────────────

/// Enable closure: version ladder, profile/version implications, then the
/// edge fixpoint.
pub fn enable_depends(features: &mut FeatureSet) {
  if features.test(V8_6A) {
    features.set(V8_5A, true);
  }
  if features.test(V8_5A) {
    features.set(V8_4A, true);
  }
  if features.test(V8_4A) {
    features.set(V8_3A, true);
  }
  if features.test(V8_3A) {
    features.set(V8_2A, true);
  }
  if features.test(V8_2A) {
    features.set(V8_1A, true);
  }
  if features.test(V8_1A) {
    features.set(CRC, true);
    features.set(V8, true);
    features.set(ACLASS, true);
  }
  if features.test(V8_M_MAIN) {
    features.set(V8, true);
    features.set(MCLASS, true);
  }
  if features.test(V8) {
    features.set(V7, true);
    if features.test(ACLASS) {
      features.set(NEON, true);
      features.set(VFP3, true);
      features.set(VFP4, true);
      features.set(HWDIV_ARM, true);
      features.set(HWDIV, true);
      features.set(D32, true);
    }
  }
  crate::depends::close_enable(features, DEPS);
}

/// Disable closure: plain edge fixpoint only.
pub fn disable_depends(features: &mut FeatureSet) {
  crate::depends::close_disable(features, DEPS);
}
