//! AArch64 feature catalog.
//!
//! Word 0 mirrors the arm64 HWCAP bit assignments, word 1 mirrors HWCAP2
//! (offset by 32), and word 2 carries the nominal architecture-version
//! markers. The `crypto` pseudo-name is a parser alias for `aes + sha2`
//! and deliberately has no bit here.

use crate::{
  depends::FeatureDep,
  features::{FeatureName, FeatureSet, catalog_mask},
};

// ─── Word 0: HWCAP ───────────────────────────────────────────────────────────

pub const AES: u32 = 3;
pub const SHA2: u32 = 6;
pub const CRC: u32 = 7;
pub const LSE: u32 = 8;
pub const FULLFP16: u32 = 9;
pub const RDM: u32 = 12;
pub const JSCONV: u32 = 13;
pub const COMPLXNUM: u32 = 14;
pub const RCPC: u32 = 15;
pub const CCPP: u32 = 16;
pub const SHA3: u32 = 17;
pub const SM4: u32 = 19;
pub const DOTPROD: u32 = 20;
pub const SHA512: u32 = 21;
pub const SVE: u32 = 22;
pub const FP16FML: u32 = 23;
pub const DIT: u32 = 24;
pub const RCPC_IMMO: u32 = 26;
pub const FLAGM: u32 = 27;
pub const SSBS: u32 = 28;
pub const SB: u32 = 29;
pub const PAUTH: u32 = 30;

/// HWCAP bit 31 (PACG) is not a named feature; discovery lifts it to
/// [`PAUTH`].
pub const HWCAP_PACG: u32 = 31;

// ─── Word 1: HWCAP2 (bit + 32) ───────────────────────────────────────────────

pub const CCDP: u32 = 32;
pub const SVE2: u32 = 33;
pub const SVE2_AES: u32 = 34;
pub const SVE2_BITPERM: u32 = 36;
pub const SVE2_SHA3: u32 = 37;
pub const SVE2_SM4: u32 = 38;
pub const ALTNZCV: u32 = 39;
pub const FPTOINT: u32 = 40;
pub const F32MM: u32 = 42;
pub const F64MM: u32 = 43;
pub const I8MM: u32 = 45;
pub const BF16: u32 = 46;
pub const DGH: u32 = 47;
pub const RAND: u32 = 48;
pub const BTI: u32 = 49;
pub const MTE: u32 = 50;

// ─── Word 2: nominal architecture versions ──────────────────────────────────

pub const V8_1A: u32 = 64;
pub const V8_2A: u32 = 65;
pub const V8_3A: u32 = 66;
pub const V8_4A: u32 = 67;
pub const V8_5A: u32 = 68;
pub const V8_6A: u32 = 69;

// ─── Name table ─────────────────────────────────────────────────────────────

/// Named AArch64 features, in bit order.
pub const NAMES: &[FeatureName] = &[
  FeatureName { name: "aes", bit: AES, min_backend: 0 },
  FeatureName { name: "sha2", bit: SHA2, min_backend: 0 },
  FeatureName { name: "crc", bit: CRC, min_backend: 0 },
  FeatureName { name: "lse", bit: LSE, min_backend: 0 },
  FeatureName { name: "fullfp16", bit: FULLFP16, min_backend: 0 },
  FeatureName { name: "rdm", bit: RDM, min_backend: 0 },
  FeatureName { name: "jsconv", bit: JSCONV, min_backend: 0 },
  FeatureName { name: "complxnum", bit: COMPLXNUM, min_backend: 0 },
  FeatureName { name: "rcpc", bit: RCPC, min_backend: 0 },
  FeatureName { name: "ccpp", bit: CCPP, min_backend: 0 },
  FeatureName { name: "sha3", bit: SHA3, min_backend: 0 },
  FeatureName { name: "sm4", bit: SM4, min_backend: 0 },
  FeatureName { name: "dotprod", bit: DOTPROD, min_backend: 0 },
  FeatureName { name: "sha512", bit: SHA512, min_backend: 0 },
  FeatureName { name: "sve", bit: SVE, min_backend: 0 },
  FeatureName { name: "fp16fml", bit: FP16FML, min_backend: 0 },
  FeatureName { name: "dit", bit: DIT, min_backend: 0 },
  FeatureName { name: "rcpc_immo", bit: RCPC_IMMO, min_backend: 0 },
  FeatureName { name: "flagm", bit: FLAGM, min_backend: 0 },
  FeatureName { name: "ssbs", bit: SSBS, min_backend: 0 },
  FeatureName { name: "sb", bit: SB, min_backend: 0 },
  FeatureName { name: "pauth", bit: PAUTH, min_backend: 0 },
  FeatureName { name: "ccdp", bit: CCDP, min_backend: 0 },
  FeatureName { name: "sve2", bit: SVE2, min_backend: 100000 },
  FeatureName { name: "sve2-aes", bit: SVE2_AES, min_backend: 100000 },
  FeatureName { name: "sve2-bitperm", bit: SVE2_BITPERM, min_backend: 100000 },
  FeatureName { name: "sve2-sha3", bit: SVE2_SHA3, min_backend: 100000 },
  FeatureName { name: "sve2-sm4", bit: SVE2_SM4, min_backend: 100000 },
  FeatureName { name: "altnzcv", bit: ALTNZCV, min_backend: 0 },
  FeatureName { name: "fptoint", bit: FPTOINT, min_backend: 0 },
  FeatureName { name: "f32mm", bit: F32MM, min_backend: 110000 },
  FeatureName { name: "f64mm", bit: F64MM, min_backend: 110000 },
  FeatureName { name: "i8mm", bit: I8MM, min_backend: 110000 },
  FeatureName { name: "bf16", bit: BF16, min_backend: 110000 },
  FeatureName { name: "dgh", bit: DGH, min_backend: 110000 },
  FeatureName { name: "rand", bit: RAND, min_backend: 0 },
  FeatureName { name: "bti", bit: BTI, min_backend: 100000 },
  FeatureName { name: "mte", bit: MTE, min_backend: 100000 },
  FeatureName { name: "v8.1a", bit: V8_1A, min_backend: 0 },
  FeatureName { name: "v8.2a", bit: V8_2A, min_backend: 0 },
  FeatureName { name: "v8.3a", bit: V8_3A, min_backend: 0 },
  FeatureName { name: "v8.4a", bit: V8_4A, min_backend: 0 },
  FeatureName { name: "v8.5a", bit: V8_5A, min_backend: 0 },
  FeatureName { name: "v8.6a", bit: V8_6A, min_backend: 0 },
];

/// Every named AArch64 bit.
pub const CATALOG_MASK: FeatureSet = catalog_mask(NAMES);

// ─── Dependency edges ───────────────────────────────────────────────────────

/// Plain dependency edges. Version-ladder implications are handled in
/// [`enable_depends`], not here.
pub const DEPS: &[FeatureDep] = &[
  FeatureDep { dep: RCPC_IMMO, prereq: RCPC },
  FeatureDep { dep: SHA3, prereq: SHA2 },
  FeatureDep { dep: CCDP, prereq: CCPP },
  FeatureDep { dep: SVE, prereq: FULLFP16 },
  FeatureDep { dep: FP16FML, prereq: FULLFP16 },
  FeatureDep { dep: ALTNZCV, prereq: FLAGM },
  FeatureDep { dep: SVE2, prereq: SVE },
  FeatureDep { dep: SVE2_AES, prereq: SVE2 },
  FeatureDep { dep: SVE2_AES, prereq: AES },
  FeatureDep { dep: SVE2_BITPERM, prereq: SVE2 },
  FeatureDep { dep: SVE2_SHA3, prereq: SVE2 },
  FeatureDep { dep: SVE2_SHA3, prereq: SHA3 },
  FeatureDep { dep: SVE2_SM4, prereq: SVE2 },
  FeatureDep { dep: SVE2_SM4, prereq: SM4 },
  FeatureDep { dep: F32MM, prereq: SVE },
  FeatureDep { dep: F64MM, prereq: SVE },
];

// ─── Architectural closures ─────────────────────────────────────────────────

/// Enable closure: version ladder, ladder feature unlocks, then the edge
/// fixpoint.
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
    features.set(LSE, true);
    features.set(RDM, true);
  }
  if features.test(V8_2A) {
    features.set(CCPP, true);
  }
  if features.test(V8_3A) {
    features.set(JSCONV, true);
    features.set(COMPLXNUM, true);
    features.set(RCPC, true);
  }
  if features.test(V8_4A) {
    features.set(DIT, true);
    features.set(RCPC_IMMO, true);
    features.set(FLAGM, true);
  }
  if features.test(V8_5A) {
    features.set(SB, true);
    features.set(CCDP, true);
    features.set(ALTNZCV, true);
    features.set(FPTOINT, true);
  }
  if features.test(V8_6A) {
    features.set(I8MM, true);
    features.set(BF16, true);
  }
  crate::depends::close_enable(features, DEPS);
}

/// Disable closure: plain edge fixpoint only.
pub fn disable_depends(features: &mut FeatureSet) {
  crate::depends::close_disable(features, DEPS);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ladder_unlocks_instruction_bits() {
    let mut f = FeatureSet::from_bit(V8_2A);
    enable_depends(&mut f);
    for bit in [V8_1A, CRC, LSE, RDM, CCPP] {
      assert!(f.test(bit), "missing bit {bit}");
    }
    assert!(!f.test(V8_3A));
    assert!(!f.test(JSCONV));
  }

  #[test]
  fn ladder_runs_from_the_top() {
    let mut f = FeatureSet::from_bit(V8_6A);
    enable_depends(&mut f);
    for bit in [V8_5A, V8_4A, V8_3A, V8_2A, V8_1A, CRC, I8MM, BF16, SB, FLAGM] {
      assert!(f.test(bit), "missing bit {bit}");
    }
  }

  #[test]
  fn sve2_pulls_sve_and_fullfp16() {
    let mut f = FeatureSet::from_bit(SVE2);
    enable_depends(&mut f);
    assert!(f.test(SVE));
    assert!(f.test(FULLFP16));
  }

  #[test]
  fn disable_drops_sve_stack_without_fullfp16() {
    let mut f = FeatureSet::of(&[FULLFP16, SVE, SVE2, SVE2_BITPERM]);
    f.set(FULLFP16, false);
    disable_depends(&mut f);
    assert!(f.is_empty());
  }
}
