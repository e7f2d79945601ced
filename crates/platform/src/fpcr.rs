//! Floating-point control register access.
//!
//! AArch64 exposes flush-to-zero and default-NaN behavior through FPCR.
//! Setting flush-to-zero also covers the half-precision variant (FZ16) when
//! the host implements `fullfp16`. On every other architecture these are
//! stubs that succeed without side effect.

#[cfg(all(target_arch = "aarch64", not(miri)))]
mod imp {
  use crate::{detect::test_cpu_feature, features::aarch64::FULLFP16};

  // FPCR FZ, bit [24]
  const FPCR_FZ: u64 = 1 << 24;
  // FPCR FZ16, bit [19]
  const FPCR_FZ16: u64 = 1 << 19;
  // FPCR DN, bit [25]
  const FPCR_DN: u64 = 1 << 25;

  #[inline]
  fn get_fpcr() -> u64 {
    let fpcr: u64;
    // SAFETY: FPCR reads have no side effects and are always permitted at
    // EL0.
    unsafe {
      core::arch::asm!("mrs {}, fpcr", out(reg) fpcr, options(nomem, nostack, preserves_flags));
    }
    fpcr
  }

  #[inline]
  fn set_fpcr(fpcr: u64) {
    // SAFETY: writing FPCR only changes floating-point rounding/denormal
    // behavior of this thread, which is exactly the caller's intent.
    unsafe {
      core::arch::asm!("msr fpcr, {}", in(reg) fpcr, options(nomem, nostack));
    }
  }

  pub fn flush_to_zero() -> bool {
    get_fpcr() & FPCR_FZ != 0
  }

  pub fn set_flush_to_zero(on: bool) {
    let mut mask = FPCR_FZ;
    if test_cpu_feature(FULLFP16) {
      mask |= FPCR_FZ16;
    }
    let fpcr = get_fpcr();
    set_fpcr(if on { fpcr | mask } else { fpcr & !mask });
  }

  pub fn default_nan() -> bool {
    get_fpcr() & FPCR_DN != 0
  }

  pub fn set_default_nan(on: bool) {
    let fpcr = get_fpcr();
    set_fpcr(if on { fpcr | FPCR_DN } else { fpcr & !FPCR_DN });
  }
}

#[cfg(not(all(target_arch = "aarch64", not(miri))))]
mod imp {
  pub fn flush_to_zero() -> bool {
    false
  }

  pub fn set_flush_to_zero(_on: bool) {}

  pub fn default_nan() -> bool {
    false
  }

  pub fn set_default_nan(_on: bool) {}
}

/// Check whether subnormal results are flushed to zero.
#[must_use]
pub fn flush_to_zero() -> bool {
  imp::flush_to_zero()
}

/// Enable or disable flush-to-zero (and FZ16 where `fullfp16` is present).
pub fn set_flush_to_zero(on: bool) {
  imp::set_flush_to_zero(on);
}

/// Check whether NaN propagation is replaced by the default NaN.
#[must_use]
pub fn default_nan() -> bool {
  imp::default_nan()
}

/// Enable or disable default-NaN mode.
pub fn set_default_nan(on: bool) {
  imp::set_default_nan(on);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  #[cfg(all(target_arch = "aarch64", not(miri)))]
  fn fz_roundtrip_restores_state() {
    let before = flush_to_zero();
    set_flush_to_zero(true);
    assert!(flush_to_zero());
    set_flush_to_zero(false);
    assert!(!flush_to_zero());
    set_flush_to_zero(before);
  }

  #[test]
  #[cfg(all(target_arch = "aarch64", not(miri)))]
  fn dn_roundtrip_restores_state() {
    let before = default_nan();
    set_default_nan(true);
    assert!(default_nan());
    set_default_nan(before);
  }

  #[test]
  #[cfg(not(target_arch = "aarch64"))]
  fn stubs_have_no_effect() {
    set_flush_to_zero(true);
    assert!(!flush_to_zero());
    set_default_nan(true);
    assert!(!default_nan());
  }
}
