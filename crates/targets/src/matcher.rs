//! Image variant matching.
//!
//! A precompiled image ships several target variants; the matcher picks the
//! best one for the resolved JIT target. A variant is usable only if every
//! feature it was compiled with is enabled on the JIT target. Among usable
//! variants, a CPU-name match locks the search onto name matches, and the
//! variant with the most enabled features wins.

use alloc::{format, string::String, vec::Vec};

use platform::Family;

use crate::target::{TargetData, flags};

/// Sentinel variant index reported across the image-reader boundary when no
/// variant matches.
pub const NO_MATCH: u32 = u32::MAX;

/// A successful match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageMatch {
  /// Index of the chosen variant.
  pub best_idx: u32,
  /// Vector register size of the chosen variant, in bytes.
  pub vreg_size: u32,
}

/// Why every variant was rejected.
///
/// Carried as a value to the caller, which decides whether it is a
/// diagnostic or an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchRejection {
  /// One verdict per variant, in image order.
  pub reasons: Vec<String>,
}

impl core::fmt::Display for MatchRejection {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str("no image variant matches the requested target")?;
    for reason in &self.reasons {
      write!(f, "\n  {reason}")?;
    }
    Ok(())
  }
}

impl core::error::Error for MatchRejection {}

fn label(variant: &TargetData, idx: usize) -> String {
  format!("variant {idx} ({})", variant.name)
}

/// Pick the best variant for `target`.
///
/// `vreg_size` is computed from the *winner's* features via the per-family
/// vector sizing rule, so the caller can compare calling conventions.
pub fn match_image_targets(
  family: Family,
  variants: &[TargetData],
  target: &TargetData,
) -> Result<ImageMatch, MatchRejection> {
  let mut best: Option<(u32, &TargetData)> = None;
  let mut best_count = 0u32;
  let mut name_matched = false;
  let mut reasons = Vec::with_capacity(variants.len());

  for (idx, variant) in variants.iter().enumerate() {
    if !target.en.features.contains(variant.en.features) {
      reasons.push(format!("{}: uses features the target does not enable", label(variant, idx)));
      continue;
    }
    if name_matched && variant.name != target.name {
      reasons.push(format!("{}: another variant matches the target name", label(variant, idx)));
      continue;
    }
    if !name_matched && variant.name == target.name {
      // A name match trumps any feature-count lead built up so far.
      name_matched = true;
      best = None;
      best_count = 0;
    }
    let count = variant.en.features.count();
    if best.is_some() && count <= best_count {
      reasons.push(format!("{}: a better variant is already selected", label(variant, idx)));
      continue;
    }
    best = Some((idx as u32, variant));
    best_count = count;
    reasons.push(format!("{}: selected", label(variant, idx)));
  }

  match best {
    Some((best_idx, variant)) => Ok(ImageMatch {
      best_idx,
      vreg_size: family.max_vector_size(&variant.en.features),
    }),
    None => Err(MatchRejection { reasons }),
  }
}

/// Reconcile the JIT target with the chosen variant's calling convention.
///
/// A variant compiled with vector calls whose register size differs from
/// the JIT target's would split the vector ABI between caller and callee;
/// the JIT target gives up its vector unit instead (AArch32: `neon` —
/// AArch64 register sizing is not feature-switchable, nothing to clear).
pub fn reconcile_vec_call(family: Family, target: &mut TargetData, chosen: &TargetData, vreg_size: u32) {
  if chosen.en.flags & flags::VEC_CALL == 0 {
    return;
  }
  if vreg_size == family.max_vector_size(&target.en.features) {
    return;
  }
  if family == Family::AArch32 {
    target.en.features.set(platform::features::aarch32::NEON, false);
  }
}

#[cfg(test)]
mod tests {
  use platform::features::{aarch32, aarch64};

  use super::*;
  use crate::{parse::parse_target_string, resolve::resolve_with_host};

  fn resolved(family: Family, name: &str) -> TargetData {
    let spec = family.find_cpu(name).unwrap();
    let mut features = spec.features;
    family.enable_depends(&mut features);
    let host = (spec.cpu, features);
    let parsed = parse_target_string(family, name).unwrap().remove(0);
    resolve_with_host(family, &parsed, &host, false)
  }

  #[test]
  fn superset_variant_is_rejected_for_smaller_host() {
    // Image built as [generic, cortex-a76]; the JIT target resolves to
    // cortex-a55. The a76 variant wants ssbs, which the a55 lacks.
    let variants = [resolved(Family::AArch64, "generic"), resolved(Family::AArch64, "cortex-a76")];
    let target = resolved(Family::AArch64, "cortex-a55");
    let m = match_image_targets(Family::AArch64, &variants, &target).unwrap();
    assert_eq!(m.best_idx, 0);
  }

  #[test]
  fn richest_compatible_variant_wins() {
    let variants = [
      resolved(Family::AArch64, "generic"),
      resolved(Family::AArch64, "cortex-a53"),
      resolved(Family::AArch64, "cortex-a55"),
    ];
    let target = resolved(Family::AArch64, "cortex-a76");
    let m = match_image_targets(Family::AArch64, &variants, &target).unwrap();
    assert_eq!(m.best_idx, 2);
    assert_eq!(m.vreg_size, 16);
  }

  #[test]
  fn name_match_beats_feature_count() {
    let variants = [resolved(Family::AArch64, "cortex-a55"), resolved(Family::AArch64, "cortex-a53")];
    let target = resolved(Family::AArch64, "cortex-a53");
    // a55 has more features and both are compatible subsets of... no: a55
    // is not a subset of a53, so only the name row survives anyway; make
    // the target rich enough to accept both.
    let target_rich = {
      let mut t = resolved(Family::AArch64, "cortex-a55");
      t.name = target.name.clone();
      t
    };
    let m = match_image_targets(Family::AArch64, &variants, &target_rich).unwrap();
    assert_eq!(m.best_idx, 1);
  }

  #[test]
  fn no_candidate_reports_reasons() {
    let variants = [resolved(Family::AArch64, "cortex-a76")];
    let target = resolved(Family::AArch64, "cortex-a53");
    let err = match_image_targets(Family::AArch64, &variants, &target).unwrap_err();
    assert_eq!(err.reasons.len(), 1);
    assert!(err.reasons[0].contains("cortex-a76"));
    let rendered = alloc::format!("{err}");
    assert!(rendered.contains("no image variant"));
  }

  #[test]
  fn sve_variant_reports_wide_registers() {
    let variants = [resolved(Family::AArch64, "neoverse-v1")];
    let target = resolved(Family::AArch64, "neoverse-v1");
    let m = match_image_targets(Family::AArch64, &variants, &target).unwrap();
    assert_eq!(m.vreg_size, 128);
  }

  #[test]
  fn vec_call_mismatch_clears_neon_on_aarch32() {
    let mut target = resolved(Family::AArch32, "cortex-a53");
    assert!(target.en.features.test(aarch32::NEON));
    let mut chosen = resolved(Family::AArch32, "cortex-a53");
    chosen.en.flags |= flags::VEC_CALL;
    // Chosen variant was sized for 8-byte registers, target has 16.
    reconcile_vec_call(Family::AArch32, &mut target, &chosen, 8);
    assert!(!target.en.features.test(aarch32::NEON));
  }

  #[test]
  fn vec_call_match_is_left_alone() {
    let mut target = resolved(Family::AArch32, "cortex-a53");
    let mut chosen = resolved(Family::AArch32, "cortex-a53");
    chosen.en.flags |= flags::VEC_CALL;
    reconcile_vec_call(Family::AArch32, &mut target, &chosen, 16);
    assert!(target.en.features.test(aarch32::NEON));

    // Without VEC_CALL a size mismatch is also fine.
    let mut target64 = resolved(Family::AArch64, "apple-m1");
    let chosen64 = resolved(Family::AArch64, "generic");
    reconcile_vec_call(Family::AArch64, &mut target64, &chosen64, 8);
    assert!(target64.en.features.test(aarch64::AES));
  }
}
