//! Target resolution.
//!
//! Resolution turns a parsed target into the fully closed form the backend
//! and the image matcher consume: base features folded in, dependency
//! closures applied, explicit disables subtracted, and (for the host
//! target) the result pinned to what the machine actually supports.

use alloc::string::String;

use platform::{Family, FeatureSet, detect::Host};

use crate::target::{TargetData, flags};

/// Resolve one parsed target against an explicit host.
///
/// Steps, in order: `native` substitution; catalog lookup (a miss sets
/// [`flags::UNKNOWN_NAME`] and proceeds bare); base feature union; enable
/// closure; explicit-disable subtraction; optional host intersection;
/// disable closure; and, when the CPU was known, materialization of the
/// negative facts (`dis = real_mask \ en`).
#[must_use]
pub fn resolve_with_host(family: Family, parsed: &TargetData, host: &Host, require_host: bool) -> TargetData {
  let mut res = parsed.clone();
  let mut base: Option<FeatureSet> = None;
  if res.name == "native" {
    res.name = String::from(family.cpu_name(host.0));
    base = Some(host.1);
  } else if let Some(spec) = family.find_cpu(&res.name) {
    base = Some(spec.features);
  } else {
    res.en.flags |= flags::UNKNOWN_NAME;
  }
  if let Some(base) = base {
    res.en.features |= base;
  }
  family.enable_depends(&mut res.en.features);
  res.en.features = res.en.features.and_not(res.dis.features);
  if require_host {
    res.en.features &= host.1;
  }
  family.disable_depends(&mut res.en.features);
  if base.is_some() {
    // The base is known, so absence is a fact worth stating to the
    // backend rather than an unknown.
    res.dis.features = family.real_mask().and_not(res.en.features);
  }
  res
}

/// Resolve one parsed target against the detected host.
#[must_use]
pub fn resolve(family: Family, parsed: &TargetData, require_host: bool) -> TargetData {
  resolve_with_host(family, parsed, &platform::detect::host(), require_host)
}

#[cfg(test)]
mod tests {
  use platform::{
    Cpu,
    features::{aarch32, aarch64},
  };

  use super::*;
  use crate::parse::parse_target_string;

  fn parsed(family: Family, spec: &str) -> TargetData {
    parse_target_string(family, spec).unwrap().remove(0)
  }

  fn cpu_host(family: Family, name: &str) -> Host {
    let spec = family.find_cpu(name).unwrap();
    let mut features = spec.features;
    family.enable_depends(&mut features);
    (spec.cpu, features)
  }

  #[test]
  fn named_cpu_resolves_to_closed_base() {
    let host = cpu_host(Family::AArch64, "apple-m1");
    let t = resolve_with_host(Family::AArch64, &parsed(Family::AArch64, "cortex-a57"), &host, false);
    assert_eq!(t.name, "cortex-a57");
    for bit in [aarch64::CRC, aarch64::AES, aarch64::SHA2] {
      assert!(t.en.features.test(bit));
    }
    assert_eq!(t.en.flags & flags::UNKNOWN_NAME, 0);
    // Negative facts are explicit and disjoint from the enabled set.
    assert!(t.en.features.intersection(t.dis.features).is_empty());
    assert!(t.dis.features.test(aarch64::SVE));
  }

  #[test]
  fn native_substitutes_the_host() {
    let host = cpu_host(Family::AArch64, "apple-m1");
    let t = resolve_with_host(Family::AArch64, &parsed(Family::AArch64, "native"), &host, true);
    assert_eq!(t.name, "apple-m1");
    assert!(t.en.features.test(aarch64::SHA3));
  }

  #[test]
  fn native_with_crypto_alias_keeps_aes_and_sha2() {
    let host = cpu_host(Family::AArch64, "apple-m1");
    let t = resolve_with_host(Family::AArch64, &parsed(Family::AArch64, "native,+crypto"), &host, true);
    assert!(t.en.features.test(aarch64::AES));
    assert!(t.en.features.test(aarch64::SHA2));
  }

  #[test]
  fn unknown_name_is_flagged_not_fatal() {
    let host = cpu_host(Family::AArch64, "apple-m1");
    let t = resolve_with_host(Family::AArch64, &parsed(Family::AArch64, "mystery-cpu,+crc"), &host, false);
    assert_ne!(t.en.flags & flags::UNKNOWN_NAME, 0);
    assert!(t.en.features.test(aarch64::CRC));
    // No base, so no explicit disable materialization.
    assert!(t.dis.features.is_empty());
  }

  #[test]
  fn explicit_disable_wins_over_base() {
    let host = cpu_host(Family::AArch64, "apple-m1");
    let t = resolve_with_host(Family::AArch64, &parsed(Family::AArch64, "cortex-a57,-aes"), &host, false);
    assert!(!t.en.features.test(aarch64::AES));
    assert!(t.dis.features.test(aarch64::AES));
    assert!(t.en.features.test(aarch64::SHA2));
  }

  #[test]
  fn require_host_intersects() {
    // A53 host cannot satisfy an A76 request beyond the common subset.
    let host = cpu_host(Family::AArch64, "cortex-a53");
    let t = resolve_with_host(Family::AArch64, &parsed(Family::AArch64, "cortex-a76"), &host, true);
    assert!(t.en.features.test(aarch64::CRC));
    assert!(!t.en.features.test(aarch64::DOTPROD));
    assert!(!t.en.features.test(aarch64::V8_2A));
  }

  #[test]
  fn disable_closure_runs_after_host_intersection() {
    // Host lacks fullfp16, so the sve stack must fall away even though the
    // request enabled it.
    let host = cpu_host(Family::AArch64, "cortex-a57");
    let t = resolve_with_host(Family::AArch64, &parsed(Family::AArch64, "cortex-a57,+sve2"), &host, true);
    assert!(!t.en.features.test(aarch64::SVE2));
    assert!(!t.en.features.test(aarch64::SVE));
  }

  #[test]
  fn aarch32_cortex_a7_stays_v7() {
    let mut host_features = platform::FeatureSet::of(&[aarch32::V7, aarch32::ACLASS, aarch32::NEON, aarch32::VFP3]);
    Family::AArch32.enable_depends(&mut host_features);
    let host = (Cpu::Armv7A, host_features);
    let t = resolve_with_host(Family::AArch32, &parsed(Family::AArch32, "cortex-a7"), &host, false);
    for bit in [aarch32::NEON, aarch32::VFP3, aarch32::VFP4, aarch32::V7, aarch32::ACLASS] {
      assert!(t.en.features.test(bit), "missing bit {bit}");
    }
    assert!(!t.en.features.test(aarch32::V8));
    // dis = real catalog mask minus enabled.
    let expected = Family::AArch32.real_mask().and_not(t.en.features);
    assert_eq!(t.dis.features, expected);
  }

  #[test]
  fn host_pinning_drops_vfp4_the_host_lacks() {
    let mut host_features = platform::FeatureSet::of(&[aarch32::V7, aarch32::ACLASS, aarch32::NEON, aarch32::VFP3]);
    Family::AArch32.enable_depends(&mut host_features);
    let host = (Cpu::Armv7A, host_features);
    let t = resolve_with_host(Family::AArch32, &parsed(Family::AArch32, "cortex-a7"), &host, true);
    assert!(t.en.features.test(aarch32::NEON));
    assert!(!t.en.features.test(aarch32::VFP4));
  }

  #[test]
  fn resolved_base_contains_catalog_base() {
    let host = cpu_host(Family::AArch64, "apple-m1");
    for spec in Family::AArch64.cpus() {
      let t = resolve_with_host(Family::AArch64, &TargetData::named(spec.name), &host, false);
      assert!(
        t.en.features.contains(spec.features),
        "{} lost base features in resolution",
        spec.name
      );
    }
  }
}
