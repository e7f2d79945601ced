//! Property tests for the quantified invariants of the dispatch algebra.

use platform::{Family, FeatureSet};
use proptest::prelude::*;
use targets::{normalize_cpu_name, parse_target_string, resolve_with_host, target::TargetData};

fn feature_set() -> impl Strategy<Value = FeatureSet> {
  (any::<u32>(), any::<u32>(), any::<u32>()).prop_map(|(a, b, c)| FeatureSet([a, b, c]))
}

fn family() -> impl Strategy<Value = Family> {
  prop_oneof![Just(Family::AArch32), Just(Family::AArch64)]
}

/// The named model with its closed feature set, as a host.
fn generic_host(family: Family) -> platform::detect::Host {
  let spec = family.find_cpu("generic").unwrap();
  (spec.cpu, spec.features)
}

proptest! {
  #[test]
  fn enable_closure_is_inflationary_and_idempotent(set in feature_set(), fam in family()) {
    let mut once = set;
    fam.enable_depends(&mut once);
    prop_assert!(once.contains(set));
    let mut twice = once;
    fam.enable_depends(&mut twice);
    prop_assert_eq!(twice, once);
  }

  #[test]
  fn disable_closure_is_deflationary_and_idempotent(set in feature_set(), fam in family()) {
    let mut once = set;
    fam.disable_depends(&mut once);
    prop_assert!(set.contains(once));
    let mut twice = once;
    fam.disable_depends(&mut twice);
    prop_assert_eq!(twice, once);
  }

  #[test]
  fn enabled_set_after_enable_closure_is_upward_closed(set in feature_set(), fam in family()) {
    // Re-running the plain edge walk finds nothing new once closed.
    let mut closed = set;
    fam.enable_depends(&mut closed);
    let deps = match fam {
      Family::AArch64 => platform::features::aarch64::DEPS,
      Family::AArch32 => platform::features::aarch32::DEPS,
    };
    for d in deps {
      if closed.test(d.dep) {
        prop_assert!(closed.test(d.prereq), "bit {} missing prerequisite {}", d.dep, d.prereq);
      }
    }
  }

  #[test]
  fn resolution_keeps_enable_and_disable_disjoint(
    fam in family(),
    cpu_idx in any::<prop::sample::Index>(),
    en in feature_set(),
    dis in feature_set(),
  ) {
    let specs = fam.cpus();
    let spec = &specs[cpu_idx.index(specs.len())];
    let parsed = TargetData {
      name: spec.name.into(),
      en: targets::FeatureFlags { features: en.intersection(fam.catalog_mask()), flags: 0 },
      dis: targets::FeatureFlags { features: dis.intersection(fam.catalog_mask()), flags: 0 },
      ..TargetData::default()
    };
    let resolved = resolve_with_host(fam, &parsed, &generic_host(fam), false);
    prop_assert!(resolved.en.features.intersection(resolved.dis.features).is_empty());
  }

  #[test]
  fn resolution_contains_the_base_features(fam in family(), cpu_idx in any::<prop::sample::Index>()) {
    let specs = fam.cpus();
    let spec = &specs[cpu_idx.index(specs.len())];
    let resolved = resolve_with_host(fam, &TargetData::named(spec.name), &generic_host(fam), false);
    prop_assert!(resolved.en.features.contains(spec.features), "{} lost base bits", spec.name);
  }

  #[test]
  fn normalize_is_idempotent(name in "[a-z0-9-]{0,16}") {
    let once = normalize_cpu_name(&name);
    prop_assert_eq!(normalize_cpu_name(once), once);
  }

  #[test]
  fn parser_never_panics(fam in family(), spec in "[a-z0-9+,;=_. -]{0,48}") {
    let _ = parse_target_string(fam, &spec);
  }
}

/// Emit → re-parse → re-resolve reaches an equivalent target for every
/// catalog model (fixed backend release).
#[test]
fn emit_reparse_roundtrip_over_the_catalog() {
  for fam in [Family::AArch64, Family::AArch32] {
    let host = generic_host(fam);
    for spec in fam.cpus() {
      let original = resolve_with_host(fam, &TargetData::named(spec.name), &host, false);
      let (name, flags) = targets::emit::backend_target(fam, &original, 140000);
      let mut rebuilt = name;
      for flag in &flags {
        // The unconditional arch block and the armv*-* synonyms are
        // backend spellings the parser does not model.
        let backend_only: &[&str] = match fam {
          Family::AArch64 => &["+neon", "+fp-armv8"],
          Family::AArch32 => &[
            "+armv8-a",
            "+armv8-r",
            "+armv8-m.base",
            "+armv8-m.main",
            "+armv7-a",
            "+armv7-r",
            "+armv7-m",
            "+v8m",
            "+v6",
            "+vfp2",
          ],
        };
        if backend_only.contains(&flag.as_str()) {
          continue;
        }
        rebuilt.push(',');
        rebuilt.push_str(flag);
      }
      let reparsed = parse_target_string(fam, &rebuilt)
        .unwrap_or_else(|e| panic!("{}: {e}", spec.name))
        .remove(0);
      let re = resolve_with_host(fam, &reparsed, &host, false);
      let real = fam.real_mask();
      assert_eq!(
        re.en.features.intersection(real),
        original.en.features.intersection(real),
        "{}: enabled set drifted through emit/parse",
        spec.name
      );
    }
  }
}
