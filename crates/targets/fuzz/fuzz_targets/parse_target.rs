#![no_main]

use libfuzzer_sys::fuzz_target;
use platform::Family;
use targets::{emit::backend_target_string, parse_target_string, resolve_with_host};

fuzz_target!(|data: &[u8]| {
  let Ok(spec) = core::str::from_utf8(data) else { return };
  for family in [Family::AArch32, Family::AArch64] {
    let Ok(parsed) = parse_target_string(family, spec) else {
      continue;
    };
    let host_spec = family.find_cpu("generic").unwrap();
    let host = (host_spec.cpu, host_spec.features);
    for target in &parsed {
      let resolved = resolve_with_host(family, target, &host, false);
      // Resolution must keep the polarities disjoint on any input.
      assert!(resolved.en.features.intersection(resolved.dis.features).is_empty());
      let _ = backend_target_string(family, &resolved, 140000);
    }
  }
});
