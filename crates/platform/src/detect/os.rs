//! OS readers behind host discovery.
//!
//! Each source has a pure parser over bytes/text (unit-testable anywhere)
//! and a thin reader that feeds it from the real kernel interface. The
//! auxval readers go through the libc primitive first and fall back to
//! `/proc/self/auxv`; missing files and unreadable entries degrade to
//! "nothing detected", never to an error.

use std::vec::Vec;

use crate::cpuid::CpuId;
#[allow(unused_imports)]
use crate::{cpu::Cpu, detect::Host, family::Family, features::FeatureSet};

/// Auxiliary vector type of the HWCAP word.
pub const AT_HWCAP: u64 = 16;
/// Auxiliary vector type of the HWCAP2 word.
pub const AT_HWCAP2: u64 = 26;

// ─────────────────────────────────────────────────────────────────────────────
// Pure parsers
// ─────────────────────────────────────────────────────────────────────────────

/// Parse an auxiliary-vector byte stream into (HWCAP, HWCAP2).
///
/// The stream is a sequence of `(type, value)` pairs of native words
/// (`word_size` is 4 on AArch32, 8 on AArch64) terminated by a zero type.
/// Absent entries read as 0.
#[must_use]
pub fn parse_auxv_stream(bytes: &[u8], word_size: usize) -> (u64, u64) {
  fn word(bytes: &[u8], word_size: usize) -> Option<u64> {
    if word_size == 8 {
      Some(u64::from_ne_bytes(bytes.get(..8)?.try_into().ok()?))
    } else {
      Some(u64::from(u32::from_ne_bytes(bytes.get(..4)?.try_into().ok()?)))
    }
  }

  let mut hwcap = 0;
  let mut hwcap2 = 0;
  for chunk in bytes.chunks_exact(word_size * 2) {
    let (Some(ty), Some(val)) = (word(chunk, word_size), word(chunk.get(word_size..).unwrap_or(&[]), word_size)) else {
      break;
    };
    if ty == 0 {
      break;
    }
    if ty == AT_HWCAP {
      hwcap = val;
    } else if ty == AT_HWCAP2 {
      hwcap2 = val;
    }
  }
  (hwcap, hwcap2)
}

/// Parse the text of a sysfs `midr_el1` file into a raw MIDR value.
///
/// The kernel prints a hexadecimal u64, usually `0x`-prefixed.
#[must_use]
pub fn parse_midr_text(text: &str) -> Option<u64> {
  let text = text.trim();
  let digits = text
    .strip_prefix("0x")
    .or_else(|| text.strip_prefix("0X"))
    .unwrap_or(text);
  u64::from_str_radix(digits, 16).ok()
}

/// Integer in procfs notation: `0x`-prefixed hex or decimal.
fn parse_int(s: &str) -> Option<u64> {
  let s = s.trim_start_matches(['\t', ' ', ':']).trim();
  if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
    u64::from_str_radix(hex, 16).ok()
  } else {
    s.parse().ok()
  }
}

#[derive(Default)]
struct CpuinfoBlock {
  implementer: Option<u8>,
  variant: Option<u8>,
  part: Option<u16>,
}

impl CpuinfoBlock {
  /// Push the accumulated record if it is complete enough (implementer and
  /// part present) and start over.
  fn flush(&mut self, out: &mut Vec<CpuId>) {
    if let (Some(implementer), Some(part)) = (self.implementer, self.part) {
      out.push(CpuId {
        implementer,
        variant: self.variant.unwrap_or(0),
        part,
      });
    }
    *self = Self::default();
  }
}

/// Parse `/proc/cpuinfo` text into per-core identification records.
///
/// Blocks are separated by blank lines; a repeated field also starts a new
/// block, which copes with kernels that omit the separators. Duplicates are
/// left in; the fusion step dedups.
#[must_use]
pub fn parse_cpuinfo_text(text: &str) -> Vec<CpuId> {
  let mut out = Vec::new();
  let mut block = CpuinfoBlock::default();
  for line in text.lines() {
    if line.is_empty() {
      block.flush(&mut out);
      continue;
    }
    if let Some(rest) = line.strip_prefix("CPU implementer") {
      if block.implementer.is_some() {
        block.flush(&mut out);
      }
      block.implementer = parse_int(rest).and_then(|v| u8::try_from(v).ok());
    } else if let Some(rest) = line.strip_prefix("CPU variant") {
      if block.variant.is_some() {
        block.flush(&mut out);
      }
      block.variant = parse_int(rest).and_then(|v| u8::try_from(v).ok());
    } else if let Some(rest) = line.strip_prefix("CPU part") {
      if block.part.is_some() {
        block.flush(&mut out);
      }
      block.part = parse_int(rest).and_then(|v| u16::try_from(v).ok());
    }
  }
  block.flush(&mut out);
  out
}

// ─────────────────────────────────────────────────────────────────────────────
// Linux / Android / FreeBSD readers
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(
  any(target_arch = "aarch64", target_arch = "arm"),
  any(target_os = "linux", target_os = "android")
))]
fn read_auxval() -> (u64, u64) {
  extern "C" {
    fn getauxval(type_: core::ffi::c_ulong) -> core::ffi::c_ulong;
  }
  // SAFETY: getauxval takes no pointers and is exported by every libc the
  // std linux/android targets link.
  let hwcap = unsafe { getauxval(AT_HWCAP as core::ffi::c_ulong) } as u64;
  // SAFETY: as above.
  let hwcap2 = unsafe { getauxval(AT_HWCAP2 as core::ffi::c_ulong) } as u64;
  if hwcap != 0 || hwcap2 != 0 {
    return (hwcap, hwcap2);
  }
  // Some kernels hide auxval from syscall-filtered processes; the procfs
  // image carries the same pairs.
  read_auxv_file()
}

#[cfg(all(any(target_arch = "aarch64", target_arch = "arm"), target_os = "freebsd"))]
fn read_auxval() -> (u64, u64) {
  extern "C" {
    fn elf_aux_info(aux: core::ffi::c_int, buf: *mut core::ffi::c_void, buflen: core::ffi::c_int) -> core::ffi::c_int;
  }
  fn one(aux: u64) -> u64 {
    let mut val: core::ffi::c_ulong = 0;
    // SAFETY: buf points at a properly sized local and elf_aux_info writes
    // at most buflen bytes.
    let ret = unsafe {
      elf_aux_info(
        aux as core::ffi::c_int,
        core::ptr::addr_of_mut!(val).cast(),
        core::mem::size_of::<core::ffi::c_ulong>() as core::ffi::c_int,
      )
    };
    if ret == 0 { val as u64 } else { 0 }
  }
  (one(AT_HWCAP), one(AT_HWCAP2))
}

#[cfg(all(
  any(target_arch = "aarch64", target_arch = "arm"),
  any(target_os = "linux", target_os = "android")
))]
fn read_auxv_file() -> (u64, u64) {
  match std::fs::read("/proc/self/auxv") {
    Ok(bytes) => parse_auxv_stream(&bytes, core::mem::size_of::<usize>()),
    Err(_) => (0, 0),
  }
}

#[cfg(all(
  any(target_arch = "aarch64", target_arch = "arm"),
  any(target_os = "linux", target_os = "android", target_os = "freebsd")
))]
fn read_cpuids() -> Vec<CpuId> {
  let mut out = read_cpuids_sysfs();
  if out.is_empty() {
    if let Ok(text) = std::fs::read_to_string("/proc/cpuinfo") {
      out = parse_cpuinfo_text(&text);
    }
  }
  out
}

/// Read per-core MIDR values from sysfs (64-bit 4.7+ kernels).
#[cfg(all(
  any(target_arch = "aarch64", target_arch = "arm"),
  any(target_os = "linux", target_os = "android", target_os = "freebsd")
))]
fn read_cpuids_sysfs() -> Vec<CpuId> {
  let mut out = Vec::new();
  let Ok(dir) = std::fs::read_dir("/sys/devices/system/cpu") else {
    return out;
  };
  for entry in dir.flatten() {
    let name = entry.file_name();
    let Some(name) = name.to_str() else { continue };
    if !name.starts_with("cpu") {
      continue;
    }
    let path = entry.path().join("regs/identification/midr_el1");
    let Ok(text) = std::fs::read_to_string(&path) else { continue };
    if let Some(midr) = parse_midr_text(&text) {
      out.push(CpuId::from_midr(midr));
    }
  }
  out
}

#[cfg(all(target_arch = "arm", any(target_os = "linux", target_os = "android")))]
fn read_machine() -> Option<std::string::String> {
  // glibc/musl/bionic all lay utsname out as fixed 65-byte fields.
  #[repr(C)]
  struct Utsname {
    sysname: [u8; 65],
    nodename: [u8; 65],
    release: [u8; 65],
    version: [u8; 65],
    machine: [u8; 65],
    domainname: [u8; 65],
  }
  extern "C" {
    fn uname(buf: *mut Utsname) -> core::ffi::c_int;
  }
  let mut buf = Utsname {
    sysname: [0; 65],
    nodename: [0; 65],
    release: [0; 65],
    version: [0; 65],
    machine: [0; 65],
    domainname: [0; 65],
  };
  // SAFETY: buf is a properly sized, writable utsname.
  let ret = unsafe { uname(core::ptr::addr_of_mut!(buf)) };
  if ret < 0 {
    return None;
  }
  let len = buf.machine.iter().position(|&b| b == 0).unwrap_or(buf.machine.len());
  core::str::from_utf8(buf.machine.get(..len)?)
    .ok()
    .map(std::string::String::from)
}

#[cfg(all(
  any(target_arch = "aarch64", target_arch = "arm"),
  not(all(target_arch = "arm", any(target_os = "linux", target_os = "android")))
))]
#[allow(dead_code)]
fn read_machine() -> Option<std::string::String> {
  None
}

// ─────────────────────────────────────────────────────────────────────────────
// Darwin reader
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(target_arch = "aarch64", target_vendor = "apple"))]
fn read_brand_string() -> Option<std::string::String> {
  // Direct linkage against libSystem, which is always present.
  extern "C" {
    fn sysctlbyname(
      name: *const core::ffi::c_char,
      oldp: *mut core::ffi::c_void,
      oldlenp: *mut usize,
      newp: *const core::ffi::c_void,
      newlen: usize,
    ) -> core::ffi::c_int;
  }
  let mut buf = [0u8; 128];
  let mut len = buf.len();
  // SAFETY: the name is NUL-terminated, oldp/oldlenp describe a writable
  // 128-byte buffer, and nothing is written (newp null, newlen 0).
  let ret = unsafe {
    sysctlbyname(
      c"machdep.cpu.brand_string".as_ptr(),
      buf.as_mut_ptr().cast(),
      core::ptr::addr_of_mut!(len),
      core::ptr::null(),
      0,
    )
  };
  if ret != 0 {
    return None;
  }
  let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
  core::str::from_utf8(buf.get(..end)?)
    .ok()
    .map(std::string::String::from)
}

// ─────────────────────────────────────────────────────────────────────────────
// Entry point
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(all(target_arch = "aarch64", target_vendor = "apple"))]
pub(crate) fn detect_uncached() -> Host {
  match read_brand_string() {
    Some(brand) => crate::detect::host_from_brand(&brand),
    // Unreadable sysctl still means Apple silicon; take the baseline.
    None => crate::detect::host_from_brand(""),
  }
}

#[cfg(all(
  any(target_arch = "aarch64", target_arch = "arm"),
  any(target_os = "linux", target_os = "android", target_os = "freebsd")
))]
pub(crate) fn detect_uncached() -> Host {
  let (hwcap, hwcap2) = read_auxval();
  let input = crate::detect::HostInput {
    hwcap,
    hwcap2,
    cpuids: read_cpuids(),
    machine: read_machine(),
  };
  crate::detect::host_from_input(Family::native(), &input)
}

#[cfg(not(any(
  all(target_arch = "aarch64", target_vendor = "apple"),
  all(
    any(target_arch = "aarch64", target_arch = "arm"),
    any(target_os = "linux", target_os = "android", target_os = "freebsd")
  )
)))]
pub(crate) fn detect_uncached() -> Host {
  // No ARM discovery sources on this target.
  (Cpu::Generic, FeatureSet::NONE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
