//! Per-core CPU identification records.
//!
//! A [`CpuId`] is the (implementer, variant, part) triple extracted from a
//! core's MIDR_EL1 value, either read from sysfs or reassembled from
//! `/proc/cpuinfo`. [`cpuid_to_cpu`] maps a record to a catalog model with
//! a two-level implementer/part dispatch; a handful of rows additionally
//! need the variant field to tell silicon revisions apart.

use crate::cpu::Cpu;

/// One core's identification record.
///
/// Ordering is lexicographic over (implementer, part, variant) so that a
/// sorted set of records groups cores of the same design together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CpuId {
  /// Implementer byte (MIDR_EL1 bits [31:24]).
  pub implementer: u8,
  /// Variant nibble (MIDR_EL1 bits [23:20]).
  pub variant: u8,
  /// Part number (MIDR_EL1 bits [15:4]).
  pub part: u16,
}

impl PartialOrd for CpuId {
  fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for CpuId {
  fn cmp(&self, other: &Self) -> core::cmp::Ordering {
    (self.implementer, self.part, self.variant).cmp(&(other.implementer, other.part, other.variant))
  }
}

impl CpuId {
  /// Extract the identification fields from a raw MIDR_EL1 value.
  #[inline]
  #[must_use]
  pub const fn from_midr(midr: u64) -> Self {
    Self {
      implementer: (midr >> 24) as u8,
      variant: ((midr >> 20) & 0xf) as u8,
      part: ((midr >> 4) & 0xfff) as u16,
    }
  }
}

/// Map an identification record to a catalog model.
///
/// Unknown implementers and unknown parts answer [`Cpu::Generic`]; the
/// discovery pipeline treats that as "unrecognized core".
#[must_use]
pub fn cpuid_to_cpu(id: CpuId) -> Cpu {
  match id.implementer {
    // 'A': ARM Ltd.
    0x41 => match id.part {
      0xb02 => Cpu::ArmMpcore,
      0xb36 => Cpu::Arm1136jfS,
      0xb56 => Cpu::Arm1156t2fS,
      0xb76 => Cpu::Arm1176jzfS,
      0xc05 => Cpu::CortexA5,
      0xc07 => Cpu::CortexA7,
      0xc08 => Cpu::CortexA8,
      0xc09 => Cpu::CortexA9,
      0xc0d => Cpu::CortexA12,
      0xc0f => Cpu::CortexA15,
      0xc0e => Cpu::CortexA17,
      0xc14 => Cpu::CortexR4,
      0xc15 => Cpu::CortexR5,
      0xc17 => Cpu::CortexR7,
      0xc18 => Cpu::CortexR8,
      0xc20 => Cpu::CortexM0,
      0xc21 => Cpu::CortexM1,
      0xc23 => Cpu::CortexM3,
      0xc24 => Cpu::CortexM4,
      0xc27 => Cpu::CortexM7,
      0xd01 => Cpu::CortexA32,
      0xd02 => Cpu::CortexA34,
      0xd03 => Cpu::CortexA53,
      0xd04 => Cpu::CortexA35,
      0xd05 => Cpu::CortexA55,
      0xd06 => Cpu::CortexA65,
      0xd07 => Cpu::CortexA57,
      0xd08 => Cpu::CortexA72,
      0xd09 => Cpu::CortexA73,
      0xd0a => Cpu::CortexA75,
      0xd0b => Cpu::CortexA76,
      0xd0c => Cpu::NeoverseN1,
      0xd0d => Cpu::CortexA77,
      0xd0e => Cpu::CortexA76Ae,
      0xd13 => Cpu::CortexR52,
      0xd20 => Cpu::CortexM23,
      0xd21 => Cpu::CortexM33,
      0xd40 => Cpu::NeoverseV1,
      0xd41 => Cpu::CortexA78,
      0xd43 => Cpu::CortexA65Ae,
      0xd44 => Cpu::CortexX1,
      0xd49 => Cpu::NeoverseN2,
      0xd4a => Cpu::NeoverseE1,
      _ => Cpu::Generic,
    },
    // 'B': Broadcom, second-sourced ThunderX2 silicon
    0x42 => match id.part {
      0x516 => Cpu::ThunderX2T99P1,
      _ => Cpu::Generic,
    },
    // 'C': Cavium
    0x43 => match id.part {
      0xa0 => Cpu::ThunderX,
      // Pass-1 T88 silicon reports variant 0.
      0xa1 => {
        if id.variant == 0 {
          Cpu::ThunderXT88P1
        } else {
          Cpu::ThunderXT88
        }
      }
      0xa2 => Cpu::ThunderXT81,
      0xa3 => Cpu::ThunderXT83,
      0xaf => Cpu::ThunderX2T99,
      0xb0 => Cpu::OcteonTx2,
      0xb1 => Cpu::OcteonTx2T98,
      0xb2 => Cpu::OcteonTx2T96,
      0xb3 => Cpu::OcteonTx2F95,
      0xb4 => Cpu::OcteonTx2F95N,
      0xb5 => Cpu::OcteonTx2F95Mm,
      0xb8 => Cpu::ThunderX3T110,
      _ => Cpu::Generic,
    },
    // 'F': Fujitsu
    0x46 => match id.part {
      0x1 => Cpu::A64Fx,
      _ => Cpu::Generic,
    },
    // 'H': HiSilicon
    0x48 => match id.part {
      0xd01 => Cpu::Tsv110,
      // Kirin 980
      0xd40 => Cpu::CortexA76,
      _ => Cpu::Generic,
    },
    // 'N': NVIDIA
    0x4e => match id.part {
      0x000 => Cpu::Denver1,
      0x003 => Cpu::Denver2,
      0x004 => Cpu::Carmel,
      _ => Cpu::Generic,
    },
    // 'P': AppliedMicro
    0x50 => match id.part {
      0x000 => Cpu::XGene1,
      _ => Cpu::Generic,
    },
    // 'Q': Qualcomm
    0x51 => match id.part {
      0x00f | 0x02d => Cpu::Scorpion,
      0x04d | 0x06f => Cpu::Krait,
      // kryo 1xx gold/silver
      0x201 | 0x205 | 0x211 => Cpu::Kyro,
      // kryo 2xx
      0x800 => Cpu::CortexA73,
      0x801 => Cpu::CortexA53,
      // kryo 3xx
      0x802 => Cpu::CortexA75,
      0x803 => Cpu::CortexA55,
      // kryo 4xx
      0x804 => Cpu::CortexA76,
      0x805 => Cpu::CortexA55,
      0xc00 => Cpu::Falkor,
      0xc01 => Cpu::Saphira,
      _ => Cpu::Generic,
    },
    // 'S': Samsung, variant-keyed Mongoose generations
    0x53 => {
      if id.part == 1 {
        return if id.variant == 4 { Cpu::ExynosM2 } else { Cpu::ExynosM1 };
      }
      if id.variant != 1 {
        return Cpu::Generic;
      }
      match id.part {
        0x2 => Cpu::ExynosM3,
        0x3 => Cpu::ExynosM4,
        0x4 => Cpu::ExynosM5,
        _ => Cpu::Generic,
      }
    }
    // 'V': Marvell
    0x56 => match id.part {
      0x581 | 0x584 => Cpu::Pj4,
      _ => Cpu::Generic,
    },
    // 'a': Apple. Part numbers cover both the e- and p-core of each design.
    0x61 => match id.part {
      0x0 => Cpu::Swift,
      0x1 => Cpu::AppleA7,
      0x2 | 0x3 => Cpu::AppleA8,
      0x4 | 0x5 => Cpu::AppleA9,
      0x6 | 0x7 => Cpu::AppleA10,
      0x8 | 0x9 => Cpu::AppleA11,
      0xb | 0xc | 0x10 | 0x11 => Cpu::AppleA12,
      0xf => Cpu::AppleS4,
      0x12 | 0x13 => Cpu::AppleA13,
      0x20 | 0x21 => Cpu::AppleA14,
      0x22 | 0x23 | 0x24 | 0x25 | 0x28 | 0x29 => Cpu::AppleM1,
      0x30 | 0x31 => Cpu::AppleA15,
      0x32 | 0x33 | 0x34 | 0x35 | 0x38 | 0x39 => Cpu::AppleM2,
      0x40 | 0x41 => Cpu::AppleA16,
      0x42 | 0x43 | 0x44 | 0x45 | 0x48 | 0x49 => Cpu::AppleM3,
      0x50 | 0x51 => Cpu::AppleA17,
      0x52 | 0x53 | 0x54 | 0x55 | 0x58 | 0x59 => Cpu::AppleM4,
      _ => Cpu::Generic,
    },
    // 'h': Huaxintong Semiconductor
    0x68 => match id.part {
      0x0 => Cpu::Phecda,
      _ => Cpu::Generic,
    },
    // 'i': Intel
    0x69 => match id.part {
      0x001 => Cpu::Intel3735D,
      _ => Cpu::Generic,
    },
    _ => Cpu::Generic,
  }
}
