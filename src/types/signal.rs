use crate::types::node::BusNode;
use std::collections::BTreeMap;

/// Elementary step for moving a bit field between a payload and a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Step {
    /// Source byte index.
    pub(crate) byte_index: u8,
    /// LSB within the source byte (0..7).
    pub(crate) src_lsb: u8,
    /// Number of bits to take (1..8).
    pub(crate) width: u8,
    /// Destination LSB in the final value (LSB-first).
    pub(crate) dst_lsb: u16,
}

/// Definition of a signal within a CAN message.
///
/// Describes position/bit-length, endianness, sign, scaling (factor/offset),
/// valid range, unit of measure, value descriptions, and receiver nodes.
#[derive(Default, Clone, PartialEq, Debug)]
pub struct Signal {
    /// Signal name.
    pub name: String,
    /// True when this signal is the multiplex selector (`M` in DBC).
    pub is_multiplex_def: bool,
    /// Multiplex id for signals gated by the selector (`m<N>` in DBC).
    /// Mutually exclusive with `is_multiplex_def`.
    pub multiplex_id: Option<u32>,
    /// Bit start in the payload. For little-endian signals this is the LSB
    /// of the field; for big-endian signals it names the MSB.
    pub start_bit: u16,
    /// Bit length.
    pub bit_length: u16,
    /// Endianness.
    pub endianness: Endianness,
    /// Sign.
    pub sign: Signess,
    /// Scaling factor.
    pub factor: f64,
    /// Scaling offset.
    pub offset: f64,
    /// Minimum physical value.
    pub min: f64,
    /// Maximum physical value.
    pub max: f64,
    /// Unit of measure (may be empty).
    pub unit: String,
    /// Receiver nodes, name only. Empty when the DBC lists `Vector__XXX`.
    pub receiver_nodes: Vec<BusNode>,
    /// Value-to-text mapping (DBC `VAL_` section).
    pub value_descriptions: BTreeMap<u32, String>,
    /// Associated comment (DBC `CM_ SG_` section).
    pub comment: Option<String>,
    /// Attribute assignments (DBC `BA_ ... SG_` section), raw literal text.
    pub attributes: BTreeMap<String, String>,
    // Precomputed extraction steps for the transcoder.
    pub(crate) steps: Vec<Step>,
}

impl Signal {
    /// Precomputes bit field steps to speed up transcoding.
    ///
    /// Called once by the parser; a no-op when steps already exist.
    pub fn compile_inline(&mut self) {
        if !self.steps.is_empty() {
            return;
        }
        let n_steps: usize = (self.bit_length as usize + (self.start_bit as usize & 7))
            .div_ceil(8)
            .max(1);
        self.steps.reserve_exact(n_steps);

        if matches!(self.endianness, Endianness::Intel) {
            self.compile_intel();
        } else {
            self.compile_motorola();
        }
    }

    #[inline]
    fn push_step(&mut self, st: Step) {
        self.steps.push(st);
    }

    /// Step compilation for little-endian (Intel) signals.
    fn compile_intel(&mut self) {
        let mut remaining: u16 = self.bit_length;
        let mut bit: u16 = self.start_bit;
        let mut dst: u16 = 0u16;

        while remaining > 0 {
            let byte_idx: u8 = (bit / 8) as u8;
            let bit_off: u8 = (bit % 8) as u8;
            let avail: u8 = 8 - bit_off;
            let take: u8 = remaining.min(avail as u16) as u8;

            self.push_step(Step {
                byte_index: byte_idx,
                src_lsb: bit_off,
                width: take,
                dst_lsb: dst,
            });

            bit += take as u16;
            dst += take as u16;
            remaining -= take as u16;
        }
    }

    /// Step compilation for big-endian (Motorola) signals.
    fn compile_motorola(&mut self) {
        // In DBC, @0: the start bit is the MSB of the signal; we advance MSB-first.
        let mut remaining: u16 = self.bit_length;
        let mut byte: usize = (self.start_bit / 8) as usize;
        let mut bit_msb: u8 = 7 - (self.start_bit % 8) as u8;

        while remaining > 0 {
            let can_take: u16 = (bit_msb as u16 + 1).min(remaining);
            let src_lsb: u8 = bit_msb + 1 - can_take as u8;
            let dst_lsb: u16 = remaining - can_take;

            self.push_step(Step {
                byte_index: byte as u8,
                src_lsb,
                width: can_take as u8,
                dst_lsb,
            });

            remaining -= can_take;
            if src_lsb == 0 {
                byte += 1;
                bit_msb = 7;
            } else {
                bit_msb = src_lsb - 1;
            }
        }
    }

    /// Extracts the **unsigned** raw value (LSB-first accumulation) from the payload.
    #[inline]
    pub fn extract_raw_u64(&self, bytes: &[u8]) -> u64 {
        let mut out: u64 = 0;
        for st in &self.steps {
            if let Some(&b) = bytes.get(st.byte_index as usize) {
                let mask: u8 = if st.width == 8 {
                    0xFF
                } else {
                    ((1u16 << st.width) - 1) as u8
                };
                let chunk = ((b >> st.src_lsb) & mask) as u64;
                out |= chunk << st.dst_lsb;
            }
        }
        out
    }

    /// Extracts the **signed** raw value from the payload, performing sign
    /// extension if needed.
    #[inline]
    pub fn extract_raw_i64(&self, bytes: &[u8]) -> i64 {
        let raw_u: u64 = self.extract_raw_u64(bytes);
        let n: u16 = self.bit_length.min(64);
        if matches!(self.sign, Signess::Signed) && n > 0 {
            let sign_bit = 1u64 << (n - 1);
            if (raw_u & sign_bit) != 0 {
                let mask = if n == 64 { u64::MAX } else { (1u64 << n) - 1 };
                (raw_u | !mask) as i64
            } else {
                raw_u as i64
            }
        } else {
            raw_u as i64
        }
    }

    /// Writes the low `bit_length` bits of `raw` into the payload, the exact
    /// inverse of [`extract_raw_u64`](Self::extract_raw_u64).
    #[inline]
    pub fn insert_raw_u64(&self, bytes: &mut [u8], raw: u64) {
        for st in &self.steps {
            if let Some(b) = bytes.get_mut(st.byte_index as usize) {
                let mask: u8 = if st.width == 8 {
                    0xFF
                } else {
                    ((1u16 << st.width) - 1) as u8
                };
                let chunk = ((raw >> st.dst_lsb) as u8) & mask;
                *b = (*b & !(mask << st.src_lsb)) | (chunk << st.src_lsb);
            }
        }
    }

    // Highest payload byte the field touches, plus one.
    pub(crate) fn payload_bytes_needed(&self) -> usize {
        self.steps
            .iter()
            .map(|st| st.byte_index as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Resets all fields to their default values.
    pub fn clear(&mut self) {
        *self = Signal::default();
    }
}

/// Bit ordering of a multi-byte signal.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Endianness {
    /// Big-endian, `@0` in DBC.
    #[default]
    Motorola,
    /// Little-endian, `@1` in DBC.
    Intel,
}

/// Signedness of the raw value.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Signess {
    /// `+` in DBC.
    #[default]
    Unsigned,
    /// `-` in DBC.
    Signed,
}
