//! Bit-level decode/encode of signal values over a message payload.
//!
//! Decoding extracts each signal's raw integer honoring endianness, bit
//! position, length and sign, then scales it to a physical value
//! (`raw * factor + offset`). Encoding is the inverse: physical values are
//! rounded back to raw integers, saturated to the representable bit range,
//! and packed into the payload.
//!
//! Transcode errors never abort: whole-message operations collect them out
//! of band next to the best-effort results.

use crate::types::{
    errors::TranscodeError,
    message::Message,
    signal::{Signal, Signess},
};
use std::collections::BTreeMap;

/// Decoded view of one signal: the raw integer extracted from the payload
/// and the physical value `raw * factor + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedSignal {
    pub raw: i64,
    pub physical: f64,
}

/// Best-effort decode of a whole payload. Multiplexed signals whose selector
/// does not match are absent from `signals` without an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedMessage {
    pub signals: BTreeMap<String, DecodedSignal>,
    pub errors: Vec<TranscodeError>,
}

/// Result of packing physical values into a payload. Signals that could not
/// be written keep their zeroed bits and report an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedMessage {
    pub payload: Vec<u8>,
    pub errors: Vec<TranscodeError>,
}

/// Bit-level decoder/encoder for the signals of one message.
pub struct MessageTranscoder<'a> {
    msg: &'a Message,
}

impl<'a> MessageTranscoder<'a> {
    pub fn new(msg: &'a Message) -> Self {
        MessageTranscoder { msg }
    }

    /// The message definition this transcoder operates on.
    pub fn message_def(&self) -> &Message {
        self.msg
    }

    /// Decodes every signal of the message from `payload`.
    ///
    /// A multiplexed signal is decoded only when the selector's raw value
    /// equals its multiplex id; otherwise it is simply absent. Signals whose
    /// field does not fit the payload report [`TranscodeError::ShortPayload`].
    pub fn decode(&self, payload: &[u8]) -> DecodedMessage {
        let mut out = DecodedMessage::default();
        let selector_raw: Option<u64> = self.msg.multiplex_selector().and_then(|sel| {
            (payload.len() >= sel.payload_bytes_needed()).then(|| sel.extract_raw_u64(payload))
        });

        for signal in self.msg.signals.values() {
            if let Some(mux_id) = signal.multiplex_id
                && selector_raw != Some(mux_id as u64)
            {
                continue;
            }
            match decode_signal_raw(signal, payload) {
                Ok(decoded) => {
                    out.signals.insert(signal.name.clone(), decoded);
                }
                Err(err) => out.errors.push(err),
            }
        }

        out
    }

    /// Decodes a single signal by name.
    pub fn decode_signal(&self, name: &str, payload: &[u8]) -> Result<DecodedSignal, TranscodeError> {
        let Some(signal) = self.msg.signals.get(name) else {
            return Err(TranscodeError::UnknownSignal {
                message: self.msg.name.clone(),
                signal: name.to_string(),
            });
        };

        if let Some(mux_id) = signal.multiplex_id {
            let actual: u64 = match self.msg.multiplex_selector() {
                Some(sel) if payload.len() >= sel.payload_bytes_needed() => {
                    sel.extract_raw_u64(payload)
                }
                Some(sel) => {
                    return Err(TranscodeError::ShortPayload {
                        signal: sel.name.clone(),
                        needed: sel.payload_bytes_needed(),
                        available: payload.len(),
                    });
                }
                None => {
                    return Err(TranscodeError::SelectorMismatch {
                        signal: name.to_string(),
                        expected: mux_id,
                        actual: 0,
                    });
                }
            };
            if actual != mux_id as u64 {
                return Err(TranscodeError::SelectorMismatch {
                    signal: name.to_string(),
                    expected: mux_id,
                    actual,
                });
            }
        }

        decode_signal_raw(signal, payload)
    }

    /// Packs physical values into a fresh payload sized by the message DLC.
    ///
    /// Values are rounded to raw integers and saturated to the signal's bit
    /// range; saturation is reported via [`TranscodeError::OutOfRange`] but
    /// the clipped value is still written. Multiplexed signals are written
    /// only when the supplied selector value matches their multiplex id.
    /// Signals without a supplied value keep their zeroed bits.
    pub fn encode(&self, physical: &BTreeMap<String, f64>) -> EncodedMessage {
        let length: usize = Message::dlc_to_length(self.msg.dlc).unwrap_or(0) as usize;
        let mut out = EncodedMessage {
            payload: vec![0u8; length],
            errors: Vec::new(),
        };

        let selector_raw: Option<u64> = self.msg.multiplex_selector().and_then(|sel| {
            physical
                .get(&sel.name)
                .map(|phys| raw_from_physical(sel, *phys).0 & bit_mask(sel.bit_length))
        });

        for signal in self.msg.signals.values() {
            let Some(&phys) = physical.get(&signal.name) else {
                continue;
            };

            if let Some(mux_id) = signal.multiplex_id
                && selector_raw != Some(mux_id as u64)
            {
                out.errors.push(TranscodeError::SelectorMismatch {
                    signal: signal.name.clone(),
                    expected: mux_id,
                    actual: selector_raw.unwrap_or(0),
                });
                continue;
            }

            let needed: usize = signal.payload_bytes_needed();
            if needed > out.payload.len() {
                out.errors.push(TranscodeError::ShortPayload {
                    signal: signal.name.clone(),
                    needed,
                    available: out.payload.len(),
                });
                continue;
            }

            let (raw, clipped) = raw_from_physical(signal, phys);
            if clipped {
                out.errors.push(TranscodeError::OutOfRange {
                    signal: signal.name.clone(),
                    physical: phys,
                    bit_length: signal.bit_length,
                });
            }
            signal.insert_raw_u64(&mut out.payload, raw);
        }

        for name in physical.keys() {
            if !self.msg.signals.contains_key(name) {
                out.errors.push(TranscodeError::UnknownSignal {
                    message: self.msg.name.clone(),
                    signal: name.clone(),
                });
            }
        }

        out
    }
}

fn decode_signal_raw(signal: &Signal, payload: &[u8]) -> Result<DecodedSignal, TranscodeError> {
    let needed: usize = signal.payload_bytes_needed();
    if payload.len() < needed {
        return Err(TranscodeError::ShortPayload {
            signal: signal.name.clone(),
            needed,
            available: payload.len(),
        });
    }

    let raw: i64 = signal.extract_raw_i64(payload);
    Ok(DecodedSignal {
        raw,
        physical: raw as f64 * signal.factor + signal.offset,
    })
}

// round((physical - offset) / factor), saturated to the n-bit range.
// The bool reports whether saturation happened.
fn raw_from_physical(signal: &Signal, physical: f64) -> (u64, bool) {
    let n: u32 = signal.bit_length.clamp(1, 64) as u32;
    let (lo, hi): (i128, i128) = match signal.sign {
        Signess::Signed => (-(1i128 << (n - 1)), (1i128 << (n - 1)) - 1),
        Signess::Unsigned => (0, (1i128 << n) - 1),
    };

    let ideal: f64 = ((physical - signal.offset) / signal.factor).round();
    let raw: i128 = ideal as i128; // saturating cast; NaN becomes 0
    let clamped: i128 = raw.clamp(lo, hi);
    let clipped: bool = ideal.is_nan() || raw != clamped;
    (clamped as u64, clipped)
}

fn bit_mask(bit_length: u16) -> u64 {
    let n: u16 = bit_length.clamp(1, 64);
    if n == 64 { u64::MAX } else { (1u64 << n) - 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::errors::TranscodeErrorKind;
    use crate::types::signal::Endianness;

    fn make_signal(
        name: &str,
        start_bit: u16,
        bit_length: u16,
        endianness: Endianness,
        sign: Signess,
        factor: f64,
        offset: f64,
    ) -> Signal {
        let mut sig = Signal {
            name: name.to_string(),
            start_bit,
            bit_length,
            endianness,
            sign,
            factor,
            offset,
            ..Default::default()
        };
        sig.compile_inline();
        sig
    }

    fn make_message(dlc: u8, signals: Vec<Signal>) -> Message {
        let mut msg = Message {
            id: 1045,
            name: "TEST_MSG".to_string(),
            dlc,
            ..Default::default()
        };
        for sig in signals {
            msg.signals.insert(sig.name.clone(), sig);
        }
        msg
    }

    #[test]
    fn test_little_endian_decode_encode() {
        let sig = make_signal("WORD", 0, 32, Endianness::Intel, Signess::Unsigned, 1.0, 0.0);
        let msg = make_message(4, vec![sig]);
        let xcoder = MessageTranscoder::new(&msg);

        let payload: [u8; 4] = [0x78, 0x56, 0x34, 0x12];
        let decoded = xcoder.decode(&payload);
        assert!(decoded.errors.is_empty());
        assert_eq!(decoded.signals["WORD"].raw, 0x12345678);
        assert_eq!(decoded.signals["WORD"].physical, 305419896.0);

        let values = BTreeMap::from([("WORD".to_string(), 0x12345678 as f64)]);
        let encoded = xcoder.encode(&values);
        assert!(encoded.errors.is_empty());
        assert_eq!(encoded.payload, payload);
    }

    #[test]
    fn test_big_endian_signed_decode() {
        // Motorola layout: start bit 7 is the MSB of the first byte.
        let sig = make_signal("SPEED", 7, 16, Endianness::Motorola, Signess::Signed, 0.01, 0.0);
        let msg = make_message(2, vec![sig]);
        let xcoder = MessageTranscoder::new(&msg);

        let decoded = xcoder.decode(&[0x12, 0x34]);
        assert_eq!(decoded.signals["SPEED"].raw, 0x1234);
        assert!((decoded.signals["SPEED"].physical - 46.6).abs() < 1e-9);

        let decoded = xcoder.decode(&[0xFF, 0xFF]);
        assert_eq!(decoded.signals["SPEED"].raw, -1);
        assert!((decoded.signals["SPEED"].physical - -0.01).abs() < 1e-9);
    }

    #[test]
    fn test_sign_extension_little_endian() {
        let sig = make_signal("TEMP", 0, 8, Endianness::Intel, Signess::Signed, 1.0, -40.0);
        let msg = make_message(1, vec![sig]);
        let xcoder = MessageTranscoder::new(&msg);

        let decoded = xcoder.decode(&[0x80]);
        assert_eq!(decoded.signals["TEMP"].raw, -128);
        assert_eq!(decoded.signals["TEMP"].physical, -168.0);
    }

    #[test]
    fn test_encode_decode_inverse() {
        let sig = make_signal("SPEED", 7, 16, Endianness::Motorola, Signess::Signed, 0.01, 0.0);
        let msg = make_message(2, vec![sig.clone()]);
        let xcoder = MessageTranscoder::new(&msg);

        for raw in [-32768i64, -1, 0, 1, 12345, 32767] {
            let physical = raw as f64 * sig.factor + sig.offset;
            let encoded = xcoder.encode(&BTreeMap::from([("SPEED".to_string(), physical)]));
            assert!(encoded.errors.is_empty(), "raw {raw} reported errors");
            let decoded = xcoder.decode(&encoded.payload);
            assert_eq!(decoded.signals["SPEED"].raw, raw);
        }
    }

    #[test]
    fn test_encode_saturates_and_reports() {
        let sig = make_signal("COUNT", 0, 8, Endianness::Intel, Signess::Unsigned, 1.0, 0.0);
        let msg = make_message(1, vec![sig]);
        let xcoder = MessageTranscoder::new(&msg);

        let encoded = xcoder.encode(&BTreeMap::from([("COUNT".to_string(), 300.0)]));
        assert_eq!(encoded.payload, vec![0xFF]);
        assert_eq!(encoded.errors.len(), 1);
        assert_eq!(encoded.errors[0].kind(), TranscodeErrorKind::OutOfRange);

        let encoded = xcoder.encode(&BTreeMap::from([("COUNT".to_string(), -5.0)]));
        assert_eq!(encoded.payload, vec![0x00]);
        assert_eq!(encoded.errors[0].kind(), TranscodeErrorKind::OutOfRange);

        let signed = make_signal("LEVEL", 0, 8, Endianness::Intel, Signess::Signed, 1.0, 0.0);
        let msg = make_message(1, vec![signed]);
        let xcoder = MessageTranscoder::new(&msg);
        let encoded = xcoder.encode(&BTreeMap::from([("LEVEL".to_string(), -1000.0)]));
        assert_eq!(encoded.payload, vec![0x80]);
        assert_eq!(encoded.errors[0].kind(), TranscodeErrorKind::OutOfRange);
    }

    #[test]
    fn test_multiplex_gating() {
        let mut selector = make_signal("MUX", 0, 8, Endianness::Intel, Signess::Unsigned, 1.0, 0.0);
        selector.is_multiplex_def = true;
        let mut gated = make_signal("GEAR", 8, 8, Endianness::Intel, Signess::Unsigned, 1.0, 0.0);
        gated.multiplex_id = Some(2);
        let msg = make_message(2, vec![selector, gated]);
        let xcoder = MessageTranscoder::new(&msg);

        // Selector matches: gated signal decoded.
        let decoded = xcoder.decode(&[0x02, 0x55]);
        assert_eq!(decoded.signals["GEAR"].raw, 0x55);

        // Selector mismatch: gated signal absent, no error.
        let decoded = xcoder.decode(&[0x01, 0x55]);
        assert!(!decoded.signals.contains_key("GEAR"));
        assert!(decoded.errors.is_empty());

        let err = xcoder.decode_signal("GEAR", &[0x01, 0x55]).unwrap_err();
        assert_eq!(err.kind(), TranscodeErrorKind::SelectorMismatch);

        // Encoding honors the supplied selector value the same way.
        let values = BTreeMap::from([("MUX".to_string(), 2.0), ("GEAR".to_string(), 0x55 as f64)]);
        let encoded = xcoder.encode(&values);
        assert!(encoded.errors.is_empty());
        assert_eq!(encoded.payload, vec![0x02, 0x55]);

        let values = BTreeMap::from([("MUX".to_string(), 1.0), ("GEAR".to_string(), 0x55 as f64)]);
        let encoded = xcoder.encode(&values);
        assert_eq!(encoded.payload, vec![0x01, 0x00]);
        assert_eq!(encoded.errors[0].kind(), TranscodeErrorKind::SelectorMismatch);
    }

    #[test]
    fn test_short_payload() {
        let sig = make_signal("WORD", 0, 32, Endianness::Intel, Signess::Unsigned, 1.0, 0.0);
        let msg = make_message(4, vec![sig]);
        let xcoder = MessageTranscoder::new(&msg);

        let decoded = xcoder.decode(&[0x01, 0x02]);
        assert!(decoded.signals.is_empty());
        assert_eq!(decoded.errors.len(), 1);
        assert_eq!(decoded.errors[0].kind(), TranscodeErrorKind::ShortPayload);

        let err = xcoder.decode_signal("WORD", &[0x01]).unwrap_err();
        assert_eq!(err.kind(), TranscodeErrorKind::ShortPayload);
    }

    #[test]
    fn test_unknown_signal() {
        let msg = make_message(1, vec![]);
        let xcoder = MessageTranscoder::new(&msg);

        let err = xcoder.decode_signal("NOPE", &[0x00]).unwrap_err();
        assert_eq!(err.kind(), TranscodeErrorKind::UnknownSignal);

        let encoded = xcoder.encode(&BTreeMap::from([("NOPE".to_string(), 1.0)]));
        assert_eq!(encoded.errors[0].kind(), TranscodeErrorKind::UnknownSignal);
    }

    #[test]
    fn test_scaled_physical_roundtrip() {
        // Factor and offset applied in double precision.
        let sig = make_signal("PCT", 0, 10, Endianness::Intel, Signess::Unsigned, 0.25, -10.0);
        let msg = make_message(2, vec![sig]);
        let xcoder = MessageTranscoder::new(&msg);

        let encoded = xcoder.encode(&BTreeMap::from([("PCT".to_string(), 52.5)]));
        assert!(encoded.errors.is_empty());
        let decoded = xcoder.decode(&encoded.payload);
        assert_eq!(decoded.signals["PCT"].raw, 250);
        assert_eq!(decoded.signals["PCT"].physical, 52.5);
    }
}
