//! Codecs for code carried in console URLs: `code` (URL-safe base64) and
//! `codez` (deflated, base64).

use std::io::Read;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD, URL_SAFE_NO_PAD};
use base64::engine::{DecodePaddingMode, Engine};
use flate2::read::{DeflateDecoder, ZlibDecoder, ZlibEncoder};
use flate2::Compression;

use crate::error::LoadError;

/// URL-safe alphabet that accepts padded and unpadded input alike.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a `code` query value back to source text.
pub fn decode_url_safe(encoded: &str) -> Result<String, LoadError> {
    let bytes = decode_base64_lenient(encoded)?;
    String::from_utf8(bytes).map_err(|e| LoadError::Decode(e.to_string()))
}

/// Encode source text for the `code` query parameter.
pub fn encode_url_safe(text: &str) -> String {
    URL_SAFE_NO_PAD.encode(text.as_bytes())
}

/// Decode a `codez` query value: base64, then inflate.
pub fn decompress_from_base64(encoded: &str) -> Result<String, LoadError> {
    let bytes = decode_base64_lenient(encoded)?;
    if bytes.is_empty() {
        return Ok(String::new());
    }

    let mut text = String::new();
    if looks_like_zlib(&bytes) {
        ZlibDecoder::new(bytes.as_slice()).read_to_string(&mut text)?;
    } else {
        DeflateDecoder::new(bytes.as_slice()).read_to_string(&mut text)?;
    }
    Ok(text)
}

/// Deflate (zlib framing) and base64-encode source text for the `codez` parameter.
pub fn compress_to_base64(text: &str) -> std::io::Result<String> {
    let mut compressed = Vec::new();
    ZlibEncoder::new(text.as_bytes(), Compression::best()).read_to_end(&mut compressed)?;
    Ok(STANDARD.encode(compressed))
}

/// Accepts both alphabets. A space is read back as `+`, since form decoding of
/// the query string turns an unescaped `+` into one.
fn decode_base64_lenient(encoded: &str) -> Result<Vec<u8>, LoadError> {
    let normalized: String = encoded
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .map(|c| match c {
            '+' | ' ' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    LENIENT_URL_SAFE
        .decode(normalized.as_bytes())
        .map_err(|e| LoadError::Decode(e.to_string()))
}

fn looks_like_zlib(bytes: &[u8]) -> bool {
    match bytes {
        [cmf, flg, ..] => cmf & 0x0f == 8 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use std::io::Write;

    #[test]
    fn decodes_unpadded_url_safe_text() {
        let encoded = encode_url_safe("println 'hi?>'");
        assert!(!encoded.contains('='));
        assert_eq!(decode_url_safe(&encoded).unwrap(), "println 'hi?>'");
    }

    #[test]
    fn decodes_standard_alphabet_with_padding() {
        let encoded = STANDARD.encode("def x = [1, 2, 3] // ~~>?");
        assert!(encoded.ends_with('='));
        assert_eq!(decode_url_safe(&encoded).unwrap(), "def x = [1, 2, 3] // ~~>?");
    }

    #[test]
    fn space_is_read_as_plus() {
        let encoded = STANDARD.encode("a>>>?");
        assert!(encoded.contains('+'));
        let mangled = encoded.replace('+', " ");
        assert_eq!(decode_url_safe(&mangled).unwrap(), "a>>>?");
    }

    #[test]
    fn malformed_base64_is_rejected() {
        assert!(matches!(decode_url_safe("!!not base64!!"), Err(LoadError::Decode(_))));
    }

    #[test]
    fn non_utf8_payload_is_rejected() {
        let encoded = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(decode_url_safe(&encoded), Err(LoadError::Decode(_))));
    }

    #[test]
    fn compressed_text_comes_back() {
        let source = "class Greeter {\n    String greet(String n) { \"Hello $n\" }\n}\nprintln new Greeter().greet('world')\n";
        let blob = compress_to_base64(source).unwrap();
        assert_eq!(decompress_from_base64(&blob).unwrap(), source);
    }

    #[test]
    fn raw_deflate_is_accepted() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"println 1 + 1").unwrap();
        let blob = STANDARD.encode(encoder.finish().unwrap());
        assert_eq!(decompress_from_base64(&blob).unwrap(), "println 1 + 1");
    }

    #[test]
    fn garbage_is_not_decompressible() {
        // stored/fixed/dynamic are 0..=2; block type 3 is reserved
        let blob = STANDARD.encode([0x07, 0x00, 0x00, 0x00]);
        assert!(matches!(decompress_from_base64(&blob), Err(LoadError::Decompress(_))));
    }

    #[test]
    fn empty_blob_is_empty_text() {
        assert_eq!(decompress_from_base64("").unwrap(), "");
    }
}
