//! Pixel-map decoder for the text (`P3`) and binary (`P6`) RGB encodings.
//!
//! Both produce RGBA8 with alpha fixed at 255, rows in the order the source
//! stores them.

use crate::{
    error::{AssetError, AssetResult},
    texture::TextureData,
};

/// The two supported encodings, chosen from the 2-byte magic.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PpmEncoding {
    /// `P3`: decimal channel tokens.
    Ascii,
    /// `P6`: textual header followed by raw RGB bytes.
    Binary,
}

impl PpmEncoding {
    pub fn detect(raw: &[u8]) -> AssetResult<Self> {
        match raw.get(..2) {
            Some(b"P3") => Ok(PpmEncoding::Ascii),
            Some(b"P6") => Ok(PpmEncoding::Binary),
            _ => Err(AssetError::UnsupportedFormat {
                magic: String::from_utf8_lossy(&raw[..raw.len().min(2)]).into_owned(),
            }),
        }
    }
}

/// Decode a pixel map held in memory.
pub fn decode(raw: &[u8]) -> AssetResult<TextureData> {
    let encoding = PpmEncoding::detect(raw)?;
    let texture = match encoding {
        PpmEncoding::Ascii => decode_ascii(raw)?,
        PpmEncoding::Binary => decode_binary(raw)?,
    };

    log::debug!(
        "Decoded {:?} pixel map {}x{} (max value {})",
        encoding,
        texture.width,
        texture.height,
        texture.max_value
    );
    Ok(texture)
}

/// Decode a text pixel map.
pub fn decode_str(text: &str) -> AssetResult<TextureData> {
    decode(text.as_bytes())
}

fn decode_ascii(raw: &[u8]) -> AssetResult<TextureData> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| AssetError::parse(1, format!("Pixel map is not valid UTF-8: {e}")))?;

    // Tokens are separated by whitespace or commas; `#` starts a comment.
    let mut tokens: Vec<(usize, &str)> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = if line_no == 0 { &line[2..] } else { line };
        let content = line.split('#').next().unwrap_or_default();
        tokens.extend(
            content
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .map(|t| (line_no + 1, t)),
        );
    }

    let last_line = text.lines().count().max(1);
    let mut iter = tokens.into_iter();
    let width = header_value(iter.next(), last_line, "width")?;
    let height = header_value(iter.next(), last_line, "height")?;
    let max_value = header_value(iter.next(), last_line, "max value")?;
    check_max_value(max_value);

    let expected = channel_count(width, height)?;
    let available = iter.len();
    if available < expected {
        return Err(AssetError::parse(
            last_line,
            format!("Expected {} channel values, found {}", expected, available),
        ));
    }

    let mut rgb = Vec::with_capacity(expected);
    for (line_no, token) in iter.by_ref().take(expected) {
        let value = token.parse::<u8>().map_err(|_| {
            AssetError::parse(line_no, format!("Invalid channel value '{}'", token))
        })?;
        rgb.push(value);
    }
    let extra = iter.count();
    if extra > 0 {
        log::warn!("Ignoring {} trailing channel values", extra);
    }

    Ok(TextureData::from_rgb(width, height, max_value, &rgb))
}

fn decode_binary(raw: &[u8]) -> AssetResult<TextureData> {
    let mut pos = 2;
    let width = binary_header_value(raw, &mut pos, "width")?;
    let height = binary_header_value(raw, &mut pos, "height")?;
    let max_value = binary_header_value(raw, &mut pos, "max value")?;
    check_max_value(max_value);

    // A single whitespace byte separates the header from the samples.
    match raw.get(pos) {
        Some(b) if b.is_ascii_whitespace() => pos += 1,
        _ => {
            return Err(AssetError::parse(
                line_at(raw, pos),
                "Expected whitespace after max value",
            ));
        }
    }

    let expected = channel_count(width, height)?;
    let data = &raw[pos..];
    if data.len() < expected {
        return Err(AssetError::parse(
            line_at(raw, raw.len()),
            format!("Expected {} bytes of pixel data, found {}", expected, data.len()),
        ));
    }
    if data.len() > expected {
        log::warn!("Ignoring {} trailing bytes", data.len() - expected);
    }

    Ok(TextureData::from_rgb(width, height, max_value, &data[..expected]))
}

fn header_value(token: Option<(usize, &str)>, last_line: usize, what: &str) -> AssetResult<u32> {
    let (line_no, token) =
        token.ok_or_else(|| AssetError::parse(last_line, format!("Missing {}", what)))?;
    token
        .parse::<u32>()
        .map_err(|_| AssetError::parse(line_no, format!("Invalid {} '{}'", what, token)))
}

fn binary_header_value(raw: &[u8], pos: &mut usize, what: &str) -> AssetResult<u32> {
    loop {
        match raw.get(*pos) {
            Some(b'#') => {
                while let Some(&b) = raw.get(*pos) {
                    *pos += 1;
                    if b == b'\n' {
                        break;
                    }
                }
            }
            Some(b) if b.is_ascii_whitespace() => *pos += 1,
            _ => break,
        }
    }

    let start = *pos;
    while raw.get(*pos).is_some_and(u8::is_ascii_digit) {
        *pos += 1;
    }
    if start == *pos {
        return Err(AssetError::parse(
            line_at(raw, start),
            format!("Missing {}", what),
        ));
    }

    // Digits only, so the slice is ASCII.
    let digits = std::str::from_utf8(&raw[start..*pos]).unwrap_or_default();
    digits
        .parse::<u32>()
        .map_err(|_| AssetError::parse(line_at(raw, start), format!("Invalid {} '{}'", what, digits)))
}

fn channel_count(width: u32, height: u32) -> AssetResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| AssetError::parse(1, format!("Image too large: {}x{}", width, height)))
}

fn check_max_value(max_value: u32) {
    if max_value > 255 {
        log::warn!(
            "Max value {} exceeds 8 bits; samples are still read as single bytes",
            max_value
        );
    }
}

fn line_at(raw: &[u8], pos: usize) -> usize {
    raw[..pos.min(raw.len())].iter().filter(|&&b| b == b'\n').count() + 1
}
