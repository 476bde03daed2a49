//! Water mask serialization.
//!
//! Two encodings are supported for the packaged mask asset.
//!
//! # JSON
//!
//! Convenient for hand-authored fixtures and GIS exports. Geometry fields sit
//! at the top level together with exactly one of `cells` (array of booleans,
//! row-major, north row first) or `bitmap` (base64 of the packed bitmap).
//!
//! ```json
//! {"north": 10.0, "west": 0.0, "resolution": 1.0, "rows": 2, "cols": 2,
//!  "cells": [true, false, true, true]}
//! ```
//!
//! # Binary
//!
//! ```text
//! Header (16 bytes):
//!   - Magic: b"SRWM" (4 bytes)
//!   - Version: u8 (1 byte)
//!   - Flags: u8 (1 byte) - bit 0: wraps longitude
//!   - Rows: u32 LE (4 bytes)
//!   - Cols: u32 LE (4 bytes)
//!   - Reserved: 2 bytes
//!
//! Body:
//!   - postcard-serialized geometry + packed bitmap
//!   - zstd compressed
//!
//! Footer (32 bytes):
//!   - SHA-256 checksum of compressed body
//! ```
//!
//! Bitmaps are packed row-major, least significant bit first.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::grid::{GridGeometry, WaterGrid};

/// Magic bytes identifying a binary water mask.
pub const MASK_MAGIC: &[u8; 4] = b"SRWM";

/// Current binary format version.
const MASK_VERSION: u8 = 1;

/// Flag: grid spans the full longitude circle.
const FLAG_WRAPS_LONGITUDE: u8 = 0x01;

const HEADER_SIZE: usize = 16;

/// SHA-256 digest length.
const CHECKSUM_SIZE: usize = 32;

/// zstd compression level (balanced speed/ratio).
const COMPRESSION_LEVEL: i32 = 3;

/// On-disk encoding of a water mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskFormat {
    #[default]
    Binary,
    Json,
}

impl MaskFormat {
    /// Guess the format from a file extension; anything but `.json` is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => MaskFormat::Json,
            _ => MaskFormat::Binary,
        }
    }
}

impl FromStr for MaskFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bin" | "binary" => Ok(MaskFormat::Binary),
            "json" => Ok(MaskFormat::Json),
            other => Err(format!("unknown mask format '{other}'")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonMask {
    #[serde(flatten)]
    geometry: GridGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cells: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bitmap: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BinaryBody {
    geometry: GridGeometry,
    bitmap: Vec<u8>,
}

/// Decode a mask, detecting binary vs JSON from the leading bytes.
pub fn decode_mask(bytes: &[u8]) -> Result<WaterGrid> {
    if bytes.starts_with(MASK_MAGIC) {
        decode_binary(bytes)
    } else {
        decode_json(bytes)
    }
}

/// Encode a grid in the requested format.
pub fn encode_mask(grid: &WaterGrid, format: MaskFormat) -> Result<Vec<u8>> {
    match format {
        MaskFormat::Binary => encode_binary(grid),
        MaskFormat::Json => encode_json(grid),
    }
}

/// Read and decode a mask file synchronously.
pub fn load_mask_file(path: &Path) -> Result<WaterGrid> {
    debug!(path = %path.display(), "loading water mask");
    if !path.exists() {
        return Err(Error::MaskNotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path)?;
    let grid = decode_mask(&bytes)?;
    info!(
        path = %path.display(),
        rows = grid.rows(),
        cols = grid.cols(),
        water_cells = grid.water_count(),
        "loaded water mask"
    );
    Ok(grid)
}

/// Encode and write a mask file.
pub fn save_mask_file(grid: &WaterGrid, path: &Path, format: MaskFormat) -> Result<()> {
    let bytes = encode_mask(grid, format)?;
    fs::write(path, &bytes)?;
    info!(
        path = %path.display(),
        format = ?format,
        file_size = bytes.len(),
        "water mask saved"
    );
    Ok(())
}

pub fn decode_json(bytes: &[u8]) -> Result<WaterGrid> {
    let mask: JsonMask = serde_json::from_slice(bytes)
        .map_err(|e| Error::decode(format!("JSON mask: {e}")))?;
    let count = mask.geometry.cell_count();

    let cells = match (mask.cells, mask.bitmap) {
        (Some(cells), None) => cells,
        (None, Some(encoded)) => {
            let packed = BASE64
                .decode(encoded.trim())
                .map_err(|e| Error::decode(format!("bitmap is not valid base64: {e}")))?;
            unpack_bits(&packed, count)?
        }
        (Some(_), Some(_)) => {
            return Err(Error::invalid(
                "mask must carry either 'cells' or 'bitmap', not both",
            ))
        }
        (None, None) => return Err(Error::invalid("mask is missing 'cells' or 'bitmap'")),
    };

    WaterGrid::new(mask.geometry, cells)
}

pub fn encode_json(grid: &WaterGrid) -> Result<Vec<u8>> {
    let mask = JsonMask {
        geometry: *grid.geometry(),
        cells: None,
        bitmap: Some(BASE64.encode(pack_bits(grid.cells()))),
    };
    Ok(serde_json::to_vec(&mask)?)
}

pub fn encode_binary(grid: &WaterGrid) -> Result<Vec<u8>> {
    let body = BinaryBody {
        geometry: *grid.geometry(),
        bitmap: pack_bits(grid.cells()),
    };

    let serialized = postcard::to_allocvec(&body).map_err(|e| Error::MaskEncode {
        message: format!("postcard serialization failed: {e}"),
    })?;
    let compressed = zstd::encode_all(serialized.as_slice(), COMPRESSION_LEVEL).map_err(|e| {
        Error::MaskEncode {
            message: format!("zstd compression failed: {e}"),
        }
    })?;
    let checksum = Sha256::digest(&compressed);

    let flags = if grid.wraps_longitude() {
        FLAG_WRAPS_LONGITUDE
    } else {
        0
    };
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(MASK_MAGIC);
    header[4] = MASK_VERSION;
    header[5] = flags;
    header[6..10].copy_from_slice(&grid.rows().to_le_bytes());
    header[10..14].copy_from_slice(&grid.cols().to_le_bytes());
    // bytes 14-15 reserved

    let mut out = Vec::with_capacity(HEADER_SIZE + compressed.len() + CHECKSUM_SIZE);
    out.extend_from_slice(&header);
    out.extend_from_slice(&compressed);
    out.extend_from_slice(&checksum);
    Ok(out)
}

pub fn decode_binary(bytes: &[u8]) -> Result<WaterGrid> {
    if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(Error::decode(format!(
            "binary mask truncated ({} bytes)",
            bytes.len()
        )));
    }

    let (header, rest) = bytes.split_at(HEADER_SIZE);
    if &header[0..4] != MASK_MAGIC {
        return Err(Error::decode("invalid magic bytes"));
    }
    let version = header[4];
    if version != MASK_VERSION {
        return Err(Error::UnsupportedMaskVersion {
            found: version,
            expected: MASK_VERSION,
        });
    }
    let rows = read_u32(&header[6..10]);
    let cols = read_u32(&header[10..14]);

    let (compressed, stored_checksum) = rest.split_at(rest.len() - CHECKSUM_SIZE);
    let computed = Sha256::digest(compressed);
    if computed.as_slice() != stored_checksum {
        return Err(Error::MaskChecksum);
    }

    let decompressed = zstd::decode_all(compressed)
        .map_err(|e| Error::decode(format!("zstd decompression failed: {e}")))?;
    let body: BinaryBody = postcard::from_bytes(&decompressed)
        .map_err(|e| Error::decode(format!("postcard deserialization failed: {e}")))?;

    if body.geometry.rows != rows || body.geometry.cols != cols {
        return Err(Error::invalid(format!(
            "header says {rows}x{cols} but body says {}x{}",
            body.geometry.rows, body.geometry.cols
        )));
    }

    let cells = unpack_bits(&body.bitmap, body.geometry.cell_count())?;
    WaterGrid::new(body.geometry, cells)
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

/// Pack flags into bytes, least significant bit first.
pub fn pack_bits(cells: &[bool]) -> Vec<u8> {
    let mut packed = vec![0u8; cells.len().div_ceil(8)];
    for (i, &water) in cells.iter().enumerate() {
        if water {
            packed[i / 8] |= 1 << (i % 8);
        }
    }
    packed
}

/// Unpack `count` flags; the byte length must match exactly.
pub fn unpack_bits(packed: &[u8], count: usize) -> Result<Vec<bool>> {
    let expected = count.div_ceil(8);
    if packed.len() != expected {
        return Err(Error::invalid(format!(
            "dimension mismatch: bitmap has {} bytes, expected {expected} for {count} cells",
            packed.len()
        )));
    }
    Ok((0..count)
        .map(|i| packed[i / 8] & (1 << (i % 8)) != 0)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> WaterGrid {
        WaterGrid::from_ascii(5.0, -3.0, 0.5, "~~#~~\n~###~\n~~~~~").unwrap()
    }

    #[test]
    fn binary_encoding_preserves_grid() {
        let grid = sample_grid();
        let bytes = encode_binary(&grid).unwrap();
        assert_eq!(&bytes[0..4], MASK_MAGIC);
        assert_eq!(decode_mask(&bytes).unwrap(), grid);
    }

    #[test]
    fn json_encoding_uses_bitmap() {
        let grid = sample_grid();
        let bytes = encode_json(&grid).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"bitmap\""));
        assert_eq!(decode_mask(&bytes).unwrap(), grid);
    }

    #[test]
    fn corrupted_body_fails_checksum() {
        let mut bytes = encode_binary(&sample_grid()).unwrap();
        bytes[HEADER_SIZE] ^= 0xFF;
        assert!(matches!(decode_mask(&bytes), Err(Error::MaskChecksum)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = encode_binary(&sample_grid()).unwrap();
        bytes[4] = 9;
        assert!(matches!(
            decode_mask(&bytes),
            Err(Error::UnsupportedMaskVersion { found: 9, .. })
        ));
    }

    #[test]
    fn header_body_disagreement_is_invalid() {
        let mut bytes = encode_binary(&sample_grid()).unwrap();
        bytes[6] = 7;
        let err = decode_mask(&bytes).unwrap_err();
        assert!(matches!(err, Error::InvalidMask { .. }), "{err}");
    }

    #[test]
    fn json_missing_metadata_is_decode_error() {
        let err = decode_mask(br#"{"north": 1.0, "west": 0.0, "rows": 1, "cols": 1, "cells": [true]}"#)
            .unwrap_err();
        assert!(err.to_string().contains("resolution"), "{err}");
    }

    #[test]
    fn json_dimension_mismatch_is_invalid() {
        let err = decode_mask(
            br#"{"north": 1.0, "west": 0.0, "resolution": 1.0, "rows": 2, "cols": 2, "cells": [true, true, false]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"), "{err}");
    }

    #[test]
    fn json_requires_exactly_one_payload() {
        let err = decode_mask(br#"{"north": 1.0, "west": 0.0, "resolution": 1.0, "rows": 1, "cols": 1}"#)
            .unwrap_err();
        assert!(err.to_string().contains("missing"), "{err}");
    }

    #[test]
    fn pack_bits_is_lsb_first() {
        let packed = pack_bits(&[true, false, false, false, false, false, false, false, true]);
        assert_eq!(packed, vec![0b0000_0001, 0b0000_0001]);
        assert!(unpack_bits(&packed, 16).is_err());
    }

    #[test]
    fn format_from_path_and_str() {
        assert_eq!(MaskFormat::from_path(Path::new("a/b.JSON")), MaskFormat::Json);
        assert_eq!(MaskFormat::from_path(Path::new("a/b.bin")), MaskFormat::Binary);
        assert_eq!("json".parse::<MaskFormat>(), Ok(MaskFormat::Json));
        assert!("png".parse::<MaskFormat>().is_err());
    }
}
