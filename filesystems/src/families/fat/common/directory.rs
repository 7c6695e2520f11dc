// Short (8.3) name handling for directory entries

use vfat_core::VfatError;

use super::constants::{EXT_LEN, LABEL_LEN, NAME_LEN};

/// Format a base name to the 8-byte, space-padded on-disk form.
pub fn format_base_name(name: &str) -> Result<[u8; NAME_LEN], VfatError> {
    pad_component(name).ok_or_else(|| VfatError::InvalidName(name.to_string()))
}

/// Format an extension to the 3-byte, space-padded on-disk form.
pub fn format_extension(ext: &str) -> Result<[u8; EXT_LEN], VfatError> {
    pad_component(ext).ok_or_else(|| VfatError::InvalidExtension(ext.to_string()))
}

fn pad_component<const N: usize>(component: &str) -> Option<[u8; N]> {
    let upper = component.to_uppercase();
    if upper.is_empty() || upper.len() > N {
        return None;
    }

    let mut result = [b' '; N];
    for (i, byte) in upper.bytes().enumerate() {
        if !is_valid_83_char(byte) {
            return None;
        }
        result[i] = byte;
    }
    Some(result)
}

/// Convert a string to FAT volume label format (11 bytes, space-padded)
pub fn format_volume_label(label: &str) -> [u8; LABEL_LEN] {
    let mut result = [b' '; LABEL_LEN];

    let label = label.trim().to_uppercase();
    if label.is_empty() {
        result[..7].copy_from_slice(b"NO NAME");
        return result;
    }

    let bytes = label.as_bytes();
    let len = bytes.len().min(LABEL_LEN);
    result[..len].copy_from_slice(&bytes[..len]);
    result
}

/// Render an on-disk name and extension as `NAME.EXT`.
pub fn parse_83_name(name: &[u8], ext: &[u8]) -> String {
    let base: String = name
        .iter()
        .take_while(|&&b| b != b' ' && b != 0)
        .map(|&b| b as char)
        .collect();
    let ext: String = ext
        .iter()
        .take_while(|&&b| b != b' ' && b != 0)
        .map(|&b| b as char)
        .collect();

    if ext.is_empty() {
        base
    } else {
        format!("{}.{}", base, ext)
    }
}

/// Check if a character is valid for 8.3 filenames
fn is_valid_83_char(c: u8) -> bool {
    matches!(
        c,
        b'A'..=b'Z' | b'0'..=b'9' | b'!' | b'#' | b'$' | b'%' | b'&' |
        b'\'' | b'(' | b')' | b'-' | b'@' | b'^' | b'_' | b'`' |
        b'{' | b'}' | b'~'
    )
}
