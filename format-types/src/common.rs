//! Size formatting helpers

use num_format::{Locale, ToFormattedString};

/// Decimal gigabytes with one fractional digit (e.g. "16.0 GB").
///
/// This matches what drive vendors print on the packaging, so it is the
/// figure shown next to a device name.
pub fn decimal_gigabytes(bytes: u64) -> String {
    let gb = bytes as f64 / 1_000_000_000.0;
    format!("{gb:.1} GB")
}

/// Convert bytes to binary human-readable format (e.g., "14.90 GB")
pub fn bytes_to_pretty(bytes: &u64, add_bytes: bool) -> String {
    let mut steps = 0;
    let mut val: f64 = *bytes as f64;

    while val > 1024. && steps <= 8 {
        val /= 1024.;
        steps += 1;
    }

    let unit = match steps {
        0 => "B",
        1 => "KB",
        2 => "MB",
        3 => "GB",
        4 => "TB",
        5 => "PB",
        6 => "EB",
        7 => "ZB",
        8 => "YB",
        _ => "Not Supported",
    };

    if add_bytes {
        let bytes_str = bytes.to_formatted_string(&Locale::en);
        format!("{:.2} {} ({} bytes)", val, unit, bytes_str)
    } else {
        format!("{:.2} {}", val, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_gigabytes_rounds_to_one_digit() {
        assert_eq!(decimal_gigabytes(16_000_000_000), "16.0 GB");
        assert_eq!(decimal_gigabytes(31_914_983_424), "31.9 GB");
        assert_eq!(decimal_gigabytes(0), "0.0 GB");
    }

    #[test]
    fn pretty_bytes_uses_binary_units_and_separators() {
        assert_eq!(bytes_to_pretty(&512, false), "512.00 B");
        assert_eq!(
            bytes_to_pretty(&16_000_000_000, true),
            "14.90 GB (16,000,000,000 bytes)"
        );
    }
}
