//! Raw byte dumps for diagnostic output
//!
//! Renders 24-byte rows with an offset column and an ASCII gutter, the same
//! shape the vendor tool printed to stderr.

/// Log a hex dump of `bytes` at debug level under the given label.
pub fn debug_dump(label: &str, bytes: &[u8]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    log::debug!("{} ({} bytes):", label, bytes.len());
    for (row_idx, row) in bytes.chunks(24).enumerate() {
        let hex: Vec<String> = row.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = row
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        log::debug!("{:04x}: {:<71} {}", row_idx * 24, hex.join(" "), ascii);
    }
}
