pub struct FileSizeUtils;

impl FileSizeUtils {
    /// Human-readable size with up to two decimals, trailing zeros trimmed.
    pub fn format_size(size: u64) -> String {
        const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
        if size == 0 {
            return "0 Bytes".to_string();
        }

        let mut value = size as f64;
        let mut unit_index = 0;

        while value >= 1024.0 && unit_index < UNITS.len() - 1 {
            value /= 1024.0;
            unit_index += 1;
        }

        let rounded = format!("{:.2}", value);
        let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
        format!("{} {}", trimmed, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::FileSizeUtils;

    #[test]
    fn formats_sizes() {
        assert_eq!(FileSizeUtils::format_size(0), "0 Bytes");
        assert_eq!(FileSizeUtils::format_size(512), "512 Bytes");
        assert_eq!(FileSizeUtils::format_size(1536), "1.5 KB");
        assert_eq!(FileSizeUtils::format_size(10 * 1024 * 1024), "10 MB");
        assert_eq!(FileSizeUtils::format_size(1_234_567), "1.18 MB");
        assert_eq!(FileSizeUtils::format_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }
}
