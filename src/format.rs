//! Human-readable sizes and timestamps used in logs and chapter listings

/// Format a byte count with binary units, one decimal above bytes
pub fn pretty_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;
    const TIB: u64 = GIB * 1024;

    if bytes < KIB {
        format!("{}B", bytes)
    } else if bytes < MIB {
        format!("{:.1}KiB", bytes as f64 / KIB as f64)
    } else if bytes < GIB {
        format!("{:.1}MiB", bytes as f64 / MIB as f64)
    } else if bytes < TIB {
        format!("{:.1}GiB", bytes as f64 / GIB as f64)
    } else {
        format!("{:.1}TiB", bytes as f64 / TIB as f64)
    }
}

/// Format seconds as `HH:MM:SS`; fractions are truncated and hours never wrap
pub fn pretty_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total / 60) % 60;
    let secs = total % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_bytes_units() {
        assert_eq!(pretty_bytes(0), "0B");
        assert_eq!(pretty_bytes(1023), "1023B");
        assert_eq!(pretty_bytes(1536), "1.5KiB");
        assert_eq!(pretty_bytes(5 * 1024 * 1024), "5.0MiB");
        assert_eq!(pretty_bytes(2_000_000_000), "1.9GiB");
        assert_eq!(pretty_bytes(3 * 1024u64.pow(4)), "3.0TiB");
    }

    #[test]
    fn test_pretty_time() {
        assert_eq!(pretty_time(0.0), "00:00:00");
        assert_eq!(pretty_time(59.99), "00:00:59");
        assert_eq!(pretty_time(3725.4), "01:02:05");
        assert_eq!(pretty_time(100.0 * 3600.0), "100:00:00");
        assert_eq!(pretty_time(-3.0), "00:00:00");
    }
}
