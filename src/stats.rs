use std::io::{stdout, Write};

use crate::keyspace::key_hex;

pub fn format_num(n: u64) -> String {
    let s = n.to_string();
    let mut r = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            r.push(',');
        }
        r.push(c);
    }
    r.chars().rev().collect()
}

pub fn format_speed(s: f64) -> String {
    if s < 1_000.0 {
        format!("{:.0}/s", s)
    } else if s < 1_000_000.0 {
        format!("{:.1}K/s", s / 1_000.0)
    } else {
        format!("{:.2}M/s", s / 1_000_000.0)
    }
}

pub fn format_time(s: f64) -> String {
    if s < 60.0 {
        format!("{:.0}s", s)
    } else if s < 3600.0 {
        format!("{:.0}m{:.0}s", s / 60.0, s % 60.0)
    } else {
        format!("{:.0}h{:.0}m", s / 3600.0, (s % 3600.0) / 60.0)
    }
}

/// One overwritable status line. Observational only.
pub fn status_line(total: u64, rate: f64, cursor: u128, last_saved: Option<&str>) -> String {
    format!(
        "Keys: {} | Rate: {} | Current: {}... | Last saved: {}",
        format_num(total),
        format_speed(rate),
        &key_hex(cursor)[..16],
        last_saved.unwrap_or("never"),
    )
}

pub fn print_status(total: u64, rate: f64, cursor: u128, last_saved: Option<&str>) {
    print!("\r{}    ", status_line(total, rate, cursor, last_saved));
    stdout().flush().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_num() {
        assert_eq!(format_num(0), "0");
        assert_eq!(format_num(999), "999");
        assert_eq!(format_num(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_speed_tiers() {
        assert_eq!(format_speed(500.0), "500/s");
        assert_eq!(format_speed(2_500.0), "2.5K/s");
        assert_eq!(format_speed(3_200_000.0), "3.20M/s");
    }

    #[test]
    fn test_status_line_truncates_cursor() {
        let line = status_line(1_000, 250.0, u128::MAX, Some("14:32:11"));
        assert!(line.contains("Keys: 1,000"));
        assert!(line.contains("0000000000000000..."));
        assert!(line.contains("14:32:11"));
    }
}
