//! DOS (FAT-style) packed date/time stamps.
//!
//! The 32-bit layout, from the most significant bit down: years since 1980
//! (7 bits), month (4), day (5), hour (5), minute (6), seconds halved (5).
//! Stamps are derived from the host mtime in local time.

use std::time::{SystemTime, UNIX_EPOCH};

/// Converts a host timestamp into a DOS packed date/time.
pub fn dos_time(t: SystemTime) -> u32 {
    let secs = match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as libc::time_t,
        Err(_) => 0,
    };
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    if unsafe { libc::localtime_r(&secs, &mut tm) }.is_null() {
        return 0;
    }
    pack(
        (tm.tm_year - 80).max(0) as u32,
        (tm.tm_mon + 1) as u32,
        tm.tm_mday as u32,
        tm.tm_hour as u32,
        tm.tm_min as u32,
        tm.tm_sec as u32,
    )
}

fn pack(years_since_1980: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> u32 {
    let mut res = years_since_1980;
    res = (res << 4) | month;
    res = (res << 5) | day;
    res = (res << 5) | hour;
    res = (res << 6) | minute;
    (res << 5) | (second >> 1)
}

#[cfg(test)]
mod tests {
    use super::pack;

    #[test]
    fn test_pack_known_timestamp() {
        // 1989-07-20 14:30:28
        let packed = pack(9, 7, 20, 14, 30, 28);
        assert_eq!(packed, (9 << 25) | (7 << 21) | (20 << 16) | (14 << 11) | (30 << 5) | 14);
    }

    #[test]
    fn test_pack_epoch_of_dos_era() {
        // 1980-01-01 00:00:00 packs the minimal calendar fields
        assert_eq!(pack(0, 1, 1, 0, 0, 0), (1 << 21) | (1 << 16));
    }

    #[test]
    fn test_pack_seconds_are_halved() {
        assert_eq!(pack(0, 1, 1, 0, 0, 59) & 0x1F, 29);
    }
}
