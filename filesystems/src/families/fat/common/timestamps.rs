// MS-DOS date/time encoding for directory entries

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Encode a timestamp as FAT `(date, time)`.
///
/// FAT date: bits 15-9 year since 1980, bits 8-5 month, bits 4-0 day.
/// FAT time: bits 15-11 hours, bits 10-5 minutes, bits 4-0 seconds/2.
/// Years outside 1980-2107 are clamped.
pub fn to_fat_datetime(datetime: &NaiveDateTime) -> (u16, u16) {
    let fat_year = datetime.year().clamp(1980, 2107) - 1980;

    let fat_date = ((fat_year as u16) << 9)
        | ((datetime.month() as u16) << 5)
        | (datetime.day() as u16);
    let fat_time = ((datetime.hour() as u16) << 11)
        | ((datetime.minute() as u16) << 5)
        | ((datetime.second() / 2) as u16);

    (fat_date, fat_time)
}
