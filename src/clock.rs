//! Wall-clock parsing for the `H:MM AM|PM` times and `YYYY-MM-DD` dates used by event
//! records.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl FromStr for Meridiem {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("AM") {
            Ok(Meridiem::Am)
        } else if s.eq_ignore_ascii_case("PM") {
            Ok(Meridiem::Pm)
        } else {
            Err(())
        }
    }
}

/// Converts an hour on the 12-hour clock to the 24-hour clock.
pub fn to_24_hour(hour: u32, meridiem: Meridiem) -> u32 {
    match (hour, meridiem) {
        (12, Meridiem::Am) => 0,
        (12, Meridiem::Pm) => 12,
        (hour, Meridiem::Pm) => hour + 12,
        (hour, Meridiem::Am) => hour,
    }
}

pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let invalid = || Error::InvalidTime(s.to_string());

    let mut parts = s.split_whitespace();
    let (Some(clock), Some(meridiem), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let meridiem = meridiem.parse::<Meridiem>().map_err(|_| invalid())?;
    let (hour, minute) = clock.split_once(':').ok_or_else(invalid)?;

    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return Err(invalid());
    }

    let hour = hour.parse::<u32>().map_err(|_| invalid())?;
    let minute = minute.parse::<u32>().map_err(|_| invalid())?;

    if !(1..=12).contains(&hour) {
        return Err(invalid());
    }

    NaiveTime::from_hms_opt(to_24_hour(hour, meridiem), minute, 0).ok_or_else(invalid)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn hour_conversion_follows_the_12_hour_clock(
        #[values(1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12)] hour: u32,
        #[values(Meridiem::Am, Meridiem::Pm)] meridiem: Meridiem,
    ) {
        let hour24 = to_24_hour(hour, meridiem);

        assert_eq!(hour24 == 0, hour == 12 && meridiem == Meridiem::Am);
        assert_eq!(hour24 == 12, hour == 12 && meridiem == Meridiem::Pm);
        assert_eq!(hour24 == hour + 12, meridiem == Meridiem::Pm && hour != 12);
        if meridiem == Meridiem::Am && hour != 12 {
            assert_eq!(hour24, hour);
        }
    }

    #[rstest]
    #[case("10:00 AM", 10, 0)]
    #[case("2:00 PM", 14, 0)]
    #[case("12:00 AM", 0, 0)]
    #[case("12:00 PM", 12, 0)]
    #[case("11:59 PM", 23, 59)]
    #[case(" 7:30  pm ", 19, 30)]
    fn parses_12_hour_times(#[case] input: &str, #[case] hour: u32, #[case] minute: u32) {
        let time = parse_time(input).unwrap();
        assert_eq!((time.hour(), time.minute()), (hour, minute));
    }

    #[rstest]
    #[case("")]
    #[case("10:00")]
    #[case("10 AM")]
    #[case("13:00 PM")]
    #[case("0:30 AM")]
    #[case("9:5 AM")]
    #[case("9:60 AM")]
    #[case("10:00 XM")]
    #[case("10:00 AM sharp")]
    fn rejects_malformed_times(#[case] input: &str) {
        assert!(matches!(parse_time(input), Err(Error::InvalidTime(_))));
    }

    #[test]
    fn parses_dates() {
        assert_eq!(
            parse_date("2024-12-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 15).unwrap()
        );
        assert!(matches!(parse_date("15.12.2024"), Err(Error::InvalidDate(_))));
        assert!(matches!(parse_date("2024-02-30"), Err(Error::InvalidDate(_))));
    }
}
