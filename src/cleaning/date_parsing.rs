use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DAY_FIRST_DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const DAY_FIRST_DATETIME_FORMATS: [&str; 6] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];
const ISO_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses station date text, day first.
///
/// The station exports write `dd/mm/yyyy`; records that went through the importer
/// come back as ISO datetimes, so those are accepted too. Four-digit years only:
/// a two-digit year is ambiguous and is rejected.
pub fn parse_day_first(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DAY_FIRST_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DAY_FIRST_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
        .or_else(|| {
            ISO_DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
        .filter(|date| four_digit_year(text, date))
}

// chrono's %Y accepts "21" as year 21; the exports always spell the year out.
fn four_digit_year(text: &str, date: &NaiveDate) -> bool {
    use chrono::Datelike;
    (1000..=9999).contains(&date.year()) && text.contains(&format!("{:04}", date.year()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_first_formats() {
        assert_eq!(parse_day_first("15/07/2021"), Some(date(2021, 7, 15)));
        assert_eq!(parse_day_first("01-02-2019"), Some(date(2019, 2, 1)));
        assert_eq!(parse_day_first("03.04.2020"), Some(date(2020, 4, 3)));
        assert_eq!(parse_day_first(" 03/04/2020 "), Some(date(2020, 4, 3)));
    }

    #[test]
    fn test_ambiguous_dates_are_read_day_first() {
        // 02/03 is the 2nd of March, never February 3rd.
        assert_eq!(parse_day_first("02/03/2022"), Some(date(2022, 3, 2)));
    }

    #[test]
    fn test_datetime_text() {
        assert_eq!(parse_day_first("15/07/2021 00:00"), Some(date(2021, 7, 15)));
        assert_eq!(
            parse_day_first("2021-07-15T00:00:00"),
            Some(date(2021, 7, 15))
        );
        assert_eq!(
            parse_day_first("2021-07-15 00:00:00"),
            Some(date(2021, 7, 15))
        );
        assert_eq!(
            parse_day_first("2021-07-15T00:00:00+00:00"),
            Some(date(2021, 7, 15))
        );
        assert_eq!(parse_day_first("2021-07-15"), Some(date(2021, 7, 15)));
    }

    #[test]
    fn test_unparsable_dates() {
        assert_eq!(parse_day_first(""), None);
        assert_eq!(parse_day_first("NULO"), None);
        assert_eq!(parse_day_first("31/02/2021"), None);
        assert_eq!(parse_day_first("15/13/2021"), None);
        assert_eq!(parse_day_first("15/07/21"), None);
        assert_eq!(parse_day_first("yesterday"), None);
    }
}
