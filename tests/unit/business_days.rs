//! Business-day arithmetic and date input validation

use test_log::test;
use pretty_assertions::assert_eq;
use assert_matches::assert_matches;
use chrono::NaiveDate;
use chrono_tz::America::New_York;
use intraday_landmarks::utils::{
    parse_trade_date, previous_business_day, to_exchange_local, validate_date_input, InputError,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_previous_business_day_across_the_week() {
    // Monday goes back to Friday
    assert_eq!(previous_business_day(date(2024, 6, 10)), date(2024, 6, 7));
    // Tuesday through Friday go back one day
    assert_eq!(previous_business_day(date(2024, 6, 11)), date(2024, 6, 10));
    assert_eq!(previous_business_day(date(2024, 6, 14)), date(2024, 6, 13));
    // Weekend days resolve to Friday
    assert_eq!(previous_business_day(date(2024, 6, 15)), date(2024, 6, 14));
    assert_eq!(previous_business_day(date(2024, 6, 16)), date(2024, 6, 14));
}

#[test]
fn test_previous_business_day_crosses_year_boundary() {
    // 2024-01-01 is a Monday
    assert_eq!(previous_business_day(date(2024, 1, 1)), date(2023, 12, 29));
}

#[test]
fn test_exchange_local_time_follows_dst() {
    let summer = to_exchange_local(1_718_026_200_000, &New_York).unwrap();
    assert_eq!(summer, date(2024, 6, 10).and_hms_opt(9, 30, 0).unwrap());

    let winter = to_exchange_local(1_704_897_000_000, &New_York).unwrap();
    assert_eq!(winter, date(2024, 1, 10).and_hms_opt(9, 30, 0).unwrap());
}

#[test]
fn test_date_input_validation() {
    let parsed = validate_date_input("2024-06-10", 2024).unwrap();
    assert_eq!((parsed.year, parsed.month, parsed.day), (2024, 6, 10));

    assert_matches!(validate_date_input("2024-6-10", 2024), Err(InputError::InvalidDate(_)));
    assert_matches!(validate_date_input("2024-13-01", 2024), Err(InputError::InvalidDate(_)));
    assert_matches!(validate_date_input("2030-01-01", 2024), Err(InputError::InvalidDate(_)));
    assert_matches!(validate_date_input("abcd-ef-gh", 2024), Err(InputError::InvalidDate(_)));
}

#[test]
fn test_impossible_calendar_date_passes_bounds_but_not_parsing() {
    assert!(validate_date_input("2024-02-31", 2024).is_ok());
    assert_matches!(parse_trade_date("2024-02-31", 2024), Err(InputError::InvalidDate(_)));
    assert_eq!(parse_trade_date("2024-02-29", 2024), Ok(date(2024, 2, 29)));
}
