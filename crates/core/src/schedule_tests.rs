// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    all_wildcards = { "* * * * *" },
    literals = { "0 12 1 6 0" },
    enumerations = { "0,15,30,45 0,12 1,15 1,6 0,6" },
    ranges = { "10-20 8-18 1-15 1-6 1-5" },
    wildcard_step = { "*/5 */2 */10 */3 */2" },
    range_step = { "10-50/5 8-18/2 1-28/7 1-12/3 0-6/2" },
    max_values = { "59 23 31 12 6" },
)]
fn accepts_valid_schedules(schedule: &str) {
    assert!(validate_schedule(schedule).is_ok());
}

// Month 0 is admitted; the grammar is kept verbatim even though standard
// cron months start at 1.
#[test]
fn accepts_month_zero() {
    assert!(validate_schedule("0 0 1 0 0").is_ok());
}

#[parameterized(
    four_fields = { "* * * *" },
    six_fields = { "* * * * * *" },
    minute_out_of_range = { "60 * * * *" },
    hour_out_of_range = { "* 24 * * *" },
    day_out_of_range = { "* * 32 * *" },
    month_out_of_range = { "* * * 13 *" },
    weekday_out_of_range = { "* * * * 7" },
    alphabetic = { "a * * * *" },
    empty_field = { " * * * *" },
)]
fn rejects_invalid_schedules(schedule: &str) {
    let err = validate_schedule(schedule).unwrap_err();
    assert!(matches!(err, Error::Value(_)), "got {err:?}");
}

#[test]
fn error_mentions_offending_field() {
    let err = validate_schedule("* * * * 9").unwrap_err();
    assert!(err.to_string().contains("weekday"));
}
