// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation of five-field cron schedules.
//!
//! Each field accepts `*`, a literal, `a,b,c`, `a-b` and `*/n` / `a-b/n`
//! step forms. The month field admits `0`; this deviation from standard
//! cron is kept on purpose.

use crate::error::Error;
use regex::Regex;
use std::sync::LazyLock;

fn compile(pattern: &str) -> Regex {
    #[allow(clippy::expect_used)]
    Regex::new(pattern).expect("static cron pattern compiles")
}

static MINUTE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^([1-5]?[0-9](,|$))+|^(\*|[1-5]?[0-9]-[1-5]?[0-9])(/[1-5]?[0-9]$|$)")
});
static HOUR: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^((2[0-3]|1?[0-9])(,|$))+|^(\*|(2[0-3]|1?[0-9])-(2[0-3]|1?[0-9]))(/(2[0-3]|1?[0-9])$|$)")
});
static DAY: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^((3[0-1]|[1-2]?[0-9])(,|$))+|^(\*|(3[0-1]|[1-2]?[0-9])-(3[0-1]|[1-2]?[0-9]))(/(3[0-1]|[1-2]?[0-9])$|$)",
    )
});
static MONTH: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^((1[0-2]|[0-9])(,|$))+|^(\*|(1[0-2]|[0-9])-(1[0-2]|[0-9]))(/(1[0-2]|[0-9])$|$)")
});
static WEEKDAY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^([0-6](,|$))+|^(\*|[0-6]-[0-6])(/[0-6]$|$)"));

/// True when the regex consumes the whole field.
fn full_match(re: &Regex, field: &str) -> bool {
    re.find(field)
        .is_some_and(|m| m.start() == 0 && m.end() == field.len())
}

/// Validate a cron schedule expression.
///
/// Returns the schedule unchanged so callers can validate-and-forward.
pub fn validate_schedule(schedule: &str) -> Result<(), Error> {
    let fields: Vec<&str> = schedule.split(' ').collect();
    if fields.len() != 5 {
        return Err(Error::Value(format!(
            "incorrect cron schedule {schedule:?}: must have 5 schedule fields"
        )));
    }

    let checks: [(&LazyLock<Regex>, &str); 5] = [
        (&MINUTE, "minute"),
        (&HOUR, "hour"),
        (&DAY, "day"),
        (&MONTH, "month"),
        (&WEEKDAY, "weekday"),
    ];

    for ((re, what), field) in checks.iter().zip(&fields) {
        if !full_match(re, field) {
            return Err(Error::Value(format!(
                "incorrect cron schedule {schedule:?}: bad {what} pattern {field:?}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
