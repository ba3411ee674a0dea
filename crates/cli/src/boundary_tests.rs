// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn truncation_caps_long_detail() {
    let long = "x".repeat(1000);
    assert_eq!(truncated(&long).len(), UNEXPECTED_DETAIL_LIMIT);
}

#[test]
fn short_detail_is_untouched() {
    assert_eq!(truncated("boom"), "boom");
}

#[test]
fn truncation_respects_char_boundaries() {
    let long = "é".repeat(1000);
    let cut = truncated(&long);
    assert_eq!(cut.chars().count(), UNEXPECTED_DETAIL_LIMIT);
}
