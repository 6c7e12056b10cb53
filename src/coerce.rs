// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The bank-ledger-rs Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Lenient coercion of untrusted text into ledger values.
//!
//! Snapshot cells and console input pass through these functions
//! before they reach the engine. All three are total: garbage input
//! coerces to a safe default (`0` / `false`) instead of failing, so a
//! half-corrupted snapshot still loads. Validation of the *coerced*
//! value (for example rejecting a zero amount) stays with the engine.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Coerces text to a money amount.
///
/// Trims, then parses a plain decimal literal with a scientific
/// notation fallback. Anything unparseable becomes `Decimal::ZERO`.
pub fn amount(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    trimmed
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Coerces text to a boolean flag.
///
/// True for the tokens `true`, `1`, `yes`, and `y` (case-insensitive,
/// trimmed); false for everything else.
pub fn flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

/// Coerces text to a non-negative count.
///
/// Trims and parses an integer literal, falling back to a decimal
/// parse truncated toward zero. Negative values clamp to `0`, as does
/// anything unparseable or out of range.
pub fn count(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if let Ok(whole) = trimmed.parse::<i64>() {
        return u32::try_from(whole).unwrap_or(0);
    }
    match trimmed
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(trimmed))
    {
        Ok(value) => value.trunc().to_u32().unwrap_or(0),
        Err(_) => 0,
    }
}
