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

//! A single balance cell.
//!
//! [`Account`] knows nothing about customers, sessions, caps, or
//! overdraft fees. It guards exactly one rule: moved amounts must be
//! positive. Everything else, including letting a withdrawal drive the
//! balance negative, is policy layered on by the engine.
//!
//! # Example
//!
//! ```
//! use bank_ledger_rs::Account;
//! use rust_decimal_macros::dec;
//!
//! let mut account = Account::new();
//! account.deposit(dec!(25.00)).unwrap();
//! account.withdraw_raw(dec!(40.00)).unwrap();
//! assert_eq!(account.balance(), dec!(-15.00));
//! assert!(account.is_overdrawn());
//! ```

use crate::error::LedgerError;
use rust_decimal::Decimal;

/// A balance cell addressed through its slot in the owning customer.
///
/// The balance changes only through [`Account::deposit`] and
/// [`Account::withdraw_raw`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    balance: Decimal,
}

impl Account {
    /// Creates an account with a zero balance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an account holding `balance`, used when materializing
    /// customers from a snapshot.
    pub fn with_balance(balance: Decimal) -> Self {
        Self { balance }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// True when the balance is below zero.
    pub fn is_overdrawn(&self) -> bool {
        self.balance < Decimal::ZERO
    }

    /// Increases the balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount` is zero or
    /// negative; the balance is left untouched.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        self.balance += amount;
        Ok(())
    }

    /// Decreases the balance unconditionally, possibly below zero.
    ///
    /// No cap, activity, or overdraft checks happen here; the engine
    /// performs those before calling in and charges any penalty after.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if `amount` is zero or
    /// negative; the balance is left untouched.
    pub fn withdraw_raw(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        self.balance -= amount;
        Ok(())
    }
}
