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

//! Error types for ledger operations and persistence.

use thiserror::Error;

/// Validation and policy errors raised by ledger operations.
///
/// A rejected operation leaves every balance, the overdraft count, and
/// the active flag exactly as they were. Partially applied transfers
/// are the one exception; see the transfer operations on
/// [`Bank`](crate::Bank).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Amount is zero or negative
    #[error("invalid amount (must be positive)")]
    InvalidAmount,

    /// Account key is not `checking` or `savings`
    #[error("invalid account type")]
    InvalidAccount,

    /// Withdrawal exceeds a per-transaction cap
    #[error("cannot withdraw more than $100 in one transaction")]
    LimitExceeded,

    /// Customer was deactivated by the overdraft policy
    #[error("account is deactivated")]
    AccountDeactivated,

    /// No customer is logged in
    #[error("login required")]
    LoginRequired,

    /// Session owner differs from the operation's target customer
    #[error("access denied: customers can only reach their own accounts")]
    AccessDenied,

    /// Destination customer id is not in the directory
    #[error("destination customer not found")]
    CustomerNotFound,

    /// Transfer names the same account as source and destination
    #[error("source and destination accounts must differ")]
    SameAccount,
}

/// Infrastructure failures from snapshot and audit-log persistence.
///
/// Kept apart from [`LedgerError`]: money operations never produce
/// these, and callers handle them as fatal rather than as user input
/// mistakes.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying file or stream failure
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot rows could not be read or written
    #[error("snapshot error: {0}")]
    Csv(#[from] csv::Error),

    /// Audit event could not be encoded
    #[error("audit encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Snapshot lacks one of the required identity columns
    #[error("snapshot missing required column `{column}`")]
    MissingColumn { column: &'static str },
}
