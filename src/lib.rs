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

//! # Bank Ledger
//!
//! This library provides a small ledger engine for customer bank
//! accounts: authentication, deposits, withdrawals, and transfers,
//! with an overdraft penalty policy, CSV snapshot persistence, and an
//! append-only audit trail.
//!
//! ## Core Components
//!
//! - [`Bank`]: Ledger engine owning the customer directory, the single
//!   session, and the audit trail
//! - [`Customer`]: Identity, credentials, status, and the fixed
//!   checking/savings account pair
//! - [`Account`]: One balance cell with the raw move primitives
//! - [`AuditEvent`] / [`AuditSink`]: Trail records and where they are
//!   drained to
//! - [`LedgerError`]: Validation and policy failures;
//!   [`StoreError`]: snapshot and audit-log failures
//!
//! ## Example
//!
//! ```
//! use bank_ledger_rs::{AccountKey, Bank};
//! use rust_decimal_macros::dec;
//!
//! let mut bank = Bank::new();
//! assert!(bank.enroll("10002", "Boris", "Serf", "hunter2"));
//! assert!(bank.login("10002", "hunter2"));
//!
//! bank.deposit("10002", "checking", dec!(50.00)).unwrap();
//! bank.withdraw("10002", "checking", dec!(20.00)).unwrap();
//! bank.transfer_self("10002", "checking", "savings", dec!(10.00)).unwrap();
//!
//! let customer = bank.customer("10002").unwrap();
//! assert_eq!(customer.account(AccountKey::Checking).balance(), dec!(20.00));
//! assert_eq!(customer.account(AccountKey::Savings).balance(), dec!(10.00));
//! ```
//!
//! ## Concurrency
//!
//! The engine is deliberately single-threaded: every mutating
//! operation takes `&mut self`. A host that needs shared access wraps
//! the [`Bank`] in the lock of its choosing.

pub mod account;
pub mod audit;
mod bank;
mod base;
pub mod coerce;
mod customer;
pub mod error;
pub mod snapshot;

pub use account::Account;
pub use audit::{AuditEvent, AuditKind, AuditSink, FileAuditSink, MemorySink};
pub use bank::Bank;
pub use base::{AccountKey, CustomerId};
pub use customer::Customer;
pub use error::{LedgerError, StoreError};
