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

//! The ledger engine.
//!
//! [`Bank`] owns the customer directory, at most one authenticated
//! session, and the append-only audit trail. It layers the banking
//! policies on top of the raw account primitives:
//!
//! - **Authorization**: money operations require a session, and only
//!   for the session owner's own accounts.
//! - **Withdrawal caps**: no more than $100 per transaction, and no
//!   large withdrawals from an already-negative balance.
//! - **Overdraft penalty**: a withdrawal that lands below zero costs a
//!   flat $35 fee; three overdrafts deactivate the customer.
//! - **Reactivation**: any deposit that brings both balances back to
//!   zero or above reactivates the customer.
//!
//! Deposits are deliberately *not* gated on the active flag, otherwise
//! a deactivated customer could never climb back out.

use crate::audit::{AuditEvent, AuditKind, AuditSink};
use crate::base::{AccountKey, CustomerId};
use crate::customer::Customer;
use crate::error::{LedgerError, StoreError};
use crate::snapshot;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Ledger engine managing the customer directory and the banking
/// policies.
///
/// All mutating operations take `&mut self`; processing is strictly
/// sequential, and a multi-threaded host wraps the engine in a lock of
/// its choosing.
///
/// # Invariants
///
/// - A stored session id always names a customer in the directory;
///   customers are never removed.
/// - Balances change only through the account primitives, with the
///   engine's validation and penalty policies layered on top.
/// - Audit events are appended in emission order and never mutated or
///   dropped; failed operations emit nothing.
#[derive(Debug)]
pub struct Bank {
    /// Customers indexed by id, in stable directory order.
    customers: BTreeMap<CustomerId, Customer>,
    /// The single authenticated session, if any.
    session: Option<CustomerId>,
    /// Every event emitted since construction.
    trail: Vec<AuditEvent>,
    /// Number of leading trail events already handed to a sink.
    flushed: usize,
}

impl Bank {
    /// Flat penalty charged when a withdrawal drives a balance below
    /// zero.
    pub const OVERDRAFT_FEE: Decimal = dec!(35);

    /// Largest amount a single withdrawal may move.
    pub const MAX_WITHDRAW_PER_TX: Decimal = dec!(100);

    /// Cap applied to withdrawals from an already-negative balance.
    /// Coincides with [`Self::MAX_WITHDRAW_PER_TX`] today but is
    /// checked on its own, so the two caps can diverge independently.
    pub const NEGATIVE_BALANCE_WITHDRAW_CAP: Decimal = dec!(100);

    /// Overdrafts beyond this count deactivate the customer.
    pub const MAX_OVERDRAFTS: u32 = 2;

    /// Creates an engine with an empty directory and no session.
    pub fn new() -> Self {
        Bank {
            customers: BTreeMap::new(),
            session: None,
            trail: Vec::new(),
            flushed: 0,
        }
    }

    // === Directory ===

    /// Looks up a customer by raw id string. No trimming; lookups use
    /// the caller's input exactly.
    pub fn customer(&self, cid: &str) -> Option<&Customer> {
        self.customers.get(cid)
    }

    /// Iterates over all customers in directory order.
    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    /// Adds a new customer with zero balances.
    ///
    /// Returns `false` without touching the directory when the trimmed
    /// id is empty or already taken.
    pub fn enroll(&mut self, cid: &str, first_name: &str, last_name: &str, password: &str) -> bool {
        let customer = Customer::new(cid, first_name, last_name, password);
        if customer.id().is_empty() || self.customers.contains_key(customer.id().as_str()) {
            return false;
        }
        let id = customer.id().clone();
        self.customers.insert(id.clone(), customer);
        self.emit(
            AuditKind::System,
            [("action", json!("enroll")), ("cid", json!(id))],
        );
        true
    }

    // === Session ===

    /// Authenticates a customer and replaces any current session.
    ///
    /// Returns `false`, leaving the session untouched, when the id is
    /// unknown or the password does not match. Failed attempts are not
    /// recorded on the trail.
    pub fn login(&mut self, cid: &str, password: &str) -> bool {
        let Some(customer) = self.customers.get(cid) else {
            return false;
        };
        if !customer.verify_password(password) {
            return false;
        }
        let id = customer.id().clone();
        self.session = Some(id.clone());
        self.emit(
            AuditKind::Auth,
            [("action", json!("login")), ("cid", json!(id))],
        );
        true
    }

    /// Ends the current session. Without one this is a silent no-op.
    pub fn logout(&mut self) {
        if let Some(id) = self.session.take() {
            self.emit(
                AuditKind::Auth,
                [("action", json!("logout")), ("cid", json!(id))],
            );
        }
    }

    /// The id of the logged-in customer, if any.
    pub fn session(&self) -> Option<&CustomerId> {
        self.session.as_ref()
    }

    // === Money operations ===

    /// Deposits `amount` into one of the session owner's accounts.
    ///
    /// Deposits reach deactivated customers too; one that restores
    /// both balances to zero or above reactivates the customer.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::LoginRequired`] - no session.
    /// - [`LedgerError::AccessDenied`] - `cid` is not the session owner.
    /// - [`LedgerError::InvalidAccount`] - `acct` is not `checking`/`savings`.
    /// - [`LedgerError::InvalidAmount`] - `amount` is zero or negative.
    pub fn deposit(&mut self, cid: &str, acct: &str, amount: Decimal) -> Result<(), LedgerError> {
        let customer = self.require_owner(cid)?;
        let key = AccountKey::parse(acct).ok_or(LedgerError::InvalidAccount)?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        let before = customer.account(key).balance();
        customer.account_mut(key).deposit(amount)?;
        Self::reactivate_if_funded(customer);

        let after = customer.account(key).balance();
        let overdraft_count = customer.overdraft_count();
        let active = customer.is_active();
        self.emit(
            AuditKind::Deposit,
            [
                ("cid", json!(cid)),
                ("acct", json!(key)),
                ("amount", json!(amount)),
                ("before", json!(before)),
                ("after", json!(after)),
                ("overdraft_count", json!(overdraft_count)),
                ("active", json!(active)),
            ],
        );
        Ok(())
    }

    /// Withdraws `amount` from one of the session owner's accounts.
    ///
    /// A withdrawal that lands below zero additionally costs
    /// [`Self::OVERDRAFT_FEE`] and bumps the overdraft count; crossing
    /// [`Self::MAX_OVERDRAFTS`] deactivates the customer. The checks
    /// run in a fixed order, so the first failing one names the error.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::LoginRequired`] - no session.
    /// - [`LedgerError::AccessDenied`] - `cid` is not the session owner.
    /// - [`LedgerError::InvalidAccount`] - `acct` is not `checking`/`savings`.
    /// - [`LedgerError::AccountDeactivated`] - customer is deactivated.
    /// - [`LedgerError::InvalidAmount`] - `amount` is zero or negative.
    /// - [`LedgerError::LimitExceeded`] - `amount` is over the
    ///   per-transaction cap, or over the negative-balance cap while
    ///   the account is already overdrawn.
    pub fn withdraw(&mut self, cid: &str, acct: &str, amount: Decimal) -> Result<(), LedgerError> {
        let customer = self.require_owner(cid)?;
        let key = AccountKey::parse(acct).ok_or(LedgerError::InvalidAccount)?;
        if !customer.is_active() {
            return Err(LedgerError::AccountDeactivated);
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }
        if amount > Self::MAX_WITHDRAW_PER_TX {
            return Err(LedgerError::LimitExceeded);
        }
        if customer.account(key).is_overdrawn() && amount > Self::NEGATIVE_BALANCE_WITHDRAW_CAP {
            return Err(LedgerError::LimitExceeded);
        }

        let before = customer.account(key).balance();
        customer.account_mut(key).withdraw_raw(amount)?;
        Self::apply_overdraft_policy(customer, key)?;

        let after = customer.account(key).balance();
        let overdraft_count = customer.overdraft_count();
        let active = customer.is_active();
        self.emit(
            AuditKind::Withdraw,
            [
                ("cid", json!(cid)),
                ("acct", json!(key)),
                ("amount", json!(amount)),
                ("before", json!(before)),
                ("after", json!(after)),
                ("overdraft_count", json!(overdraft_count)),
                ("active", json!(active)),
            ],
        );
        Ok(())
    }

    /// Moves `amount` between the session owner's own two accounts.
    ///
    /// Runs as a withdrawal leg followed by a deposit leg, each with
    /// its full policy checks and its own trail event; a third
    /// `transfer_self` event marks the pair. The legs are not atomic:
    /// if the deposit leg is rejected after the withdrawal leg
    /// committed, the withdrawal (and any overdraft fee it triggered)
    /// stands.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::SameAccount`] - `from` and `to` name the same
    ///   account; checked on the raw strings before anything else.
    /// - Any error of [`Self::withdraw`] or [`Self::deposit`].
    pub fn transfer_self(
        &mut self,
        cid: &str,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if from == to {
            return Err(LedgerError::SameAccount);
        }
        self.withdraw(cid, from, amount)?;
        self.deposit(cid, to, amount)?;
        self.emit(
            AuditKind::TransferSelf,
            [
                ("cid", json!(cid)),
                ("from", json!(from)),
                ("to", json!(to)),
                ("amount", json!(amount)),
            ],
        );
        Ok(())
    }

    /// Moves `amount` from the session owner to another customer.
    ///
    /// The source leg is a full [`Self::withdraw`] with every check
    /// and penalty. The destination leg is a raw deposit: the
    /// recipient's activity status and session are irrelevant, and the
    /// deposit may reactivate a deactivated recipient. Two events land
    /// on the trail: the withdrawal leg's and one `transfer_other`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::LoginRequired`] / [`LedgerError::AccessDenied`] -
    ///   `from_cid` is not the session owner.
    /// - [`LedgerError::CustomerNotFound`] - `to_cid` is not in the
    ///   directory; checked before the destination key and the source
    ///   leg.
    /// - [`LedgerError::InvalidAccount`] - `to_acct` (checked next) or
    ///   `from_acct` (checked inside the source leg) is invalid.
    /// - Any other error of [`Self::withdraw`].
    pub fn transfer_to_other(
        &mut self,
        from_cid: &str,
        from_acct: &str,
        to_cid: &str,
        to_acct: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        self.require_owner(from_cid)?;
        if !self.customers.contains_key(to_cid) {
            return Err(LedgerError::CustomerNotFound);
        }
        let to_key = AccountKey::parse(to_acct).ok_or(LedgerError::InvalidAccount)?;

        self.withdraw(from_cid, from_acct, amount)?;

        let destination = self
            .customers
            .get_mut(to_cid)
            .ok_or(LedgerError::CustomerNotFound)?;
        let dest_before = destination.account(to_key).balance();
        destination.account_mut(to_key).deposit(amount)?;
        Self::reactivate_if_funded(destination);

        let dest_after = destination.account(to_key).balance();
        self.emit(
            AuditKind::TransferOther,
            [
                ("from_cid", json!(from_cid)),
                ("from_acct", json!(from_acct)),
                ("to_cid", json!(to_cid)),
                ("to_acct", json!(to_acct)),
                ("amount", json!(amount)),
                ("dest_before", json!(dest_before)),
                ("dest_after", json!(dest_after)),
            ],
        );
        Ok(())
    }

    // === Audit trail ===

    /// Every event emitted since construction, in order.
    pub fn trail(&self) -> &[AuditEvent] {
        &self.trail
    }

    /// Hands events not yet flushed to `sink`, then flushes the sink.
    ///
    /// Returns how many events were appended. Events are marked
    /// flushed one by one, so a sink failure part-way through does not
    /// re-send the already-appended prefix on retry.
    pub fn flush_events(&mut self, sink: &mut dyn AuditSink) -> Result<usize, StoreError> {
        let mut appended = 0;
        while self.flushed < self.trail.len() {
            sink.append(&self.trail[self.flushed])?;
            self.flushed += 1;
            appended += 1;
        }
        sink.flush()?;
        Ok(appended)
    }

    // === Persistence ===

    /// Reads a customer snapshot and merges it into the directory,
    /// later rows and loaded rows winning over earlier ones.
    ///
    /// Returns the number of rows read. Emits one `system` event with
    /// the resulting directory size.
    ///
    /// # Errors
    ///
    /// Fails only on I/O problems or when a required identity column
    /// is missing; malformed value cells coerce to safe defaults
    /// instead of failing the load.
    pub fn load_customers<R: Read>(&mut self, reader: R) -> Result<usize, StoreError> {
        let rows = snapshot::read_customers(reader)?;
        let count = rows.len();
        for customer in rows {
            self.customers.insert(customer.id().clone(), customer);
        }
        tracing::info!(rows = count, customers = self.customers.len(), "snapshot loaded");

        let directory = self.customers.len();
        self.emit(
            AuditKind::System,
            [("action", json!("load_customers")), ("count", json!(directory))],
        );
        Ok(count)
    }

    /// Writes the whole directory as a snapshot, in directory order.
    ///
    /// Emits one `system` event with the directory size; `&mut self`
    /// exists only for that emission.
    pub fn save_customers<W: Write>(&mut self, writer: W) -> Result<(), StoreError> {
        snapshot::write_customers(writer, self.customers.values())?;
        tracing::info!(customers = self.customers.len(), "snapshot saved");

        let directory = self.customers.len();
        self.emit(
            AuditKind::System,
            [("action", json!("save_customers")), ("count", json!(directory))],
        );
        Ok(())
    }

    // === Policy helpers ===

    /// Authorization guard for money operations: a session must exist
    /// and `cid` must be its owner. Returns the owning customer.
    fn require_owner(&mut self, cid: &str) -> Result<&mut Customer, LedgerError> {
        let session = self.session.as_ref().ok_or(LedgerError::LoginRequired)?;
        if session.as_str() != cid {
            return Err(LedgerError::AccessDenied);
        }
        // Login only stores ids it found, and customers are never
        // removed, so this lookup succeeds.
        self.customers.get_mut(cid).ok_or(LedgerError::LoginRequired)
    }

    /// Charges the overdraft penalty after a withdrawal leg that
    /// landed below zero, deactivating the customer past the overdraft
    /// allowance. The fee itself may push the balance further down but
    /// never counts as a second overdraft.
    fn apply_overdraft_policy(customer: &mut Customer, key: AccountKey) -> Result<(), LedgerError> {
        if customer.account(key).is_overdrawn() {
            customer.account_mut(key).withdraw_raw(Bank::OVERDRAFT_FEE)?;
            if customer.record_overdraft() > Bank::MAX_OVERDRAFTS {
                customer.deactivate();
            }
        }
        Ok(())
    }

    /// Reactivates the customer once every balance is back at zero or
    /// above. Runs after every successful deposit leg.
    fn reactivate_if_funded(customer: &mut Customer) {
        if customer.is_funded() {
            customer.activate();
        }
    }

    fn emit<const N: usize>(&mut self, kind: AuditKind, detail: [(&'static str, Value); N]) {
        let mut fields = Map::new();
        for (key, value) in detail {
            fields.insert(key.to_string(), value);
        }
        tracing::debug!(kind = %kind, "audit event");
        self.trail.push(AuditEvent::now(kind, fields));
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}
