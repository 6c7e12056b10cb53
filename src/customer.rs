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

//! Customer records: identity, credentials, status, and the two
//! account slots.
//!
//! Every customer owns exactly one checking and one savings account;
//! the pair is fixed at construction and never grows or shrinks. The
//! active flag and overdraft count belong to the engine's policies and
//! are only flipped from there.

use crate::account::Account;
use crate::base::{AccountKey, CustomerId};
use rust_decimal::Decimal;

/// One customer in the directory.
#[derive(Debug, Clone)]
pub struct Customer {
    id: CustomerId,
    first_name: String,
    last_name: String,
    password: String,
    active: bool,
    overdraft_count: u32,
    checking: Account,
    savings: Account,
}

impl Customer {
    /// Creates an active customer with zero balances and no overdraft
    /// history. The id and names are trimmed; the password is kept
    /// verbatim.
    pub fn new(id: &str, first_name: &str, last_name: &str, password: &str) -> Self {
        Self::from_snapshot(
            id,
            first_name,
            last_name,
            password,
            Decimal::ZERO,
            Decimal::ZERO,
            true,
            0,
        )
    }

    /// Materializes a customer from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_snapshot(
        id: &str,
        first_name: &str,
        last_name: &str,
        password: &str,
        checking: Decimal,
        savings: Decimal,
        active: bool,
        overdraft_count: u32,
    ) -> Self {
        Self {
            id: CustomerId::new(id),
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            password: password.to_string(),
            active,
            overdraft_count,
            checking: Account::with_balance(checking),
            savings: Account::with_balance(savings),
        }
    }

    pub fn id(&self) -> &CustomerId {
        &self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// The stored password, verbatim. Snapshots persist it in the
    /// clear, so treat snapshot files accordingly.
    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn overdraft_count(&self) -> u32 {
        self.overdraft_count
    }

    /// Exact string comparison against the stored password.
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password == candidate
    }

    pub fn account(&self, key: AccountKey) -> &Account {
        match key {
            AccountKey::Checking => &self.checking,
            AccountKey::Savings => &self.savings,
        }
    }

    // Balance mutation stays an engine-only affair.
    pub(crate) fn account_mut(&mut self, key: AccountKey) -> &mut Account {
        match key {
            AccountKey::Checking => &mut self.checking,
            AccountKey::Savings => &mut self.savings,
        }
    }

    /// True when neither account is overdrawn.
    pub fn is_funded(&self) -> bool {
        !self.checking.is_overdrawn() && !self.savings.is_overdrawn()
    }

    pub(crate) fn record_overdraft(&mut self) -> u32 {
        self.overdraft_count += 1;
        self.overdraft_count
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    pub(crate) fn activate(&mut self) {
        self.active = true;
    }
}
