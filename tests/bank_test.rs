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

//! Bank engine public API integration tests.

use bank_ledger_rs::{AccountKey, AuditKind, Bank, LedgerError, MemorySink};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

/// Two enrolled customers, nobody logged in.
fn seeded_bank() -> Bank {
    let mut bank = Bank::new();
    assert!(bank.enroll("10001", "Ada", "Lovelace", "pw1"));
    assert!(bank.enroll("10002", "Boris", "Serf", "pw2"));
    bank
}

/// Seeded bank with 10001 logged in and `funds` in their checking.
fn funded_bank(funds: Decimal) -> Bank {
    let mut bank = seeded_bank();
    assert!(bank.login("10001", "pw1"));
    bank.deposit("10001", "checking", funds).unwrap();
    bank
}

fn balance(bank: &Bank, cid: &str, key: AccountKey) -> Decimal {
    bank.customer(cid).unwrap().account(key).balance()
}

// === Enrollment ===

#[test]
fn enroll_rejects_duplicate_ids() {
    let mut bank = seeded_bank();
    assert!(!bank.enroll("10001", "Other", "Person", "pw"));
    assert_eq!(bank.customer("10001").unwrap().first_name(), "Ada");
}

#[test]
fn enroll_trims_the_id_before_checking() {
    let mut bank = seeded_bank();
    // trims to an existing id
    assert!(!bank.enroll(" 10001 ", "Other", "Person", "pw"));
    // trims to empty
    assert!(!bank.enroll("   ", "No", "Id", "pw"));
    assert_eq!(bank.customers().count(), 2);
}

#[test]
fn enroll_emits_a_system_event() {
    let mut bank = Bank::new();
    assert!(bank.enroll("10001", "Ada", "Lovelace", "pw1"));

    let event = bank.trail().last().unwrap();
    assert_eq!(event.kind, AuditKind::System);
    assert_eq!(event.field("action"), Some(&json!("enroll")));
    assert_eq!(event.field("cid"), Some(&json!("10001")));
}

// === Sessions ===

#[test]
fn login_with_correct_credentials() {
    let mut bank = seeded_bank();
    assert!(bank.login("10001", "pw1"));
    assert_eq!(bank.session().map(|id| id.as_str()), Some("10001"));
}

#[test]
fn login_rejects_wrong_password_and_unknown_id() {
    let mut bank = seeded_bank();
    assert!(!bank.login("10001", "nope"));
    assert!(!bank.login("99999", "pw1"));
    assert!(bank.session().is_none());
}

#[test]
fn login_does_not_trim_the_lookup() {
    let mut bank = seeded_bank();
    // ids are trimmed at enrollment, not at login
    assert!(!bank.login(" 10001 ", "pw1"));
    assert!(bank.session().is_none());
}

#[test]
fn relogin_replaces_the_session() {
    let mut bank = seeded_bank();
    assert!(bank.login("10001", "pw1"));
    assert!(bank.login("10002", "pw2"));
    assert_eq!(bank.session().map(|id| id.as_str()), Some("10002"));
}

#[test]
fn failed_login_leaves_the_session_alone() {
    let mut bank = seeded_bank();
    assert!(bank.login("10001", "pw1"));
    assert!(!bank.login("10002", "wrong"));
    assert_eq!(bank.session().map(|id| id.as_str()), Some("10001"));
}

#[test]
fn login_and_logout_emit_auth_events() {
    let mut bank = seeded_bank();
    let base = bank.trail().len();

    assert!(bank.login("10001", "pw1"));
    bank.logout();

    let events = &bank.trail()[base..];
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, AuditKind::Auth);
    assert_eq!(events[0].field("action"), Some(&json!("login")));
    assert_eq!(events[1].field("action"), Some(&json!("logout")));
    assert_eq!(events[1].field("cid"), Some(&json!("10001")));
}

#[test]
fn failed_login_and_idle_logout_emit_nothing() {
    let mut bank = seeded_bank();
    let base = bank.trail().len();

    assert!(!bank.login("10001", "wrong"));
    bank.logout(); // nobody logged in

    assert_eq!(bank.trail().len(), base);
}

// === Authorization ===

#[test]
fn money_operations_require_a_session() {
    let mut bank = seeded_bank();
    assert_eq!(
        bank.deposit("10001", "checking", dec!(10)),
        Err(LedgerError::LoginRequired)
    );
    assert_eq!(
        bank.withdraw("10001", "checking", dec!(10)),
        Err(LedgerError::LoginRequired)
    );
    assert_eq!(
        bank.transfer_to_other("10001", "checking", "10002", "savings", dec!(10)),
        Err(LedgerError::LoginRequired)
    );
}

#[test]
fn session_owner_cannot_touch_other_customers() {
    let mut bank = funded_bank(dec!(100));
    assert_eq!(
        bank.deposit("10002", "checking", dec!(10)),
        Err(LedgerError::AccessDenied)
    );
    assert_eq!(
        bank.withdraw("10002", "checking", dec!(10)),
        Err(LedgerError::AccessDenied)
    );
    assert_eq!(balance(&bank, "10002", AccountKey::Checking), dec!(0));
}

// === Deposits ===

#[test]
fn deposit_increases_the_named_account() {
    let mut bank = seeded_bank();
    assert!(bank.login("10001", "pw1"));

    bank.deposit("10001", "checking", dec!(50.25)).unwrap();
    bank.deposit("10001", "savings", dec!(10)).unwrap();

    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(50.25));
    assert_eq!(balance(&bank, "10001", AccountKey::Savings), dec!(10));
}

#[test]
fn deposit_rejects_bad_account_keys() {
    let mut bank = funded_bank(dec!(10));
    for bad in ["Checking", " savings", "cheque", ""] {
        assert_eq!(
            bank.deposit("10001", bad, dec!(10)),
            Err(LedgerError::InvalidAccount),
            "key {bad:?} should be rejected"
        );
    }
}

#[test]
fn deposit_rejects_non_positive_amounts() {
    let mut bank = funded_bank(dec!(10));
    assert_eq!(
        bank.deposit("10001", "checking", Decimal::ZERO),
        Err(LedgerError::InvalidAmount)
    );
    assert_eq!(
        bank.deposit("10001", "checking", dec!(-5)),
        Err(LedgerError::InvalidAmount)
    );
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(10));
}

#[test]
fn deposit_event_carries_balance_movement() {
    let mut bank = funded_bank(dec!(40));

    let event = bank.trail().last().unwrap();
    assert_eq!(event.kind, AuditKind::Deposit);
    assert_eq!(event.field("cid"), Some(&json!("10001")));
    assert_eq!(event.field("acct"), Some(&json!("checking")));
    assert_eq!(event.field("amount"), Some(&json!(dec!(40))));
    assert_eq!(event.field("before"), Some(&json!(dec!(0))));
    assert_eq!(event.field("after"), Some(&json!(dec!(40))));
    assert_eq!(event.field("overdraft_count"), Some(&json!(0)));
    assert_eq!(event.field("active"), Some(&json!(true)));
}

// === Withdrawals ===

#[test]
fn withdraw_decreases_the_named_account() {
    let mut bank = funded_bank(dec!(100));
    bank.withdraw("10001", "checking", dec!(30)).unwrap();
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(70));
}

#[test]
fn withdraw_allows_exactly_the_cap() {
    let mut bank = funded_bank(dec!(250));
    bank.withdraw("10001", "checking", dec!(100)).unwrap();
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(150));
}

#[test]
fn withdraw_rejects_amounts_over_the_cap() {
    let mut bank = funded_bank(dec!(250));
    assert_eq!(
        bank.withdraw("10001", "checking", dec!(100.01)),
        Err(LedgerError::LimitExceeded)
    );
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(250));
}

#[test]
fn withdraw_rejects_non_positive_amounts() {
    let mut bank = funded_bank(dec!(50));
    assert_eq!(
        bank.withdraw("10001", "checking", Decimal::ZERO),
        Err(LedgerError::InvalidAmount)
    );
    assert_eq!(
        bank.withdraw("10001", "checking", dec!(-1)),
        Err(LedgerError::InvalidAmount)
    );
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(50));
}

// === Overdraft policy ===

#[test]
fn overdraft_charges_the_flat_fee() {
    let mut bank = funded_bank(dec!(60));
    bank.withdraw("10001", "checking", dec!(80)).unwrap();

    // 60 - 80 = -20, then the $35 fee
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(-55));
    let customer = bank.customer("10001").unwrap();
    assert_eq!(customer.overdraft_count(), 1);
    assert!(customer.is_active());
}

#[test]
fn withdrawal_to_exactly_zero_is_not_an_overdraft() {
    let mut bank = funded_bank(dec!(80));
    bank.withdraw("10001", "checking", dec!(80)).unwrap();

    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(0));
    assert_eq!(bank.customer("10001").unwrap().overdraft_count(), 0);
}

#[test]
fn third_overdraft_deactivates_the_customer() {
    let mut bank = seeded_bank();
    assert!(bank.login("10001", "pw1"));

    // Each withdrawal from zero-or-negative lands below zero: -135, -270, -405.
    bank.withdraw("10001", "checking", dec!(100)).unwrap();
    assert!(bank.customer("10001").unwrap().is_active());
    bank.withdraw("10001", "checking", dec!(100)).unwrap();
    assert!(bank.customer("10001").unwrap().is_active());
    bank.withdraw("10001", "checking", dec!(100)).unwrap();

    let customer = bank.customer("10001").unwrap();
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(-405));
    assert_eq!(customer.overdraft_count(), 3);
    assert!(!customer.is_active());

    // and the fourth attempt is refused outright
    assert_eq!(
        bank.withdraw("10001", "checking", dec!(1)),
        Err(LedgerError::AccountDeactivated)
    );
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(-405));
}

#[test]
fn overdrawn_account_still_withdraws_under_the_cap() {
    let mut bank = funded_bank(dec!(50));
    bank.withdraw("10001", "checking", dec!(90)).unwrap(); // -40 - 35 = -75

    // under the negative-balance cap still works (and racks up fees)
    bank.withdraw("10001", "checking", dec!(50)).unwrap();
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(-160));
    assert_eq!(bank.customer("10001").unwrap().overdraft_count(), 2);
}

#[test]
fn overdraft_fees_do_not_gate_the_other_account() {
    let mut bank = funded_bank(dec!(10));
    bank.deposit("10001", "savings", dec!(200)).unwrap();
    bank.withdraw("10001", "checking", dec!(40)).unwrap(); // checking now -65

    // savings is healthy and stays fully usable
    bank.withdraw("10001", "savings", dec!(100)).unwrap();
    assert_eq!(balance(&bank, "10001", AccountKey::Savings), dec!(100));
}

// === Reactivation ===

#[test]
fn deposits_reach_deactivated_customers() {
    let mut bank = deactivated_bank();
    bank.deposit("10001", "checking", dec!(100)).unwrap();
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(-305));
    // still underwater, still deactivated
    assert!(!bank.customer("10001").unwrap().is_active());
}

#[test]
fn deposit_covering_the_debt_reactivates() {
    let mut bank = deactivated_bank();
    // exactly zero counts as funded
    bank.deposit("10001", "checking", dec!(405)).unwrap();

    let customer = bank.customer("10001").unwrap();
    assert!(customer.is_active());
    // the overdraft history is not forgiven
    assert_eq!(customer.overdraft_count(), 3);

    // withdrawals work again
    bank.deposit("10001", "checking", dec!(50)).unwrap();
    bank.withdraw("10001", "checking", dec!(20)).unwrap();
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(30));
}

#[test]
fn reactivation_requires_both_accounts_funded() {
    let mut bank = seeded_bank();
    assert!(bank.login("10001", "pw1"));

    // overdraw both slots, then a third time on checking to deactivate
    bank.withdraw("10001", "checking", dec!(100)).unwrap(); // -135
    bank.withdraw("10001", "savings", dec!(100)).unwrap(); // -135
    bank.withdraw("10001", "checking", dec!(100)).unwrap(); // -270, deactivated
    assert!(!bank.customer("10001").unwrap().is_active());

    // checking back above water, savings still negative: no reactivation
    bank.deposit("10001", "checking", dec!(300)).unwrap();
    assert!(!bank.customer("10001").unwrap().is_active());

    // savings covered too: reactivated
    bank.deposit("10001", "savings", dec!(200)).unwrap();
    assert!(bank.customer("10001").unwrap().is_active());
}

/// 10001 logged in, checking at -405 after three overdrafts,
/// deactivated.
fn deactivated_bank() -> Bank {
    let mut bank = seeded_bank();
    assert!(bank.login("10001", "pw1"));
    for _ in 0..3 {
        bank.withdraw("10001", "checking", dec!(100)).unwrap();
    }
    assert!(!bank.customer("10001").unwrap().is_active());
    bank
}

// === Self transfers ===

#[test]
fn transfer_self_moves_between_own_accounts() {
    let mut bank = funded_bank(dec!(50));
    bank.transfer_self("10001", "checking", "savings", dec!(10)).unwrap();

    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(40));
    assert_eq!(balance(&bank, "10001", AccountKey::Savings), dec!(10));
}

#[test]
fn transfer_self_rejects_same_account_before_anything_else() {
    let mut bank = funded_bank(dec!(50));
    assert_eq!(
        bank.transfer_self("10001", "checking", "checking", dec!(10)),
        Err(LedgerError::SameAccount)
    );
    // raw string comparison: even two invalid keys hit SameAccount first
    assert_eq!(
        bank.transfer_self("10001", "bogus", "bogus", dec!(10)),
        Err(LedgerError::SameAccount)
    );
    // and it outranks the session check
    bank.logout();
    assert_eq!(
        bank.transfer_self("10001", "checking", "checking", dec!(10)),
        Err(LedgerError::SameAccount)
    );
}

#[test]
fn transfer_self_emits_three_events() {
    let mut bank = funded_bank(dec!(50));
    let base = bank.trail().len();

    bank.transfer_self("10001", "checking", "savings", dec!(10)).unwrap();

    let events = &bank.trail()[base..];
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind, AuditKind::Withdraw);
    assert_eq!(events[1].kind, AuditKind::Deposit);
    assert_eq!(events[2].kind, AuditKind::TransferSelf);
    assert_eq!(events[2].field("from"), Some(&json!("checking")));
    assert_eq!(events[2].field("to"), Some(&json!("savings")));
    assert_eq!(events[2].field("amount"), Some(&json!(dec!(10))));
}

#[test]
fn transfer_self_with_bad_destination_keeps_the_withdrawal() {
    let mut bank = funded_bank(dec!(50));
    let base = bank.trail().len();

    // the withdrawal leg commits before the destination key is parsed
    assert_eq!(
        bank.transfer_self("10001", "checking", "bogus", dec!(30)),
        Err(LedgerError::InvalidAccount)
    );

    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(20));
    assert_eq!(balance(&bank, "10001", AccountKey::Savings), dec!(0));
    // only the withdrawal leg made it onto the trail
    let events = &bank.trail()[base..];
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AuditKind::Withdraw);
}

#[test]
fn transfer_self_respects_the_withdrawal_policy() {
    let mut bank = funded_bank(dec!(20));
    // 20 - 60 lands below zero: fee applies on the checking side
    bank.transfer_self("10001", "checking", "savings", dec!(60)).unwrap();

    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(-75));
    assert_eq!(balance(&bank, "10001", AccountKey::Savings), dec!(60));
    assert_eq!(bank.customer("10001").unwrap().overdraft_count(), 1);
}

// === Transfers to other customers ===

#[test]
fn transfer_to_other_moves_between_customers() {
    let mut bank = funded_bank(dec!(100));
    bank.transfer_to_other("10001", "checking", "10002", "savings", dec!(40))
        .unwrap();

    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(60));
    assert_eq!(balance(&bank, "10002", AccountKey::Savings), dec!(40));
    // the recipient never logged in
    assert_eq!(bank.session().map(|id| id.as_str()), Some("10001"));
}

#[test]
fn transfer_to_other_checks_destination_before_the_source_leg() {
    let mut bank = funded_bank(dec!(100));

    // unknown destination: nothing moves
    assert_eq!(
        bank.transfer_to_other("10001", "checking", "99999", "savings", dec!(40)),
        Err(LedgerError::CustomerNotFound)
    );
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(100));

    // bad destination key: also checked before the withdrawal
    assert_eq!(
        bank.transfer_to_other("10001", "checking", "10002", "vault", dec!(40)),
        Err(LedgerError::InvalidAccount)
    );
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(100));

    // unknown destination outranks a bad destination key
    assert_eq!(
        bank.transfer_to_other("10001", "checking", "99999", "vault", dec!(40)),
        Err(LedgerError::CustomerNotFound)
    );
}

#[test]
fn transfer_to_other_applies_source_overdraft_fee() {
    let mut bank = funded_bank(dec!(10));
    bank.transfer_to_other("10001", "checking", "10002", "checking", dec!(40))
        .unwrap();

    // source pays 40 and the fee; destination receives the full 40
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(-65));
    assert_eq!(balance(&bank, "10002", AccountKey::Checking), dec!(40));
    assert_eq!(bank.customer("10001").unwrap().overdraft_count(), 1);
    assert_eq!(bank.customer("10002").unwrap().overdraft_count(), 0);
}

#[test]
fn transfer_to_other_may_reactivate_the_recipient() {
    let mut bank = seeded_bank();

    // drive 10002 into deactivation
    assert!(bank.login("10002", "pw2"));
    for _ in 0..3 {
        bank.withdraw("10002", "savings", dec!(100)).unwrap();
    }
    assert!(!bank.customer("10002").unwrap().is_active());

    // 10001 covers the whole debt (405) in five transfers
    assert!(bank.login("10001", "pw1"));
    bank.deposit("10001", "checking", dec!(500)).unwrap();
    for _ in 0..5 {
        bank.transfer_to_other("10001", "checking", "10002", "savings", dec!(81))
            .unwrap();
    }

    assert_eq!(balance(&bank, "10002", AccountKey::Savings), dec!(0));
    assert!(bank.customer("10002").unwrap().is_active());
}

#[test]
fn transfer_to_other_emits_two_events() {
    let mut bank = funded_bank(dec!(100));
    let base = bank.trail().len();

    bank.transfer_to_other("10001", "checking", "10002", "savings", dec!(40))
        .unwrap();

    let events = &bank.trail()[base..];
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, AuditKind::Withdraw);
    assert_eq!(events[1].kind, AuditKind::TransferOther);
    assert_eq!(events[1].field("from_cid"), Some(&json!("10001")));
    assert_eq!(events[1].field("to_cid"), Some(&json!("10002")));
    assert_eq!(events[1].field("to_acct"), Some(&json!("savings")));
    assert_eq!(events[1].field("dest_before"), Some(&json!(dec!(0))));
    assert_eq!(events[1].field("dest_after"), Some(&json!(dec!(40))));
}

// === Failed operations and the trail ===

#[test]
fn rejected_operations_leave_no_events() {
    let mut bank = funded_bank(dec!(50));
    let base = bank.trail().len();

    let _ = bank.withdraw("10001", "checking", dec!(500));
    let _ = bank.deposit("10001", "vault", dec!(10));
    let _ = bank.withdraw("10002", "checking", dec!(10));
    let _ = bank.transfer_to_other("10001", "checking", "nobody", "savings", dec!(10));

    assert_eq!(bank.trail().len(), base);
    assert_eq!(balance(&bank, "10001", AccountKey::Checking), dec!(50));
}

#[test]
fn flush_hands_each_event_to_the_sink_once() {
    let mut bank = funded_bank(dec!(50));
    let mut sink = MemorySink::new();

    let first = bank.flush_events(&mut sink).unwrap();
    assert_eq!(first, bank.trail().len());
    assert_eq!(sink.events().len(), first);

    // nothing new: nothing flushed
    assert_eq!(bank.flush_events(&mut sink).unwrap(), 0);

    bank.withdraw("10001", "checking", dec!(5)).unwrap();
    assert_eq!(bank.flush_events(&mut sink).unwrap(), 1);
    assert_eq!(sink.events().len(), first + 1);
    assert_eq!(sink.events().last().unwrap().kind, AuditKind::Withdraw);
}

// === End-to-end scenario ===

#[test]
fn teller_day_in_the_life() {
    let mut bank = seeded_bank();
    assert!(bank.login("10002", "pw2"));

    bank.deposit("10002", "checking", dec!(50)).unwrap();
    bank.withdraw("10002", "checking", dec!(20)).unwrap();
    bank.transfer_self("10002", "checking", "savings", dec!(10)).unwrap();

    assert_eq!(balance(&bank, "10002", AccountKey::Checking), dec!(20));
    assert_eq!(balance(&bank, "10002", AccountKey::Savings), dec!(10));

    let customer = bank.customer("10002").unwrap();
    assert_eq!(customer.overdraft_count(), 0);
    assert!(customer.is_active());

    bank.logout();
    assert!(bank.session().is_none());
}
