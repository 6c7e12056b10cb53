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

use bank_ledger_rs::{AccountKey, AuditSink, Bank, FileAuditSink, StoreError, coerce, snapshot};
use clap::Parser;
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;

/// Bank Teller Console - interactive menu over the ledger engine
///
/// Loads the customer snapshot on start, then loops over teller
/// commands. Commands that change balances or the directory save the
/// snapshot and flush audit events before the next prompt.
#[derive(Parser, Debug)]
#[command(name = "bank-ledger-rs")]
#[command(about = "An interactive teller console over the bank ledger engine", long_about = None)]
struct Args {
    /// Path to the customer snapshot CSV
    #[arg(long, value_name = "FILE", default_value = "customers.csv")]
    snapshot: PathBuf,

    /// Path to the append-only audit log (one JSON object per line)
    #[arg(long, value_name = "FILE", default_value = "transactions.log")]
    audit_log: PathBuf,
}

fn main() {
    let args = Args::parse();
    init_tracing();

    let mut bank = Bank::new();
    // A missing snapshot just means a first run; anything else is fatal.
    match snapshot::load_file(&mut bank, &args.snapshot) {
        Ok(count) => println!("Loaded {count} customers from '{}'.", args.snapshot.display()),
        Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            println!(
                "No snapshot at '{}'; starting with an empty ledger.",
                args.snapshot.display()
            );
        }
        Err(e) => {
            eprintln!("Error loading snapshot '{}': {}", args.snapshot.display(), e);
            process::exit(1);
        }
    }

    let mut sink = match FileAuditSink::open(&args.audit_log) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("Error opening audit log '{}': {}", args.audit_log.display(), e);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = run(&mut bank, &mut sink, &args.snapshot, stdin.lock(), stdout.lock()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Drives the teller menu until exit or end of input.
///
/// Domain errors are shown to the operator and the loop continues;
/// only persistence failures end the session with an error. Both the
/// `exit` command and end of input log the session out and save
/// before returning.
pub fn run<R: BufRead, W: Write>(
    bank: &mut Bank,
    sink: &mut dyn AuditSink,
    snapshot_path: &Path,
    mut input: R,
    mut out: W,
) -> Result<(), StoreError> {
    loop {
        writeln!(out)?;
        writeln!(out, "=== Bank Teller ===")?;
        writeln!(out, "1) Login")?;
        writeln!(out, "2) Add customer")?;
        writeln!(out, "3) Deposit")?;
        writeln!(out, "4) Withdraw")?;
        writeln!(out, "5) Transfer to another customer")?;
        writeln!(out, "6) Logout")?;
        writeln!(out, "7) Exit")?;
        let Some(choice) = prompt(&mut input, &mut out, "Select an option: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => {
                let Some(cid) = prompt(&mut input, &mut out, "Customer id: ")? else {
                    break;
                };
                let Some(password) = prompt(&mut input, &mut out, "Password: ")? else {
                    break;
                };
                if bank.login(&cid, &password) {
                    if let Some(customer) = bank.customer(&cid) {
                        writeln!(
                            out,
                            "Welcome, {} {}.",
                            customer.first_name(),
                            customer.last_name()
                        )?;
                    }
                } else {
                    writeln!(out, "Invalid customer id or password.")?;
                }
            }
            "2" => {
                let Some(cid) = prompt(&mut input, &mut out, "New customer id: ")? else {
                    break;
                };
                let Some(first) = prompt(&mut input, &mut out, "First name: ")? else {
                    break;
                };
                let Some(last) = prompt(&mut input, &mut out, "Last name: ")? else {
                    break;
                };
                let Some(password) = prompt(&mut input, &mut out, "Password: ")? else {
                    break;
                };
                if bank.enroll(&cid, &first, &last, &password) {
                    writeln!(out, "Customer {cid} created.")?;
                    snapshot::save_file(bank, snapshot_path)?;
                } else {
                    writeln!(out, "Customer id is empty or already taken.")?;
                }
            }
            "3" => {
                let Some(cid) = prompt(&mut input, &mut out, "Customer id: ")? else {
                    break;
                };
                let Some(acct) = prompt(&mut input, &mut out, "Account (checking/savings): ")?
                else {
                    break;
                };
                let Some(raw) = prompt(&mut input, &mut out, "Amount: ")? else {
                    break;
                };
                let amount = coerce::amount(&raw);
                match bank.deposit(&cid, &acct, amount) {
                    Ok(()) => {
                        report_balance(bank, &mut out, &cid, &acct)?;
                        snapshot::save_file(bank, snapshot_path)?;
                    }
                    Err(e) => writeln!(out, "Error: {e}")?,
                }
            }
            "4" => {
                let Some(cid) = prompt(&mut input, &mut out, "Customer id: ")? else {
                    break;
                };
                let Some(acct) = prompt(&mut input, &mut out, "Account (checking/savings): ")?
                else {
                    break;
                };
                let Some(raw) = prompt(&mut input, &mut out, "Amount: ")? else {
                    break;
                };
                let amount = coerce::amount(&raw);
                match bank.withdraw(&cid, &acct, amount) {
                    Ok(()) => {
                        report_balance(bank, &mut out, &cid, &acct)?;
                        snapshot::save_file(bank, snapshot_path)?;
                    }
                    Err(e) => writeln!(out, "Error: {e}")?,
                }
            }
            "5" => {
                // Teller transfers always draw on the checking account.
                let Some(cid) = prompt(&mut input, &mut out, "Your customer id: ")? else {
                    break;
                };
                let Some(to_cid) = prompt(&mut input, &mut out, "Destination customer id: ")?
                else {
                    break;
                };
                let Some(to_acct) =
                    prompt(&mut input, &mut out, "Destination account (checking/savings): ")?
                else {
                    break;
                };
                let Some(raw) = prompt(&mut input, &mut out, "Amount: ")? else {
                    break;
                };
                let amount = coerce::amount(&raw);
                match bank.transfer_to_other(&cid, "checking", &to_cid, &to_acct, amount) {
                    Ok(()) => {
                        writeln!(out, "Transferred {amount} to customer {to_cid}.")?;
                        report_balance(bank, &mut out, &cid, "checking")?;
                        snapshot::save_file(bank, snapshot_path)?;
                    }
                    Err(e) => writeln!(out, "Error: {e}")?,
                }
            }
            "6" => {
                bank.logout();
                writeln!(out, "Logged out.")?;
            }
            "7" => break,
            _ => writeln!(out, "Unknown option.")?,
        }

        bank.flush_events(sink)?;
    }

    bank.logout();
    snapshot::save_file(bank, snapshot_path)?;
    bank.flush_events(sink)?;
    writeln!(out, "Goodbye.")?;
    Ok(())
}

/// Prints a label, reads one trimmed line. `None` means end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> Result<Option<String>, StoreError> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn report_balance<W: Write>(
    bank: &Bank,
    out: &mut W,
    cid: &str,
    acct: &str,
) -> Result<(), StoreError> {
    if let (Some(customer), Some(key)) = (bank.customer(cid), AccountKey::parse(acct)) {
        writeln!(out, "New {key} balance: {}", customer.account(key).balance())?;
    }
    Ok(())
}
