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

//! Customer snapshot persistence.
//!
//! The snapshot is a headered CSV file, one row per customer:
//!
//! ```csv
//! id,first_name,last_name,password,checking,savings,active,overdraft_count
//! 10001,Ada,Lovelace,secret,125.50,0.00,true,0
//! ```
//!
//! Reading is lenient: columns are located by header name, the four
//! identity columns are required, and everything else coerces through
//! [`crate::coerce`], so a mangled balance cell loads as zero instead
//! of failing the file. An absent `active` column defaults to `true`;
//! an empty or unrecognized cell in an existing column coerces to
//! `false` like any other flag.
//!
//! Writing is exact: every column, balances fixed to two decimals,
//! rows in directory order. [`save_file`] writes to a temp sibling and
//! renames it into place, so a failed save never clobbers the previous
//! snapshot.

use crate::bank::Bank;
use crate::base::AccountKey;
use crate::coerce;
use crate::customer::Customer;
use crate::error::StoreError;
use csv::{ReaderBuilder, StringRecord, Trim, Writer};
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Snapshot column order.
const COLUMNS: [&str; 8] = [
    "id",
    "first_name",
    "last_name",
    "password",
    "checking",
    "savings",
    "active",
    "overdraft_count",
];

/// Balances are persisted with exactly this many decimal places.
const SNAPSHOT_DECIMALS: u32 = 2;

/// Header positions resolved once per file. Identity columns are
/// mandatory; value columns may be absent entirely.
struct ColumnIndex {
    id: usize,
    first_name: usize,
    last_name: usize,
    password: usize,
    checking: Option<usize>,
    savings: Option<usize>,
    active: Option<usize>,
    overdraft_count: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, StoreError> {
        let find = |column: &str| headers.iter().position(|header| header == column);
        let require = |column: &'static str| {
            find(column).ok_or(StoreError::MissingColumn { column })
        };
        Ok(ColumnIndex {
            id: require("id")?,
            first_name: require("first_name")?,
            last_name: require("last_name")?,
            password: require("password")?,
            checking: find("checking"),
            savings: find("savings"),
            active: find("active"),
            overdraft_count: find("overdraft_count"),
        })
    }
}

/// Builds one customer from a row, coercing every value cell.
fn customer_from_record(
    columns: &ColumnIndex,
    record: &StringRecord,
) -> Result<Customer, StoreError> {
    let required = |index: usize, column: &'static str| {
        record.get(index).ok_or(StoreError::MissingColumn { column })
    };
    // Short rows and absent columns read as the empty cell.
    let cell = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or("");

    // A snapshot without an `active` column predates deactivation;
    // those customers are all considered active.
    let active = match columns.active {
        Some(index) => coerce::flag(record.get(index).unwrap_or("")),
        None => true,
    };

    Ok(Customer::from_snapshot(
        required(columns.id, "id")?,
        required(columns.first_name, "first_name")?,
        required(columns.last_name, "last_name")?,
        required(columns.password, "password")?,
        coerce::amount(cell(columns.checking)),
        coerce::amount(cell(columns.savings)),
        active,
        coerce::count(cell(columns.overdraft_count)),
    ))
}

/// Reads every row of a snapshot into customers, in file order.
pub(crate) fn read_customers<R: Read>(reader: R) -> Result<Vec<Customer>, StoreError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let columns = ColumnIndex::resolve(rdr.headers()?)?;
    let mut customers = Vec::new();
    for result in rdr.records() {
        let record = result?;
        customers.push(customer_from_record(&columns, &record)?);
    }
    Ok(customers)
}

/// Writes customers as a snapshot, header first, balances fixed to
/// two decimals.
pub(crate) fn write_customers<'a, W, I>(writer: W, customers: I) -> Result<(), StoreError>
where
    W: Write,
    I: IntoIterator<Item = &'a Customer>,
{
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for customer in customers {
        let checking = fixed(customer.account(AccountKey::Checking).balance());
        let savings = fixed(customer.account(AccountKey::Savings).balance());
        let active = customer.is_active().to_string();
        let overdrafts = customer.overdraft_count().to_string();
        wtr.write_record([
            customer.id().as_str(),
            customer.first_name(),
            customer.last_name(),
            customer.password(),
            checking.as_str(),
            savings.as_str(),
            active.as_str(),
            overdrafts.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Two-decimal balance cell, e.g. `-135.00`.
fn fixed(balance: Decimal) -> String {
    format!("{:.2}", balance.round_dp(SNAPSHOT_DECIMALS))
}

/// Loads the snapshot at `path` into the bank.
///
/// Returns the number of rows read.
pub fn load_file<P: AsRef<Path>>(bank: &mut Bank, path: P) -> Result<usize, StoreError> {
    let file = File::open(path.as_ref())?;
    bank.load_customers(BufReader::new(file))
}

/// Saves the bank's directory to `path`.
///
/// The snapshot is written to a temp sibling first and renamed over
/// the target, so an interrupted save leaves the previous snapshot
/// intact.
pub fn save_file<P: AsRef<Path>>(bank: &mut Bank, path: P) -> Result<(), StoreError> {
    let path = path.as_ref();
    let staged = path.with_extension("csv.tmp");

    let file = File::create(&staged)?;
    if let Err(err) = bank.save_customers(BufWriter::new(file)) {
        let _ = fs::remove_file(&staged);
        return Err(err);
    }
    fs::rename(&staged, path)?;
    Ok(())
}
