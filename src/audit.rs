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

//! The append-only audit trail.
//!
//! Every successful mutating operation leaves an [`AuditEvent`] on the
//! engine's in-memory trail; rejected operations leave nothing. The
//! trail is drained to an [`AuditSink`] when the caller decides to
//! persist, typically [`FileAuditSink`] writing one JSON object per
//! line:
//!
//! ```text
//! {"ts":"2026-08-23T14:07:11.042Z","type":"withdraw","acct":"checking","active":true,...}
//! ```
//!
//! Timestamps are UTC and serialize as RFC 3339. Money fields
//! serialize as strings, matching the decimal convention used across
//! the crate.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Kinds of events recorded on the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    /// Snapshot loads/saves and enrollment
    System,
    /// Logins and logouts
    Auth,
    Deposit,
    Withdraw,
    /// Movement between one customer's own accounts
    TransferSelf,
    /// Movement from the session owner to another customer
    TransferOther,
}

impl AuditKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Auth => "auth",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::TransferSelf => "transfer_self",
            Self::TransferOther => "transfer_other",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One record on the trail.
///
/// Serializes flat: the timestamp and kind first, then the
/// event-specific detail fields spliced into the same object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditEvent {
    pub ts: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: AuditKind,
    #[serde(flatten)]
    pub detail: Map<String, Value>,
}

impl AuditEvent {
    pub(crate) fn now(kind: AuditKind, detail: Map<String, Value>) -> Self {
        Self {
            ts: Utc::now(),
            kind,
            detail,
        }
    }

    /// Looks up one detail field by name.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.detail.get(key)
    }
}

/// Destination for drained audit events.
pub trait AuditSink {
    /// Records one event.
    fn append(&mut self, event: &AuditEvent) -> Result<(), StoreError>;

    /// Pushes buffered events to durable storage.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Appends events to a log file, one JSON object per line.
///
/// The file is opened in append mode and never truncated, so restarts
/// extend the existing history.
#[derive(Debug)]
pub struct FileAuditSink {
    writer: BufWriter<File>,
}

impl FileAuditSink {
    /// Opens `path` for appending, creating the file if missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn append(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        let line = serde_json::to_string(event)?;
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for FileAuditSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Collects events in memory, for embedders and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Vec<AuditEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[AuditEvent] {
        &self.events
    }
}

impl AuditSink for MemorySink {
    fn append(&mut self, event: &AuditEvent) -> Result<(), StoreError> {
        self.events.push(event.clone());
        Ok(())
    }
}
