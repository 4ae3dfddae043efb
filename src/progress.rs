// Copyright 2026 fwmirror Contributors
// SPDX-License-Identifier: Apache-2.0

//! Progress event types and broadcast channel for mirror-run telemetry.
//!
//! The runner emits `MirrorEvent`s as it works; they flow through a
//! `tokio::sync::broadcast` channel to any subscriber (CLI status printer,
//! tests). When no subscriber exists, events are silently dropped.

use serde::{Deserialize, Serialize};

/// A progress event emitted during a mirror run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorEvent {
    /// The run this event belongs to.
    pub run_id: String,
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// The kind of progress event.
    pub event: MirrorEventKind,
}

/// The specific kind of progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MirrorEventKind {
    /// The run has started against a listing page.
    RunStarted { listing_url: String },
    /// The listing page yielded product links.
    ProductsEnumerated { count: usize, elapsed_ms: u64 },
    /// A product page was scanned for archive links.
    PageScanned { url: String, archives: usize },
    /// A product page (or the listing page) could not be harvested.
    PageFailed { url: String, reason: String },
    /// One archive was streamed to disk.
    FileRetrieved {
        url: String,
        file: String,
        bytes: u64,
    },
    /// One archive retrieval failed.
    RetrievalFailed { url: String, reason: String },
    /// The run finished; counters match the final report.
    RunComplete {
        attempted: usize,
        succeeded: usize,
        failed: usize,
        elapsed_ms: u64,
    },
}

/// Sender handle for emitting progress events.
pub type ProgressSender = tokio::sync::broadcast::Sender<MirrorEvent>;

/// Receiver handle for consuming progress events.
pub type ProgressReceiver = tokio::sync::broadcast::Receiver<MirrorEvent>;

/// Create a new progress broadcast channel with a bounded buffer.
///
/// 256 events covers a typical run (one start/complete pair plus one event
/// per page and per archive).
pub fn channel() -> (ProgressSender, ProgressReceiver) {
    tokio::sync::broadcast::channel(256)
}

/// Convenience helper: emit a progress event, silently ignoring send errors
/// (which occur when no receivers are listening).
pub fn emit(tx: &Option<ProgressSender>, run_id: &str, seq: &mut u64, event: MirrorEventKind) {
    if let Some(ref sender) = tx {
        *seq += 1;
        let _ = sender.send(MirrorEvent {
            run_id: run_id.to_string(),
            seq: *seq,
            event,
        });
    }
}
