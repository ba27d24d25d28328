/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Autosave worker thread.
//!
//! Holds the newest document snapshot handed to it and writes it to the
//! autosave slot on a fixed tick. Only the latest snapshot is kept between
//! ticks. Dropping the worker flushes and joins the thread.

use crate::persistence::DocumentStore;
use crate::persistence::document::Document;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Command to send to the autosave worker
pub enum AutosaveCommand {
    /// Replace the pending snapshot; `journal_sequence` is the last journal
    /// entry the document reflects
    Update {
        document: Document,
        journal_sequence: u64,
    },

    /// Write the pending snapshot now and acknowledge on `done`
    Flush { done: Sender<()> },

    /// Flush and stop the worker
    Shutdown,
}

/// Autosave task that runs on a background thread
pub struct AutosaveWorker {
    command_tx: Sender<AutosaveCommand>,
    handle: Option<JoinHandle<()>>,
}

impl AutosaveWorker {
    /// Create and start a new autosave worker
    pub fn spawn(store: Arc<Mutex<DocumentStore>>, interval: Duration) -> Self {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();

        let handle = thread::spawn(move || {
            run_autosave_worker(store, interval, command_rx);
        });

        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    /// Send a command to the autosave worker
    pub fn send_command(&self, command: AutosaveCommand) {
        let _ = self.command_tx.send(command);
    }

    pub fn update(&self, document: Document, journal_sequence: u64) {
        self.send_command(AutosaveCommand::Update {
            document,
            journal_sequence,
        });
    }

    /// Write the pending snapshot and wait for the worker to finish it
    pub fn flush(&self) -> bool {
        let (done, ack) = crossbeam_channel::bounded(1);
        if self.command_tx.send(AutosaveCommand::Flush { done }).is_err() {
            return false;
        }
        ack.recv().is_ok()
    }
}

impl Drop for AutosaveWorker {
    fn drop(&mut self) {
        self.send_command(AutosaveCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Autosave worker panicked");
            }
        }
    }
}

/// Run the autosave loop in a background thread
fn run_autosave_worker(
    store: Arc<Mutex<DocumentStore>>,
    interval: Duration,
    command_rx: Receiver<AutosaveCommand>,
) {
    let ticker = crossbeam_channel::tick(interval);
    let mut pending: Option<(Document, u64)> = None;

    loop {
        crossbeam_channel::select! {
            recv(command_rx) -> command => match command {
                Ok(AutosaveCommand::Update { document, journal_sequence }) => {
                    pending = Some((document, journal_sequence));
                },
                Ok(AutosaveCommand::Flush { done }) => {
                    write_pending(&store, &mut pending);
                    let _ = done.send(());
                },
                Ok(AutosaveCommand::Shutdown) | Err(_) => {
                    write_pending(&store, &mut pending);
                    return;
                },
            },
            recv(ticker) -> _ => write_pending(&store, &mut pending),
        }
    }
}

fn write_pending(store: &Mutex<DocumentStore>, pending: &mut Option<(Document, u64)>) {
    let Some((document, journal_sequence)) = pending.take() else {
        return;
    };
    if !document.has_content() {
        debug!("Skipping autosave of empty document {}", document.id);
        return;
    }
    if let Err(e) = store.lock().save_autosave(&document, journal_sequence) {
        warn!("Autosave failed: {e}");
    }
}
