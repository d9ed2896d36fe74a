// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

//! Outbound change notifications.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::mcp::{Notification, RESOURCES_LIST_CHANGED};

/// Queues notifications for the MCP server to write to the client.
///
/// Sending never blocks. If the server side is gone the notification is dropped.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: UnboundedSender<Notification>,
}

impl ChangeNotifier {
    /// Creates a notifier and the receiver the server drains.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Tells the client its cached resource list is stale.
    pub fn notify_resources_changed(&self) {
        if self
            .tx
            .send(Notification::new(RESOURCES_LIST_CHANGED))
            .is_err()
        {
            debug!("Dropping resource list change notification: server gone");
        }
    }
}
