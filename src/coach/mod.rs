// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Mark Wells <contact@markwells.dev>

/// Static prompt, tool and resource descriptors and argument validation.
pub mod catalog;
/// Dispatcher implementing the MCP request handler.
mod handler;
/// In-memory note storage.
mod notes;
/// Resource list change notifications.
mod notifier;

pub use handler::{CoachHandler, note_name_from_uri, note_uri};
pub use notes::{Note, NoteStore};
pub use notifier::ChangeNotifier;
