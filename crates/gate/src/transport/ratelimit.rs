// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection sliding-window admission check.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Length of the trailing window that `messages_per_minute` applies to.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window message counter owned by a single connection.
///
/// Holds the timestamps of admitted messages; at most `limit` of them ever
/// fall inside the trailing [`WINDOW`]. Expired entries are purged lazily on
/// each check.
#[derive(Debug)]
pub struct RateLimiter {
    limit: usize,
    window: VecDeque<Instant>,
}

impl RateLimiter {
    /// A limit of zero is raised to one so a connection can always make progress.
    pub fn new(messages_per_minute: u32) -> Self {
        let limit = messages_per_minute.max(1) as usize;
        Self { limit, window: VecDeque::with_capacity(limit) }
    }

    /// Admit one message now. Returns `false` when the window is full.
    pub fn allow(&mut self) -> bool {
        self.allow_at(Instant::now())
    }

    /// Admit one message at `now`. An entry leaves the window once it is a
    /// full [`WINDOW`] old.
    pub fn allow_at(&mut self, now: Instant) -> bool {
        while let Some(&oldest) = self.window.front() {
            if now.saturating_duration_since(oldest) >= WINDOW {
                self.window.pop_front();
            } else {
                break;
            }
        }

        if self.window.len() < self.limit {
            self.window.push_back(now);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
#[path = "ratelimit_tests.rs"]
mod tests;
