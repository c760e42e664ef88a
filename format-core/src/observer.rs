// SPDX-License-Identifier: GPL-3.0-only

//! Workflow observers
//!
//! Observers are called inline by the workflow, so implementations must
//! return quickly and never block. `ChannelObserver` is the usual choice
//! when a separate UI loop renders the events.

use format_contracts::FormatEvent;
use tokio::sync::mpsc;

pub trait FormatObserver: Send + Sync {
    fn on_log(&self, _line: &str) {}

    fn on_progress(&self, _fraction: f64) {}
}

/// Ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FormatObserver for NoopObserver {}

/// Adapts a pair of closures
pub struct CallbackObserver<L, P> {
    on_log: L,
    on_progress: P,
}

impl<L, P> CallbackObserver<L, P>
where
    L: Fn(&str) + Send + Sync,
    P: Fn(f64) + Send + Sync,
{
    pub fn new(on_log: L, on_progress: P) -> Self {
        Self {
            on_log,
            on_progress,
        }
    }
}

impl<L, P> FormatObserver for CallbackObserver<L, P>
where
    L: Fn(&str) + Send + Sync,
    P: Fn(f64) + Send + Sync,
{
    fn on_log(&self, line: &str) {
        (self.on_log)(line);
    }

    fn on_progress(&self, fraction: f64) {
        (self.on_progress)(fraction);
    }
}

/// Forwards events over an unbounded channel
///
/// Sending never waits. Events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<FormatEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FormatEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FormatObserver for ChannelObserver {
    fn on_log(&self, line: &str) {
        let _ = self.tx.send(FormatEvent::Log(line.to_string()));
    }

    fn on_progress(&self, fraction: f64) {
        let _ = self.tx.send(FormatEvent::Progress(fraction));
    }
}
