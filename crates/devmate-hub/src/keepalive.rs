// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-connection keep-alive loop.
//!
//! Waits on inbound traffic with a timeout. Idle expiry sends a ping frame
//! and re-arms; any inbound activity (content ignored) re-arms; stream end,
//! transport error, or a failed ping send terminates the loop. This is the
//! sole half-open-connection detector -- there is no pong tracking beyond
//! "did the send succeed".

use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::frame::Frame;

/// Idle window before a ping is emitted.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(25);

/// Drive one connection's keep-alive loop until it disconnects.
///
/// `inbound` yields one item per inbound message (content already
/// discarded); `tx` feeds the connection's forwarder task. Returns when the
/// peer closes, the transport errors (the caller maps both to a terminated
/// stream), or the forwarder is gone.
pub async fn run<S>(mut inbound: S, tx: mpsc::Sender<String>, idle: Duration)
where
    S: Stream<Item = ()> + Unpin,
{
    let ping = match Frame::Ping.encode() {
        Ok(ping) => ping,
        Err(_) => return,
    };

    loop {
        match tokio::time::timeout(idle, inbound.next()).await {
            // Inbound activity: reset the idle window.
            Ok(Some(())) => continue,
            // Peer closed or transport error.
            Ok(None) => {
                debug!("keep-alive loop: connection closed");
                break;
            }
            // Idle: probe the connection.
            Err(_) => {
                if tx.try_send(ping.clone()).is_err() {
                    debug!("keep-alive loop: forwarder gone");
                    break;
                }
            }
        }
    }
}
