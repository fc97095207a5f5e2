//! Linked drop pools for bughouse.
//!
//! A capture on one board hands the captured piece to the partner board, in
//! the pool of the captured piece's color. Each board owns an outbox that is
//! the partner's inbox. Transfers are applied when the receiving side calls
//! [`Game::sync_partner_drops`](crate::Game::sync_partner_drops).
//!
//! Rolling back a capture does not retract a piece that was already sent.

use chess_core::{Color, PieceType};
use std::sync::{Arc, Mutex};

type Pools = [[i32; 6]; 2];

/// One endpoint of a linked board pair.
#[derive(Debug, Clone)]
pub struct BughouseLink {
    outbox: Arc<Mutex<Pools>>,
    inbox: Arc<Mutex<Pools>>,
}

impl BughouseLink {
    /// Creates two endpoints wired to each other.
    pub fn pair() -> (BughouseLink, BughouseLink) {
        let a_to_b = Arc::new(Mutex::new([[0; 6]; 2]));
        let b_to_a = Arc::new(Mutex::new([[0; 6]; 2]));
        (
            BughouseLink {
                outbox: Arc::clone(&a_to_b),
                inbox: Arc::clone(&b_to_a),
            },
            BughouseLink {
                outbox: b_to_a,
                inbox: a_to_b,
            },
        )
    }

    /// Queues one piece for the partner's `color` pool.
    pub(crate) fn send(&self, color: Color, kind: PieceType) {
        let mut outbox = self.outbox.lock().unwrap_or_else(|e| e.into_inner());
        outbox[color.index()][kind.index()] += 1;
    }

    /// Takes every piece the partner has queued for this board.
    pub(crate) fn take(&self) -> Pools {
        let mut inbox = self.inbox.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *inbox, [[0; 6]; 2])
    }

    /// Returns true if both endpoints share the same mailboxes.
    pub fn same_link(&self, other: &BughouseLink) -> bool {
        Arc::ptr_eq(&self.outbox, &other.outbox) && Arc::ptr_eq(&self.inbox, &other.inbox)
    }
}
