//! Relay core: broadcast engine and per-connection ingress loop
//!
//! The [`RelayEngine`] durably appends each inbound message and then fans it
//! out to every registered connection on detached writer tasks. The ingress
//! loop reads frames from one connection, tags them with the sender's
//! identity, and feeds them to the engine.
//!
//! Delivery is best effort: `broadcast` returns once the append has
//! succeeded, without waiting for any peer write. A failed write is the
//! signal that a peer is gone and prunes it from the registry. There is no
//! backpressure and no bound on in-flight writer tasks per peer; a peer
//! that stops draining accumulates writers until its next write fails. A
//! bounded per-connection outbound queue is the extension point if that
//! ever matters at larger scale.

pub mod broadcast;
pub mod ingress;

pub use broadcast::RelayEngine;
pub use ingress::run_ingress;
