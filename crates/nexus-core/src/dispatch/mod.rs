//! C4/C5: method dispatch, the paired-session lifecycle, the pairing
//! accept loop, and the connection watchdog.

pub mod communicator;
pub mod pairing;
pub mod session;
pub mod slot;
pub mod watchdog;

pub use pairing::{accept_loop, SessionTable, SlotTable};
