//! Debug tools for volsense - TCP inspection server for a running sensor
//!
//! Start the debug server in your app:
//! ```ignore
//! let handler = Arc::new(Mutex::new(MyHandler::new()));
//! let server = DebugServer::start(handler, DEFAULT_PORT).await?;
//! ```
//!
//! Each request is one JSON line, e.g. `{"cmd":"GetStats"}`, answered by
//! one JSON line.

pub mod protocol;
pub mod server;

pub use protocol::*;
pub use server::{DebugHandler, DebugServer};

/// Default debug server port
pub const DEFAULT_PORT: u16 = 9743;
