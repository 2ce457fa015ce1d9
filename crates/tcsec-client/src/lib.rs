//! SDLS security client.
//!
//! [`SecurityClient`] turns a property list into engine configuration calls,
//! initializes the engine once, and then applies or removes security on TC
//! frames until it is shut down.
//!
//! ```no_run
//! use tcsec_client::SecurityClient;
//! use tcsec_engine::SimEngine;
//!
//! # fn main() -> tcsec_client::Result<()> {
//! let mut client = SecurityClient::new(SimEngine::new());
//! client.initialize([
//!     "cryptolib.sadb.type=inmemory",
//!     "cryptolib.crypto.type=libgcrypt",
//!     "cryptolib.tc.44.1.0.has_ecf=true",
//! ])?;
//! let wrapped = client.apply_security_hex("202c0408000001bd37")?;
//! let frame = client.process_security(&wrapped)?;
//! assert_eq!(frame.pdu.as_ref(), &[0x00, 0x01]);
//! client.shutdown()?;
//! # Ok(())
//! # }
//! ```

mod claim;
pub mod client;
pub mod error;
pub mod state;

pub use client::SecurityClient;
pub use error::{ClientError, EngineFailure, ErrorKind, Result};
pub use state::ClientState;
