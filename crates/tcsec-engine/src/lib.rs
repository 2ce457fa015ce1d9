//! The call boundary between the security client and an SDLS engine.
//!
//! [`SdlsEngine`] carries one method per engine call. Two implementations are
//! provided:
//! - [`CryptoLibEngine`] (feature `cryptolib`) drives the CryptoLib C API.
//! - [`SimEngine`] (feature `sim`) is an in-process stand-in that lays out
//!   security fields without any cryptography.

pub mod error;
pub mod limits;
pub mod status;
pub mod traits;

#[cfg(feature = "sim")]
pub mod sim;

#[cfg(all(unix, feature = "cryptolib"))]
pub mod cryptolib;
#[cfg(all(unix, feature = "cryptolib"))]
mod sys;

pub use error::{EngineError, Result};
pub use status::EngineStatus;
pub use traits::SdlsEngine;

#[cfg(feature = "sim")]
pub use sim::{SecurityAssociation, SimEngine};

#[cfg(all(unix, feature = "cryptolib"))]
pub use cryptolib::CryptoLibEngine;
