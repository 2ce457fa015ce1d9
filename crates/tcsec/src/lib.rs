//! Security for CCSDS telecommand transfer frames.
//!
//! tcsec configures an SDLS security engine from a flat list of cryptolib
//! properties, applies security to outgoing TC frames and removes it from
//! incoming ones, decoding the result into an owned frame model.
//!
//! # Crate Structure
//!
//! - [`frame`]: TC frame model, primary header codec, FECF and engine record mapping
//! - [`config`]: property parsing and the validated engine configuration
//! - [`engine`]: the engine call boundary (simulated engine, CryptoLib behind `cryptolib`)
//! - [`client`]: the security client lifecycle and error taxonomy

/// Re-export frame types.
pub mod frame {
    pub use tcsec_frame::*;
}

/// Re-export configuration types.
pub mod config {
    pub use tcsec_config::*;
}

/// Re-export engine types.
pub mod engine {
    pub use tcsec_engine::*;
}

/// Re-export client types.
pub mod client {
    pub use tcsec_client::*;
}

pub use tcsec_client::{ClientError, ErrorKind, SecurityClient};
