use tcsec_config::{
    AccessManagerConfig, CoreConfig, ManagedParameter, ManagedParameterKey, RelationalDbConfig,
    RemoteCryptoServiceConfig,
};
use tcsec_frame::FrameRecord;

use crate::error::Result;
use crate::status::EngineStatus;

/// The SDLS engine call interface.
///
/// Configuration calls, `init` and `shutdown` mutate engine state and take
/// `&mut self`. `apply_security` and `process_security` take `&self`; whether
/// they may run concurrently is up to the implementation's `Sync` bound.
///
/// Configuration calls return `Err` only when the arguments could not be
/// handed to the engine at all. A status the engine itself reports is returned
/// as `Ok(status)`.
pub trait SdlsEngine {
    /// Whether the engine keeps process-wide state, so that at most one
    /// instance may be initialized per process.
    const PROCESS_GLOBAL: bool;

    fn configure_core(&mut self, core: &CoreConfig) -> Result<EngineStatus>;

    fn configure_database(&mut self, database: &RelationalDbConfig) -> Result<EngineStatus>;

    fn configure_remote_crypto_service(
        &mut self,
        service: &RemoteCryptoServiceConfig,
    ) -> Result<EngineStatus>;

    fn configure_access_manager(&mut self, access_manager: &AccessManagerConfig) -> Result<EngineStatus>;

    fn add_managed_parameter(
        &mut self,
        key: ManagedParameterKey,
        parameter: &ManagedParameter,
    ) -> Result<EngineStatus>;

    fn init(&mut self) -> EngineStatus;

    /// Apply security to `frame`. The engine may work on `frame` in place for
    /// the duration of the call; the returned buffer is newly allocated.
    fn apply_security(&self, frame: &mut [u8]) -> Result<Vec<u8>>;

    /// Remove security from `frame`, which must be exactly one frame long.
    fn process_security(&self, frame: &mut [u8]) -> Result<FrameRecord>;

    fn shutdown(&mut self) -> EngineStatus;

    /// Human-readable name for a status code.
    fn error_code_to_string(&self, status: EngineStatus) -> String;
}
