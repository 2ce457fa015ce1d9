use tcsec_config::{ConfigParser, EngineConfiguration};
use tcsec_engine::{EngineError, EngineStatus, SdlsEngine};
use tcsec_frame::{decode_tc_frame, encode_for_apply, TcFrame};

use crate::claim::EngineClaim;
use crate::error::{ClientError, EngineFailure, Result};
use crate::state::ClientState;

/// Owns one engine and drives it through a single configure, init, use and
/// shutdown cycle.
///
/// Engines that keep process-wide state (`SdlsEngine::PROCESS_GLOBAL`) can be
/// initialized by only one client at a time; a second client fails with
/// [`ClientError::EngineBusy`] until the first shuts down or is dropped.
pub struct SecurityClient<E: SdlsEngine> {
    engine: E,
    state: ClientState,
    configuration: Option<EngineConfiguration>,
    claim: Option<EngineClaim>,
    /// Set once the engine has accepted a configuration call.
    engine_touched: bool,
}

impl<E: SdlsEngine> SecurityClient<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: ClientState::Uninitialized,
            configuration: None,
            claim: None,
            engine_touched: false,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Configuration the engine was initialized with.
    pub fn configuration(&self) -> Option<&EngineConfiguration> {
        self.configuration.as_ref()
    }

    /// Parse `properties` with a default [`ConfigParser`] and initialize.
    pub fn initialize<I, S>(&mut self, properties: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.initialize_with(&ConfigParser::new(), properties)
    }

    pub fn initialize_with<I, S>(&mut self, parser: &ConfigParser, properties: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.require(ClientState::Uninitialized, "initialize")?;
        let configuration = parser.parse_entries(properties)?;
        self.initialize_configuration(configuration)
    }

    /// Initialize from an already built configuration.
    ///
    /// Errors raised before the first engine call leave the client
    /// `Uninitialized`. Once the engine has been called, any failure leaves it
    /// `Failed`.
    pub fn initialize_configuration(&mut self, configuration: EngineConfiguration) -> Result<()> {
        self.require(ClientState::Uninitialized, "initialize")?;
        if E::PROCESS_GLOBAL {
            let claim = EngineClaim::acquire().ok_or(ClientError::EngineBusy)?;
            self.claim = Some(claim);
        }

        self.state = ClientState::Initializing;
        match self.drive_engine(&configuration) {
            Ok(()) => {
                self.state = ClientState::Ready;
                tracing::info!(
                    managed_parameters = configuration.managed_parameters().len(),
                    "security client initialized"
                );
                self.configuration = Some(configuration);
                Ok(())
            }
            Err(err) => {
                self.state = ClientState::Failed;
                if self.engine_touched {
                    // Clear engine state before another client may claim it.
                    let status = self.engine.shutdown();
                    tracing::debug!(
                        status = status.code(),
                        "shut down engine after failed initialization"
                    );
                }
                self.claim = None;
                tracing::warn!(error = %err, "security client initialization failed");
                Err(err)
            }
        }
    }

    fn drive_engine(&mut self, configuration: &EngineConfiguration) -> Result<()> {
        let status = self
            .engine
            .configure_core(configuration.core())
            .map_err(ClientError::EngineArgument)?;
        self.engine_touched = true;
        self.note_status("core", status);

        if let Some(database) = configuration.database() {
            let status = self
                .engine
                .configure_database(database)
                .map_err(ClientError::EngineArgument)?;
            self.note_status("database", status);
        }

        if let Some(service) = configuration.crypto_service() {
            let status = self
                .engine
                .configure_remote_crypto_service(service)
                .map_err(ClientError::EngineArgument)?;
            self.note_status("crypto service", status);
        }

        let access_manager = configuration.access_manager();
        if access_manager.enabled {
            let status = self
                .engine
                .configure_access_manager(access_manager)
                .map_err(ClientError::EngineArgument)?;
            self.note_status("access manager", status);
        }

        for (key, parameter) in configuration.managed_parameters().iter() {
            let status = self
                .engine
                .add_managed_parameter(*key, parameter)
                .map_err(ClientError::EngineArgument)?;
            tracing::debug!(
                scid = key.scid,
                vcid = key.vcid,
                tfvn = key.tfvn,
                has_ecf = parameter.has_ecf,
                "added managed parameter"
            );
            self.note_status("managed parameter", status);
        }

        let status = self.engine.init();
        if !status.is_success() {
            return Err(ClientError::Initialization(self.failure(status)));
        }
        Ok(())
    }

    fn note_status(&self, call: &'static str, status: EngineStatus) {
        if status.is_success() {
            tracing::debug!(call, "engine configured");
        } else {
            tracing::warn!(
                call,
                status = status.code(),
                name = %self.engine.error_code_to_string(status),
                "engine configuration call reported failure"
            );
        }
    }

    fn failure(&self, status: EngineStatus) -> EngineFailure {
        EngineFailure {
            status,
            name: self.engine.error_code_to_string(status),
        }
    }

    fn require(&self, expected: ClientState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ClientError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn check_frame(frame: &[u8]) -> Result<()> {
        if frame.is_empty() {
            return Err(ClientError::NoFrameData);
        }
        if frame.len() > usize::from(u16::MAX) {
            return Err(ClientError::BadDataFormat(format!(
                "frame of {} bytes exceeds {} bytes",
                frame.len(),
                u16::MAX
            )));
        }
        Ok(())
    }

    fn map_call_error(&self, err: EngineError, wrap: fn(EngineFailure) -> ClientError) -> ClientError {
        match err {
            EngineError::Status(status) => wrap(self.failure(status)),
            EngineError::FrameTooLong { .. } => ClientError::BadDataFormat(err.to_string()),
            EngineError::Frame(frame) => ClientError::FrameDecode(frame),
            other => ClientError::EngineArgument(other),
        }
    }

    /// Apply security to a raw TC frame. Returns the wrapped frame.
    pub fn apply_security(&self, frame: &[u8]) -> Result<Vec<u8>> {
        self.require(ClientState::Ready, "apply_security")?;
        Self::check_frame(frame)?;
        let mut buffer = encode_for_apply(frame)?;
        self.engine
            .apply_security(&mut buffer)
            .map_err(|err| self.map_call_error(err, ClientError::ApplySecurity))
    }

    /// Remove security from a wrapped TC frame and decode it.
    ///
    /// `frame` must hold exactly one frame; trailing bytes are handed to the
    /// engine as part of it.
    pub fn process_security(&self, frame: &[u8]) -> Result<TcFrame> {
        self.require(ClientState::Ready, "process_security")?;
        Self::check_frame(frame)?;
        let mut buffer = frame.to_vec();
        let record = self
            .engine
            .process_security(&mut buffer)
            .map_err(|err| self.map_call_error(err, ClientError::ProcessSecurity))?;
        Ok(decode_tc_frame(&record)?)
    }

    pub fn apply_security_hex(&self, frame: &str) -> Result<Vec<u8>> {
        self.apply_security(&decode_hex(frame)?)
    }

    pub fn process_security_hex(&self, frame: &str) -> Result<TcFrame> {
        self.process_security(&decode_hex(frame)?)
    }

    /// Shut the engine down and return its status.
    pub fn shutdown(&mut self) -> Result<EngineStatus> {
        self.require(ClientState::Ready, "shutdown")?;
        self.state = ClientState::ShuttingDown;
        let status = self.engine.shutdown();
        self.state = ClientState::Shutdown;
        self.claim = None;
        if status.is_success() {
            tracing::info!("security client shut down");
        } else {
            tracing::warn!(
                status = status.code(),
                name = %self.engine.error_code_to_string(status),
                "engine shutdown reported failure"
            );
        }
        Ok(status)
    }
}

impl<E: SdlsEngine> Drop for SecurityClient<E> {
    fn drop(&mut self) {
        if self.state == ClientState::Ready {
            let status = self.engine.shutdown();
            tracing::debug!(status = status.code(), "shut down engine on drop");
        }
    }
}

impl<E: SdlsEngine> std::fmt::Debug for SecurityClient<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityClient")
            .field("state", &self.state)
            .field("process_global", &E::PROCESS_GLOBAL)
            .field("claimed", &self.claim.is_some())
            .finish()
    }
}

fn decode_hex(frame: &str) -> Result<Vec<u8>> {
    hex::decode(frame.trim())
        .map_err(|err| ClientError::BadDataFormat(format!("invalid hex frame: {err}")))
}
