//! Status codes reported by [`super::SimEngine`].

use crate::status::EngineStatus;

pub const SIM_SUCCESS: EngineStatus = EngineStatus::SUCCESS;
pub const SIM_ERR_NOT_CONFIGURED: EngineStatus = EngineStatus(-1);
pub const SIM_ERR_SADB_NOT_CONFIGURED: EngineStatus = EngineStatus(-2);
pub const SIM_ERR_CRYPTO_NOT_CONFIGURED: EngineStatus = EngineStatus(-3);
pub const SIM_ERR_NO_MANAGED_PARAMETERS: EngineStatus = EngineStatus(-4);
pub const SIM_ERR_ALREADY_INITIALIZED: EngineStatus = EngineStatus(-5);
pub const SIM_ERR_NOT_INITIALIZED: EngineStatus = EngineStatus(-6);
pub const SIM_ERR_DUPLICATE_MANAGED_PARAMETER: EngineStatus = EngineStatus(-7);
pub const SIM_ERR_FRAME_TOO_SHORT: EngineStatus = EngineStatus(-8);
pub const SIM_ERR_FRAME_LENGTH_MISMATCH: EngineStatus = EngineStatus(-9);
pub const SIM_ERR_NO_MANAGED_PARAMETER_FOR_CHANNEL: EngineStatus = EngineStatus(-10);
pub const SIM_ERR_NO_SECURITY_ASSOCIATION: EngineStatus = EngineStatus(-11);
pub const SIM_ERR_SA_NOT_OPERATIONAL: EngineStatus = EngineStatus(-12);
pub const SIM_ERR_FRAME_TOO_LONG: EngineStatus = EngineStatus(-13);
pub const SIM_ERR_INVALID_FECF: EngineStatus = EngineStatus(-14);
pub const SIM_ERR_MAC_VERIFICATION_FAILED: EngineStatus = EngineStatus(-15);
pub const SIM_ERR_ANTIREPLAY: EngineStatus = EngineStatus(-16);

const NAMES: &[(EngineStatus, &str)] = &[
    (SIM_SUCCESS, "SIM_SUCCESS"),
    (SIM_ERR_NOT_CONFIGURED, "SIM_ERR_NOT_CONFIGURED"),
    (SIM_ERR_SADB_NOT_CONFIGURED, "SIM_ERR_SADB_NOT_CONFIGURED"),
    (SIM_ERR_CRYPTO_NOT_CONFIGURED, "SIM_ERR_CRYPTO_NOT_CONFIGURED"),
    (SIM_ERR_NO_MANAGED_PARAMETERS, "SIM_ERR_NO_MANAGED_PARAMETERS"),
    (SIM_ERR_ALREADY_INITIALIZED, "SIM_ERR_ALREADY_INITIALIZED"),
    (SIM_ERR_NOT_INITIALIZED, "SIM_ERR_NOT_INITIALIZED"),
    (SIM_ERR_DUPLICATE_MANAGED_PARAMETER, "SIM_ERR_DUPLICATE_MANAGED_PARAMETER"),
    (SIM_ERR_FRAME_TOO_SHORT, "SIM_ERR_FRAME_TOO_SHORT"),
    (SIM_ERR_FRAME_LENGTH_MISMATCH, "SIM_ERR_FRAME_LENGTH_MISMATCH"),
    (SIM_ERR_NO_MANAGED_PARAMETER_FOR_CHANNEL, "SIM_ERR_NO_MANAGED_PARAMETER_FOR_CHANNEL"),
    (SIM_ERR_NO_SECURITY_ASSOCIATION, "SIM_ERR_NO_SECURITY_ASSOCIATION"),
    (SIM_ERR_SA_NOT_OPERATIONAL, "SIM_ERR_SA_NOT_OPERATIONAL"),
    (SIM_ERR_FRAME_TOO_LONG, "SIM_ERR_FRAME_TOO_LONG"),
    (SIM_ERR_INVALID_FECF, "SIM_ERR_INVALID_FECF"),
    (SIM_ERR_MAC_VERIFICATION_FAILED, "SIM_ERR_MAC_VERIFICATION_FAILED"),
    (SIM_ERR_ANTIREPLAY, "SIM_ERR_ANTIREPLAY"),
];

pub(crate) fn name(status: EngineStatus) -> String {
    NAMES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("SIM_UNKNOWN_STATUS_{}", status.code()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_is_named_once() {
        for (i, (code, _)) in NAMES.iter().enumerate() {
            assert!(NAMES[i + 1..].iter().all(|(other, _)| other != code));
        }
        assert_eq!(name(SIM_ERR_INVALID_FECF), "SIM_ERR_INVALID_FECF");
        assert_eq!(name(EngineStatus(-999)), "SIM_UNKNOWN_STATUS_-999");
    }
}
