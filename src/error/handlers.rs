//! Error handlers
//!
//! Provides error logging and the mapping from errors to wire response codes.

use crate::error::types::{ProtocolError, ServerError};
use crate::protocol::responses;
use log::error;

/// Log a server error
pub fn handle_error(err: &ServerError) {
    error!("File Server Error: {}", err);
}

/// Convert error to a wire response code
pub fn error_to_response_code(err: &ServerError) -> u16 {
    match err {
        ServerError::Config(_) => responses::SERVICE_UNAVAILABLE,
        ServerError::Storage(_) => responses::ACTION_NOT_TAKEN,
        ServerError::Io(_) => responses::LOCAL_ERROR,
        ServerError::Protocol(e) => match e {
            ProtocolError::CommandTooLong(_) => responses::SYNTAX_ERROR,
            ProtocolError::PayloadTooLarge { .. } => responses::EXCEEDED_STORAGE,
            ProtocolError::Timeout => responses::SERVICE_UNAVAILABLE,
            ProtocolError::Io(_) => responses::CONNECTION_CLOSED,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    #[test]
    fn protocol_errors_map_to_client_codes() {
        let too_large = ServerError::from(ProtocolError::PayloadTooLarge { size: 10, max: 5 });
        assert_eq!(error_to_response_code(&too_large), 552);

        let long = ServerError::from(ProtocolError::CommandTooLong(9000));
        assert_eq!(error_to_response_code(&long), 500);

        let timeout = ServerError::from(ProtocolError::Timeout);
        assert_eq!(error_to_response_code(&timeout), 421);
    }

    #[test]
    fn storage_errors_map_to_action_not_taken() {
        let err = ServerError::from(StorageError::NotFound("a.txt".into()));
        assert_eq!(error_to_response_code(&err), 550);
    }
}
