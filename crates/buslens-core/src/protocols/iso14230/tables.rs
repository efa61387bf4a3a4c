//! Service and negative response code names.

pub fn service_name(service: u8) -> Option<&'static str> {
    Some(match service {
        0x10 => "StartDiagnosticSession",
        0x11 => "ECUReset",
        0x12 => "ReadFreezeFrameData",
        0x13 => "ReadDiagnosticTroubleCodes",
        0x14 => "ClearDiagnosticInformation",
        0x17 => "ReadStatusOfDiagnosticTroubleCodes",
        0x18 => "ReadDiagnosticTroubleCodesByStatus",
        0x1A => "ReadECUIdentification",
        0x20 => "StopDiagnosticSession",
        0x21 => "ReadDataByLocalIdentifier",
        0x22 => "ReadDataByCommonIdentifier",
        0x23 => "ReadMemoryByAddress",
        0x26 => "SetDataRates",
        0x27 => "SecurityAccess",
        0x2C => "DynamicallyDefineLocalIdentifier",
        0x2E => "WriteDataByCommonIdentifier",
        0x2F => "InputOutputControlByCommonIdentifier",
        0x30 => "InputOutputControlByLocalIdentifier",
        0x31 => "StartRoutineByLocalIdentifier",
        0x32 => "StopRoutineByLocalIdentifier",
        0x33 => "RequestRoutineResultsByLocalIdentifier",
        0x34 => "RequestDownload",
        0x35 => "RequestUpload",
        0x36 => "TransferData",
        0x37 => "RequestTransferExit",
        0x38 => "StartRoutineByAddress",
        0x39 => "StopRoutineByAddress",
        0x3A => "RequestRoutineResultsByAddress",
        0x3B => "WriteDataByLocalIdentifier",
        0x3D => "WriteMemoryByAddress",
        0x3E => "TesterPresent",
        0x81 => "StartCommunication",
        0x82 => "StopCommunication",
        0x83 => "AccessTimingParameters",
        0x85 => "ControlDTCSetting",
        0x86 => "ResponseOnEvent",
        _ => return None,
    })
}

pub fn response_code_name(code: u8) -> Option<&'static str> {
    Some(match code {
        0x10 => "generalReject",
        0x11 => "serviceNotSupported",
        0x12 => "subFunctionNotSupported-invalidFormat",
        0x21 => "busy-repeatRequest",
        0x22 => "conditionsNotCorrect-requestSequenceError",
        0x23 => "routineNotComplete",
        0x31 => "requestOutOfRange",
        0x33 => "securityAccessDenied",
        0x35 => "invalidKey",
        0x36 => "exceedNumberOfAttempts",
        0x37 => "requiredTimeDelayNotExpired",
        0x40 => "downloadNotAccepted",
        0x41 => "improperDownloadType",
        0x42 => "canNotDownloadToSpecifiedAddress",
        0x43 => "canNotDownloadNumberOfBytesRequested",
        0x50 => "uploadNotAccepted",
        0x51 => "improperUploadType",
        0x52 => "canNotUploadFromSpecifiedAddress",
        0x53 => "canNotUploadNumberOfBytesRequested",
        0x71 => "transferSuspended",
        0x72 => "transferAborted",
        0x74 => "illegalAddressInBlockTransfer",
        0x75 => "illegalByteCountInBlockTransfer",
        0x76 => "illegalBlockTransferType",
        0x77 => "blockTransferDataChecksumError",
        0x78 => "requestCorrectlyReceived-responsePending",
        0x79 => "incorrectByteCountDuringBlockTransfer",
        0x80 => "serviceNotSupportedInActiveDiagnosticMode",
        _ => return None,
    })
}

/// Extra label for (service, sub-function) pairs worth calling out.
pub fn sub_function_suffix(service: u8, sub_function: Option<u8>) -> Option<&'static str> {
    match (service, sub_function?) {
        (0x10, 0x85) => Some("programming session"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{response_code_name, service_name, sub_function_suffix};

    #[test]
    fn known_and_unknown_services() {
        assert_eq!(service_name(0x81), Some("StartCommunication"));
        assert_eq!(service_name(0x3E), Some("TesterPresent"));
        assert_eq!(service_name(0x05), None);
    }

    #[test]
    fn response_codes() {
        assert_eq!(response_code_name(0x31), Some("requestOutOfRange"));
        assert_eq!(
            response_code_name(0x78),
            Some("requestCorrectlyReceived-responsePending")
        );
        assert_eq!(response_code_name(0x00), None);
    }

    #[test]
    fn programming_session_suffix() {
        assert_eq!(sub_function_suffix(0x10, Some(0x85)), Some("programming session"));
        assert_eq!(sub_function_suffix(0x10, Some(0x81)), None);
        assert_eq!(sub_function_suffix(0x10, None), None);
    }
}
