// ABOUTME: Defines SMPP v3.4 command status codes per specification Section 5.1.3
// ABOUTME: Unknown codes are carried verbatim so foreign statuses survive a round trip

use num_enum::{FromPrimitive, IntoPrimitive};

/// SMPP v3.4 Command Status Codes (Section 5.1.3)
///
/// The command_status field indicates the success or failure of an SMPP request.
/// Per SMPP v3.4 specification Section 2.2.1, this is a 4-octet field in the PDU header.
///
/// ## Usage Rules (Section 5.1.3)
/// - **Request PDUs**: carry command_status 0x00000000 (`Ok`)
/// - **Response PDUs**: carry the actual result code
///
/// Codes outside the enumerated set decode into [`CommandStatus::Other`] and
/// re-encode to the same value, so a status this crate does not know about is
/// passed through rather than rejected.
///
/// ## References
/// - SMPP v3.4 Specification Section 5.1.3 (SMPP Error Status Codes)
/// - SMPP v3.4 Specification Table 5-2 (Error Code Definitions)
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CommandStatus {
    /// No Error (ESME_ROK)
    Ok = 0x0000_0000,

    /// Message Length is invalid (ESME_RINVMSGLEN)
    InvalidMsgLength = 0x0000_0001,

    /// Command Length is invalid (ESME_RINVCMDLEN)
    InvalidCommandLength = 0x0000_0002,

    /// Invalid Command ID (ESME_RINVCMDID)
    InvalidCommandId = 0x0000_0003,

    /// Incorrect BIND Status for given command (ESME_RINVBNDSTS)
    IncorrectBindStatus = 0x0000_0004,

    /// ESME Already in Bound State (ESME_RALYBND)
    AlreadyBound = 0x0000_0005,

    /// Invalid Priority Flag (ESME_RINVPRTFLG)
    InvalidPriorityFlag = 0x0000_0006,

    /// Invalid Registered Delivery Flag (ESME_RINVREGDLVFLG)
    InvalidRegisteredDeliveryFlag = 0x0000_0007,

    /// System Error (ESME_RSYSERR)
    SystemError = 0x0000_0008,

    /// Invalid Source Address (ESME_RINVSRCADR)
    InvalidSourceAddress = 0x0000_000A,

    /// Invalid Destination Address (ESME_RINVDSTADR)
    InvalidDestinationAddress = 0x0000_000B,

    /// Message ID is invalid (ESME_RINVMSGID)
    InvalidMessageId = 0x0000_000C,

    /// Bind Failed (ESME_RBINDFAIL)
    BindFailed = 0x0000_000D,

    /// Invalid Password (ESME_RINVPASWD)
    InvalidPassword = 0x0000_000E,

    /// Invalid System ID (ESME_RINVSYSID)
    InvalidSystemId = 0x0000_000F,

    /// Cancel SM Failed (ESME_RCANCELFAIL)
    CancelSmFailed = 0x0000_0011,

    /// Replace SM Failed (ESME_RREPLACEFAIL)
    ReplaceSmFailed = 0x0000_0013,

    /// Message Queue Full (ESME_RMSGQFUL)
    MessageQueueFull = 0x0000_0014,

    /// Invalid Service Type (ESME_RINVSERTYP)
    InvalidServiceType = 0x0000_0015,

    /// Invalid esm_class field data (ESME_RINVESMCLASS)
    InvalidEsmClass = 0x0000_0043,

    /// Invalid destination address in submit to distribution list (ESME_RINVDSTADDR)
    InvalidDestinationInList = 0x0000_0044,

    /// submit_sm or submit_multi failed (ESME_RSUBMITFAIL)
    SubmitFailed = 0x0000_0045,

    /// Invalid Source address TON (ESME_RINVSRCTON)
    InvalidSourceTon = 0x0000_0048,

    /// Invalid Source address NPI (ESME_RINVSRCNPI)
    InvalidSourceNpi = 0x0000_0049,

    /// Invalid Destination address TON (ESME_RINVDSTTON)
    InvalidDestinationTon = 0x0000_0050,

    /// Invalid Destination address NPI (ESME_RINVDSTNPI)
    InvalidDestinationNpi = 0x0000_0051,

    /// Invalid system_type field (ESME_RINVSYSTYP)
    InvalidSystemType = 0x0000_0053,

    /// Invalid replace_if_present flag (ESME_RINVREPFLAG)
    InvalidReplaceIfPresentFlag = 0x0000_0054,

    /// Invalid number of messages (ESME_RINVNUMMSGS)
    InvalidNumberOfMessages = 0x0000_0055,

    /// Throttling error, ESME has exceeded allowed message limits (ESME_RTHROTTLED)
    Throttled = 0x0000_0058,

    /// Invalid Scheduled Delivery Time (ESME_RINVSCHED)
    InvalidScheduledDeliveryTime = 0x0000_0061,

    /// Invalid message validity period (ESME_RINVEXPIRY)
    InvalidValidityPeriod = 0x0000_0062,

    /// Predefined Message Invalid or Not Found (ESME_RINVDFTMSGID)
    InvalidPredefinedMessage = 0x0000_0063,

    /// ESME Receiver Temporary App Error Code (ESME_RX_T_APPN)
    ReceiverTemporaryError = 0x0000_0064,

    /// ESME Receiver Permanent App Error Code (ESME_RX_P_APPN)
    ReceiverPermanentError = 0x0000_0065,

    /// ESME Receiver Reject Message Error Code (ESME_RX_R_APPN)
    ReceiverRejectError = 0x0000_0066,

    /// query_sm request failed (ESME_RQUERYFAIL)
    QueryFailed = 0x0000_0067,

    /// Error in the optional part of the PDU Body (ESME_RINVOPTPARSTREAM)
    InvalidOptionalParameters = 0x0000_00C0,

    /// Optional Parameter not allowed (ESME_ROPTPARNOTALLWD)
    OptionalParameterNotAllowed = 0x0000_00C1,

    /// Invalid Parameter Length (ESME_RINVPARLEN)
    InvalidParameterLength = 0x0000_00C2,

    /// Expected Optional Parameter missing (ESME_RMISSINGOPTPARAM)
    MissingOptionalParameter = 0x0000_00C3,

    /// Invalid Optional Parameter Value (ESME_RINVOPTPARAMVAL)
    InvalidOptionalParameterValue = 0x0000_00C4,

    /// Delivery Failure, used for data_sm_resp (ESME_RDELIVERYFAILURE)
    DeliveryFailure = 0x0000_00FE,

    /// Unknown Error (ESME_RUNKNOWNERR)
    UnknownError = 0x0000_00FF,

    /// Any status not enumerated above, preserved verbatim
    #[num_enum(catch_all)]
    Other(u32),
}

impl CommandStatus {
    /// Protocol-level name (`ESME_*`), or the hex code for unregistered statuses.
    pub fn name(self) -> String {
        let name = match self {
            CommandStatus::Ok => "ESME_ROK",
            CommandStatus::InvalidMsgLength => "ESME_RINVMSGLEN",
            CommandStatus::InvalidCommandLength => "ESME_RINVCMDLEN",
            CommandStatus::InvalidCommandId => "ESME_RINVCMDID",
            CommandStatus::IncorrectBindStatus => "ESME_RINVBNDSTS",
            CommandStatus::AlreadyBound => "ESME_RALYBND",
            CommandStatus::InvalidPriorityFlag => "ESME_RINVPRTFLG",
            CommandStatus::InvalidRegisteredDeliveryFlag => "ESME_RINVREGDLVFLG",
            CommandStatus::SystemError => "ESME_RSYSERR",
            CommandStatus::InvalidSourceAddress => "ESME_RINVSRCADR",
            CommandStatus::InvalidDestinationAddress => "ESME_RINVDSTADR",
            CommandStatus::InvalidMessageId => "ESME_RINVMSGID",
            CommandStatus::BindFailed => "ESME_RBINDFAIL",
            CommandStatus::InvalidPassword => "ESME_RINVPASWD",
            CommandStatus::InvalidSystemId => "ESME_RINVSYSID",
            CommandStatus::CancelSmFailed => "ESME_RCANCELFAIL",
            CommandStatus::ReplaceSmFailed => "ESME_RREPLACEFAIL",
            CommandStatus::MessageQueueFull => "ESME_RMSGQFUL",
            CommandStatus::InvalidServiceType => "ESME_RINVSERTYP",
            CommandStatus::InvalidEsmClass => "ESME_RINVESMCLASS",
            CommandStatus::InvalidDestinationInList => "ESME_RINVDSTADDR",
            CommandStatus::SubmitFailed => "ESME_RSUBMITFAIL",
            CommandStatus::InvalidSourceTon => "ESME_RINVSRCTON",
            CommandStatus::InvalidSourceNpi => "ESME_RINVSRCNPI",
            CommandStatus::InvalidDestinationTon => "ESME_RINVDSTTON",
            CommandStatus::InvalidDestinationNpi => "ESME_RINVDSTNPI",
            CommandStatus::InvalidSystemType => "ESME_RINVSYSTYP",
            CommandStatus::InvalidReplaceIfPresentFlag => "ESME_RINVREPFLAG",
            CommandStatus::InvalidNumberOfMessages => "ESME_RINVNUMMSGS",
            CommandStatus::Throttled => "ESME_RTHROTTLED",
            CommandStatus::InvalidScheduledDeliveryTime => "ESME_RINVSCHED",
            CommandStatus::InvalidValidityPeriod => "ESME_RINVEXPIRY",
            CommandStatus::InvalidPredefinedMessage => "ESME_RINVDFTMSGID",
            CommandStatus::ReceiverTemporaryError => "ESME_RX_T_APPN",
            CommandStatus::ReceiverPermanentError => "ESME_RX_P_APPN",
            CommandStatus::ReceiverRejectError => "ESME_RX_R_APPN",
            CommandStatus::QueryFailed => "ESME_RQUERYFAIL",
            CommandStatus::InvalidOptionalParameters => "ESME_RINVOPTPARSTREAM",
            CommandStatus::OptionalParameterNotAllowed => "ESME_ROPTPARNOTALLWD",
            CommandStatus::InvalidParameterLength => "ESME_RINVPARLEN",
            CommandStatus::MissingOptionalParameter => "ESME_RMISSINGOPTPARAM",
            CommandStatus::InvalidOptionalParameterValue => "ESME_RINVOPTPARAMVAL",
            CommandStatus::DeliveryFailure => "ESME_RDELIVERYFAILURE",
            CommandStatus::UnknownError => "ESME_RUNKNOWNERR",
            CommandStatus::Other(code) => return format!("{code:#010x}"),
        };
        name.to_string()
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}
