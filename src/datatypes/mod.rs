mod body;
mod command_id;
mod command_status;
mod tlv;

pub use body::{
    BindBody, BindRespBody, Body, INTERFACE_VERSION_SMPP_34, MessageRespBody, SubmitSmBody,
};
pub use command_id::CommandId;
pub use command_status::CommandStatus;
pub use tlv::{Tlv, TlvValue, tags};

pub(crate) use tlv::{TlvKind, kind_of};
