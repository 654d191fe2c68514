//! Per-call error channel.
//!
//! A channel starts `Pending` and settles exactly once into a success, a typed
//! failure or a transport failure.

use crate::codec::domain::WireValue;
use crate::codec::frame::{self, DecodeLimits, Decoder};
use crate::common::buf::{WireBuf, WireReader};
use crate::common::error::{BoundaryError, BoundaryResult, TypedError, TypedErrorKind};

#[derive(Clone, Debug, PartialEq)]
pub enum CallState {
    Pending,
    Succeeded(Option<WireValue>),
    Failed(TypedError),
    TransportFailed(BoundaryError),
}

impl CallState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CallState::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallState::Pending => "pending",
            CallState::Succeeded(_) => "succeeded",
            CallState::Failed(_) => "failed",
            CallState::TransportFailed(_) => "transport_failed",
        }
    }

    pub fn into_result(self) -> BoundaryResult<Option<WireValue>> {
        match self {
            CallState::Pending => Err(BoundaryError::Unsettled),
            CallState::Succeeded(value) => Ok(value),
            CallState::Failed(err) => Err(BoundaryError::Domain(err)),
            CallState::TransportFailed(err) => Err(err),
        }
    }
}

#[derive(Debug)]
pub struct ErrorChannel {
    state: CallState,
}

impl ErrorChannel {
    pub fn new() -> Self {
        Self {
            state: CallState::Pending,
        }
    }

    pub fn state(&self) -> &CallState {
        &self.state
    }

    pub fn is_settled(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn succeed(&mut self, value: Option<WireValue>) -> BoundaryResult<()> {
        self.transition(CallState::Succeeded(value))
    }

    pub fn fail(&mut self, err: TypedError) -> BoundaryResult<()> {
        self.transition(CallState::Failed(err))
    }

    /// Record a transport failure. A `Domain` error passed here is still routed to `Failed`.
    pub fn transport(&mut self, err: BoundaryError) -> BoundaryResult<()> {
        match err {
            BoundaryError::Domain(typed) => self.fail(typed),
            other => self.transition(CallState::TransportFailed(other)),
        }
    }

    pub fn settle(&mut self, result: BoundaryResult<Option<WireValue>>) -> BoundaryResult<()> {
        match result {
            Ok(value) => self.succeed(value),
            Err(err) => self.transport(err),
        }
    }

    pub fn into_state(self) -> CallState {
        self.state
    }

    fn transition(&mut self, next: CallState) -> BoundaryResult<()> {
        if self.state.is_terminal() {
            return Err(BoundaryError::AlreadySettled);
        }
        self.state = next;
        Ok(())
    }
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Wire form of a typed error: u32 kind code, optional flag, optional payload frame.
pub fn encode_typed_error(err: &TypedError) -> BoundaryResult<Vec<u8>> {
    let mut buf = WireBuf::with_capacity(8);
    buf.put_u32(err.kind.code());
    match &err.payload {
        None => buf.put_u8(0),
        Some(payload) => {
            buf.put_u8(1);
            frame::write_value(payload, &mut buf)?;
        }
    }
    Ok(buf.into_vec())
}

pub fn decode_typed_error(bytes: &[u8], limits: DecodeLimits) -> BoundaryResult<TypedError> {
    let mut reader = WireReader::new(bytes);
    let kind = TypedErrorKind::from_code(reader.get_u32()?)
        .ok_or(BoundaryError::Malformed("unknown typed error kind"))?;
    let payload = match reader.get_u8()? {
        0 => None,
        1 => Some(Decoder::new(limits).read_value(&mut reader)?),
        _ => return Err(BoundaryError::Malformed("payload flag must be 0 or 1")),
    };
    reader.finish()?;
    Ok(TypedError { kind, payload })
}
