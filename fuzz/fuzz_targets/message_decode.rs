//! Fuzz target for every strict message decoder
//!
//! Requests and responses are attacker-controlled wire input; persisted
//! requests come from disk that may be corrupt. Decoding arbitrary bytes
//! must fail cleanly, never panic or over-allocate.

#![no_main]

use blindpair_proto::{
    InviteData, InviteReceipt, InviteRequest, InviteResponse, PersistedRequest, RequestPayload,
    ResponsePayload,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = RequestPayload::decode(data);
    let _ = ResponsePayload::decode(data);
    let _ = InviteRequest::decode(data);
    let _ = InviteResponse::decode(data);
    let _ = InviteData::decode(data);
    let _ = InviteReceipt::decode(data);
    let _ = PersistedRequest::decode(data);
});
