//! Fuzz target for the candidate response path
//!
//! Feeds arbitrary bytes to a live candidate's `handle_response`. Garbage
//! must surface as an error, leave the attempt pending and reusable, and
//! never be accepted as a granted key.

#![no_main]

use blindpair_core::{CandidateRequest, CandidateState, InviteOptions, create_invite_with_seed};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let created = create_invite_with_seed(&[0x01; 32], &[0x05; 32], &InviteOptions::default());
    let mut candidate =
        CandidateRequest::new(&created.invite, b"fuzz").expect("invite is well-formed");

    assert!(candidate.handle_response(data).is_err(), "garbage must never be accepted");
    assert_eq!(candidate.state(), CandidateState::Pending);
    assert!(candidate.key().is_none());
});
