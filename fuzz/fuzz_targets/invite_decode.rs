//! Fuzz target for Invite::decode
//!
//! Invites arrive out of band from untrusted channels (links, QR codes),
//! so the decoder must reject arbitrary bytes cleanly:
//! - No parser crashes or panics
//! - No oversized allocations from forged length prefixes
//! - Unknown versions fail with a typed error
//!
//! The fuzzer should NEVER panic. All invalid inputs must return an error.

#![no_main]

use blindpair_proto::Invite;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // This should never panic, only return Err for invalid data
    let _ = Invite::decode(data);
});
