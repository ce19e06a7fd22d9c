//! Wire messages exchanged during the invite handshake.
//!
//! Every type here follows the same contract: `encoded_len()` is the exact
//! size pre-pass, `encode_into()` writes into a buffer of at least that
//! capacity, `encode()` does both with a single allocation, and `decode()`
//! strictly consumes one whole message (trailing bytes fail).
//!
//! # Invariants
//!
//! - Field order is normative. These encodings are the interoperability
//!   surface of the protocol and must stay byte-stable.
//! - Optional fields are gated by flag bits; unknown flag bits are ignored
//!   on decode so future revisions can extend a message without breaking
//!   older peers.
//! - Decoding never trusts a length prefix further than the bytes actually
//!   present.

use bytes::Bytes;

use crate::{
    errors::{Result, WireError},
    wire::{Decoder, buffer_len, uint_len, write_buffer, write_uint},
};

/// The single invite wire version this implementation speaks.
pub const INVITE_VERSION: u64 = 1;

/// Invite flag: discovery key present.
const INVITE_FLAG_DISCOVERY_KEY: u64 = 1;
/// Invite flag: expiry timestamp present.
const INVITE_FLAG_EXPIRES: u64 = 2;
/// Invite flag: seed should not be retained after use.
const INVITE_FLAG_SENSITIVE: u64 = 4;

/// Out-of-band invite: the capability that lets a candidate construct a
/// request against a protected key.
///
/// `seed` deterministically derives the one-time invite signing keypair.
/// The discovery key is a public derivative of the protected key used for
/// routing and for the candidate's acceptance binding check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    /// 32-byte seed for the one-time invite keypair. Knowing it is the
    /// capability.
    pub seed: [u8; 32],
    /// Discovery key of the protected key this invite redeems.
    pub discovery_key: Option<[u8; 32]>,
    /// Advisory expiry as whole seconds since the Unix epoch. Not enforced
    /// by the handshake.
    pub expires: Option<u32>,
    /// Marks invites whose seed the holder should drop after constructing a
    /// request.
    pub sensitive: bool,
}

impl Invite {
    fn flags(&self) -> u64 {
        let mut flags = 0;
        if self.discovery_key.is_some() {
            flags |= INVITE_FLAG_DISCOVERY_KEY;
        }
        if self.expires.is_some() {
            flags |= INVITE_FLAG_EXPIRES;
        }
        if self.sensitive {
            flags |= INVITE_FLAG_SENSITIVE;
        }
        flags
    }

    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        let mut len = uint_len(INVITE_VERSION) + uint_len(self.flags()) + 32;
        if self.discovery_key.is_some() {
            len += 32;
        }
        if self.expires.is_some() {
            len += 4;
        }
        len
    }

    /// Write the invite to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        write_uint(buf, INVITE_VERSION);
        write_uint(buf, self.flags());
        buf.extend_from_slice(&self.seed);
        if let Some(discovery_key) = &self.discovery_key {
            buf.extend_from_slice(discovery_key);
        }
        if let Some(expires) = self.expires {
            buf.extend_from_slice(&expires.to_le_bytes());
        }
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }

    /// Strictly decode one invite.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnknownInviteVersion`] for any version other than 1
    /// - [`WireError::UnexpectedEof`] / [`WireError::TrailingBytes`] for
    ///   malformed input
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);

        let version = dec.uint()?;
        if version != INVITE_VERSION {
            return Err(WireError::UnknownInviteVersion(version));
        }

        let flags = dec.uint()?;
        let seed = dec.fixed32()?;
        let discovery_key =
            if flags & INVITE_FLAG_DISCOVERY_KEY != 0 { Some(dec.fixed32()?) } else { None };
        let expires = if flags & INVITE_FLAG_EXPIRES != 0 { Some(dec.u32_le()?) } else { None };
        let sensitive = flags & INVITE_FLAG_SENSITIVE != 0;

        dec.finish()?;
        Ok(Self { seed, discovery_key, expires, sensitive })
    }
}

/// Status code carried by a [`ResponsePayload`].
///
/// Code 0 grants the request; every other code is a rejection. Codes this
/// implementation does not know decode to [`ResponseStatus::Other`] and
/// still behave as rejections, so newer members can introduce statuses
/// without breaking older candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    /// Request granted; the protected key follows.
    Granted,
    /// Member explicitly rejected the request.
    Rejected,
    /// The invite was already redeemed.
    InviteUsed,
    /// The invite expired before the request arrived.
    InviteExpired,
    /// Unrecognized non-zero status code.
    Other(u64),
}

impl ResponseStatus {
    /// Wire code for this status.
    pub fn code(self) -> u64 {
        match self {
            Self::Granted => 0,
            Self::Rejected => 1,
            Self::InviteUsed => 2,
            Self::InviteExpired => 3,
            Self::Other(code) => code,
        }
    }

    /// Map a wire code to a status.
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => Self::Granted,
            1 => Self::Rejected,
            2 => Self::InviteUsed,
            3 => Self::InviteExpired,
            other => Self::Other(other),
        }
    }

    /// True only for status code 0.
    pub fn is_granted(self) -> bool {
        self.code() == 0
    }
}

/// Fast-forward hint attached to a granted response: lets the candidate
/// skip ahead in a related log structure. Opaque to the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastForwardTo {
    /// Key of the log to fast-forward.
    pub key: [u8; 32],
    /// Target length within that log.
    pub length: u64,
}

/// Reserved flags value written ahead of a fast-forward hint.
const FAST_FORWARD_FLAGS: u64 = 1;

impl FastForwardTo {
    fn encoded_len(&self) -> usize {
        uint_len(FAST_FORWARD_FLAGS) + 32 + uint_len(self.length)
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        write_uint(buf, FAST_FORWARD_FLAGS);
        buf.extend_from_slice(&self.key);
        write_uint(buf, self.length);
    }

    fn decode_from(dec: &mut Decoder<'_>) -> Result<Self> {
        let _flags = dec.uint()?; // reserved
        Ok(Self { key: dec.fixed32()?, length: dec.uint()? })
    }
}

/// The candidate's encrypted request payload: session token plus the auth
/// envelope ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPayload {
    /// Per-attempt session token (not secret on the wire).
    pub session: Bytes,
    /// AEAD ciphertext of the signed user data.
    pub data: Bytes,
}

impl RequestPayload {
    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        buffer_len(&self.session) + buffer_len(&self.data)
    }

    /// Write the payload to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        write_buffer(buf, &self.session);
        write_buffer(buf, &self.data);
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }

    /// Strictly decode one payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let payload = Self::decode_from(&mut dec)?;
        dec.finish()?;
        Ok(payload)
    }

    pub(crate) fn decode_from(dec: &mut Decoder<'_>) -> Result<Self> {
        Ok(Self { session: dec.buffer()?, data: dec.buffer()? })
    }
}

/// Response flag: encryption key present.
const RESPONSE_FLAG_ENCRYPTION_KEY: u64 = 1;
/// Response flag: fast-forward hint present.
const RESPONSE_FLAG_FAST_FORWARD: u64 = 2;
/// Response flag: free-form data present.
const RESPONSE_FLAG_DATA: u64 = 4;

/// Plaintext of the member's response envelope.
///
/// A non-zero status encodes nothing beyond the status code itself, so a
/// rejection reveals no structure. A grant carries the protected key and
/// whatever optional extras the member attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
    /// Status 0: the request was granted.
    Granted {
        /// The protected key the invite was issued for.
        key: [u8; 32],
        /// Optional secondary encryption key.
        encryption_key: Option<[u8; 32]>,
        /// Optional free-form data from the member.
        data: Option<Bytes>,
        /// Optional fast-forward hint.
        fast_forward_to: Option<FastForwardTo>,
    },
    /// Non-zero status: the request was denied.
    Denied {
        /// Why the member denied the request. Never
        /// [`ResponseStatus::Granted`].
        status: ResponseStatus,
    },
}

impl ResponsePayload {
    fn granted_flags(
        encryption_key: Option<&[u8; 32]>,
        data: Option<&Bytes>,
        fast_forward_to: Option<&FastForwardTo>,
    ) -> u64 {
        let mut flags = 0;
        if encryption_key.is_some() {
            flags |= RESPONSE_FLAG_ENCRYPTION_KEY;
        }
        if fast_forward_to.is_some() {
            flags |= RESPONSE_FLAG_FAST_FORWARD;
        }
        if data.is_some() {
            flags |= RESPONSE_FLAG_DATA;
        }
        flags
    }

    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Granted { key: _, encryption_key, data, fast_forward_to } => {
                let flags =
                    Self::granted_flags(encryption_key.as_ref(), data.as_ref(), fast_forward_to.as_ref());
                let mut len = uint_len(0) + uint_len(flags) + 32;
                if encryption_key.is_some() {
                    len += 32;
                }
                if let Some(fast_forward_to) = fast_forward_to {
                    len += fast_forward_to.encoded_len();
                }
                if let Some(data) = data {
                    len += buffer_len(data);
                }
                len
            },
            Self::Denied { status } => uint_len(status.code()),
        }
    }

    /// Write the payload to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Granted { key, encryption_key, data, fast_forward_to } => {
                write_uint(buf, 0);
                write_uint(
                    buf,
                    Self::granted_flags(encryption_key.as_ref(), data.as_ref(), fast_forward_to.as_ref()),
                );
                buf.extend_from_slice(key);
                if let Some(encryption_key) = encryption_key {
                    buf.extend_from_slice(encryption_key);
                }
                if let Some(fast_forward_to) = fast_forward_to {
                    fast_forward_to.encode_into(buf);
                }
                if let Some(data) = data {
                    write_buffer(buf, data);
                }
            },
            Self::Denied { status } => {
                debug_assert_ne!(status.code(), 0, "denials must carry a non-zero status");
                write_uint(buf, status.code());
            },
        }
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }

    /// Strictly decode one payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);

        let status = dec.uint()?;
        if status != 0 {
            dec.finish()?;
            return Ok(Self::Denied { status: ResponseStatus::from_code(status) });
        }

        let flags = dec.uint()?;
        let key = dec.fixed32()?;
        let encryption_key =
            if flags & RESPONSE_FLAG_ENCRYPTION_KEY != 0 { Some(dec.fixed32()?) } else { None };
        let fast_forward_to = if flags & RESPONSE_FLAG_FAST_FORWARD != 0 {
            Some(FastForwardTo::decode_from(&mut dec)?)
        } else {
            None
        };
        let data = if flags & RESPONSE_FLAG_DATA != 0 { Some(dec.buffer()?) } else { None };

        dec.finish()?;
        Ok(Self::Granted { key, encryption_key, data, fast_forward_to })
    }
}

/// Candidate-to-member wire message: invite routing id plus the encrypted
/// request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRequest {
    /// Invite id (hash of the invite public key); routes the request, never
    /// a security boundary.
    pub id: [u8; 32],
    /// The encrypted request payload.
    pub payload: RequestPayload,
}

impl InviteRequest {
    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        32 + self.payload.encoded_len()
    }

    /// Write the request to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.id);
        self.payload.encode_into(buf);
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }

    /// Strictly decode one request.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let id = dec.fixed32()?;
        let payload = RequestPayload::decode_from(&mut dec)?;
        dec.finish()?;
        Ok(Self { id, payload })
    }
}

/// Member-to-candidate wire message: correlation id plus the encrypted
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteResponse {
    /// Request id derived from the session token; correlates the response
    /// with the originating attempt.
    pub id: [u8; 32],
    /// AEAD ciphertext of the [`ResponsePayload`].
    pub payload: Bytes,
}

impl InviteResponse {
    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        32 + buffer_len(&self.payload)
    }

    /// Write the response to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.id);
        write_buffer(buf, &self.payload);
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }

    /// Strictly decode one response.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let id = dec.fixed32()?;
        let payload = dec.buffer()?;
        dec.finish()?;
        Ok(Self { id, payload })
    }
}

/// Plaintext inside the auth envelope: the candidate's signature over the
/// auth data, plus the user data itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteData {
    /// Ed25519 signature over the encoded [`AuthData`].
    pub signature: [u8; 64],
    /// The candidate's user data.
    pub user_data: Bytes,
}

impl InviteData {
    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        64 + buffer_len(&self.user_data)
    }

    /// Write to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.signature);
        write_buffer(buf, &self.user_data);
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }

    /// Strictly decode.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let signature = dec.fixed64()?;
        let user_data = dec.buffer()?;
        dec.finish()?;
        Ok(Self { signature, user_data })
    }
}

/// The message the candidate signs: session token plus user data, encoded
/// with length prefixes so neither field can masquerade as the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthData {
    /// Session token bytes.
    pub session: Bytes,
    /// User data bytes.
    pub user_data: Bytes,
}

impl AuthData {
    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        buffer_len(&self.session) + buffer_len(&self.user_data)
    }

    /// Write to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        write_buffer(buf, &self.session);
        write_buffer(buf, &self.user_data);
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }
}

/// Self-contained, re-verifiable proof that `user_data` was submitted under
/// an invite with this session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteReceipt {
    /// Session token of the attempt.
    pub session: [u8; 32],
    /// Ed25519 signature over the encoded [`AuthData`].
    pub signature: [u8; 64],
    /// The user data that was signed.
    pub user_data: Bytes,
}

impl InviteReceipt {
    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        32 + 64 + buffer_len(&self.user_data)
    }

    /// Write to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.session);
        buf.extend_from_slice(&self.signature);
        write_buffer(buf, &self.user_data);
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }

    /// Strictly decode.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let session = dec.fixed32()?;
        let signature = dec.fixed64()?;
        let user_data = dec.buffer()?;
        dec.finish()?;
        Ok(Self { session, signature, user_data })
    }
}

/// Persisted flag: completed attempt with a cached key.
const PERSISTED_FLAG_KEY: u64 = 1;

/// Minimal candidate state that survives a process restart.
///
/// A pending attempt stores seed, discovery key and user data - enough to
/// rebuild the request deterministically. A completed attempt additionally
/// caches the obtained key; its secret material is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRequest {
    /// Invite seed.
    pub seed: [u8; 32],
    /// Discovery key the attempt is bound to.
    pub discovery_key: [u8; 32],
    /// User data submitted with the request.
    pub user_data: Bytes,
    /// Cached protected key, present once the attempt completed.
    pub key: Option<[u8; 32]>,
}

impl PersistedRequest {
    fn flags(&self) -> u64 {
        if self.key.is_some() { PERSISTED_FLAG_KEY } else { 0 }
    }

    /// Exact encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        let mut len = 32 + 32 + buffer_len(&self.user_data) + uint_len(self.flags());
        if self.key.is_some() {
            len += 32;
        }
        len
    }

    /// Write to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.seed);
        buf.extend_from_slice(&self.discovery_key);
        write_buffer(buf, &self.user_data);
        write_uint(buf, self.flags());
        if let Some(key) = &self.key {
            buf.extend_from_slice(key);
        }
    }

    /// Encode with a single exact-size allocation.
    pub fn encode(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        debug_assert_eq!(buf.len(), self.encoded_len());
        Bytes::from(buf)
    }

    /// Strictly decode.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut dec = Decoder::new(bytes);
        let seed = dec.fixed32()?;
        let discovery_key = dec.fixed32()?;
        let user_data = dec.buffer()?;
        let flags = dec.uint()?;
        let key = if flags & PERSISTED_FLAG_KEY != 0 { Some(dec.fixed32()?) } else { None };
        dec.finish()?;
        Ok(Self { seed, discovery_key, user_data, key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_round_trip_full() {
        let invite = Invite {
            seed: [0x11; 32],
            discovery_key: Some([0x22; 32]),
            expires: Some(1_700_000_000),
            sensitive: true,
        };
        let bytes = invite.encode();
        assert_eq!(bytes.len(), invite.encoded_len());
        assert_eq!(Invite::decode(&bytes).unwrap(), invite);
    }

    #[test]
    fn invite_round_trip_minimal() {
        let invite = Invite { seed: [0x11; 32], discovery_key: None, expires: None, sensitive: false };
        let bytes = invite.encode();
        // version + flags + seed, nothing else
        assert_eq!(bytes.len(), 2 + 32);
        assert_eq!(Invite::decode(&bytes).unwrap(), invite);
    }

    #[test]
    fn invite_wire_layout() {
        let invite = Invite {
            seed: [0xab; 32],
            discovery_key: Some([0xcd; 32]),
            expires: Some(0x0102_0304),
            sensitive: false,
        };
        let bytes = invite.encode();
        assert_eq!(bytes[0], 1, "version");
        assert_eq!(bytes[1], 3, "flags: discovery key | expires");
        assert_eq!(&bytes[2..34], &[0xab; 32]);
        assert_eq!(&bytes[34..66], &[0xcd; 32]);
        assert_eq!(&bytes[66..70], &[0x04, 0x03, 0x02, 0x01], "expiry is little endian");
    }

    #[test]
    fn invite_rejects_unknown_version() {
        let mut bytes = Invite {
            seed: [0u8; 32],
            discovery_key: None,
            expires: None,
            sensitive: false,
        }
        .encode()
        .to_vec();
        bytes[0] = 2;
        assert_eq!(Invite::decode(&bytes), Err(WireError::UnknownInviteVersion(2)));
    }

    #[test]
    fn invite_rejects_trailing_bytes() {
        let mut bytes = Invite {
            seed: [0u8; 32],
            discovery_key: None,
            expires: None,
            sensitive: false,
        }
        .encode()
        .to_vec();
        bytes.push(0);
        assert_eq!(Invite::decode(&bytes), Err(WireError::TrailingBytes { remaining: 1 }));
    }

    #[test]
    fn response_status_codes() {
        assert_eq!(ResponseStatus::from_code(0), ResponseStatus::Granted);
        assert_eq!(ResponseStatus::from_code(1), ResponseStatus::Rejected);
        assert_eq!(ResponseStatus::from_code(2), ResponseStatus::InviteUsed);
        assert_eq!(ResponseStatus::from_code(3), ResponseStatus::InviteExpired);
        assert_eq!(ResponseStatus::from_code(9), ResponseStatus::Other(9));

        for code in [0, 1, 2, 3, 9, u64::MAX] {
            assert_eq!(ResponseStatus::from_code(code).code(), code);
        }

        assert!(ResponseStatus::Granted.is_granted());
        assert!(!ResponseStatus::Rejected.is_granted());
    }

    #[test]
    fn response_payload_granted_round_trip() {
        let payload = ResponsePayload::Granted {
            key: [0x01; 32],
            encryption_key: Some([0x02; 32]),
            data: Some(Bytes::from_static(b"welcome")),
            fast_forward_to: Some(FastForwardTo { key: [0x03; 32], length: 1024 }),
        };
        let bytes = payload.encode();
        assert_eq!(bytes.len(), payload.encoded_len());
        assert_eq!(ResponsePayload::decode(&bytes).unwrap(), payload);
    }

    #[test]
    fn response_payload_bare_grant_round_trip() {
        let payload = ResponsePayload::Granted {
            key: [0x01; 32],
            encryption_key: None,
            data: None,
            fast_forward_to: None,
        };
        let bytes = payload.encode();
        // status + flags + key
        assert_eq!(bytes.len(), 2 + 32);
        assert_eq!(ResponsePayload::decode(&bytes).unwrap(), payload);
    }

    #[test]
    fn response_payload_denied_encodes_status_only() {
        let payload = ResponsePayload::Denied { status: ResponseStatus::InviteExpired };
        let bytes = payload.encode();
        assert_eq!(bytes.as_ref(), &[3]);
        assert_eq!(ResponsePayload::decode(&bytes).unwrap(), payload);
    }

    #[test]
    fn response_payload_unknown_status_decodes() {
        assert_eq!(
            ResponsePayload::decode(&[42]).unwrap(),
            ResponsePayload::Denied { status: ResponseStatus::Other(42) }
        );
    }

    #[test]
    fn response_payload_denied_rejects_extra_fields() {
        // A denial followed by grant-shaped bytes must fail strictly
        let mut bytes = vec![1u8];
        bytes.extend_from_slice(&[0u8; 33]);
        assert!(matches!(
            ResponsePayload::decode(&bytes),
            Err(WireError::TrailingBytes { remaining: 33 })
        ));
    }

    #[test]
    fn response_payload_truncated_grant_fails() {
        // status 0 + flags 0 but no key
        assert!(matches!(
            ResponsePayload::decode(&[0, 0]),
            Err(WireError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn invite_request_round_trip() {
        let request = InviteRequest {
            id: [0x0f; 32],
            payload: RequestPayload {
                session: Bytes::from_static(&[0xaa; 32]),
                data: Bytes::from_static(b"ciphertext"),
            },
        };
        let bytes = request.encode();
        assert_eq!(bytes.len(), request.encoded_len());
        assert_eq!(InviteRequest::decode(&bytes).unwrap(), request);
    }

    #[test]
    fn invite_response_round_trip() {
        let response =
            InviteResponse { id: [0x0e; 32], payload: Bytes::from_static(b"sealed reply") };
        let bytes = response.encode();
        assert_eq!(bytes.len(), response.encoded_len());
        assert_eq!(InviteResponse::decode(&bytes).unwrap(), response);
    }

    #[test]
    fn invite_data_round_trip() {
        let data = InviteData { signature: [0x5a; 64], user_data: Bytes::from_static(b"hello") };
        let bytes = data.encode();
        assert_eq!(bytes.len(), data.encoded_len());
        assert_eq!(InviteData::decode(&bytes).unwrap(), data);
    }

    #[test]
    fn receipt_round_trip() {
        let receipt = InviteReceipt {
            session: [0x21; 32],
            signature: [0x5a; 64],
            user_data: Bytes::from_static(b"hello world"),
        };
        let bytes = receipt.encode();
        assert_eq!(bytes.len(), receipt.encoded_len());
        assert_eq!(InviteReceipt::decode(&bytes).unwrap(), receipt);
    }

    #[test]
    fn auth_data_fields_cannot_shift() {
        // Same concatenated bytes, different field split: encodings differ
        let a = AuthData {
            session: Bytes::from_static(b"ab"),
            user_data: Bytes::from_static(b"c"),
        };
        let b = AuthData {
            session: Bytes::from_static(b"a"),
            user_data: Bytes::from_static(b"bc"),
        };
        assert_ne!(a.encode(), b.encode());
    }

    #[test]
    fn persisted_request_round_trip_pending() {
        let persisted = PersistedRequest {
            seed: [0x31; 32],
            discovery_key: [0x32; 32],
            user_data: Bytes::from_static(b"hello world"),
            key: None,
        };
        let bytes = persisted.encode();
        assert_eq!(bytes.len(), persisted.encoded_len());
        assert_eq!(PersistedRequest::decode(&bytes).unwrap(), persisted);
    }

    #[test]
    fn persisted_request_round_trip_completed() {
        let persisted = PersistedRequest {
            seed: [0x31; 32],
            discovery_key: [0x32; 32],
            user_data: Bytes::new(),
            key: Some([0x01; 32]),
        };
        let bytes = persisted.encode();
        assert_eq!(PersistedRequest::decode(&bytes).unwrap(), persisted);
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert!(Invite::decode(&[]).is_err());
        assert!(RequestPayload::decode(&[]).is_err());
        assert!(ResponsePayload::decode(&[]).is_err());
        assert!(InviteRequest::decode(&[]).is_err());
        assert!(InviteResponse::decode(&[]).is_err());
        assert!(InviteData::decode(&[]).is_err());
        assert!(InviteReceipt::decode(&[]).is_err());
        assert!(PersistedRequest::decode(&[]).is_err());
    }
}
