//! Verification request building and `multipart/form-data` encoding.
//!
//! [`build`] is pure: it pairs two already-resolved images with the
//! configured part names. [`VerificationRequest::encode_multipart`]
//! serializes the pair into an RFC 7578 body that any transport can send
//! verbatim.

use std::hash::Hasher;
use std::io::Write;

use siphasher::sip::SipHasher13;

use crate::config::FieldNames;
use crate::types::{BinaryImage, Slot};

/// Prefix of every generated multipart boundary.
const BOUNDARY_PREFIX: &str = "----sigverify";

/// One named part of the multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    /// Form field name.
    pub name: String,
    /// Image carried by the part.
    pub image: BinaryImage,
}

/// The two samples bound for the verification endpoint.
///
/// Built fresh for every attempt and consumed by the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    original: FormPart,
    test: FormPart,
}

/// A serialized multipart body plus its `Content-Type` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    /// `multipart/form-data; boundary=...`
    pub content_type: String,
    /// The full request body.
    pub bytes: Vec<u8>,
}

/// Pair two images under the configured field names.
#[must_use]
pub fn build(original: BinaryImage, test: BinaryImage, fields: &FieldNames) -> VerificationRequest {
    VerificationRequest {
        original: FormPart {
            name: fields.for_slot(Slot::Original).to_owned(),
            image: original,
        },
        test: FormPart {
            name: fields.for_slot(Slot::Test).to_owned(),
            image: test,
        },
    }
}

impl VerificationRequest {
    /// The part for `slot`.
    #[must_use]
    pub const fn part(&self, slot: Slot) -> &FormPart {
        match slot {
            Slot::Original => &self.original,
            Slot::Test => &self.test,
        }
    }

    /// Both parts in submission order.
    #[must_use]
    pub const fn parts(&self) -> [&FormPart; 2] {
        [&self.original, &self.test]
    }

    /// Serialize as `multipart/form-data`.
    ///
    /// The boundary is derived from a hash of the part headers and
    /// re-derived with a new salt until it occurs in neither payload, so
    /// the output is deterministic for a given request.
    #[must_use]
    pub fn encode_multipart(&self) -> EncodedBody {
        let boundary = self.boundary();
        let payload: usize = self.parts().iter().map(|p| p.image.bytes.len()).sum();
        let mut bytes = Vec::with_capacity(payload + 512);

        for part in self.parts() {
            // Writing into a Vec cannot fail.
            let _ = write!(
                bytes,
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                escape_quoted(&part.name),
                escape_quoted(&part.image.filename),
                part.image.mime_type,
            );
            bytes.extend_from_slice(&part.image.bytes);
            bytes.extend_from_slice(b"\r\n");
        }
        let _ = write!(bytes, "--{boundary}--\r\n");

        EncodedBody {
            content_type: format!("multipart/form-data; boundary={boundary}"),
            bytes,
        }
    }

    fn boundary(&self) -> String {
        let mut salt = 0u64;
        loop {
            let mut hasher = SipHasher13::new_with_keys(0x7369_6776, salt);
            for part in self.parts() {
                hasher.write(part.name.as_bytes());
                hasher.write(part.image.filename.as_bytes());
                hasher.write(part.image.mime_type.as_bytes());
            }
            let candidate = format!("{BOUNDARY_PREFIX}{:016x}", hasher.finish());
            let collides = self
                .parts()
                .iter()
                .any(|part| contains(&part.image.bytes, candidate.as_bytes()));
            if !collides {
                return candidate;
            }
            salt += 1;
        }
    }
}

/// Escape `"`, `\r`, and `\n` in a quoted header parameter.
fn escape_quoted(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
