//! Content-Transfer-Encoding decoding.
//!
//! This is the decode service a [`StandardMessage`](crate::message::StandardMessage)
//! offers its attachments. Other message implementations may bring their own.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use thiserror::Error;

use crate::model::part::TransferEncoding;

/// Base64 as found in the wild: padding optional, trailing bits tolerated.
const MIME_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Why a decode service refused a payload.
#[derive(Error, Debug)]
pub enum DecodeFailure {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid quoted-printable: {0}")]
    QuotedPrintable(#[from] quoted_printable::QuotedPrintableError),

    /// Raised by decode services that only support a subset of encodings.
    #[error("unsupported transfer encoding '{0}'")]
    Unsupported(String),
}

/// Decode `raw` according to `encoding`.
///
/// `7bit`, `8bit`, `binary` and unrecognised labels pass through unchanged.
pub fn decode_transfer(raw: &[u8], encoding: &TransferEncoding) -> Result<Vec<u8>, DecodeFailure> {
    match encoding {
        TransferEncoding::Base64 => {
            let compact: Vec<u8> = raw
                .iter()
                .copied()
                .filter(|b| !b.is_ascii_whitespace())
                .collect();
            Ok(MIME_BASE64.decode(compact)?)
        }
        TransferEncoding::QuotedPrintable => Ok(quoted_printable::decode(
            raw,
            quoted_printable::ParseMode::Robust,
        )?),
        TransferEncoding::SevenBit
        | TransferEncoding::EightBit
        | TransferEncoding::Binary
        | TransferEncoding::Other(_) => Ok(raw.to_vec()),
    }
}
