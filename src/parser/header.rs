//! Header value decoding for attachment names.
//!
//! Both strategies share one encoded-word scanner. The generic one lets
//! `mail-parser` convert each word. The legacy one (feature `legacy-charset`)
//! converts words itself through any charset `encoding_rs` knows, and also
//! understands RFC 2231 extended values.

use mail_parser::MessageParser;

use crate::config::DecoderMode;

/// Whether the legacy charset decoder was compiled in.
pub const fn legacy_charset_available() -> bool {
    cfg!(feature = "legacy-charset")
}

/// Decode a raw header value with the strategy selected by `mode`.
///
/// `LegacyCharset` silently uses the generic decoder when the capability is
/// not available.
pub fn decode_header_value(raw: &str, mode: DecoderMode) -> String {
    match mode {
        #[cfg(feature = "legacy-charset")]
        DecoderMode::LegacyCharset => legacy::decode_mime_header(raw),
        _ => decode_generic(raw),
    }
}

/// RFC 2047 decoding with `mail-parser` doing the charset work.
///
/// Encoded-words are located here; each one is then wrapped on its own in a
/// minimal message as a `Subject:` header so the parser's unstructured-header
/// decoder converts it. Text around the words is kept exactly as written.
pub fn decode_generic(raw: &str) -> String {
    scan_encoded_words(&unfold(raw), decode_word_generic)
}

fn decode_word_generic(word: &EncodedWord<'_>) -> Option<String> {
    if !matches!(word.encoding, "B" | "b" | "Q" | "q") {
        return None;
    }
    let fake_msg = format!(
        "Subject: =?{}?{}?{}?=\r\n\r\n",
        word.charset, word.encoding, word.text
    );
    let decoded = MessageParser::default()
        .parse(fake_msg.as_bytes())
        .and_then(|msg| msg.subject().map(str::to_string))?;
    // Words the parser cannot convert come back untouched.
    (!decoded.starts_with("=?")).then_some(decoded)
}

/// Collapse folded header lines into one.
fn unfold(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The pieces of one `=?charset?encoding?text?=` token.
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    text: &'a str,
}

/// Split an encoded-word starting right after its `=?`.
///
/// Returns the word and the number of bytes it spans after the `=?`.
fn split_word(s: &str) -> Option<(EncodedWord<'_>, usize)> {
    let first_q = s.find('?')?;
    let charset = &s[..first_q];

    let rest = &s[first_q + 1..];
    let second_q = rest.find('?')?;
    let encoding = &rest[..second_q];

    let rest2 = &rest[second_q + 1..];
    let end = rest2.find("?=")?;
    let text = &rest2[..end];

    if charset.is_empty() || charset.contains(char::is_whitespace) {
        return None;
    }

    let consumed = first_q + 1 + second_q + 1 + end + 2;
    // RFC 2231 allows a language suffix: "UTF-8*en"
    let charset = charset.split('*').next().unwrap_or(charset);
    Some((
        EncodedWord {
            charset,
            encoding,
            text,
        },
        consumed,
    ))
}

/// Replace every encoded-word in `input` using `decode_word`.
///
/// Whitespace between two adjacent encoded-words is dropped (RFC 2047 §6.2);
/// all other text, including text glued to a word, is kept verbatim. Tokens
/// that fail to decode are left as written.
fn scan_encoded_words<F>(input: &str, decode_word: F) -> String
where
    F: Fn(&EncodedWord<'_>) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;
    let mut last_was_encoded = false;

    while let Some(start) = remaining.find("=?") {
        let before = &remaining[..start];
        if !last_was_encoded || !before.trim().is_empty() {
            result.push_str(before);
        }

        let after_start = &remaining[start + 2..];
        let decoded = split_word(after_start)
            .and_then(|(word, consumed)| decode_word(&word).map(|text| (text, consumed)));

        match decoded {
            Some((text, consumed)) => {
                result.push_str(&text);
                remaining = &after_start[consumed..];
                last_was_encoded = true;
            }
            None => {
                result.push_str("=?");
                remaining = after_start;
                last_was_encoded = false;
            }
        }
    }

    result.push_str(remaining);
    result
}

#[cfg(feature = "legacy-charset")]
pub use legacy::{decode_encoded_words, decode_rfc2231_value};

#[cfg(feature = "legacy-charset")]
mod legacy {
    use tracing::warn;

    use crate::model::part::TransferEncoding;
    use crate::parser::transfer::decode_transfer;

    use super::{scan_encoded_words, EncodedWord};

    /// Full legacy decode: an RFC 2231 extended value if the input has that
    /// shape, otherwise RFC 2047 encoded-words.
    pub(super) fn decode_mime_header(raw: &str) -> String {
        let unfolded = super::unfold(raw);
        if let Some(decoded) = decode_rfc2231_value(&unfolded) {
            return decoded;
        }
        decode_encoded_words(&unfolded)
    }

    /// Decode RFC 2047 encoded-words in a header value.
    ///
    /// Example: `"=?UTF-8?B?SG9sYQ==?= =?UTF-8?B?IG11bmRv?="` → `"Hola mundo"`
    ///
    /// If decoding fails for any token, the original text is preserved.
    pub fn decode_encoded_words(input: &str) -> String {
        scan_encoded_words(input, decode_word)
    }

    /// Decode an RFC 2231 extended parameter value: `charset'language'%XX…`.
    ///
    /// Returns `None` when the value does not have that shape, carries no
    /// `%XX` escape, or names a charset we cannot convert from. Plain names
    /// that merely contain two apostrophes are left to the caller.
    pub fn decode_rfc2231_value(input: &str) -> Option<String> {
        let mut pieces = input.splitn(3, '\'');
        let charset = pieces.next()?;
        let _language = pieces.next()?;
        let encoded = pieces.next()?;

        if charset.is_empty()
            || encoded.contains(char::is_whitespace)
            || !has_percent_escape(encoded)
        {
            return None;
        }
        let encoding = encoding_rs::Encoding::for_label(charset.trim().as_bytes())?;
        let bytes = percent_decode(encoded);
        let (decoded, _, _) = encoding.decode(&bytes);
        Some(decoded.into_owned())
    }

    fn decode_word(word: &EncodedWord<'_>) -> Option<String> {
        let bytes = match word.encoding.to_uppercase().as_str() {
            "B" => decode_transfer(word.text.as_bytes(), &TransferEncoding::Base64).ok()?,
            "Q" => decode_q_encoding(word.text),
            _ => return None,
        };
        Some(decode_charset(word.charset, &bytes))
    }

    /// Decode Q-encoding (RFC 2047): underscores → spaces, `=XX` → byte.
    fn decode_q_encoding(input: &str) -> Vec<u8> {
        let mut result = Vec::with_capacity(input.len());
        let bytes = input.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'_' => {
                    result.push(b' ');
                    i += 1;
                }
                b'=' if i + 2 < bytes.len() => {
                    match hex_byte(bytes[i + 1], bytes[i + 2]) {
                        Some(byte) => {
                            result.push(byte);
                            i += 3;
                        }
                        None => {
                            result.push(b'=');
                            i += 1;
                        }
                    }
                }
                b => {
                    result.push(b);
                    i += 1;
                }
            }
        }
        result
    }

    fn percent_decode(input: &str) -> Vec<u8> {
        let bytes = input.as_bytes();
        let mut result = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' && i + 2 < bytes.len() {
                if let Some(byte) = hex_byte(bytes[i + 1], bytes[i + 2]) {
                    result.push(byte);
                    i += 3;
                    continue;
                }
            }
            result.push(bytes[i]);
            i += 1;
        }
        result
    }

    fn has_percent_escape(input: &str) -> bool {
        input
            .as_bytes()
            .windows(3)
            .any(|w| w[0] == b'%' && hex_byte(w[1], w[2]).is_some())
    }

    fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
        let digit = |c: u8| (c as char).to_digit(16);
        Some((digit(hi)? * 16 + digit(lo)?) as u8)
    }

    /// Decode bytes using a named charset.
    fn decode_charset(charset: &str, bytes: &[u8]) -> String {
        match charset.to_lowercase().as_str() {
            "utf-8" | "utf8" => String::from_utf8_lossy(bytes).into_owned(),
            _ => {
                if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                    let (decoded, _, _) = encoding.decode(bytes);
                    decoded.into_owned()
                } else {
                    warn!(
                        charset = charset,
                        "Unknown charset, falling back to UTF-8 lossy"
                    );
                    String::from_utf8_lossy(bytes).into_owned()
                }
            }
        }
    }
}
