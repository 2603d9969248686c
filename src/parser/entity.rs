//! Entity and character reference decoding.
//!
//! Only the five predefined entities and numeric character references are
//! understood. There is no DTD, so no other entity can ever be declared and
//! no external entity is ever loaded.

use crate::error::{ParseError, ParseErrorKind};

use super::input::{is_digit, is_hex_digit, is_lowercase, ParserInput};

/// Longest accepted decimal character reference (`&#1114111;`).
const MAX_DECIMAL_DIGITS: usize = 7;

/// Longest accepted hexadecimal character reference (`&#x10FFFF;`).
const MAX_HEX_DIGITS: usize = 6;

/// Resolves one of the predefined entity names.
fn predefined_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "apos" => Some('\''),
        "gt" => Some('>'),
        "lt" => Some('<'),
        "quot" => Some('"'),
        _ => None,
    }
}

/// Parses a reference starting at `&` and appends its replacement to `out`.
pub(crate) fn decode_reference(
    input: &mut ParserInput<'_>,
    out: &mut String,
) -> Result<(), ParseError> {
    input.expect('&')?;

    if input.maybe_expect('#') {
        let (digits, radix, max) = if input.maybe_expect_one_of(|c| c == 'x' || c == 'X').is_some()
        {
            (input.consume_while(is_hex_digit), 16, MAX_HEX_DIGITS)
        } else {
            (input.consume_while(is_digit), 10, MAX_DECIMAL_DIGITS)
        };
        if digits.is_empty() || digits.len() > max {
            return Err(input.error(ParseErrorKind::InvalidEntity(format!(
                "character reference must have 1 to {max} digits, found {}",
                digits.len()
            ))));
        }
        input.expect(';')?;

        // At most 7 decimal or 6 hex digits always fit in a u32.
        let value = u32::from_str_radix(digits, radix).map_err(|_| {
            input.error(ParseErrorKind::InvalidEntity(format!(
                "malformed character reference '{digits}'"
            )))
        })?;
        let ch = char::from_u32(value).ok_or_else(|| {
            input.error(ParseErrorKind::InvalidEntity(format!(
                "U+{value:04X} is not a Unicode scalar value"
            )))
        })?;
        tracing::trace!(code_point = value, "decoded character reference");
        out.push(ch);
        return Ok(());
    }

    let name = input.expect_one_or_more_of(is_lowercase, "lowercase letters in entity name")?;
    input.expect(';')?;
    let ch = predefined_entity(name)
        .ok_or_else(|| input.error(ParseErrorKind::UnknownEntityReference(name.to_string())))?;
    out.push(ch);
    Ok(())
}
