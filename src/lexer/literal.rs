/// Operand text that is read as a number rather than looked up as a label.
pub fn is_numeric(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '\'')
}

/// Value of a numeric literal, modulo 65536.
///
/// Accepted forms are `0FFH`, `0xFF`, `1010B`, `'c` (or `'c'`) and plain decimal. A trailing `B`
/// only means binary when the literal does not start with `0`, since `0B` style text is more
/// likely a hex digit missing its suffix. A character literal is the first byte of its UTF-8
/// encoding, so `'é'` is 0xC3.
pub fn parse_literal(text: &str) -> Option<u16> {
    if let Some(rest) = text.strip_prefix('\'') {
        return rest.bytes().next().map(u16::from);
    }

    let (digits, radix) = if let Some(digits) = text.strip_suffix(['h', 'H']) {
        (digits, 16)
    } else if let Some(digits) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (digits, 16)
    } else if let Some(digits) = text
        .strip_suffix(['b', 'B'])
        .filter(|_| !text.starts_with('0'))
    {
        (digits, 2)
    } else {
        (text, 10)
    };

    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0u16, |acc, c| {
        let digit = c.to_digit(radix)?;
        Some(acc.wrapping_mul(radix as u16).wrapping_add(digit as u16))
    })
}
