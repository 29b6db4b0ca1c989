//! Percent-encoding of Nordic locale characters in literal URLs.
//!
//! The weather sites are addressed by human-readable paths such as
//! `värmlands-län/väder-karlstad`. The servers expect the UTF-8 byte escapes
//! instead, so the fixed source URLs are passed through [`encode`] once when
//! they are built.

/// Characters that are rewritten. Everything else passes through untouched,
/// including `%`, `/` and spaces.
const LOCALE_CHARS: [char; 10] = ['å', 'ä', 'ö', 'æ', 'ø', 'Å', 'Ä', 'Ö', 'Æ', 'Ø'];

/// Replace the Nordic letters in `path` with their percent-encoded UTF-8 form.
///
/// The function is total and deterministic. It is not designed to be
/// idempotent: it makes no attempt to recognise input that is already
/// escaped, it simply leaves every non-target character alone.
///
/// # Examples
///
/// ```
/// use skrapa::encode::encode;
///
/// assert_eq!(encode("väder-karlstad"), "v%C3%A4der-karlstad");
/// assert_eq!(encode("plain/ascii"), "plain/ascii");
/// ```
pub fn encode(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut buf = [0u8; 4];
    for c in path.chars() {
        if LOCALE_CHARS.contains(&c) {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_lowercase_targets() {
        assert_eq!(encode("å"), "%C3%A5");
        assert_eq!(encode("ä"), "%C3%A4");
        assert_eq!(encode("ö"), "%C3%B6");
        assert_eq!(encode("æ"), "%C3%A6");
        assert_eq!(encode("ø"), "%C3%B8");
    }

    #[test]
    fn test_encode_uppercase_targets() {
        assert_eq!(encode("Värmland"), "V%C3%A4rmland");
        assert_eq!(encode("Åre"), "%C3%85re");
    }

    #[test]
    fn test_encode_ascii_passthrough() {
        let ascii = "https://example.com/a b?x=1&y=%20#frag";
        assert_eq!(encode(ascii), ascii);
    }

    #[test]
    fn test_encode_leaves_other_unicode_alone() {
        assert_eq!(encode("café ü"), "café ü");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let input = "https://klart.se/se/värmlands-län/väder-karlstad/";
        assert_eq!(encode(input), encode(input));
        assert_eq!(
            encode(input),
            "https://klart.se/se/v%C3%A4rmlands-l%C3%A4n/v%C3%A4der-karlstad/"
        );
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(""), "");
    }
}
