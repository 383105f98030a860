//! `application/x-www-form-urlencoded` decoding
//!
//! Values are looked up the way HTML forms expect: fields posted in the
//! body win over same-named fields in the query string. Values are kept as
//! raw bytes so a page body is stored exactly as it was posted.

use std::borrow::Cow;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decoded form fields from the request body and URL query
#[derive(Debug, Default, Clone)]
pub struct FormValues {
    body: Vec<(String, Vec<u8>)>,
    query: Vec<(String, Vec<u8>)>,
}

impl FormValues {
    pub fn new(query: Option<&str>, body: Option<&[u8]>) -> Self {
        Self {
            body: body.map(parse_pairs).unwrap_or_default(),
            query: query.map(|q| parse_pairs(q.as_bytes())).unwrap_or_default(),
        }
    }

    /// First value for `name` as decoded bytes, empty when absent
    pub fn value_bytes(&self, name: &str) -> &[u8] {
        self.body
            .iter()
            .chain(self.query.iter())
            .find(|(key, _)| key == name)
            .map_or(&[][..], |(_, value)| value.as_slice())
    }

    /// First value for `name` as text, invalid UTF-8 replaced
    pub fn value(&self, name: &str) -> Cow<'_, str> {
        String::from_utf8_lossy(self.value_bytes(name))
    }
}

/// True when a `Content-Type` header announces an urlencoded form
pub fn is_form_content_type(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

/// Split `a=1&b=2` into decoded pairs, skipping empty segments
pub fn parse_pairs(input: &[u8]) -> Vec<(String, Vec<u8>)> {
    input
        .split(|&b| b == b'&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = match segment.iter().position(|&b| b == b'=') {
                Some(i) => (&segment[..i], &segment[i + 1..]),
                None => (segment, &[][..]),
            };
            let key = String::from_utf8_lossy(&decode_component(key)).into_owned();
            (key, decode_component(value))
        })
        .collect()
}

/// Decode one component: `+` is a space, `%XX` is a byte
fn decode_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Cow<'_, [u8]> = if raw.contains(&b'+') {
        Cow::Owned(
            raw.iter()
                .map(|&b| if b == b'+' { b' ' } else { b })
                .collect(),
        )
    } else {
        Cow::Borrowed(raw)
    };
    urlencoding::decode_binary(&spaced).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &[u8]) -> (String, Vec<u8>) {
        (key.to_string(), value.to_vec())
    }

    #[test]
    fn test_parse_pairs_decodes() {
        let pairs = parse_pairs(b"title=Foo&body=Hello+world%21%0Anext");
        assert_eq!(pairs[0], pair("title", b"Foo"));
        assert_eq!(pairs[1], pair("body", b"Hello world!\nnext"));
    }

    #[test]
    fn test_parse_pairs_edge_cases() {
        let pairs = parse_pairs(b"&flag&empty=&a=b=c&");
        assert_eq!(
            pairs,
            vec![pair("flag", b""), pair("empty", b""), pair("a", b"b=c")]
        );
    }

    #[test]
    fn test_literal_plus_survives_when_encoded() {
        let pairs = parse_pairs(b"body=1%2B1");
        assert_eq!(pairs[0].1, b"1+1");
    }

    #[test]
    fn test_non_utf8_escapes_kept_as_bytes() {
        let form = FormValues::new(None, Some(b"body=%FF%FE%00a"));
        assert_eq!(form.value_bytes("body"), b"\xff\xfe\x00a");
        assert_eq!(form.value("body"), "\u{fffd}\u{fffd}\u{0}a");
    }

    #[test]
    fn test_raw_body_bytes_pass_through() {
        let form = FormValues::new(None, Some(b"body=\xc3\xa9t\xe9"));
        assert_eq!(form.value_bytes("body"), b"\xc3\xa9t\xe9");
    }

    #[test]
    fn test_body_wins_over_query() {
        let form = FormValues::new(Some("title=Query&only=q"), Some(b"title=Body"));
        assert_eq!(form.value("title"), "Body");
        assert_eq!(form.value("only"), "q");
        assert_eq!(form.value("missing"), "");
        assert!(form.value_bytes("missing").is_empty());
    }

    #[test]
    fn test_is_form_content_type() {
        assert!(is_form_content_type(Some("application/x-www-form-urlencoded")));
        assert!(is_form_content_type(Some(
            "application/x-www-form-urlencoded; charset=UTF-8"
        )));
        assert!(!is_form_content_type(Some("multipart/form-data; boundary=x")));
        assert!(!is_form_content_type(None));
    }
}
