use chardetng::EncodingDetector;
use encoding_rs::Encoding;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMarkup {
    pub text: String,
    pub encoding: &'static str,
    /// Some bytes were invalid for `encoding` and became U+FFFD.
    pub had_replacements: bool,
}

/// Markup bytes to text. The encoding is taken from the BOM, then the
/// Content-Type charset, then a `chardetng` guess. Invalid sequences are
/// replaced, never rejected.
pub fn decode_markup(bytes: &[u8], content_type: Option<&str>) -> DecodedMarkup {
    let encoding = Encoding::for_bom(bytes)
        .map(|(encoding, _)| encoding)
        .or_else(|| {
            content_type
                .and_then(charset_label)
                .and_then(|label| Encoding::for_label(label.as_bytes()))
        })
        .unwrap_or_else(|| {
            let mut detector = EncodingDetector::new();
            detector.feed(bytes, true);
            detector.guess(None, true)
        });

    let (text, _, had_errors) = encoding.decode(bytes);
    DecodedMarkup {
        text: text.into_owned(),
        encoding: encoding.name(),
        had_replacements: had_errors,
    }
}

fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']))
    })
}
