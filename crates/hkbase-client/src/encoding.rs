//! URL path-segment encoding.
//!
//! Repository names are caller-supplied strings embedded in URL paths;
//! they are percent-encoded so names with spaces or reserved characters
//! still address the right resource.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters that must be percent-encoded in a path segment.
const SEGMENT_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// Percent-encode a single URL path segment.
///
/// # Examples
///
/// ```
/// use hkbase_client::encoding::encode_segment;
///
/// assert_eq!(encode_segment("my-repo"), "my-repo");
/// assert_eq!(encode_segment("my repo"), "my%20repo");
/// assert_eq!(encode_segment("a/b"), "a%2Fb");
/// ```
#[must_use]
pub fn encode_segment(name: &str) -> String {
    utf8_percent_encode(name, SEGMENT_ESCAPE).to_string()
}
