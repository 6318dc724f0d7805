//! Filename derivation and sanitization for saved documents.
//!
//! A document's name comes from the last segment of its URL, unless the
//! server supplies one through `Content-Disposition`. Both sources go through
//! the same sanitizer: anything outside word characters, `-` and `.` becomes
//! `_`.

use std::sync::LazyLock;

use regex::Regex;

use super::constants::FALLBACK_FILENAME;

#[allow(clippy::expect_used)]
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\-.]").expect("filename sanitizer regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static DISPOSITION_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename="?([^";]+)"?"#).expect("Content-Disposition regex is valid") // Static pattern, safe to panic
});

/// Sanitizes a name (or a whole URL) into a single safe path component.
///
/// Keeps only the text after the last `/` or `\`, drops any query string or
/// fragment, then replaces every character outside `[\w.-]` with `_`.
/// The result may be empty; callers decide on a fallback.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    sanitize_component(last_segment(name))
}

fn sanitize_component(component: &str) -> String {
    let sanitized = UNSAFE_FILENAME_CHARS.replace_all(component, "_").into_owned();

    // "." and ".." survive the character filter but name directories, not files.
    if sanitized.chars().all(|c| c == '.') {
        String::new()
    } else {
        sanitized
    }
}

fn last_segment(name: &str) -> &str {
    let last = name.rsplit('/').next().unwrap_or(name);
    let last = last.rsplit('\\').next().unwrap_or(last);
    let last = last.split('?').next().unwrap_or(last);
    last.split('#').next().unwrap_or(last)
}

/// Derives the initial filename for a document URL.
///
/// The last path segment is percent-decoded first, so `%C3%9Cbung%201.pdf`
/// becomes `Übung_1.pdf`. Segments that do not decode to UTF-8 are used
/// as-is. Falls back to `download.pdf` when the URL ends in `/` or otherwise
/// sanitizes to nothing.
#[must_use]
pub fn filename_from_url(url: &str) -> String {
    let segment = last_segment(url);
    let name = match urlencoding::decode(segment) {
        Ok(decoded) => sanitize_component(&decoded),
        Err(_) => sanitize_component(segment),
    };
    if name.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        name
    }
}

/// Extracts a sanitized filename hint from a `Content-Disposition` header.
///
/// Handles:
/// - `attachment; filename="example.pdf"`
/// - `attachment; filename=example.pdf`
/// - `attachment; filename*=UTF-8''example.pdf` (RFC 5987, preferred when present)
///
/// Returns `None` when no token is present or it sanitizes to nothing.
#[must_use]
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    extended_filename(header)
        .or_else(|| {
            DISPOSITION_FILENAME
                .captures(header)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .map(|raw| sanitize_filename(raw.trim()))
        .filter(|name| !name.is_empty())
}

fn extended_filename(header: &str) -> Option<String> {
    let pos = header.find("filename*=")?;
    let value = header[pos + "filename*=".len()..].trim();
    // Format: charset'language'encoded_value
    let quote_pos = value.find("''")?;
    let encoded = &value[quote_pos + 2..];
    let end = encoded.find(';').unwrap_or(encoded.len());
    let encoded_name = encoded[..end].trim().trim_matches('"');
    urlencoding::decode(encoded_name)
        .ok()
        .map(std::borrow::Cow::into_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_strips_query_and_fragment() {
        let name = sanitize_filename("https://x.test/get.php?id=5#frag");
        assert_eq!(name, "get.php");
        assert!(!name.contains('?'));
        assert!(!name.contains('#'));
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_sanitize_filename_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("Lecture 01.pdf"), "Lecture_01.pdf");
        assert_eq!(sanitize_filename("a:b*c<d>e|f.pdf"), "a_b_c_d_e_f.pdf");
        assert_eq!(sanitize_filename("Blatt%2003.pdf"), "Blatt_2003.pdf");
    }

    #[test]
    fn test_sanitize_filename_keeps_word_hyphen_and_dot() {
        assert_eq!(sanitize_filename("ex-01_final.v2.pdf"), "ex-01_final.v2.pdf");
    }

    #[test]
    fn test_sanitize_filename_keeps_unicode_word_characters() {
        assert_eq!(sanitize_filename("Übung_Lösung.pdf"), "Übung_Lösung.pdf");
    }

    #[test]
    fn test_sanitize_filename_takes_last_backslash_segment() {
        assert_eq!(sanitize_filename(r"C:\Users\me\notes.pdf"), "notes.pdf");
    }

    #[test]
    fn test_sanitize_filename_rejects_dot_only_names() {
        assert_eq!(sanitize_filename(".."), "");
        assert_eq!(sanitize_filename("https://x.test/a/."), "");
    }

    #[test]
    fn test_sanitize_filename_output_only_safe_characters() {
        let name = sanitize_filename("we!rd name (v2) [final] & more.pdf");
        assert!(
            name.chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')),
            "unexpected character in {name}"
        );
    }

    #[test]
    fn test_filename_from_url_uses_last_segment() {
        assert_eq!(filename_from_url("https://x.test/a.pdf"), "a.pdf");
        assert_eq!(filename_from_url("https://x.test/b.pdf?x=1"), "b.pdf");
        assert_eq!(
            filename_from_url("https://www.studon.fau.de/studon/goto.php?target=file_123_download"),
            "goto.php"
        );
    }

    #[test]
    fn test_filename_from_url_decodes_percent_encoded_segment() {
        assert_eq!(
            filename_from_url("https://x.test/files/%C3%9Cbung%201.pdf"),
            "Übung_1.pdf"
        );
        assert_eq!(
            filename_from_url("https://x.test/L%C3%B6sung.pdf?x=%C3%A4#top"),
            "Lösung.pdf"
        );
    }

    #[test]
    fn test_filename_from_url_decoded_separators_stay_in_one_component() {
        assert_eq!(
            filename_from_url("https://x.test/dir%2F..%2Fa.pdf"),
            "dir_.._a.pdf"
        );
        assert_eq!(filename_from_url("https://x.test/a%3Fb%23c.pdf"), "a_b_c.pdf");
        assert_eq!(filename_from_url("https://x.test/%2E%2E"), "download.pdf");
    }

    #[test]
    fn test_filename_from_url_keeps_raw_segment_when_not_utf8() {
        assert_eq!(filename_from_url("https://x.test/%FF.pdf"), "_FF.pdf");
    }

    #[test]
    fn test_filename_from_url_falls_back_for_trailing_slash() {
        assert_eq!(filename_from_url("https://x.test/files/"), "download.pdf");
        assert_eq!(filename_from_url("https://x.test/?download=1"), "download.pdf");
    }

    #[test]
    fn test_content_disposition_quoted() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="Lecture 01.pdf""#),
            Some("Lecture_01.pdf".to_string())
        );
    }

    #[test]
    fn test_content_disposition_unquoted() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=slides.pdf; size=12"),
            Some("slides.pdf".to_string())
        );
    }

    #[test]
    fn test_content_disposition_rfc5987_preferred() {
        let header = r#"attachment; filename="fallback.pdf"; filename*=UTF-8''%C3%9Cbung%2001.pdf"#;
        assert_eq!(
            filename_from_content_disposition(header),
            Some("Übung_01.pdf".to_string())
        );
    }

    #[test]
    fn test_content_disposition_strips_path_components() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="../../etc/passwd""#),
            Some("passwd".to_string())
        );
    }

    #[test]
    fn test_content_disposition_without_filename() {
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition(""), None);
    }

    #[test]
    fn test_content_disposition_empty_after_sanitization() {
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="?""#), None);
    }
}
