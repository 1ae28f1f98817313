//! MIME type validation and the legacy media tokens of vCard 2.1/3.0.
//!
//! Before 4.0, PHOTO, LOGO, SOUND and KEY declare their format with a bare
//! TYPE token (`TYPE=JPEG`) instead of a MIME type.

/// The family a media token belongs to, given by the property name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// PHOTO and LOGO.
    Image,
    /// SOUND.
    Sound,
    /// KEY.
    Key,
}

impl MediaKind {
    /// Returns the media kind of a property name, if it carries media.
    #[must_use]
    pub fn for_property(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        match upper.as_str() {
            "PHOTO" | "LOGO" => Some(Self::Image),
            "SOUND" => Some(Self::Sound),
            "KEY" => Some(Self::Key),
            _ => None,
        }
    }

    const fn top_level(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Sound => "audio",
            Self::Key => "application",
        }
    }
}

/// Tokens whose MIME type is not simply `<top-level>/<token>`.
static LEGACY_TOKENS: &[(MediaKind, &str, &str)] = &[
    (MediaKind::Image, "JPEG", "image/jpeg"),
    (MediaKind::Image, "GIF", "image/gif"),
    (MediaKind::Image, "PNG", "image/png"),
    (MediaKind::Image, "BMP", "image/bmp"),
    (MediaKind::Image, "TIFF", "image/tiff"),
    (MediaKind::Image, "PICT", "image/x-pict"),
    (MediaKind::Image, "WMF", "image/x-wmf"),
    (MediaKind::Image, "PS", "application/postscript"),
    (MediaKind::Image, "PDF", "application/pdf"),
    (MediaKind::Image, "QTIME", "image/mov"),
    (MediaKind::Sound, "WAVE", "audio/x-wav"),
    (MediaKind::Sound, "PCM", "audio/l16"),
    (MediaKind::Sound, "AIFF", "audio/x-aiff"),
    (MediaKind::Sound, "BASIC", "audio/basic"),
    (MediaKind::Sound, "MPEG", "audio/mpeg"),
    (MediaKind::Sound, "VORBIS", "audio/vorbis"),
    (MediaKind::Key, "X509", "application/x-x509-ca-cert"),
    (MediaKind::Key, "PGP", "application/pgp-keys"),
];

/// Converts a legacy TYPE token to a MIME type.
///
/// A token that already is a MIME type is returned lowercased. Tokens not
/// in the table become `<top-level>/<token>` when that forms a valid MIME
/// type.
#[must_use]
pub fn media_type_from_token(kind: MediaKind, token: &str) -> Option<String> {
    let token = token.trim();
    if token.contains('/') {
        return is_valid_mime_type(token).then(|| token.to_ascii_lowercase());
    }

    if let Some((_, _, mime)) = LEGACY_TOKENS
        .iter()
        .find(|(k, t, _)| *k == kind && t.eq_ignore_ascii_case(token))
    {
        return Some((*mime).to_string());
    }

    let candidate = format!("{}/{}", kind.top_level(), token.to_ascii_lowercase());
    is_valid_mime_type(&candidate).then_some(candidate)
}

/// Converts a MIME type back to a legacy TYPE token.
#[must_use]
pub fn token_from_media_type(kind: MediaKind, media_type: &str) -> Option<String> {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "application/x-x509-user-cert" {
        return Some("X509".to_string());
    }

    if let Some((_, token, _)) = LEGACY_TOKENS
        .iter()
        .find(|(k, _, m)| *k == kind && *m == essence)
    {
        return Some((*token).to_string());
    }

    let (_, sub_type) = essence.split_once('/')?;
    let sub_type = sub_type.strip_prefix("x-").unwrap_or(sub_type);
    (!sub_type.is_empty()).then(|| sub_type.to_ascii_uppercase())
}

/// Checks `type "/" subtype *(";" name "=" value)` with RFC 6838 name
/// characters.
#[must_use]
pub fn is_valid_mime_type(value: &str) -> bool {
    let mut parts = value.split(';');
    let essence = parts.next().unwrap_or_default().trim();

    let Some((top, sub)) = essence.split_once('/') else {
        return false;
    };
    if !is_restricted_name(top) || !is_restricted_name(sub) {
        return false;
    }

    parts.all(|param| {
        param
            .split_once('=')
            .is_some_and(|(name, val)| is_restricted_name(name.trim()) && !val.trim().is_empty())
    })
}

fn is_restricted_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && s.len() <= 127
        && chars.all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_validation() {
        assert!(is_valid_mime_type("image/jpeg"));
        assert!(is_valid_mime_type("image/svg+xml"));
        assert!(is_valid_mime_type("text/plain; charset=utf-8"));
        assert!(!is_valid_mime_type("jpeg"));
        assert!(!is_valid_mime_type("image/"));
        assert!(!is_valid_mime_type("/jpeg"));
        assert!(!is_valid_mime_type("text/plain; charset"));
        assert!(!is_valid_mime_type("image/jp eg"));
    }

    #[test]
    fn legacy_tokens_to_mime() {
        assert_eq!(
            media_type_from_token(MediaKind::Image, "jpeg").as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            media_type_from_token(MediaKind::Sound, "WAVE").as_deref(),
            Some("audio/x-wav")
        );
        assert_eq!(
            media_type_from_token(MediaKind::Key, "PGP").as_deref(),
            Some("application/pgp-keys")
        );
        assert_eq!(
            media_type_from_token(MediaKind::Image, "WEBP").as_deref(),
            Some("image/webp")
        );
        assert_eq!(
            media_type_from_token(MediaKind::Image, "image/PNG").as_deref(),
            Some("image/png")
        );
    }

    #[test]
    fn mime_to_legacy_tokens() {
        assert_eq!(
            token_from_media_type(MediaKind::Image, "image/jpeg").as_deref(),
            Some("JPEG")
        );
        assert_eq!(
            token_from_media_type(MediaKind::Key, "application/x-x509-user-cert").as_deref(),
            Some("X509")
        );
        assert_eq!(
            token_from_media_type(MediaKind::Image, "image/x-icon").as_deref(),
            Some("ICON")
        );
        assert_eq!(token_from_media_type(MediaKind::Image, "garbage"), None);
    }

    #[test]
    fn property_kinds() {
        assert_eq!(MediaKind::for_property("logo"), Some(MediaKind::Image));
        assert_eq!(MediaKind::for_property("SOUND"), Some(MediaKind::Sound));
        assert_eq!(MediaKind::for_property("NOTE"), None);
    }
}
