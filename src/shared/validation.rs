use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Media types rendered as images by browsers
    /// - Valid: "image/png", "image/jpeg", "IMAGE/WEBP"
    /// - Invalid: "application/pdf", "text/image", "images/png"
    pub static ref IMAGE_MEDIA_TYPE_REGEX: Regex = Regex::new(r"(?i)^image/[a-z0-9.+-]+$").unwrap();

    /// Attachment slot names used in routes
    /// Lowercase words separated by single hyphens
    /// - Valid: "engine-arc", "document"
    /// - Invalid: "Engine", "-arc", "engine_arc", "engine--arc"
    pub static ref SLOT_NAME_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();
}

/// Whether a stored media type is an image, ignoring parameters like `; charset=`
pub fn is_image_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    IMAGE_MEDIA_TYPE_REGEX.is_match(essence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_media_types() {
        assert!(is_image_media_type("image/png"));
        assert!(is_image_media_type("image/jpeg"));
        assert!(is_image_media_type("image/svg+xml"));
        assert!(is_image_media_type("IMAGE/WEBP"));
        assert!(is_image_media_type("image/png; charset=binary"));
    }

    #[test]
    fn test_non_image_media_types() {
        assert!(!is_image_media_type("application/pdf"));
        assert!(!is_image_media_type("text/image"));
        assert!(!is_image_media_type("images/png"));
        assert!(!is_image_media_type("image/"));
        assert!(!is_image_media_type(""));
    }

    #[test]
    fn test_slot_name_regex() {
        assert!(SLOT_NAME_REGEX.is_match("engine-arc"));
        assert!(SLOT_NAME_REGEX.is_match("document"));
        assert!(!SLOT_NAME_REGEX.is_match("Engine"));
        assert!(!SLOT_NAME_REGEX.is_match("engine_arc"));
        assert!(!SLOT_NAME_REGEX.is_match("-arc"));
    }
}
