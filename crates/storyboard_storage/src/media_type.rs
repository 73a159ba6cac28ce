//! Image formats.

/// Image formats the providers return.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
)]
pub enum ImageFormat {
    /// PNG
    #[strum(serialize = "png")]
    Png,
    /// JPEG
    #[strum(serialize = "jpeg")]
    Jpeg,
    /// WebP
    #[strum(serialize = "webp")]
    Webp,
    /// GIF
    #[strum(serialize = "gif")]
    Gif,
}

impl ImageFormat {
    /// Look up a format by MIME type. Parameters after `;` are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_storage::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_mime("image/JPEG"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_mime("image/png; q=1"), Some(ImageFormat::Png));
    /// assert_eq!(ImageFormat::from_mime("text/plain"), None);
    /// ```
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Canonical MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    /// Look up a format by file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Format of a URL returned by an artifact store: the MIME type of a
    /// `data:` URL, otherwise the file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyboard_storage::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_url("data:image/webp;base64,AAAA"), Some(ImageFormat::Webp));
    /// assert_eq!(ImageFormat::from_url("images/3f/3fa1.jpg"), Some(ImageFormat::Jpeg));
    /// assert_eq!(ImageFormat::from_url("images/3f/3fa1.bin"), None);
    /// ```
    pub fn from_url(url: &str) -> Option<Self> {
        match url.strip_prefix("data:") {
            Some(rest) => Self::from_mime(rest.split([';', ',']).next().unwrap_or_default()),
            None => std::path::Path::new(url)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(Self::from_extension),
        }
    }
}
