//! Document type classification and the supported-type allow-list.

/// MIME types rendered as PDFs.
pub const PDF_TYPES: &[&str] = &["application/pdf"];

/// MIME types shown as images.
pub const IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/pjpeg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/tiff",
    "image/svg+xml",
    "image/x-icon",
];

/// MIME types shown as plain text.
pub const TEXT_TYPES: &[&str] = &[
    "text/plain",
    "text/csv",
    "text/html",
    "text/css",
    "application/javascript",
    "application/json",
    "application/xml",
    "text/cache-manifest",
    "application/rtf",
    "message/rfc822",
];

/// MIME types that are accepted but cannot be previewed.
pub const NO_PREVIEW_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/x-shockwave-flash",
    "application/vnd.ms-project",
    "application/vnd.ms-powerpoint",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/zip",
    "application/x-tar",
    "application/vnd.visio",
    "application/postscript",
    "video/quicktime",
    "audio/mpeg",
    "audio/mp4",
    "application/pkix-cert",
];

pub const PDF_EXTENSIONS: &[&str] = &["pdf"];
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg", "ico"];
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "csv", "html", "htm", "css", "js", "json", "xml", "rtf", "eml", "appcache",
];
pub const NO_PREVIEW_EXTENSIONS: &[&str] = &[
    "xlsx", "xls", "swf", "mpp", "ppt", "doc", "docx", "zip", "tar", "vsdx", "ps", "mov", "mp3",
    "m4a", "csr",
];

/// Why a document cannot be previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnsupportedReason {
    /// Rejected by the supported-type allow-list.
    NotAllowed,
    /// A known type with no previewer (office documents, archives, media).
    NoPreview,
    /// Neither the MIME type nor the extension is recognised.
    Unrecognized,
}

/// How a document will be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DocumentKind {
    Pdf,
    Image,
    Text,
    Unsupported(UnsupportedReason),
}

impl DocumentKind {
    pub fn is_previewable(self) -> bool {
        !matches!(self, DocumentKind::Unsupported(_))
    }
}

/// The configured list of MIME types the viewer accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SupportedTypes {
    pub mime_types: Vec<String>,
}

impl Default for SupportedTypes {
    fn default() -> Self {
        let mut mime_types: Vec<String> = Vec::new();
        mime_types.push("application/octet-stream".into());
        for table in [PDF_TYPES, IMAGE_TYPES, TEXT_TYPES, NO_PREVIEW_TYPES] {
            mime_types.extend(table.iter().map(|t| t.to_string()));
        }
        Self { mime_types }
    }
}

impl SupportedTypes {
    pub fn new<I, S>(mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            mime_types: mime_types.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mime_types.is_empty()
    }

    /// Whether a document passes the allow-list.
    ///
    /// It passes if its MIME type is listed, if `application/octet-stream` is
    /// listed, or if its extension contains the subtype of a listed type.
    pub fn allows(&self, mime_type: &str, extension: Option<&str>) -> bool {
        let mime = mime_type.trim().to_ascii_lowercase();
        if self
            .mime_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&mime) || t.eq_ignore_ascii_case("application/octet-stream"))
        {
            return true;
        }
        let Some(ext) = normalize_extension(extension) else {
            return false;
        };
        self.mime_types.iter().any(|t| {
            t.split_once('/')
                .map(|(_, subtype)| !subtype.is_empty() && ext.contains(&subtype.to_ascii_lowercase()))
                .unwrap_or(false)
        })
    }
}

fn normalize_extension(extension: Option<&str>) -> Option<String> {
    let ext = extension?.trim().trim_start_matches('.').to_ascii_lowercase();
    (!ext.is_empty()).then_some(ext)
}

/// Classify a document by MIME type, then by extension.
///
/// Unknown types never fail; they degrade to
/// [`UnsupportedReason::Unrecognized`].
pub fn classify(mime_type: &str, extension: Option<&str>) -> DocumentKind {
    let mime = mime_type.trim().to_ascii_lowercase();
    let tables: [(&[&str], &[&str], DocumentKind); 4] = [
        (PDF_TYPES, PDF_EXTENSIONS, DocumentKind::Pdf),
        (IMAGE_TYPES, IMAGE_EXTENSIONS, DocumentKind::Image),
        (TEXT_TYPES, TEXT_EXTENSIONS, DocumentKind::Text),
        (
            NO_PREVIEW_TYPES,
            NO_PREVIEW_EXTENSIONS,
            DocumentKind::Unsupported(UnsupportedReason::NoPreview),
        ),
    ];

    if let Some((_, _, kind)) = tables.iter().find(|(types, _, _)| types.contains(&mime.as_str())) {
        return *kind;
    }
    normalize_extension(extension)
        .and_then(|ext| {
            tables
                .iter()
                .find(|(_, exts, _)| exts.contains(&ext.as_str()))
                .map(|(_, _, kind)| *kind)
        })
        .unwrap_or(DocumentKind::Unsupported(UnsupportedReason::Unrecognized))
}

/// Whether the document's text should be pretty-printed as JSON.
pub fn is_json(mime_type: &str, extension: Option<&str>) -> bool {
    mime_type.trim().eq_ignore_ascii_case("application/json")
        || normalize_extension(extension).as_deref() == Some("json")
}
