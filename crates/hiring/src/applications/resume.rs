use chrono::{DateTime, Utc};
use mime::Mime;

/// Largest resume accepted, in bytes.
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

pub const DOC_MIME: &str = "application/msword";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A resume file as received from the candidate.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A resume that passed the client-side checks and is ready for object storage.
#[derive(Debug, Clone)]
pub struct AcceptedResume {
    pub object_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResumeRejection {
    #[error("El archivo está vacío")]
    Empty,
    #[error("El archivo debe ser menor a 5MB")]
    TooLarge { size: usize },
    #[error("Solo se permiten archivos PDF o Word")]
    UnsupportedType { content_type: String },
}

impl ResumeUpload {
    /// Check size and type before any storage call is made.
    pub fn accept(self, now: DateTime<Utc>) -> Result<AcceptedResume, ResumeRejection> {
        if self.bytes.is_empty() {
            return Err(ResumeRejection::Empty);
        }
        if self.bytes.len() > MAX_RESUME_BYTES {
            return Err(ResumeRejection::TooLarge {
                size: self.bytes.len(),
            });
        }

        let content_type = self.resolve_content_type();
        if !is_allowed(&content_type) {
            return Err(ResumeRejection::UnsupportedType {
                content_type: content_type.essence_str().to_string(),
            });
        }

        Ok(AcceptedResume {
            object_name: object_name(now, &self.file_name),
            content_type,
            bytes: self.bytes,
        })
    }

    /// Declared type, falling back to the file extension when the client sent nothing useful.
    fn resolve_content_type(&self) -> Mime {
        let declared = self
            .content_type
            .as_deref()
            .and_then(|raw| raw.parse::<Mime>().ok())
            .filter(|mime| *mime != mime::APPLICATION_OCTET_STREAM);

        declared.unwrap_or_else(|| {
            mime_guess::from_path(&self.file_name).first_or_octet_stream()
        })
    }
}

fn is_allowed(content_type: &Mime) -> bool {
    let essence = content_type.essence_str();
    essence == mime::APPLICATION_PDF.essence_str() || essence == DOC_MIME || essence == DOCX_MIME
}

/// `<unix millis>_<name>` with whitespace runs collapsed to `_` and path separators removed.
pub fn object_name(now: DateTime<Utc>, file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let mut sanitized = String::with_capacity(base.len());
    let mut in_whitespace = false;
    for c in base.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
            }
            in_whitespace = true;
        } else {
            sanitized.push(c);
            in_whitespace = false;
        }
    }
    if sanitized.is_empty() {
        sanitized.push_str("resume");
    }
    format!("{}_{}", now.timestamp_millis(), sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 15, 30, 0).single().expect("valid timestamp")
    }

    fn upload(name: &str, content_type: Option<&str>, size: usize) -> ResumeUpload {
        ResumeUpload {
            file_name: name.to_string(),
            content_type: content_type.map(str::to_string),
            bytes: vec![b'%'; size],
        }
    }

    #[test]
    fn accepts_pdf_and_word_documents() {
        for (name, content_type) in [
            ("cv.pdf", Some("application/pdf")),
            ("cv.doc", Some(DOC_MIME)),
            ("cv.docx", Some(DOCX_MIME)),
            ("cv.docx", None),
            ("cv.pdf", Some("application/octet-stream")),
        ] {
            let accepted = upload(name, content_type, 1024)
                .accept(now())
                .unwrap_or_else(|err| panic!("{name} rejected: {err}"));
            assert!(accepted.object_name.ends_with(name));
        }
    }

    #[test]
    fn rejects_other_types_before_upload() {
        let err = upload("foto.png", Some("image/png"), 10)
            .accept(now())
            .expect_err("png rejected");
        assert_eq!(
            err,
            ResumeRejection::UnsupportedType {
                content_type: "image/png".to_string()
            }
        );
        assert_eq!(err.to_string(), "Solo se permiten archivos PDF o Word");
    }

    #[test]
    fn enforces_five_megabyte_ceiling() {
        assert!(upload("cv.pdf", Some("application/pdf"), MAX_RESUME_BYTES)
            .accept(now())
            .is_ok());
        let err = upload("cv.pdf", Some("application/pdf"), MAX_RESUME_BYTES + 1)
            .accept(now())
            .expect_err("too large");
        assert!(matches!(err, ResumeRejection::TooLarge { .. }));
    }

    #[test]
    fn object_names_are_timestamped_and_sanitized() {
        let name = object_name(now(), "Hoja de  vida\tMaría.pdf");
        assert_eq!(name, format!("{}_Hoja_de_vida_María.pdf", now().timestamp_millis()));

        let name = object_name(now(), "../../etc/passwd");
        assert_eq!(name, format!("{}_passwd", now().timestamp_millis()));
    }
}
