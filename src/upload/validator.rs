use crate::config::UploaderConfig;

use super::error::Rejection;
use super::item::UploadItem;
use super::types::FileSource;

/// Admission rules for a batch. Pure: it decides, the caller reports.
#[derive(Debug, Clone)]
pub struct Validator {
    max_file_size_mb: u64,
    max_file_size_bytes: u64,
    accepted_types: Vec<String>,
    max_files: usize,
}

impl Validator {
    pub fn new(config: &UploaderConfig) -> Self {
        let accepted_types = config
            .accepted_file_types
            .iter()
            .map(|ext| normalize_extension(ext))
            .filter(|ext| ext.len() > 1)
            .collect();

        Self {
            max_file_size_mb: config.max_file_size_mb,
            max_file_size_bytes: config.max_file_size_bytes(),
            accepted_types,
            max_files: config.max_files,
        }
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn max_file_size_mb(&self) -> u64 {
        self.max_file_size_mb
    }

    pub fn accepted_types(&self) -> &[String] {
        &self.accepted_types
    }

    pub fn accepts_type(&self, file_name: &str) -> bool {
        let file_name = file_name.to_lowercase();
        self.accepted_types
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
    }

    /// Checks size, then type, then duplicates, then remaining capacity.
    pub fn check(&self, candidate: &FileSource, batch: &[UploadItem]) -> Result<(), Rejection> {
        if candidate.size > self.max_file_size_bytes {
            return Err(Rejection::SizeExceeded {
                size: candidate.size,
                limit_mb: self.max_file_size_mb,
            });
        }

        if !self.accepts_type(&candidate.name) {
            return Err(Rejection::TypeNotAllowed {
                accepted: self.accepted_types.clone(),
            });
        }

        let duplicate = batch
            .iter()
            .any(|item| item.name() == candidate.name && item.size() == candidate.size);
        if duplicate {
            return Err(Rejection::DuplicateFile {
                name: candidate.name.clone(),
            });
        }

        if batch.len() >= self.max_files {
            return Err(Rejection::BatchFull {
                max_files: self.max_files,
            });
        }

        Ok(())
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    fn validator() -> Validator {
        Validator::new(&UploaderConfig::default())
    }

    fn file(name: &str, size: u64) -> FileSource {
        FileSource::new(format!("/tmp/{}", name), name, size)
    }

    #[test]
    fn accepts_valid_file() {
        assert_eq!(validator().check(&file("audit.pdf", 2 * MB), &[]), Ok(()));
    }

    #[test]
    fn rejects_oversized_file() {
        let rejection = validator()
            .check(&file("scan.pdf", 30 * MB), &[])
            .unwrap_err();
        assert_eq!(
            rejection,
            Rejection::SizeExceeded {
                size: 30 * MB,
                limit_mb: 10
            }
        );
        assert_eq!(rejection.to_string(), "File size exceeds 10MB limit");
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validator().check(&file("edge.csv", 10 * MB), &[]).is_ok());
        assert!(validator().check(&file("edge.csv", 10 * MB + 1), &[]).is_err());
    }

    #[test]
    fn rejects_unknown_extension() {
        let rejection = validator().check(&file("photo.png", 10), &[]).unwrap_err();
        assert!(matches!(rejection, Rejection::TypeNotAllowed { .. }));
        assert_eq!(
            rejection.to_string(),
            "File type not supported. Accepted types: .pdf, .csv, .xlsx, .json, .txt"
        );
    }

    #[test]
    fn extension_match_ignores_case_and_config_dots() {
        let config = UploaderConfig {
            accepted_file_types: vec!["PDF".to_string(), ".Csv".to_string()],
            ..UploaderConfig::default()
        };
        let validator = Validator::new(&config);
        assert!(validator.accepts_type("REPORT.PDF"));
        assert!(validator.accepts_type("data.csv"));
        assert!(!validator.accepts_type("notpdf"));
    }

    #[test]
    fn rejects_duplicate_name_and_size() {
        let existing = vec![
            UploadItem::new(file("a.txt", 5)),
            UploadItem::new(file("b.txt", 7)),
        ];
        let rejection = validator().check(&file("b.txt", 7), &existing).unwrap_err();
        assert_eq!(
            rejection,
            Rejection::DuplicateFile {
                name: "b.txt".to_string()
            }
        );

        // same name, different size is a different file
        assert!(validator().check(&file("b.txt", 8), &existing).is_ok());
    }

    #[test]
    fn rejects_when_batch_full() {
        let existing: Vec<_> = (0..5)
            .map(|i| UploadItem::new(file(&format!("{}.json", i), 1)))
            .collect();
        let rejection = validator().check(&file("extra.json", 1), &existing).unwrap_err();
        assert_eq!(rejection, Rejection::BatchFull { max_files: 5 });
        assert_eq!(rejection.to_string(), "Maximum 5 files allowed");
    }
}
