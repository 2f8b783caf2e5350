use crate::errors::AppError;
use crate::models::LookupRecord;
use std::path::{Path, PathBuf};

/// Default export file name for a root.
pub fn export_file_name(root: &str) -> String {
    let stem = if root.is_empty() { "resultado" } else { root };
    format!("cisp_{}.json", stem)
}

/// Writes the currently-loaded record as formatted JSON.
///
/// Without an explicit output path the file lands in the working directory,
/// named after the active root.
pub fn export_record(
    record: &LookupRecord,
    root: &str,
    output: Option<&Path>,
) -> Result<PathBuf, AppError> {
    let path = match output {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(export_file_name(root)),
    };

    let pretty = serde_json::to_string_pretty(record)
        .map_err(|e| AppError::Storage(format!("Failed to serialize record: {}", e)))?;
    std::fs::write(&path, pretty)
        .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Principal;

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("12345678"), "cisp_12345678.json");
        assert_eq!(export_file_name(""), "cisp_resultado.json");
    }

    #[test]
    fn test_export_writes_parseable_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.json");

        let record = LookupRecord {
            principal: Some(Principal {
                razao_social: Some("ACME LTDA".into()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let path = export_record(&record, "12345678", Some(&out)).unwrap();
        assert_eq!(path, out);

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: LookupRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            parsed.principal.unwrap().razao_social.as_deref(),
            Some("ACME LTDA")
        );
    }
}
