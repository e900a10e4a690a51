//! Rendering generated documents as YAML or JSON.

use std::path::Path;

use crate::document::Document;
use crate::error::OutputError;

/// Output serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    /// Infer the format from a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("json") {
            Some(OutputFormat::Json)
        } else if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") {
            Some(OutputFormat::Yaml)
        } else {
            None
        }
    }
}

/// Serialize a document. JSON output is pretty-printed; both formats end
/// with a newline.
pub fn render(document: &Document, format: OutputFormat) -> Result<String, OutputError> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(document)
                .map_err(|source| OutputError::Json { source })?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(document).map_err(|source| OutputError::Yaml { source })
        }
    }
}

/// Render a document and write it to `path`, replacing any existing file.
pub fn write_document(
    document: &Document,
    path: &Path,
    format: OutputFormat,
) -> Result<(), OutputError> {
    let rendered = render(document, format)?;
    std::fs::write(path, rendered).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), ?format, "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::generate::generate;
    use serde_json::Value;

    fn sample() -> Document {
        let config: Configuration = serde_json::from_value(serde_json::json!({
            "title": "Pets",
            "version": "1.0.0",
            "resources": {
                "pet": {
                    "operations": ["get"],
                    "attributes": { "name": { "type": "string" } }
                }
            }
        }))
        .unwrap();
        generate(&config, "http://localhost:8080").unwrap()
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            OutputFormat::from_path(Path::new("out.json")),
            Some(OutputFormat::Json)
        );
        assert_eq!(
            OutputFormat::from_path(Path::new("out.yml")),
            Some(OutputFormat::Yaml)
        );
        assert_eq!(OutputFormat::from_path(Path::new("out.txt")), None);
        assert_eq!(OutputFormat::from_path(Path::new("out")), None);
    }

    #[test]
    fn json_and_yaml_describe_the_same_document() {
        let doc = sample();
        let json: Value = serde_json::from_str(&render(&doc, OutputFormat::Json).unwrap()).unwrap();
        let yaml: Value = serde_yaml::from_str(&render(&doc, OutputFormat::Yaml).unwrap()).unwrap();
        assert_eq!(json, yaml);
        assert_eq!(json["openapi"], "3.0.3");
    }

    #[test]
    fn json_keeps_section_order() {
        let rendered = render(&sample(), OutputFormat::Json).unwrap();
        let openapi = rendered.find("\"openapi\"").unwrap();
        let paths = rendered.find("\"paths\"").unwrap();
        let components = rendered.find("\"components\"").unwrap();
        assert!(openapi < paths && paths < components);
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn write_document_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("openapi.yaml");
        write_document(&sample(), &path, OutputFormat::Yaml).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("/pets:"));
    }

    #[test]
    fn write_document_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("openapi.json");
        let result = write_document(&sample(), &path, OutputFormat::Json);
        assert!(matches!(result, Err(OutputError::Write { .. })));
    }
}
