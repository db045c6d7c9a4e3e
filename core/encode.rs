use crate::bundle::PackageBundle;
use crate::error::{AppError, Result};
use crate::toon;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Toon,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Yaml, OutputFormat::Toon];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Toon => "toon",
        }
    }

    /// Canonical file extension, dot included.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => ".json",
            OutputFormat::Yaml => ".yaml",
            OutputFormat::Toon => ".toon",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "toon" => Ok(OutputFormat::Toon),
            other => Err(AppError::ConfigInvalid(format!(
                "unsupported output format '{}', expected json, yaml or toon",
                other
            ))),
        }
    }
}

/// Serializes the bundle without reordering or altering any content.
pub fn encode(bundle: &PackageBundle, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(bundle).map_err(AppError::JsonSerialize),
        OutputFormat::Yaml => serde_yml::to_string(bundle).map_err(AppError::YamlError),
        OutputFormat::Toon => Ok(toon::encode_bundle(bundle)),
    }
}

/// Inverse of [`encode`] for every format.
pub fn decode(text: &str, format: OutputFormat) -> Result<PackageBundle> {
    match format {
        OutputFormat::Json => serde_json::from_str(text).map_err(AppError::JsonSerialize),
        OutputFormat::Yaml => {
            if text.trim().is_empty() {
                return Ok(PackageBundle::new());
            }
            serde_yml::from_str(text).map_err(AppError::YamlError)
        }
        OutputFormat::Toon => toon::decode_bundle(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bundle() -> PackageBundle {
        let mut bundle = PackageBundle::new();
        bundle.insert("web-app", "src/index.ts", "import { a } from './a';\n\nconsole.log(a);\n");
        bundle.insert("web-app", "src/a.ts", "export const a = \"quoted\" + 'single';\r\n");
        bundle.insert("web-app", "empty.ts", "");
        bundle.insert("web-app", "numbers.ts", "42");
        bundle.insert("web-app", "bool.ts", "true");
        bundle.insert("web-app", "dash.ts", "- list: item");
        bundle.insert("web-app", "unicode/ünï.ts", "const s = 'héllo ✓ 日本語';\t// tab");
        bundle.insert("web-app", "spaces.ts", "  padded  ");
        bundle.insert("web-app", "braces.ts", "{ [1, 2] }\\n literal backslash-n");
        bundle.insert("api", "main.ts", "#!/usr/bin/env node\n# not a comment: really");
        bundle
    }

    #[test]
    fn json_is_pretty_printed_with_two_spaces() {
        let mut bundle = PackageBundle::new();
        bundle.insert("pkg", "a.ts", "x");
        let json = encode(&bundle, OutputFormat::Json).unwrap();
        assert_eq!(json, "{\n  \"pkg\": {\n    \"a.ts\": \"x\"\n  }\n}");
    }

    #[test]
    fn json_reencode_is_byte_identical() {
        let bundle = sample_bundle();
        let first = encode(&bundle, OutputFormat::Json).unwrap();
        let decoded = decode(&first, OutputFormat::Json).unwrap();
        let second = encode(&decoded, OutputFormat::Json).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn every_format_decodes_to_the_same_bundle() {
        let bundle = sample_bundle();
        let from_json = decode(
            &encode(&bundle, OutputFormat::Json).unwrap(),
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(from_json, bundle);

        for format in [OutputFormat::Yaml, OutputFormat::Toon] {
            let encoded = encode(&bundle, format).unwrap();
            let decoded = decode(&encoded, format).unwrap();
            assert_eq!(decoded, from_json, "format {format}");
            let order: Vec<_> = decoded.files().map(|(_, p, _)| p.to_string()).collect();
            let expected: Vec<_> = bundle.files().map(|(_, p, _)| p.to_string()).collect();
            assert_eq!(order, expected, "format {format} keeps insertion order");
        }
    }

    #[test]
    fn empty_bundle_round_trips_in_every_format() {
        let bundle = PackageBundle::new();
        for format in OutputFormat::ALL {
            let encoded = encode(&bundle, format).unwrap();
            assert_eq!(decode(&encoded, format).unwrap(), bundle, "format {format}");
        }
    }

    #[test]
    fn format_parsing_and_extensions() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("toon".parse::<OutputFormat>().unwrap(), OutputFormat::Toon);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
        assert_eq!(OutputFormat::Yaml.extension(), ".yaml");
        assert_eq!(OutputFormat::Toon.extension(), ".toon");
    }
}
