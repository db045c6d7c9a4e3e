use crate::bundle::PackageBundle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    pub total_files: usize,
    /// UTF-8 bytes of all collected contents.
    pub total_source_size: u64,
    /// Bytes of the artifact as persisted on disk.
    pub output_file_size: u64,
    pub estimated_tokens: usize,
}

impl ProcessingStats {
    /// `output_file_size` must be measured on the written artifact, not
    /// derived from `encoded`.
    pub fn compute(bundle: &PackageBundle, encoded: &str, output_file_size: u64) -> Self {
        Self {
            total_files: bundle.file_count(),
            total_source_size: bundle.source_size(),
            output_file_size,
            estimated_tokens: estimate_tokens(encoded),
        }
    }
}

/// Rough model-token estimate: `ceil(chars / 3.5)`, where chars counts Unicode
/// scalar values. A heuristic, not a tokenizer.
pub fn estimate_tokens(text: &str) -> usize {
    let chars = text.chars().count();
    // ceil(chars / 3.5) == ceil(2 * chars / 7), kept in integers
    (chars * 2).div_ceil(7)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{OutputFormat, encode};

    #[test]
    fn token_estimate_is_ceiling_of_code_points_over_three_and_a_half() {
        for (len, expected) in [(0, 0), (1, 1), (3, 1), (4, 2), (7, 2), (8, 3), (35, 10), (36, 11)] {
            let text = "a".repeat(len);
            assert_eq!(estimate_tokens(&text), expected, "length {len}");
            assert_eq!(expected, (len as f64 / 3.5).ceil() as usize);
        }
    }

    #[test]
    fn token_estimate_counts_code_points_not_bytes() {
        let text = "日本語日本語日"; // 7 code points, 21 bytes
        assert_eq!(estimate_tokens(text), 2);
    }

    #[test]
    fn compute_aggregates_the_bundle() {
        let mut bundle = PackageBundle::new();
        bundle.insert("a", "x.ts", "hé");
        bundle.insert("a", "y.ts", "1234");
        bundle.insert("b", "z.ts", "✓");

        let stats = ProcessingStats::compute(&bundle, "abcdefgh", 99);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_source_size, 3 + 4 + 3);
        assert_eq!(stats.output_file_size, 99);
        assert_eq!(stats.estimated_tokens, 3);
    }

    #[test]
    fn source_size_does_not_depend_on_format() {
        let mut bundle = PackageBundle::new();
        bundle.insert("pkg", "a.ts", "const s = \"ünïcödé\";\n");
        bundle.insert("pkg", "b/c.ts", "x");

        let sizes: Vec<u64> = OutputFormat::ALL
            .iter()
            .map(|format| {
                let encoded = encode(&bundle, *format).unwrap();
                ProcessingStats::compute(&bundle, &encoded, encoded.len() as u64).total_source_size
            })
            .collect();
        assert!(sizes.iter().all(|s| *s == sizes[0]));
        assert_eq!(sizes[0], "const s = \"ünïcödé\";\n".len() as u64 + 1);
    }

    #[test]
    fn serializes_in_camel_case() {
        let stats = ProcessingStats {
            total_files: 1,
            total_source_size: 2,
            output_file_size: 3,
            estimated_tokens: 4,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["totalFiles"], 1);
        assert_eq!(json["totalSourceSize"], 2);
        assert_eq!(json["outputFileSize"], 3);
        assert_eq!(json["estimatedTokens"], 4);
    }
}
