use codepack_core::{AppError, Result, VisualizationData, VisualizationRenderer};
use log;
use rust_embed::RustEmbed;

const TEMPLATE_FILE: &str = "visualization.html";
const DATA_PLACEHOLDER: &str = "__CODEPACK_DATA__";

#[derive(RustEmbed)]
#[folder = "../data/"]
struct TemplateAssets;

/// Self-contained treemap page with the `{tree, stats}` payload inlined.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlVisualization;

impl VisualizationRenderer for HtmlVisualization {
    fn extension(&self) -> &str {
        ".html"
    }

    fn render(&self, data: &VisualizationData) -> Result<String> {
        let template = load_template()?;
        if !template.contains(DATA_PLACEHOLDER) {
            return Err(AppError::Template(format!(
                "{} has no {} placeholder",
                TEMPLATE_FILE, DATA_PLACEHOLDER
            )));
        }
        // Inline script: keep `</script>` inside string values from closing the tag.
        let payload = serde_json::to_string(data)?.replace("</", "<\\/");
        log::trace!("Embedding {} bytes of visualization data", payload.len());
        Ok(template.replacen(DATA_PLACEHOLDER, &payload, 1))
    }
}

fn load_template() -> Result<String> {
    let asset = TemplateAssets::get(TEMPLATE_FILE).ok_or_else(|| {
        AppError::Template(format!("{} not found in embedded assets", TEMPLATE_FILE))
    })?;
    let content = std::str::from_utf8(asset.data.as_ref())
        .map_err(|e| AppError::Template(format!("UTF-8 error in {}: {}", TEMPLATE_FILE, e)))?;
    Ok(content.to_string())
}
