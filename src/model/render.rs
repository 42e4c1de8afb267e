use serde::{Deserialize, Serialize};

use crate::model::{Template, TemplateRef};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub preview: bool,
}

/// Input of the pre-render resolution step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template: TemplateRef,

    /// Report name chosen by the caller, wins over the template name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,

    #[serde(default)]
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(template: TemplateRef) -> Self {
        Self {
            template,
            ..Default::default()
        }
    }
}

/// Fully resolved template plus the side information handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutcome {
    pub template: Template,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<String>,

    /// `/` joined folder names from the root down to the template's parent
    pub current_folder_path: String,
}
