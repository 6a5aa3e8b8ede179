// Mountpoint status as exposed over HTTP

use serde::{Deserialize, Serialize};

use crate::mount_point::MountOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountStatus {
    /// Filesystem identifier the path was derived from.
    pub id: String,
    pub path: String,
    pub exists: bool,
    pub mounted: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateParams {
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnlinkParams {
    pub force: Option<bool>,
}

/// Options as sent by clients: `"defaults,nofail"` or `["defaults", "nofail"]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionsInput {
    Text(String),
    List(Vec<String>),
}

impl Default for OptionsInput {
    fn default() -> Self {
        OptionsInput::Text(String::new())
    }
}

impl From<OptionsInput> for MountOptions {
    fn from(input: OptionsInput) -> Self {
        match input {
            OptionsInput::Text(s) => MountOptions::from(s),
            OptionsInput::List(v) => MountOptions::from(v),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MountRequest {
    #[serde(default)]
    pub options: OptionsInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UmountParams {
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub lazy: bool,
}
