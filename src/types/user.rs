use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct User {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}
