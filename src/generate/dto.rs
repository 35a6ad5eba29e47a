use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GenerateManualRequest {
    pub topic: String,
    #[serde(default = "default_target_audience")]
    pub target_audience: String,
    #[serde(default = "default_industry")]
    pub industry: String,
}

fn default_target_audience() -> String {
    "Potential Investors".to_string()
}

fn default_industry() -> String {
    "General".to_string()
}

#[derive(Debug, Deserialize)]
pub struct GeneratePosterParams {
    pub theme: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateVideoParams {
    pub script: String,
    pub avatar_id: String,
}
