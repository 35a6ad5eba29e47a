use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DataApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_api: DataApiConfig,
    pub jwt: JwtConfig,
    pub llm: LlmConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_api = DataApiConfig {
            base_url: std::env::var("SUPABASE_URL")?,
            api_key: std::env::var("SUPABASE_KEY")?,
            timeout_secs: env_u64("DATA_API_TIMEOUT_SECS", 30),
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        let llm = LlmConfig {
            base_url: std::env::var("DASHSCOPE_BASE_URL")
                .unwrap_or_else(|_| "https://dashscope.aliyuncs.com".into()),
            api_key: std::env::var("DASHSCOPE_API_KEY").unwrap_or_default(),
            model: std::env::var("DASHSCOPE_MODEL").unwrap_or_else(|_| "qwen-plus".into()),
            timeout_secs: env_u64("DASHSCOPE_TIMEOUT_SECS", 60),
        };
        Ok(Self { data_api, jwt, llm })
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
