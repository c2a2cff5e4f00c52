use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct CampaignSettings {
    #[serde(default = "default_fault_count")]
    pub fault_count: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub pattern: Option<u8>,
}

pub fn default_fault_count() -> u32 {
    1
}

impl Default for CampaignSettings {
    fn default() -> Self {
        Self {
            fault_count: default_fault_count(),
            seed: None,
            offset: None,
            pattern: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct BackupSettings {
    #[serde(default = "default_backup_extension")]
    pub extension: String,
}

pub fn default_backup_extension() -> String {
    "orig".to_string()
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            extension: default_backup_extension(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct GlitchConfig {
    #[serde(default)]
    pub campaign: Option<CampaignSettings>,
    #[serde(default)]
    pub backup: Option<BackupSettings>,
}

impl GlitchConfig {
    pub fn load_from_file(path: &PathBuf) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        let config: GlitchConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })?;

        Ok(config)
    }
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            campaign: Some(CampaignSettings::default()),
            backup: Some(BackupSettings::default()),
        }
    }
}
