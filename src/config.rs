use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::catalog::VesselCatalog;
use crate::titer::SurvivalConvention;

/// 기본 설정 파일 이름.
pub const DEFAULT_CONFIG_PATH: &str = "lentivirus.toml";

/// 애플리케이션 설정. 시작 시 한 번 로드한 뒤 읽기 전용으로 계산기에 넘긴다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// 생존율→감염 분율 변환 규약
    #[serde(default)]
    pub survival_convention: SurvivalConvention,
    #[serde(default)]
    pub catalog: VesselCatalog,
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 파일 입출력 오류
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// TOML 역직렬화 오류
    #[error("설정 파싱 오류: {0}")]
    Serde(#[from] toml::de::Error),
    /// TOML 직렬화 오류
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// 카탈로그 값 검증 실패
    #[error("용기 카탈로그 오류: {0}")]
    Invalid(String),
}

/// 설정 파일을 읽고 카탈로그를 검증한다.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&content)?;
    cfg.catalog.validate().map_err(ConfigError::Invalid)?;
    tracing::debug!(path = %path.display(), vessels = cfg.catalog.vessels.len(), "config loaded");
    Ok(cfg)
}

/// 설정 파일을 로드하거나 없으면 기본 설정을 생성한다.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_from(path)
    } else {
        let cfg = Config::default();
        cfg.save(path)?;
        tracing::info!(path = %path.display(), "wrote default config");
        Ok(cfg)
    }
}

impl Config {
    /// 설정을 TOML 파일로 저장한다.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
