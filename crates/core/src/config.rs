//! 설정 관리 -- cefpost.toml 파싱 및 런타임 설정
//!
//! [`CefpostConfig`]는 로깅과 파서 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`CEFPOST_PARSER_TIMEZONE=Europe/Berlin` 형식)
//! 3. 설정 파일 (`cefpost.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), cefpost_core::error::CefpostError> {
//! use cefpost_core::config::CefpostConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = CefpostConfig::load("cefpost.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = CefpostConfig::parse("[parser]\ntimezone = \"Europe/Berlin\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CefpostError, ConfigError};

/// 기본 최대 라인 길이 (바이트)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// cefpost 통합 설정
///
/// `cefpost.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CefpostConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// CEF 파서 설정
    #[serde(default)]
    pub parser: ParserConfig,
}

impl CefpostConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CefpostError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, CefpostError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CefpostError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CefpostError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, CefpostError> {
        toml::from_str(toml_str).map_err(|e| {
            CefpostError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `CEFPOST_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "CEFPOST_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "CEFPOST_GENERAL_LOG_FORMAT");

        override_string(&mut self.parser.timezone, "CEFPOST_PARSER_TIMEZONE");
        override_usize(
            &mut self.parser.max_line_length,
            "CEFPOST_PARSER_MAX_LINE_LENGTH",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 타임존 이름 자체의 해석은 파서 생성 시점에 수행됩니다.
    pub fn validate(&self) -> Result<(), CefpostError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.parser.timezone.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "parser.timezone".to_owned(),
                reason: "timezone must not be empty".to_owned(),
            }
            .into());
        }

        if self.parser.max_line_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "parser.max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// CEF 파서 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// syslog 타임스탬프에 붙일 타임존 (IANA 이름 또는 `+01:00` 형식 오프셋)
    pub timezone: String,
    /// 허용하는 최대 라인 길이 (바이트)
    pub max_line_length: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_owned(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}
