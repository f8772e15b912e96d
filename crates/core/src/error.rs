//! 에러 타입 -- 도메인별 에러 정의

/// cefpost 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum CefpostError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// CEF 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 한 줄 전체를 거부하는 치명적 파싱 에러
///
/// 파서 크레이트의 상세 에러가 이 분류로 변환되어 상위 레이어로 전파됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 파이프 개수 부족, `CEF:<version>` 패턴 불일치, 헤더 이스케이프 오류
    #[error("malformed CEF header: {0}")]
    MalformedHeader(String),

    /// 확장 필드의 잘못된 이스케이프 또는 중복 키
    #[error("malformed CEF extension: {0}")]
    MalformedExtension(String),

    /// 확장 필드 섹션이 비어 있음
    #[error("no CEF payload found")]
    EmptyPayload,

    /// 인식할 수 없는 심각도
    #[error("invalid severity: {0}")]
    InvalidSeverity(String),

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}
