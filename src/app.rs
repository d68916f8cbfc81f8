use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::conversion::ConversionError;
use crate::error::CalcError;
use crate::ui_cli::{self, Command};

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 파일 입출력 오류
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    /// 설정 저장/로드 오류
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    /// 수치/비율 문자열 해석 오류
    #[error("입력 해석 오류: {0}")]
    Conversion(#[from] ConversionError),
    /// 계산기 입력 오류
    #[error("계산 오류: {0}")]
    Calc(#[from] CalcError),
    /// JSON 출력 오류
    #[error("JSON 오류: {0}")]
    Json(#[from] serde_json::Error),
}

/// 하위 명령을 해당 계산기 화면으로 넘긴다.
pub fn run(command: &Command, config: &Config, json: bool) -> Result<(), AppError> {
    match command {
        Command::Vessels => ui_cli::handle_vessels(config, json),
        Command::Seeding(args) => ui_cli::handle_seeding(config, args, json),
        Command::Transfection(args) => ui_cli::handle_transfection(config, args, json),
        Command::Titer(args) => ui_cli::handle_titer(config, args, json),
    }
}
