use thiserror::Error;

use crate::catalog::UnknownVesselError;

/// 계산기 호출 시 발생 가능한 오류. 모두 호출자 입력 문제이며 재시도 의미가 없다.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// 카탈로그에 없는 용기 종류
    #[error(transparent)]
    UnknownVessel(#[from] UnknownVesselError),
    /// 0 이하, NaN/무한대 등 잘못된 수치 입력
    #[error("입력 오류: {0}")]
    InvalidInput(String),
    /// DNA 비율 개수 또는 값 오류
    #[error("DNA 비율 오류: {0}")]
    InvalidRatio(String),
    /// 정규화 후 생존 분율이 [0, 1]을 벗어남 (대조군 문제 가능성)
    #[error("측정값 오류: {0}")]
    InvalidMeasurement(String),
}

pub type CalcResult<T> = Result<T, CalcError>;

/// 양의 유한수인지 확인한다.
pub(crate) fn require_positive(value: f64, what: &str) -> CalcResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        tracing::warn!(value, what, "rejected non-positive input");
        return Err(CalcError::InvalidInput(format!(
            "{what}은(는) 0보다 큰 유한한 값이어야 합니다: {value}"
        )));
    }
    Ok(value)
}

/// 0 이상의 유한수인지 확인한다.
pub(crate) fn require_non_negative(value: f64, what: &str) -> CalcResult<f64> {
    if !value.is_finite() || value < 0.0 {
        tracing::warn!(value, what, "rejected negative input");
        return Err(CalcError::InvalidInput(format!(
            "{what}은(는) 0 이상의 유한한 값이어야 합니다: {value}"
        )));
    }
    Ok(value)
}
