use thiserror::Error;

/// 문자열 수치 해석 시 발생 가능한 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// 숫자로 해석할 수 없는 문자열
    #[error("숫자로 해석할 수 없음: {0}")]
    NotANumber(String),
    /// "a:b:c" 형식이 아닌 비율 문자열
    #[error("비율 형식 오류 (예: 4:3:1): {0}")]
    BadRatio(String),
}

fn suffix_multiplier(suffix: char) -> Option<f64> {
    match suffix.to_ascii_uppercase() {
        'K' => Some(1_000.0),
        'M' => Some(1_000_000.0),
        'B' => Some(1_000_000_000.0),
        _ => None,
    }
}

/// `750K`, `1.5M`, `2,000,000` 같은 약식 수치를 f64로 바꾼다.
///
/// 빈 문자열은 값 없음(`Ok(None)`)으로 본다.
pub fn parse_shorthand_number(text: &str) -> Result<Option<f64>, ConversionError> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(None);
    }
    if let Ok(v) = cleaned.parse::<f64>() {
        return Ok(Some(v));
    }
    let not_a_number = || ConversionError::NotANumber(text.to_string());
    let last = cleaned.chars().last().ok_or_else(not_a_number)?;
    let multiplier = suffix_multiplier(last).ok_or_else(not_a_number)?;
    let base = cleaned[..cleaned.len() - last.len_utf8()]
        .trim()
        .parse::<f64>()
        .map_err(|_| not_a_number())?;
    Ok(Some(base * multiplier))
}

/// "4:3:1" 또는 "4,3,1" 형태의 비율 문자열을 숫자 목록으로 바꾼다. 개수 검증은 하지 않는다.
pub fn parse_ratio(text: &str) -> Result<Vec<f64>, ConversionError> {
    let separator = if text.contains(':') { ':' } else { ',' };
    text.split(separator)
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| ConversionError::BadRatio(text.to_string()))
        })
        .collect()
}

/// 값이 반드시 있어야 하는 약식 수치를 해석한다. CLI 인자 파서로도 쓴다.
pub fn parse_required_number(text: &str) -> Result<f64, ConversionError> {
    parse_shorthand_number(text)?.ok_or_else(|| ConversionError::NotANumber(text.to_string()))
}
