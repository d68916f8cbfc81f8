use serde::{Deserialize, Serialize};

use crate::error::{require_positive, CalcError, CalcResult};
use crate::units::{convert_volume, VolumeUnit};

/// 대조군 기준값이 없을 때 쓰는 생존율[%].
pub const DEFAULT_CONTROL_PERCENT: f64 = 100.0;

// 부동소수점 잡음으로 1을 살짝 넘는 분율은 허용한다.
const FRACTION_TOLERANCE: f64 = 1e-9;

/// 생존 분율을 감염 분율로 바꾸는 규약.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurvivalConvention {
    /// 감염 분율 = 1 - 생존 분율 (화면 차트의 "% infected" 표기와 동일)
    #[default]
    Complement,
    /// 감염 분율 = 생존 분율 (선택 배지에서 살아남은 세포가 형질도입된 세포)
    Direct,
}

impl SurvivalConvention {
    pub fn infected_fraction(self, survival_fraction: f64) -> f64 {
        match self {
            SurvivalConvention::Complement => 1.0 - survival_fraction,
            SurvivalConvention::Direct => survival_fraction,
        }
    }
}

/// 웰 하나의 점수 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleScore {
    pub survival_fraction: f64,
    pub infected_fraction: f64,
    /// 포화(모든 세포 감염) 시 `None`
    pub moi: Option<f64>,
    /// MOI가 없거나 바이러스 부피가 0이면 `None`
    pub titer_tu_ml: Option<f64>,
}

/// 포아송 0-클래스 보정: MOI = -ln(1 - f).
///
/// f = 1이면 다중도를 추정할 수 없으므로 `None`.
pub fn compute_moi(infected_fraction: f64) -> Option<f64> {
    if !infected_fraction.is_finite() || infected_fraction >= 1.0 {
        return None;
    }
    if infected_fraction <= 0.0 {
        return Some(0.0);
    }
    Some(-(-infected_fraction).ln_1p())
}

/// 기능적 역가[TU/mL] = MOI × 세포 수 / 바이러스 부피[mL].
pub fn compute_titer(moi: f64, cells_seeded: f64, virus_volume_ul: f64) -> Option<f64> {
    let volume_ml = convert_volume(virus_volume_ul, VolumeUnit::Microliter, VolumeUnit::Milliliter);
    if volume_ml <= 0.0 {
        return None;
    }
    let titer = moi * cells_seeded / volume_ml;
    titer.is_finite().then_some(titer)
}

/// 측정 생존율을 대조군으로 정규화해 MOI와 역가를 계산한다.
///
/// `control_percent`가 `None`이면 100%를 기준으로 한다.
pub fn score_sample(
    measured_percent: f64,
    control_percent: Option<f64>,
    virus_volume_ul: f64,
    cells_seeded: f64,
    convention: SurvivalConvention,
) -> CalcResult<SampleScore> {
    let baseline = require_positive(
        control_percent.unwrap_or(DEFAULT_CONTROL_PERCENT),
        "대조군 생존율",
    )?;
    require_positive(cells_seeded, "접종 세포 수")?;
    if !virus_volume_ul.is_finite() || virus_volume_ul < 0.0 {
        return Err(CalcError::InvalidInput(format!(
            "바이러스 부피는 0 이상이어야 합니다: {virus_volume_ul}"
        )));
    }

    let raw = measured_percent / baseline;
    if !raw.is_finite() || raw < -FRACTION_TOLERANCE || raw > 1.0 + FRACTION_TOLERANCE {
        tracing::warn!(measured_percent, baseline, "survival fraction out of range");
        return Err(CalcError::InvalidMeasurement(format!(
            "생존 분율 {raw:.4}이(가) [0, 1] 범위를 벗어났습니다 (측정 {measured_percent}%, 대조군 {baseline}%)"
        )));
    }
    let survival_fraction = raw.clamp(0.0, 1.0);
    let infected_fraction = convention.infected_fraction(survival_fraction);
    let moi = compute_moi(infected_fraction);
    let titer_tu_ml = moi.and_then(|m| compute_titer(m, cells_seeded, virus_volume_ul));

    tracing::debug!(survival_fraction, ?moi, ?titer_tu_ml, "scored sample");
    Ok(SampleScore {
        survival_fraction,
        infected_fraction,
        moi,
        titer_tu_ml,
    })
}

/// 보고용으로 역가를 유효숫자 3자리로 반올림한다. 100 미만은 정수로 반올림한다.
pub fn round_titer(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = (value.abs().log10().floor() as i32 - 2).max(0);
    let base = 10f64.powi(magnitude);
    (value / base).round() * base
}
