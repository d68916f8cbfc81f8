use crate::catalog::VesselCatalog;
use crate::error::{require_non_negative, CalcError, CalcResult};
use crate::units::{convert_mass, MassUnit};

/// transfer:packaging:envelope 플라스미드 DNA 비율. 세 값 모두 양수이며 배율과 무관하다(4:3:1 ≡ 8:6:2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DnaRatio {
    transfer: f64,
    packaging: f64,
    envelope: f64,
}

impl DnaRatio {
    /// 기본(최적) 비율 4:3:1
    pub const OPTIMAL: DnaRatio = DnaRatio {
        transfer: 4.0,
        packaging: 3.0,
        envelope: 1.0,
    };

    pub fn new(transfer: f64, packaging: f64, envelope: f64) -> CalcResult<Self> {
        for (name, v) in [
            ("transfer", transfer),
            ("packaging", packaging),
            ("envelope", envelope),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(CalcError::InvalidRatio(format!(
                    "{name} 비율은 0보다 큰 유한한 값이어야 합니다: {v}"
                )));
            }
        }
        if !(transfer + packaging + envelope).is_finite() {
            return Err(CalcError::InvalidRatio(format!(
                "비율 합이 너무 큽니다: {transfer}:{packaging}:{envelope}"
            )));
        }
        Ok(Self {
            transfer,
            packaging,
            envelope,
        })
    }

    /// 정확히 3개의 값으로부터 비율을 만든다.
    pub fn from_slice(values: &[f64]) -> CalcResult<Self> {
        match *values {
            [a, b, c] => Self::new(a, b, c),
            _ => Err(CalcError::InvalidRatio(format!(
                "비율 값은 3개여야 합니다 (입력 {}개)",
                values.len()
            ))),
        }
    }

    pub fn components(&self) -> [f64; 3] {
        [self.transfer, self.packaging, self.envelope]
    }

    /// 각 성분이 전체에서 차지하는 분율.
    pub fn fractions(&self) -> [f64; 3] {
        let sum = self.transfer + self.packaging + self.envelope;
        self.components().map(|c| c / sum)
    }

    /// "4:3:1" 형태의 표시 문자열.
    pub fn display(&self) -> String {
        let [a, b, c] = self.components();
        format!("{a}:{b}:{c}")
    }
}

/// 비율 모드. 최적(4:3:1) 또는 사용자 지정.
#[derive(Debug, Clone, PartialEq)]
pub enum RatioMode {
    Optimal,
    Custom(DnaRatio),
}

impl RatioMode {
    pub fn ratio(&self) -> DnaRatio {
        match self {
            RatioMode::Optimal => DnaRatio::OPTIMAL,
            RatioMode::Custom(ratio) => *ratio,
        }
    }
}

/// 플라스미드별 농도 [ng/µL]. 0 이하 값은 미입력으로 취급한다.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlasmidConcentrations {
    pub transfer: Option<f64>,
    pub packaging: Option<f64>,
    pub envelope: Option<f64>,
}

/// 플라스미드 하나의 질량과 피펫팅 부피.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlasmidAmount {
    pub mass_ug: f64,
    /// 농도가 없으면 `None` (부피 미정 상태)
    pub volume_ul: Option<f64>,
}

/// 형질주입 계산 결과. 호출마다 새로 만든다.
#[derive(Debug, Clone, PartialEq)]
pub struct TransfectionPlan {
    pub vessel_type: String,
    pub surface_ratio: f64,
    pub ratio: DnaRatio,
    pub opti_mem_ml: f64,
    pub reagent_ul: f64,
    pub total_plasmid_ug: f64,
    pub transfer: PlasmidAmount,
    pub packaging: PlasmidAmount,
    pub envelope: PlasmidAmount,
}

impl TransfectionPlan {
    /// 시약 µL / DNA µg. DNA가 0이면 `None`.
    pub fn reagent_to_dna_ratio(&self) -> Option<f64> {
        (self.total_plasmid_ug > 0.0).then(|| self.reagent_ul / self.total_plasmid_ug)
    }

    pub fn ratio_display(&self) -> String {
        self.ratio.display()
    }
}

/// 질량[µg]과 농도[ng/µL]로 필요한 부피[µL]를 구한다.
pub fn plasmid_volume_ul(mass_ug: f64, concentration_ng_ul: Option<f64>) -> Option<f64> {
    let conc = concentration_ng_ul.filter(|c| c.is_finite() && *c > 0.0)?;
    Some(convert_mass(mass_ug, MassUnit::Microgram, MassUnit::Nanogram) / conc)
}

/// 용기, 비율, 농도로 Opti-MEM, 시약, 플라스미드별 DNA 양을 계산한다.
pub fn compute_transfection_plan(
    catalog: &VesselCatalog,
    vessel_type: &str,
    mode: &RatioMode,
    concentrations: &PlasmidConcentrations,
) -> CalcResult<TransfectionPlan> {
    let reference = &catalog.transfection;
    let surface_ratio = catalog.surface_ratio(vessel_type, reference.surface_area_cm2)?;
    let spec = catalog.lookup(vessel_type)?;

    // 용기 자체 보정값이 있으면 면적 환산 없이 사용
    let opti_mem_ml = require_non_negative(
        spec.reference_opti_mem_ml.unwrap_or(reference.opti_mem_ml * surface_ratio),
        "Opti-MEM 부피",
    )?;
    let reagent_ul = require_non_negative(
        spec.reference_reagent_ul.unwrap_or(reference.reagent_ul * surface_ratio),
        "형질주입 시약 부피",
    )?;
    let total_plasmid_ug = require_non_negative(
        spec.reference_dna_ug.unwrap_or(reference.total_plasmid_ug * surface_ratio),
        "총 플라스미드 질량",
    )?;

    let ratio = mode.ratio();
    let [f_transfer, f_packaging, f_envelope] = ratio.fractions();
    let amount = |fraction: f64, conc: Option<f64>| {
        let mass_ug = total_plasmid_ug * fraction;
        PlasmidAmount {
            mass_ug,
            volume_ul: plasmid_volume_ul(mass_ug, conc),
        }
    };

    let plan = TransfectionPlan {
        vessel_type: vessel_type.to_string(),
        surface_ratio,
        ratio,
        opti_mem_ml,
        reagent_ul,
        total_plasmid_ug,
        transfer: amount(f_transfer, concentrations.transfer),
        packaging: amount(f_packaging, concentrations.packaging),
        envelope: amount(f_envelope, concentrations.envelope),
    };
    tracing::debug!(
        vessel_type,
        ratio = %plan.ratio_display(),
        total_plasmid_ug,
        "transfection plan"
    );
    Ok(plan)
}
