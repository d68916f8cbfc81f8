//! JSON 요청/응답 계약과 이를 계산기에 연결하는 핸들러.
//! HTTP 라우팅은 외부 계층이 담당하고, 여기서는 본문 형태와 반올림 규칙만 맞춘다.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::catalog::VesselCatalog;
use crate::conversion::parse_shorthand_number;
use crate::error::{CalcError, CalcResult};
use crate::production::{
    compute_seeding_volume, compute_transfection_plan, DnaRatio, PlasmidConcentrations, RatioMode,
};
use crate::titer::{round_titer, SampleRole, SurvivalConvention, TiterRun};

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

/// 숫자, 숫자 문자열, 약식 수치("750K"), 빈 문자열, null을 모두 받아 `Option<f64>`로 만든다.
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LooseNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LooseNumber::Number(v)) => Ok(Some(v)),
        Some(LooseNumber::Text(s)) => parse_shorthand_number(&s).map_err(de::Error::custom),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedingVolumeRequest {
    pub vessel_type: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub target_cells: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedingVolumeResponse {
    pub seeding_volume_ml: f64,
}

/// `POST seeding-volume`
pub fn seeding_volume(
    catalog: &VesselCatalog,
    req: &SeedingVolumeRequest,
) -> CalcResult<SeedingVolumeResponse> {
    let target_cells = req
        .target_cells
        .ok_or_else(|| CalcError::InvalidInput("target_cells가 필요합니다.".into()))?;
    let volume = compute_seeding_volume(catalog, &req.vessel_type, target_cells)?;
    Ok(SeedingVolumeResponse {
        seeding_volume_ml: round_to(volume, 3),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioModeTag {
    #[default]
    Optimal,
    Custom,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransfectionPlanRequest {
    pub vessel_type: String,
    #[serde(default)]
    pub ratio_mode: RatioModeTag,
    #[serde(default)]
    pub ratio: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "optional_number")]
    pub transfer_concentration_ng_ul: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub packaging_concentration_ng_ul: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub envelope_concentration_ng_ul: Option<f64>,
}

impl TransfectionPlanRequest {
    /// 모드 태그와 비율 배열을 검증된 `RatioMode`로 바꾼다.
    pub fn ratio_mode(&self) -> CalcResult<RatioMode> {
        match (self.ratio_mode, &self.ratio) {
            (RatioModeTag::Optimal, _) => Ok(RatioMode::Optimal),
            (RatioModeTag::Custom, Some(values)) => {
                DnaRatio::from_slice(values).map(RatioMode::Custom)
            }
            (RatioModeTag::Custom, None) => Err(CalcError::InvalidRatio(
                "custom 모드에는 비율 3개가 필요합니다.".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransfectionPlanResponse {
    pub surface_ratio: f64,
    pub ratio: Vec<f64>,
    pub ratio_display: String,
    pub opti_mem_ml: f64,
    pub xtremegene_ul: f64,
    pub total_plasmid_ug: f64,
    pub transfer_mass_ug: f64,
    pub transfer_volume_ul: Option<f64>,
    pub packaging_mass_ug: f64,
    pub packaging_volume_ul: Option<f64>,
    pub envelope_mass_ug: f64,
    pub envelope_volume_ul: Option<f64>,
}

/// `POST transfection-plan`
pub fn transfection_plan(
    catalog: &VesselCatalog,
    req: &TransfectionPlanRequest,
) -> CalcResult<TransfectionPlanResponse> {
    let concentrations = PlasmidConcentrations {
        transfer: req.transfer_concentration_ng_ul,
        packaging: req.packaging_concentration_ng_ul,
        envelope: req.envelope_concentration_ng_ul,
    };
    let plan =
        compute_transfection_plan(catalog, &req.vessel_type, &req.ratio_mode()?, &concentrations)?;
    let r3 = |v: f64| round_to(v, 3);
    Ok(TransfectionPlanResponse {
        surface_ratio: plan.surface_ratio,
        ratio: plan.ratio.components().to_vec(),
        ratio_display: plan.ratio_display(),
        opti_mem_ml: r3(plan.opti_mem_ml),
        xtremegene_ul: r3(plan.reagent_ul),
        total_plasmid_ug: r3(plan.total_plasmid_ug),
        transfer_mass_ug: r3(plan.transfer.mass_ug),
        transfer_volume_ul: plan.transfer.volume_ul.map(r3),
        packaging_mass_ug: r3(plan.packaging.mass_ug),
        packaging_volume_ul: plan.packaging.volume_ul.map(r3),
        envelope_mass_ug: r3(plan.envelope.mass_ug),
        envelope_volume_ul: plan.envelope.volume_ul.map(r3),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct SampleResultInput {
    pub id: u64,
    #[serde(default, deserialize_with = "optional_number")]
    pub measured_percent: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub cell_concentration: Option<f64>,
    #[serde(default)]
    pub selection_used: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TiterResultsRequest {
    pub run_id: u64,
    #[serde(default, deserialize_with = "optional_number")]
    pub control_percent: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub control_cell_concentration: Option<f64>,
    #[serde(default)]
    pub samples: Vec<SampleResultInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleResult {
    pub id: u64,
    pub measured_percent: Option<f64>,
    pub moi: Option<f64>,
    pub titer_tu_ml: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiterResultsResponse {
    pub samples: Vec<SampleResult>,
    pub average_titer: Option<f64>,
}

/// `POST titer-results`
///
/// 측정값을 런에 반영하고 점수를 다시 계산한다. 실패하면 `run`은 바뀌지 않는다.
pub fn titer_results(
    run: &mut TiterRun,
    req: &TiterResultsRequest,
    convention: SurvivalConvention,
) -> CalcResult<TiterResultsResponse> {
    if req.run_id != run.run_id {
        return Err(CalcError::InvalidInput(format!(
            "요청 런 {}이(가) 대상 런 {}과(와) 다릅니다.",
            req.run_id, run.run_id
        )));
    }

    let mut updated = run.clone();
    if req.control_percent.is_some() {
        updated.control_percent = req.control_percent;
    }
    if req.control_cell_concentration.is_some() {
        updated.control_cell_concentration = req.control_cell_concentration;
    }
    for input in &req.samples {
        if let Some(selection) = input.selection_used {
            if let Some(sample) = updated.samples.iter_mut().find(|s| s.id == input.id) {
                sample.selection_applied = selection;
                sample.role = SampleRole::infer(sample.virus_volume_ul, selection);
            }
        }
        match (input.cell_concentration, input.measured_percent) {
            (Some(cells), _) => updated.record_cell_concentration(input.id, cells)?,
            (None, Some(percent)) => updated.record_percent(input.id, percent)?,
            (None, None) => updated.clear_measurement(input.id)?,
        }
    }
    updated.score(convention)?;

    let samples = req
        .samples
        .iter()
        .filter_map(|input| updated.sample(input.id))
        .map(|s| SampleResult {
            id: s.id,
            measured_percent: s.measured_percent.map(|p| round_to(p, 2)),
            moi: s.moi().map(|m| round_to(m, 4)),
            titer_tu_ml: s.titer_tu_ml().map(|t| round_to(t, 2)),
        })
        .collect();
    let average_titer = updated.average_titer().map(round_titer);
    *run = updated;
    Ok(TiterResultsResponse {
        samples,
        average_titer,
    })
}
