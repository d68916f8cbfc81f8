use serde::{Deserialize, Serialize};

use super::moi::{score_sample, SampleScore, SurvivalConvention, DEFAULT_CONTROL_PERCENT};
use crate::error::{require_positive, CalcError, CalcResult};

/// 웰의 역할. 대조군은 기준점으로만 쓰이고 자체 역가를 갖지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRole {
    Test,
    ControlWithSelection,
    ControlWithoutSelection,
}

impl SampleRole {
    /// 바이러스가 들어간 웰은 시험군, 아니면 선택 배지 여부로 대조군 종류를 정한다.
    pub fn infer(virus_volume_ul: f64, selection_applied: bool) -> Self {
        if virus_volume_ul > 0.0 {
            SampleRole::Test
        } else if selection_applied {
            SampleRole::ControlWithSelection
        } else {
            SampleRole::ControlWithoutSelection
        }
    }
}

/// 웰의 측정 입력.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Measurement {
    #[default]
    Unmeasured,
    /// 대조군 대비 생존율[%]
    Percent(f64),
    /// 세포 계수 결과 [cells/mL]. 대조군 세포 농도와 비교해 생존율로 바꾼다.
    CellConcentration(f64),
}

/// unmeasured → measured → scored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    Unmeasured,
    Measured,
    Scored,
}

/// 역가 측정 웰 하나.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiterSample {
    pub id: u64,
    pub label: String,
    pub role: SampleRole,
    pub virus_volume_ul: f64,
    pub selection_applied: bool,
    #[serde(default)]
    pub measurement: Measurement,
    /// 마지막 점수 계산에 사용한 생존율[%]
    #[serde(default)]
    pub measured_percent: Option<f64>,
    #[serde(default)]
    pub score: Option<SampleScore>,
}

impl TiterSample {
    /// 바이러스 부피와 선택 배지 여부로 역할을 추론해 웰을 만든다.
    pub fn new(
        id: u64,
        label: impl Into<String>,
        virus_volume_ul: f64,
        selection_applied: bool,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            role: SampleRole::infer(virus_volume_ul, selection_applied),
            virus_volume_ul,
            selection_applied,
            measurement: Measurement::Unmeasured,
            measured_percent: None,
            score: None,
        }
    }

    pub fn state(&self) -> SampleState {
        match (self.measurement, self.score) {
            (Measurement::Unmeasured, _) => SampleState::Unmeasured,
            (_, Some(_)) => SampleState::Scored,
            (_, None) => SampleState::Measured,
        }
    }

    pub fn moi(&self) -> Option<f64> {
        self.score.and_then(|s| s.moi)
    }

    pub fn titer_tu_ml(&self) -> Option<f64> {
        self.score.and_then(|s| s.titer_tu_ml)
    }

    fn set_measurement(&mut self, measurement: Measurement) {
        self.measurement = measurement;
        self.measured_percent = None;
        self.score = None;
    }
}

/// 시험군 웰 중 유한하고 음이 아닌 역가의 산술 평균. 해당 웰이 없으면 `None`.
pub fn average_titer(samples: &[TiterSample]) -> Option<f64> {
    let titers: Vec<f64> = samples
        .iter()
        .filter(|s| s.role == SampleRole::Test)
        .filter_map(TiterSample::titer_tu_ml)
        .filter(|t| t.is_finite() && *t >= 0.0)
        .collect();
    if titers.is_empty() {
        return None;
    }
    Some(titers.iter().sum::<f64>() / titers.len() as f64)
}

/// 같은 접종 세포 수를 공유하는 역가 측정 배치.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TiterRun {
    pub run_id: u64,
    pub cells_seeded: f64,
    #[serde(default)]
    pub cell_line: Option<String>,
    #[serde(default)]
    pub vessel_type: Option<String>,
    /// 명시적 대조군 생존율[%]
    #[serde(default)]
    pub control_percent: Option<f64>,
    /// 명시적 대조군 세포 농도 [cells/mL]
    #[serde(default)]
    pub control_cell_concentration: Option<f64>,
    #[serde(default)]
    pub samples: Vec<TiterSample>,
}

impl TiterRun {
    pub fn new(run_id: u64, cells_seeded: f64) -> CalcResult<Self> {
        require_positive(cells_seeded, "접종 세포 수")?;
        Ok(Self {
            run_id,
            cells_seeded,
            cell_line: None,
            vessel_type: None,
            control_percent: None,
            control_cell_concentration: None,
            samples: Vec::new(),
        })
    }

    pub fn with_sample(mut self, sample: TiterSample) -> Self {
        self.samples.push(sample);
        self
    }

    pub fn sample(&self, id: u64) -> Option<&TiterSample> {
        self.samples.iter().find(|s| s.id == id)
    }

    fn sample_mut(&mut self, id: u64) -> CalcResult<&mut TiterSample> {
        let run_id = self.run_id;
        self.samples
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CalcError::InvalidInput(format!("런 {run_id}에 웰 {id}가 없습니다.")))
    }

    /// 생존율[%] 측정값을 기록한다. 이전 점수는 지운다.
    pub fn record_percent(&mut self, id: u64, percent: f64) -> CalcResult<()> {
        if !percent.is_finite() {
            return Err(CalcError::InvalidInput(format!(
                "측정 생존율은 유한한 값이어야 합니다: {percent}"
            )));
        }
        self.sample_mut(id)?
            .set_measurement(Measurement::Percent(percent));
        Ok(())
    }

    /// 세포 계수 결과[cells/mL]를 기록한다.
    pub fn record_cell_concentration(&mut self, id: u64, cells_per_ml: f64) -> CalcResult<()> {
        if !cells_per_ml.is_finite() || cells_per_ml < 0.0 {
            return Err(CalcError::InvalidInput(format!(
                "세포 농도는 0 이상이어야 합니다: {cells_per_ml}"
            )));
        }
        self.sample_mut(id)?
            .set_measurement(Measurement::CellConcentration(cells_per_ml));
        Ok(())
    }

    /// 측정값을 지우고 unmeasured 상태로 되돌린다.
    pub fn clear_measurement(&mut self, id: u64) -> CalcResult<()> {
        self.sample_mut(id)?.set_measurement(Measurement::Unmeasured);
        Ok(())
    }

    /// 생존율 정규화 기준[%]. 명시값이 없으면 100.
    pub fn control_baseline(&self) -> f64 {
        self.control_percent.unwrap_or(DEFAULT_CONTROL_PERCENT)
    }

    /// 세포 농도 판독의 기준. 명시값이 없으면 마지막 무선택 대조군 웰의 농도를 쓴다.
    pub fn control_cells(&self) -> Option<f64> {
        self.control_cell_concentration
            .or_else(|| {
                self.samples
                    .iter()
                    .rev()
                    .filter(|s| s.role == SampleRole::ControlWithoutSelection)
                    .find_map(|s| match s.measurement {
                        Measurement::CellConcentration(c) => Some(c),
                        _ => None,
                    })
            })
            .filter(|c| *c > 0.0)
    }

    /// 시험군 웰의 측정값을 생존율[%]과 정규화 기준으로 바꾼다. 계산할 수 없으면 `None`.
    fn percent_and_baseline(&self, measurement: Measurement) -> Option<(f64, f64)> {
        match measurement {
            Measurement::Unmeasured => None,
            Measurement::Percent(p) => Some((p, self.control_baseline())),
            Measurement::CellConcentration(c) => self
                .control_cells()
                .map(|control| (c / control * 100.0, DEFAULT_CONTROL_PERCENT)),
        }
    }

    /// 측정된 모든 시험군 웰의 점수를 다시 계산한다.
    ///
    /// 한 웰이라도 실패하면 오류를 돌려주고 어떤 웰의 상태도 바꾸지 않는다.
    pub fn score(&mut self, convention: SurvivalConvention) -> CalcResult<()> {
        let mut updates = Vec::with_capacity(self.samples.len());
        for (idx, sample) in self.samples.iter().enumerate() {
            if sample.role != SampleRole::Test {
                continue;
            }
            let Some((percent, baseline)) = self.percent_and_baseline(sample.measurement) else {
                updates.push((idx, None, None));
                continue;
            };
            let score = score_sample(
                percent,
                Some(baseline),
                sample.virus_volume_ul,
                self.cells_seeded,
                convention,
            )
            .map_err(|e| match e {
                CalcError::InvalidMeasurement(msg) => {
                    CalcError::InvalidMeasurement(format!("웰 {} ({}): {msg}", sample.id, sample.label))
                }
                other => other,
            })?;
            updates.push((idx, Some(percent), Some(score)));
        }

        for (idx, percent, score) in updates {
            let sample = &mut self.samples[idx];
            sample.measured_percent = percent;
            sample.score = score;
        }
        tracing::info!(run_id = self.run_id, average = ?self.average_titer(), "titer run scored");
        Ok(())
    }

    /// 현재 웰 상태로부터 평균 역가를 다시 계산한다. 저장하지 않는다.
    pub fn average_titer(&self) -> Option<f64> {
        average_titer(&self.samples)
    }
}
