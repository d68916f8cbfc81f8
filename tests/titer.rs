//! MOI/역가 계산 테스트. 포아송 보정, 경계 조건, 평균 집계, 런 상태 전이.
mod common;

use common::assert_close;
use lentivirus_toolbox::titer::{
    average_titer, compute_moi, compute_titer, round_titer, score_sample, SampleRole, SampleState,
    SurvivalConvention, TiterRun, TiterSample,
};
use lentivirus_toolbox::CalcError;

const COMPLEMENT: SurvivalConvention = SurvivalConvention::Complement;

#[test]
fn worked_example_200k_cells_10ul_80_percent() {
    let score = score_sample(80.0, Some(100.0), 10.0, 200_000.0, COMPLEMENT).expect("score");
    assert_close("survival", score.survival_fraction, 0.8, 1e-12);
    assert_close("infected", score.infected_fraction, 0.2, 1e-12);
    let moi = score.moi.expect("moi");
    assert_close("moi", moi, 0.223_143_551_314_209_8, 1e-12);
    let titer = score.titer_tu_ml.expect("titer");
    assert_close("titer", titer, 4_462_871.026_284_195, 1e-9);
}

#[test]
fn missing_control_defaults_to_100_percent() {
    let explicit = score_sample(80.0, Some(100.0), 10.0, 200_000.0, COMPLEMENT).expect("explicit");
    let implicit = score_sample(80.0, None, 10.0, 200_000.0, COMPLEMENT).expect("implicit");
    assert_eq!(explicit, implicit);
}

#[test]
fn control_baseline_normalizes_measurement() {
    let score = score_sample(40.0, Some(80.0), 10.0, 100_000.0, COMPLEMENT).expect("score");
    assert_close("survival", score.survival_fraction, 0.5, 1e-12);
    assert_close("moi", score.moi.expect("moi"), std::f64::consts::LN_2, 1e-12);
}

#[test]
fn moi_is_non_decreasing_as_survival_drops() {
    let mut previous = 0.0;
    for step in 0..=99 {
        let measured = 100.0 - step as f64;
        let score = score_sample(measured, Some(100.0), 5.0, 50_000.0, COMPLEMENT).expect("score");
        let moi = score.moi.expect("below saturation");
        assert!(moi >= previous, "measured={measured} moi={moi} previous={previous}");
        previous = moi;
    }
}

#[test]
fn no_infection_gives_zero_moi_and_titer() {
    let score = score_sample(90.0, Some(90.0), 10.0, 200_000.0, COMPLEMENT).expect("score");
    assert_eq!(score.moi, Some(0.0));
    assert_eq!(score.titer_tu_ml, Some(0.0));
}

#[test]
fn saturation_is_unscoreable() {
    let score = score_sample(0.0, Some(100.0), 10.0, 200_000.0, COMPLEMENT).expect("score");
    assert_eq!(score.moi, None);
    assert_eq!(score.titer_tu_ml, None);
    assert_eq!(compute_moi(1.0), None);
    assert_eq!(compute_moi(0.0), Some(0.0));
}

#[test]
fn zero_virus_volume_gives_no_titer() {
    let score = score_sample(50.0, None, 0.0, 200_000.0, COMPLEMENT).expect("score");
    assert!(score.moi.is_some());
    assert_eq!(score.titer_tu_ml, None);
    assert_eq!(compute_titer(0.5, 1000.0, 0.0), None);
}

#[test]
fn out_of_range_survival_is_flagged() {
    for (measured, control) in [(120.0, 100.0), (-5.0, 100.0), (90.0, 80.0)] {
        let err = score_sample(measured, Some(control), 10.0, 1000.0, COMPLEMENT).unwrap_err();
        assert!(
            matches!(err, CalcError::InvalidMeasurement(_)),
            "{measured}/{control}: {err:?}"
        );
    }
}

#[test]
fn invalid_inputs_are_rejected() {
    let cases = [
        score_sample(50.0, Some(0.0), 10.0, 1000.0, COMPLEMENT),
        score_sample(50.0, None, 10.0, 0.0, COMPLEMENT),
        score_sample(50.0, None, -1.0, 1000.0, COMPLEMENT),
        score_sample(50.0, None, f64::NAN, 1000.0, COMPLEMENT),
    ];
    for result in cases {
        assert!(matches!(result, Err(CalcError::InvalidInput(_))), "{result:?}");
    }
}

#[test]
fn direct_convention_inverts_the_transform() {
    let score =
        score_sample(20.0, None, 10.0, 200_000.0, SurvivalConvention::Direct).expect("score");
    assert_close("infected", score.infected_fraction, 0.2, 1e-12);
    assert_close("moi", score.moi.expect("moi"), -(0.8f64).ln(), 1e-12);
    let full = score_sample(100.0, None, 10.0, 200_000.0, SurvivalConvention::Direct).expect("full");
    assert_eq!(full.moi, None);
}

fn scored_run() -> TiterRun {
    let mut run = TiterRun::new(7, 200_000.0)
        .expect("run")
        .with_sample(TiterSample::new(1, "10 µL", 10.0, true))
        .with_sample(TiterSample::new(2, "20 µL", 20.0, true))
        .with_sample(TiterSample::new(3, "saturated", 50.0, true))
        .with_sample(TiterSample::new(4, "no virus + selection", 0.0, true))
        .with_sample(TiterSample::new(5, "no virus, no selection", 0.0, false))
        .with_sample(TiterSample::new(6, "not read yet", 5.0, true));
    run.record_percent(1, 80.0).expect("well 1");
    run.record_percent(2, 64.0).expect("well 2");
    run.record_percent(3, 0.0).expect("well 3");
    run.record_percent(4, 2.0).expect("well 4");
    run.record_percent(5, 100.0).expect("well 5");
    run.score(COMPLEMENT).expect("score run");
    run
}

#[test]
fn roles_are_inferred_from_volume_and_selection() {
    assert_eq!(SampleRole::infer(10.0, true), SampleRole::Test);
    assert_eq!(SampleRole::infer(10.0, false), SampleRole::Test);
    assert_eq!(SampleRole::infer(0.0, true), SampleRole::ControlWithSelection);
    assert_eq!(SampleRole::infer(0.0, false), SampleRole::ControlWithoutSelection);
}

#[test]
fn run_scores_only_test_wells_and_tracks_state() {
    let run = scored_run();
    let state = |id| run.sample(id).expect("sample").state();
    assert_eq!(state(1), SampleState::Scored);
    assert_eq!(state(3), SampleState::Scored);
    assert_eq!(state(4), SampleState::Measured);
    assert_eq!(state(5), SampleState::Measured);
    assert_eq!(state(6), SampleState::Unmeasured);
    assert_eq!(run.sample(4).expect("control").titer_tu_ml(), None);
    assert_eq!(run.sample(3).expect("saturated").moi(), None);
}

#[test]
fn average_excludes_controls_saturated_and_unmeasured_wells() {
    let run = scored_run();
    let t1 = run.sample(1).and_then(TiterSample::titer_tu_ml).expect("t1");
    let t2 = run.sample(2).and_then(TiterSample::titer_tu_ml).expect("t2");
    // 64% 생존 = 0.8², 부피 2배이므로 두 웰의 역가가 같다
    assert_close("equal titers", t1, t2, 1e-12);
    assert_close("average", run.average_titer().expect("avg"), (t1 + t2) / 2.0, 1e-12);
}

#[test]
fn average_of_empty_and_single_sample() {
    assert_eq!(average_titer(&[]), None);

    let mut run = TiterRun::new(1, 200_000.0)
        .expect("run")
        .with_sample(TiterSample::new(1, "only", 10.0, true));
    run.record_percent(1, 80.0).expect("record");
    run.score(COMPLEMENT).expect("score");
    let own = run.sample(1).and_then(TiterSample::titer_tu_ml).expect("own");
    assert_eq!(run.average_titer(), Some(own));
}

#[test]
fn failed_scoring_leaves_run_unchanged() {
    let mut run = scored_run();
    let before = run.clone();
    run.control_percent = Some(50.0);
    let snapshot = run.clone();
    let err = run.score(COMPLEMENT).unwrap_err();
    assert!(matches!(err, CalcError::InvalidMeasurement(_)), "{err:?}");
    assert_eq!(run, snapshot);
    assert_eq!(run.samples, before.samples);
}

#[test]
fn re_recording_resets_score() {
    let mut run = scored_run();
    run.record_percent(1, 50.0).expect("re-record");
    assert_eq!(run.sample(1).expect("well").state(), SampleState::Measured);
    run.clear_measurement(2).expect("clear");
    assert_eq!(run.sample(2).expect("well").state(), SampleState::Unmeasured);
    assert!(matches!(
        run.record_percent(99, 50.0),
        Err(CalcError::InvalidInput(_))
    ));
}

#[test]
fn cell_concentration_readout_uses_control_well() {
    let mut run = TiterRun::new(3, 100_000.0)
        .expect("run")
        .with_sample(TiterSample::new(1, "virus", 10.0, true))
        .with_sample(TiterSample::new(2, "control", 0.0, false));
    run.record_cell_concentration(2, 400_000.0).expect("control");
    run.record_cell_concentration(1, 200_000.0).expect("test");
    assert_eq!(run.control_cells(), Some(400_000.0));
    run.score(COMPLEMENT).expect("score");
    let sample = run.sample(1).expect("well");
    assert_close("percent", sample.measured_percent.expect("percent"), 50.0, 1e-12);
    assert_close("moi", sample.moi().expect("moi"), std::f64::consts::LN_2, 1e-12);

    // 대조군 농도를 알 수 없으면 측정 상태로 남는다
    let mut orphan = TiterRun::new(4, 100_000.0)
        .expect("run")
        .with_sample(TiterSample::new(1, "virus", 10.0, true));
    orphan.record_cell_concentration(1, 200_000.0).expect("test");
    orphan.score(COMPLEMENT).expect("score");
    assert_eq!(orphan.sample(1).expect("well").state(), SampleState::Measured);
}

#[test]
fn titer_rounding_keeps_three_significant_figures() {
    assert_eq!(round_titer(4_462_871.03), 4_460_000.0);
    assert_eq!(round_titer(12_345.0), 12_300.0);
    assert_eq!(round_titer(87.6), 88.0);
    assert_eq!(round_titer(0.0), 0.0);
}

#[test]
fn explicit_control_concentration_wins_over_control_well() {
    let mut run = TiterRun::new(5, 100_000.0)
        .expect("run")
        .with_sample(TiterSample::new(1, "virus", 10.0, true))
        .with_sample(TiterSample::new(2, "control", 0.0, false));
    run.record_cell_concentration(2, 400_000.0).expect("control");
    run.record_cell_concentration(1, 200_000.0).expect("test");
    run.control_cell_concentration = Some(800_000.0);
    assert_eq!(run.control_cells(), Some(800_000.0));
    run.score(COMPLEMENT).expect("score");
    let sample = run.sample(1).expect("well");
    assert_close("percent", sample.measured_percent.expect("percent"), 25.0, 1e-12);
    assert_close("moi", sample.moi().expect("moi"), 4.0_f64.ln(), 1e-12);
}
