use atelier_lucide::benchmark::{benchmark, normalize_loudness, CohortMember, Diagnostic, EmptyCohort};
use atelier_lucide::config::{BenchmarkThresholds, DissonanceThresholds, LabelThresholds};
use atelier_lucide::fusion::{
    audio_labels, audio_mood, dissonance, popularity_label, tempo_label, text_valence,
    DissonanceBand,
};
use atelier_lucide::{AudioSignal, CatalogDescriptors, LyricOrigin, LyricSignal};

fn lyric(polarity: f64) -> LyricSignal {
    LyricSignal {
        polarity,
        subjectivity: 0.4,
        unique_tokens: 80,
        origin: LyricOrigin::Retrieved {
            provider: "lyrics.ovh".to_string(),
        },
        preview: Vec::new(),
    }
}

fn member(energy: f64) -> CohortMember {
    CohortMember {
        energy,
        danceability: 0.65,
        valence: 0.5,
        acousticness: 0.25,
        loudness_db: -7.0,
        popularity: 55,
        duration_ms: 195_000,
    }
}

#[test]
fn test_mood_and_dissonance_scenario() {
    let audio = AudioSignal::from_excerpt(Some(150.0), 0.22, 3500.0, 0.15);
    assert!((audio_mood(&audio).unwrap() - 0.625).abs() < 1e-12);

    let sad = lyric(-0.6);
    assert!((text_valence(&sad) - 0.2).abs() < 1e-12);

    let result = dissonance(Some(&audio), Some(&sad), &DissonanceThresholds::default()).unwrap();
    assert!((result.score - 0.425).abs() < 1e-9);
    assert_eq!(result.band, DissonanceBand::StrongCreativeTension);
    assert_eq!(result.band.to_string(), "strong creative tension");
    assert!(result.band.is_tension());
}

#[test]
fn test_dissonance_needs_both_signals() {
    let audio = AudioSignal::from_excerpt(Some(100.0), 0.2, 2000.0, 0.1);
    let thresholds = DissonanceThresholds::default();
    assert_eq!(dissonance(None, Some(&lyric(0.1)), &thresholds), None);
    assert_eq!(dissonance(Some(&audio), None, &thresholds), None);
    assert_eq!(dissonance(None, None, &thresholds), None);
}

#[test]
fn test_dissonance_stays_in_unit_interval() {
    let thresholds = DissonanceThresholds::default();
    for tempo in [0.0, 60.0, 95.0, 180.0, 400.0] {
        for centroid in [0.0, 1000.0, 2500.0, 6000.0, 20_000.0] {
            let audio = AudioSignal::from_excerpt(Some(tempo), 0.2, centroid, 0.1);
            for polarity in [-1.0, -0.3, 0.0, 0.4, 1.0] {
                let score = dissonance(Some(&audio), Some(&lyric(polarity)), &thresholds)
                    .unwrap()
                    .score;
                assert!((0.0..=1.0).contains(&score), "{tempo} {centroid} {polarity}: {score}");
            }
        }
    }
}

#[test]
fn test_catalog_valence_drives_mood() {
    let audio = AudioSignal::from_catalog(&CatalogDescriptors {
        tempo: 124.0,
        energy: 0.8,
        danceability: 0.75,
        valence: 0.9,
        acousticness: 0.05,
        loudness: -4.2,
        duration_ms: 201_000,
    });
    assert_eq!(audio_mood(&audio), Some(0.9));

    let result =
        dissonance(Some(&audio), Some(&lyric(0.7)), &DissonanceThresholds::default()).unwrap();
    assert!((result.score - 0.05).abs() < 1e-9);
    assert_eq!(result.band, DissonanceBand::VeryCoherent);
}

#[test]
fn test_band_edges() {
    let thresholds = DissonanceThresholds::default();
    assert_eq!(
        DissonanceBand::classify(0.19, &thresholds),
        DissonanceBand::VeryCoherent
    );
    assert_eq!(
        DissonanceBand::classify(0.2, &thresholds),
        DissonanceBand::CoherentWithNuance
    );
    assert_eq!(
        DissonanceBand::classify(0.4, &thresholds),
        DissonanceBand::StrongCreativeTension
    );
}

#[test]
fn test_labels_follow_thresholds() {
    let defaults = LabelThresholds::default();
    assert_eq!(tempo_label(150.0, &defaults).label, "very fast");
    assert_eq!(tempo_label(79.9, &defaults).label, "slow");
    assert_eq!(popularity_label(40, &defaults).label, "growing");
    assert_eq!(popularity_label(100, &defaults).label, "mainstream");

    let relaxed = LabelThresholds {
        tempo: [90.0, 160.0, 200.0],
        ..LabelThresholds::default()
    };
    assert_eq!(tempo_label(150.0, &relaxed).label, "moderate");

    let excerpt = AudioSignal::from_excerpt(Some(150.0), 0.22, 3500.0, 0.3);
    let labels: Vec<&str> = audio_labels(&excerpt, &defaults)
        .iter()
        .map(|l| l.label)
        .collect();
    assert_eq!(labels, vec!["very fast", "moderate", "bright", "dynamic"]);
}

#[test]
fn test_low_energy_scenario() {
    let cohort = [member(0.4), member(0.5), member(0.6)];
    let report = benchmark(&member(0.3), &cohort, &BenchmarkThresholds::default()).unwrap();

    assert_eq!(report.diagnostics, vec![Diagnostic::LowEnergy]);
    assert_eq!(
        report.diagnostics[0].to_string(),
        "Energy below style average"
    );
    assert!((report.cohort.energy - 0.5).abs() < 1e-12);
    assert_eq!(report.cohort.member_count, 3);
}

#[test]
fn test_target_equal_to_cohort_mean_is_well_aligned() {
    let cohort = [member(0.5), member(0.5)];
    let report = benchmark(&member(0.5), &cohort, &BenchmarkThresholds::default()).unwrap();
    assert_eq!(report.diagnostics, vec![Diagnostic::WellAligned]);
    assert_eq!(report.radar.cohort, report.radar.target);
}

#[test]
fn test_every_firing_rule_is_reported() {
    let cohort = [member(0.5)];
    let target = CohortMember {
        energy: 0.9,
        danceability: 0.3,
        valence: 0.1,
        duration_ms: 300_000,
        ..member(0.5)
    };
    let report = benchmark(&target, &cohort, &BenchmarkThresholds::default()).unwrap();
    assert_eq!(
        report.diagnostics,
        vec![
            Diagnostic::TooLong,
            Diagnostic::HighEnergy,
            Diagnostic::LowDanceability,
            Diagnostic::Darker,
        ]
    );
}

#[test]
fn test_empty_cohort_is_explicit() {
    let result = benchmark(&member(0.5), &[], &BenchmarkThresholds::default());
    assert_eq!(result, Err(EmptyCohort));
}

#[test]
fn test_loudness_clamping_is_configurable() {
    assert_eq!(normalize_loudness(-30.0, true), 0.5);
    assert_eq!(normalize_loudness(-75.0, true), 0.0);
    assert_eq!(normalize_loudness(-75.0, false), -0.25);
    assert_eq!(normalize_loudness(3.0, true), 1.0);

    let quiet = CohortMember {
        loudness_db: -90.0,
        ..member(0.5)
    };
    let unclamped = BenchmarkThresholds {
        clamp_loudness: false,
        ..BenchmarkThresholds::default()
    };
    let report = benchmark(&quiet, &[member(0.5)], &unclamped).unwrap();
    assert_eq!(report.radar.target[4], -0.5);
}
