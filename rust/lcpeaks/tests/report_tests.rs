use lcpeaks::report::RawDataRow;
use lcpeaks::{
    AnalysisConfig,
    LcError,
    LcReport,
    LcRun,
    MissingPolicy,
    SmoothingConfig,
};

const SAMPLE_REPORT: &str = "Injection Information:
Data Vault\tChromeleonLocal
Injection\tBSA 2 mg/mL
Injection Number\t7
Position\tRA3
Comment\t
Processing Method\tSEC_default
Instrument Method\tSEC_30min
Type\tUnknown
Status\tFinished
Injection Date\t3/14/2023
Injection Time\t10:24:51 AM
Injection Volume (µL)\t10.000
Dilution Factor\t1.0000
Weight\t1.0000

Chromatogram Data Information:
Time Min. (min)\t0.000
Time Max. (min)\t0.011
Data Points\t12
Detector\tUV
Generating Data System\tChromeleon SR1 7.2.10
Exporting Data System\tChromeleon SR1 7.2.10
Operator\tlab
Signal Quantity\tAbsorbance
Signal Unit\tmAU
Signal Min.\t0.000
Signal Max.\t5.000
Channel\tUV_VIS_1
Driver Name\tUV Detector
Channel Type\tUV
Min. Step (s)\t0.060
Max. Step (s)\t0.060
Average Step (s)\t0.060

Signal Parameter Information:
Signal Info\tWVL:280 nm

Chromatogram Data:
Time (min)\tStep (s)\tValue (mAU)
0.000\tn.a.\t0.000
0.001\t0.060\t0.000
0.002\t0.060\t1.000
0.003\t0.060\t3.000
0.004\t0.060\t1.000
0.005\t0.060\t0.000
0.006\t0.060\t0.000
0.007\t0.060\t3.000
0.008\t0.060\t5.000
0.009\t0.060\t3.000
0.010\t0.060\t0.000
0.011\t0.060\t0.000
";

fn write_temp_report(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("lcpeaks_report_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_parse_sample_report() {
    let report = LcReport::parse_str(SAMPLE_REPORT).unwrap();
    assert_eq!(report.len(), 12);
    assert_eq!(
        report.rows[0],
        RawDataRow {
            time: Some(0.0),
            step: None,
            value: Some(0.0),
        }
    );
    assert_eq!(report.rows[8].value, Some(5.0));

    let injection = report.metadata.injection_info();
    assert_eq!(injection.injection.as_deref(), Some("BSA 2 mg/mL"));
    assert_eq!(injection.injection_number, Some(7));
    assert_eq!(injection.injection_volume_ul, Some(10.0));
    assert_eq!(injection.comment.as_deref(), Some(""));
    assert_eq!(report.metadata.injection.len(), 14);

    let info = report.metadata.chromatogram_data_info();
    assert_eq!(info.data_points, Some(12));
    assert_eq!(info.signal_unit.as_deref(), Some("mAU"));
    assert_eq!(info.average_step_seconds, Some(0.06));

    assert_eq!(
        report.metadata.signal_parameter.get("Signal Info").map(String::as_str),
        Some("WVL:280 nm")
    );
}

#[test]
fn test_parse_handles_crlf_and_bom() {
    let windows = format!("\u{feff}{}", SAMPLE_REPORT.replace('\n', "\r\n"));
    let report = LcReport::parse_str(&windows).unwrap();
    assert_eq!(report.len(), 12);
    assert_eq!(report.metadata.injection_info().injection_number, Some(7));
}

#[test]
fn test_malformed_value_is_reported_with_line() {
    let broken = SAMPLE_REPORT.replace("0.008\t0.060\t5.000", "0.008\t0.060\tfive");
    match LcReport::parse_str(&broken) {
        Err(LcError::MalformedDataRow { line, reason }) => {
            assert_eq!(line, 49);
            assert!(reason.contains("value"));
        }
        other => panic!("Expected malformed data row, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let path = std::env::temp_dir().join("lcpeaks_report_tests_does_not_exist.txt");
    match LcReport::from_path(&path) {
        Err(LcError::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_latin1_export_keeps_metadata() {
    // Instrument software on Windows often writes Latin-1: `µ` is the single byte 0xB5.
    let bytes: Vec<u8> = SAMPLE_REPORT
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap())
        .collect();
    assert!(String::from_utf8(bytes.clone()).is_err());

    let dir = std::env::temp_dir().join("lcpeaks_report_tests");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("latin1.txt");
    std::fs::write(&path, &bytes).unwrap();

    let report = LcReport::from_path(&path).unwrap();
    assert_eq!(report.len(), 12);
    assert_eq!(report.metadata.injection_info().injection_volume_ul, Some(10.0));
    assert!(report.metadata.injection.contains_key("Injection Volume (µL)"));
}

#[test]
fn test_run_from_file_end_to_end() {
    let path = write_temp_report("two_bumps.txt", SAMPLE_REPORT);
    let run = LcRun::from_path(&path, MissingPolicy::Reject).unwrap();
    assert_eq!(run.name, "two_bumps.txt");
    assert_eq!(run.len(), 12);
    assert_eq!(run.steps.num_missing(), 1);

    let analysis = run.analyze(&AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.peaks.peak_indices(), vec![3, 8]);
    assert!(analysis.smoothed.is_none());
    // Same spans as the index-time case, scaled by the 0.001 min step.
    assert!((analysis.elution_volume - 0.016).abs() < 1e-9);
}

#[test]
fn test_missing_time_inside_peak_fails_the_run() {
    let gappy = SAMPLE_REPORT.replace("0.003\t0.060\t3.000", "n.a.\t0.060\t3.000");
    let path = write_temp_report("gappy_time.txt", &gappy);

    let run = LcRun::from_path(&path, MissingPolicy::Reject).unwrap();
    assert!(matches!(
        run.analyze(&AnalysisConfig::default()),
        Err(LcError::MissingTimeData { index: 3 })
    ));

    // Dropping the incomplete row lets the run through.
    let run = LcRun::from_path(&path, MissingPolicy::DropIncomplete).unwrap();
    assert_eq!(run.len(), 11);
    let analysis = run.analyze(&AnalysisConfig::default()).unwrap();
    assert_eq!(analysis.peaks.len(), 2);
}

#[test]
fn test_smoothed_analysis_keeps_smoothed_series() {
    let run = LcRun::from_report(
        LcReport::parse_str(SAMPLE_REPORT).unwrap(),
        MissingPolicy::Reject,
    );
    let config = AnalysisConfig {
        smoothing: Some(SmoothingConfig {
            window: 3,
            polyorder: 1,
        }),
        ..Default::default()
    };
    let analysis = run.analyze(&config).unwrap();
    let smoothed = analysis.smoothed.as_ref().unwrap();
    assert_eq!(smoothed.len(), run.len());
    assert_eq!(analysis.peaks.peak_indices(), vec![3, 8]);

    let too_wide = AnalysisConfig {
        smoothing: Some(SmoothingConfig::default()),
        ..Default::default()
    };
    // 11 samples fit into 12, 13 do not.
    assert!(run.analyze(&too_wide).is_ok());
    let config = AnalysisConfig {
        smoothing: Some(SmoothingConfig {
            window: 13,
            polyorder: 1,
        }),
        ..Default::default()
    };
    assert!(matches!(
        run.analyze(&config),
        Err(LcError::InvalidParameter(_))
    ));
}

#[test]
fn test_config_from_json() {
    let config: AnalysisConfig = serde_json::from_str(
        r#"{
            "detection": { "min_height": 2.5 },
            "smoothing": { "window": 7 },
            "missing_policy": "drop_incomplete"
        }"#,
    )
    .unwrap();
    assert_eq!(config.detection.min_height, 2.5);
    assert_eq!(
        config.smoothing,
        Some(SmoothingConfig {
            window: 7,
            polyorder: 1,
        })
    );
    assert_eq!(config.missing_policy, MissingPolicy::DropIncomplete);

    let empty: AnalysisConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, AnalysisConfig::default());
}
