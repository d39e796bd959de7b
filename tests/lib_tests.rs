use clap::Parser;
use heicbatch::engine::arg_parser::Cli;
use heicbatch::engine::{converted_output_path, passthrough_output_path, png_compression_level};
use heicbatch::pipeline::{PipelineTuning, classify_file};
use heicbatch::utils::settings_file::parse_settings;
use heicbatch::utils::{CliSettings, WorkerThreadLimits, apply_file_to_settings, partial_path_for};
use heicbatch::{
    BatchConfig, ConfigError, OutputFormat, ProgressSnapshot, SourceFormat, Task, TaskError,
    TaskId,
};
use std::path::{Path, PathBuf};

// --- png_compression_level ---

#[test]
fn test_png_level_top_of_range_is_zero() {
    assert_eq!(png_compression_level(100), 0);
    assert_eq!(png_compression_level(91), 0);
}

#[test]
fn test_png_level_follows_floor_formula() {
    assert_eq!(png_compression_level(90), 1);
    assert_eq!(png_compression_level(75), 2);
    assert_eq!(png_compression_level(50), 5);
    assert_eq!(png_compression_level(11), 8);
}

#[test]
fn test_png_level_bottom_of_range_is_nine() {
    assert_eq!(png_compression_level(5), 9);
    assert_eq!(png_compression_level(1), 9);
}

// --- output naming ---

#[test]
fn test_converted_name_replaces_last_extension_only() {
    let out = converted_output_path(
        Path::new("/out"),
        Path::new("/in/a.b.heic"),
        OutputFormat::Png,
    );
    assert_eq!(out, PathBuf::from("/out/a.b.png"));
}

#[test]
fn test_converted_name_uses_lowercase_format_extension() {
    let out_dir = Path::new("/out");
    let jpg = converted_output_path(out_dir, Path::new("/in/IMG_1.HEIC"), OutputFormat::Jpeg);
    assert_eq!(jpg, PathBuf::from("/out/IMG_1.jpg"));
    let webp = converted_output_path(out_dir, Path::new("/in/x.heif"), OutputFormat::Webp);
    assert_eq!(webp, PathBuf::from("/out/x.webp"));
}

#[test]
fn test_passthrough_name_is_verbatim() {
    let out = passthrough_output_path(Path::new("/out"), Path::new("/in/Notes.TXT"));
    assert_eq!(out, PathBuf::from("/out/Notes.TXT"));
}

#[test]
fn test_partial_path_is_hidden_sibling_per_task() {
    let p = partial_path_for(Path::new("/out/a.png"), TaskId(3));
    assert_eq!(p, PathBuf::from("/out/.a.png.3.part"));
    assert_ne!(p, partial_path_for(Path::new("/out/a.png"), TaskId(4)));
}

// --- source / output formats ---

#[test]
fn test_source_extension_is_case_insensitive() {
    assert_eq!(SourceFormat::from_path(Path::new("a.HEIC")), Some(SourceFormat::Heic));
    assert_eq!(SourceFormat::from_path(Path::new("a.HeIf")), Some(SourceFormat::Heif));
    assert_eq!(SourceFormat::from_path(Path::new("a.jpg")), None);
    assert_eq!(SourceFormat::from_path(Path::new("heic")), None);
}

#[test]
fn test_source_match_uses_file_name_suffix() {
    assert_eq!(SourceFormat::from_path(Path::new("/in/.heic")), Some(SourceFormat::Heic));
    assert_eq!(SourceFormat::from_path(Path::new("/in/.HEIF")), Some(SourceFormat::Heif));
    assert_eq!(SourceFormat::from_path(Path::new("/in/photo.xheic")), None);
    assert_eq!(SourceFormat::from_path(Path::new("/in/photo.heic.txt")), None);
}

#[test]
fn test_hidden_heic_file_is_converted() {
    let config = BatchConfig::new("/in", "/out");
    match classify_file(Path::new("/in/.heic"), &config) {
        Task::Convert(req) => assert_eq!(req.output_path, PathBuf::from("/out/.heic.png")),
        other => panic!("expected convert task, got {other:?}"),
    }
}

#[test]
fn test_output_format_parse() {
    assert_eq!("PNG".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
    assert_eq!(" jpeg ".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
    assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
    assert_eq!("WebP".parse::<OutputFormat>().unwrap(), OutputFormat::Webp);
    assert!(matches!(
        "gif".parse::<OutputFormat>(),
        Err(ConfigError::UnsupportedFormat(f)) if f == "gif"
    ));
}

#[test]
fn test_classify_file_routes_by_extension() {
    let config = BatchConfig::new("/in", "/out").with_format(OutputFormat::Jpeg).with_quality(70);
    match classify_file(Path::new("/in/photo.heic"), &config) {
        Task::Convert(req) => {
            assert_eq!(req.output_path, PathBuf::from("/out/photo.jpg"));
            assert_eq!(req.quality, 70);
            assert_eq!(req.source_format, SourceFormat::Heic);
        }
        other => panic!("expected convert task, got {other:?}"),
    }
    match classify_file(Path::new("/in/photo.png"), &config) {
        Task::Copy(req) => assert_eq!(req.output_path, PathBuf::from("/out/photo.png")),
        other => panic!("expected copy task, got {other:?}"),
    }
}

// --- BatchConfig::validate ---

#[test]
fn test_validate_rejects_quality_before_touching_input_dir() {
    let missing = PathBuf::from("/definitely/not/here");
    let err = BatchConfig::new(&missing, "/out").with_quality(0).validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidQuality(0)));
    let err = BatchConfig::new(&missing, "/out").with_quality(101).validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidQuality(101)));
}

#[test]
fn test_validate_rejects_zero_workers() {
    let dir = tempfile::tempdir().unwrap();
    let err = BatchConfig::new(dir.path(), "/out").with_max_workers(0).validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidWorkerCount(0)));
}

#[test]
fn test_validate_rejects_missing_or_non_dir_input() {
    let dir = tempfile::tempdir().unwrap();
    let err = BatchConfig::new(dir.path().join("nope"), "/out").validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidInputDir { .. }));

    let file = dir.path().join("file.txt");
    std::fs::write(&file, b"x").unwrap();
    let err = BatchConfig::new(&file, "/out").validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidInputDir { .. }));
}

#[test]
fn test_validate_accepts_bounds() {
    let dir = tempfile::tempdir().unwrap();
    BatchConfig::new(dir.path(), "/out").with_quality(1).validate().unwrap();
    BatchConfig::new(dir.path(), "/out").with_quality(100).validate().unwrap();
}

// --- worker count ---

fn limits(all_threads: usize) -> WorkerThreadLimits {
    WorkerThreadLimits {
        all_threads,
        ..WorkerThreadLimits::default()
    }
}

#[test]
fn test_tuning_caps_automatic_workers_at_four() {
    let t = PipelineTuning::with_limits(None, 100, limits(16));
    assert_eq!(t.num_workers, 4);
    assert_eq!(t.channel_cap, 100);
}

#[test]
fn test_tuning_uses_available_parallelism_below_cap() {
    assert_eq!(PipelineTuning::with_limits(None, 100, limits(2)).num_workers, 2);
}

#[test]
fn test_tuning_never_exceeds_task_count() {
    assert_eq!(PipelineTuning::with_limits(None, 3, limits(16)).num_workers, 3);
    assert_eq!(PipelineTuning::with_limits(Some(8), 5, limits(16)).num_workers, 5);
}

#[test]
fn test_tuning_override_beats_cap() {
    assert_eq!(PipelineTuning::with_limits(Some(8), 100, limits(2)).num_workers, 8);
}

#[test]
fn test_tuning_floor_is_one() {
    let t = PipelineTuning::with_limits(None, 0, limits(0));
    assert_eq!(t.num_workers, 1);
    assert_eq!(t.channel_cap, 1);
}

// --- progress snapshot / task error ---

#[test]
fn test_snapshot_sentinel() {
    assert!(ProgressSnapshot::FAILED.is_failure());
    assert!(!ProgressSnapshot::new(0, 0).is_failure());
    assert_eq!(ProgressSnapshot::new(3, 7), ProgressSnapshot { completed: 3, total: 7 });
}

#[test]
fn test_task_error_labels() {
    assert_eq!(TaskError::decode("x").label(), "DecodeError");
    assert_eq!(TaskError::copy("x").label(), "CopyError");
    assert_eq!(TaskError::Cancelled.label(), "Cancelled");
}

#[test]
fn test_task_error_json_shape() {
    let json = serde_json::to_value(TaskError::decode("bad header")).unwrap();
    assert_eq!(json["kind"], "decode");
    assert_eq!(json["message"], "bad header");
}

// --- settings file + CLI precedence ---

#[test]
fn test_settings_file_parse() {
    let file = parse_settings(
        r#"
        [settings]
        quality = 75
        format = "jpeg"
        max_workers = 2
        verbose = true
        "#,
    )
    .unwrap();
    let mut settings = CliSettings::default();
    apply_file_to_settings(&file, &mut settings);
    assert_eq!(settings.quality, Some(75));
    assert_eq!(settings.format.as_deref(), Some("jpeg"));
    assert_eq!(settings.max_workers, Some(2));
    assert!(settings.verbose);
    assert!(!settings.fail_on_error);
}

#[test]
fn test_settings_file_rejects_unknown_keys() {
    assert!(parse_settings("[settings]\nqualty = 75\n").is_err());
}

#[test]
fn test_cli_flags_override_settings_file() {
    let file = parse_settings("[settings]\nquality = 75\nformat = \"webp\"\n").unwrap();
    let mut settings = CliSettings::default();
    apply_file_to_settings(&file, &mut settings);

    let args = ["heicbatch", "in", "out", "-q", "40", "--fail-on-error"];
    let cli = Cli::try_parse_from(args).unwrap();
    cli.apply_to_settings(&mut settings);
    assert_eq!(settings.quality, Some(40));
    assert_eq!(settings.format.as_deref(), Some("webp"));
    assert!(settings.fail_on_error);
}

#[test]
fn test_cli_no_log_file_disables_log_path() {
    let cli = Cli::try_parse_from(["heicbatch", "in", "out", "--no-log-file"]).unwrap();
    let settings = CliSettings {
        log_file: Some(PathBuf::from("/tmp/x.log")),
        ..CliSettings::default()
    };
    assert_eq!(cli.log_path(&settings), None);

    let cli = Cli::try_parse_from(["heicbatch", "in", "out", "--log-file", "/tmp/y.log"]).unwrap();
    let mut settings = CliSettings::default();
    cli.apply_to_settings(&mut settings);
    assert_eq!(cli.log_path(&settings), Some(PathBuf::from("/tmp/y.log")));
}
