// tests/transform_pipeline.rs

mod common;
use crate::common::{MarkingTransform, ProjectBuilder, TestResult, init_tracing, write_file};

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::tempdir;

use shadowpack::changes::FileSet;
use shadowpack::config::BuildSettings;
use shadowpack::errors::BuildError;
use shadowpack::fs::join_rel;
use shadowpack::pipeline::{
    IdentityTransform, LocalizationCopier, SourceTransform, TransformPipeline, TransformTask,
    parse_failure, run_bounded, wrap_spec,
};
use shadowpack::types::{FailurePolicy, SpecFlavor};

fn pipeline(
    settings: &BuildSettings,
    transform: Arc<dyn SourceTransform>,
    flavor: SpecFlavor,
    policy: FailurePolicy,
) -> TransformPipeline {
    TransformPipeline::new(
        transform,
        settings.script_matcher.clone(),
        settings.spec_matcher.clone(),
        flavor,
        policy,
        4,
    )
}

fn task(src_root: &Path, dst_root: &Path, rel: &str) -> TransformTask {
    TransformTask {
        rel: rel.to_string(),
        src: join_rel(src_root, rel),
        dst: join_rel(dst_root, rel),
    }
}

#[tokio::test]
async fn assets_are_copied_byte_for_byte() -> TestResult {
    init_tracing();
    let src = tempdir()?;
    let dst = tempdir()?;
    let bytes: Vec<u8> = (0u8..=255).cycle().take(70_000).collect();
    std::fs::create_dir_all(src.path().join("images"))?;
    std::fs::write(src.path().join("images/logo.png"), &bytes)?;
    std::fs::create_dir_all(dst.path().join("images"))?;

    let settings = ProjectBuilder::new("app").settings(src.path());
    let transform = MarkingTransform::new("/*t*/");
    let report = pipeline(
        &settings,
        Arc::new(transform.clone()),
        SpecFlavor::Jasmine,
        FailurePolicy::Abort,
    )
    .run(vec![task(src.path(), dst.path(), "images/logo.png")])
    .await?;

    assert_eq!(report.copied, 1);
    assert_eq!(report.transformed, 0);
    assert_eq!(std::fs::read(dst.path().join("images/logo.png"))?, bytes);
    assert!(transform.seen().is_empty(), "assets never reach the transform");
    Ok(())
}

#[tokio::test]
async fn scripts_are_transformed_and_only_specs_get_a_shim() -> TestResult {
    init_tracing();
    for flavor in [SpecFlavor::Jasmine, SpecFlavor::MochaShould, SpecFlavor::MochaChai] {
        let src = tempdir()?;
        let dst = tempdir()?;
        write_file(src.path(), "ui/view.js", "view();");
        write_file(src.path(), "spec/app_spec.js", "describe();");
        std::fs::create_dir_all(dst.path().join("ui"))?;
        std::fs::create_dir_all(dst.path().join("spec"))?;

        let settings = ProjectBuilder::new("app").settings(src.path());
        let report = pipeline(
            &settings,
            Arc::new(MarkingTransform::new("/*t*/")),
            flavor,
            FailurePolicy::Abort,
        )
        .run(vec![
            task(src.path(), dst.path(), "ui/view.js"),
            task(src.path(), dst.path(), "spec/app_spec.js"),
        ])
        .await?;

        assert_eq!(report.transformed, 2);
        assert_eq!(
            std::fs::read_to_string(dst.path().join("ui/view.js"))?,
            "/*t*/view();"
        );
        assert_eq!(
            std::fs::read_to_string(dst.path().join("spec/app_spec.js"))?,
            format!("{}/*t*/describe();", flavor.shim())
        );
    }
    Ok(())
}

#[test]
fn shims_match_the_framework_loaders() {
    assert!(SpecFlavor::Jasmine.shim().starts_with("var __jasmine = require('/lib/jasmine');"));
    assert!(SpecFlavor::Jasmine.shim().contains("'xdescribe','jasmine'"));
    assert_eq!(SpecFlavor::MochaShould.shim(), "require('/lib/should');\n");
    assert_eq!(
        SpecFlavor::MochaChai.shim(),
        "var chai = require('/lib/chai'); var expect = chai.expect; var assert = chai.assert;\n"
    );
    assert_eq!(
        wrap_spec(SpecFlavor::MochaShould, "it();"),
        "require('/lib/should');\nit();"
    );
}

#[tokio::test]
async fn abort_policy_fails_after_all_siblings_settle() -> TestResult {
    init_tracing();
    let src = tempdir()?;
    let dst = tempdir()?;
    write_file(src.path(), "a.js", "a");
    write_file(src.path(), "broken.js", "(");
    write_file(src.path(), "c.js", "c");

    let settings = ProjectBuilder::new("app").settings(src.path());
    let result = pipeline(
        &settings,
        Arc::new(MarkingTransform::new("").failing_on("broken.js")),
        SpecFlavor::Jasmine,
        FailurePolicy::Abort,
    )
    .run(vec![
        task(src.path(), dst.path(), "a.js"),
        task(src.path(), dst.path(), "broken.js"),
        task(src.path(), dst.path(), "c.js"),
    ])
    .await;

    match result {
        Err(BuildError::Transform {
            path, line, column, ..
        }) => {
            assert!(path.ends_with("broken.js"));
            assert_eq!((line, column), (Some(3), Some(7)));
        }
        other => panic!("expected transform error, got {other:?}"),
    }
    assert!(dst.path().join("a.js").exists());
    assert!(dst.path().join("c.js").exists());
    assert!(!dst.path().join("broken.js").exists());
    Ok(())
}

#[tokio::test]
async fn log_and_continue_skips_the_failed_file() -> TestResult {
    init_tracing();
    let src = tempdir()?;
    let dst = tempdir()?;
    write_file(src.path(), "a.js", "a");
    write_file(src.path(), "broken.js", "(");

    let settings = ProjectBuilder::new("app").settings(src.path());
    let report = pipeline(
        &settings,
        Arc::new(MarkingTransform::new("").failing_on("broken.js")),
        SpecFlavor::Jasmine,
        FailurePolicy::LogAndContinue,
    )
    .run(vec![
        task(src.path(), dst.path(), "a.js"),
        task(src.path(), dst.path(), "broken.js"),
    ])
    .await?;

    assert_eq!(report.transformed, 1);
    assert_eq!(report.failed, vec!["broken.js"]);
    assert!(!dst.path().join("broken.js").exists());
    Ok(())
}

#[tokio::test]
async fn missing_staging_directory_is_fatal_under_either_policy() -> TestResult {
    init_tracing();
    let src = tempdir()?;
    let dst = tempdir()?;
    write_file(src.path(), "ui/view.js", "v");

    let settings = ProjectBuilder::new("app").settings(src.path());
    let result = pipeline(
        &settings,
        Arc::new(IdentityTransform),
        SpecFlavor::Jasmine,
        FailurePolicy::LogAndContinue,
    )
    .run(vec![task(src.path(), dst.path(), "ui/view.js")])
    .await;

    assert!(matches!(result, Err(BuildError::Filesystem { .. })));
    Ok(())
}

#[tokio::test]
async fn scripts_with_invalid_utf8_are_still_transformed() -> TestResult {
    init_tracing();
    let src = tempdir()?;
    let dst = tempdir()?;
    std::fs::create_dir_all(src.path().join("ui"))?;
    std::fs::write(src.path().join("ui/view.js"), b"var s = '\xff\xfe';\n")?;
    std::fs::create_dir_all(dst.path().join("ui"))?;

    let settings = ProjectBuilder::new("app").settings(src.path());
    let report = pipeline(
        &settings,
        Arc::new(IdentityTransform),
        SpecFlavor::Jasmine,
        FailurePolicy::Abort,
    )
    .run(vec![task(src.path(), dst.path(), "ui/view.js")])
    .await?;

    assert_eq!(report.transformed, 1);
    assert!(report.failed.is_empty());
    let out = std::fs::read_to_string(dst.path().join("ui/view.js"))?;
    assert!(out.contains('\u{FFFD}'), "unexpected output: {out:?}");
    Ok(())
}

#[tokio::test]
async fn localisation_files_are_copied_unchanged() -> TestResult {
    let src = tempdir()?;
    let dst = tempdir()?;
    write_file(src.path(), "en/strings.xml", "<resources/>");
    write_file(src.path(), "de/strings.xml", "<resources></resources>");
    let files = FileSet::from_files(["de/strings.xml", "en/strings.xml"]);
    shadowpack::fs::ensure_dirs(dst.path(), &files.dirs)?;

    let copied = LocalizationCopier::new(1)
        .run(&files, src.path(), dst.path())
        .await?;

    assert_eq!(copied, 2);
    assert_eq!(
        std::fs::read_to_string(dst.path().join("de/strings.xml"))?,
        "<resources></resources>"
    );
    Ok(())
}

#[test]
fn failure_locations_are_picked_out_of_stderr() {
    let words = parse_failure("Parse error: Unexpected token: punc ())\nLine 12, col 4\n");
    assert_eq!(words.message, "Parse error: Unexpected token: punc ())");
    assert_eq!((words.line, words.column), (Some(12), Some(4)));

    let pair = parse_failure("/tmp/app/ui/view.js:3:17: SyntaxError: missing )\n");
    assert_eq!((pair.line, pair.column), (Some(3), Some(17)));

    let bare = parse_failure("\n\nsomething went wrong\n");
    assert_eq!(bare.message, "something went wrong");
    assert_eq!((bare.line, bare.column), (None, None));

    assert_eq!(parse_failure("").message, "transform failed");
}

#[tokio::test]
async fn pool_never_exceeds_its_limit_and_keeps_input_order() -> TestResult {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let results = {
        let in_flight = Arc::clone(&in_flight);
        let peak = Arc::clone(&peak);
        run_bounded((0..20u64).collect(), 3, move |n| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20 - n)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                n * 10
            }
        })
        .await?
    };

    assert_eq!(results, (0..20u64).map(|n| n * 10).collect::<Vec<_>>());
    assert!(peak.load(Ordering::SeqCst) <= 3);
    assert!(peak.load(Ordering::SeqCst) >= 1);
    Ok(())
}
