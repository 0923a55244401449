// tests/patch_notification.rs

mod common;
use crate::common::{ChannelCall, ProjectBuilder, RecordingChannel, TestResult};

use std::path::Path;

use tempfile::tempdir;

use shadowpack::patch::{Notification, PatchNotifier};
use shadowpack::types::BuildMode;

fn changed() -> Vec<String> {
    [
        "app.js",
        "images/logo.png",
        "ui/view.js",
        "en/strings.xml",
        "spec/app_spec.js",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[tokio::test]
async fn patch_carries_only_scripts_in_change_order() -> TestResult {
    let dir = tempdir()?;
    let settings = ProjectBuilder::new("myapp").settings(dir.path());
    let channel = RecordingChannel::new();
    let notifier = PatchNotifier::new(&channel, &settings.script_matcher);
    let bundle = Path::new("/tmp/myapp.zip");

    let sent = notifier
        .notify(BuildMode::Incremental, true, bundle, &changed())
        .await?;

    let expected = vec![
        "app.js".to_string(),
        "ui/view.js".to_string(),
        "spec/app_spec.js".to_string(),
    ];
    assert_eq!(sent, Notification::Patch(expected.clone()));
    assert_eq!(
        channel.calls(),
        vec![ChannelCall::Patch(bundle.to_path_buf(), expected)]
    );
    Ok(())
}

#[tokio::test]
async fn full_builds_register_the_whole_bundle_even_in_patch_mode() -> TestResult {
    let dir = tempdir()?;
    let settings = ProjectBuilder::new("myapp").settings(dir.path());
    let channel = RecordingChannel::new();
    let notifier = PatchNotifier::new(&channel, &settings.script_matcher);
    let bundle = Path::new("/tmp/myapp.zip");

    let sent = notifier
        .notify(BuildMode::Full, true, bundle, &changed())
        .await?;

    assert_eq!(sent, Notification::Bundle);
    assert_eq!(channel.calls(), vec![ChannelCall::Bundle(bundle.to_path_buf())]);
    Ok(())
}

#[tokio::test]
async fn incremental_builds_without_patch_mode_register_the_bundle() -> TestResult {
    let dir = tempdir()?;
    let settings = ProjectBuilder::new("myapp").settings(dir.path());
    let channel = RecordingChannel::new();
    let notifier = PatchNotifier::new(&channel, &settings.script_matcher);

    let sent = notifier
        .notify(
            BuildMode::Incremental,
            false,
            Path::new("/tmp/myapp.zip"),
            &changed(),
        )
        .await?;

    assert_eq!(sent, Notification::Bundle);
    Ok(())
}

#[test]
fn patch_set_of_non_scripts_is_empty() {
    let dir = tempdir().unwrap();
    let settings = ProjectBuilder::new("myapp").settings(dir.path());
    let channel = RecordingChannel::new();
    let notifier = PatchNotifier::new(&channel, &settings.script_matcher);

    let files = vec!["images/logo.png".to_string(), "en/strings.xml".to_string()];
    assert!(notifier.patch_set(&files).is_empty());
}
