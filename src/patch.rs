// src/patch.rs

//! Telling running app instances about a new build.
//!
//! Delivery (HTTP, retries, which devices) belongs to the
//! [`NotificationChannel`] implementation; this module only decides *what*
//! to announce.

use std::path::Path;

use globset::GlobMatcher;
use tracing::info;

use crate::errors::Result;
use crate::exec::BoxFuture;
use crate::types::BuildMode;

/// Where new bundles and patches are announced.
pub trait NotificationChannel: Send + Sync {
    /// A complete bundle replaced the previous one.
    fn register_bundle<'a>(&'a self, bundle: &'a Path) -> BoxFuture<'a, Result<()>>;

    /// An incremental bundle carrying only `files` (in order) is available
    /// to hot-patch running instances.
    fn register_patch<'a>(&'a self, bundle: &'a Path, files: &'a [String])
    -> BoxFuture<'a, Result<()>>;
}

/// Channel that only logs. Used when no live target is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingChannel;

impl NotificationChannel for LoggingChannel {
    fn register_bundle<'a>(&'a self, bundle: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            info!(bundle = %bundle.display(), "new bundle available");
            Ok(())
        })
    }

    fn register_patch<'a>(
        &'a self,
        bundle: &'a Path,
        files: &'a [String],
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            info!(bundle = %bundle.display(), ?files, "new patch available");
            Ok(())
        })
    }
}

/// What was announced after a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Full bundle registration.
    Bundle,
    /// Patch with these script files.
    Patch(Vec<String>),
    /// Incremental patch build whose change set held no scripts.
    Nothing,
}

/// Decides between bundle registration and patch delivery.
pub struct PatchNotifier<'a, N: NotificationChannel + ?Sized> {
    channel: &'a N,
    script_matcher: &'a GlobMatcher,
}

impl<'a, N: NotificationChannel + ?Sized> PatchNotifier<'a, N> {
    pub fn new(channel: &'a N, script_matcher: &'a GlobMatcher) -> Self {
        Self {
            channel,
            script_matcher,
        }
    }

    /// Script files of `changed`, order preserved.
    pub fn patch_set(&self, changed: &[String]) -> Vec<String> {
        changed
            .iter()
            .filter(|f| self.script_matcher.is_match(f.as_str()))
            .cloned()
            .collect()
    }

    /// Announce a finished build.
    ///
    /// - incremental + patch mode: the script files of `changed` go out as a
    ///   patch, unless there are none;
    /// - anything else: the whole bundle is registered, unfiltered.
    pub async fn notify(
        &self,
        mode: BuildMode,
        patch_mode: bool,
        bundle: &Path,
        changed: &[String],
    ) -> Result<Notification> {
        if mode == BuildMode::Incremental && patch_mode {
            let patch = self.patch_set(changed);
            if patch.is_empty() {
                info!("no script changes; nothing to patch");
                return Ok(Notification::Nothing);
            }
            info!(files = patch.len(), "sending patch");
            self.channel.register_patch(bundle, &patch).await?;
            return Ok(Notification::Patch(patch));
        }

        self.channel.register_bundle(bundle).await?;
        Ok(Notification::Bundle)
    }
}
