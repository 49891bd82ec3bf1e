//! Icon asset fetching and the background icon worker

use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use face_core::{AssetRef, FaceError, Icon, WeatherTicket};
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, warn};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::face::{FaceEvent, FaceHandle};
use crate::media::decode_icon;

/// Resolves asset references into raw bytes
pub trait AssetFetcher: Send + Sync + 'static {
    fn fetch<'a>(&'a self, asset: &'a AssetRef) -> BoxFuture<'a, face_core::Result<Vec<u8>>>;
}

/// Fetches file assets from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl AssetFetcher for FsFetcher {
    fn fetch<'a>(&'a self, asset: &'a AssetRef) -> BoxFuture<'a, face_core::Result<Vec<u8>>> {
        async move {
            match asset {
                AssetRef::File(path) => match tokio::fs::read(path).await {
                    Ok(bytes) => Ok(bytes),
                    Err(e) if e.kind() == ErrorKind::NotFound => Err(FaceError::AssetMissing),
                    Err(e) => Err(e.into()),
                },
                AssetRef::Inline(bytes) => Ok(bytes.to_vec()),
            }
        }
        .boxed()
    }
}

/// Request to fetch and decode the icon of one weather update
#[derive(Debug, Clone)]
pub struct IconJob {
    pub ticket: WeatherTicket,
    pub asset: AssetRef,
}

/// Fetch an asset within `timeout`, then decode it off the async threads
pub async fn load_icon(
    fetcher: &dyn AssetFetcher,
    asset: &AssetRef,
    timeout: Duration,
    size: u32,
) -> face_core::Result<Icon> {
    let bytes = tokio::time::timeout(timeout, fetcher.fetch(asset))
        .await
        .map_err(|_| FaceError::Timeout(timeout))??;
    let image = tokio::task::spawn_blocking(move || decode_icon(&bytes, size))
        .await
        .map_err(|e| FaceError::DecodeFailure(e.to_string()))??;
    Ok(Arc::new(image))
}

/// Background worker turning icon jobs into `IconDecoded` events.
///
/// Jobs queued behind the newest one are skipped, since their updates are
/// already superseded. Failures are logged and dropped; the face keeps
/// rendering without an icon. Exits when the job queue closes or the face
/// is gone.
pub async fn icon_worker(
    fetcher: Arc<dyn AssetFetcher>,
    mut jobs: UnboundedReceiver<IconJob>,
    face: FaceHandle,
    timeout: Duration,
    size: u32,
) {
    while let Some(mut job) = jobs.recv().await {
        while let Ok(newer) = jobs.try_recv() {
            debug!("skipping superseded icon job {}", job.ticket.generation());
            job = newer;
        }

        match load_icon(fetcher.as_ref(), &job.asset, timeout, size).await {
            Ok(icon) => {
                debug!(
                    "decoded {}x{} icon for update {}",
                    icon.width(),
                    icon.height(),
                    job.ticket.generation()
                );
                let event = FaceEvent::IconDecoded {
                    ticket: job.ticket,
                    icon,
                };
                if !face.send(event) {
                    debug!("face is gone, stopping icon worker");
                    return;
                }
            },
            Err(e) => warn!(
                "dropping icon for update {}: {e}",
                job.ticket.generation()
            ),
        }
    }
}
