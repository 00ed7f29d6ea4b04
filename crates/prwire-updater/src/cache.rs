//! Time-bounded memo of the last remote version lookup.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::version::RemoteVersion;

pub(crate) struct VersionCache {
  ttl:  Duration,
  slot: Mutex<Option<(Instant, RemoteVersion)>>,
}

impl VersionCache {
  pub(crate) fn new(ttl: Duration) -> Self { Self { ttl, slot: Mutex::new(None) } }

  pub(crate) async fn get(&self) -> Option<RemoteVersion> {
    let slot = self.slot.lock().await;
    match &*slot {
      Some((at, v)) if at.elapsed() < self.ttl => Some(v.clone()),
      _ => None,
    }
  }

  pub(crate) async fn put(&self, value: RemoteVersion) {
    *self.slot.lock().await = Some((Instant::now(), value));
  }

  pub(crate) async fn invalidate(&self) { *self.slot.lock().await = None; }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn entries_expire_and_invalidate() {
    let cache = VersionCache::new(Duration::from_secs(60));
    assert!(cache.get().await.is_none());

    cache.put(RemoteVersion::Known("1.2".into())).await;
    assert_eq!(cache.get().await, Some(RemoteVersion::Known("1.2".into())));

    cache.invalidate().await;
    assert!(cache.get().await.is_none());

    let zero = VersionCache::new(Duration::ZERO);
    zero.put(RemoteVersion::Unknown).await;
    assert!(zero.get().await.is_none());
  }
}
