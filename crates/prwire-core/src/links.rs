//! Which follow policy applies to an item's rendered content.

use crate::{
  resolve::{self, Resolution},
  setting::Follow,
  status::FollowStatus,
  store::{Item, SiteStore},
};

/// The follow resolution for `item`, or `None` when its anchors are not
/// managed (anything other than a press release).
pub async fn follow_for<S: SiteStore>(
  store: &S,
  item: &Item,
) -> Option<Resolution<FollowStatus>> {
  if !item.is_press_release() {
    return None;
  }
  Some(resolve::resolve::<Follow, S>(store, item.item_id).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{memory::MemoryStore, resolve::Tier, store::NewItem};

  #[tokio::test]
  async fn only_press_releases_are_managed() {
    let store = MemoryStore::default();
    let post = store.add_item(NewItem::post("P", "<a href=x>")).await.unwrap();
    let pr = store.add_item(NewItem::press_release("R", "<a href=x>")).await.unwrap();

    assert!(follow_for(&store, &post).await.is_none());
    assert_eq!(
      follow_for(&store, &pr).await,
      Some(Resolution { value: FollowStatus::Dofollow, tier: Tier::Global })
    );
  }
}
