//! The `rel` token edit shared by both link engines.

use prwire_core::status::FollowStatus;

const NOFOLLOW: &str = "nofollow";

fn is_nofollow(token: &str) -> bool { token.eq_ignore_ascii_case(NOFOLLOW) }

/// New value for an anchor's `rel` attribute under `policy`.
///
/// `existing` is the current value, `None` when the attribute is absent.
/// Returns `None` when the anchor should carry no `rel` at all. Tokens other
/// than `nofollow` are kept in their original order.
pub fn rewrite(existing: Option<&str>, policy: FollowStatus) -> Option<String> {
  let tokens = existing.unwrap_or_default().split_ascii_whitespace();

  let out: Vec<&str> = match policy {
    FollowStatus::Default => return existing.map(str::to_owned),
    FollowStatus::Dofollow => tokens.filter(|t| !is_nofollow(t)).collect(),
    FollowStatus::Nofollow => {
      let mut v: Vec<&str> = tokens.collect();
      if !v.iter().any(|t| is_nofollow(t)) {
        v.push(NOFOLLOW);
      }
      v
    }
  };

  if out.is_empty() { None } else { Some(out.join(" ")) }
}

/// Whether applying `policy` would leave `existing` as it is.
pub fn unchanged(existing: Option<&str>, policy: FollowStatus) -> bool {
  match rewrite(existing, policy) {
    None => existing.is_none(),
    Some(next) => existing == Some(next.as_str()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn nofollow_adds_once() {
    assert_eq!(rewrite(None, FollowStatus::Nofollow).as_deref(), Some("nofollow"));
    assert_eq!(
      rewrite(Some("noopener"), FollowStatus::Nofollow).as_deref(),
      Some("noopener nofollow")
    );
    assert_eq!(
      rewrite(Some("NoFollow ugc"), FollowStatus::Nofollow).as_deref(),
      Some("NoFollow ugc")
    );
  }

  #[test]
  fn dofollow_strips_and_keeps_others() {
    assert_eq!(
      rewrite(Some("nofollow sponsored"), FollowStatus::Dofollow).as_deref(),
      Some("sponsored")
    );
    assert_eq!(rewrite(Some(" nofollow "), FollowStatus::Dofollow), None);
    assert_eq!(rewrite(None, FollowStatus::Dofollow), None);
  }

  #[test]
  fn default_is_identity() {
    assert_eq!(
      rewrite(Some("nofollow  x"), FollowStatus::Default).as_deref(),
      Some("nofollow  x")
    );
    assert!(unchanged(Some("nofollow  x"), FollowStatus::Default));
  }

  #[test]
  fn unchanged_detection() {
    assert!(unchanged(None, FollowStatus::Dofollow));
    assert!(unchanged(Some("nofollow"), FollowStatus::Nofollow));
    assert!(!unchanged(Some("noopener"), FollowStatus::Nofollow));
    assert!(!unchanged(Some(""), FollowStatus::Dofollow));
  }
}
