//! # Top Contributors
//!
//! Ranks listing authors by how many items they contributed. Pure and
//! deterministic: equal counts keep the order in which the authors first
//! appeared in the listing.

use std::collections::HashMap;

use super::model::{ContributorCount, RankedItem};

/// Maximum number of contributors returned by [`rank_contributors`].
pub const TOP_CONTRIBUTORS_LIMIT: usize = 10;

/// Bucket for items without a string author, so every item is counted once.
pub const UNKNOWN_AUTHOR: &str = "[unknown]";

/// Counts items per author, in order of first appearance.
///
/// The counts partition `items`: they sum to `items.len()` and no user appears
/// twice.
pub fn count_contributors(items: &[RankedItem]) -> Vec<ContributorCount> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ContributorCount> = Vec::new();

    for item in items {
        let author = item.author().unwrap_or(UNKNOWN_AUTHOR);
        match slots.get(author) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slots.insert(author, counts.len());
                counts.push(ContributorCount {
                    user: author.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts
}

/// The most active authors, highest count first, at most
/// [`TOP_CONTRIBUTORS_LIMIT`] entries. Empty input gives an empty ranking.
pub fn rank_contributors(items: &[RankedItem]) -> Vec<ContributorCount> {
    let mut ranked = count_contributors(items);
    // sort_by is stable: ties stay in first-seen order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(TOP_CONTRIBUTORS_LIMIT);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn item(author: &str) -> RankedItem {
        RankedItem::new(json!({ "kind": "t3", "data": { "author": author } }))
    }

    fn items(authors: &[&str]) -> Vec<RankedItem> {
        authors.iter().map(|a| item(a)).collect()
    }

    fn pair(user: &str, count: usize) -> ContributorCount {
        ContributorCount { user: user.to_string(), count }
    }

    #[test]
    fn ranks_the_reference_listing() {
        let listing = items(&["u1", "u2", "u1", "u3", "u2", "u1"]);
        assert_eq!(
            rank_contributors(&listing),
            vec![pair("u1", 3), pair("u2", 2), pair("u3", 1)]
        );
    }

    #[test]
    fn empty_listing_ranks_nobody() {
        assert!(rank_contributors(&[]).is_empty());
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let listing = items(&["c", "a", "b", "a", "c", "b", "d"]);
        assert_eq!(
            rank_contributors(&listing),
            vec![pair("c", 2), pair("a", 2), pair("b", 2), pair("d", 1)]
        );
    }

    #[test]
    fn truncates_to_ten() {
        let authors: Vec<String> = (0..12).map(|i| format!("user{i}")).collect();
        let listing: Vec<RankedItem> = authors.iter().map(|a| item(a)).collect();
        let ranked = rank_contributors(&listing);
        assert_eq!(ranked.len(), TOP_CONTRIBUTORS_LIMIT);
        assert_eq!(ranked[0].user, "user0");
        assert_eq!(ranked[9].user, "user9");
    }

    #[test]
    fn authorless_items_share_one_bucket() {
        let listing = vec![
            RankedItem::new(json!({"data": {"title": "no author"}})),
            item("x"),
            RankedItem::new(json!({"data": {"author": null}})),
        ];
        assert_eq!(
            rank_contributors(&listing),
            vec![pair(UNKNOWN_AUTHOR, 2), pair("x", 1)]
        );
    }

    #[test]
    fn input_is_left_untouched() {
        let listing = items(&["b", "a", "b"]);
        let before = listing.clone();
        let _ = rank_contributors(&listing);
        assert_eq!(listing, before);
    }

    proptest! {
        #[test]
        fn counts_partition_the_listing(authors in prop::collection::vec("[a-e]", 0..40)) {
            let refs: Vec<&str> = authors.iter().map(String::as_str).collect();
            let listing = items(&refs);
            let counts = count_contributors(&listing);

            let total: usize = counts.iter().map(|c| c.count).sum();
            prop_assert_eq!(total, listing.len());

            let distinct: HashSet<&str> = counts.iter().map(|c| c.user.as_str()).collect();
            prop_assert_eq!(distinct.len(), counts.len());
        }

        #[test]
        fn ranking_is_bounded_sorted_and_stable(authors in prop::collection::vec("[a-p]", 0..60)) {
            let refs: Vec<&str> = authors.iter().map(String::as_str).collect();
            let listing = items(&refs);
            let ranked = rank_contributors(&listing);

            let distinct: HashSet<&str> = refs.iter().copied().collect();
            prop_assert!(ranked.len() <= TOP_CONTRIBUTORS_LIMIT);
            prop_assert!(ranked.len() <= distinct.len());

            let first_seen = |user: &str| refs.iter().position(|a| *a == user).unwrap();
            for w in ranked.windows(2) {
                prop_assert!(w[0].count >= w[1].count);
                if w[0].count == w[1].count {
                    prop_assert!(first_seen(&w[0].user) < first_seen(&w[1].user));
                }
            }
        }
    }
}
