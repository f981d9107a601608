use crate::api::Post;

/// Sentinel category that selects the whole collection.
pub const ALL_CATEGORY: &str = "All";

/// Category vocabulary shipped with the app. A fixed list supplied to the
/// selection UI, never derived from fetched data.
pub fn default_categories() -> Vec<String> {
    [
        ALL_CATEGORY,
        "history",
        "american",
        "english",
        "crime",
        "french",
        "magical",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

/// Derives the displayed subset from the fetched collection and the selected
/// category. Total over its domain:
/// - absent data stays absent (the caller shows its loading presentation);
/// - `"All"` yields the full collection, order and membership untouched;
/// - any other category yields the order-preserving subsequence whose `tags`
///   contain it exactly (case-sensitive). Posts without tags are excluded,
///   and a category outside the vocabulary simply yields an empty result.
pub fn filter_posts(data: Option<&[Post]>, category: &str) -> Option<Vec<Post>> {
    let posts = data?;
    if category == ALL_CATEGORY {
        return Some(posts.to_vec());
    }
    Some(
        posts
            .iter()
            .filter(|post| post.has_tag(category))
            .cloned()
            .collect(),
    )
}
