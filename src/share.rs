use url::Url;

/// Build a shareable link by setting query parameters on a base URL.
///
/// Existing pairs with the same name are overwritten, not duplicated, so
/// re-sharing an already-shared link stays stable.
pub fn shareable_url<'a>(
    base: &Url,
    params: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Url {
    let mut url = base.clone();

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    for (key, value) in params {
        if let Some(pair) = pairs.iter_mut().find(|(k, _)| k == key) {
            pair.1 = value.to_owned();
        } else {
            pairs.push((key.to_owned(), value.to_owned()));
        }
    }

    if pairs.is_empty() {
        // A bare rebuild would leave a dangling `?` on query-less bases.
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs).finish();
    }

    url
}

/// Decode the query parameters of a shared link.
pub fn parse_params(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
