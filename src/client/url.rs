use reqwest::Url;

use crate::config::LookupOptions;

/// `<base>/v2/<address>?key=<key>` followed by the query flags in a fixed
/// order, so identical inputs always produce the identical URL.
///
/// The address is pushed as a single path segment and every query value is
/// form-encoded, so `/`, `?`, `#` or `&` in either cannot change the request.
/// `base_url` must be able to carry a path (checked by
/// [`ClientConfig::parsed_base_url`](crate::config::ClientConfig::parsed_base_url)).
pub(crate) fn lookup_url(
    base_url: &Url,
    key: &str,
    address: &str,
    options: &LookupOptions,
) -> Url {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);

    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push("v2").push(address);
    }

    url.query_pairs_mut()
        .append_pair("key", key)
        .append_pair("vpn", &options.vpn.to_string())
        .append_pair("asn", flag(options.asn))
        .append_pair("node", flag(options.node))
        .append_pair("time", flag(options.time))
        .append_pair("port", flag(options.port))
        .append_pair("seen", flag(options.seen))
        .append_pair("short", flag(options.short))
        .append_pair("risk", &options.risk.to_string())
        .append_pair("days", &options.days.to_string());

    url
}

fn flag(enabled: bool) -> &'static str {
    if enabled {
        "1"
    } else {
        "0"
    }
}
