use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

/// Shared bucket for clients with no forwarding header and no cookie. All
/// such clients draw from one quota — accepted behavior, not a bug.
pub const FALLBACK_KEY: &str = "anon";

// Cookie issued by the frontend to identify returning anonymous clients
const CLIENT_COOKIE: &str = "qg_client";

/// Derive a stable client key from the request headers. Never fails: a
/// missing or malformed source degrades to [`FALLBACK_KEY`].
///
/// Precedence: first hop of `X-Forwarded-For`, then `X-Real-IP`, then the
/// client cookie. The raw value is hashed so addresses never sit in the
/// quota table.
pub fn resolve_fingerprint(headers: &HeaderMap) -> String {
    forwarded_addr(headers)
        .or_else(|| cookie_token(headers))
        .map(|raw| hash_key(&raw))
        .unwrap_or_else(|| FALLBACK_KEY.to_string())
}

// First address in X-Forwarded-For is the original client; later hops are
// proxies we added ourselves.
fn forwarded_addr(headers: &HeaderMap) -> Option<String> {
    let from_header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    from_header("x-forwarded-for").or_else(|| from_header("x-real-ip"))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CLIENT_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn hash_key(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::try_from(*name).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn uses_first_forwarded_hop() {
        let a = resolve_fingerprint(&headers(&[("x-forwarded-for", "1.2.3.4, 10.0.0.1")]));
        let b = resolve_fingerprint(&headers(&[("x-forwarded-for", "1.2.3.4")]));
        assert_eq!(a, b);
        assert_ne!(a, FALLBACK_KEY);
    }

    #[test]
    fn distinct_clients_get_distinct_keys() {
        let a = resolve_fingerprint(&headers(&[("x-forwarded-for", "1.2.3.4")]));
        let b = resolve_fingerprint(&headers(&[("x-forwarded-for", "5.6.7.8")]));
        assert_ne!(a, b);
    }

    #[test]
    fn falls_back_to_real_ip_then_cookie() {
        let real_ip = resolve_fingerprint(&headers(&[("x-real-ip", "9.9.9.9")]));
        assert_ne!(real_ip, FALLBACK_KEY);

        let cookie = resolve_fingerprint(&headers(&[("cookie", "theme=dark; qg_client=abc123")]));
        assert_eq!(cookie, hash_key("abc123"));
    }

    #[test]
    fn missing_or_empty_sources_collapse_to_fallback() {
        assert_eq!(resolve_fingerprint(&HeaderMap::new()), FALLBACK_KEY);
        assert_eq!(
            resolve_fingerprint(&headers(&[("x-forwarded-for", "   ")])),
            FALLBACK_KEY
        );
        assert_eq!(
            resolve_fingerprint(&headers(&[("cookie", "qg_client=")])),
            FALLBACK_KEY
        );
    }

    #[test]
    fn key_never_exposes_the_raw_address() {
        let key = resolve_fingerprint(&headers(&[("x-forwarded-for", "1.2.3.4")]));
        assert!(!key.contains("1.2.3.4"));
        assert_eq!(key.len(), 64);
    }
}
