//! Can a mini-app URL be shown in a frame at all?
//!
//! Classifies the response headers of a `HEAD` probe. A `frame-ancestors`
//! directive naming neither `*` nor the embedding host's scheme counts as
//! blocking.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// `X-Frame-Options: DENY | SAMEORIGIN`
    FrameOptions(String),
    /// CSP `frame-ancestors` excluding the host.
    FrameAncestors(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedVerdict {
    Embeddable,
    Blocked(BlockReason),
}

impl EmbedVerdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, EmbedVerdict::Blocked(_))
    }
}

/// `headers` are `(name, value)` pairs, names in any case. `host_scheme` is
/// the embedding page's scheme (e.g. `vscode-webview`, `https`).
pub fn check_embeddable<'a, I>(headers: I, host_scheme: &str) -> EmbedVerdict
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let host_scheme = host_scheme.to_ascii_lowercase();
    let mut ancestors: Option<String> = None;

    for (name, value) in headers {
        let value = value.to_ascii_lowercase();
        if name.eq_ignore_ascii_case("x-frame-options") {
            if value.contains("deny") || value.contains("sameorigin") {
                return EmbedVerdict::Blocked(BlockReason::FrameOptions(value.trim().to_string()));
            }
        } else if name.eq_ignore_ascii_case("content-security-policy") {
            if let Some(d) = frame_ancestors(&value) {
                ancestors = Some(d.to_string());
            }
        }
    }

    match ancestors {
        Some(d) if ancestors_block(&d, &host_scheme) => {
            EmbedVerdict::Blocked(BlockReason::FrameAncestors(d))
        }
        _ => EmbedVerdict::Embeddable,
    }
}

fn frame_ancestors(csp: &str) -> Option<&str> {
    csp.split(';')
        .map(str::trim)
        .find(|d| d.split_whitespace().next() == Some("frame-ancestors"))
}

fn ancestors_block(directive: &str, host_scheme: &str) -> bool {
    let sources: Vec<&str> = directive.split_whitespace().skip(1).collect();
    if sources.iter().any(|s| *s == "'none'" || *s == "'self'") {
        return true;
    }
    let admits_host = sources.iter().any(|s| {
        s.contains('*') || (!host_scheme.is_empty() && s.trim_end_matches(':').starts_with(host_scheme))
    });
    !admits_host
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST: &str = "vscode-webview";

    #[test]
    fn no_restrictive_headers_is_embeddable() {
        let v = check_embeddable([("Content-Type", "text/html")], HOST);
        assert_eq!(v, EmbedVerdict::Embeddable);
    }

    #[test]
    fn frame_options_block() {
        for xfo in ["DENY", "SAMEORIGIN", "sameorigin"] {
            let v = check_embeddable([("X-Frame-Options", xfo)], HOST);
            assert!(v.is_blocked(), "{xfo}");
        }
        let v = check_embeddable([("x-frame-options", "ALLOW-FROM https://a.test")], HOST);
        assert_eq!(v, EmbedVerdict::Embeddable);
    }

    #[test]
    fn frame_ancestors_rules() {
        let cases = [
            ("frame-ancestors 'none'", true),
            ("default-src 'self'; frame-ancestors 'self' https://a.test", true),
            ("frame-ancestors https://a.test", true),
            ("frame-ancestors *", false),
            ("frame-ancestors https://*.example.com", false),
            ("frame-ancestors vscode-webview:", false),
            ("default-src 'self'", false),
        ];
        for (csp, blocked) in cases {
            let v = check_embeddable([("Content-Security-Policy", csp)], HOST);
            assert_eq!(v.is_blocked(), blocked, "{csp}");
        }
    }
}
