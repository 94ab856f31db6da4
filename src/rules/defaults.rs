//! Built-in rule table and browser signatures.

use crate::config::{
    HostMatch, RewriteConfig, RuleSetConfig, SetIfAbsentConfig, ValuePredicate, ValueSource,
};

/// Desktop Chrome user-agent injected for targets that reject scripted clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Client hints matching [`BROWSER_USER_AGENT`].
pub const BROWSER_SEC_CH_UA: &str =
    "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"120\", \"Google Chrome\";v=\"120\"";
pub const BROWSER_SEC_CH_UA_MOBILE: &str = "?0";
pub const BROWSER_SEC_CH_UA_PLATFORM: &str = "\"macOS\"";

/// Lowercase user-agent fragments of HTTP libraries and command-line clients.
pub const NON_BROWSER_AGENTS: &[&str] = &[
    "curl",
    "wget",
    "python-requests",
    "python-urllib",
    "aiohttp",
    "httpx",
    "axios",
    "node-fetch",
    "undici",
    "go-http-client",
    "okhttp",
    "apache-httpclient",
    "java/",
    "libwww-perl",
    "postmanruntime",
    "insomnia",
    "httpie",
    "reqwest",
];

/// Returns true if the user-agent belongs to a known non-browser client.
pub fn is_non_browser_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    NON_BROWSER_AGENTS.iter().any(|sig| ua.contains(sig))
}

/// Rule table used when the configuration does not declare `[[rules]]`.
pub fn builtin_rules() -> Vec<RuleSetConfig> {
    vec![autotrader()]
}

fn literal(value: &str) -> ValueSource {
    ValueSource::Literal(value.to_string())
}

fn set(header: &str, value: ValueSource) -> SetIfAbsentConfig {
    SetIfAbsentConfig {
        header: header.to_string(),
        value,
        methods: Vec::new(),
    }
}

fn rewrite(header: &str, when: ValuePredicate, value: ValueSource) -> RewriteConfig {
    RewriteConfig {
        header: header.to_string(),
        when,
        value,
    }
}

fn autotrader() -> RuleSetConfig {
    RuleSetConfig {
        name: "autotrader".to_string(),
        host: "autotrader.co.uk".to_string(),
        host_match: HostMatch::Suffix,
        priority: 0,
        timeout_secs: Some(60),
        remove: Vec::new(),
        rewrite: vec![
            rewrite("user-agent", ValuePredicate::NonBrowserAgent, literal(BROWSER_USER_AGENT)),
            rewrite("origin", ValuePredicate::ProxyHost, ValueSource::TargetOrigin),
            rewrite("referer", ValuePredicate::ProxyHost, ValueSource::TargetRoot),
            rewrite(
                "sec-fetch-site",
                ValuePredicate::Equals("cross-origin".to_string()),
                literal("same-origin"),
            ),
        ],
        set_if_absent: vec![
            set("user-agent", literal(BROWSER_USER_AGENT)),
            set("sec-ch-ua", literal(BROWSER_SEC_CH_UA)),
            set("sec-ch-ua-mobile", literal(BROWSER_SEC_CH_UA_MOBILE)),
            set("sec-ch-ua-platform", literal(BROWSER_SEC_CH_UA_PLATFORM)),
            SetIfAbsentConfig {
                header: "origin".to_string(),
                value: ValueSource::TargetOrigin,
                methods: ["POST", "PUT", "PATCH", "DELETE"].map(String::from).to_vec(),
            },
            set("connection", literal("keep-alive")),
        ],
    }
}
