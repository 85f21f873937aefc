//! Distinguished-name and logout URL helpers.

/// Schema subtree container under every directory root.
pub const SCHEMA_CONTEXT: &str = "cn=schemacontext";

/// Domain part of a principal name: everything after the first `@`, or the
/// whole name when it has none.
#[must_use]
pub fn domain_from_username(username: &str) -> &str {
    username
        .split_once('@')
        .map_or(username, |(_, domain)| domain)
}

/// Convert a DNS-style domain into its `dc=` root DN.
///
/// `example.com` becomes `dc=example,dc=com`. Empty labels are skipped.
#[must_use]
pub fn root_dn_query(domain: &str) -> String {
    domain
        .split('.')
        .filter(|label| !label.is_empty())
        .map(|label| format!("dc={label}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// DN of the schema entry for a directory root.
#[must_use]
pub fn schema_dn(root_dn: &str) -> String {
    format!("cn={root_dn},{SCHEMA_CONTEXT}")
}

/// Inputs for the identity provider's OIDC logout endpoint.
#[derive(Debug, Clone, Copy)]
pub struct LogoutRequest<'a> {
    /// Identity provider host (optionally `host:port`).
    pub idp_host: &'a str,
    /// Tenant whose session is being ended.
    pub tenant: &'a str,
    /// Id token issued at sign-in, if known.
    pub id_token: Option<&'a str>,
    /// Where the provider redirects after sign-out.
    pub post_logout_redirect_uri: &'a str,
    /// Opaque state echoed back on the redirect.
    pub state: &'a str,
}

/// Build the identity provider logout URL.
#[must_use]
pub fn logout_url(request: &LogoutRequest<'_>) -> String {
    let mut params = Vec::with_capacity(3);
    if let Some(id_token) = request.id_token {
        params.push(format!("id_token_hint={}", urlencoding::encode(id_token)));
    }
    params.push(format!(
        "post_logout_redirect_uri={}",
        urlencoding::encode(request.post_logout_redirect_uri)
    ));
    params.push(format!("state={}", urlencoding::encode(request.state)));

    format!(
        "https://{}/openidconnect/logout/{}?{}",
        request.idp_host,
        urlencoding::encode(request.tenant),
        params.join("&")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_taken_after_first_at_sign() {
        assert_eq!(domain_from_username("user@example.com"), "example.com");
        assert_eq!(domain_from_username("a@b@c.org"), "b@c.org");
        assert_eq!(domain_from_username("administrator"), "administrator");
    }

    #[test]
    fn root_dn_query_expands_each_label() {
        assert_eq!(root_dn_query("example.com"), "dc=example,dc=com");
        assert_eq!(root_dn_query("lightwave.local"), "dc=lightwave,dc=local");
        assert_eq!(root_dn_query("corp."), "dc=corp");
        assert_eq!(root_dn_query(""), "");
    }

    #[test]
    fn schema_dn_wraps_root() {
        assert_eq!(
            schema_dn("dc=test,dc=com"),
            "cn=dc=test,dc=com,cn=schemacontext"
        );
    }

    #[test]
    fn logout_url_encodes_parameters() {
        let url = logout_url(&LogoutRequest {
            idp_host: "idp.example.com",
            tenant: "example.com",
            id_token: Some("a.b.c"),
            post_logout_redirect_uri: "https://console.example.com/ui",
            state: "xyz",
        });
        assert_eq!(
            url,
            "https://idp.example.com/openidconnect/logout/example.com?id_token_hint=a.b.c\
             &post_logout_redirect_uri=https%3A%2F%2Fconsole.example.com%2Fui&state=xyz"
        );
    }

    #[test]
    fn logout_url_omits_missing_id_token() {
        let url = logout_url(&LogoutRequest {
            idp_host: "idp",
            tenant: "t",
            id_token: None,
            post_logout_redirect_uri: "r",
            state: "s",
        });
        assert_eq!(
            url,
            "https://idp/openidconnect/logout/t?post_logout_redirect_uri=r&state=s"
        );
    }
}
