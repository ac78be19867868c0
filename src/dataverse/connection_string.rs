use std::collections::HashMap;
use crate::error::DataverseError;

/// Parsed `key=value;` connection string. Only client-secret auth is supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub client_id: String,
    pub client_secret: String,
    pub url: String,
    pub authority: Option<String>,
}

impl ConnectionString {
    pub fn parse(input: &str) -> Result<Self, DataverseError> {
        let mut pairs: HashMap<String, String> = HashMap::new();
        for (index, part) in input.split(';').map(str::trim).enumerate().filter(|(_, p)| !p.is_empty()) {
            // The part may hold a fragment of the secret, so only its position is reported.
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| DataverseError::ConnectionString(format!("expected key=value in part {}", index)))?;
            pairs.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        let auth_type = pairs.get("authtype").map(String::as_str).unwrap_or_default();
        if !auth_type.eq_ignore_ascii_case("ClientSecret") {
            return Err(DataverseError::ConnectionString(format!(
                "unsupported AuthType '{}', only ClientSecret is supported",
                auth_type
            )));
        }

        let required = |keys: &[&str], name: &str| -> Result<String, DataverseError> {
            keys.iter()
                .find_map(|k| pairs.get(*k).filter(|v| !v.is_empty()).cloned())
                .ok_or_else(|| DataverseError::ConnectionString(format!("{} is required", name)))
        };

        let client_id = required(&["clientid", "appid"], "ClientId")?;
        let client_secret = required(&["clientsecret", "secret"], "ClientSecret")?;
        let url = required(&["url", "serviceuri", "server"], "Url")?;
        let authority = pairs.get("authority").filter(|v| !v.is_empty()).cloned();

        Ok(Self {
            client_id,
            client_secret,
            url: url.trim_end_matches('/').to_string(),
            authority: authority.map(|a| a.trim_end_matches('/').to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ConnectionParameters;

    #[test]
    fn parses_descriptor_built_from_parameters() {
        let params = ConnectionParameters::new("abc", "s3cr=t", "https://org.crm4.dynamics.com/")
            .with_authority("https://login.microsoftonline.com/tenant");
        let parsed = ConnectionString::parse(&params.client_secret_connection_string()).unwrap();
        assert_eq!(parsed.client_id, "abc");
        assert_eq!(parsed.client_secret, "s3cr=t");
        assert_eq!(parsed.url, "https://org.crm4.dynamics.com");
        assert_eq!(parsed.authority.as_deref(), Some("https://login.microsoftonline.com/tenant"));
    }

    #[test]
    fn keys_are_case_insensitive() {
        let parsed = ConnectionString::parse("authtype=clientsecret; CLIENTID=a; clientSecret=b; URL=https://x").unwrap();
        assert_eq!(parsed.url, "https://x");
        assert!(parsed.authority.is_none());
    }

    #[test]
    fn malformed_part_does_not_leak_secret() {
        let params = ConnectionParameters::new("id", "abc;SUPERSECRETPART", "https://org.crm.dynamics.com");
        let err = ConnectionString::parse(&params.client_secret_connection_string()).unwrap_err();
        let message = err.to_string();
        assert_eq!(message, "invalid connection string: expected key=value in part 3");
        assert!(!message.contains("SUPERSECRET"));
        assert!(!message.contains("abc"));
    }

    #[test]
    fn rejects_other_auth_types() {
        let err = ConnectionString::parse("AuthType=OAuth;ClientId=a;ClientSecret=b;url=https://x").unwrap_err();
        assert!(err.to_string().contains("unsupported AuthType"));
    }

    #[test]
    fn rejects_missing_secret() {
        let err = ConnectionString::parse("AuthType=ClientSecret;ClientId=a;ClientSecret=;url=https://x").unwrap_err();
        assert!(err.to_string().contains("ClientSecret is required"));
    }
}
