//! First-run consent flow.
//!
//! Google's partner-connections page redirects to the client's registered
//! redirect URI with `?code=...`; the user pastes that address back here.

use std::io::{BufRead, Write};

use crate::credentials::Credentials;
use crate::error::AuthError;
use crate::oauth::SDM_SCOPE;

/// Redirect URI used when the prompt is left blank
pub const DEFAULT_REDIRECT_URI: &str = "https://www.google.com";

const INSTRUCTIONS: &str = "\
If you have not already, create a Google Cloud project, an OAuth 2.0 client ID,
and a Device Access project:

    https://developers.google.com/nest/device-access/get-started

Once you have completed those steps, enter the following information.
";

#[derive(Debug, Clone)]
pub struct BootstrapOptions<'a> {
    /// Partner connections base URL, without trailing slash
    pub consent_base_url: &'a str,
    /// Try to open the consent page in the default browser
    pub open_browser: bool,
}

/// Build the partner-connections consent URL.
pub fn consent_url(
    consent_base_url: &str,
    project_id: &str,
    client_id: &str,
    redirect_uri: &str,
) -> String {
    format!(
        "{}/{}/auth?redirect_uri={}&access_type=offline&prompt=consent&client_id={}&response_type=code&scope={}",
        consent_base_url,
        urlencoding::encode(project_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(client_id),
        urlencoding::encode(SDM_SCOPE),
    )
}

/// Pull the `code` query parameter out of a pasted redirect URL.
pub fn extract_authorization_code(redirect: &str) -> Result<String, AuthError> {
    let redirect = redirect.trim();
    let url = url::Url::parse(redirect)
        .map_err(|e| AuthError::InvalidRedirect(format!("{}: {}", redirect, e)))?;

    url.query_pairs()
        .find(|(key, _)| key == "code")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
        .ok_or_else(|| AuthError::InvalidRedirect(redirect.to_string()))
}

/// Prompt for the OAuth client and project, walk the user through consent and
/// return credentials holding the authorization code but no tokens yet.
///
/// The caller persists the result and exchanges the code.
pub fn bootstrap<R, W>(
    input: &mut R,
    output: &mut W,
    options: &BootstrapOptions<'_>,
) -> Result<Credentials, AuthError>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}", INSTRUCTIONS)?;
    writeln!(output, "From the Google Cloud project:")?;
    let client_id = required(prompt(input, output, "    OAuth 2.0 Client ID: ")?, "client_id")?;
    let client_secret = required(
        prompt(input, output, "    OAuth 2.0 Client Secret: ")?,
        "client_secret",
    )?;
    let mut redirect_uri = prompt(
        input,
        output,
        &format!("    OAuth 2.0 Redirect URI [{}]: ", DEFAULT_REDIRECT_URI),
    )?;
    if redirect_uri.is_empty() {
        redirect_uri = DEFAULT_REDIRECT_URI.to_string();
    }
    writeln!(output, "From the Device Access project:")?;
    let project_id = required(prompt(input, output, "    Project ID: ")?, "project_id")?;

    let login_url = consent_url(
        options.consent_base_url,
        &project_id,
        &client_id,
        &redirect_uri,
    );

    let opened = options.open_browser && webbrowser::open(&login_url).is_ok();
    if opened {
        writeln!(output, "\nA browser window has been opened to sign in.")?;
    } else {
        writeln!(output, "\nNavigate here in your browser to sign in:\n\n{}\n", login_url)?;
    }
    writeln!(
        output,
        "Once you have completed the login process you will land on {} with a long URL.\nCopy that URL and paste it below.",
        redirect_uri
    )?;

    let pasted = prompt(input, output, "Authorization URL: ")?;
    let authorization_code = extract_authorization_code(&pasted)?;
    tracing::info!("Received authorization code for project {}", project_id);

    Ok(Credentials {
        project_id,
        client_id,
        client_secret,
        redirect_uri,
        authorization_code,
        refresh_token: None,
        access_token: None,
        access_token_expiration: None,
    })
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String, AuthError> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(AuthError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "input closed during setup",
        )));
    }
    Ok(line.trim().to_string())
}

fn required(value: String, field: &'static str) -> Result<String, AuthError> {
    if value.is_empty() {
        Err(AuthError::MissingField(field))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::io::Cursor;

    const BASE: &str = "https://nestservices.google.com/partnerconnections";

    fn options() -> BootstrapOptions<'static> {
        BootstrapOptions {
            consent_base_url: BASE,
            open_browser: false,
        }
    }

    #[test]
    fn test_consent_url_contains_required_parameters() {
        let url = consent_url(BASE, "proj-1", "client.apps", "https://www.google.com");
        assert!(url.starts_with("https://nestservices.google.com/partnerconnections/proj-1/auth?"));
        assert!(url.contains("client_id=client.apps"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fwww.google.com"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("sdm.service"));
    }

    #[test]
    fn test_extract_code_from_redirect() {
        let code = extract_authorization_code(
            "https://www.google.com/?code=4/0AbCdEf&scope=https://www.googleapis.com/auth/sdm.service\n",
        )
        .unwrap();
        assert_eq!(code, "4/0AbCdEf");
    }

    #[test]
    fn test_extract_code_percent_encoded() {
        let code = extract_authorization_code("https://www.google.com/?state=x&code=4%2F0Ab").unwrap();
        assert_eq!(code, "4/0Ab");
    }

    #[test]
    fn test_extract_code_missing() {
        assert!(matches!(
            extract_authorization_code("https://www.google.com/?error=access_denied"),
            Err(AuthError::InvalidRedirect(_))
        ));
        assert!(matches!(
            extract_authorization_code("not a url"),
            Err(AuthError::InvalidRedirect(_))
        ));
    }

    #[test]
    fn test_bootstrap_defaults_redirect_uri() {
        let mut input = Cursor::new(
            "client-id\nclient-secret\n\nproject-1\nhttps://www.google.com/?code=abc&scope=x\n",
        );
        let mut output = Vec::new();

        let creds = bootstrap(&mut input, &mut output, &options()).unwrap();
        assert_eq!(creds.client_id, "client-id");
        assert_eq!(creds.client_secret, "client-secret");
        assert_eq!(creds.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(creds.project_id, "project-1");
        assert_eq!(creds.authorization_code, "abc");
        assert!(creds.access_token.is_none());

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("project-1/auth?"));
    }

    #[test]
    fn test_bootstrap_custom_redirect_uri() {
        let mut input = Cursor::new(
            "id\nsecret\nhttps://example.com/cb\nproj\nhttps://example.com/cb?code=xyz\n",
        );
        let creds = bootstrap(&mut input, &mut Vec::new(), &options()).unwrap();
        assert_eq!(creds.redirect_uri, "https://example.com/cb");
        assert_eq!(creds.authorization_code, "xyz");
    }

    #[test]
    fn test_bootstrap_blank_client_id() {
        let mut input = Cursor::new("\n");
        let result = bootstrap(&mut input, &mut Vec::new(), &options());
        assert!(matches!(result, Err(AuthError::MissingField("client_id"))));
    }

    #[test]
    fn test_bootstrap_input_closed() {
        let mut input = Cursor::new("id\nsecret\n");
        let result = bootstrap(&mut input, &mut Vec::new(), &options());
        assert!(matches!(result, Err(AuthError::Io(_))));
    }
}
