/*!
`auth.rs`

Implements `login`, `register` and `logout`.

  - register: prompt for password, POST RegistrationDetails to core/v1/RegisterUser
  - login:    prompt for password, POST Credentials to core/v1/LoginUser, save token
  - logout:   remove the saved token

The password is read from COCKPIT_PASSWORD if set, otherwise prompted for.
The token lands in ~/.constellations/token.txt (mode 0600) and is sent as a
bearer token with every later request.
*/

use anyhow::{Context, Result, bail};
use clap::Args;

use super::format::{Role, StyleOptions, color, emoji};
use super::shared::{GlobalOpts, Session};
use crate::client::{Endpoint, Method, send_raw};
use crate::model::{Credentials, RegistrationDetails, TokenResponse};
use crate::utils::prompt;
use crate::{log_debug, log_info};

/// CLI arguments for `cockpit register`
#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Email for registration
    #[arg(short = 'e', long)]
    pub email: String,

    /// Name for registration
    #[arg(short = 'n', long)]
    pub name: String,

    /// Organization for registration
    #[arg(short = 'o', long)]
    pub org: String,

    /// Surname for registration
    #[arg(short = 's', long)]
    pub surname: String,

    /// Username for registration
    #[arg(short = 'u', long)]
    pub username: String,
}

/// CLI arguments for `cockpit login`
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Username for login
    #[arg(short = 'u', long)]
    pub username: String,
}

pub fn execute_register(args: RegisterArgs, globals: &GlobalOpts) -> Result<()> {
    let session = Session::open(globals)?;
    let password = prompt::password()?;
    register(&session, args, password)?;

    let style = StyleOptions::detect();
    globals.say(format!(
        "{} {}\n",
        emoji("success", &style),
        color(Role::Success, "Registration successful!", &style)
    ));
    Ok(())
}

pub fn execute_login(args: LoginArgs, globals: &GlobalOpts) -> Result<()> {
    let session = Session::open(globals)?;
    let password = prompt::password()?;
    login(&session, &args.username, password)?;

    let style = StyleOptions::detect();
    globals.say(format!(
        "{} {}\n",
        emoji("key", &style),
        color(Role::Success, "Login successful!", &style)
    ));
    Ok(())
}

pub fn execute_logout(globals: &GlobalOpts) -> Result<()> {
    let session = Session::open(globals)?;
    if session.store.clear_token()? {
        globals.say("Logged out.");
    } else {
        globals.say("Not logged in.");
    }
    Ok(())
}

pub(crate) fn register(session: &Session, args: RegisterArgs, password: String) -> Result<()> {
    let details = RegistrationDetails {
        email: args.email,
        name: args.name,
        org: args.org,
        password,
        surname: args.surname,
        username: args.username,
    };
    log_info!("registering user '{}'", details.username);

    let spec = session
        .anonymous(Method::Post, Endpoint::RegisterUser)?
        .with_body(&details);
    let resp = send_raw(&spec).context("failed to send registration request")?;
    if resp.status != 200 {
        bail!("registration failed: {}", resp.body.trim());
    }
    Ok(())
}

pub(crate) fn login(session: &Session, username: &str, password: String) -> Result<()> {
    let credentials = Credentials {
        username: username.to_string(),
        password,
    };
    log_info!("logging in as '{username}'");

    let spec = session
        .anonymous(Method::Post, Endpoint::LoginUser)?
        .with_body(&credentials);
    let resp = send_raw(&spec).context("failed to send login request")?;
    if resp.status != 200 {
        bail!("login failed: {}", resp.body.trim());
    }

    let token: TokenResponse = resp.decode().context("failed to decode response")?;
    if token.token.trim().is_empty() {
        bail!("login failed: server returned an empty token");
    }
    session.store.save_token(&token.token)?;
    log_debug!("token stored at {}", session.store.token_path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::MockServer;
    use crate::store::Store;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn session_for(server: &MockServer, home: &TempDir) -> Session {
        let globals = GlobalOpts::with_address(server.base.to_string());
        Session::with_store(Store::in_home(home.path()), &globals).unwrap()
    }

    #[test]
    fn login_saves_token() {
        let server = MockServer::respond(200, r#"{"token":"jwt-123"}"#);
        let home = TempDir::new().unwrap();
        let session = session_for(&server, &home);

        login(&session, "alice", "pw".into()).unwrap();
        assert_eq!(session.store.read_token().unwrap(), "jwt-123");

        let got = server.received();
        assert_eq!(got.method, "POST");
        assert_eq!(got.path, "/apis/core/v1/LoginUser");
        assert!(got.header("authorization").is_none());
        let body: Value = serde_json::from_str(&got.body).unwrap();
        assert_eq!(body, json!({"username":"alice","password":"pw"}));
    }

    #[test]
    fn login_failure_reports_body_and_keeps_no_token() {
        let server = MockServer::respond(401, "invalid credentials\n");
        let home = TempDir::new().unwrap();
        let session = session_for(&server, &home);

        let err = login(&session, "alice", "bad".into()).unwrap_err();
        assert_eq!(err.to_string(), "login failed: invalid credentials");
        assert!(session.store.read_token().is_err());
    }

    #[test]
    fn login_rejects_empty_token() {
        let server = MockServer::respond(200, "{}");
        let home = TempDir::new().unwrap();
        let session = session_for(&server, &home);
        assert!(login(&session, "alice", "pw".into()).is_err());
    }

    #[test]
    fn register_posts_details() {
        let server = MockServer::respond(200, "");
        let home = TempDir::new().unwrap();
        let session = session_for(&server, &home);

        let args = RegisterArgs {
            email: "a@example.com".into(),
            name: "Alice".into(),
            org: "c12s".into(),
            surname: "Smith".into(),
            username: "alice".into(),
        };
        register(&session, args, "pw".into()).unwrap();

        let got = server.received();
        assert_eq!(got.path, "/apis/core/v1/RegisterUser");
        assert_eq!(got.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(&got.body).unwrap();
        assert_eq!(
            body,
            json!({
                "email":"a@example.com","name":"Alice","org":"c12s",
                "password":"pw","surname":"Smith","username":"alice"
            })
        );
    }

    #[test]
    fn register_failure_carries_server_message() {
        let server = MockServer::respond(409, "username taken");
        let home = TempDir::new().unwrap();
        let session = session_for(&server, &home);
        let args = RegisterArgs {
            email: "a@example.com".into(),
            name: "Alice".into(),
            org: "c12s".into(),
            surname: "Smith".into(),
            username: "alice".into(),
        };
        let err = register(&session, args, "pw".into()).unwrap_err();
        assert_eq!(err.to_string(), "registration failed: username taken");
    }
}
