//! Login and certificate prompt operations.
//!
//! Prompts normally answer themselves: when one becomes ready the
//! session consults its hook and acts on the decision, so most tests
//! never touch the operations here. The default hooks are deliberately
//! conservative - dismiss every login prompt, reject every certificate.
//!
//! The manual operations exist for tests that install a hook which
//! leaves a prompt open, or that want to steer a prompt the frontend has
//! only partially populated.

// ============================================================================
// Imports
// ============================================================================

use crate::browser::{CertificateDecision, CertificatePrompt, CredentialDecision, CredentialPrompt};
use crate::error::{Error, Result};
use crate::identifiers::{CertId, LoginId};
use crate::protocol::Command;

use super::core::Session;

// ============================================================================
// Session - Hooks
// ============================================================================

impl Session {
    /// Installs the policy for login prompts.
    ///
    /// The hook runs as soon as a prompt has received its username,
    /// password and realm, and once per prompt; it sees a snapshot of the
    /// prompt and returns what to do with it. The default dismisses.
    pub fn set_credential_hook<H>(&mut self, hook: H)
    where
        H: Fn(&CredentialPrompt) -> CredentialDecision + 'static,
    {
        self.credential_hook = Box::new(hook);
    }

    /// Installs the policy for certificate verification prompts.
    ///
    /// The hook runs as soon as a prompt is announced. The default
    /// rejects.
    pub fn set_certificate_hook<H>(&mut self, hook: H)
    where
        H: Fn(&CertificatePrompt) -> CertificateDecision + 'static,
    {
        self.certificate_hook = Box::new(hook);
    }
}

// ============================================================================
// Session - Login Prompts
// ============================================================================

impl Session {
    /// Looks up a login prompt mirror, destroyed ones included.
    pub fn login(&self, login: LoginId) -> Result<&CredentialPrompt> {
        self.logins
            .get(&login)
            .ok_or_else(|| Error::login_not_found(login))
    }

    /// Iterates every known login prompt, in no particular order.
    pub fn logins(&self) -> impl Iterator<Item = &CredentialPrompt> {
        self.logins.values()
    }

    fn live_login(&self, login: LoginId) -> Result<&CredentialPrompt> {
        let entry = self.login(login)?;
        if !entry.is_alive() {
            return Err(Error::login_destroyed(login));
        }
        Ok(entry)
    }

    /// Sends a username to the prompt.
    ///
    /// `None` echoes back the username the frontend supplied with the
    /// prompt, or an empty string if it never supplied one.
    pub fn send_username(&mut self, login: LoginId, username: Option<&str>) -> Result<()> {
        let prompt = self.live_login(login)?;
        let value = match username {
            Some(explicit) => explicit.to_owned(),
            None => prompt.username().unwrap_or_default().to_owned(),
        };
        self.send(&Command::LoginUsername {
            login,
            username: value,
        })
    }

    /// Sends a password to the prompt; `None` echoes the frontend's value.
    pub fn send_password(&mut self, login: LoginId, password: Option<&str>) -> Result<()> {
        let prompt = self.live_login(login)?;
        let value = match password {
            Some(explicit) => explicit.to_owned(),
            None => prompt.password().unwrap_or_default().to_owned(),
        };
        self.send(&Command::LoginPassword {
            login,
            password: value,
        })
    }

    /// Submits the prompt with whatever has been sent so far and waits
    /// for the frontend to destroy it.
    pub async fn login_go(&mut self, login: LoginId) -> Result<()> {
        self.live_login(login)?;
        self.send(&Command::LoginGo { login })?;
        self.wait_login_dead(login).await?;
        Ok(())
    }

    /// Dismisses the prompt without authenticating and waits for the
    /// frontend to destroy it.
    pub async fn login_dismiss(&mut self, login: LoginId) -> Result<()> {
        self.live_login(login)?;
        self.send(&Command::LoginDestroy { login })?;
        self.wait_login_dead(login).await?;
        Ok(())
    }

    /// Waits until the frontend has destroyed the prompt.
    pub async fn wait_login_dead(&mut self, login: LoginId) -> Result<bool> {
        self.login(login)?;
        self.wait_until(
            move |s: &Session| s.logins.get(&login).is_none_or(|p| !p.is_alive()),
            None,
        )
        .await
    }
}

// ============================================================================
// Session - Certificate Prompts
// ============================================================================

impl Session {
    /// Looks up a certificate prompt mirror, destroyed ones included.
    pub fn sslcert(&self, cert: CertId) -> Result<&CertificatePrompt> {
        self.certs
            .get(&cert)
            .ok_or_else(|| Error::cert_not_found(cert))
    }

    /// Iterates every known certificate prompt, in no particular order.
    pub fn sslcerts(&self) -> impl Iterator<Item = &CertificatePrompt> {
        self.certs.values()
    }

    fn live_cert(&self, cert: CertId) -> Result<&CertificatePrompt> {
        let entry = self.sslcert(cert)?;
        if !entry.is_alive() {
            return Err(Error::cert_destroyed(cert));
        }
        Ok(entry)
    }

    /// Trusts the certificate chain and waits for the prompt to go away.
    pub async fn sslcert_accept(&mut self, cert: CertId) -> Result<()> {
        self.live_cert(cert)?;
        self.send(&Command::CertGo { cert })?;
        self.wait_sslcert_dead(cert).await?;
        Ok(())
    }

    /// Rejects the certificate chain and waits for the prompt to go away.
    pub async fn sslcert_reject(&mut self, cert: CertId) -> Result<()> {
        self.live_cert(cert)?;
        self.send(&Command::CertDestroy { cert })?;
        self.wait_sslcert_dead(cert).await?;
        Ok(())
    }

    /// Waits until the frontend has destroyed the prompt.
    pub async fn wait_sslcert_dead(&mut self, cert: CertId) -> Result<bool> {
        self.sslcert(cert)?;
        self.wait_until(
            move |s: &Session| s.certs.get(&cert).is_none_or(|p| !p.is_alive()),
            None,
        )
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::transport::Direction;

    async fn scripted(script: &str) -> Session {
        Session::builder()
            .binary("/bin/sh")
            .arg("-c")
            .arg(script)
            .launch()
            .await
            .unwrap()
    }

    fn sent_lines(session: &Session) -> Vec<String> {
        session
            .transcript()
            .iter()
            .filter(|e| e.direction == Direction::Sent)
            .map(|e| e.text.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_default_hook_dismisses_ready_prompt() {
        let script = "\
printf 'GENERIC STARTED\\n'
printf 'LOGIN OPEN LWIN 1 URL http://example.com/private\\n'
printf 'LOGIN USER LWIN 1 STR guest\\n'
printf 'LOGIN PASS LWIN 1 STR\\n'
printf 'LOGIN REALM LWIN 1 STR staging\\n'
read cmd
printf 'LOGIN DESTROY LWIN 1\\n'
read _ || true";
        let mut session = scripted(script).await;
        let id = LoginId::new(1);

        let dead = session
            .wait_until(
                move |s: &Session| s.login(id).is_ok_and(|p| !p.is_alive()),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        assert!(dead);
        assert_eq!(sent_lines(&session), vec!["LOGIN DESTROY 1"]);

        // The mirror is still readable after death, but refuses commands.
        let prompt = session.login(id).unwrap();
        assert_eq!(prompt.url(), "http://example.com/private");
        assert_eq!(prompt.username(), Some("guest"));
        let err = session.send_username(id, Some("root")).unwrap_err();
        assert!(matches!(err, Error::LoginDestroyed { .. }));
    }

    #[tokio::test]
    async fn test_submitting_hook_sends_in_order() {
        let script = "\
printf 'GENERIC STARTED\\n'
printf 'LOGIN OPEN LWIN 1 URL http://example.com/private\\n'
printf 'LOGIN REALM LWIN 1 STR staging\\n'
printf 'LOGIN PASS LWIN 1 STR\\n'
printf 'LOGIN USER LWIN 1 STR guest\\n'
read u; read p; read g
printf 'LOGIN DESTROY LWIN 1\\n'
read _ || true";
        let mut session = scripted(script).await;
        session.set_credential_hook(|_| CredentialDecision::Submit {
            username: Some("admin".into()),
            password: Some("hunter2".into()),
        });

        let id = LoginId::new(1);
        let dead = session
            .wait_until(
                move |s: &Session| s.login(id).is_ok_and(|p| !p.is_alive()),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        assert!(dead);

        assert_eq!(
            sent_lines(&session),
            vec![
                "LOGIN USERNAME 1 admin",
                "LOGIN PASSWORD 1 hunter2",
                "LOGIN GO 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_hook_fires_once_per_prompt() {
        // A second credential update after the prompt became ready must
        // not consult the hook again.
        let script = "\
printf 'GENERIC STARTED\\n'
printf 'LOGIN OPEN LWIN 1 URL http://example.com/private\\n'
printf 'LOGIN USER LWIN 1 STR guest\\n'
printf 'LOGIN PASS LWIN 1 STR\\n'
printf 'LOGIN REALM LWIN 1 STR staging\\n'
printf 'LOGIN USER LWIN 1 STR other\\n'
printf 'GENERIC LAUNCH URL marker\\n'
read _ || true";
        let mut session = scripted(script).await;

        session
            .wait_until(
                |s: &Session| s.launch_url().is_some(),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        let dismissals = sent_lines(&session)
            .iter()
            .filter(|l| *l == "LOGIN DESTROY 1")
            .count();
        assert_eq!(dismissals, 1);
        assert_eq!(
            session.login(LoginId::new(1)).unwrap().username(),
            Some("other")
        );
    }

    #[tokio::test]
    async fn test_manual_credentials_and_submit() {
        // Only a username arrives, so the prompt never becomes ready and
        // the hook stays out of the way.
        let script = "\
printf 'GENERIC STARTED\\n'
printf 'LOGIN OPEN LWIN 1 URL http://example.com/private\\n'
printf 'LOGIN USER LWIN 1 STR guest\\n'
read a; read b; read c
printf 'LOGIN DESTROY LWIN 1\\n'
read _ || true";
        let mut session = scripted(script).await;
        let id = LoginId::new(1);

        session
            .wait_until(
                move |s: &Session| s.login(id).is_ok_and(|p| p.username().is_some()),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        session.send_username(id, None).unwrap();
        session.send_username(id, Some("root")).unwrap();
        session.send_password(id, Some("hunter2")).unwrap();
        session.login_go(id).await.unwrap();

        assert!(!session.login(id).unwrap().is_alive());
        assert_eq!(
            sent_lines(&session),
            vec![
                "LOGIN USERNAME 1 guest",
                "LOGIN USERNAME 1 root",
                "LOGIN PASSWORD 1 hunter2",
                "LOGIN GO 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_manual_dismiss() {
        let script = "\
printf 'GENERIC STARTED\\n'
printf 'LOGIN OPEN LWIN 1 URL http://example.com/private\\n'
read cmd
printf 'LOGIN DESTROY LWIN 1\\n'
read _ || true";
        let mut session = scripted(script).await;
        let id = LoginId::new(1);

        session
            .wait_until(
                move |s: &Session| s.login(id).is_ok(),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        session.login_dismiss(id).await.unwrap();
        assert!(!session.login(id).unwrap().is_alive());
        assert_eq!(sent_lines(&session), vec!["LOGIN DESTROY 1"]);
    }

    #[tokio::test]
    async fn test_unknown_login_lookup_fails() {
        let session = scripted("printf 'GENERIC STARTED\\n'; read _ || true").await;
        let err = session.login(LoginId::new(5)).unwrap_err();
        assert!(matches!(err, Error::LoginNotFound { .. }));
    }

    #[tokio::test]
    async fn test_default_hook_rejects_certificates() {
        let script = "\
printf 'GENERIC STARTED\\n'
printf 'SSLCERT VERIFY CWIN 1 URL https://expired.test/\\n'
read cmd
printf 'SSLCERT DESTROY CWIN 1\\n'
read _ || true";
        let mut session = scripted(script).await;
        let id = CertId::new(1);

        let dead = session
            .wait_until(
                move |s: &Session| s.sslcert(id).is_ok_and(|p| !p.is_alive()),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        assert!(dead);
        assert_eq!(session.sslcert(id).unwrap().url(), "https://expired.test/");
        assert_eq!(sent_lines(&session), vec!["SSLCERT DESTROY 1"]);
    }

    #[tokio::test]
    async fn test_accepting_hook_sends_go() {
        let script = "\
printf 'GENERIC STARTED\\n'
printf 'SSLCERT VERIFY CWIN 1 URL https://selfsigned.test/\\n'
read cmd
printf 'SSLCERT DESTROY CWIN 1\\n'
read _ || true";
        let mut session = scripted(script).await;
        session.set_certificate_hook(|_| CertificateDecision::Accept);

        let id = CertId::new(1);
        let dead = session
            .wait_until(
                move |s: &Session| s.sslcert(id).is_ok_and(|p| !p.is_alive()),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        assert!(dead);
        assert_eq!(sent_lines(&session), vec!["SSLCERT GO 1"]);
    }

    #[tokio::test]
    async fn test_manual_certificate_rejection() {
        // The accepting hook leaves the prompt open (the frontend here
        // never destroys it on GO), so the manual path gets its turn.
        let script = "\
printf 'GENERIC STARTED\\n'
printf 'SSLCERT VERIFY CWIN 1 URL https://selfsigned.test/\\n'
read go
read destroy
printf 'SSLCERT DESTROY CWIN 1\\n'
read _ || true";
        let mut session = scripted(script).await;
        session.set_certificate_hook(|_| CertificateDecision::Accept);

        let id = CertId::new(1);
        session
            .wait_until(
                move |s: &Session| s.sslcert(id).is_ok(),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        session.sslcert_reject(id).await.unwrap();
        assert!(!session.sslcert(id).unwrap().is_alive());
        assert_eq!(
            sent_lines(&session),
            vec!["SSLCERT GO 1", "SSLCERT DESTROY 1"]
        );
    }
}
