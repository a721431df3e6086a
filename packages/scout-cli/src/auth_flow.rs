//! Interactive authentication loop.
//!
//! Drives the [`AuthSession`] state machine with credentials prompted
//! from the operator: verification code (with a resend option) and, when
//! the account has one, the second-factor password.

use anyhow::{bail, Context, Result};
use console::style;
use dialoguer::{Input, Password, Select};
use tracing::warn;

use resolver_core::{
    ApiIdentity, AuthError, AuthSession, AuthState, HttpDirectory, PhoneNumber,
    SecondFactorSecret, VerificationCode,
};

use crate::config::Config;

/// Authenticate against the directory provider, prompting as needed.
///
/// Returns a session in `Authenticated` state or an error once the
/// session becomes terminal.
pub async fn authenticate(config: &Config) -> Result<AuthSession<HttpDirectory>> {
    let phone = PhoneNumber::parse(&config.account_phone).with_context(|| {
        format!(
            "SCOUT_ACCOUNT_PHONE {:?} is not a canonical +<countrycode><number>",
            config.account_phone
        )
    })?;

    let provider = HttpDirectory::new(&config.base_url);
    let identity = ApiIdentity::new(config.api_id, config.api_hash.clone());
    let mut session = AuthSession::new(provider, identity, phone);

    println!("{}", style("Connecting to the directory provider...").dim());
    match session.connect().await {
        Ok(AuthState::Authenticated) => {
            println!("{}", style("Already authorized.").green());
            return Ok(session);
        }
        Ok(_) => {
            println!(
                "{}",
                style("Verification code sent to your account's devices.").cyan()
            );
        }
        Err(AuthError::Throttled { retry_after }) => {
            bail!(
                "provider throttled the connection; retry in {}s",
                retry_after.as_secs()
            );
        }
        Err(e) => return Err(e).context("failed to open the provider connection"),
    }

    while session.state() == AuthState::CodeSent {
        let choice = Select::new()
            .with_prompt("Verification")
            .items(&["Enter verification code", "Resend code"])
            .default(0)
            .interact()?;

        if choice == 1 {
            match session.resend_code().await {
                Ok(()) => println!("{}", style("New verification code sent.").cyan()),
                Err(AuthError::Throttled { retry_after }) => println!(
                    "{}",
                    style(format!(
                        "Resend throttled; wait {}s before trying again.",
                        retry_after.as_secs()
                    ))
                    .yellow()
                ),
                Err(e) => return Err(e).context("failed to resend the verification code"),
            }
            continue;
        }

        let code: String = Input::new()
            .with_prompt("Verification code")
            .interact_text()?;

        match session
            .submit_code(&VerificationCode::new(code.trim()))
            .await
        {
            Ok(_) => {}
            Err(AuthError::CodeRejected) => {
                println!("{}", style("Code rejected; try again.").red());
            }
            Err(AuthError::Throttled { retry_after }) => println!(
                "{}",
                style(format!(
                    "Sign-in throttled; wait {}s before trying again.",
                    retry_after.as_secs()
                ))
                .yellow()
            ),
            Err(e) => return Err(e).context("sign-in failed"),
        }
    }

    while session.state() == AuthState::PasswordRequired {
        let password = Password::new()
            .with_prompt("Second-factor password")
            .interact()?;

        match session
            .submit_password(&SecondFactorSecret::new(password))
            .await
        {
            Ok(_) => {}
            Err(AuthError::PasswordRejected) => {
                println!("{}", style("Password rejected; try again.").red());
            }
            Err(AuthError::Throttled { retry_after }) => {
                warn!(wait_secs = retry_after.as_secs(), "password check throttled");
                println!(
                    "{}",
                    style(format!(
                        "Throttled; wait {}s before trying again.",
                        retry_after.as_secs()
                    ))
                    .yellow()
                );
            }
            Err(e) => return Err(e).context("second-factor verification failed"),
        }
    }

    if !session.is_authenticated() {
        bail!("authentication did not complete (state: {:?})", session.state());
    }
    println!("{}", style("Authenticated.").green().bold());
    Ok(session)
}
