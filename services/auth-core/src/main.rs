//! Operator CLI for issuing and inspecting access tokens and password hashes.

use std::io::{self, BufRead};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use auth_core::tracing_config::{init_tracing, TracingConfig};
use auth_core::{AuthError, SecurityConfig, SecurityContext};
use clap::{Parser, Subcommand};
use tracing::error;

#[derive(Parser)]
#[command(name = "auth-core")]
#[command(about = "Issue and check access tokens and password hashes")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue an access token for a subject
    Issue {
        /// Subject identifier (user id)
        #[arg(long)]
        subject: String,

        /// Lifetime in minutes; defaults to ACCESS_TOKEN_EXPIRE_MINUTES
        #[arg(long)]
        minutes: Option<u64>,
    },
    /// Hash a password (read from stdin unless --password is given)
    Hash {
        #[arg(long)]
        password: Option<String>,
    },
    /// Check a password against a stored hash; exits 1 on mismatch
    Verify {
        /// Stored bcrypt hash
        #[arg(long)]
        hash: String,

        #[arg(long)]
        password: Option<String>,
    },
    /// Validate a token and print its claims; exits 1 if invalid
    Decode {
        /// Compact JWT
        token: String,
    },
}

/// Command succeeded.
const EXIT_OK: u8 = 0;
/// Password mismatch, invalid token or command failure.
const EXIT_REJECTED: u8 = 1;
/// Configuration could not be loaded.
const EXIT_CONFIG: u8 = 2;

fn main() -> ExitCode {
    init_tracing(&TracingConfig::from_env());

    let args = Args::parse();

    let security = match load_security(SecurityConfig::from_env()) {
        Ok(security) => security,
        Err(code) => return ExitCode::from(code),
    };

    match run(&security, args.command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(EXIT_REJECTED)
        }
    }
}

fn load_security(config: Result<SecurityConfig, AuthError>) -> Result<SecurityContext, u8> {
    let config = config.map_err(|e| {
        error!(error = %e, "invalid configuration");
        eprintln!("{e}");
        EXIT_CONFIG
    })?;
    SecurityContext::new(&config).map_err(|e| {
        error!(error = %e, "failed to initialize security context");
        eprintln!("{e}");
        EXIT_CONFIG
    })
}

fn run(security: &SecurityContext, command: Command) -> anyhow::Result<u8> {
    match command {
        Command::Issue { subject, minutes } => {
            let token = match minutes {
                Some(minutes) => {
                    security.issue_token(&subject, Duration::from_secs(minutes.saturating_mul(60)))
                }
                None => security.issue_default_token(&subject),
            }
            .context("failed to issue token")?;
            println!("{token}");
            Ok(EXIT_OK)
        }
        Command::Hash { password } => {
            let password = password_or_stdin(password)?;
            let hashed = security
                .hash_password(&password)
                .context("failed to hash password")?;
            println!("{hashed}");
            Ok(EXIT_OK)
        }
        Command::Verify { hash, password } => {
            let password = password_or_stdin(password)?;
            if security.verify_password(&password, &hash) {
                println!("match");
                if security.needs_rehash(&hash) {
                    eprintln!("note: hash uses different parameters and should be rehashed");
                }
                Ok(EXIT_OK)
            } else {
                println!("mismatch");
                Ok(EXIT_REJECTED)
            }
        }
        Command::Decode { token } => match security.decode_token(&token) {
            Ok(claims) => {
                println!("{}", serde_json::to_string_pretty(&claims)?);
                Ok(EXIT_OK)
            }
            Err(invalid) => {
                println!("{invalid}");
                Ok(EXIT_REJECTED)
            }
        },
    }
}

fn password_or_stdin(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security() -> SecurityContext {
        SecurityContext::new(&SecurityConfig::new("cli-test-secret").with_bcrypt_cost(4)).unwrap()
    }

    #[test]
    fn test_issue_exits_ok() {
        let command = Command::Issue {
            subject: "alice".to_string(),
            minutes: Some(5),
        };

        assert_eq!(run(&security(), command).unwrap(), EXIT_OK);
    }

    #[test]
    fn test_verify_exit_codes() {
        let security = security();
        let hash = security.hash_password("hunter2").unwrap();

        let matching = Command::Verify {
            hash: hash.clone(),
            password: Some("hunter2".to_string()),
        };
        let wrong = Command::Verify {
            hash,
            password: Some("hunter3".to_string()),
        };

        assert_eq!(run(&security, matching).unwrap(), EXIT_OK);
        assert_eq!(run(&security, wrong).unwrap(), EXIT_REJECTED);
    }

    #[test]
    fn test_decode_exit_codes() {
        let security = security();
        let token = security.issue_default_token("alice").unwrap();

        assert_eq!(run(&security, Command::Decode { token }).unwrap(), EXIT_OK);
        assert_eq!(
            run(&security, Command::Decode { token: "garbage".to_string() }).unwrap(),
            EXIT_REJECTED
        );
    }

    #[test]
    fn test_missing_secret_exits_with_config_code() {
        let result = load_security(SecurityConfig::from_lookup(|_| None));

        assert!(matches!(result, Err(EXIT_CONFIG)));
    }

    #[test]
    fn test_invalid_cost_exits_with_config_code() {
        let result = load_security(Ok(SecurityConfig::new("k").with_bcrypt_cost(3)));

        assert!(matches!(result, Err(EXIT_CONFIG)));
    }
}
