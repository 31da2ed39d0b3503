//! Line-oriented console front end.
//!
//! ```text
//! register Ali ali1@email.com 12345
//! login ali1@email.com 12345
//! whoami
//! status
//! logout
//! quit
//! ```
//!
//! Each line is parsed with clap and mapped onto one session client
//! operation. The console only supplies input and renders the resulting
//! state or error text; all session rules live in the domain.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::domain::ports::IdentityProvider;
use crate::domain::{Account, SessionClient, SessionError, SessionState};

/// One console command.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ConsoleCommand {
    /// Create an account and sign in to it.
    Register {
        /// Display name for the new account.
        #[arg(allow_hyphen_values = true)]
        name: String,
        /// Email address to register.
        #[arg(allow_hyphen_values = true)]
        email: String,
        /// Password to register.
        #[arg(allow_hyphen_values = true)]
        password: String,
    },
    /// Sign in to an existing account.
    Login {
        /// Email address of the account.
        #[arg(allow_hyphen_values = true)]
        email: String,
        /// Account password.
        #[arg(allow_hyphen_values = true)]
        password: String,
    },
    /// Sign out and revoke the held token.
    Logout,
    /// Ask the provider which account the held token belongs to.
    Whoami,
    /// Show the local session state.
    Status,
    /// Leave the console.
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Parser)]
#[command(name = "session", no_binary_name = true, disable_version_flag = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

/// Parse one input line.
///
/// Words are split with shell quoting rules, so a name or password with
/// spaces can be given as `"Ali Khan"` or `'pass word'`. Credential values
/// may start with `-`.
///
/// # Examples
/// ```
/// use session_client::inbound::console::{ConsoleCommand, parse_command};
///
/// let command = parse_command("login ali1@email.com 12345").unwrap();
/// assert_eq!(
///     command,
///     ConsoleCommand::Login {
///         email: "ali1@email.com".to_owned(),
///         password: "12345".to_owned(),
///     }
/// );
/// ```
///
/// # Errors
///
/// Returns clap's error for unknown commands, missing arguments or
/// unbalanced quotes; its rendering includes usage help where clap has it.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, clap::Error> {
    let words = shlex::split(line)
        .ok_or_else(|| clap::Error::raw(ErrorKind::InvalidValue, "unbalanced quotes\n"))?;
    ConsoleLine::try_parse_from(words).map(|parsed| parsed.command)
}

/// Read commands from `input` until `quit` or end of input, writing one
/// reply per command to `output`.
///
/// # Errors
///
/// Returns an error only when reading input or writing output fails;
/// operation failures are rendered as `error: ...` lines.
pub async fn run<P, R, W>(client: &SessionClient<P>, input: R, mut output: W) -> std::io::Result<()>
where
    P: IdentityProvider,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match parse_command(&line) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(command) => execute(client, command).await,
            Err(error) => error.render().to_string(),
        };
        output.write_all(reply.as_bytes()).await?;
        output.flush().await?;
    }
    Ok(())
}

async fn execute<P>(client: &SessionClient<P>, command: ConsoleCommand) -> String
where
    P: IdentityProvider,
{
    match command {
        ConsoleCommand::Register {
            name,
            email,
            password,
        } => match client.register(&name, &email, &password).await {
            Ok(session) => signed_in_line(session.account()),
            Err(error) => error_line(&error),
        },
        ConsoleCommand::Login { email, password } => match client.login(&email, &password).await {
            Ok(session) => signed_in_line(session.account()),
            Err(error) => error_line(&error),
        },
        ConsoleCommand::Logout => match client.logout().await {
            Ok(()) => "signed out\n".to_owned(),
            Err(error) => error_line(&error),
        },
        ConsoleCommand::Whoami => match client.current_account().await {
            Ok(account) => signed_in_line(&account),
            Err(error) => error_line(&error),
        },
        ConsoleCommand::Status => match client.state().await {
            SessionState::Anonymous => "anonymous\n".to_owned(),
            SessionState::Authenticated(session) => signed_in_line(session.account()),
        },
        ConsoleCommand::Quit => String::new(),
    }
}

fn signed_in_line(account: &Account) -> String {
    format!("signed in as {} <{}>\n", account.name(), account.email())
}

fn error_line(error: &SessionError) -> String {
    format!("error: {}\n", error.info())
}
