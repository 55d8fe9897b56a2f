use clap::Subcommand;
use sportsedge_core::services::credentials;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the backend API token
    Login {
        /// API token
        #[arg(long)]
        token: String,
    },
    /// Remove the stored token
    Logout,
    /// Check whether a token is stored
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login { token } => {
            if token.trim().is_empty() {
                return Err("--token must not be empty".into());
            }
            credentials::set_api_token(token.trim())?;
            println!("authenticated");
        }
        AuthAction::Logout => {
            credentials::clear_api_token()?;
            println!("logged out");
        }
        AuthAction::Status => {
            let status = match credentials::api_token()? {
                Some(_) => "authenticated",
                None => "not authenticated",
            };
            println!("{status}");
        }
    }
    Ok(())
}
