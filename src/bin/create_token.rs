use std::{collections::HashSet, error::Error};

use clap::Parser;
use time::OffsetDateTime;

use spendings_rs::AuthState;

/// A utility for issuing access tokens for the REST API server of spendings_rs.
///
/// Use it to create the first admin token, which can then issue further tokens through the API.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The nickname of the user the token is for.
    #[arg(long, short)]
    name: String,

    /// Whether the token may issue further tokens.
    #[arg(long)]
    admin: bool,

    /// How long the token stays valid, in days.
    #[arg(long, default_value_t = 30)]
    lifetime_days: i64,

    /// The secret the server uses to verify tokens.
    #[arg(long, env = "SECRET", hide_env_values = true)]
    secret: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if args.name.trim().is_empty() {
        return Err("The token name must not be empty".into());
    }

    let auth = AuthState::new(
        &args.secret,
        HashSet::new(),
        time::Duration::days(args.lifetime_days),
        None,
    );
    let claims = auth.new_claims("cli", args.name.trim(), args.admin, OffsetDateTime::now_utc());
    let token = auth.encode(&claims)?;

    eprintln!("Issued token {} for {}", claims.jti, claims.nickname);
    println!("{token}");

    Ok(())
}
