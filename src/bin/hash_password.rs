//! Prints an argon2 PHC string as an `ADMIN_PASSWORD_HASH` line for `.env`.
//!
//! Usage: `hash_password <password>`, or pipe the password on stdin.
//!
//! The value is single-quoted: dotenvy expands `$name` in unquoted and double-quoted
//! values, and a PHC string is full of `$`.

use std::io::{self, BufRead};

use anyhow::{Context, bail};
use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};

fn main() -> anyhow::Result<()> {
    let password = match std::env::args().nth(1) {
        Some(password) => password,
        None => {
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("reading password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        bail!("password must not be empty");
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;
    println!("{}", env_line(&hash.to_string()));
    Ok(())
}

fn env_line(hash: &str) -> String {
    format!("ADMIN_PASSWORD_HASH='{hash}'")
}
