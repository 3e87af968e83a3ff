//! CLI subcommands.

pub mod account;
pub mod migrate;

/// Read the site database URL, falling back to `DATABASE_URL`.
pub(crate) fn database_url() -> Option<secrecy::SecretString> {
    dotenvy::dotenv().ok();
    std::env::var("CSE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(secrecy::SecretString::from)
}
