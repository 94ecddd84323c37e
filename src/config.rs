use std::net::SocketAddr;

use anyhow::Context;

use crate::{community::DEFAULT_MESSAGE_PAGE_SIZE, pagination::DEFAULT_LIMIT};

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub default_page_size: u64,
    pub message_page_size: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movie_catalog.db?mode=rwc".to_string());

        let default_page_size: u64 = std::env::var("DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_LIMIT);

        let message_page_size: u64 = std::env::var("MESSAGE_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MESSAGE_PAGE_SIZE);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            default_page_size,
            message_page_size,
        })
    }
}
