//! This module holds the configuration for the server

use std::net::IpAddr;

use actix_toolbox::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// The mode the server is running in
///
/// In [Environment::Development] the details of internal errors are exposed to clients.
#[derive(Deserialize, Serialize, Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum Environment {
    /// Internal errors are answered with a generic message
    #[default]
    Production,
    /// Internal errors are answered with their details
    Development,
}

/// Configuration regarding the server
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct ServerConfig {
    /// The address the server should bind to
    pub listen_address: IpAddr,
    /// The port the server should bind to
    pub listen_port: u16,
}

/// Configuration regarding the database
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct DBConfig {
    /// The address of the database server
    pub host: String,
    /// The port of the database server
    pub port: u16,
    /// The name of the database to connect to
    pub name: String,
    /// The user to connect with
    pub user: String,
    /// The password of the user
    pub password: String,
}

/// Configuration regarding the api authentication
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct AuthConfig {
    /// The shared token clients have to send as `Authorization: Bearer <token>`
    pub token: String,
}

/// This struct can be parsed from the configuration file
#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// The mode the server is running in
    #[serde(default)]
    pub environment: Environment,
    /// Configuration regarding the server
    pub server: ServerConfig,
    /// Configuration regarding the database
    pub database: DBConfig,
    /// Configuration regarding the api authentication
    pub auth: AuthConfig,
    /// The logging configuration
    pub logging: LoggingConfig,
}
