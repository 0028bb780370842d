//! The five tool servers

use serde::{Deserialize, Serialize};

use crate::core::error::DomainError;

/// Which catalog a server process exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerKind {
    Git,
    Docker,
    Http,
    Database,
    Devtools,
}

impl ServerKind {
    pub const ALL: [ServerKind; 5] = [
        ServerKind::Git,
        ServerKind::Docker,
        ServerKind::Http,
        ServerKind::Database,
        ServerKind::Devtools,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKind::Git => "git",
            ServerKind::Docker => "docker",
            ServerKind::Http => "http",
            ServerKind::Database => "database",
            ServerKind::Devtools => "devtools",
        }
    }

    /// Name reported in the `initialize` handshake
    pub fn server_name(&self) -> String {
        format!("workbench-{}", self.as_str())
    }
}

impl std::fmt::Display for ServerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ServerKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::UnknownServer(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_kind() {
        assert_eq!("git".parse::<ServerKind>().unwrap(), ServerKind::Git);
        assert_eq!("DevTools".parse::<ServerKind>().unwrap(), ServerKind::Devtools);
        assert_eq!(
            "ftp".parse::<ServerKind>().unwrap_err(),
            DomainError::UnknownServer("ftp".to_string())
        );
    }

    #[test]
    fn test_server_name() {
        assert_eq!(ServerKind::Database.server_name(), "workbench-database");
    }
}
