use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection parameters of the results store.
///
/// Field names follow the credentials file written for the store's admin
/// user. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub host: String,
    pub port: u16,
    pub database: String,
    #[serde(rename = "admin_user")]
    pub user: String,
    #[serde(rename = "admin_password")]
    pub password: String,
    pub collection: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("collection", &self.collection)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_credentials_file_layout() {
        let creds: Credentials = serde_json::from_value(json!({
            "host": "db.example.org",
            "port": 27017,
            "database": "vasp",
            "admin_user": "admin",
            "admin_password": "hunter2",
            "collection": "tasks",
            "readonly_user": "ignored"
        }))
        .unwrap();
        assert_eq!(creds.user, "admin");
        assert_eq!(creds.port, 27017);
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            host: "h".to_string(),
            port: 1,
            database: "d".to_string(),
            user: "u".to_string(),
            password: "hunter2".to_string(),
            collection: "c".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}
