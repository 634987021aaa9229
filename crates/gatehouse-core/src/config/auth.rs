//! Login, logout and credential configuration.

use serde::{Deserialize, Serialize};

/// Form login, logout and credential settings.
///
/// The URL fields describe the externally visible endpoints; the engine
/// itself never renders pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Path of the login page.
    pub login_page: String,
    /// Path that accepts the login form submission (POST).
    pub login_processing_url: String,
    /// Form field carrying the username.
    pub username_parameter: String,
    /// Form field carrying the password.
    pub password_parameter: String,
    /// Redirect target after a successful login.
    pub default_success_url: String,
    /// Redirect target after any failed login, including the error marker.
    pub failure_url: String,
    /// Path that triggers logout.
    pub logout_url: String,
    /// Redirect target after logout.
    pub logout_success_url: String,
    /// Page shown to authenticated principals denied by the policy.
    pub access_denied_page: String,
    /// Name of the session cookie.
    pub session_cookie_name: String,
    /// Password hashing cost parameters.
    pub hashing: HashingConfig,
    /// Accounts seeded into the credential store at startup.
    pub bootstrap_users: Vec<BootstrapUser>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_page: "/login.html".to_string(),
            login_processing_url: "/auth".to_string(),
            username_parameter: "user_name".to_string(),
            password_parameter: "pass_word".to_string(),
            default_success_url: "/index.html".to_string(),
            failure_url: "/login.html?error".to_string(),
            logout_url: "/logout".to_string(),
            logout_success_url: "/login.html?logout".to_string(),
            access_denied_page: "/403.html".to_string(),
            session_cookie_name: "GATEHOUSE_SESSION".to_string(),
            hashing: HashingConfig::default(),
            bootstrap_users: vec![BootstrapUser {
                username: "admin".to_string(),
                password: "admin".to_string(),
                roles: vec!["ADMIN".to_string()],
            }],
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of iterations.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// An account created at startup so the system is usable without
/// external provisioning.
#[derive(Clone, Serialize, Deserialize)]
pub struct BootstrapUser {
    /// Login name.
    pub username: String,
    /// Plaintext password; hashed before it reaches the credential store.
    pub password: String,
    /// Granted roles.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl std::fmt::Debug for BootstrapUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapUser")
            .field("username", &self.username)
            .field("roles", &self.roles)
            .finish_non_exhaustive()
    }
}
