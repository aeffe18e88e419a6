use serde::Deserialize;
use serde_json::Value;

/// Plaintext seed for one account. Only ever hashed, never stored or logged.
#[derive(Debug, Clone, Copy)]
pub struct UserSeed {
    pub id: u32,
    pub email: &'static str,
    pub password: &'static str,
    pub security_answers: &'static [&'static str],
}

/// Accounts known to the service.
pub const SEED_USERS: &[UserSeed] = &[
    UserSeed {
        id: 1,
        email: "student@example.com",
        password: "password123",
        security_answers: &["Fluffy", "Blue", "Ford"],
    },
    UserSeed {
        id: 2,
        email: "instructor@example.com",
        password: "teachsecure",
        security_answers: &["Rex", "Green", "Tesla"],
    },
];

/// A registered user. `password_hash` is an Argon2id PHC string and
/// `security_answers` are position-significant.
#[derive(Clone)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub password_hash: String,
    pub security_answers: Vec<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RawCredentials {
    email: Option<String>,
    password: Option<String>,
}

/// Login request body
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Both fields must be present, non-empty strings.
    pub fn from_json(body: Option<Value>) -> Option<Self> {
        let raw: RawCredentials = serde_json::from_value(body?).ok()?;
        let email = raw.email.filter(|email| !email.is_empty())?;
        let password = raw.password.filter(|password| !password.is_empty())?;
        Some(Self { email, password })
    }
}

/// One element of a security-question verification body.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityAnswer {
    pub answer: String,
}

impl SecurityAnswer {
    /// The body must be an array of `{ "answer": "<string>" }` objects and
    /// nothing else. An empty answer is well formed.
    pub fn list_from_json(body: Option<Value>) -> Option<Vec<String>> {
        let answers: Vec<SecurityAnswer> = serde_json::from_value(body?).ok()?;
        Some(answers.into_iter().map(|a| a.answer).collect())
    }
}
