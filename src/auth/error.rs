use axum::http::StatusCode;
use axum::response::IntoResponse;

#[derive(Debug, Clone)]
pub enum AuthError {
    Unauthorized,
    InvalidCredentials,
    EmailTaken,
    InvalidInput(String),
    DatabaseConnection,
    RegistrationFailed,
    SessionFailed,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::InvalidCredentials => write!(f, "Invalid email or password"),
            Self::EmailTaken => write!(f, "User with this email already exists"),
            Self::InvalidInput(msg) => write!(f, "{msg}"),
            Self::DatabaseConnection => write!(f, "Database connection failed"),
            Self::RegistrationFailed => write!(f, "Registration failed"),
            Self::SessionFailed => write!(f, "Failed to create session"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseConnection | Self::RegistrationFailed | Self::SessionFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
