use crate::dto::DataFile;
use crate::error::ServiceError;
use crate::util::{get_env_var, get_optional_env_var};

/// Cold-start settings for the detection function.
#[derive(Clone, Debug)]
pub struct Settings {
    /// HS256 secret shared with the admin login flow
    pub jwt_secret: String,
    /// Location of the center export in S3
    pub centers: DataFile,
    /// Production deployments never send error details to callers
    pub production: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ServiceError> {
        let production = get_optional_env_var("ENVIRONMENT")
            .map(|env| env.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        Ok(Settings {
            jwt_secret: get_env_var("JWT_SECRET")?,
            centers: DataFile {
                bucket: get_env_var("CENTERS_BUCKET")?,
                key: get_env_var("CENTERS_KEY")?,
            },
            production,
        })
    }

    pub fn expose_error_details(&self) -> bool {
        !self.production
    }
}
