use crate::error::AppError;

impl AppError {
    /// Maps a failed API write, keeping 409 apart so it can be retried.
    pub fn from_write(error: kube::Error) -> Self {
        match error {
            kube::Error::Api(e) if e.code == 409 => AppError::Conflict(e.message.clone()),
            other => AppError::KubeError(other),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, AppError::Conflict(_))
    }
}
