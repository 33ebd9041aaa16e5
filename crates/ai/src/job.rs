use crate::result::{AiError, AiResult};

/// A prediction over a caller-supplied snapshot.
///
/// Jobs never see the store; they read the snapshot they were built with.
pub trait AiJob {
    type Input;

    /// Stable identifier recorded in the result metadata.
    fn kind(&self) -> &'static str;

    fn input(&self) -> &Self::Input;

    fn run(&self) -> Result<AiResult, AiError>;
}
