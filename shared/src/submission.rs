use std::fmt::Display;

use crate::FileRecord;

/// The remote text generation call: prompt plus one file in, text out.
#[allow(async_fn_in_trait)]
pub trait TextGenerator<P> {
    type Error: Display;

    async fn generate(&self, prompt: &str, file: &FileRecord<P>) -> Result<String, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Add a file before submitting.")]
    NoFile,
    #[error("A request is already in progress.")]
    InFlight,
    #[error("Generation failed: {0}")]
    Generation(String),
}

/// Prompt, loading flag and the last result or failure of a submission.
///
/// `is_loading` is only true between [`SubmissionState::begin`] and
/// [`SubmissionState::finish`], and `finish` is the only way out of it,
/// whatever the outcome of the call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    prompt: String,
    is_loading: bool,
    result: Option<String>,
    error: Option<String>,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a submission of `first`, returning the prompt and file to send.
    pub fn begin<'f, P>(
        &mut self,
        first: Option<&'f FileRecord<P>>,
    ) -> Result<(String, &'f FileRecord<P>), SubmissionError> {
        if self.is_loading {
            return Err(SubmissionError::InFlight);
        }
        let Some(file) = first else {
            self.error = Some(SubmissionError::NoFile.to_string());
            return Err(SubmissionError::NoFile);
        };

        self.error = None;
        self.is_loading = true;
        Ok((self.prompt.clone(), file))
    }

    /// Settle the in-flight submission.
    pub fn finish<E: Display>(&mut self, outcome: Result<String, E>) {
        self.is_loading = false;
        match outcome {
            Ok(text) => {
                log::info!("Generation returned {} characters", text.len());
                self.result = Some(text);
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    /// Send the prompt and `first` to the generator and record the outcome.
    ///
    /// No retry and no timeout; exactly one call per submission.
    pub async fn submit<P, G>(
        &mut self,
        first: Option<&FileRecord<P>>,
        generator: &G,
    ) -> Result<(), SubmissionError>
    where
        G: TextGenerator<P>,
    {
        let (prompt, file) = self.begin(first)?;

        match generator.generate(&prompt, file).await {
            Ok(text) => {
                self.finish(Ok::<_, String>(text));
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.finish(Err(message.clone()));
                Err(SubmissionError::Generation(message))
            }
        }
    }

    /// Close the result view. Prompt and batch are untouched.
    pub fn dismiss(&mut self) {
        self.result = None;
    }
}
