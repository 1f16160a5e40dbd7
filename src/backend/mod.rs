//! Backend module - external collaborators the portal forwards to

pub mod completion;
pub mod regression;

pub use completion::{
    ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, CompletionBackend,
    OpenAICompatibleBackend, Usage,
};
pub use regression::{LinearRegression, Predictor};
