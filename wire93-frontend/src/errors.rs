use thiserror::Error;
use wire93_engine::errors::EngineError;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("无法写入输出: {0}")]
    Output(#[from] std::io::Error),
}
