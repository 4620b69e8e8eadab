pub mod export;
pub mod graph;
pub mod pen;
pub mod session;

pub mod errors {
    use thiserror::Error;
    use wire93_io::IoError;

    /// 导出阶段的错误，由具体导出器产生。
    #[derive(Debug, Error)]
    pub enum ExportError {
        #[error("failed to write export output: {0}")]
        Io(#[from] std::io::Error),
        #[error("failed to encode export output: {message}")]
        Encode { message: String },
    }

    impl ExportError {
        pub fn encode(message: impl Into<String>) -> Self {
            Self::Encode {
                message: message.into(),
            }
        }
    }

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error(transparent)]
        Load(#[from] IoError),
        #[error(transparent)]
        Export(#[from] ExportError),
    }
}
