//! 响应与输入校验辅助。

pub mod response;
pub mod validation;

pub use response::*;
pub use validation::*;
