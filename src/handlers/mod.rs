//! Handler implementations for target systems
//!
//! 各ハンドラーは共通のBridgeHandlerトレイトを実装し、サーバーループから
//! 呼び出されます。

pub mod wordpress;

pub use wordpress::*;
