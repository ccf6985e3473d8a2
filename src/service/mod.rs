pub mod economic_validator; // 粉尘 / 储备金 / 手续费资源检查
pub mod rpc; // RPC 响应解码
pub mod transaction_builder; // 两阶段交易构建
