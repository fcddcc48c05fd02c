pub mod contract;
pub mod memory;
pub mod micheline;
pub mod rpc;
