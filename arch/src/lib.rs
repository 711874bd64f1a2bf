pub mod alu;
pub mod comp;
pub mod dest;
pub mod files;
pub mod inst;
pub mod jump;
pub mod msg;
pub mod symbol;
