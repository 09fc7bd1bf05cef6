//! Packet framing, wire primitives, and the per-column type codec shared by
//! the server and every engine implementation. See spec components 1-3.
pub mod codec;
pub mod column;
pub mod constants;
pub mod error;
pub mod primitives;
pub mod value;

pub use codec::Codec;
pub use column::ColumnInfo;
pub use error::ProtocolError;
pub use value::{MysqlTime, Value};
