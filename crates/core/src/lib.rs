//! SockCraft Core Types
//!
//! SOCKS4 wire types shared by the proxy and its tests.
//!
//! ## Request (client → proxy)
//!
//! ```text
//! +----+----+----+----+----+----+----+----+----+....+----+
//! | VN | CD | DSTPORT |      DSTIP        | USERID    |NULL|
//! +----+----+----+----+----+----+----+----+----+....+----+
//!    1    1      2              4           variable    1
//! ```
//!
//! ## Reply (proxy → client)
//!
//! ```text
//! +----+----+----+----+----+----+----+----+
//! | VN | CD | DSTPORT |      DSTIP        |
//! +----+----+----+----+----+----+----+----+
//!    1    1      2              4
//! ```

mod error;
mod reply;
mod request;

pub use error::*;
pub use reply::*;
pub use request::*;
