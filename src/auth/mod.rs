pub mod claims;
pub mod codec;
pub mod store;
pub mod token;

pub use claims::{TokenClaims, TokenKind};
pub use codec::TokenCodec;
pub use store::{MemoryRevocationStore, RedisRevocationStore, RevocationStore};
pub use token::{TokenPair, TokenService};
