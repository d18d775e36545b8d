pub mod access;
pub mod acl;
pub mod backend;
pub mod backends;
pub mod chain;
pub mod password;
pub mod registry;
pub mod topic;

pub use access::Access;
pub use acl::{AclEvaluator, AclOrder};
pub use backend::{Backend, MAX_BACKENDS};
pub use chain::BackendChain;
pub use password::{hash_password, verify, Digest, HashParams};
pub use registry::{BackendFactory, BackendRegistry};
pub use topic::{matches_filter, TopicTemplate};
