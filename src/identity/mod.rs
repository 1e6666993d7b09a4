//! Identity for one browser tab: account records, login, the tab-scoped session and the
//! access model that gates every class/subject node.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod provider;
mod credentials;
mod authorizer;

pub use principal::{AllowedSubjects, Role, UserRecord};
pub use session::{Session, SessionStore, SESSION_KEY};
pub use provider::{AuthProvider, DirectoryAuthProvider, LoginRequest};
pub use credentials::{hash_password, verify_password};
pub use authorizer::{can_access, check_access, require_admin};
