use md5::{Digest, Md5};
use secrecy::{ExposeSecret, SecretString};

use crate::region::Region;

/// Account credentials for the PetKit cloud.
///
/// Immutable after construction. The password is never sent in the
/// clear -- [`password_md5`](Self::password_md5) produces the hex digest
/// the login endpoint expects, computed fresh for each login call.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: SecretString,
    region: Region,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString, region: Region) -> Self {
        Self {
            username: username.into(),
            password,
            region,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// MD5 hex digest of the password, as the vendor login expects.
    pub(crate) fn password_md5(&self) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.password.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }
}
