// Token authentication

use crate::requests::MethodCall;
use crate::settings::Settings;
use scoring_log::info;
use sha2::{Digest, Sha512};

/// Token a caller must present: hex SHA-512 of `account + login + salt`, or
/// of `admin_login + admin_salt` for the administrator.
pub fn expected_token(settings: &Settings, account: &str, login: &str) -> String {
    let line = if is_admin(settings, login) {
        format!("{}{}", settings.admin_login, settings.admin_salt)
    } else {
        format!("{}{}{}", account, login, settings.salt)
    };

    hex::encode(Sha512::digest(line.as_bytes()))
}

pub fn is_admin(settings: &Settings, login: &str) -> bool {
    login == settings.admin_login
}

/// Check the call's token.
pub fn check_auth(settings: &Settings, call: &MethodCall) -> bool {
    let passed = expected_token(settings, call.account(), &call.login) == call.token;

    if passed {
        info!(target: "scoring::auth", "{} - authentication passed", call.login);
    } else {
        info!(target: "scoring::auth", "{} - authentication failed", call.login);
    }

    passed
}
