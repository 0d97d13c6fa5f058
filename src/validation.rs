use crate::prelude::*;
use regex::Regex;
use std::sync::OnceLock;

const USERNAME_MIN_LEN: usize = 5;
const USERNAME_MAX_LEN: usize = 20;
/// Minimal password length.
pub const PASSWORD_MIN_LEN: usize = 7;

fn username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9_\-.]*[a-zA-Z0-9]$").expect("username pattern is valid")
    })
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z_. ]*$").expect("name pattern is valid"))
}

fn mobile_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[89][0-9]{7}$").expect("mobile number pattern is valid"))
}

/// 5 to 20 alphanumeric characters, `.`, `_` and `-` allowed inside.
#[must_use]
pub fn is_valid_username(input: &str) -> bool {
    (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&input.len()) && username_re().is_match(input)
}

/// At least [`PASSWORD_MIN_LEN`] characters with an upper case letter, a
/// lower case letter, a digit and a punctuation or symbol character.
#[must_use]
pub fn is_valid_password(input: &str) -> bool {
    let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);
    for c in input.chars() {
        if c.is_uppercase() {
            upper = true;
        } else if c.is_lowercase() {
            lower = true;
        } else if c.is_numeric() {
            digit = true;
        } else if !c.is_alphanumeric() && !c.is_whitespace() {
            special = true;
        }
    }
    input.chars().count() >= PASSWORD_MIN_LEN && upper && lower && digit && special
}

/// Letters, `_`, `.` and spaces.
#[must_use]
pub fn is_valid_name(input: &str) -> bool {
    name_re().is_match(input)
}

/// Eight digits starting with 8 or 9.
#[must_use]
pub fn is_valid_mobile_number(input: &str) -> bool {
    mobile_number_re().is_match(input)
}

/// Checks the fields of a user record before it is stored.
///
/// The password is stored hashed and is not checked here, see
/// [`is_valid_password`].
/// # Errors
/// Fails with `ErrorKind::Validation` naming the first invalid field.
pub fn validate_user(user: &User) -> Result<()> {
    if !is_valid_username(&user.username) {
        return Err(Error::validation(format!("invalid username {:?}", user.username)));
    }
    if user.first_name.trim().is_empty() || !is_valid_name(&user.first_name) {
        return Err(Error::validation(format!("invalid first name {:?}", user.first_name)));
    }
    if user.last_name.trim().is_empty() || !is_valid_name(&user.last_name) {
        return Err(Error::validation(format!("invalid last name {:?}", user.last_name)));
    }
    if let Some(mobile_number) = user.mobile_number {
        if !is_valid_mobile_number(&mobile_number.to_string()) {
            return Err(Error::validation(format!("invalid mobile number {}", mobile_number)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(is_valid_username("amy01"));
        assert!(is_valid_username("dr.lee-wong_2"));
        assert!(!is_valid_username("amy"));
        assert!(!is_valid_username(".amy01"));
        assert!(!is_valid_username("amy01-"));
        assert!(!is_valid_username("amy 01"));
        assert!(!is_valid_username("a123456789012345678901"));
    }

    #[test]
    fn passwords() {
        assert!(is_valid_password("Secret1!"));
        assert!(!is_valid_password("Sec1!"));
        assert!(!is_valid_password("secret1!"));
        assert!(!is_valid_password("Secret!!"));
        assert!(!is_valid_password("Secret11"));
    }

    #[test]
    fn names_and_mobile_numbers() {
        assert!(is_valid_name("Mary Ann"));
        assert!(!is_valid_name("R2D2"));
        assert!(is_valid_mobile_number("91234567"));
        assert!(is_valid_mobile_number("81234567"));
        assert!(!is_valid_mobile_number("71234567"));
        assert!(!is_valid_mobile_number("9123456"));
    }

    #[test]
    fn user_records() {
        let user = User::new("amy01", "hash", Role::Patient, "Amy", "Tan");
        assert!(validate_user(&user).is_ok());
        assert!(validate_user(&user.clone().with_mobile_number(12345678)).is_err());
        let mut nameless = user;
        nameless.first_name = " ".to_owned();
        assert!(matches!(
            validate_user(&nameless).unwrap_err().kind(),
            Kind::Validation(_)
        ));
    }
}
