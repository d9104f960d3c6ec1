use item_core::Item;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

pub const NAME_BLANK_MESSAGE: &str = "Name cannot be blank";
pub const NAME_LENGTH_MESSAGE: &str = "Name must be between 2 and 50 characters";
pub const EMAIL_FORMAT_MESSAGE: &str = "Invalid email format";

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 50;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
});

fn error_with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// 验证名称：去除空白后非空，长度 2..=50 个字符
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(error_with_message("blank", NAME_BLANK_MESSAGE));
    }

    let length = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&length) {
        return Err(error_with_message("length", NAME_LENGTH_MESSAGE));
    }

    Ok(())
}

/// 验证邮箱格式
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(error_with_message("email", EMAIL_FORMAT_MESSAGE))
    }
}

/// 验证整条Item，收集全部字段错误
pub fn validate_item(item: &Item) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if let Err(e) = validate_name(&item.name) {
        errors.add("name", e);
    }
    if let Err(e) = validate_email(&item.email) {
        errors.add("email", e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
