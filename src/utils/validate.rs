use once_cell::sync::Lazy;
use regex::Regex;

// 字面量模式，编译失败只可能是代码错误
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

/// 名称最多字符数（按字符计，兼容中文）
pub const MAX_NAME_CHARS: usize = 128;

/// 分数允许的取值范围
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 名称（班级名、学生姓名、作业标题）校验
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Name must not be empty");
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err("Name must be at most 128 characters");
    }
    Ok(())
}

pub fn validate_score(score: i32) -> Result<(), &'static str> {
    if !SCORE_RANGE.contains(&score) {
        return Err("Score must be between 0 and 100");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("li.lei+math@school.edu.cn").is_ok());
    }

    #[test]
    fn test_invalid_email() {
        assert!(validate_email("alice").is_err());
        assert!(validate_email("alice@localhost").is_err());
        assert!(validate_email("alice@example.c|m").is_err());
    }

    #[test]
    fn test_name_rules() {
        assert!(validate_name("高一（3）班").is_ok());
        assert_eq!(validate_name("   "), Err("Name must not be empty"));
        assert!(validate_name(&"x".repeat(MAX_NAME_CHARS)).is_ok());
        assert!(validate_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_score_bounds() {
        assert!(validate_score(0).is_ok());
        assert!(validate_score(100).is_ok());
        assert!(validate_score(-1).is_err());
        assert!(validate_score(101).is_err());
    }
}
