use rubrica_core::roster::{MemberRequest, NewStudent};

/// Parse a student given as `Name <email>`
pub fn parse_student(s: &str) -> std::result::Result<NewStudent, String> {
    let (name, rest) = s
        .split_once('<')
        .ok_or_else(|| format!("expected `Name <email>`, got `{}`", s))?;
    let email = rest
        .strip_suffix('>')
        .ok_or_else(|| format!("missing closing `>` in `{}`", s))?;

    Ok(NewStudent {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
    })
}

/// Parse a course teacher given as `email` or `email:moderator`
pub fn parse_member(s: &str) -> std::result::Result<MemberRequest, String> {
    match s.split_once(':') {
        None => Ok(MemberRequest {
            email: s.trim().to_string(),
            moderator: false,
        }),
        Some((email, "moderator" | "mod")) => Ok(MemberRequest {
            email: email.trim().to_string(),
            moderator: true,
        }),
        Some((_, role)) => Err(format!("unknown role `{}` (expected `moderator`)", role)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_student() {
        let student = parse_student("Ana Pérez <ana@x.edu>").unwrap();
        assert_eq!(student.name, "Ana Pérez");
        assert_eq!(student.email, "ana@x.edu");

        assert!(parse_student("ana@x.edu").is_err());
        assert!(parse_student("Ana <ana@x.edu").is_err());
    }

    #[test]
    fn test_parse_member() {
        assert!(!parse_member("a@x.edu").unwrap().moderator);
        assert!(parse_member("a@x.edu:moderator").unwrap().moderator);
        assert!(parse_member("a@x.edu:owner").is_err());
    }
}
